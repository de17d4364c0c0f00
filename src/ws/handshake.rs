//! Opening handshake: key generation, upgrade request and accept-hash
//! verification.
//!
//! The server proves it saw our key by sending back
//! `base64(SHA1(key + ACCEPT_GUID))`; anything else means the response did
//! not come from a WebSocket endpoint that read our request.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::RngCore;
use sha1::{Digest, Sha1};

use crate::error::WsError;
use crate::http::USER_AGENT;

/// Universal constant from RFC 6455 §1.3.
pub const ACCEPT_GUID: &str = "258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

/// One upgrade attempt: a fresh client key plus the target host and path.
/// Used once, then discarded in favor of the live session.
pub struct Handshake {
    pub key: String,
    host: String,
    path: String,
}

impl Handshake {
    /// Generates the client key: base64 of 16 random bytes.
    pub fn new(host: impl Into<String>, path: impl Into<String>) -> Self {
        let mut key = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut key);
        Self {
            key: BASE64.encode(key),
            host: host.into(),
            path: path.into(),
        }
    }

    /// The upgrade request: a GET with the switching headers.
    pub fn request(&self) -> Vec<u8> {
        format!(
            "GET {} HTTP/1.1\r\n\
             Host: {}\r\n\
             User-Agent: {}\r\n\
             Connection: Upgrade\r\n\
             Upgrade: websocket\r\n\
             Sec-WebSocket-Key: {}\r\n\
             Sec-WebSocket-Version: 13\r\n\r\n",
            self.path, self.host, USER_AGENT, self.key
        )
        .into_bytes()
    }

    /// Accept value the server must echo for `key`.
    pub fn expected_accept(key: &str) -> String {
        let mut hasher = Sha1::new();
        hasher.update(key.as_bytes());
        hasher.update(ACCEPT_GUID.as_bytes());
        BASE64.encode(hasher.finalize())
    }

    /// Verifies the server's response header block. Fails closed when the
    /// accept header is missing; the comparison is byte-for-byte after
    /// whitespace trimming.
    pub fn verify(&self, response_head: &str) -> Result<(), WsError> {
        let accept = response_head
            .split("\r\n")
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("sec-websocket-accept"))
            .map(|(_, value)| value.trim())
            .ok_or(WsError::MissingAccept)?;

        if accept == Self::expected_accept(&self.key) {
            Ok(())
        } else {
            Err(WsError::AcceptMismatch)
        }
    }
}

/// Whether the status line of the handshake response is 101 Switching
/// Protocols.
pub fn is_switching_protocols(response_head: &str) -> bool {
    response_head
        .split("\r\n")
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .map(|code| code == "101")
        .unwrap_or(false)
}
