//! Frame codec.
//!
//! Layout per RFC 6455 §5.2: byte 0 carries FIN and the opcode, byte 1 the
//! mask bit and a 7-bit length code (0-125 literal, 126 = u16 follows,
//! 127 = u64 follows), then the optional 4-byte mask key, then the payload.
//! Client-to-server frames must be masked; masking is a symmetric XOR with
//! `key[i % 4]`.

use rand::RngCore;

use crate::error::WsError;
use crate::wire::{put_u16_be, put_u64_be, WireReader};

pub const OPCODE_TEXT: u8 = 0x1;
pub const OPCODE_BINARY: u8 = 0x2;
pub const OPCODE_CLOSE: u8 = 0x8;
pub const OPCODE_PING: u8 = 0x9;
pub const OPCODE_PONG: u8 = 0xA;

/// Payload cap in either direction (1 MiB).
pub const MAX_PAYLOAD: usize = 1 << 20;

/// Largest possible header: 2 base bytes + 8 length bytes + 4 mask bytes.
pub(crate) const MAX_HEADER: usize = 14;

const FIN_BIT: u8 = 0x80;
const MASK_BIT: u8 = 0x80;
const LEN_U16: u8 = 126;
const LEN_U64: u8 = 127;

/// One WebSocket frame. The payload is always held unmasked; masking is
/// applied exactly once during [`Frame::encode`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub fin: bool,
    pub opcode: u8,
    pub payload: Vec<u8>,
}

impl Frame {
    /// Single unfragmented text frame.
    pub fn text(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            fin: true,
            opcode: OPCODE_TEXT,
            payload: payload.into(),
        }
    }

    /// Close frame with no status code.
    pub fn close() -> Self {
        Self {
            fin: true,
            opcode: OPCODE_CLOSE,
            payload: Vec::new(),
        }
    }

    /// Encodes the frame masked with a fresh random key.
    pub fn encode(&self) -> Result<Vec<u8>, WsError> {
        let mut key = [0u8; 4];
        rand::thread_rng().fill_bytes(&mut key);
        self.encode_with_key(key)
    }

    pub(crate) fn encode_with_key(&self, mask_key: [u8; 4]) -> Result<Vec<u8>, WsError> {
        let len = self.payload.len();
        if len > MAX_PAYLOAD {
            return Err(WsError::UnsupportedPayload(len));
        }

        let mut out = Vec::with_capacity(MAX_HEADER + len);
        let mut b0 = self.opcode & 0x0F;
        if self.fin {
            b0 |= FIN_BIT;
        }
        out.push(b0);

        if len <= 125 {
            out.push(MASK_BIT | len as u8);
        } else if len <= u16::MAX as usize {
            out.push(MASK_BIT | LEN_U16);
            put_u16_be(&mut out, len as u16);
        } else {
            out.push(MASK_BIT | LEN_U64);
            put_u64_be(&mut out, len as u64);
        }

        out.extend_from_slice(&mask_key);
        out.extend(
            self.payload
                .iter()
                .enumerate()
                .map(|(i, b)| b ^ mask_key[i % 4]),
        );
        Ok(out)
    }

    /// Decodes one frame from the front of `buf`, returning it with the
    /// number of bytes consumed. [`WsError::FrameTooShort`] means the buffer
    /// ends before the declared layout; no read ever goes out of bounds.
    pub fn decode(buf: &[u8]) -> Result<(Self, usize), WsError> {
        let mut r = WireReader::new(buf);
        let b0 = r.read_u8().map_err(|_| WsError::FrameTooShort)?;
        let b1 = r.read_u8().map_err(|_| WsError::FrameTooShort)?;

        let masked = b1 & MASK_BIT != 0;
        let payload_len: u64 = match b1 & 0x7F {
            LEN_U16 => r.read_u16_be().map_err(|_| WsError::FrameTooShort)? as u64,
            LEN_U64 => r.read_u64_be().map_err(|_| WsError::FrameTooShort)?,
            n => n as u64,
        };

        let mask_key: Option<[u8; 4]> = if masked {
            let k = r.read_bytes(4).map_err(|_| WsError::FrameTooShort)?;
            Some([k[0], k[1], k[2], k[3]])
        } else {
            None
        };

        if payload_len > r.remaining() as u64 {
            return Err(WsError::FrameTooShort);
        }
        if payload_len > MAX_PAYLOAD as u64 {
            return Err(WsError::UnsupportedPayload(payload_len as usize));
        }
        let mut payload = r
            .read_bytes(payload_len as usize)
            .map_err(|_| WsError::FrameTooShort)?
            .to_vec();
        if let Some(key) = mask_key {
            for (i, b) in payload.iter_mut().enumerate() {
                *b ^= key[i % 4];
            }
        }

        Ok((
            Self {
                fin: b0 & FIN_BIT != 0,
                opcode: b0 & 0x0F,
                payload,
            },
            r.position(),
        ))
    }
}

/// Total on-wire size of the frame at the front of `buf`, when the whole
/// frame is present. Used to step over frames that decode refuses.
pub(crate) fn frame_span(buf: &[u8]) -> Option<usize> {
    let mut r = WireReader::new(buf);
    r.read_u8().ok()?;
    let b1 = r.read_u8().ok()?;
    let payload_len: u64 = match b1 & 0x7F {
        LEN_U16 => r.read_u16_be().ok()? as u64,
        LEN_U64 => r.read_u64_be().ok()?,
        n => n as u64,
    };
    if b1 & MASK_BIT != 0 {
        r.skip(4).ok()?;
    }
    if payload_len > r.remaining() as u64 {
        return None;
    }
    Some(r.position() + payload_len as usize)
}
