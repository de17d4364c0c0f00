//! Async UDP resolver with a single A to AAAA fallback.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use tokio::net::UdpSocket;
use tracing::debug;

use crate::error::{ConnError, DnsError, Error};
use crate::Result;

use super::parser::parse_answer;
use super::{Query, RecordType};

/// Fixed recursive resolver the queries go to by default.
pub const DEFAULT_DNS_SERVER: ([u8; 4], u16) = ([8, 8, 8, 8], 53);

/// Responses share the request layout plus one answer record; 256 bytes
/// is plenty for a single A or AAAA answer.
const RESPONSE_BUF_SIZE: usize = 256;

/// Resolves domain labels to an IP over raw UDP.
pub struct Resolver {
    server: SocketAddr,
    timeout: Duration,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(DEFAULT_DNS_SERVER.into())
    }
}

impl Resolver {
    pub fn new(server: SocketAddr) -> Self {
        Self {
            server,
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolves the domain, asking for an A record first and retrying once
    /// with AAAA when the resolver has no A answer. Any other failure is
    /// fatal to the attempt.
    pub async fn resolve(&self, labels: &[String]) -> Result<IpAddr> {
        match self.attempt(labels, RecordType::A).await {
            Err(Error::Dns(DnsError::NoAnswer)) => {
                debug!("no A answer, retrying with AAAA");
                self.attempt(labels, RecordType::Aaaa).await
            }
            other => other,
        }
    }

    async fn attempt(&self, labels: &[String], rtype: RecordType) -> Result<IpAddr> {
        let query = Query::new(labels, rtype)?;

        let socket = UdpSocket::bind("0.0.0.0:0").await.map_err(ConnError::Io)?;
        socket.connect(self.server).await.map_err(ConnError::Io)?;
        socket.send(&query.encode()).await.map_err(ConnError::Io)?;

        let mut buf = [0u8; RESPONSE_BUF_SIZE];
        let n = tokio::time::timeout(self.timeout, socket.recv(&mut buf))
            .await
            .map_err(|_| ConnError::IoTimeout)?
            .map_err(ConnError::Io)?;

        let ip = parse_answer(&buf[..n], query.id, rtype)?;
        debug!(%ip, ?rtype, "resolved");
        Ok(ip)
    }
}
