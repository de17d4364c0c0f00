//! TCP/TLS dialing and the request/response round trip.

mod stream;

pub use stream::MaybeTlsStream;

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;
use tracing::debug;

use crate::error::{ConnError, Result};
use crate::http::read_response;

/// Default bound on dialing plus each HTTP read and write.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// One resolved destination: where to dial and how to name the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub ip: IpAddr,
    pub port: u16,
    pub use_tls: bool,
    /// Hostname for SNI and the Host header. For IP-literal targets this is
    /// the literal itself.
    pub host: String,
}

impl Target {
    pub fn addr(&self) -> (IpAddr, u16) {
        (self.ip, self.port)
    }
}

/// Which certificates to trust when dialing TLS.
#[derive(Debug, Clone, Default)]
pub enum TrustRoots {
    /// The bundled webpki root set.
    #[default]
    WebPki,
    /// The webpki roots plus every certificate in a PEM bundle.
    WebPkiPlusPem(PathBuf),
}

impl TrustRoots {
    fn cert_store(&self) -> Result<RootCertStore> {
        let mut roots = RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        if let TrustRoots::WebPkiPlusPem(path) = self {
            let pem = std::fs::read(path)
                .with_context(|| format!("reading trust bundle {}", path.display()))?;
            for cert in rustls_pemfile::certs(&mut pem.as_slice()) {
                let cert = cert.with_context(|| format!("parsing {}", path.display()))?;
                roots
                    .add(cert)
                    .with_context(|| format!("adding root from {}", path.display()))?;
            }
        }
        Ok(roots)
    }
}

/// Dials targets and runs single HTTP exchanges. Built once per invocation;
/// trust configuration is fixed at construction.
pub struct Connector {
    timeout: Duration,
    tls: TlsConnector,
}

impl Connector {
    pub fn new(trust: TrustRoots) -> Result<Self> {
        Self::with_timeout(trust, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(trust: TrustRoots, timeout: Duration) -> Result<Self> {
        let config = ClientConfig::builder()
            .with_root_certificates(trust.cert_store()?)
            .with_no_client_auth();
        Ok(Self {
            timeout,
            tls: TlsConnector::from(Arc::new(config)),
        })
    }

    /// Dials the target, wrapping in TLS when the scheme demands it. The
    /// whole dial (TCP connect plus TLS handshake) is bounded by the
    /// configured deadline.
    pub async fn connect(&self, target: &Target) -> Result<MaybeTlsStream<TcpStream>> {
        let dial = async {
            let tcp = TcpStream::connect(target.addr())
                .await
                .map_err(|e| ConnError::Dial(format!("{}:{}: {e}", target.ip, target.port)))?;
            debug!(ip = %target.ip, port = target.port, tls = target.use_tls, "connected");

            if !target.use_tls {
                return Ok(MaybeTlsStream::Plain(tcp));
            }
            let name = ServerName::try_from(target.host.clone())
                .map_err(|_| ConnError::Dial(format!("invalid server name {:?}", target.host)))?;
            let tls = self
                .tls
                .connect(name, tcp)
                .await
                .map_err(|e| ConnError::Dial(format!("tls handshake with {}: {e}", target.host)))?;
            Ok(MaybeTlsStream::Tls(Box::new(tls)))
        };

        tokio::time::timeout(self.timeout, dial)
            .await
            .map_err(|_| ConnError::IoTimeout)?
    }

    /// Writes a full request and reads one response. The write and every
    /// read are individually bounded by the deadline.
    pub async fn dispatch(
        &self,
        conn: &mut MaybeTlsStream<TcpStream>,
        request: &[u8],
    ) -> Result<Vec<u8>> {
        tokio::time::timeout(self.timeout, async {
            conn.write_all(request).await?;
            conn.flush().await
        })
        .await
        .map_err(|_| ConnError::IoTimeout)?
        .map_err(ConnError::Io)?;

        read_response(conn, Some(self.timeout)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn plain_dispatch_round_trip() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut req = vec![0u8; 4096];
            let n = sock.read(&mut req).await.unwrap();
            assert!(req[..n].starts_with(b"GET / HTTP/1.1\r\n"));
            sock.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok")
                .await
                .unwrap();
        });

        let target = Target {
            ip: addr.ip(),
            port: addr.port(),
            use_tls: false,
            host: "localhost".to_string(),
        };
        let connector = Connector::new(TrustRoots::WebPki).unwrap();
        let mut conn = connector.connect(&target).await.unwrap();
        let raw = connector
            .dispatch(&mut conn, b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();

        assert!(raw.ends_with(b"ok"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn dial_failure_is_reported_not_fatal() {
        // Port 1 on loopback is essentially never listening.
        let target = Target {
            ip: "127.0.0.1".parse().unwrap(),
            port: 1,
            use_tls: false,
            host: "localhost".to_string(),
        };
        let connector =
            Connector::with_timeout(TrustRoots::WebPki, Duration::from_secs(2)).unwrap();
        let err = connector.connect(&target).await.unwrap_err();
        match err {
            crate::error::Error::Conn(ConnError::Dial(msg)) => assert!(msg.contains("127.0.0.1")),
            crate::error::Error::Conn(ConnError::IoTimeout) => {}
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn slow_server_hits_the_deadline() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (sock, _) = listener.accept().await.unwrap();
            // Never respond; hold the socket open.
            tokio::time::sleep(Duration::from_secs(60)).await;
            drop(sock);
        });

        let target = Target {
            ip: addr.ip(),
            port: addr.port(),
            use_tls: false,
            host: "localhost".to_string(),
        };
        let connector =
            Connector::with_timeout(TrustRoots::WebPki, Duration::from_millis(100)).unwrap();
        let mut conn = connector.connect(&target).await.unwrap();
        let err = connector
            .dispatch(&mut conn, b"GET / HTTP/1.1\r\n\r\n")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Conn(ConnError::IoTimeout)
        ));
    }
}
