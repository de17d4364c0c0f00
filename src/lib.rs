//! # rurl
//!
//! HTTP and WebSocket client built directly on TCP/TLS sockets, with its
//! own DNS resolution. No HTTP or DNS library underneath.
//!
//! ## Features
//!
//! - DNS wire codec and resolver (A/AAAA over UDP, transaction-id checked)
//! - HTTP/1.1 requests and responses (Content-Length, chunked and
//!   close-delimited bodies)
//! - WebSocket handshake, frame codec and interactive sessions (RFC 6455)
//! - Resolved-IP caching on disk
//!
//! ## Example
//!
//! ```ignore
//! use rurl::{
//!     conn::{Connector, Target, TrustRoots},
//!     dns::{Resolver, DEFAULT_DNS_SERVER},
//!     http::{Request, Response},
//! };
//!
//! #[tokio::main]
//! async fn main() -> rurl::Result<()> {
//!     let labels: Vec<String> = ["example", "com"].map(String::from).into();
//!     let ip = Resolver::new(DEFAULT_DNS_SERVER.into()).resolve(&labels).await?;
//!
//!     let target = Target { ip, port: 443, use_tls: true, host: "example.com".into() };
//!     let connector = Connector::new(TrustRoots::WebPki)?;
//!     let mut conn = connector.connect(&target).await?;
//!
//!     let request = Request::new("GET", "example.com", "/");
//!     let raw = connector.dispatch(&mut conn, &request.encode()).await?;
//!     let response = Response::parse(&raw)?;
//!     println!("{}", response.status_code);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod conn;
pub mod dns;
pub mod error;
pub mod http;
pub mod output;
pub mod target;
pub mod wire;
pub mod ws;

pub use cache::{Cache, FileCache, IpCache, MemoryCache};
pub use conn::{Connector, MaybeTlsStream, Target, TrustRoots};
pub use dns::{Resolver, DEFAULT_DNS_SERVER};
pub use error::{Error, Result};
pub use http::{Request, Response};
pub use target::{parse_target, ParsedTarget, Protocol};
