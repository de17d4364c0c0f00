use thiserror::Error;

/// Library result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving, connecting or speaking a protocol.
#[derive(Error, Debug)]
pub enum Error {
    #[error("dns: {0}")]
    Dns(#[from] DnsError),

    #[error("connection: {0}")]
    Conn(#[from] ConnError),

    #[error("http: {0}")]
    Http(#[from] HttpError),

    #[error("websocket: {0}")]
    Ws(#[from] WsError),

    #[error("ip cache: {0}")]
    Cache(#[from] CacheError),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// DNS resolution errors.
#[derive(Error, Debug)]
pub enum DnsError {
    #[error("invalid domain: {0}")]
    InvalidDomain(String),

    #[error("resolver returned no answer for A or AAAA")]
    NoAnswer,

    #[error("malformed response: {0}")]
    MalformedResponse(&'static str),
}

/// Transport-level errors (dial, deadlines, unexpected close).
#[derive(Error, Debug)]
pub enum ConnError {
    #[error("dial failed: {0}")]
    Dial(String),

    #[error("i/o deadline exceeded")]
    IoTimeout,

    #[error("connection closed before the message was complete")]
    UnexpectedEof,

    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP message errors.
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("invalid method: {0}")]
    InvalidMethod(String),

    #[error("malformed response: {0}")]
    MalformedResponse(&'static str),

    #[error("invalid chunked encoding: {0}")]
    InvalidChunk(&'static str),
}

/// WebSocket protocol errors.
#[derive(Error, Debug)]
pub enum WsError {
    #[error("frame shorter than its declared layout")]
    FrameTooShort,

    #[error("payload of {0} bytes exceeds the frame size limit")]
    UnsupportedPayload(usize),

    #[error("server rejected the upgrade: {0}")]
    HandshakeRejected(String),

    #[error("response carries no Sec-WebSocket-Accept header")]
    MissingAccept,

    #[error("Sec-WebSocket-Accept does not match the client key")]
    AcceptMismatch,
}

/// IP cache errors. A plain miss is `Ok(None)` from the cache, not an error.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cached entry is not an ip literal: {0}")]
    Corrupt(String),

    #[error("cache i/o: {0}")]
    Io(#[from] std::io::Error),
}
