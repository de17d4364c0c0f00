//! Request-line and header serialization.

/// Sent on every request.
pub const USER_AGENT: &str = concat!("rurl/", env!("CARGO_PKG_VERSION"));

/// Request body with its declared content type.
#[derive(Clone, Debug)]
pub struct Body {
    pub content_type: String,
    pub data: Vec<u8>,
}

/// One HTTP/1.1 request. Built once, serialized by [`Request::encode`].
#[derive(Clone, Debug)]
pub struct Request {
    method: String,
    host: String,
    path: String,
    cookie: Option<String>,
    body: Option<Body>,
}

impl Request {
    pub fn new(
        method: impl Into<String>,
        host: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            method: method.into(),
            host: host.into(),
            path: path.into(),
            cookie: None,
            body: None,
        }
    }

    /// Attaches a `Cookie` header. Empty strings are ignored.
    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        let cookie = cookie.into();
        if !cookie.is_empty() {
            self.cookie = Some(cookie);
        }
        self
    }

    /// Attaches a body; `Content-Type` and `Content-Length` are emitted
    /// only when one is present.
    pub fn with_body(mut self, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        self.body = Some(Body {
            content_type: content_type.into(),
            data,
        });
        self
    }

    /// Serializes request line, headers, blank line and body bytes verbatim.
    /// The body is never chunk-encoded.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = String::with_capacity(128);
        out.push_str(&self.method);
        out.push(' ');
        out.push_str(&self.path);
        out.push_str(" HTTP/1.1\r\n");
        out.push_str("Host: ");
        out.push_str(&self.host);
        out.push_str("\r\n");
        out.push_str("User-Agent: ");
        out.push_str(USER_AGENT);
        out.push_str("\r\n");
        out.push_str("Accept: */*\r\n");
        if let Some(cookie) = &self.cookie {
            out.push_str("Cookie: ");
            out.push_str(cookie);
            out.push_str("\r\n");
        }
        if let Some(body) = &self.body {
            out.push_str("Content-Type: ");
            out.push_str(&body.content_type);
            out.push_str("\r\n");
            out.push_str(&format!("Content-Length: {}\r\n", body.data.len()));
        }
        out.push_str("\r\n");

        let mut bytes = out.into_bytes();
        if let Some(body) = &self.body {
            bytes.extend_from_slice(&body.data);
        }
        bytes
    }
}
