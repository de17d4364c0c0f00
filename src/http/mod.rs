//! HTTP/1.1 message layer: request serialization, a streaming response
//! reader that understands the three body-termination modes, and a parser
//! for the raw response bytes.

mod chunked;
mod reader;
mod request;
mod response;

pub use reader::read_response;
pub use request::{Body, Request, USER_AGENT};
pub use response::Response;

use crate::error::HttpError;

/// Methods the request builder accepts.
pub const VALID_METHODS: [&str; 5] = ["GET", "POST", "PUT", "PATCH", "DELETE"];

/// Normalizes and validates a method string.
pub fn parse_method(raw: &str) -> Result<String, HttpError> {
    let method = raw.trim().to_ascii_uppercase();
    if VALID_METHODS.contains(&method.as_str()) {
        Ok(method)
    } else {
        Err(HttpError::InvalidMethod(raw.to_string()))
    }
}

/// First occurrence of `needle` in `haystack`.
pub(crate) fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_parsing() {
        assert_eq!(parse_method(" get ").unwrap(), "GET");
        assert_eq!(parse_method("Delete").unwrap(), "DELETE");
        assert!(matches!(
            parse_method("YEET"),
            Err(HttpError::InvalidMethod(_))
        ));
    }
}
