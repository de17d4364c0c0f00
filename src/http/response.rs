//! Splits raw response bytes into status line, headers and body.

use crate::error::HttpError;
use crate::Result;

use super::{chunked, find};

/// A parsed HTTP/1.1 response. Headers keep their wire order.
#[derive(Clone, Debug)]
pub struct Response {
    pub version: String,
    pub status_code: u16,
    pub status_message: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    /// Parses the raw bytes of one complete response. Chunked bodies are
    /// de-chunked by walking the chunk-size framing.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let header_end = find(raw, b"\r\n\r\n")
            .ok_or(HttpError::MalformedResponse("missing header terminator"))?;
        let head = std::str::from_utf8(&raw[..header_end])
            .map_err(|_| HttpError::MalformedResponse("header block is not utf-8"))?;

        let mut lines = head.split("\r\n");
        let status_line = lines
            .next()
            .ok_or(HttpError::MalformedResponse("empty response"))?;
        let mut parts = status_line.splitn(3, ' ');
        let version = parts
            .next()
            .ok_or(HttpError::MalformedResponse("missing version"))?
            .to_string();
        let status_code = parts
            .next()
            .ok_or(HttpError::MalformedResponse("missing status code"))?
            .parse::<u16>()
            .map_err(|_| HttpError::MalformedResponse("status code is not a number"))?;
        let status_message = parts.next().unwrap_or("").to_string();

        let mut headers = Vec::new();
        for line in lines {
            let (name, value) = line
                .split_once(':')
                .ok_or(HttpError::MalformedResponse("header line without colon"))?;
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }

        let raw_body = &raw[header_end + 4..];
        let is_chunked = headers.iter().any(|(name, value)| {
            name.eq_ignore_ascii_case("transfer-encoding") && value.contains("chunked")
        });
        let body = if is_chunked {
            chunked::decode(raw_body)?
        } else {
            raw_body.to_vec()
        };

        Ok(Self {
            version,
            status_code,
            status_message,
            headers,
            body,
        })
    }

    /// First header with the given name, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
