//! Streaming response reader.
//!
//! HTTP/1.1 keeps connections alive by default, so the end of a response is
//! signalled one of three ways: a `Content-Length` header, chunked
//! transfer-encoding, or the server closing the connection. The reader
//! classifies the response once the header block has arrived and then reads
//! until that mode's completion condition.

use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::trace;

use crate::error::{ConnError, HttpError};
use crate::Result;

use super::{chunked, find};

const READ_BUF_SIZE: usize = 4096;

enum Mode {
    /// Header block not complete yet.
    Unknown,
    /// Read until EOF.
    Close,
    /// Read until the whole message reaches `total` bytes.
    Length { total: usize },
    /// Read until the zero-size chunk has arrived.
    Chunked { body_start: usize },
}

/// Reads one full response from `conn`, returning the raw bytes exactly as
/// received. Each read is bounded by `deadline` when one is given; a missed
/// deadline is fatal, never retried.
pub async fn read_response<S>(conn: &mut S, deadline: Option<Duration>) -> Result<Vec<u8>>
where
    S: AsyncRead + Unpin,
{
    let mut acc = BytesMut::with_capacity(READ_BUF_SIZE);
    let mut buf = [0u8; READ_BUF_SIZE];
    let mut mode = Mode::Unknown;

    loop {
        let n = match deadline {
            Some(d) => tokio::time::timeout(d, conn.read(&mut buf))
                .await
                .map_err(|_| ConnError::IoTimeout)?,
            None => conn.read(&mut buf).await,
        }
        .map_err(ConnError::Io)?;

        if n == 0 {
            return match mode {
                Mode::Close => Ok(acc.to_vec()),
                Mode::Length { total } if acc.len() >= total => Ok(acc.to_vec()),
                // headers incomplete, declared length unmet, or chunked
                // terminator never seen
                _ => Err(ConnError::UnexpectedEof.into()),
            };
        }
        acc.extend_from_slice(&buf[..n]);
        trace!(read = n, total = acc.len(), "response bytes");

        if let Mode::Unknown = mode {
            if let Some(header_end) = find(&acc, b"\r\n\r\n") {
                mode = classify(&acc[..header_end + 4], header_end + 4)?;
            }
        }

        match mode {
            Mode::Length { total } if acc.len() >= total => return Ok(acc[..total].to_vec()),
            Mode::Chunked { body_start } if acc.len() > body_start => {
                if chunked::is_complete(&acc[body_start..])? {
                    return Ok(acc.to_vec());
                }
            }
            _ => {}
        }
    }
}

/// Picks the termination mode from the completed header block.
fn classify(header_block: &[u8], body_start: usize) -> Result<Mode> {
    if let Some(len) = content_length(header_block)? {
        // declared by the server; an absurd value must not wrap the total
        let total = body_start
            .checked_add(len)
            .ok_or(HttpError::MalformedResponse("Content-Length overflows"))?;
        return Ok(Mode::Length { total });
    }
    if find(header_block, b"chunked").is_some() {
        return Ok(Mode::Chunked { body_start });
    }
    Ok(Mode::Close)
}

/// Value of a `Content-Length` header, when present.
fn content_length(header_block: &[u8]) -> Result<Option<usize>> {
    let head = std::str::from_utf8(header_block)
        .map_err(|_| HttpError::MalformedResponse("header block is not utf-8"))?;
    for line in head.split("\r\n") {
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                let len = value
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| HttpError::MalformedResponse("invalid Content-Length"))?;
                return Ok(Some(len));
            }
        }
    }
    Ok(None)
}
