//! Chunked transfer-encoding: hex size line + CRLF per chunk, a zero-size
//! chunk and an empty trailer line at the end.

use crate::error::HttpError;

use super::find;

/// Walks the chunk framing. `out` collects de-chunked payload when present.
/// Returns `Ok(false)` while the body is syntactically valid but not yet
/// complete, `Ok(true)` once the terminating chunk has fully arrived.
fn walk(body: &[u8], mut out: Option<&mut Vec<u8>>) -> Result<bool, HttpError> {
    let mut pos = 0;
    loop {
        let rel = match find(&body[pos..], b"\r\n") {
            Some(i) => i,
            None => return Ok(false),
        };
        let line = &body[pos..pos + rel];
        // chunk extensions after ';' are ignored
        let size_part = match line.iter().position(|&b| b == b';') {
            Some(i) => &line[..i],
            None => line,
        };
        let size_str = std::str::from_utf8(size_part)
            .map_err(|_| HttpError::InvalidChunk("chunk size is not ascii"))?
            .trim();
        let size = usize::from_str_radix(size_str, 16)
            .map_err(|_| HttpError::InvalidChunk("chunk size is not hex"))?;
        pos += rel + 2;

        if size == 0 {
            // trailer lines until the final empty one
            loop {
                match find(&body[pos..], b"\r\n") {
                    None => return Ok(false),
                    Some(0) => return Ok(true),
                    Some(i) => pos += i + 2,
                }
            }
        }

        // size is server-controlled; the end offset must not wrap
        let end = pos
            .checked_add(size)
            .and_then(|e| e.checked_add(2))
            .ok_or(HttpError::InvalidChunk("chunk size overflows"))?;
        if body.len() < end {
            return Ok(false);
        }
        if &body[end - 2..end] != b"\r\n" {
            return Err(HttpError::InvalidChunk("chunk data not CRLF-terminated"));
        }
        if let Some(out) = out.as_deref_mut() {
            out.extend_from_slice(&body[pos..end - 2]);
        }
        pos = end;
    }
}

/// Whether all chunks including the zero-size terminator have arrived.
pub(crate) fn is_complete(body: &[u8]) -> Result<bool, HttpError> {
    walk(body, None)
}

/// De-chunks a complete chunked body into the plain payload.
pub(crate) fn decode(body: &[u8]) -> Result<Vec<u8>, HttpError> {
    let mut out = Vec::with_capacity(body.len());
    if walk(body, Some(&mut out))? {
        Ok(out)
    } else {
        Err(HttpError::InvalidChunk("body ends before the zero chunk"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_multi_chunk() {
        let body = b"4\r\nWiki\r\n5\r\npedia\r\n0\r\n\r\n";
        assert_eq!(decode(body).unwrap(), b"Wikipedia");
        assert!(is_complete(body).unwrap());
    }

    #[test]
    fn incomplete_at_every_split_point() {
        let body = b"4\r\nWiki\r\nB\r\n in chunks.\r\n0\r\n\r\n";
        for split in 0..body.len() {
            assert!(!is_complete(&body[..split]).unwrap(), "split {split}");
        }
        assert!(is_complete(body).unwrap());
        assert_eq!(decode(body).unwrap(), b"Wiki in chunks.");
    }

    #[test]
    fn extensions_and_trailers() {
        let body = b"5;ext=1\r\nhello\r\n0\r\nExpires: never\r\n\r\n";
        assert_eq!(decode(body).unwrap(), b"hello");
    }

    #[test]
    fn bad_size_rejected() {
        assert!(matches!(
            decode(b"zz\r\nhello\r\n0\r\n\r\n"),
            Err(HttpError::InvalidChunk(_))
        ));
    }

    #[test]
    fn huge_chunk_size_rejected_without_panic() {
        // usize::MAX as the declared size must error, not wrap the offsets
        let body = b"ffffffffffffffff\r\nx\r\n0\r\n\r\n";
        assert!(matches!(
            decode(body),
            Err(HttpError::InvalidChunk("chunk size overflows"))
        ));
        assert!(matches!(is_complete(body), Err(HttpError::InvalidChunk(_))));
    }

    #[test]
    fn missing_chunk_terminator_rejected() {
        assert!(matches!(
            decode(b"5\r\nhelloXX0\r\n\r\n"),
            Err(HttpError::InvalidChunk(_))
        ));
    }

    #[test]
    fn non_json_payload_survives() {
        // the old heuristic (scan for '{', drop one trailing byte) would
        // mangle this payload
        let body = b"3\r\nabc\r\n3\r\nde0\r\n0\r\n\r\n";
        assert_eq!(decode(body).unwrap(), b"abcde0");
    }
}
