//! Live connection: upgrade, split reader/writer halves and the interactive
//! pump that couples an input stream to the socket.

use bytes::BytesMut;
use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader, ReadHalf,
    WriteHalf,
};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::{ConnError, Result, WsError};

/// Upper bound on the handshake response head. A real one fits in a single
/// read; anything this large is not a WebSocket endpoint.
const MAX_RESPONSE_HEAD: usize = 16 * 1024;
use crate::ws::frame::{Frame, MAX_HEADER, MAX_PAYLOAD, OPCODE_BINARY, OPCODE_CLOSE, OPCODE_TEXT};
use crate::ws::handshake::{is_switching_protocols, Handshake};

/// Frame-at-a-time reader over the receive half of an upgraded socket.
///
/// Bytes are accumulated until a whole frame can be decoded, so frames split
/// across TCP segments and multiple frames per segment both work.
#[derive(Debug)]
pub struct WsReader<R> {
    half: R,
    buf: BytesMut,
}

impl<R: AsyncRead + Unpin> WsReader<R> {
    pub fn new(half: R) -> Self {
        Self {
            half,
            buf: BytesMut::new(),
        }
    }

    /// Next complete frame, or `None` on a clean end of stream. EOF in the
    /// middle of a frame is an error.
    pub async fn next_frame(&mut self) -> Result<Option<Frame>> {
        loop {
            if !self.buf.is_empty() {
                match Frame::decode(&self.buf) {
                    Ok((frame, consumed)) => {
                        let _ = self.buf.split_to(consumed);
                        return Ok(Some(frame));
                    }
                    Err(WsError::FrameTooShort) => {
                        // A valid frame never needs more than the cap plus
                        // its header, so a buffer past that is not a frame.
                        if self.buf.len() > MAX_PAYLOAD + MAX_HEADER {
                            return Err(WsError::UnsupportedPayload(self.buf.len()).into());
                        }
                    }
                    Err(WsError::UnsupportedPayload(n)) => {
                        // The frame is fully buffered, just too big. Step over
                        // it and keep the session alive.
                        match crate::ws::frame::frame_span(&self.buf) {
                            Some(span) => {
                                warn!(bytes = n, "skipping oversize frame");
                                let _ = self.buf.split_to(span);
                                continue;
                            }
                            None => return Err(WsError::UnsupportedPayload(n).into()),
                        }
                    }
                    Err(e) => return Err(e.into()),
                }
            }

            let mut chunk = [0u8; 4096];
            let n = self.half.read(&mut chunk).await.map_err(ConnError::Io)?;
            if n == 0 {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                return Err(ConnError::UnexpectedEof.into());
            }
            self.buf.extend_from_slice(&chunk[..n]);
        }
    }
}

/// Send half of an upgraded socket. Every frame goes out masked with a fresh
/// key.
#[derive(Debug)]
pub struct WsWriter<W> {
    half: W,
}

impl<W: AsyncWrite + Unpin> WsWriter<W> {
    pub fn new(half: W) -> Self {
        Self { half }
    }

    pub async fn send(&mut self, frame: &Frame) -> Result<()> {
        let encoded = frame.encode()?;
        self.half.write_all(&encoded).await.map_err(ConnError::Io)?;
        self.half.flush().await.map_err(ConnError::Io)?;
        Ok(())
    }

    pub async fn send_text(&mut self, msg: &str) -> Result<()> {
        self.send(&Frame::text(msg)).await
    }
}

/// Performs the opening handshake on `stream` and splits it into framed
/// halves. Returns the halves plus the raw response head for display.
///
/// Bytes the server sent past the end of its response head are already frame
/// data and are seeded into the reader's buffer.
pub async fn upgrade<S: AsyncRead + AsyncWrite + Unpin>(
    mut stream: S,
    host: &str,
    path: &str,
) -> Result<(WsReader<ReadHalf<S>>, WsWriter<WriteHalf<S>>, String)> {
    let hs = Handshake::new(host, path);
    stream
        .write_all(&hs.request())
        .await
        .map_err(ConnError::Io)?;
    stream.flush().await.map_err(ConnError::Io)?;

    let mut acc: Vec<u8> = Vec::new();
    let head_end = loop {
        if let Some(pos) = crate::http::find(&acc, b"\r\n\r\n") {
            break pos + 4;
        }
        let mut chunk = [0u8; 4096];
        let n = stream.read(&mut chunk).await.map_err(ConnError::Io)?;
        if n == 0 {
            return Err(ConnError::UnexpectedEof.into());
        }
        acc.extend_from_slice(&chunk[..n]);
        if acc.len() > MAX_RESPONSE_HEAD {
            return Err(WsError::HandshakeRejected("response head too large".into()).into());
        }
    };

    let head = String::from_utf8_lossy(&acc[..head_end]).into_owned();
    if !is_switching_protocols(&head) {
        let status = head.split("\r\n").next().unwrap_or("").to_string();
        return Err(WsError::HandshakeRejected(status).into());
    }
    hs.verify(&head)?;

    let leftover = acc[head_end..].to_vec();
    let (read_half, write_half) = tokio::io::split(stream);
    let mut reader = WsReader::new(read_half);
    reader.buf.extend_from_slice(&leftover);
    Ok((reader, WsWriter::new(write_half), head))
}

/// Pumps lines from `input` to the socket and inbound messages to the
/// callbacks until either side closes. A transport or decode failure on the
/// receive side ends the session and is returned to the caller.
///
/// The receive side runs as its own task; when it sees a close frame, an
/// error or EOF it flips the watch channel and the send loop stops waiting
/// on input. A close frame is sent on the way out regardless of which side
/// initiated.
pub async fn run_session<S, I>(
    mut reader: WsReader<ReadHalf<S>>,
    mut writer: WsWriter<WriteHalf<S>>,
    input: I,
    on_message: impl Fn(String) + Send + 'static,
    on_sent: impl Fn(&str),
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    I: AsyncRead + Unpin,
{
    let (stop_tx, mut stop_rx) = watch::channel(false);

    let receiver = tokio::spawn(async move {
        let outcome = loop {
            match reader.next_frame().await {
                Ok(Some(frame)) => match frame.opcode {
                    OPCODE_TEXT | OPCODE_BINARY => {
                        on_message(String::from_utf8_lossy(&frame.payload).into_owned());
                    }
                    OPCODE_CLOSE => {
                        debug!("close frame received");
                        break Ok(());
                    }
                    other => debug!(opcode = other, "ignoring control frame"),
                },
                Ok(None) => {
                    debug!("connection closed by peer");
                    break Ok(());
                }
                Err(e) => {
                    warn!("read failed: {e}");
                    break Err(e);
                }
            }
        };
        let _ = stop_tx.send(true);
        outcome
    });

    let mut lines = BufReader::new(input).lines();
    loop {
        tokio::select! {
            _ = stop_rx.changed() => break,
            line = lines.next_line() => match line.map_err(ConnError::Io)? {
                Some(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    writer.send_text(line).await?;
                    on_sent(line);
                }
                None => {
                    // Input drained; stay connected until the peer closes.
                    let _ = stop_rx.changed().await;
                    break;
                }
            },
        }
    }

    let _ = writer.send(&Frame::close()).await;

    // The stop signal only flips once the receiver is done, so this join
    // is immediate. Its terminal error is the session's result.
    match receiver.await {
        Ok(outcome) => outcome,
        Err(e) => Err(ConnError::Io(std::io::Error::other(e)).into()),
    }
}
