//! End-to-end runs against a local TCP server: full HTTP exchange and a
//! WebSocket upgrade plus message exchange, through the public API only.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use sha1::{Digest, Sha1};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use rurl::conn::{Connector, Target, TrustRoots};
use rurl::http::{Request, Response};
use rurl::target::parse_target;
use rurl::ws;

async fn local_target(listener: &TcpListener) -> Target {
    let addr = listener.local_addr().unwrap();
    Target {
        ip: addr.ip(),
        port: addr.port(),
        use_tls: false,
        host: "localhost".to_string(),
    }
}

#[tokio::test]
async fn http_exchange_end_to_end() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let target = local_target(&listener).await;

    let server = tokio::spawn(async move {
        let (mut sock, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 8192];
        let n = sock.read(&mut buf).await.unwrap();
        let req = String::from_utf8_lossy(&buf[..n]).into_owned();

        sock.write_all(
            b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\
              Transfer-Encoding: chunked\r\n\r\n\
              7\r\n{\"ok\":t\r\n4\r\nrue}\r\n0\r\n\r\n",
        )
        .await
        .unwrap();
        req
    });

    let request = Request::new("POST", "localhost", "/check")
        .with_cookie("session=abc")
        .with_body("application/json", b"{\"ping\":1}".to_vec());

    let connector = Connector::with_timeout(TrustRoots::WebPki, Duration::from_secs(5)).unwrap();
    let mut conn = connector.connect(&target).await.unwrap();
    let raw = connector.dispatch(&mut conn, &request.encode()).await.unwrap();

    let response = Response::parse(&raw).unwrap();
    assert_eq!(response.status_code, 200);
    assert_eq!(response.header("content-type"), Some("application/json"));
    assert_eq!(response.body, b"{\"ok\":true}");

    let seen = server.await.unwrap();
    assert!(seen.starts_with("POST /check HTTP/1.1\r\n"));
    assert!(seen.contains("Cookie: session=abc\r\n"));
    assert!(seen.contains("Content-Length: 10\r\n"));
    assert!(seen.ends_with("{\"ping\":1}"));
}

#[tokio::test]
async fn websocket_upgrade_and_echo_end_to_end() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let target = local_target(&listener).await;

    let server = tokio::spawn(async move {
        let (mut sock, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 8192];
        let n = sock.read(&mut buf).await.unwrap();
        let req = String::from_utf8_lossy(&buf[..n]).into_owned();
        let key = req
            .split("\r\n")
            .find_map(|l| l.strip_prefix("Sec-WebSocket-Key: "))
            .expect("client key")
            .to_string();

        let mut hasher = Sha1::new();
        hasher.update(key.as_bytes());
        hasher.update(ws::ACCEPT_GUID.as_bytes());
        let accept = BASE64.encode(hasher.finalize());

        sock.write_all(
            format!(
                "HTTP/1.1 101 Switching Protocols\r\nUpgrade: websocket\r\n\
                 Connection: Upgrade\r\nSec-WebSocket-Accept: {accept}\r\n\r\n"
            )
            .as_bytes(),
        )
        .await
        .unwrap();

        // One masked frame from the client; echo its payload unmasked.
        let n = sock.read(&mut buf).await.unwrap();
        let (frame, _) = ws::Frame::decode(&buf[..n]).unwrap();
        let mut echo = vec![0x81, frame.payload.len() as u8];
        echo.extend_from_slice(&frame.payload);
        sock.write_all(&echo).await.unwrap();
        frame
    });

    let parsed = parse_target(&format!("ws://localhost:{}/echo", target.port)).unwrap();
    assert_eq!(parsed.path, "/echo");
    assert!(!parsed.use_tls);

    let connector = Connector::with_timeout(TrustRoots::WebPki, Duration::from_secs(5)).unwrap();
    let stream = connector.connect(&target).await.unwrap();
    let (mut reader, mut writer, head) =
        ws::upgrade(stream, &parsed.host_header(), &parsed.path).await.unwrap();
    assert!(head.starts_with("HTTP/1.1 101"));

    writer.send_text("round and back").await.unwrap();
    let frame = reader.next_frame().await.unwrap().unwrap();
    assert_eq!(frame.opcode, ws::OPCODE_TEXT);
    assert_eq!(frame.payload, b"round and back");

    let sent = server.await.unwrap();
    assert_eq!(sent.payload, b"round and back");
}
