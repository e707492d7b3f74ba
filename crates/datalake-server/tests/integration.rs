//! End-to-end tests against a real listener and `WebSocket` clients.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use datalake_core::sampler::{VARIABLE_NAMES, quoted_value_at};
use datalake_core::{VariableValue, parse_message};
use datalake_server::{ServerConfig, ServerError, StreamConfig, StreamServer};
use datalake_settings::CadenceMode;
use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

const TIMEOUT: Duration = Duration::from_secs(5);

type WsStream = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

fn local_config(stream: StreamConfig) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".into(),
        port: 0,
        stream,
    }
}

fn fast_stream() -> StreamConfig {
    StreamConfig {
        tick_interval: Duration::from_millis(10),
        ..StreamConfig::default()
    }
}

/// Boot a server and return its address plus the server itself.
async fn boot_server(stream: StreamConfig) -> (SocketAddr, StreamServer) {
    let server = StreamServer::new(local_config(stream));
    let (addr, _handle) = server.listen().await.unwrap();
    (addr, server)
}

async fn connect(addr: SocketAddr, path: &str) -> WsStream {
    let url = format!("ws://{addr}{path}");
    let (ws, _) = timeout(TIMEOUT, connect_async(url)).await.unwrap().unwrap();
    ws
}

/// Read the next text frame.
async fn next_text(ws: &mut WsStream) -> String {
    loop {
        let msg = timeout(TIMEOUT, ws.next())
            .await
            .expect("timed out waiting for frame")
            .expect("stream ended")
            .expect("read error");
        match msg {
            Message::Text(text) => return text.as_str().to_owned(),
            Message::Ping(_) | Message::Pong(_) => {}
            other => panic!("unexpected frame: {other:?}"),
        }
    }
}

/// Read one full tick (seven messages) and return them in order.
async fn next_tick(ws: &mut WsStream) -> Vec<String> {
    let mut out = Vec::with_capacity(VARIABLE_NAMES.len());
    for _ in 0..VARIABLE_NAMES.len() {
        out.push(next_text(ws).await);
    }
    out
}

#[tokio::test]
async fn status_then_first_tick() {
    let (addr, _server) = boot_server(StreamConfig::default()).await;
    let mut ws = connect(addr, "/ws").await;

    assert_eq!(next_text(&mut ws).await, "connection-status=connected");

    let tick = next_tick(&mut ws).await;
    assert_eq!(tick[0], "counter=1");
    let names: Vec<&str> = tick
        .iter()
        .map(|m| m.split_once('=').unwrap().0)
        .collect();
    assert_eq!(names, VARIABLE_NAMES);
    assert_eq!(tick[3], "boolean=false");
    assert_eq!(tick[5], "string=This is a string.");
    assert_eq!(tick[6], format!("quoted-string=\"{}\"", quoted_value_at(1)));
}

#[tokio::test]
async fn root_path_also_streams() {
    let (addr, _server) = boot_server(fast_stream()).await;
    let mut ws = connect(addr, "/").await;
    assert_eq!(next_text(&mut ws).await, "connection-status=connected");
    assert_eq!(next_text(&mut ws).await, "counter=1");
}

#[tokio::test]
async fn tick_ten_and_twenty_values() {
    let (addr, _server) = boot_server(fast_stream()).await;
    let mut ws = connect(addr, "/ws").await;
    let _ = next_text(&mut ws).await;

    let mut tick = Vec::new();
    for n in 1..=20 {
        tick = next_tick(&mut ws).await;
        if n == 10 {
            assert_eq!(tick[0], "counter=10");
            assert_eq!(tick[3], "boolean=true");
        }
    }
    assert_eq!(tick[0], "counter=20");
    assert_eq!(tick[3], "boolean=true");
    assert_eq!(tick[6], "quoted-string=\"\"");
}

#[tokio::test]
async fn streamed_values_parse_back_to_their_kinds() {
    let (addr, _server) = boot_server(fast_stream()).await;
    let mut ws = connect(addr, "/ws").await;
    let _ = next_text(&mut ws).await;

    for n in 1..=14u64 {
        let tick = next_tick(&mut ws).await;
        let counter = parse_message(&tick[0]).unwrap();
        assert_eq!(counter.value, VariableValue::Integer(i64::try_from(n).unwrap()));

        let random = parse_message(&tick[1]).unwrap();
        match random.value {
            VariableValue::Integer(v) => assert!((0..=99).contains(&v)),
            other => panic!("random parsed as {other:?}"),
        }

        let sine = parse_message(&tick[2]).unwrap();
        match sine.value {
            VariableValue::Float(v) => assert!((-1.0..=1.0).contains(&v)),
            other => panic!("sine parsed as {other:?}"),
        }

        let quoted = parse_message(&tick[6]).unwrap();
        match quoted.value {
            VariableValue::QuotedString(s) => assert_eq!(s, quoted_value_at(n)),
            other => panic!("quoted-string parsed as {other:?}"),
        }
    }
}

#[tokio::test]
async fn prefix_applies_to_every_name() {
    let stream = StreamConfig {
        prefix: "lab/".into(),
        ..fast_stream()
    };
    let (addr, _server) = boot_server(stream).await;
    let mut ws = connect(addr, "/ws").await;

    assert_eq!(next_text(&mut ws).await, "lab/connection-status=connected");
    for msg in next_tick(&mut ws).await {
        assert!(msg.starts_with("lab/"), "{msg}");
    }
}

#[tokio::test]
async fn sessions_are_independent() {
    let (addr, server) = boot_server(StreamConfig::default()).await;

    let mut a = connect(addr, "/ws").await;
    let _ = next_text(&mut a).await;
    for _ in 0..3 {
        let _ = next_tick(&mut a).await;
    }

    // A late joiner starts its own count from 1.
    let mut b = connect(addr, "/ws").await;
    assert_eq!(next_text(&mut b).await, "connection-status=connected");
    assert_eq!(next_tick(&mut b).await[0], "counter=1");

    // Abrupt disconnect of `a` does not disturb `b`.
    drop(a);

    let started = Instant::now();
    let mut last = String::new();
    for _ in 0..5 {
        last = next_tick(&mut b).await[0].clone();
    }
    let elapsed = started.elapsed();
    assert_eq!(last, "counter=6");
    assert!(elapsed >= Duration::from_millis(350), "{elapsed:?}");
    assert!(elapsed < Duration::from_secs(2), "{elapsed:?}");

    timeout(TIMEOUT, async {
        while server.active_sessions() != 1 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn client_close_ends_session() {
    let (addr, server) = boot_server(fast_stream()).await;
    let mut ws = connect(addr, "/ws").await;
    let _ = next_text(&mut ws).await;
    assert_eq!(server.active_sessions(), 1);

    ws.send(Message::Close(None)).await.unwrap();

    timeout(TIMEOUT, async {
        while server.active_sessions() != 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn inbound_frames_are_ignored() {
    let (addr, _server) = boot_server(fast_stream()).await;
    let mut ws = connect(addr, "/ws").await;
    let _ = next_text(&mut ws).await;

    ws.send(Message::Text("counter=999".into())).await.unwrap();
    ws.send(Message::Binary(vec![1, 2, 3].into())).await.unwrap();

    let first = next_tick(&mut ws).await;
    let second = next_tick(&mut ws).await;
    assert_eq!(first[0], "counter=1");
    assert_eq!(second[0], "counter=2");
}

#[tokio::test]
async fn aligned_cadence_streams() {
    let stream = StreamConfig {
        cadence: CadenceMode::Aligned,
        ..fast_stream()
    };
    let (addr, _server) = boot_server(stream).await;
    let mut ws = connect(addr, "/ws").await;
    let _ = next_text(&mut ws).await;
    for n in 1..=3 {
        assert_eq!(next_tick(&mut ws).await[0], format!("counter={n}"));
    }
}

#[tokio::test]
async fn shutdown_closes_open_sessions() {
    let server = StreamServer::new(local_config(fast_stream()));
    let (addr, handle) = server.listen().await.unwrap();
    let mut ws = connect(addr, "/ws").await;
    let _ = next_text(&mut ws).await;

    server.shutdown().drain(vec![handle], None).await;

    let closed = timeout(TIMEOUT, async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            }
        }
    })
    .await;
    assert!(closed.is_ok());
}

#[tokio::test]
async fn port_in_use_is_a_bind_error() {
    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = taken.local_addr().unwrap().port();

    let server = StreamServer::new(ServerConfig {
        host: "127.0.0.1".into(),
        port,
        stream: StreamConfig::default(),
    });
    let err = server.listen().await.unwrap_err();
    match err {
        ServerError::Bind { addr, .. } => assert_eq!(addr, format!("127.0.0.1:{port}")),
        other => panic!("expected bind error, got {other:?}"),
    }
}

#[tokio::test]
async fn health_reports_active_sessions() {
    let (addr, _server) = boot_server(fast_stream()).await;
    let mut ws = connect(addr, "/ws").await;
    let _ = next_text(&mut ws).await;

    let mut tcp = tokio::net::TcpStream::connect(addr).await.unwrap();
    tcp.write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut raw = String::new();
    let _ = timeout(TIMEOUT, tcp.read_to_string(&mut raw))
        .await
        .unwrap()
        .unwrap();

    assert!(raw.starts_with("HTTP/1.1 200"), "{raw}");
    let body = raw.split("\r\n\r\n").nth(1).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(parsed["status"], "ok");
    assert_eq!(parsed["active_sessions"], 1);
}
