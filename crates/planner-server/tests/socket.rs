//! Round trip over a real TCP socket, including graceful shutdown.

use std::time::Duration;

use planner_config::PlannerConfig;
use planner_server::{App, Server, ShutdownSignal};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

async fn roundtrip(addr: std::net::SocketAddr, request: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    String::from_utf8(response).unwrap()
}

#[tokio::test]
async fn test_serves_and_shuts_down() {
    let mut config = PlannerConfig::default();
    config.server.http_addr = "127.0.0.1:0".to_string();
    config.server.shutdown_timeout_secs = 1;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = Server::new(&config, App::new(&config)).unwrap();
    let shutdown = ShutdownSignal::new();
    let running = tokio::spawn(server.serve(listener, shutdown.clone()));

    let health = roundtrip(
        addr,
        "GET /api/health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await;
    assert!(health.starts_with("HTTP/1.1 200 OK"), "{health}");
    assert!(health.contains("content-type: application/json"), "{health}");
    assert!(health.ends_with(r#"{"status":"ok"}"#), "{health}");

    let body = r#"{"title":"Team Sync"}"#;
    let created = roundtrip(
        addr,
        &format!(
            "POST /api/calendars HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        ),
    )
    .await;
    assert!(created.starts_with("HTTP/1.1 201 Created"), "{created}");
    assert!(created.contains(r#""id":""#), "{created}");

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), running)
        .await
        .unwrap()
        .unwrap()
        .unwrap();

    assert!(TcpStream::connect(addr).await.is_err());
}
