//! Debug channel tests against a local WebSocket server

use corelink::{Client, ClientConfig, EndReason, Error};
use futures::{SinkExt, StreamExt};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};

/// What the fake Core does once a debug socket is accepted
#[derive(Clone, Copy)]
enum Script {
    /// Send the frames, then close
    SendAndClose(&'static [&'static str]),
    /// Send the frames, then wait for the client to close
    SendAndWait(&'static [&'static str]),
}

struct FakeCore {
    uri: String,
    handshake: oneshot::Receiver<(String, Option<String>)>,
}

async fn fake_core(script: Script) -> FakeCore {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let callback = move |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
            let request_id = request
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let _ = tx.send((request.uri().path().to_string(), request_id));
            Ok(response)
        };
        let mut ws = tokio_tungstenite::accept_hdr_async(stream, callback)
            .await
            .unwrap();

        let frames = match script {
            Script::SendAndClose(frames) | Script::SendAndWait(frames) => frames,
        };
        for frame in frames {
            ws.send(Message::Text(frame.to_string())).await.unwrap();
        }

        match script {
            Script::SendAndClose(_) => {
                let _ = ws.close(None).await;
            }
            Script::SendAndWait(_) => while let Some(Ok(_)) = ws.next().await {},
        }
    });

    FakeCore {
        uri: format!("http://{}", addr),
        handshake: rx,
    }
}

fn collector() -> (Arc<Mutex<Vec<String>>>, impl FnMut(&str) + Send + 'static) {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&lines);
    (lines, move |line: &str| sink.lock().unwrap().push(line.to_string()))
}

#[tokio::test]
async fn test_lines_reassembled_across_frames() {
    let core = fake_core(Script::SendAndClose(&["hello\nwor", "ld\r\n", "partial"])).await;
    let client = Client::builder()
        .uri(&core.uri)
        .request_id("trace-7")
        .build()
        .unwrap();

    let mut stream = client.debug_stream("m 1").await.unwrap();
    assert_eq!(stream.module_id(), "m 1");

    let (lines, on_line) = collector();
    stream.on_line(on_line);
    let end = stream.run().await.unwrap();

    assert_eq!(end.reason, EndReason::RemoteClosed);
    assert_eq!(end.lines, 3);
    assert_eq!(*lines.lock().unwrap(), vec!["hello", "world", "partial"]);

    let (path, request_id) = core.handshake.await.unwrap();
    assert_eq!(path, "/api/core/v1/modules/m%201/debug");
    assert_eq!(request_id.as_deref(), Some("trace-7"));
}

#[tokio::test]
async fn test_no_request_id_unless_configured() {
    let core = fake_core(Script::SendAndClose(&[])).await;
    let client = Client::new(ClientConfig::with_uri(&core.uri)).unwrap();

    let mut stream = client.debug_stream("m-1").await.unwrap();
    stream.on_line(|_| {});
    let end = stream.run().await.unwrap();

    assert_eq!(end.reason, EndReason::RemoteClosed);
    assert_eq!(end.lines, 0);

    let (_, request_id) = core.handshake.await.unwrap();
    assert!(request_id.is_none());
}

#[tokio::test]
async fn test_local_close_ends_stream() {
    let core = fake_core(Script::SendAndWait(&["ready\n"])).await;
    let client = Client::new(ClientConfig::with_uri(&core.uri)).unwrap();

    let mut stream = client.debug_stream("m-1").await.unwrap();
    let handle = stream.close_handle();
    let (lines, mut collect) = collector();
    stream.on_line(move |line| {
        collect(line);
        handle.close();
    });

    let end = stream.run().await.unwrap();

    assert_eq!(end.reason, EndReason::LocalClosed);
    assert_eq!(*lines.lock().unwrap(), vec!["ready"]);
}

#[tokio::test]
async fn test_close_before_run() {
    let core = fake_core(Script::SendAndWait(&[])).await;
    let client = Client::new(ClientConfig::with_uri(&core.uri)).unwrap();

    let mut stream = client.debug_stream("m-1").await.unwrap();
    stream.on_line(|_| {});
    stream.close_handle().close();

    let end = stream.run().await.unwrap();
    assert_eq!(end.reason, EndReason::LocalClosed);
}

#[tokio::test]
async fn test_run_without_callback() {
    let core = fake_core(Script::SendAndWait(&[])).await;
    let client = Client::new(ClientConfig::with_uri(&core.uri)).unwrap();

    let stream = client.debug_stream("m-1").await.unwrap();
    let err = stream.run().await.unwrap_err();

    assert!(matches!(err, Error::Stream(_)));
}

#[tokio::test]
async fn test_handshake_failure_surfaces() {
    // Port 9 (discard) is not listening on test hosts
    let client = Client::new(ClientConfig::new("127.0.0.1", 9)).unwrap();

    let err = client.debug_stream("m-1").await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
}
