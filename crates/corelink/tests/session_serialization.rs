//! A session runs at most one request/response cycle at a time, and a retry
//! sequence is never interleaved with another caller's request.

mod common;

use async_trait::async_trait;
use common::fast_retry;
use corelink::transport::{HttpRequest, HttpResponse, Transport};
use corelink::{Client, ClientConfig, EndpointRequest};
use http::HeaderMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Records the order in which cycles start and finish.
struct RecordingTransport {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    events: Mutex<Vec<String>>,
    /// Paths that fail with 503 on their first call
    flaky: Mutex<Vec<String>>,
}

impl RecordingTransport {
    fn new(flaky: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            events: Mutex::new(Vec::new()),
            flaky: Mutex::new(flaky.iter().map(|p| p.to_string()).collect()),
        })
    }

    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: &HttpRequest) -> corelink::transport::Result<HttpResponse> {
        let path = request
            .url
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.events.lock().unwrap().push(format!("start {}", path));

        tokio::time::sleep(Duration::from_millis(10)).await;

        let status = {
            let mut flaky = self.flaky.lock().unwrap();
            match flaky.iter().position(|p| *p == path) {
                Some(index) => {
                    flaky.remove(index);
                    503
                }
                None => 200,
            }
        };

        self.events.lock().unwrap().push(format!("end {}", path));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(HttpResponse::new(status, HeaderMap::new(), "{}"))
    }
}

fn client_with(transport: Arc<RecordingTransport>) -> Client {
    let config = ClientConfig {
        retry: fast_retry(3),
        ..ClientConfig::default()
    };
    Client::with_transport(config, transport).unwrap()
}

#[tokio::test]
async fn test_concurrent_requests_never_overlap() {
    let transport = RecordingTransport::new(&[]);
    let client = client_with(Arc::clone(&transport));

    let calls = (0..5).map(|i| {
        let client = client.clone();
        async move {
            client
                .request(EndpointRequest::get(format!("/nodes/n{}", i)))
                .await
        }
    });
    let results = futures::future::join_all(calls).await;

    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(transport.max_in_flight.load(Ordering::SeqCst), 1);

    let events = transport.events();
    assert_eq!(events.len(), 10);
    for pair in events.chunks(2) {
        let started = pair[0].strip_prefix("start ").unwrap();
        assert_eq!(pair[1], format!("end {}", started));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_retry_sequence_holds_the_connection() {
    let transport = RecordingTransport::new(&["flaky"]);
    let client = client_with(Arc::clone(&transport));

    let first = {
        let client = client.clone();
        tokio::spawn(async move { client.request(EndpointRequest::get("/flaky")).await })
    };
    // Let the first request take the connection before the second queues up
    tokio::time::sleep(Duration::from_millis(2)).await;
    let second = {
        let client = client.clone();
        tokio::spawn(async move { client.request(EndpointRequest::get("/steady")).await })
    };

    assert_eq!(first.await.unwrap().unwrap().status, 200);
    assert_eq!(second.await.unwrap().unwrap().status, 200);

    assert_eq!(
        transport.events(),
        vec![
            "start flaky",
            "end flaky",
            "start flaky",
            "end flaky",
            "start steady",
            "end steady",
        ]
    );
    assert_eq!(transport.max_in_flight.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_closed_session_rejects_queued_requests() {
    let transport = RecordingTransport::new(&[]);
    let client = client_with(Arc::clone(&transport));

    client.close().await.unwrap();
    let err = client
        .request(EndpointRequest::get("/cluster/status"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        corelink::Error::Transport(corelink::transport::TransportError::Closed)
    ));
    assert!(transport.events().is_empty());
}
