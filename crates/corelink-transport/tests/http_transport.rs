//! Integration tests for the HTTP transport using wiremock

use corelink_transport::{ConnectionGuard, HttpRequest, HttpTransport, Transport};
use std::sync::Arc;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_send_preserves_status_headers_and_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/core/v1/echo"))
        .and(header("content-type", "application/json"))
        .and(body_string(r#"{"x":1}"#))
        .respond_with(
            ResponseTemplate::new(203)
                .insert_header("Response-Code", "512")
                .set_body_string("payload"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new().unwrap();
    let request = HttpRequest::post(format!("{}/api/core/v1/echo", mock_server.uri()))
        .with_header("content-type", "application/json")
        .unwrap()
        .with_body(r#"{"x":1}"#);

    let response = transport.send(&request).await.unwrap();

    assert_eq!(response.status, 203);
    assert_eq!(response.header("response-code"), Some("512"));
    assert_eq!(response.text(), "payload");
}

#[tokio::test]
async fn test_error_statuses_are_not_transport_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("nope"))
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new().unwrap();
    let response = transport
        .send(&HttpRequest::get(format!("{}/missing", mock_server.uri())))
        .await
        .expect("a 404 is a completed cycle");

    assert_eq!(response.status, 404);
    assert!(!response.is_success());
}

#[tokio::test]
async fn test_guarded_requests_share_one_transport() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let guard = Arc::new(ConnectionGuard::new(Arc::new(HttpTransport::new().unwrap())));
    let url = format!("{}/ping", mock_server.uri());

    let handles: Vec<_> = (0..3)
        .map(|_| {
            let guard = Arc::clone(&guard);
            let request = HttpRequest::get(url.clone());
            tokio::spawn(async move {
                guard
                    .with_connection(|t| async move { t.send(&request).await })
                    .await
            })
        })
        .collect();

    for handle in handles {
        let response = handle.await.unwrap().unwrap();
        assert_eq!(response.text(), "pong");
    }
}
