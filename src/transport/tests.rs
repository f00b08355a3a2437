use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

use crate::broker::{Broker, Status};
use crate::cluster::{Member, StaticMembership};
use crate::transport::{AppState, build_router, serve};

struct TestNode {
    addr: SocketAddr,
    broker: Broker,
    shutdown: CancellationToken,
    http: reqwest::Client,
}

impl TestNode {
    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn status(&self) -> Status {
        self.http
            .get(self.url("/status"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    /// Keeps publishing to `channel` until it disappears. A dropped
    /// connection is only noticed once the server writes to it.
    async fn wait_for_channel_removal(&self, channel: &str) {
        timeout(Duration::from_secs(5), async {
            while self.status().await.channels.contains_key(channel) {
                let _ = self
                    .http
                    .post(self.url(&format!("/publish/{channel}")))
                    .body(r#"{"event":"ping"}"#)
                    .send()
                    .await;
                sleep(Duration::from_millis(20)).await;
            }
        })
        .await
        .expect("channel was not removed");
    }
}

async fn start_node(cors_enabled: bool) -> TestNode {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let local = Member::new("a", IpAddr::V4(Ipv4Addr::LOCALHOST), 7946, addr.port());
    let broker = Broker::new(
        Arc::new(StaticMembership::single(local)),
        reqwest::Client::new(),
    );
    let shutdown = CancellationToken::new();

    let state = AppState {
        broker: broker.clone(),
        shutdown: shutdown.clone(),
    };
    let app = build_router(state, cors_enabled);
    tokio::spawn(serve(listener, app, shutdown.clone()));

    TestNode {
        addr,
        broker,
        shutdown,
        http: reqwest::Client::new(),
    }
}

#[tokio::test]
async fn test_status_endpoint() {
    let node = start_node(false).await;

    let resp = node.http.get(node.url("/status")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["num_goroutines"].is_number());
    assert_eq!(body["gossip"]["member_count"], 1);
    assert_eq!(body["gossip"]["members"]["127.0.0.1"], 7946);
    assert_eq!(body["channels"], json!({}));
}

#[tokio::test]
async fn test_subscribe_receives_published_event() {
    let node = start_node(false).await;

    let mut stream = node
        .http
        .get(node.url("/subscribe/news/client/u1"))
        .send()
        .await
        .unwrap();
    assert_eq!(stream.status(), StatusCode::OK);
    assert_eq!(stream.headers()["content-type"], "text/event-stream");
    assert_eq!(stream.headers()["cache-control"], "no-cache");

    let resp = node
        .http
        .post(node.url("/publish/news"))
        .json(&json!({ "id": "1", "event": "update", "data": {} }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let chunk = timeout(Duration::from_secs(1), stream.chunk())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(&chunk[..], b"id: 1\nevent: update\ndata: {}\n\n");
}

#[tokio::test]
async fn test_publish_to_single_client_and_everyone() {
    let node = start_node(false).await;

    let mut target = node
        .http
        .get(node.url("/subscribe/news/client/u1"))
        .send()
        .await
        .unwrap();
    let mut sports = node
        .http
        .get(node.url("/subscribe/sports"))
        .send()
        .await
        .unwrap();

    let resp = node
        .http
        .post(node.url("/publish/news/client/u1"))
        .body(r#"{"id":"direct","data":"hi"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let chunk = timeout(Duration::from_secs(1), target.chunk())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(&chunk[..], b"id: direct\ndata: \"hi\"\n\n");

    let resp = node
        .http
        .post(node.url("/publish"))
        .body(r#"{"event":"all","retry":100}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    for stream in [&mut target, &mut sports] {
        let chunk = timeout(Duration::from_secs(1), stream.chunk())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(&chunk[..], b"event: all\nretry: 100\n\n");
    }
}

#[tokio::test]
async fn test_publish_malformed_body() {
    let node = start_node(false).await;

    let resp = node
        .http
        .post(node.url("/publish/news"))
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_publish_after_shutdown_fails() {
    let node = start_node(false).await;
    node.broker.close().await;

    let resp = node
        .http
        .post(node.url("/publish/news"))
        .body("{}")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_duplicate_subscriber_rejected() {
    let node = start_node(false).await;

    let _first = node
        .http
        .get(node.url("/subscribe/news/client/u1"))
        .send()
        .await
        .unwrap();
    let second = node
        .http
        .get(node.url("/subscribe/news/client/u1"))
        .send()
        .await
        .unwrap();

    assert_eq!(second.status(), StatusCode::CONFLICT);
    assert_eq!(node.status().await.channels["news"], vec!["u1".to_string()]);
}

#[tokio::test]
async fn test_disconnect_removes_client() {
    let node = start_node(false).await;

    let stream = node
        .http
        .get(node.url("/subscribe/news/client/u1"))
        .send()
        .await
        .unwrap();
    assert_eq!(node.status().await.channels.len(), 1);

    drop(stream);
    node.wait_for_channel_removal("news").await;
}

#[tokio::test]
async fn test_shutdown_ends_event_streams() {
    let node = start_node(false).await;

    let mut stream = node
        .http
        .get(node.url("/subscribe/news"))
        .send()
        .await
        .unwrap();
    assert_eq!(node.broker.status().channels.len(), 1);

    node.shutdown.cancel();

    let end = timeout(Duration::from_secs(2), stream.chunk())
        .await
        .expect("stream should end on shutdown")
        .unwrap();
    assert!(end.is_none());
    assert!(node.broker.status().channels.is_empty());
}

#[tokio::test]
async fn test_cors_headers() {
    let with_cors = start_node(true).await;
    let resp = with_cors
        .http
        .get(with_cors.url("/status"))
        .header("Origin", "http://example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");

    let without_cors = start_node(false).await;
    let resp = without_cors
        .http
        .get(without_cors.url("/status"))
        .header("Origin", "http://example.com")
        .send()
        .await
        .unwrap();
    assert!(resp.headers().get("access-control-allow-origin").is_none());
}
