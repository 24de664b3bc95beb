//! End-to-end tests against a real listening socket.
//!
//! Each test binds `127.0.0.1:0`, serves in a background task and talks to
//! the server with a real HTTP client.

use std::net::SocketAddr;
use std::time::Duration;

use bjj_academy_api::api::ROOT_MESSAGE;
use bjj_academy_api::{ServeExit, Server};
use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const EXPECTED_BODY: &str = r#"{"message":"BJJ Academy API is running!"}"#;

struct TestServer {
    addr: SocketAddr,
    stop: oneshot::Sender<()>,
    handle: JoinHandle<bjj_academy_api::Result<ServeExit>>,
}

impl TestServer {
    async fn start() -> Self {
        let server = Server::bind("127.0.0.1:0".parse().unwrap(), false)
            .await
            .unwrap();
        let addr = server.local_addr();
        let (stop, stopped) = oneshot::channel::<()>();

        let handle = tokio::spawn(server.serve(async move {
            let _ = stopped.await;
        }));

        Self { addr, stop, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn shutdown(self) -> ServeExit {
        self.stop.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .unwrap()
            .unwrap()
            .unwrap()
    }
}

#[tokio::test]
async fn get_root_returns_message() {
    let server = TestServer::start().await;

    let response = reqwest::get(server.url("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "application/json"
    );
    assert_eq!(response.text().await.unwrap(), EXPECTED_BODY);

    server.shutdown().await;
}

#[tokio::test]
async fn body_is_single_key_json_object() {
    let server = TestServer::start().await;

    let body: serde_json::Value = reqwest::get(server.url("/"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let object = body.as_object().unwrap();
    assert_eq!(object.len(), 1);
    assert_eq!(object["message"], ROOT_MESSAGE);

    server.shutdown().await;
}

#[tokio::test]
async fn repeated_requests_are_identical() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    for _ in 0..5 {
        let response = client.get(server.url("/")).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.bytes().await.unwrap(), EXPECTED_BODY.as_bytes());
    }

    server.shutdown().await;
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let server = TestServer::start().await;

    let response = reqwest::get(server.url("/foo")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    server.shutdown().await;
}

#[tokio::test]
async fn post_to_root_is_method_not_allowed() {
    let server = TestServer::start().await;

    let response = reqwest::Client::new()
        .post(server.url("/"))
        .body("{}")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    server.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_get_identical_responses() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let requests = (0..50).map(|_| {
        let client = client.clone();
        let url = server.url("/");
        async move {
            let response = client.get(url).send().await.unwrap();
            (response.status(), response.text().await.unwrap())
        }
    });
    let results = futures::future::join_all(requests).await;

    assert_eq!(results.len(), 50);
    for (status, body) in results {
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, EXPECTED_BODY);
    }

    server.shutdown().await;
}

#[tokio::test]
async fn second_server_on_same_port_fails_to_bind() {
    let server = TestServer::start().await;

    let err = Server::bind(server.addr, false).await.unwrap_err();
    assert!(err.is_bind_error());

    // The first server is unaffected.
    let response = reqwest::get(server.url("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    server.shutdown().await;
}

#[tokio::test]
async fn shutdown_releases_the_port() {
    let server = TestServer::start().await;
    let addr = server.addr;

    assert_eq!(server.shutdown().await, ServeExit::Shutdown);

    let again = Server::bind(addr, false).await;
    assert!(again.is_ok(), "port should be free after shutdown");
}
