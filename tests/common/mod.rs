//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::{to_bytes, Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;

/// One request as seen by the mock upstream.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: Method,
    pub path_and_query: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[derive(Debug, Clone, Copy)]
enum Behavior {
    Respond(StatusCode, &'static str),
    Hang,
}

struct UpstreamLog {
    calls: AtomicU32,
    requests: Mutex<Vec<CapturedRequest>>,
    behavior: Behavior,
}

/// Handle to a spawned mock upstream.
#[derive(Clone)]
pub struct MockUpstream {
    pub addr: SocketAddr,
    log: Arc<UpstreamLog>,
}

#[allow(dead_code)]
impl MockUpstream {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn call_count(&self) -> u32 {
        self.log.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> CapturedRequest {
        self.log
            .requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("upstream was never called")
    }
}

/// Start a mock upstream that records every request and answers each one
/// with a fixed status and body.
pub async fn start_mock_upstream(status: StatusCode, body: &'static str) -> MockUpstream {
    spawn(Behavior::Respond(status, body)).await
}

/// Start a mock upstream that records every request and never responds.
#[allow(dead_code)]
pub async fn start_hanging_upstream() -> MockUpstream {
    spawn(Behavior::Hang).await
}

async fn spawn(behavior: Behavior) -> MockUpstream {
    let log = Arc::new(UpstreamLog {
        calls: AtomicU32::new(0),
        requests: Mutex::new(Vec::new()),
        behavior,
    });

    let app = Router::new().fallback(record).with_state(log.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app.into_make_service()).await;
    });

    MockUpstream { addr, log }
}

async fn record(State(log): State<Arc<UpstreamLog>>, request: Request<Body>) -> Response {
    log.calls.fetch_add(1, Ordering::SeqCst);

    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.unwrap_or_default();
    log.requests.lock().unwrap().push(CapturedRequest {
        method: parts.method,
        path_and_query: parts
            .uri
            .path_and_query()
            .map(|pq| pq.to_string())
            .unwrap_or_else(|| parts.uri.path().to_string()),
        headers: parts.headers,
        body: bytes,
    });

    match log.behavior {
        Behavior::Respond(status, body) => (status, body).into_response(),
        Behavior::Hang => std::future::pending::<Response>().await,
    }
}
