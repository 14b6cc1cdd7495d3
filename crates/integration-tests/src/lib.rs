//! Integration tests for the Placify client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p placify-integration-tests
//! ```
//!
//! Each test starts its own [`MockApi`]: an axum server on an ephemeral
//! localhost port that answers from canned responses and records every
//! request it sees. The real `reqwest` client in `placify-client` talks to it
//! over TCP, so headers, status handling and session side effects are
//! exercised end to end.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use placify_client::http::LoginRedirect;
use placify_client::{ApiClient, ClientConfig, SessionState};
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// A canned reply for one `METHOD /path` route.
#[derive(Debug, Clone)]
pub struct Canned {
    pub status: StatusCode,
    pub headers: Vec<(&'static str, String)>,
    /// `None` sends an empty body.
    pub body: Option<Value>,
    /// Wait this long before answering.
    pub delay: Option<Duration>,
}

impl Canned {
    #[must_use]
    pub const fn json(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Some(body),
            delay: None,
        }
    }

    #[must_use]
    pub const fn ok(body: Value) -> Self {
        Self::json(StatusCode::OK, body)
    }

    #[must_use]
    pub const fn empty(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: None,
            delay: None,
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// A request as the mock server received it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Recorded {
    /// Header value as a string, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Body decoded as JSON.
    #[must_use]
    pub fn json(&self) -> Option<Value> {
        serde_json::from_slice(&self.body).ok()
    }
}

#[derive(Clone, Default)]
struct MockState {
    routes: Arc<Mutex<HashMap<String, Canned>>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

/// Mock Placify API bound to `127.0.0.1` on a random port.
pub struct MockApi {
    pub base_url: String,
    state: MockState,
}

impl MockApi {
    /// Start the server on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock API listener");
        let addr = listener.local_addr().expect("mock API address");

        let state = MockState::default();
        let app = Router::new().fallback(handle).with_state(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            base_url: format!("http://{addr}/api"),
            state,
        }
    }

    /// Answer `method path` (path relative to `/api`) with `canned`.
    ///
    /// # Panics
    ///
    /// Panics if the route table lock is poisoned.
    pub fn route(&self, method: &Method, path: &str, canned: Canned) {
        self.state
            .routes
            .lock()
            .expect("routes lock")
            .insert(route_key(method, &format!("/api{path}")), canned);
    }

    /// Every request received so far.
    ///
    /// # Panics
    ///
    /// Panics if the request log lock is poisoned.
    #[must_use]
    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().expect("requests lock").clone()
    }

    /// Requests received for `path` (relative to `/api`).
    #[must_use]
    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        let full = format!("/api{path}");
        self.requests()
            .into_iter()
            .filter(|r| r.path == full)
            .collect()
    }

    /// A client for this server over a fresh in-memory session.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn client(&self) -> (ApiClient, Arc<RecordingRedirect>) {
        self.client_with(SessionState::in_memory(), None)
    }

    /// A client over `session`, optionally with a custom timeout.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn client_with(
        &self,
        session: SessionState,
        timeout: Option<Duration>,
    ) -> (ApiClient, Arc<RecordingRedirect>) {
        let mut config = ClientConfig::new(&self.base_url).expect("mock API config");
        if let Some(timeout) = timeout {
            config.timeout = timeout;
        }

        let redirect = Arc::new(RecordingRedirect::default());
        let client = ApiClient::with_redirect(&config, session, redirect.clone())
            .expect("client for mock API");
        (client, redirect)
    }
}

/// Login redirect that counts its invocations.
#[derive(Debug, Default)]
pub struct RecordingRedirect {
    calls: AtomicUsize,
    last_url: Mutex<Option<String>>,
}

impl RecordingRedirect {
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    #[must_use]
    pub fn last_url(&self) -> Option<String> {
        self.last_url.lock().expect("redirect lock").clone()
    }
}

impl LoginRedirect for RecordingRedirect {
    fn redirect_to_login(&self, login_url: &str) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_url.lock() {
            *last = Some(login_url.to_owned());
        }
    }
}

fn route_key(method: &Method, path: &str) -> String {
    format!("{method} {path}")
}

async fn handle(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_owned();
    let canned = state
        .routes
        .lock()
        .ok()
        .and_then(|routes| routes.get(&route_key(&method, &path)).cloned());

    if let Ok(mut requests) = state.requests.lock() {
        requests.push(Recorded {
            method,
            path,
            query: uri.query().map(str::to_owned),
            headers,
            body,
        });
    }

    let Some(canned) = canned else {
        return (
            StatusCode::NOT_FOUND,
            axum::Json(json!({"message": "no such route"})),
        )
            .into_response();
    };

    if let Some(delay) = canned.delay {
        tokio::time::sleep(delay).await;
    }

    let mut response = match canned.body {
        Some(body) => (canned.status, axum::Json(body)).into_response(),
        None => canned.status.into_response(),
    };
    for (name, value) in canned.headers {
        if let Ok(value) = HeaderValue::from_str(&value) {
            response
                .headers_mut()
                .insert(HeaderName::from_static(name), value);
        }
    }
    response
}
