//! Integration tests for the IWB client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p iwb-integration-tests
//! ```
//!
//! Each test starts a [`MockBackend`] on an ephemeral loopback port and
//! drives the real [`iwb_client::ApiClient`] against it. No external
//! services are needed.
//!
//! # Test Categories
//!
//! - `checkout_flow` - Buyer draft, order placement and storage clearing
//! - `query_flow` - Automated replies, submission and history paging

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde_json::{Value, json};
use tokio::task::JoinHandle;

use iwb_client::config::{ApiConfig, ConfigError};

/// A canned HTTP answer.
#[derive(Debug, Clone)]
pub struct Canned {
    pub status: StatusCode,
    pub body: String,
}

impl Canned {
    /// 200 with a JSON body.
    #[must_use]
    pub fn json(body: &Value) -> Self {
        Self::with_status(StatusCode::OK, body)
    }

    /// Any status with a JSON body.
    #[must_use]
    pub fn with_status(status: StatusCode, body: &Value) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }

    /// Any status with a raw body.
    #[must_use]
    pub fn raw(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

impl IntoResponse for Canned {
    fn into_response(self) -> Response {
        (
            self.status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            self.body,
        )
            .into_response()
    }
}

/// A request as seen by the mock backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub body: Option<Value>,
    pub request_id: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Default)]
struct MockState {
    rules: Mutex<Option<Canned>>,
    /// Stored queries, oldest first.
    queries: Mutex<Vec<Value>>,
    queries_override: Mutex<Option<Canned>>,
    create_override: Mutex<Option<Canned>>,
    checkout: Mutex<Option<Canned>>,
    /// Delay before answering either POST endpoint.
    post_delay: Mutex<Option<Duration>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockState {
    async fn stall(&self) {
        let delay = *lock(&self.post_delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process stand-in for the storefront backend.
///
/// Serves the four endpoints the client uses. By default it keeps submitted
/// queries in memory and pages them newest first; any endpoint can be
/// overridden with a [`Canned`] answer to simulate failures.
pub struct MockBackend {
    addr: SocketAddr,
    state: Arc<MockState>,
    server: JoinHandle<()>,
}

impl MockBackend {
    /// Bind to an ephemeral loopback port and start serving.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start() -> std::io::Result<Self> {
        let state = Arc::new(MockState::default());

        let app = Router::new()
            .route("/api/automated-responses", get(rules))
            .route("/api/queries", get(list_queries).post(create_query))
            .route("/api/checkout", axum::routing::post(checkout))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            addr,
            state,
            server,
        })
    }

    /// Base URL of the running backend.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Client configuration pointing at this backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is rejected.
    pub fn api_config(&self) -> Result<ApiConfig, ConfigError> {
        ApiConfig::new(&self.base_url())
    }

    /// Answer for `GET /api/automated-responses` (default: `[]`).
    pub fn set_rules(&self, canned: Canned) {
        *lock(&self.state.rules) = Some(canned);
    }

    /// Seed stored queries, oldest first.
    pub fn seed_queries(&self, queries: impl IntoIterator<Item = Value>) {
        lock(&self.state.queries).extend(queries);
    }

    /// Answer every `GET /api/queries` with `canned` instead of the store.
    pub fn override_queries(&self, canned: Canned) {
        *lock(&self.state.queries_override) = Some(canned);
    }

    /// Answer the next `POST /api/queries` with `canned`; nothing is stored.
    pub fn fail_next_create(&self, canned: Canned) {
        *lock(&self.state.create_override) = Some(canned);
    }

    /// Answer for `POST /api/checkout` (default: 200 with a message).
    pub fn set_checkout(&self, canned: Canned) {
        *lock(&self.state.checkout) = Some(canned);
    }

    /// Hold every `POST` answer back for `delay`.
    pub fn delay_posts(&self, delay: Duration) {
        *lock(&self.state.post_delay) = Some(delay);
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state.requests).clone()
    }

    /// Requests received for one method and path.
    #[must_use]
    pub fn requests_to(&self, method: &Method, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == *method && r.path == path)
            .collect()
    }

    /// Stored queries, oldest first.
    #[must_use]
    pub fn stored_queries(&self) -> Vec<Value> {
        lock(&self.state.queries).clone()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn record(state: &MockState, method: Method, uri: &Uri, headers: &HeaderMap, body: Option<&str>) {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    lock(&state.requests).push(RecordedRequest {
        method,
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        body: body.and_then(|b| serde_json::from_str(b).ok()),
        request_id: header("x-request-id"),
        authorization: header("authorization"),
    });
}

async fn rules(State(state): State<Arc<MockState>>, uri: Uri, headers: HeaderMap) -> Canned {
    record(&state, Method::GET, &uri, &headers, None);
    lock(&state.rules)
        .clone()
        .unwrap_or_else(|| Canned::json(&json!([])))
}

async fn list_queries(
    State(state): State<Arc<MockState>>,
    Query(params): Query<std::collections::HashMap<String, String>>,
    uri: Uri,
    headers: HeaderMap,
) -> Canned {
    record(&state, Method::GET, &uri, &headers, None);

    if let Some(canned) = lock(&state.queries_override).clone() {
        return canned;
    }

    let param = |key: &str, default: usize| {
        params
            .get(key)
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(default)
    };
    let page = param("page", 1);
    let limit = param("limit", 10);

    let stored = lock(&state.queries);
    let newest_first: Vec<Value> = stored
        .iter()
        .rev()
        .skip((page - 1) * limit)
        .take(limit)
        .cloned()
        .collect();

    Canned::json(&json!({
        "queries": newest_first,
        "totalCount": stored.len(),
    }))
}

async fn create_query(
    State(state): State<Arc<MockState>>,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Canned {
    record(&state, Method::POST, &uri, &headers, Some(&body));
    state.stall().await;

    if let Some(canned) = lock(&state.create_override).take() {
        return canned;
    }

    let Ok(Value::Object(mut query)) = serde_json::from_str::<Value>(&body) else {
        return Canned::with_status(StatusCode::BAD_REQUEST, &json!({"error": "Invalid JSON"}));
    };

    let mut stored = lock(&state.queries);
    query.insert("_id".to_string(), json!(format!("q{}", stored.len() + 1)));
    query.insert("status".to_string(), json!("Pending"));
    query.insert("createdAt".to_string(), json!("2024-03-01T09:30:00Z"));
    let created = Value::Object(query);
    stored.push(created.clone());

    Canned::with_status(StatusCode::CREATED, &created)
}

async fn checkout(
    State(state): State<Arc<MockState>>,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Canned {
    record(&state, Method::POST, &uri, &headers, Some(&body));
    state.stall().await;
    lock(&state.checkout).clone().unwrap_or_else(|| {
        Canned::json(&json!({
            "message": "Order placed successfully",
            "saleId": "s-1001"
        }))
    })
}
