//! Test helpers shared by the service and store tests.

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    body::{Body, to_bytes},
    extract::State,
    http::{Request, Response, StatusCode, header},
};
use rustc_hash::FxHashMap;
use tokio::{net::TcpListener, sync::Mutex};

use crate::{
    api::{ApiClient, ApiConfig, ApiError},
    database::{Db, connect},
    session::{LoginId, Session},
};

const MAX_BODY_BYTES: usize = 1024 * 1024;

/// The session every test acts as.
pub fn test_session() -> Session {
    Session::new(LoginId::new(42), "test-token")
}

/// A fresh in-memory database with the schema applied.
pub async fn test_db() -> Result<Db, sqlx::Error> {
    Ok(Db::new(connect("sqlite::memory:").await?))
}

/// A request received by the mock backend.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub idempotency_key: Option<String>,
    pub body: serde_json::Value,
}

/// A canned response for one path.
#[derive(Debug, Clone)]
pub struct MockResponse {
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
}

impl MockResponse {
    pub fn json(body: &serde_json::Value) -> Self {
        Self::json_with_status(200, body)
    }

    pub fn json_with_status(status: u16, body: &serde_json::Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: body.to_string().into_bytes(),
        }
    }

    pub fn raw(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: body.as_bytes().to_vec(),
        }
    }
}

#[derive(Clone)]
struct MockState {
    routes: Arc<FxHashMap<String, MockResponse>>,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

/// In-process HTTP server standing in for the marketplace backend.
pub struct MockBackend {
    base_url: String,
    state: MockState,
}

impl MockBackend {
    /// Serve the given responses, keyed by request path.
    pub async fn start<'a>(routes: impl IntoIterator<Item = (&'a str, MockResponse)>) -> Self {
        let state = MockState {
            routes: Arc::new(
                routes
                    .into_iter()
                    .map(|(path, response)| (path.to_string(), response))
                    .collect(),
            ),
            requests: Arc::new(Mutex::new(Vec::new())),
        };

        let app = Router::new()
            .fallback(handle_request)
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");

        let addr = listener
            .local_addr()
            .expect("Failed to read mock backend address");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    /// A client pointed at this backend.
    pub fn client(&self) -> Result<ApiClient, ApiError> {
        ApiClient::new(ApiConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(5),
        })
    }

    /// Requests received so far, in arrival order.
    pub async fn requests(&self) -> Vec<CapturedRequest> {
        self.state.requests.lock().await.clone()
    }
}

async fn handle_request(State(state): State<MockState>, request: Request<Body>) -> Response<Body> {
    let path = request.uri().path().to_string();

    let (authorization, idempotency_key) = {
        let header_value = |name: &str| {
            request
                .headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };

        (
            header_value(header::AUTHORIZATION.as_str()),
            header_value("idempotency-key"),
        )
    };

    let bytes = to_bytes(request.into_body(), MAX_BODY_BYTES)
        .await
        .unwrap_or_default();

    let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);

    state.requests.lock().await.push(CapturedRequest {
        path: path.clone(),
        authorization,
        idempotency_key,
        body,
    });

    let Some(mock) = state.routes.get(&path) else {
        return Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Body::from(format!("no mock for {path}")))
            .expect("Failed to build 404 response");
    };

    Response::builder()
        .status(mock.status)
        .header(header::CONTENT_TYPE, mock.content_type)
        .body(Body::from(mock.body.clone()))
        .expect("Failed to build mock response")
}
