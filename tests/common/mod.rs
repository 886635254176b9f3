#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use clia_gateway::config::GatewayConfig;
use clia_gateway::{
    Credential, CredentialStore, Gateway, MemoryCredentialStore, Navigator, SessionContext, StoreError,
};

/// Tokens the mock API accepts
const VALID_TOKENS: &[&str] = &["T1", "T2", "T3"];

#[derive(Debug, Clone)]
pub struct Seen {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
}

#[derive(Debug, Default)]
pub struct MockState {
    seen: Mutex<Vec<Seen>>,
}

/// In-process stand-in for the platform API, mounted under `/api`
pub struct MockApi {
    pub port: u16,
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockApi {
    pub async fn start() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind mock API")?;

        let state = Arc::new(MockState::default());
        let app = router(Arc::clone(&state));
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            port,
            base_url: format!("http://127.0.0.1:{}/api", port),
            state,
        })
    }

    pub fn config(&self) -> GatewayConfig {
        GatewayConfig::for_base_url(self.base_url.clone())
    }

    /// Gateway with an explicit session, as a host that already knows its state would build it
    pub fn gateway(&self, store: Arc<dyn CredentialStore>, session: SessionContext) -> Gateway {
        Gateway::new(&self.config(), store, session, Navigator::new(8)).expect("gateway")
    }

    /// Gateway whose session is restored from the store, as at process start
    pub async fn connect(&self, store: Arc<dyn CredentialStore>) -> Gateway {
        Gateway::connect(&self.config(), store).await.expect("gateway")
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.state.seen.lock().unwrap().clone()
    }

    pub fn last_seen(&self) -> Seen {
        self.seen().last().cloned().expect("no request reached the mock API")
    }
}

pub fn store_with(token: &str) -> Arc<MemoryCredentialStore> {
    Arc::new(MemoryCredentialStore::with_credential(Credential::new(token)))
}

pub fn empty_store() -> Arc<MemoryCredentialStore> {
    Arc::new(MemoryCredentialStore::new())
}

/// Store whose every operation fails, standing in for exhausted storage
#[derive(Debug, Default)]
pub struct FailingStore;

#[async_trait]
impl CredentialStore for FailingStore {
    async fn get(&self) -> Result<Option<Credential>, StoreError> {
        Err(StoreError::Unavailable("quota exceeded".to_string()))
    }

    async fn set(&self, _credential: &Credential) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("quota exceeded".to_string()))
    }

    async fn clear(&self) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("quota exceeded".to_string()))
    }
}

fn router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/expired", get(expired))
        .route("/api/slow-expired", get(slow_expired))
        .route("/api/forbidden", get(forbidden))
        .route("/api/bad-input", get(bad_input))
        .route("/api/slow", get(slow))
        .route("/api/garbage", get(garbage))
        .fallback(echo)
        .layer(middleware::from_fn_with_state(state, record))
}

async fn record(State(state): State<Arc<MockState>>, request: Request, next: Next) -> Response {
    let seen = Seen {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        authorization: request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    };
    state.seen.lock().unwrap().push(seen);
    next.run(request).await
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|token| VALID_TOKENS.contains(&token))
        .unwrap_or(false)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": true, "message": "Invalid or expired token", "code": "UNAUTHORIZED" })),
    )
        .into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default().to_string();
    match body["password"].as_str() {
        Some("pw") => Json(json!({
            "token": "T2",
            "user": { "email": email, "name": "Test User", "role": "analyst" }
        }))
        .into_response(),
        Some("envelope") => Json(json!({
            "success": true,
            "data": { "token": "T3" }
        }))
        .into_response(),
        Some("no-token") => Json(json!({ "message": "welcome" })).into_response(),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": true, "message": "Invalid email or password", "code": "UNAUTHORIZED" })),
        )
            .into_response(),
    }
}

async fn expired() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "success": false, "error": "Token expired" })),
    )
        .into_response()
}

async fn slow_expired() -> Response {
    tokio::time::sleep(Duration::from_millis(300)).await;
    expired().await
}

async fn forbidden() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "error": true, "message": "Not your contract", "code": "FORBIDDEN" })),
    )
        .into_response()
}

async fn bad_input() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": true,
            "message": "Invalid field format",
            "code": "VALIDATION_ERROR",
            "field_errors": { "period": "Unknown period" }
        })),
    )
        .into_response()
}

async fn slow() -> Response {
    tokio::time::sleep(Duration::from_secs(3)).await;
    Json(json!({ "late": true })).into_response()
}

async fn garbage() -> Response {
    (StatusCode::OK, "<html>definitely not json</html>").into_response()
}

/// Every catalog endpoint: requires a valid bearer token and echoes the request
async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if method == Method::DELETE {
        return StatusCode::NO_CONTENT.into_response();
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let parsed_body = if content_type.starts_with("application/json") {
        serde_json::from_slice::<Value>(&body).unwrap_or(Value::Null)
    } else {
        Value::Null
    };

    Json(json!({
        "method": method.as_str(),
        "path": uri.path(),
        "query": uri.query(),
        "contentType": content_type,
        "bodyLength": body.len(),
        "body": parsed_body,
    }))
    .into_response()
}
