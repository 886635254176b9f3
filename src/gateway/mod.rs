pub mod progress;
pub mod request;

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use url::Url;
use uuid::Uuid;

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::navigation::{Navigation, Navigator};
use crate::session::{Identity, SessionContext};
use crate::store::{Credential, CredentialStore};

pub use progress::UploadProgress;
pub use request::{FilePayload, OutboundRequest};

use progress::{progress_body, ProgressReporter};

/// Identity endpoint, relative to the API root
pub const LOGIN_PATH: &str = "/auth/login";

/// How the inbound stage treats a 401
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Inbound {
    /// Credential rejected: clear store and session, send the host to login
    Guarded,
    /// Login exchange: a 401 means bad credentials and touches nothing
    Exchange,
}

/// Result of a successful login exchange
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub identity: Identity,
    pub credential: Credential,
    /// Full response body from the identity endpoint
    pub payload: Value,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    user: Option<Identity>,
}

/// Single shared HTTP client for the platform API.
///
/// Every call passes through the same two stages: the outbound stage attaches
/// the stored bearer credential, and the inbound stage turns a 401 into a full
/// session invalidation before the caller sees the result. Cloning shares the
/// underlying client, store, session and navigator.
#[derive(Clone)]
pub struct Gateway {
    inner: Arc<GatewayInner>,
}

struct GatewayInner {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    log_requests: bool,
    store: Arc<dyn CredentialStore>,
    session: SessionContext,
    navigator: Navigator,
}

impl Gateway {
    pub fn new(
        config: &GatewayConfig,
        store: Arc<dyn CredentialStore>,
        session: SessionContext,
        navigator: Navigator,
    ) -> Result<Self, GatewayError> {
        let base_url = Url::parse(&config.api.base_url).map_err(|e| {
            GatewayError::InvalidRequest(format!("invalid API base URL '{}': {}", config.api.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::InvalidRequest(format!(
                "API base URL '{}' cannot carry paths",
                config.api.base_url
            )));
        }

        let timeout = config.api.timeout();
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(config.api.user_agent.clone())
            .build()
            .map_err(GatewayError::Transport)?;

        Ok(Self {
            inner: Arc::new(GatewayInner {
                http,
                base_url,
                timeout,
                log_requests: config.api.enable_request_logging,
                store,
                session,
                navigator,
            }),
        })
    }

    /// Build a gateway whose session is initialized from the store's contents
    pub async fn connect(config: &GatewayConfig, store: Arc<dyn CredentialStore>) -> Result<Self, GatewayError> {
        let session = SessionContext::from_store(store.as_ref()).await;
        let navigator = Navigator::new(config.session.navigation_buffer);
        Self::new(config, store, session, navigator)
    }

    pub fn session(&self) -> &SessionContext {
        &self.inner.session
    }

    pub fn navigator(&self) -> &Navigator {
        &self.inner.navigator
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.inner.store
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Exchange email and password for a credential.
    ///
    /// On success the credential is stored first, then the session becomes
    /// authenticated. On any failure the session is left as it was.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, GatewayError> {
        let request = OutboundRequest::post(LOGIN_PATH).json(json!({
            "email": email,
            "password": password,
        }));
        let payload = self.send(&request, Inbound::Exchange).await?;

        // Accept both a bare body and the `{"success": true, "data": {...}}` envelope
        let body = payload
            .get("data")
            .filter(|data| data.get("token").is_some())
            .unwrap_or(&payload);
        let response: LoginResponse = serde_json::from_value(body.clone())
            .map_err(|e| GatewayError::Decode(format!("login response: {}", e)))?;

        let token = response
            .token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| GatewayError::Decode("login response carries no token".to_string()))?;
        let credential = Credential::new(token);

        self.inner.store.set(&credential).await?;

        let mut identity = response.user.unwrap_or_default();
        if identity.email.is_none() {
            identity.email = Some(email.to_string());
        }
        self.inner.session.set_authenticated(identity.clone());

        Ok(LoginOutcome {
            identity,
            credential,
            payload,
        })
    }

    /// Drop the local session. Always succeeds; a store failure is logged.
    pub async fn logout(&self) {
        if let Err(e) = self.inner.store.clear().await {
            tracing::warn!("Failed to clear credential store on logout: {}", e);
        }
        self.inner.session.set_unauthenticated();
    }

    /// Send one request and decode its JSON payload
    pub async fn request(&self, request: &OutboundRequest) -> Result<Value, GatewayError> {
        self.send(request, Inbound::Guarded).await
    }

    pub async fn request_as<T: DeserializeOwned>(&self, request: &OutboundRequest) -> Result<T, GatewayError> {
        let payload = self.request(request).await?;
        serde_json::from_value(payload).map_err(|e| GatewayError::Decode(e.to_string()))
    }

    /// Start a request and return its upload progress alongside the pending
    /// response. The call proceeds whether or not the progress is consumed.
    pub async fn request_with_progress(&self, request: &OutboundRequest) -> Result<PendingUpload, GatewayError> {
        let total = request.file.as_ref().map(|f| f.len() as u64).unwrap_or(0);
        let (reporter, progress) = ProgressReporter::channel(total);

        let builder = self.prepare(request, Some(Arc::clone(&reporter)))?;
        let builder = self.outbound(builder).await;
        let response = self.dispatch(builder, request, Inbound::Guarded, Some(reporter));

        Ok(PendingUpload { progress, response })
    }

    async fn send(&self, request: &OutboundRequest, inbound: Inbound) -> Result<Value, GatewayError> {
        let builder = self.prepare(request, None)?;
        let builder = self.outbound(builder).await;
        self.dispatch(builder, request, inbound, None).await
    }

    /// Translate the caller's description into a wire request, without credentials
    fn prepare(
        &self,
        request: &OutboundRequest,
        reporter: Option<Arc<ProgressReporter>>,
    ) -> Result<RequestBuilder, GatewayError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::InvalidRequest("API base URL cannot carry paths".to_string()))?
            .pop_if_empty()
            .extend(request.segments());

        let mut builder = self.inner.http.request(request.method.clone(), url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        match &request.file {
            Some(file) => {
                let body = match reporter {
                    Some(reporter) => progress_body(file.bytes.clone(), reporter),
                    None => reqwest::Body::from(file.bytes.clone()),
                };
                let mut part = reqwest::multipart::Part::stream_with_length(body, file.len() as u64)
                    .file_name(file.file_name.clone());
                if let Some(content_type) = &file.content_type {
                    part = part
                        .mime_str(content_type)
                        .map_err(|e| GatewayError::InvalidRequest(format!("content type '{}': {}", content_type, e)))?;
                }

                let mut form = reqwest::multipart::Form::new().part("file", part);
                if let Some(metadata) = &request.body {
                    form = form.text("metadata", metadata.to_string());
                }
                builder = builder.multipart(form);
            }
            None => {
                if let Some(body) = &request.body {
                    builder = builder.json(body);
                }
            }
        }

        Ok(builder)
    }

    /// Outbound stage: attach the stored credential when there is one.
    /// Never fails the call; an unreadable store means no credential.
    async fn outbound(&self, builder: RequestBuilder) -> RequestBuilder {
        let credential = match self.inner.store.get().await {
            Ok(credential) => credential,
            Err(e) => {
                tracing::warn!("Credential store unreadable, sending unauthenticated: {}", e);
                None
            }
        };

        match credential {
            Some(credential) => match HeaderValue::from_str(&credential.bearer()) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    builder.header(AUTHORIZATION, value)
                }
                Err(_) => {
                    tracing::warn!("Stored credential is not a valid header value, sending unauthenticated");
                    builder
                }
            },
            None => builder,
        }
    }

    /// Transmit and run the inbound stage on a detached task, so a caller that
    /// stops waiting cannot skip the authorization check.
    fn dispatch(
        &self,
        builder: RequestBuilder,
        request: &OutboundRequest,
        inbound: Inbound,
        reporter: Option<Arc<ProgressReporter>>,
    ) -> ResponseHandle {
        let inner = Arc::clone(&self.inner);
        let request_id = Uuid::new_v4();
        let method = request.method.clone();
        let path = request.path();

        let handle = tokio::spawn(async move {
            let started = Instant::now();
            if inner.log_requests {
                tracing::info!(%request_id, "-> {} {}", method, path);
            }

            let result = inner.transmit(builder).await;
            let result = inner.inbound(result, inbound).await;

            match (&result, &reporter) {
                (Ok(_), Some(reporter)) => reporter.succeed(),
                (Err(_), Some(reporter)) => reporter.fail(),
                _ => {}
            }

            match &result {
                Ok(_) => tracing::debug!(%request_id, "<- {} {} ok in {:?}", method, path, started.elapsed()),
                Err(e) => tracing::debug!(%request_id, "<- {} {} failed in {:?}: {}", method, path, started.elapsed(), e),
            }
            result
        });

        ResponseHandle { inner: handle }
    }
}

impl GatewayInner {
    async fn transmit(&self, builder: RequestBuilder) -> Result<Value, GatewayError> {
        let response = builder
            .send()
            .await
            .map_err(|e| GatewayError::from_transport(e, self.timeout))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| GatewayError::from_transport(e, self.timeout))?;

        if !status.is_success() {
            return Err(GatewayError::from_response(status, &body));
        }
        if status == StatusCode::NO_CONTENT || body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        serde_json::from_slice(&body).map_err(|e| GatewayError::Decode(format!("response body is not JSON: {}", e)))
    }

    /// Inbound stage: a 401 invalidates the session before the caller sees it
    async fn inbound(&self, result: Result<Value, GatewayError>, inbound: Inbound) -> Result<Value, GatewayError> {
        match result {
            Err(GatewayError::Unauthorized { message }) => match inbound {
                Inbound::Exchange => Err(GatewayError::InvalidCredentials(message)),
                Inbound::Guarded => {
                    self.invalidate().await;
                    Err(GatewayError::Unauthorized { message })
                }
            },
            other => other,
        }
    }

    async fn invalidate(&self) {
        if let Err(e) = self.store.clear().await {
            tracing::warn!("Failed to clear rejected credential: {}", e);
        }
        self.session.set_unauthenticated();
        tracing::info!("Credential rejected by API, redirecting to login");
        self.navigator.emit(Navigation::ToLogin);
    }
}

/// Pending result of a dispatched call
#[derive(Debug)]
pub struct ResponseHandle {
    inner: JoinHandle<Result<Value, GatewayError>>,
}

impl Future for ResponseHandle {
    type Output = Result<Value, GatewayError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.inner).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(e)) => Poll::Ready(Err(GatewayError::Task(e.to_string()))),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// An upload in flight: its progress sequence and its eventual response
#[derive(Debug)]
pub struct PendingUpload {
    pub progress: UploadProgress,
    pub response: ResponseHandle,
}
