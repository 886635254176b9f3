// Gateway Error Types
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

use crate::store::StoreError;

/// Coarse classification of a failed gateway call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Remote service rejected the credential (401)
    AuthorizationRejected,
    /// Network unreachable, timeout, or undecodable response
    Transport,
    /// Remote service rejected the request input (400, 422)
    Validation,
    /// Credential store read or write failed
    Storage,
    /// Any other non-success status
    Remote,
}

/// Failure of one gateway call, as seen by the caller
#[derive(Debug, Error)]
pub enum GatewayError {
    // 401 on any call other than the login exchange
    #[error("authorization rejected: {message}")]
    Unauthorized { message: String },

    // 401 on the login exchange
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    // 400 Bad Request / 422 Unprocessable Entity
    #[error("validation failed ({status}): {message}")]
    Validation {
        status: u16,
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },

    // 403, 404, 409, 429, 5xx ...
    #[error("remote error ({status}): {message}")]
    Remote {
        status: u16,
        message: String,
        code: Option<String>,
    },

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport failure: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),

    #[error("gateway task failed: {0}")]
    Task(String),
}

impl GatewayError {
    /// Classify this error per the gateway's failure taxonomy
    pub fn class(&self) -> ErrorClass {
        match self {
            GatewayError::Unauthorized { .. } => ErrorClass::AuthorizationRejected,
            GatewayError::InvalidCredentials(_) => ErrorClass::Validation,
            GatewayError::Validation { .. } => ErrorClass::Validation,
            GatewayError::Remote { .. } => ErrorClass::Remote,
            GatewayError::Timeout(_)
            | GatewayError::Transport(_)
            | GatewayError::Decode(_)
            | GatewayError::Task(_) => ErrorClass::Transport,
            GatewayError::InvalidRequest(_) => ErrorClass::Validation,
            GatewayError::Storage(_) => ErrorClass::Storage,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, GatewayError::Unauthorized { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, GatewayError::Timeout(_))
    }

    /// HTTP status reported by the remote service, if one was received
    pub fn status_code(&self) -> Option<u16> {
        match self {
            GatewayError::Unauthorized { .. } | GatewayError::InvalidCredentials(_) => Some(401),
            GatewayError::Validation { status, .. } => Some(*status),
            GatewayError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Stable error code for output and client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            GatewayError::Unauthorized { .. } => "UNAUTHORIZED",
            GatewayError::InvalidCredentials(_) => "INVALID_CREDENTIALS",
            GatewayError::Validation { .. } => "VALIDATION_ERROR",
            GatewayError::Remote { .. } => "REMOTE_ERROR",
            GatewayError::Timeout(_) => "TIMEOUT",
            GatewayError::Transport(_) => "TRANSPORT_ERROR",
            GatewayError::Decode(_) => "MALFORMED_RESPONSE",
            GatewayError::InvalidRequest(_) => "INVALID_REQUEST",
            GatewayError::Storage(_) => "STORAGE_ERROR",
            GatewayError::Task(_) => "TASK_ERROR",
        }
    }

    /// Classify a non-success response from its status and raw body
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let parsed = ErrorBody::parse(body);
        let message = parsed
            .as_ref()
            .and_then(ErrorBody::message)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());

        match status {
            StatusCode::UNAUTHORIZED => GatewayError::Unauthorized { message },
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => GatewayError::Validation {
                status: status.as_u16(),
                message,
                field_errors: parsed.and_then(|b| b.field_errors),
            },
            _ => GatewayError::Remote {
                status: status.as_u16(),
                message,
                code: parsed.and_then(|b| b.code),
            },
        }
    }

    /// Map a reqwest failure, separating timeouts from other transport errors
    pub fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout(timeout)
        } else if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else {
            GatewayError::Transport(err)
        }
    }
}

/// Error envelopes emitted by the backend family:
/// `{"error": true, "message": "...", "code": "...", "field_errors": {...}}`
/// or `{"success": false, "error": "..."}`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    field_errors: Option<HashMap<String, String>>,
}

impl ErrorBody {
    fn parse(body: &[u8]) -> Option<Self> {
        serde_json::from_slice(body).ok()
    }

    fn message(&self) -> Option<String> {
        if let Some(message) = self.message.as_ref().filter(|m| !m.is_empty()) {
            return Some(message.clone());
        }
        match &self.error {
            Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        }
    }
}
