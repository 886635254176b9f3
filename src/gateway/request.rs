use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

use crate::error::GatewayError;

/// File attached to an outbound request, sent as a multipart `file` part
#[derive(Debug, Clone)]
pub struct FilePayload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FilePayload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Read a file from disk, guessing the content type from its extension
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let content_type = match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
            Some("pdf") => Some("application/pdf"),
            Some("doc") => Some("application/msword"),
            Some("docx") => Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
            Some("txt") => Some("text/plain"),
            Some("json") => Some("application/json"),
            _ => None,
        };

        Ok(Self {
            file_name,
            content_type: content_type.map(str::to_string),
            bytes,
        })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Description of one API call, built and owned by the caller.
///
/// The path is kept as segments so identifiers are percent-encoded when the
/// URL is assembled. With a file attached, `body` travels as the multipart
/// `metadata` field.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    segments: Vec<String>,
    pub body: Option<Value>,
    pub query: Vec<(String, String)>,
    pub file: Option<FilePayload>,
}

impl OutboundRequest {
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            segments: path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            body: None,
            query: Vec::new(),
            file: None,
        }
    }

    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: &str) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: &str) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: &str) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append one raw path segment (an identifier, say); it is encoded on the wire
    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn query_pair(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Flatten a serializable parameter struct into query pairs, skipping nulls
    pub fn with_query<T: Serialize>(mut self, params: &T) -> Result<Self, GatewayError> {
        let value = serde_json::to_value(params)
            .map_err(|e| GatewayError::InvalidRequest(format!("query parameters: {}", e)))?;

        match value {
            Value::Null => {}
            Value::Object(map) => {
                for (key, value) in map {
                    match value {
                        Value::Null => {}
                        Value::String(s) => self.query.push((key, s)),
                        Value::Bool(_) | Value::Number(_) => self.query.push((key, value.to_string())),
                        other => {
                            return Err(GatewayError::InvalidRequest(format!(
                                "query parameter '{}' must be a scalar, got {}",
                                key, other
                            )))
                        }
                    }
                }
            }
            other => {
                return Err(GatewayError::InvalidRequest(format!(
                    "query parameters must be an object, got {}",
                    other
                )))
            }
        }
        Ok(self)
    }

    pub fn file(mut self, file: FilePayload) -> Self {
        self.file = Some(file);
        self
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Display form of the path, for logging
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}
