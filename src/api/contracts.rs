use serde::Serialize;
use serde_json::Value;

use crate::error::GatewayError;
use crate::gateway::{FilePayload, Gateway, OutboundRequest, PendingUpload};

/// Filters accepted by `GET /contracts`
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub status: Option<String>,
    pub risk_level: Option<String>,
}

fn upload_request(file: FilePayload, metadata: Option<Value>) -> OutboundRequest {
    let request = OutboundRequest::post("/contracts/upload").file(file);
    match metadata {
        Some(metadata) => request.json(metadata),
        None => request,
    }
}

impl Gateway {
    /// Upload a contract document, optionally with a metadata object
    pub async fn upload_contract(&self, file: FilePayload, metadata: Option<Value>) -> Result<Value, GatewayError> {
        self.request(&upload_request(file, metadata)).await
    }

    /// Upload a contract document and observe its progress
    pub async fn upload_contract_with_progress(
        &self,
        file: FilePayload,
        metadata: Option<Value>,
    ) -> Result<PendingUpload, GatewayError> {
        self.request_with_progress(&upload_request(file, metadata)).await
    }

    pub async fn get_contract(&self, id: &str) -> Result<Value, GatewayError> {
        self.request(&OutboundRequest::get("/contracts").segment(id)).await
    }

    pub async fn get_contracts(&self, query: &ContractQuery) -> Result<Value, GatewayError> {
        let request = OutboundRequest::get("/contracts").with_query(query)?;
        self.request(&request).await
    }

    pub async fn delete_contract(&self, id: &str) -> Result<Value, GatewayError> {
        self.request(&OutboundRequest::delete("/contracts").segment(id)).await
    }
}
