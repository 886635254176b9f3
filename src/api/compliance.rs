use serde::Serialize;
use serde_json::Value;

use crate::error::GatewayError;
use crate::gateway::{Gateway, OutboundRequest};

/// Filters accepted by `GET /compliance/audit-logs`
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogQuery {
    pub limit: Option<u32>,
    pub user_id: Option<String>,
    pub action: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl Gateway {
    /// Compliance report for one contract, or portfolio-wide when `contract_id` is `None`
    pub async fn get_compliance_report(&self, contract_id: Option<&str>) -> Result<Value, GatewayError> {
        let mut request = OutboundRequest::get("/compliance/report");
        if let Some(contract_id) = contract_id {
            request = request.query_pair("contractId", contract_id);
        }
        self.request(&request).await
    }

    pub async fn get_audit_logs(&self, query: &AuditLogQuery) -> Result<Value, GatewayError> {
        let request = OutboundRequest::get("/compliance/audit-logs").with_query(query)?;
        self.request(&request).await
    }
}
