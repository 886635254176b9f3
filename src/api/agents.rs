use serde_json::{json, Value};

use crate::error::GatewayError;
use crate::gateway::{Gateway, OutboundRequest};

impl Gateway {
    /// Queue an analysis agent against a contract; the response carries the job id
    pub async fn run_agent(&self, contract_id: &str, agent_type: &str) -> Result<Value, GatewayError> {
        let request = OutboundRequest::post("/agents/run").json(json!({
            "contractId": contract_id,
            "agentType": agent_type,
        }));
        self.request(&request).await
    }

    pub async fn get_agent_status(&self, job_id: &str) -> Result<Value, GatewayError> {
        self.request(&OutboundRequest::get("/agents/status").segment(job_id)).await
    }
}
