use serde_json::Value;

use crate::error::GatewayError;
use crate::gateway::{Gateway, OutboundRequest};

impl Gateway {
    pub async fn get_obligations(&self, contract_id: Option<&str>) -> Result<Value, GatewayError> {
        let mut request = OutboundRequest::get("/obligations");
        if let Some(contract_id) = contract_id {
            request = request.query_pair("contractId", contract_id);
        }
        self.request(&request).await
    }

    /// Replace an obligation with `data`, as `PUT /obligations/{id}`
    pub async fn update_obligation(&self, id: &str, data: Value) -> Result<Value, GatewayError> {
        self.request(&OutboundRequest::put("/obligations").segment(id).json(data)).await
    }
}
