use serde_json::Value;

use crate::error::GatewayError;
use crate::gateway::{Gateway, OutboundRequest};

/// Period used by the dashboard when none is chosen
pub const DEFAULT_TREND_PERIOD: &str = "6m";

impl Gateway {
    pub async fn get_dashboard_stats(&self) -> Result<Value, GatewayError> {
        self.request(&OutboundRequest::get("/dashboard/stats")).await
    }

    /// Risk trend series for `period` (e.g. `6m`, `1y`), defaulting to six months
    pub async fn get_risk_trends(&self, period: Option<&str>) -> Result<Value, GatewayError> {
        let request = OutboundRequest::get("/dashboard/risk-trends")
            .query_pair("period", period.unwrap_or(DEFAULT_TREND_PERIOD));
        self.request(&request).await
    }
}
