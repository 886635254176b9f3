mod common;

use anyhow::Result;
use clia_gateway::api::{AuditLogQuery, ContractQuery};
use serde_json::{json, Value};

use common::{store_with, MockApi};

fn query_pairs(echo: &Value) -> Vec<String> {
    echo["query"]
        .as_str()
        .map(|q| q.split('&').map(str::to_string).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn contracts_list_sends_only_given_filters() -> Result<()> {
    let api = MockApi::start().await?;
    let gateway = api.connect(store_with("T1")).await;

    let echo = gateway
        .get_contracts(&ContractQuery {
            limit: Some(5),
            risk_level: Some("high".to_string()),
            ..Default::default()
        })
        .await?;

    assert_eq!(echo["method"], "GET");
    assert_eq!(echo["path"], "/api/contracts");
    let mut pairs = query_pairs(&echo);
    pairs.sort();
    assert_eq!(pairs, vec!["limit=5", "riskLevel=high"]);
    Ok(())
}

#[tokio::test]
async fn contracts_list_without_filters_has_no_query() -> Result<()> {
    let api = MockApi::start().await?;
    let gateway = api.connect(store_with("T1")).await;

    let echo = gateway.get_contracts(&ContractQuery::default()).await?;

    assert_eq!(echo["query"], Value::Null);
    Ok(())
}

#[tokio::test]
async fn contract_by_id_and_delete() -> Result<()> {
    let api = MockApi::start().await?;
    let gateway = api.connect(store_with("T1")).await;

    let echo = gateway.get_contract("c-42").await?;
    assert_eq!(echo["path"], "/api/contracts/c-42");

    let deleted = gateway.delete_contract("c-42").await?;
    assert_eq!(deleted, Value::Null);
    let seen = api.last_seen();
    assert_eq!(seen.method, "DELETE");
    assert_eq!(seen.path, "/api/contracts/c-42");
    Ok(())
}

#[tokio::test]
async fn agents_run_and_status() -> Result<()> {
    let api = MockApi::start().await?;
    let gateway = api.connect(store_with("T1")).await;

    let echo = gateway.run_agent("c-7", "risk").await?;
    assert_eq!(echo["method"], "POST");
    assert_eq!(echo["path"], "/api/agents/run");
    assert_eq!(echo["body"], json!({ "contractId": "c-7", "agentType": "risk" }));

    let echo = gateway.get_agent_status("job-9").await?;
    assert_eq!(echo["path"], "/api/agents/status/job-9");
    Ok(())
}

#[tokio::test]
async fn dashboard_stats_and_trend_period() -> Result<()> {
    let api = MockApi::start().await?;
    let gateway = api.connect(store_with("T1")).await;

    let echo = gateway.get_dashboard_stats().await?;
    assert_eq!(echo["path"], "/api/dashboard/stats");

    let echo = gateway.get_risk_trends(None).await?;
    assert_eq!(echo["path"], "/api/dashboard/risk-trends");
    assert_eq!(echo["query"], "period=6m");

    let echo = gateway.get_risk_trends(Some("1y")).await?;
    assert_eq!(echo["query"], "period=1y");
    Ok(())
}

#[tokio::test]
async fn compliance_report_and_audit_logs() -> Result<()> {
    let api = MockApi::start().await?;
    let gateway = api.connect(store_with("T1")).await;

    let echo = gateway.get_compliance_report(None).await?;
    assert_eq!(echo["path"], "/api/compliance/report");
    assert_eq!(echo["query"], Value::Null);

    let echo = gateway.get_compliance_report(Some("c-1")).await?;
    assert_eq!(echo["query"], "contractId=c-1");

    let echo = gateway
        .get_audit_logs(&AuditLogQuery {
            limit: Some(20),
            user_id: Some("u-3".to_string()),
            start_date: Some("2024-01-01".to_string()),
            ..Default::default()
        })
        .await?;
    assert_eq!(echo["path"], "/api/compliance/audit-logs");
    let mut pairs = query_pairs(&echo);
    pairs.sort();
    assert_eq!(pairs, vec!["limit=20", "startDate=2024-01-01", "userId=u-3"]);
    Ok(())
}

#[tokio::test]
async fn obligations_list_and_update() -> Result<()> {
    let api = MockApi::start().await?;
    let gateway = api.connect(store_with("T1")).await;

    let echo = gateway.get_obligations(Some("c-1")).await?;
    assert_eq!(echo["path"], "/api/obligations");
    assert_eq!(echo["query"], "contractId=c-1");

    let update = json!({ "status": "completed", "notes": "Paid on time" });
    let echo = gateway.update_obligation("ob-5", update.clone()).await?;
    assert_eq!(echo["method"], "PUT");
    assert_eq!(echo["path"], "/api/obligations/ob-5");
    assert_eq!(echo["body"], update);
    Ok(())
}
