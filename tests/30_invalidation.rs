mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use clia_gateway::{CredentialStore, GatewayError, Navigation, OutboundRequest, RouteGate, Session};
use serde_json::Value;
use tokio::sync::broadcast::error::TryRecvError;

use common::{store_with, MockApi};

#[tokio::test]
async fn rejected_credential_ends_session_and_redirects_once() -> Result<()> {
    let api = MockApi::start().await?;
    let store = store_with("T1");
    let gateway = api.connect(store.clone()).await;
    let mut host = gateway.navigator().subscribe();
    assert!(gateway.session().is_authenticated());

    let err = gateway.request(&OutboundRequest::get("/expired")).await.unwrap_err();

    assert!(matches!(err, GatewayError::Unauthorized { ref message } if message == "Token expired"));
    assert!(err.is_unauthorized());
    assert_eq!(store.get().await?, None);
    assert_eq!(gateway.session().current(), Session::Absent);
    assert_eq!(host.try_recv()?, Navigation::ToLogin);
    assert_eq!(host.try_recv(), Err(TryRecvError::Empty));
    Ok(())
}

#[tokio::test]
async fn session_is_ended_before_caller_sees_the_error() -> Result<()> {
    let api = MockApi::start().await?;
    let gateway = api.connect(store_with("T1")).await;

    let result = gateway.request_as::<Value>(&OutboundRequest::get("/expired")).await;

    // Observed from the caller's error path, the session is already gone
    assert!(result.is_err());
    assert!(!gateway.session().is_authenticated());
    Ok(())
}

#[tokio::test]
async fn catalog_call_with_unknown_token_invalidates() -> Result<()> {
    let api = MockApi::start().await?;
    let store = store_with("stale");
    let gateway = api.connect(store.clone()).await;

    let err = gateway.get_dashboard_stats().await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(store.get().await?, None);
    assert!(!gateway.session().is_authenticated());
    Ok(())
}

#[tokio::test]
async fn concurrent_rejections_end_the_session_once() -> Result<()> {
    let api = MockApi::start().await?;
    let store = store_with("T1");
    let gateway = api.connect(store.clone()).await;
    let transitions = Arc::new(Mutex::new(Vec::new()));
    let _sub = {
        let transitions = Arc::clone(&transitions);
        gateway
            .session()
            .on_change(move |session| transitions.lock().unwrap().push(session.clone()))
    };

    let request = OutboundRequest::get("/expired");
    let (first, second) = tokio::join!(gateway.request(&request), gateway.request(&request));

    assert!(first.unwrap_err().is_unauthorized());
    assert!(second.unwrap_err().is_unauthorized());
    assert_eq!(store.get().await?, None);
    assert_eq!(*transitions.lock().unwrap(), vec![Session::Absent]);
    Ok(())
}

#[tokio::test]
async fn abandoned_call_still_invalidates() -> Result<()> {
    let api = MockApi::start().await?;
    let store = store_with("T1");
    let gateway = api.connect(store.clone()).await;
    let mut host = gateway.navigator().subscribe();

    let gave_up = tokio::time::timeout(
        Duration::from_millis(50),
        gateway.request(&OutboundRequest::get("/slow-expired")),
    )
    .await;
    assert!(gave_up.is_err(), "call should still be in flight");
    assert!(gateway.session().is_authenticated());

    tokio::time::sleep(Duration::from_millis(700)).await;

    assert_eq!(store.get().await?, None);
    assert_eq!(gateway.session().current(), Session::Absent);
    assert_eq!(host.try_recv()?, Navigation::ToLogin);
    Ok(())
}

#[tokio::test]
async fn route_gate_follows_invalidation() -> Result<()> {
    let api = MockApi::start().await?;
    let gateway = api.connect(store_with("T1")).await;
    let gate = RouteGate::new(
        gateway.session().clone(),
        gateway.navigator().clone(),
        api.config().session,
    );

    assert!(gate.check("/dashboard").is_admitted());

    let _ = gateway.request(&OutboundRequest::get("/expired")).await;

    let admission = gate.check("/dashboard");
    assert_eq!(admission.redirect(), Some(&Navigation::ToLogin));
    assert!(gate.check("/login").is_admitted());
    Ok(())
}

#[tokio::test]
async fn rejection_without_session_still_redirects() -> Result<()> {
    let api = MockApi::start().await?;
    let gateway = api.connect(common::empty_store()).await;
    let mut host = gateway.navigator().subscribe();

    let err = gateway.get_contract("c-1").await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(api.last_seen().authorization, None);
    assert_eq!(host.try_recv()?, Navigation::ToLogin);
    Ok(())
}
