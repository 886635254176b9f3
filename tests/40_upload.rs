mod common;

use anyhow::Result;
use clia_gateway::{FilePayload, SessionContext};
use futures::StreamExt;
use serde_json::json;

use common::{empty_store, store_with, MockApi};

const ONE_MIB: usize = 1024 * 1024;

fn contract_pdf(size: usize) -> FilePayload {
    FilePayload::new("lease.pdf", vec![b'x'; size]).with_content_type("application/pdf")
}

#[tokio::test]
async fn upload_reports_monotonic_progress_ending_at_100() -> Result<()> {
    let api = MockApi::start().await?;
    let gateway = api.connect(store_with("T1")).await;

    let upload = gateway
        .upload_contract_with_progress(contract_pdf(ONE_MIB), Some(json!({ "title": "Lease 2024" })))
        .await?;
    let values: Vec<u8> = upload.progress.collect().await;
    let response = upload.response.await?;

    assert!(values.len() >= 2, "expected intermediate progress, got {:?}", values);
    assert!(values.windows(2).all(|w| w[0] <= w[1]), "not monotonic: {:?}", values);
    assert_eq!(values.last(), Some(&100));
    assert_eq!(values.iter().filter(|v| **v == 100).count(), 1);

    assert_eq!(response["method"], "POST");
    assert_eq!(response["path"], "/api/contracts/upload");
    assert!(response["contentType"].as_str().unwrap_or_default().starts_with("multipart/form-data"));
    assert!(response["bodyLength"].as_u64().unwrap_or_default() > ONE_MIB as u64);
    assert_eq!(api.last_seen().authorization.as_deref(), Some("Bearer T1"));
    Ok(())
}

#[tokio::test]
async fn rejected_upload_never_reaches_100() -> Result<()> {
    let api = MockApi::start().await?;
    let gateway = api.gateway(empty_store(), SessionContext::new());

    let upload = gateway.upload_contract_with_progress(contract_pdf(ONE_MIB), None).await?;
    let values: Vec<u8> = upload.progress.collect().await;
    let err = upload.response.await.unwrap_err();

    assert!(err.is_unauthorized(), "got {err:?}");
    assert!(values.iter().all(|v| *v < 100), "got {:?}", values);
    Ok(())
}

#[tokio::test]
async fn response_resolves_without_consuming_progress() -> Result<()> {
    let api = MockApi::start().await?;
    let gateway = api.connect(store_with("T1")).await;

    let upload = gateway.upload_contract_with_progress(contract_pdf(4096), None).await?;
    let response = upload.response.await?;

    assert_eq!(response["path"], "/api/contracts/upload");
    Ok(())
}

#[tokio::test]
async fn plain_upload_sends_multipart() -> Result<()> {
    let api = MockApi::start().await?;
    let gateway = api.connect(store_with("T1")).await;

    let response = gateway
        .upload_contract(contract_pdf(2048), Some(json!({ "counterparty": "Acme" })))
        .await?;

    assert!(response["contentType"].as_str().unwrap_or_default().starts_with("multipart/form-data"));
    assert!(response["bodyLength"].as_u64().unwrap_or_default() > 2048);
    Ok(())
}

#[tokio::test]
async fn upload_from_disk_guesses_content_type() -> Result<()> {
    let dir = std::env::temp_dir().join(format!("clia-upload-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("Master Agreement.DOCX");
    std::fs::write(&path, b"agreement")?;

    let file = FilePayload::from_path(&path).await?;
    std::fs::remove_dir_all(&dir)?;

    assert_eq!(file.file_name, "Master Agreement.DOCX");
    assert_eq!(
        file.content_type.as_deref(),
        Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
    );
    assert_eq!(file.len(), 9);
    Ok(())
}
