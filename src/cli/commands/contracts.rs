use clap::Subcommand;
use futures::StreamExt;
use std::io::Write;

use crate::api::ContractQuery;
use crate::cli::utils::{output_result, read_json_input};
use crate::cli::{Context, OutputFormat};
use crate::gateway::FilePayload;

#[derive(Subcommand)]
pub enum ContractCommands {
    #[command(about = "List contracts")]
    List {
        #[arg(long, help = "Maximum number of contracts")]
        limit: Option<u32>,
        #[arg(long, help = "Number of contracts to skip")]
        offset: Option<u32>,
        #[arg(long, help = "Filter by processing status")]
        status: Option<String>,
        #[arg(long, help = "Filter by risk level (low, medium, high)")]
        risk_level: Option<String>,
    },

    #[command(about = "Show one contract")]
    Get {
        #[arg(help = "Contract ID")]
        id: String,
    },

    #[command(about = "Delete a contract")]
    Delete {
        #[arg(help = "Contract ID")]
        id: String,
    },

    #[command(about = "Upload a contract document")]
    Upload {
        #[arg(help = "Path to the document")]
        path: String,
        #[arg(long, help = "Metadata as a JSON object")]
        metadata: Option<String>,
    },
}

pub async fn handle(cmd: ContractCommands, ctx: &Context) -> anyhow::Result<()> {
    let output_format = &ctx.output_format;

    match cmd {
        ContractCommands::List { limit, offset, status, risk_level } => {
            let query = ContractQuery { limit, offset, status, risk_level };
            let result = ctx.gateway.get_contracts(&query).await;
            output_result(output_format, "Contracts:", result)
        }
        ContractCommands::Get { id } => {
            let result = ctx.gateway.get_contract(&id).await;
            output_result(output_format, &format!("Contract {}:", id), result)
        }
        ContractCommands::Delete { id } => {
            let result = ctx.gateway.delete_contract(&id).await;
            output_result(output_format, &format!("Contract {} deleted", id), result)
        }
        ContractCommands::Upload { path, metadata } => {
            let file = FilePayload::from_path(&path)
                .await
                .map_err(|e| anyhow::anyhow!("Cannot read {}: {}", path, e))?;
            let metadata = metadata.map(|m| read_json_input(Some(m))).transpose()?;

            let upload = ctx.gateway.upload_contract_with_progress(file, metadata).await?;
            let mut progress = upload.progress;
            while let Some(percent) = progress.next().await {
                if matches!(output_format, OutputFormat::Text) {
                    eprint!("\rUploading {}: {:>3}%", path, percent);
                    let _ = std::io::stderr().flush();
                }
            }
            if matches!(output_format, OutputFormat::Text) {
                eprintln!();
            }

            let result = upload.response.await;
            output_result(output_format, &format!("Uploaded {}", path), result)
        }
    }
}
