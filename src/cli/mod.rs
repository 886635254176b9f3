pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::config::config;
use crate::gateway::Gateway;
use crate::navigation::Navigation;
use crate::routes::RouteGate;
use crate::store::FileCredentialStore;

#[derive(Parser)]
#[command(name = "clia")]
#[command(about = "CLIA CLI - Command-line client for the contract-analysis platform API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Authentication and session management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Contract upload, retrieval and deletion")]
    Contracts {
        #[command(subcommand)]
        cmd: commands::contracts::ContractCommands,
    },

    #[command(about = "Run analysis agents and check job status")]
    Agents {
        #[command(subcommand)]
        cmd: commands::agents::AgentCommands,
    },

    #[command(about = "Dashboard statistics and risk trends")]
    Dashboard {
        #[command(subcommand)]
        cmd: commands::dashboard::DashboardCommands,
    },

    #[command(about = "Compliance reports and audit logs")]
    Compliance {
        #[command(subcommand)]
        cmd: commands::compliance::ComplianceCommands,
    },

    #[command(about = "Contract obligations")]
    Obligations {
        #[command(subcommand)]
        cmd: commands::obligations::ObligationCommands,
    },

    #[command(about = "Check screen admission for the current session")]
    Route {
        #[command(subcommand)]
        cmd: commands::route::RouteCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Everything a command needs: the shared gateway and the route gate bound to its session
pub struct Context {
    pub gateway: Gateway,
    pub gate: RouteGate,
    pub output_format: OutputFormat,
}

impl Context {
    pub async fn new(output_format: OutputFormat) -> anyhow::Result<Self> {
        let config = config();
        let store = Arc::new(FileCredentialStore::in_config_dir()?);
        tracing::debug!("Using credential file {}", store.path().display());

        let gateway = Gateway::connect(config, store).await?;
        let gate = RouteGate::new(
            gateway.session().clone(),
            gateway.navigator().clone(),
            config.session.clone(),
        );

        Ok(Self {
            gateway,
            gate,
            output_format,
        })
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let ctx = Context::new(output_format).await?;
    let mut host = ctx.gateway.navigator().subscribe();

    let result = match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, &ctx).await,
        Commands::Contracts { cmd } => commands::contracts::handle(cmd, &ctx).await,
        Commands::Agents { cmd } => commands::agents::handle(cmd, &ctx).await,
        Commands::Dashboard { cmd } => commands::dashboard::handle(cmd, &ctx).await,
        Commands::Compliance { cmd } => commands::compliance::handle(cmd, &ctx).await,
        Commands::Obligations { cmd } => commands::obligations::handle(cmd, &ctx).await,
        Commands::Route { cmd } => commands::route::handle(cmd, &ctx).await,
    };

    follow_navigation(&mut host, &ctx);
    result
}

/// The CLI's routing layer: a terminal has no screens, so redirects become hints
fn follow_navigation(host: &mut broadcast::Receiver<Navigation>, ctx: &Context) {
    loop {
        match host.try_recv() {
            Ok(Navigation::ToLogin) => {
                eprintln!(
                    "Session is no longer valid ({}). Run `clia auth login <email>` to sign in again.",
                    ctx.gate.redirect_path(&Navigation::ToLogin)
                );
            }
            Ok(Navigation::ToDefault) => {
                tracing::debug!("Redirect to {}", ctx.gate.redirect_path(&Navigation::ToDefault));
            }
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::debug!("Skipped {} navigation signals", skipped);
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }
}
