use clap::Parser;
use clia_gateway::cli::Cli;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so CLIA_API_URL and friends apply
    let _ = dotenvy::dotenv();

    let default_filter = if clia_gateway::is_production!() { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with_writer(std::io::stderr)
        .init();

    let config = clia_gateway::config::config();
    tracing::debug!("Starting CLIA CLI in {:?} mode against {}", config.environment, config.api.base_url);

    let cli = Cli::parse();

    if let Err(e) = clia_gateway::cli::run(cli).await {
        match std::env::var("CLI_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => eprintln!("Error: {e:?}"),
            _ => eprintln!("Error: {e}"),
        }
        std::process::exit(1);
    }

    Ok(())
}
