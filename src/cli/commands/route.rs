use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::Context;
use crate::routes::Admission;

#[derive(Subcommand)]
pub enum RouteCommands {
    #[command(about = "Would navigating to PATH be admitted right now?")]
    Check {
        #[arg(help = "Screen path, e.g. /dashboard or /contracts/42")]
        path: String,
    },
}

pub async fn handle(cmd: RouteCommands, ctx: &Context) -> anyhow::Result<()> {
    match cmd {
        RouteCommands::Check { path } => {
            let admission = ctx.gate.check(&path);
            let message = match &admission {
                Admission::Admitted => format!("{} admitted", path),
                Admission::Denied { redirect } => {
                    format!("{} denied, redirect to {}", path, ctx.gate.redirect_path(redirect))
                }
            };

            output_success(
                &ctx.output_format,
                &message,
                Some(json!({
                    "route": ctx.gate.route(&path),
                    "admission": admission,
                })),
            )
        }
    }
}
