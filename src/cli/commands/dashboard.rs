use clap::Subcommand;

use crate::api::dashboard::DEFAULT_TREND_PERIOD;
use crate::cli::utils::output_result;
use crate::cli::Context;

#[derive(Subcommand)]
pub enum DashboardCommands {
    #[command(about = "Portfolio statistics")]
    Stats,

    #[command(about = "Risk trends over a period")]
    Trends {
        #[arg(long, default_value = DEFAULT_TREND_PERIOD, help = "Period such as 3m, 6m, 1y")]
        period: String,
    },
}

pub async fn handle(cmd: DashboardCommands, ctx: &Context) -> anyhow::Result<()> {
    let output_format = &ctx.output_format;

    match cmd {
        DashboardCommands::Stats => {
            let result = ctx.gateway.get_dashboard_stats().await;
            output_result(output_format, "Dashboard statistics:", result)
        }
        DashboardCommands::Trends { period } => {
            let result = ctx.gateway.get_risk_trends(Some(&period)).await;
            output_result(output_format, &format!("Risk trends ({}):", period), result)
        }
    }
}
