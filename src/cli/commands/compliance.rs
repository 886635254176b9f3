use clap::Subcommand;

use crate::api::AuditLogQuery;
use crate::cli::utils::output_result;
use crate::cli::Context;

#[derive(Subcommand)]
pub enum ComplianceCommands {
    #[command(about = "Compliance report, portfolio-wide or for one contract")]
    Report {
        #[arg(long, help = "Restrict the report to one contract")]
        contract_id: Option<String>,
    },

    #[command(about = "Audit log entries")]
    AuditLogs {
        #[arg(long, help = "Maximum number of entries")]
        limit: Option<u32>,
        #[arg(long, help = "Filter by user ID")]
        user_id: Option<String>,
        #[arg(long, help = "Filter by action")]
        action: Option<String>,
        #[arg(long, help = "Earliest entry date (ISO 8601)")]
        start_date: Option<String>,
        #[arg(long, help = "Latest entry date (ISO 8601)")]
        end_date: Option<String>,
    },
}

pub async fn handle(cmd: ComplianceCommands, ctx: &Context) -> anyhow::Result<()> {
    let output_format = &ctx.output_format;

    match cmd {
        ComplianceCommands::Report { contract_id } => {
            let result = ctx.gateway.get_compliance_report(contract_id.as_deref()).await;
            output_result(output_format, "Compliance report:", result)
        }
        ComplianceCommands::AuditLogs { limit, user_id, action, start_date, end_date } => {
            let query = AuditLogQuery { limit, user_id, action, start_date, end_date };
            let result = ctx.gateway.get_audit_logs(&query).await;
            output_result(output_format, "Audit logs:", result)
        }
    }
}
