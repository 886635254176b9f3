use clap::Subcommand;

use crate::cli::utils::output_result;
use crate::cli::Context;

#[derive(Subcommand)]
pub enum AgentCommands {
    #[command(about = "Run an analysis agent against a contract")]
    Run {
        #[arg(help = "Contract ID")]
        contract_id: String,
        #[arg(help = "Agent type (e.g. risk, compliance, obligations)")]
        agent_type: String,
    },

    #[command(about = "Show the status of an agent job")]
    Status {
        #[arg(help = "Job ID returned by `agents run`")]
        job_id: String,
    },
}

pub async fn handle(cmd: AgentCommands, ctx: &Context) -> anyhow::Result<()> {
    let output_format = &ctx.output_format;

    match cmd {
        AgentCommands::Run { contract_id, agent_type } => {
            let result = ctx.gateway.run_agent(&contract_id, &agent_type).await;
            output_result(output_format, &format!("Started {} agent on {}", agent_type, contract_id), result)
        }
        AgentCommands::Status { job_id } => {
            let result = ctx.gateway.get_agent_status(&job_id).await;
            output_result(output_format, &format!("Job {}:", job_id), result)
        }
    }
}
