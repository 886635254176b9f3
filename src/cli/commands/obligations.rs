use clap::Subcommand;

use crate::cli::utils::{output_result, read_json_input};
use crate::cli::Context;

#[derive(Subcommand)]
pub enum ObligationCommands {
    #[command(about = "List obligations")]
    List {
        #[arg(long, help = "Restrict to one contract")]
        contract_id: Option<String>,
    },

    #[command(about = "Update an obligation from a JSON argument or stdin")]
    Update {
        #[arg(help = "Obligation ID")]
        id: String,
        #[arg(long, help = "Obligation fields as JSON (read from stdin if omitted)")]
        data: Option<String>,
    },
}

pub async fn handle(cmd: ObligationCommands, ctx: &Context) -> anyhow::Result<()> {
    let output_format = &ctx.output_format;

    match cmd {
        ObligationCommands::List { contract_id } => {
            let result = ctx.gateway.get_obligations(contract_id.as_deref()).await;
            output_result(output_format, "Obligations:", result)
        }
        ObligationCommands::Update { id, data } => {
            let data = read_json_input(data)?;
            let result = ctx.gateway.update_obligation(&id, data).await;
            output_result(output_format, &format!("Obligation {} updated", id), result)
        }
    }
}
