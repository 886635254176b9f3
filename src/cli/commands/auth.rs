use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_error, output_success};
use crate::cli::Context;
use crate::error::GatewayError;
use crate::session::Session;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login to the platform")]
    Login {
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, env = "CLIA_PASSWORD", hide_env_values = true, help = "Password (prompted without echo if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Logout and forget the stored credential")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,
}

pub async fn handle(cmd: AuthCommands, ctx: &Context) -> anyhow::Result<()> {
    let output_format = &ctx.output_format;

    match cmd {
        AuthCommands::Login { email, password } => {
            let password = match password {
                Some(password) => resolve_password(Some(password), prompt_password)?,
                None => tokio::task::spawn_blocking(|| resolve_password(None, prompt_password)).await??,
            };

            match ctx.gateway.login(&email, &password).await {
                Ok(outcome) => output_success(
                    output_format,
                    &format!("Logged in as {}", outcome.identity.display()),
                    Some(json!({ "identity": outcome.identity })),
                ),
                Err(e) => {
                    let message = match &e {
                        GatewayError::InvalidCredentials(_) => "Login failed: invalid email or password".to_string(),
                        other => format!("Login failed: {}", other),
                    };
                    output_error(output_format, &message, Some(e.error_code()))?;
                    Err(e.into())
                }
            }
        }
        AuthCommands::Logout => {
            ctx.gateway.logout().await;
            output_success(output_format, "Logged out", None)
        }
        AuthCommands::Status => {
            let session = ctx.gateway.session().current();
            let message = match &session {
                Session::Present(identity) => format!("Authenticated ({})", identity.display()),
                Session::Absent => "Not authenticated".to_string(),
            };
            output_success(
                output_format,
                &message,
                Some(json!({
                    "session": session,
                    "api": ctx.gateway.base_url().as_str(),
                })),
            )
        }
    }
}

/// Use the given password, or fall back to `prompt`; an empty password is refused
fn resolve_password<F>(provided: Option<String>, prompt: F) -> anyhow::Result<String>
where
    F: FnOnce() -> std::io::Result<String>,
{
    let password = match provided {
        Some(password) => password,
        None => prompt()?,
    };
    if password.is_empty() {
        anyhow::bail!("Password is required");
    }
    Ok(password)
}

fn prompt_password() -> std::io::Result<String> {
    dialoguer::Password::new()
        .with_prompt("Password")
        .allow_empty_password(true)
        .interact()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
}
