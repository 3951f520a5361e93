use clap::Subcommand;
use serde_json::json;

use crate::app::Runtime;
use crate::config::{API_KEY_ENV, save_config};
use crate::errors::{CliError, redact_secret};

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Store the completion API key in the config file (prompted, no echo)
    SetKey,
    /// Show whether a key is configured, redacted
    Status,
    /// Remove the stored key
    Clear,
}

pub async fn handle(runtime: &mut Runtime, command: AuthCommand) -> Result<(), CliError> {
    match command {
        AuthCommand::SetKey => {
            let key = rpassword::prompt_password("API key: ")
                .map_err(|e| CliError::Generic(format!("Failed reading key: {e}")))?;
            let trimmed = key.trim();
            if trimmed.is_empty() {
                return Err(CliError::Usage("API key cannot be empty.".to_string()));
            }

            runtime.config.api_key = Some(trimmed.to_string());
            let path = save_config(&runtime.config)?;
            runtime
                .output
                .print_human(&format!("Saved key to {}", path.display()));
            Ok(())
        }
        AuthCommand::Status => {
            let resolved = runtime.resolved_api_key();
            let source = if std::env::var(API_KEY_ENV)
                .map(|v| !v.trim().is_empty())
                .unwrap_or(false)
            {
                "env"
            } else if runtime.config.api_key.is_some() {
                "config"
            } else {
                "none"
            };

            if runtime.output.json {
                runtime.output.print_json(&json!({
                    "present": resolved.is_some(),
                    "source": source,
                    "key": resolved.as_deref().map(redact_secret),
                }))?;
                return Ok(());
            }

            match resolved {
                Some(key) => runtime
                    .output
                    .print_human(&format!("Key present ({source}): {}", redact_secret(&key))),
                None => runtime.output.print_human(&format!(
                    "No key. Run `panes auth set-key` or export {API_KEY_ENV}."
                )),
            }
            Ok(())
        }
        AuthCommand::Clear => {
            if runtime.config.api_key.take().is_none() {
                runtime.output.print_human("No stored key to remove.");
                return Ok(());
            }
            let path = save_config(&runtime.config)?;
            runtime
                .output
                .print_human(&format!("Removed key from {}", path.display()));
            Ok(())
        }
    }
}
