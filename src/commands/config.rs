use clap::Subcommand;
use serde_json::json;

use crate::app::Runtime;
use crate::config::{save_config, validate_url};
use crate::errors::{CliError, redact_secret};

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Set a configuration key (api_url or model)
    Set { key: String, value: String },
    /// Print the config file path
    Path,
}

pub async fn handle(runtime: &mut Runtime, command: ConfigCommand) -> Result<(), CliError> {
    match command {
        ConfigCommand::Show => {
            let key_display = runtime
                .config
                .api_key
                .as_deref()
                .map(redact_secret)
                .unwrap_or_else(|| "(not set)".to_string());

            if runtime.output.json {
                runtime.output.print_json(&json!({
                    "api_url": runtime.config.api_url,
                    "model": runtime.config.model,
                    "api_key": key_display,
                }))?;
                return Ok(());
            }

            runtime
                .output
                .print_human(&format!("api_url: {}", runtime.config.api_url));
            runtime
                .output
                .print_human(&format!("model:   {}", runtime.config.model));
            runtime
                .output
                .print_human(&format!("api_key: {key_display}"));
            Ok(())
        }
        ConfigCommand::Set { key, value } => {
            match key.as_str() {
                "api_url" => {
                    validate_url(&value)?;
                    runtime.config.api_url = value;
                }
                "model" => {
                    let trimmed = value.trim();
                    if trimmed.is_empty() {
                        return Err(CliError::Usage("Model id cannot be empty.".to_string()));
                    }
                    runtime.config.model = trimmed.to_string();
                }
                other => {
                    return Err(CliError::Usage(format!(
                        "Unknown config key '{other}'. Valid keys: api_url, model."
                    )));
                }
            }

            let path = save_config(&runtime.config)?;
            runtime
                .output
                .print_human(&format!("Saved {}", path.display()));
            Ok(())
        }
        ConfigCommand::Path => {
            runtime
                .output
                .print_human(&runtime.config_path.display().to_string());
            Ok(())
        }
    }
}
