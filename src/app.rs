use std::path::PathBuf;

use crate::config::{DashConfig, resolve_api_key, resolve_api_url};
use crate::errors::CliError;
use crate::gateway::Gateway;
use crate::output::OutputMode;

#[derive(Debug, Clone)]
pub struct Runtime {
    pub output: OutputMode,
    pub config: DashConfig,
    pub config_path: PathBuf,
    pub api_url_override: Option<String>,
}

impl Runtime {
    pub fn resolved_api_url(&self) -> Result<String, CliError> {
        resolve_api_url(&self.config, self.api_url_override.as_deref())
    }

    pub fn resolved_api_key(&self) -> Option<String> {
        resolve_api_key(&self.config)
    }

    pub fn resolved_model(&self, model_override: Option<&str>) -> String {
        model_override
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .unwrap_or_else(|| self.config.model.clone())
    }

    pub fn gateway(&self, model_override: Option<&str>) -> Result<Gateway, CliError> {
        let api_key = self.resolved_api_key().ok_or_else(|| {
            CliError::Auth(
                "Missing API key. Run `panes auth set-key` or export PANES_API_KEY.".to_string(),
            )
        })?;

        Gateway::new(
            self.resolved_api_url()?,
            api_key,
            self.resolved_model(model_override),
            self.output.debug,
        )
    }
}
