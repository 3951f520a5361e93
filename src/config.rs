use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::CliError;

pub const DEFAULT_API_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Env var consulted before the config file when resolving the API key.
pub const API_KEY_ENV: &str = "PANES_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashConfig {
    pub api_url: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
        }
    }
}

pub fn config_path() -> Result<PathBuf, CliError> {
    let base = dirs::config_dir().ok_or_else(|| {
        CliError::Generic("Could not resolve config directory for this OS.".to_string())
    })?;
    Ok(base.join("panes").join("config.json"))
}

pub fn load_config() -> Result<DashConfig, CliError> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(DashConfig::default());
    }

    let text = fs::read_to_string(&path)?;
    let config: DashConfig = serde_json::from_str(&text)?;
    Ok(config)
}

pub fn save_config(config: &DashConfig) -> Result<PathBuf, CliError> {
    let path = config_path()?;
    let parent = path
        .parent()
        .ok_or_else(|| CliError::Generic("Invalid config path.".to_string()))?;
    fs::create_dir_all(parent)?;
    fs::write(&path, serde_json::to_string_pretty(config)?)?;
    Ok(path)
}

pub fn resolve_api_url(config: &DashConfig, api_override: Option<&str>) -> Result<String, CliError> {
    if let Some(url) = api_override {
        validate_url(url)?;
        return Ok(url.to_string());
    }

    validate_url(&config.api_url)?;
    Ok(config.api_url.clone())
}

/// Read once at startup; gateway commands refuse to run without it.
pub fn resolve_api_key(config: &DashConfig) -> Option<String> {
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.trim().is_empty() {
            return Some(key.trim().to_string());
        }
    }

    config
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

pub fn validate_url(value: &str) -> Result<(), CliError> {
    let parsed = Url::parse(value)?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(CliError::Usage(
            "API URL must use http:// or https://.".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{DashConfig, resolve_api_url, validate_url};

    #[test]
    fn url_override_wins_over_config() {
        let config = DashConfig::default();
        let resolved = resolve_api_url(&config, Some("http://localhost:8080")).unwrap();
        assert_eq!(resolved, "http://localhost:8080");
    }

    #[test]
    fn rejects_non_http_schemes() {
        assert!(validate_url("ftp://example.com").is_err());
        assert!(validate_url("not a url").is_err());
        assert!(validate_url("https://api.openai.com").is_ok());
    }
}
