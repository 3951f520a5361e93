use thiserror::Error;

#[derive(Debug, Clone, Copy)]
pub enum ExitCode {
    Generic = 1,
    Auth = 2,
    Usage = 3,
    Network = 4,
    RateLimited = 5,
    Server = 6,
    Gateway = 7,
}

/// Messages pass through `{0}` unchanged: whatever description the
/// completion API produced is what the user (and any appended pane) sees.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Auth(String),
    #[error("{0}")]
    Network(String),
    #[error("{0}")]
    RateLimited(String),
    #[error("{0}")]
    Server(String),
    #[error("{0}")]
    Gateway(String),
    #[error("{0}")]
    Generic(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => ExitCode::Usage as i32,
            CliError::Auth(_) => ExitCode::Auth as i32,
            CliError::Network(_) => ExitCode::Network as i32,
            CliError::RateLimited(_) => ExitCode::RateLimited as i32,
            CliError::Server(_) => ExitCode::Server as i32,
            CliError::Gateway(_) => ExitCode::Gateway as i32,
            CliError::Generic(_) => ExitCode::Generic as i32,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        CliError::Generic(format!("I/O error: {value}"))
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        CliError::Generic(format!("JSON error: {value}"))
    }
}

impl From<url::ParseError> for CliError {
    fn from(value: url::ParseError) -> Self {
        CliError::Usage(format!("Invalid URL: {value}"))
    }
}

impl From<reqwest::Error> for CliError {
    fn from(value: reqwest::Error) -> Self {
        CliError::Network(format!("Network request failed: {value}"))
    }
}

pub fn redact_secret(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }
    let mut out = String::new();
    let bytes = input.as_bytes();
    for (idx, b) in bytes.iter().enumerate() {
        if idx < 3 || idx + 3 >= bytes.len() {
            out.push(*b as char);
        } else {
            out.push('*');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{CliError, redact_secret};

    #[test]
    fn messages_surface_verbatim() {
        let err = CliError::RateLimited("rate limited".to_string());
        assert_eq!(err.to_string(), "rate limited");
        assert_eq!(format!("Error: {err}"), "Error: rate limited");
    }

    #[test]
    fn redact_keeps_edges_only() {
        assert_eq!(redact_secret("sk-abcdefgh"), "sk-*****fgh");
        assert_eq!(redact_secret(""), "");
    }
}
