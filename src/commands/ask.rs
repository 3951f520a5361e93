use std::io::{self, Read};

use clap::Args;
use serde_json::json;

use crate::app::Runtime;
use crate::errors::CliError;

#[derive(Debug, Args)]
pub struct AskArgs {
    /// Prompt text
    pub prompt: Option<String>,
    /// Model id override, e.g. "gpt-4"
    #[arg(short = 'm', long = "model")]
    pub model: Option<String>,
    /// Read prompt from stdin
    #[arg(long)]
    pub stdin: bool,
    /// Optional max output tokens
    #[arg(long = "max-tokens")]
    pub max_tokens: Option<u32>,
}

/// One-shot completion without the dashboard: same gateway, no view state.
pub async fn handle(runtime: &Runtime, args: AskArgs) -> Result<(), CliError> {
    let prompt = resolve_prompt(&args)?;
    let gateway = runtime.gateway(args.model.as_deref())?;

    runtime
        .output
        .print_verbose(&format!("model={} prompt_chars={}", gateway.model(), prompt.chars().count()));

    let reply = gateway.complete(&prompt, &[], args.max_tokens).await?;

    if runtime.output.json {
        runtime.output.print_json(&json!({
            "prompt": prompt,
            "response": reply,
            "model": gateway.model(),
        }))?;
        return Ok(());
    }

    runtime.output.print_human(&reply);
    Ok(())
}

fn resolve_prompt(args: &AskArgs) -> Result<String, CliError> {
    if args.stdin {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .map_err(|e| CliError::Generic(format!("Failed reading stdin: {e}")))?;
        let trimmed = input.trim().to_string();
        if trimmed.is_empty() {
            return Err(CliError::Usage(
                "No prompt provided via stdin. Pipe text or pass a prompt argument.".to_string(),
            ));
        }
        return Ok(trimmed);
    }

    match &args.prompt {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(CliError::Usage(
            "Missing prompt. Use `panes ask \"...\"` or pass `--stdin`.".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::{AskArgs, resolve_prompt};

    #[test]
    fn prompt_argument_is_trimmed() {
        let args = AskArgs {
            prompt: Some("  hello  ".to_string()),
            model: None,
            stdin: false,
            max_tokens: None,
        };
        assert_eq!(resolve_prompt(&args).unwrap(), "hello");
    }

    #[test]
    fn missing_prompt_is_a_usage_error() {
        let args = AskArgs {
            prompt: Some("   ".to_string()),
            model: None,
            stdin: false,
            max_tokens: None,
        };
        assert!(resolve_prompt(&args).is_err());
    }
}
