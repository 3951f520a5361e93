use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use crate::errors::CliError;

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";
pub const TEMPERATURE: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One prior turn of context carried into a follow-up completion.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Boundary around the external chat-completion API. One attempt per call:
/// no retry, no backoff, no request timeout of our own. Failures come back
/// as `Err` carrying the external error's description.
#[derive(Debug, Clone)]
pub struct Gateway {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    debug: bool,
}

impl Gateway {
    pub fn new(
        base_url: String,
        api_key: String,
        model: String,
        debug: bool,
    ) -> Result<Self, CliError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url,
            api_key,
            model,
            debug,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn complete(
        &self,
        prompt: &str,
        context: &[ChatTurn],
        max_tokens: Option<u32>,
    ) -> Result<String, CliError> {
        let url = join_url(&self.base_url, "/v1/chat/completions");

        let mut body = json!({
            "model": self.model,
            "messages": build_messages(prompt, context),
            "temperature": TEMPERATURE,
        });
        if let Some(cap) = max_tokens {
            body["max_tokens"] = json!(cap);
        }

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| CliError::Network(format!("Network request failed: {err}")))?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let parsed = if text.trim().is_empty() {
            json!({})
        } else {
            serde_json::from_str::<Value>(&text).unwrap_or_else(|_| json!({ "raw": text }))
        };

        if !status.is_success() {
            return Err(self.http_error(status, parsed));
        }

        extract_reply(&parsed).ok_or_else(|| {
            CliError::Gateway("Completion response carried no message content.".to_string())
        })
    }

    fn http_error(&self, status: StatusCode, payload: Value) -> CliError {
        let message = payload
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|v| v.as_str())
            .or_else(|| payload.get("error").and_then(|v| v.as_str()))
            .or_else(|| payload.get("message").and_then(|v| v.as_str()))
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));

        let details = if self.debug {
            format!("{message} payload={payload}")
        } else {
            message
        };

        match status.as_u16() {
            400 => CliError::Usage(details),
            401 | 403 => CliError::Auth(details),
            429 => CliError::RateLimited(details),
            500..=599 => CliError::Server(details),
            _ => CliError::Gateway(details),
        }
    }
}

/// Fixed system instruction, prior turns in order, new prompt last.
pub fn build_messages(prompt: &str, context: &[ChatTurn]) -> Vec<Value> {
    let mut messages = Vec::with_capacity(context.len() + 2);
    messages.push(json!({ "role": Role::System.as_str(), "content": SYSTEM_PROMPT }));
    for turn in context {
        messages.push(json!({ "role": turn.role.as_str(), "content": turn.content }));
    }
    messages.push(json!({ "role": Role::User.as_str(), "content": prompt }));
    messages
}

pub fn extract_reply(payload: &Value) -> Option<String> {
    let content = payload
        .get("choices")?
        .as_array()?
        .first()?
        .get("message")?
        .get("content")?
        .as_str()?;
    Some(content.to_string())
}

fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ChatTurn, build_messages, extract_reply, join_url};

    #[test]
    fn messages_order_system_context_prompt() {
        let context = vec![
            ChatTurn::user("what is rust?"),
            ChatTurn::assistant("A systems language."),
        ];
        let messages = build_messages("explain more", &context);

        let roles: Vec<&str> = messages
            .iter()
            .map(|m| m["role"].as_str().unwrap())
            .collect();
        assert_eq!(roles, ["system", "user", "assistant", "user"]);
        assert_eq!(messages[1]["content"], "what is rust?");
        assert_eq!(messages[2]["content"], "A systems language.");
        assert_eq!(messages[3]["content"], "explain more");
    }

    #[test]
    fn messages_without_context_are_system_then_prompt() {
        let messages = build_messages("hello", &[]);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[1]["content"], "hello");
    }

    #[test]
    fn reply_comes_from_first_choice() {
        let payload = json!({
            "choices": [
                { "message": { "role": "assistant", "content": "hi there" } }
            ]
        });
        assert_eq!(extract_reply(&payload), Some("hi there".to_string()));
        assert_eq!(extract_reply(&json!({ "choices": [] })), None);
        assert_eq!(extract_reply(&json!({})), None);
    }

    #[test]
    fn url_join_handles_slashes() {
        assert_eq!(
            join_url("https://api.openai.com/", "/v1/chat/completions"),
            "https://api.openai.com/v1/chat/completions"
        );
    }
}
