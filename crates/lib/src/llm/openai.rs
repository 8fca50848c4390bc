//! OpenAI-compatible chat completions client (https://api.openai.com/v1 by default).

use crate::config::CompletionSettings;
use serde::{Deserialize, Serialize};

/// Client for POST {base_url}/chat/completions with bearer auth.
#[derive(Clone)]
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    client: reqwest::Client,
}

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("completion api error: {0}")]
    Api(String),
    #[error("completion response malformed: {0}")]
    Malformed(String),
}

impl OpenAiClient {
    pub fn new(settings: &CompletionSettings) -> Self {
        Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            client: reqwest::Client::new(),
        }
    }

    /// Single non-streaming completion with a system instruction and one user message.
    /// Returns the trimmed content of the first choice.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String, CompletionError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = OpenAiChatRequest {
            model: &self.model,
            messages: vec![
                OpenAiMessage::System { content: system },
                OpenAiMessage::User { content: user },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(CompletionError::Api(format!("{} {}", status, body)));
        }
        let data: OpenAiChatResponse = res.json().await?;
        first_choice_content(data)
    }
}

// --- OpenAI wire types ---

#[derive(Debug, Serialize)]
struct OpenAiChatRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
enum OpenAiMessage<'a> {
    System { content: &'a str },
    User { content: &'a str },
}

#[derive(Debug, Deserialize)]
struct OpenAiChatResponse {
    choices: Option<Vec<OpenAiChoice>>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: Option<OpenAiResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

fn first_choice_content(data: OpenAiChatResponse) -> Result<String, CompletionError> {
    let content = data
        .choices
        .and_then(|c| c.into_iter().next())
        .ok_or_else(|| CompletionError::Malformed("no choices".to_string()))?
        .message
        .and_then(|m| m.content)
        .ok_or_else(|| CompletionError::Malformed("choice has no message content".to_string()))?;
    let content = content.trim();
    if content.is_empty() {
        return Err(CompletionError::Malformed("empty message content".to_string()));
    }
    Ok(content.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> OpenAiChatResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn request_serializes_roles_and_limits() {
        let body = OpenAiChatRequest {
            model: "gpt-3.5-turbo",
            messages: vec![
                OpenAiMessage::System { content: "sys" },
                OpenAiMessage::User { content: "usr" },
            ],
            max_tokens: 150,
            temperature: 0.8,
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["messages"][0]["role"], "system");
        assert_eq!(v["messages"][1]["role"], "user");
        assert_eq!(v["messages"][1]["content"], "usr");
        assert_eq!(v["max_tokens"], 150);
    }

    #[test]
    fn content_is_trimmed() {
        let data = parse(r#"{"choices":[{"message":{"role":"assistant","content":"  pun  \n"}}]}"#);
        assert_eq!(first_choice_content(data).unwrap(), "pun");
    }

    #[test]
    fn missing_choices_is_malformed() {
        let err = first_choice_content(parse(r#"{"choices":[]}"#)).unwrap_err();
        assert!(matches!(err, CompletionError::Malformed(_)));
        let err = first_choice_content(parse(r#"{}"#)).unwrap_err();
        assert!(matches!(err, CompletionError::Malformed(_)));
    }

    #[test]
    fn null_or_blank_content_is_malformed() {
        let err = first_choice_content(parse(r#"{"choices":[{"message":{"content":null}}]}"#))
            .unwrap_err();
        assert!(matches!(err, CompletionError::Malformed(_)));
        let err = first_choice_content(parse(r#"{"choices":[{"message":{"content":"   "}}]}"#))
            .unwrap_err();
        assert!(matches!(err, CompletionError::Malformed(_)));
    }
}
