//! OpenAI-compatible completion transport.
//!
//! Chat turns are forwarded as-is. Code analysis is a single prompt that pins
//! the model to one of three reply formats, and the reply is capped at
//! [`MAX_ANALYSIS_CHARS`].

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{build_client, endpoint, Backend, BackendError};
use crate::chat::{ChatMessage, Role};

/// Upper bound on the length of an analysis reply, in characters
pub const MAX_ANALYSIS_CHARS: usize = 1000;

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Debug, Serialize, PartialEq)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Build the analysis prompt for a snippet
pub fn analysis_prompt(code: &str) -> String {
    format!(
        "Analyze the following Rust code and answer in exactly one of these forms.\n\
         \n\
         - If the code is correct, reply with exactly: `The code is correct.`\n\
         - If there are errors, state the error and give the corrected version.\n\
         - If it can be improved, suggest improvements that keep the original behavior.\n\
         \n\
         Rust code to analyze:\n\
         ```rust\n\
         {code}\n\
         ```\n\
         \n\
         Your reply must use one of these formats only:\n\
         1. `The code is correct.`\n\
         2. `Syntax error: <explanation>. Corrected code:\\n<corrected code>`\n\
         3. `Improvement suggestion: <explanation>. Improved code:\\n<improved code>`"
    )
}

/// Keep at most `max` characters of `text`
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Map conversation messages to completion roles.
///
/// Leading system messages are instructions; system messages after the first
/// user turn are earlier replies and go out as `assistant`.
fn to_wire(messages: &[ChatMessage]) -> Vec<WireMessage<'_>> {
    let mut seen_user = false;
    messages
        .iter()
        .map(|msg| {
            let role = match msg.role {
                Role::User => {
                    seen_user = true;
                    "user"
                }
                Role::System if seen_user => "assistant",
                Role::System => "system",
            };
            WireMessage {
                role,
                content: &msg.content,
            }
        })
        .collect()
}

/// Backend that talks to a completion API directly
#[derive(Debug, Clone)]
pub struct LlmBackend {
    base_url: String,
    model: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl LlmBackend {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        Ok(Self {
            base_url: base_url.into(),
            model: model.into(),
            api_key,
            client: build_client(timeout)?,
        })
    }

    async fn complete(&self, messages: Vec<WireMessage<'_>>) -> Result<String, BackendError> {
        let url = endpoint(&self.base_url, "chat/completions");
        let body = CompletionRequest {
            model: &self.model,
            messages,
        };

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        let parsed: CompletionResponse = serde_json::from_slice(&bytes)?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(BackendError::EmptyResponse)
    }
}

#[async_trait]
impl Backend for LlmBackend {
    fn label(&self) -> String {
        format!("llm {}", self.model)
    }

    async fn prompt(&self, prompt: &str) -> Result<String, BackendError> {
        tracing::debug!(model = %self.model, "prompt completion");
        self.complete(vec![WireMessage {
            role: "user",
            content: prompt,
        }])
        .await
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, BackendError> {
        tracing::debug!(count = messages.len(), model = %self.model, "chat completion");
        self.complete(to_wire(messages)).await
    }

    async fn analyze_code(&self, code: &str) -> Result<String, BackendError> {
        tracing::debug!(model = %self.model, "analysis completion");
        let reply = self.prompt(&analysis_prompt(code)).await?;
        Ok(truncate_chars(&reply, MAX_ANALYSIS_CHARS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn completion(content: &str) -> serde_json::Value {
        json!({
            "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
        })
    }

    fn backend(server: &MockServer) -> LlmBackend {
        LlmBackend::new(
            format!("{}/v1", server.uri()),
            "llama3.1:8b",
            None,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_analysis_prompt_embeds_code_and_formats() {
        let prompt = analysis_prompt("let x = 1;");
        assert!(prompt.contains("```rust\nlet x = 1;\n```"));
        assert!(prompt.contains("The code is correct."));
        assert!(prompt.contains("Syntax error:"));
        assert!(prompt.contains("Improvement suggestion:"));
    }

    #[test]
    fn test_to_wire_maps_replies_to_assistant() {
        let messages = vec![
            ChatMessage::system("Hello"),
            ChatMessage::user("hi"),
            ChatMessage::system("hey"),
            ChatMessage::user("again"),
        ];
        let roles: Vec<&str> = to_wire(&messages).iter().map(|m| m.role).collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
    }

    #[tokio::test]
    async fn test_chat_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(json!({
                "model": "llama3.1:8b",
                "messages": [{"role": "user", "content": "hi"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("hello!")))
            .expect(1)
            .mount(&server)
            .await;

        let reply = backend(&server).chat(&[ChatMessage::user("hi")]).await.unwrap();
        assert_eq!(reply, "hello!");
    }

    #[tokio::test]
    async fn test_prompt_sends_one_user_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_json(json!({
                "model": "llama3.1:8b",
                "messages": [{"role": "user", "content": "Name a crate"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("serde")))
            .expect(1)
            .mount(&server)
            .await;

        let reply = backend(&server).prompt("Name a crate").await.unwrap();
        assert_eq!(reply, "serde");
    }

    #[tokio::test]
    async fn test_analysis_reply_is_truncated() {
        let server = MockServer::start().await;
        let long = "x".repeat(MAX_ANALYSIS_CHARS + 250);
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(&long)))
            .mount(&server)
            .await;

        let reply = backend(&server).analyze_code("fn main() {}").await.unwrap();
        assert_eq!(reply.chars().count(), MAX_ANALYSIS_CHARS);
    }

    #[tokio::test]
    async fn test_no_choices_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let err = backend(&server)
            .chat(&[ChatMessage::user("hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::EmptyResponse));
    }
}
