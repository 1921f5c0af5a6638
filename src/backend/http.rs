//! JSON gateway transport.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{build_client, endpoint, Backend, BackendError};
use crate::chat::ChatMessage;

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: &'a [ChatMessage],
}

#[derive(Serialize)]
struct PromptRequest<'a> {
    prompt: &'a str,
}

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    code: &'a str,
}

/// Gateways answer with either a bare JSON string or `{"response": "..."}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Reply {
    Text(String),
    Wrapped { response: String },
}

impl From<Reply> for String {
    fn from(reply: Reply) -> Self {
        match reply {
            Reply::Text(text) | Reply::Wrapped { response: text } => text,
        }
    }
}

/// Backend served over HTTP by a gateway that forwards to the service
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        Ok(Self {
            base_url: base_url.into(),
            api_key,
            client: build_client(timeout)?,
        })
    }

    async fn call<T: Serialize + ?Sized>(
        &self,
        procedure: &str,
        body: &T,
    ) -> Result<String, BackendError> {
        let url = endpoint(&self.base_url, procedure);
        let mut request = self.client.post(&url).json(body);
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

        let reply: Reply = serde_json::from_slice(&bytes)?;
        Ok(reply.into())
    }
}

#[async_trait]
impl Backend for HttpBackend {
    fn label(&self) -> String {
        format!("http {}", self.base_url)
    }

    async fn prompt(&self, prompt: &str) -> Result<String, BackendError> {
        tracing::debug!(bytes = prompt.len(), "POST prompt");
        self.call("prompt", &PromptRequest { prompt }).await
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, BackendError> {
        tracing::debug!(count = messages.len(), "POST chat");
        self.call("chat", &ChatRequest { messages }).await
    }

    async fn analyze_code(&self, code: &str) -> Result<String, BackendError> {
        tracing::debug!(bytes = code.len(), "POST analyze_code");
        self.call("analyze_code", &AnalyzeRequest { code }).await
    }
}
