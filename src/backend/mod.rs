//! Remote backend exposing the `prompt`, `chat` and `analyze_code` procedures.
//!
//! Two transports are provided:
//! - [`HttpBackend`]: a gateway that serves each procedure as a JSON endpoint
//! - [`LlmBackend`]: an OpenAI-compatible completion API, with the analysis
//!   prompt built client-side

mod http;
mod llm;

pub use http::HttpBackend;
pub use llm::{analysis_prompt, truncate_chars, LlmBackend, MAX_ANALYSIS_CHARS};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chat::ChatMessage;
use crate::config::Settings;

/// Errors returned by a backend call.
///
/// The UI treats every variant the same way; the distinction only shows up
/// in logs.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode backend response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Backend returned no content")]
    EmptyResponse,
}

/// Which transport to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// JSON gateway with `/chat` and `/analyze_code` endpoints
    #[default]
    Http,
    /// OpenAI-compatible `/chat/completions` endpoint
    Llm,
}

/// The two remote procedures the chat client depends on
#[async_trait]
pub trait Backend: Send + Sync {
    /// Short label shown in the header
    fn label(&self) -> String;

    /// Reply to a single prompt, without conversation history
    async fn prompt(&self, prompt: &str) -> Result<String, BackendError>;

    /// Reply to the full conversation so far
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, BackendError>;

    /// Analyze a code snippet
    async fn analyze_code(&self, code: &str) -> Result<String, BackendError>;
}

/// Build the configured backend
pub fn from_settings(settings: &Settings) -> Result<Arc<dyn Backend>, BackendError> {
    let timeout = Duration::from_secs(settings.timeout_secs);
    let api_key = settings.api_key.clone().filter(|k| !k.is_empty());

    tracing::debug!(
        backend = ?settings.backend,
        base_url = %settings.base_url,
        "Building backend"
    );

    let backend: Arc<dyn Backend> = match settings.backend {
        BackendKind::Http => Arc::new(HttpBackend::new(&settings.base_url, api_key, timeout)?),
        BackendKind::Llm => Arc::new(LlmBackend::new(
            &settings.base_url,
            &settings.model,
            api_key,
            timeout,
        )?),
    };
    Ok(backend)
}

fn build_client(timeout: Duration) -> Result<reqwest::Client, BackendError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}
