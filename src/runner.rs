//! Application Runner Module
//!
//! Shared entry points for the interactive TUI and the one-shot `ask` and
//! `analyze` commands. Each sets up logging, resolves settings and builds the
//! backend before handing off.

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::backend::{self, BackendError, BackendKind};
use crate::chat::Conversation;
use crate::config::{Settings, XdgDirs};
use crate::tui::execution::{execute, Request};

/// Runtime options shared by every entry point.
///
/// `None` overrides leave the config file value in place.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Enable debug logging
    pub debug: bool,
    /// Enable verbose (trace-level) logging
    pub verbose: bool,
    /// Explicit settings file
    pub config_path: Option<PathBuf>,
    pub backend: Option<BackendKind>,
    pub url: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
}

impl AppConfig {
    /// Load settings and apply command line overrides
    pub fn resolve_settings(&self) -> Result<Settings> {
        let mut settings = Settings::load(self.config_path.as_deref())?;
        if let Some(kind) = self.backend {
            settings.backend = kind;
        }
        if let Some(url) = &self.url {
            settings.base_url = url.clone();
        }
        if let Some(model) = &self.model {
            settings.model = model.clone();
        }
        if let Some(key) = &self.api_key {
            settings.api_key = Some(key.clone());
        }
        Ok(settings)
    }

    fn filter(&self, default: &str) -> EnvFilter {
        let level = if self.verbose {
            "trace"
        } else if self.debug {
            "debug"
        } else {
            default
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    }
}

/// Log to a file so output does not corrupt the terminal UI
fn init_file_logging(config: &AppConfig) -> Result<PathBuf> {
    let dirs = XdgDirs::new();
    let path = match dirs.ensure_dirs() {
        Ok(()) => dirs.log_file(),
        Err(_) => std::env::temp_dir().join("codechat.log"),
    };
    let log_file = File::create(&path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(config.filter("info,codechat=debug"))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(log_file)),
        )
        .init();

    Ok(path)
}

fn init_stderr_logging(config: &AppConfig) {
    tracing_subscriber::registry()
        .with(config.filter("warn"))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")
}

/// Run the TUI application.
///
/// # Errors
///
/// Returns an error if settings cannot be loaded or the terminal cannot be
/// initialized.
pub fn run_tui(config: AppConfig) -> Result<()> {
    let log_path = init_file_logging(&config)?;
    let settings = config.resolve_settings()?;
    let backend = backend::from_settings(&settings)?;

    tracing::info!(
        log = %log_path.display(),
        backend = %backend.label(),
        "Starting codechat TUI"
    );

    runtime()?.block_on(crate::tui::run(&settings, backend))
}

/// Send one message and print the reply.
///
/// With `raw` the text goes to the `prompt` procedure alone, without the
/// greeting.
pub fn run_ask(config: AppConfig, text: &str, raw: bool) -> Result<()> {
    init_stderr_logging(&config);
    let settings = config.resolve_settings()?;

    if raw {
        let reply = runtime()?.block_on(raw_prompt(&settings, text))?;
        println!("{}", reply);
        return Ok(());
    }

    let mut conversation = Conversation::with_greeting(&settings.greeting);
    let messages = conversation
        .begin_chat(text)
        .context("Nothing to send")?;

    let reply = runtime()?.block_on(one_shot(
        &settings,
        &mut conversation,
        Request::Chat(messages),
    ))?;
    println!("{}", reply);
    Ok(())
}

/// Analyze code from `file`, or stdin when absent, and print the result.
pub fn run_analyze(config: AppConfig, file: Option<PathBuf>) -> Result<()> {
    init_stderr_logging(&config);
    let settings = config.resolve_settings()?;

    let code = match &file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read code from stdin")?;
            buf
        }
    };

    let mut conversation = Conversation::with_greeting(&settings.greeting);
    let code = conversation
        .begin_analysis(&code)
        .context("No code to analyze")?;

    let reply = runtime()?.block_on(one_shot(
        &settings,
        &mut conversation,
        Request::AnalyzeCode(code),
    ))?;
    println!("{}", reply);
    Ok(())
}

async fn raw_prompt(settings: &Settings, text: &str) -> Result<String> {
    if text.trim().is_empty() {
        anyhow::bail!("Nothing to send");
    }
    let backend = backend::from_settings(settings)?;
    tracing::debug!(backend = %backend.label(), "Raw prompt");

    backend.prompt(text).await.map_err(|e| {
        tracing::error!(procedure = "prompt", "Backend call failed: {}", e);
        anyhow::Error::new(e).context("prompt request failed")
    })
}

async fn one_shot(
    settings: &Settings,
    conversation: &mut Conversation,
    request: Request,
) -> Result<String> {
    let backend = backend::from_settings(settings)?;
    let kind = request.kind();
    tracing::debug!(procedure = %kind, backend = %backend.label(), "One-shot request");

    match execute(backend.as_ref(), &request).await {
        Ok(reply) => {
            conversation.complete(kind, Ok::<_, BackendError>(reply.clone()))?;
            Ok(reply)
        }
        Err(e) => {
            tracing::error!(procedure = %kind, "Backend call failed: {}", e);
            conversation.complete(kind, Err::<String, _>(&e))?;
            Err(anyhow::Error::new(e).context(format!("{} request failed", kind)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_overrides_win_over_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"backend": "http", "base_url": "http://file", "model": "file-model"}"#,
        )
        .unwrap();

        let config = AppConfig {
            config_path: Some(path),
            backend: Some(BackendKind::Llm),
            url: Some("http://flag".to_string()),
            ..Default::default()
        };
        let settings = config.resolve_settings().unwrap();

        assert_eq!(settings.backend, BackendKind::Llm);
        assert_eq!(settings.base_url, "http://flag");
        assert_eq!(settings.model, "file-model");
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let config = AppConfig {
            config_path: Some(PathBuf::from("/nonexistent/codechat.json")),
            ..Default::default()
        };
        assert!(config.resolve_settings().is_err());
    }

    #[tokio::test]
    async fn test_one_shot_failure_rolls_back() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .respond_with(wiremock::ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let settings = Settings {
            base_url: server.uri(),
            ..Settings::default()
        };
        let mut conversation = Conversation::with_greeting("Hello");
        let messages = conversation.begin_chat("hi").unwrap();

        let result = one_shot(&settings, &mut conversation, Request::Chat(messages)).await;
        assert!(result.is_err());
        assert!(!conversation.is_loading());
        assert_eq!(conversation.len(), 2);
    }

    #[tokio::test]
    async fn test_raw_prompt_skips_history() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/prompt"))
            .and(wiremock::matchers::body_json(serde_json::json!({"prompt": "hi"})))
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_body_json(serde_json::json!("hello")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let settings = Settings {
            base_url: server.uri(),
            ..Settings::default()
        };
        assert_eq!(raw_prompt(&settings, "hi").await.unwrap(), "hello");
        assert!(raw_prompt(&settings, "   ").await.is_err());
    }

    #[tokio::test]
    async fn test_one_shot_success_appends_reply() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/analyze_code"))
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_body_json(serde_json::json!("Looks fine")),
            )
            .mount(&server)
            .await;

        let settings = Settings {
            base_url: server.uri(),
            ..Settings::default()
        };
        let mut conversation = Conversation::with_greeting("Hello");
        let code = conversation.begin_analysis("fn main() {}").unwrap();

        let reply = one_shot(&settings, &mut conversation, Request::AnalyzeCode(code))
            .await
            .unwrap();
        assert_eq!(reply, "Looks fine");
        assert_eq!(conversation.entries().last().unwrap().content(), "Looks fine");
    }
}
