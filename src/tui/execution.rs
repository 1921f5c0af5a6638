//! Backend request execution
//!
//! Calls run on the tokio runtime; the TUI gets the outcome back as an
//! [`AppEvent::BackendResponse`] so that only the UI loop mutates state.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use super::event::AppEvent;
use crate::backend::{Backend, BackendError};
use crate::chat::{ChatMessage, RequestKind};

/// A request ready to be sent to the backend
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Chat(Vec<ChatMessage>),
    AnalyzeCode(String),
}

impl Request {
    pub fn kind(&self) -> RequestKind {
        match self {
            Request::Chat(_) => RequestKind::Chat,
            Request::AnalyzeCode(_) => RequestKind::AnalyzeCode,
        }
    }
}

/// Run a request to completion
pub async fn execute(backend: &dyn Backend, request: &Request) -> Result<String, BackendError> {
    match request {
        Request::Chat(messages) => backend.chat(messages).await,
        Request::AnalyzeCode(code) => backend.analyze_code(code).await,
    }
}

/// Spawn a request and report its outcome on `tx`
pub fn spawn_request(backend: Arc<dyn Backend>, request: Request, tx: UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let kind = request.kind();
        let result = execute(backend.as_ref(), &request)
            .await
            .map_err(|e| e.to_string());

        if let Err(e) = &result {
            tracing::error!(procedure = %kind, "Backend call failed: {}", e);
        }

        if tx.send(AppEvent::BackendResponse { kind, result }).is_err() {
            tracing::debug!(procedure = %kind, "UI gone before backend response");
        }
    });
}
