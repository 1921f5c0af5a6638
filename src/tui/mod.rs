//! Terminal chat interface
//!
//! A message list above a Rust code editor and a single-line prompt. One
//! backend request may be in flight at a time; both inputs are disabled
//! until it resolves.

mod app;
mod event;
mod theme;
mod ui;

pub mod execution;
pub mod state;
pub mod widgets;

pub use app::TuiApp;
pub use event::AppEvent;

use std::sync::Arc;

use anyhow::Result;

use crate::backend::Backend;
use crate::config::Settings;

/// Run the TUI application
pub async fn run(settings: &Settings, backend: Arc<dyn Backend>) -> Result<()> {
    let mut app = TuiApp::new(settings, backend)?;
    app.run().await
}
