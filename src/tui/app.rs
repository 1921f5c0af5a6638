//! Main TUI application: terminal lifecycle and the event loop

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use crossterm::{
    event::{
        DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
        KeyboardEnhancementFlags, MouseEventKind, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use ratatui::Terminal;

use super::event::{AppEvent, ClipboardManager, EventHandler};
use super::execution::spawn_request;
use super::state::{Action, ChatView};
use super::ui;
use crate::backend::Backend;
use crate::config::Settings;

/// Main TUI application
pub struct TuiApp {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    events: Option<EventHandler>,
    should_quit: bool,
    backend: Arc<dyn Backend>,
    clipboard: ClipboardManager,
    view: ChatView,
    keyboard_enhanced: bool,
}

impl TuiApp {
    /// Set up the terminal and the initial conversation
    pub fn new(settings: &Settings, backend: Arc<dyn Backend>) -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableBracketedPaste
        )?;

        // Needed to tell Ctrl+Enter apart from Enter; F5 works everywhere
        let keyboard_enhanced =
            crossterm::terminal::supports_keyboard_enhancement().unwrap_or(false);
        if keyboard_enhanced {
            let _ = execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
            );
        }

        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        // ~60 FPS tick rate
        let events = EventHandler::new(Duration::from_millis(16));
        let view = ChatView::new(&settings.greeting, backend.label());

        Ok(Self {
            terminal,
            events: Some(events),
            should_quit: false,
            backend,
            clipboard: ClipboardManager::new(),
            view,
            keyboard_enhanced,
        })
    }

    /// Run the main event loop
    pub async fn run(&mut self) -> Result<()> {
        let mut events = self
            .events
            .take()
            .ok_or_else(|| anyhow!("Event handler already taken"))?;

        while !self.should_quit {
            self.view.prepare_for_render();

            let view = &mut self.view;
            self.terminal.draw(|frame| ui::render(frame, view))?;

            match events.next().await {
                Some(event) => self.handle_event(event, &events),
                None => break,
            }
        }

        self.events = Some(events);
        Ok(())
    }

    fn handle_event(&mut self, event: AppEvent, events: &EventHandler) {
        match event {
            AppEvent::Key(key) => {
                if let Some(action) = self.view.handle_key(key) {
                    self.perform(action, events);
                }
            }
            AppEvent::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollUp => self.view.scroll_wheel(true),
                MouseEventKind::ScrollDown => self.view.scroll_wheel(false),
                _ => {}
            },
            AppEvent::Paste(text) => self.view.insert_text(&text),
            AppEvent::Tick => self.view.tick(),
            // Next draw picks up the new size
            AppEvent::Resize(_, _) => {}
            AppEvent::BackendResponse { kind, result } => {
                tracing::debug!(procedure = %kind, ok = result.is_ok(), "Backend response");
                self.view.apply_response(kind, result);
            }
        }
    }

    fn perform(&mut self, action: Action, events: &EventHandler) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::PasteClipboard => {
                if let Some(text) = self.clipboard.paste() {
                    self.view.insert_text(&text);
                }
            }
            Action::Dispatch(request) => {
                tracing::info!(procedure = %request.kind(), "Dispatching backend request");
                spawn_request(self.backend.clone(), request, events.sender());
            }
        }
    }
}

impl Drop for TuiApp {
    fn drop(&mut self) {
        // Reverse order of setup
        if self.keyboard_enhanced {
            let _ = execute!(self.terminal.backend_mut(), PopKeyboardEnhancementFlags);
        }
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            DisableBracketedPaste,
            LeaveAlternateScreen,
            DisableMouseCapture
        );
        let _ = self.terminal.show_cursor();
    }
}
