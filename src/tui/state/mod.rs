//! TUI view state
//!
//! Everything the UI loop mutates lives here, separate from the terminal, so
//! key handling can be driven without a real screen.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders};
use tui_textarea::{CursorMove, Input, TextArea};

use super::execution::Request;
use super::theme::Theme;
use super::widgets::MessageListState;
use crate::chat::{Conversation, ConversationError, RequestKind};

/// Spinner animation frames
const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
/// Ticks per spinner frame (tick is ~16ms)
const TICKS_PER_FRAME: usize = 5;
/// How long an error notice stays in the status bar
const NOTICE_TTL: Duration = Duration::from_secs(6);
const PAGE_LINES: usize = 10;
const WHEEL_LINES: usize = 3;

/// Which input receives keystrokes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Prompt,
    Code,
}

/// Side effects the app must perform for a key press
#[derive(Debug, PartialEq)]
pub enum Action {
    Quit,
    Dispatch(Request),
    PasteClipboard,
}

/// Mutable state behind the chat screen
pub struct ChatView {
    pub conversation: Conversation,
    pub prompt: TextArea<'static>,
    pub code_input: TextArea<'static>,
    pub focus: Focus,
    pub message_list_state: MessageListState,
    pub backend_label: String,
    pub show_help: bool,
    notice: Option<(Instant, String)>,
    ticks: usize,
}

impl ChatView {
    pub fn new(greeting: &str, backend_label: impl Into<String>) -> Self {
        Self {
            conversation: Conversation::with_greeting(greeting),
            prompt: build_prompt(),
            code_input: build_code_input(),
            focus: Focus::Prompt,
            message_list_state: MessageListState::default(),
            backend_label: backend_label.into(),
            show_help: false,
            notice: None,
            ticks: 0,
        }
    }

    /// Inputs accept edits and submissions only while idle
    pub fn is_loading(&self) -> bool {
        self.conversation.is_loading()
    }

    pub fn spinner_frame(&self) -> &'static str {
        SPINNER_FRAMES[(self.ticks / TICKS_PER_FRAME) % SPINNER_FRAMES.len()]
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_ref().map(|(_, text)| text.as_str())
    }

    pub fn set_notice(&mut self, text: impl Into<String>) {
        self.notice = Some((Instant::now(), text.into()));
    }

    /// Advance animations and expire the notice
    pub fn tick(&mut self) {
        self.ticks = self.ticks.wrapping_add(1);
        if self
            .notice
            .as_ref()
            .is_some_and(|(at, _)| at.elapsed() >= NOTICE_TTL)
        {
            self.notice = None;
        }
    }

    /// Handle a key press
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        // Global shortcuts, available while loading too
        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('q'))
            | (KeyModifiers::CONTROL, KeyCode::Char('c')) => return Some(Action::Quit),
            (_, KeyCode::F(1)) => {
                self.show_help = !self.show_help;
                return None;
            }
            (_, KeyCode::Esc) => {
                self.show_help = false;
                self.notice = None;
                return None;
            }
            (_, KeyCode::PageUp) => {
                self.message_list_state.scroll_up(PAGE_LINES);
                return None;
            }
            (_, KeyCode::PageDown) => {
                self.message_list_state.scroll_down(PAGE_LINES);
                return None;
            }
            _ => {}
        }

        // Inputs are disabled while a request is in flight
        if self.is_loading() {
            return None;
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('l')) => {
                self.clear_conversation();
                None
            }
            (KeyModifiers::CONTROL, KeyCode::Char('v')) => Some(Action::PasteClipboard),
            (_, KeyCode::Tab) | (_, KeyCode::BackTab) => {
                self.focus = match self.focus {
                    Focus::Prompt => Focus::Code,
                    Focus::Code => Focus::Prompt,
                };
                None
            }
            (_, KeyCode::F(5))
            | (KeyModifiers::CONTROL, KeyCode::Enter)
            | (KeyModifiers::ALT, KeyCode::Enter) => self.submit_analysis(),
            (KeyModifiers::NONE, KeyCode::Enter) if self.focus == Focus::Prompt => {
                self.submit_chat()
            }
            // Prompt is a single line: no other newline keys reach it
            (_, KeyCode::Enter) | (KeyModifiers::CONTROL, KeyCode::Char('m') | KeyCode::Char('j'))
                if self.focus == Focus::Prompt =>
            {
                None
            }
            _ => {
                match self.focus {
                    Focus::Prompt => self.prompt.input(Input::from(key)),
                    Focus::Code => self.code_input.input(Input::from(key)),
                };
                None
            }
        }
    }

    /// Insert pasted text into the focused input
    pub fn insert_text(&mut self, text: &str) {
        if self.is_loading() {
            return;
        }
        match self.focus {
            // Prompt is a single line
            Focus::Prompt => {
                let flat = text.replace("\r\n", " ").replace(['\n', '\r'], " ");
                self.prompt.insert_str(flat);
            }
            Focus::Code => {
                self.code_input.insert_str(text.replace("\r\n", "\n"));
            }
        };
    }

    pub fn scroll_wheel(&mut self, up: bool) {
        if up {
            self.message_list_state.scroll_up(WHEEL_LINES);
        } else {
            self.message_list_state.scroll_down(WHEEL_LINES);
        }
    }

    /// Start a chat request from the prompt
    pub fn submit_chat(&mut self) -> Option<Action> {
        let text = self.prompt.lines().join("\n");
        match self.conversation.begin_chat(&text) {
            Ok(messages) => {
                self.prompt = build_prompt();
                self.message_list_state.scroll_to_bottom();
                Some(Action::Dispatch(Request::Chat(messages)))
            }
            Err(e) => {
                self.reject(e);
                None
            }
        }
    }

    /// Start a code analysis from the code editor
    pub fn submit_analysis(&mut self) -> Option<Action> {
        let code = self.code_input.lines().join("\n");
        match self.conversation.begin_analysis(&code) {
            Ok(code) => {
                self.message_list_state.scroll_to_bottom();
                Some(Action::Dispatch(Request::AnalyzeCode(code)))
            }
            Err(e) => {
                self.reject(e);
                None
            }
        }
    }

    fn reject(&mut self, e: ConversationError) {
        match e {
            ConversationError::EmptyInput => {}
            other => self.set_notice(other.to_string()),
        }
    }

    /// Apply a finished backend call
    pub fn apply_response(&mut self, kind: RequestKind, result: Result<String, String>) {
        if let Err(e) = &result {
            self.set_notice(format!("{} failed: {}", kind, e));
        }
        match self.conversation.complete(kind, result) {
            Ok(()) => self.message_list_state.scroll_to_bottom(),
            Err(e) => tracing::warn!("Ignoring backend response: {}", e),
        }
    }

    pub fn clear_conversation(&mut self) {
        match self.conversation.clear() {
            Ok(()) => self.message_list_state = MessageListState::default(),
            Err(e) => self.set_notice(e.to_string()),
        }
    }

    /// Restyle inputs for the current focus and loading state.
    /// Called before drawing so render stays read-only.
    pub fn prepare_for_render(&mut self) {
        let loading = self.is_loading();
        let prompt_title = if loading {
            " Message (waiting for reply) "
        } else {
            " Message "
        };
        let code_title = if loading {
            " Rust code (waiting for reply) "
        } else {
            " Rust code · F5 to analyze "
        };

        style_input(
            &mut self.prompt,
            prompt_title,
            !loading && self.focus == Focus::Prompt,
            loading,
        );
        style_input(
            &mut self.code_input,
            code_title,
            !loading && self.focus == Focus::Code,
            loading,
        );
    }
}

fn style_input(input: &mut TextArea<'static>, title: &'static str, focused: bool, disabled: bool) {
    let border = if focused { Theme::ACCENT } else { Theme::BORDER };
    let text = if disabled { Theme::MUTED } else { Theme::TEXT };

    input.set_block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(title),
    );
    input.set_style(Style::default().fg(text).bg(Theme::INPUT_BG));
    input.set_cursor_style(if focused {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    });
}

fn build_prompt() -> TextArea<'static> {
    let mut input = TextArea::default();
    input.set_cursor_line_style(Style::default());
    input.set_placeholder_text("Ask anything ...");
    input.set_placeholder_style(Style::default().fg(Theme::MUTED));
    input.move_cursor(CursorMove::End);
    input
}

fn build_code_input() -> TextArea<'static> {
    let mut input = TextArea::default();
    input.set_cursor_line_style(Style::default());
    input.set_placeholder_text("Paste your Rust code here...");
    input.set_placeholder_style(Style::default().fg(Theme::MUTED));
    input
}
