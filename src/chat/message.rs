//! Chat message types
//!
//! Defines the wire message sent to the backend and the rendered row that
//! wraps it inside a conversation.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Role of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    System,
}

impl Role {
    /// Display name shown above a message row
    pub fn display_name(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::System => "System",
        }
    }
}

/// A single message as exchanged with the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// A row in the conversation
#[derive(Debug, Clone)]
pub struct Entry {
    pub message: ChatMessage,
    pub created_at: DateTime<Local>,
    /// Temporary "thinking" row awaiting a backend reply
    pub placeholder: bool,
}

impl Entry {
    pub fn new(message: ChatMessage) -> Self {
        Self {
            message,
            created_at: Local::now(),
            placeholder: false,
        }
    }

    pub fn placeholder(text: impl Into<String>) -> Self {
        Self {
            placeholder: true,
            ..Self::new(ChatMessage::system(text))
        }
    }

    pub fn role(&self) -> Role {
        self.message.role
    }

    pub fn content(&self) -> &str {
        &self.message.content
    }

    pub fn is_user(&self) -> bool {
        self.message.role == Role::User
    }

    /// Creation time formatted as `HH:MM`
    pub fn time_label(&self) -> String {
        self.created_at.format("%H:%M").to_string()
    }
}

/// User-visible text for a code analysis request.
///
/// The snippet is wrapped verbatim in a `rust` fenced block.
pub fn analysis_request_text(code: &str) -> String {
    format!("Analyze this code:\n```rust\n{}\n```", code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatMessage::user("hi")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hi"}"#);

        let msg: ChatMessage =
            serde_json::from_str(r#"{"role":"system","content":"hello"}"#).unwrap();
        assert_eq!(msg, ChatMessage::system("hello"));
    }

    #[test]
    fn test_analysis_request_text_wraps_code_block() {
        let text = analysis_request_text("fn main() {}");
        assert_eq!(text, "Analyze this code:\n```rust\nfn main() {}\n```");
    }

    #[test]
    fn test_analysis_request_text_keeps_whitespace() {
        let text = analysis_request_text("  let x = 1;\n");
        assert!(text.contains("```rust\n  let x = 1;\n\n```"));
    }

    #[test]
    fn test_placeholder_entry_is_system() {
        let entry = Entry::placeholder("Thinking...");
        assert!(entry.placeholder);
        assert_eq!(entry.role(), Role::System);
        assert_eq!(entry.content(), "Thinking...");
        assert_eq!(entry.time_label().len(), 5);
    }
}
