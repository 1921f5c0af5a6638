//! Conversation state shared by the TUI and the one-shot CLI.

pub mod conversation;
pub mod message;

pub use conversation::{Conversation, ConversationError, RequestKind};
pub use message::{analysis_request_text, ChatMessage, Entry, Role};
