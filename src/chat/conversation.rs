//! Conversation state management
//!
//! Holds the ordered message list and the single in-flight request. Every
//! request inserts a placeholder row that is either replaced by the reply or
//! removed when the backend call fails.

use thiserror::Error;

use super::message::{analysis_request_text, ChatMessage, Entry};

/// Placeholder text while waiting for a chat reply
pub const CHAT_PLACEHOLDER: &str = "Thinking...";
/// Placeholder text while waiting for a code analysis
pub const ANALYSIS_PLACEHOLDER: &str = "Analyzing code...";

/// Which backend procedure a pending request is waiting on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Chat,
    AnalyzeCode,
}

impl RequestKind {
    pub fn label(self) -> &'static str {
        match self {
            RequestKind::Chat => "chat",
            RequestKind::AnalyzeCode => "analyze_code",
        }
    }
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Errors raised by conversation transitions
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversationError {
    #[error("Input is empty")]
    EmptyInput,

    #[error("A {0} request is already in flight")]
    Busy(RequestKind),

    #[error("No request is pending")]
    NotPending,

    #[error("Pending request is {pending:?}, got a {got:?} response")]
    KindMismatch { pending: RequestKind, got: RequestKind },
}

/// A conversation (list of messages plus the loading state)
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    entries: Vec<Entry>,
    greeting: Option<String>,
    pending: Option<RequestKind>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a conversation with a single system greeting
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        let greeting = greeting.into();
        let mut conv = Self {
            greeting: Some(greeting),
            ..Self::default()
        };
        conv.seed();
        conv
    }

    fn seed(&mut self) {
        if let Some(greeting) = &self.greeting {
            self.entries.push(Entry::new(ChatMessage::system(greeting.clone())));
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<RequestKind> {
        self.pending
    }

    /// Messages without the placeholder, in order
    pub fn history(&self) -> Vec<ChatMessage> {
        self.entries
            .iter()
            .filter(|e| !e.placeholder)
            .map(|e| e.message.clone())
            .collect()
    }

    fn ensure_idle(&self) -> Result<(), ConversationError> {
        match self.pending {
            Some(kind) => Err(ConversationError::Busy(kind)),
            None => Ok(()),
        }
    }

    /// Append the user's message and a placeholder.
    ///
    /// Returns the conversation to send to `chat`, which ends with the new
    /// user message and never includes the placeholder.
    pub fn begin_chat(&mut self, text: &str) -> Result<Vec<ChatMessage>, ConversationError> {
        if text.trim().is_empty() {
            return Err(ConversationError::EmptyInput);
        }
        self.ensure_idle()?;

        self.entries.push(Entry::new(ChatMessage::user(text)));
        let request = self.history();
        self.entries.push(Entry::placeholder(CHAT_PLACEHOLDER));
        self.pending = Some(RequestKind::Chat);
        Ok(request)
    }

    /// Append the wrapped code snippet and a placeholder.
    ///
    /// Returns the code to send to `analyze_code`.
    pub fn begin_analysis(&mut self, code: &str) -> Result<String, ConversationError> {
        if code.trim().is_empty() {
            return Err(ConversationError::EmptyInput);
        }
        self.ensure_idle()?;

        self.entries
            .push(Entry::new(ChatMessage::user(analysis_request_text(code))));
        self.entries.push(Entry::placeholder(ANALYSIS_PLACEHOLDER));
        self.pending = Some(RequestKind::AnalyzeCode);
        Ok(code.to_string())
    }

    /// Resolve the pending request.
    ///
    /// On success the trailing placeholder is replaced by the reply; on
    /// failure it is removed. Either way the loading state is cleared.
    pub fn complete<E>(
        &mut self,
        kind: RequestKind,
        outcome: Result<String, E>,
    ) -> Result<(), ConversationError> {
        match self.pending {
            None => return Err(ConversationError::NotPending),
            Some(pending) if pending != kind => {
                return Err(ConversationError::KindMismatch { pending, got: kind });
            }
            Some(_) => {}
        }

        if self.entries.last().is_some_and(|e| e.placeholder) {
            self.entries.pop();
        }
        if let Ok(reply) = outcome {
            self.entries.push(Entry::new(ChatMessage::system(reply)));
        }
        self.pending = None;
        Ok(())
    }

    /// Reset to the greeting
    pub fn clear(&mut self) -> Result<(), ConversationError> {
        self.ensure_idle()?;
        self.entries.clear();
        self.seed();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Role;

    fn conv() -> Conversation {
        Conversation::with_greeting("Hello")
    }

    #[test]
    fn test_greeting_seeds_single_system_message() {
        let conv = conv();
        assert_eq!(conv.len(), 1);
        assert_eq!(conv.entries()[0].role(), Role::System);
        assert!(!conv.is_loading());
    }

    #[test]
    fn test_begin_chat_appends_user_and_placeholder() {
        let mut conv = conv();
        let request = conv.begin_chat("What is a lifetime?").unwrap();

        assert_eq!(
            request,
            vec![
                ChatMessage::system("Hello"),
                ChatMessage::user("What is a lifetime?"),
            ]
        );
        assert_eq!(conv.len(), 3);
        let last = conv.entries().last().unwrap();
        assert!(last.placeholder);
        assert_eq!(last.content(), CHAT_PLACEHOLDER);
        assert!(conv.is_loading());
        assert_eq!(conv.pending(), Some(RequestKind::Chat));
    }

    #[test]
    fn test_chat_success_replaces_placeholder_once() {
        let mut conv = conv();
        conv.begin_chat("hi").unwrap();
        let before = conv.len();

        conv.complete(RequestKind::Chat, Ok::<_, ()>("hey there".to_string()))
            .unwrap();

        assert_eq!(conv.len(), before);
        let last = conv.entries().last().unwrap();
        assert!(!last.placeholder);
        assert_eq!(last.role(), Role::System);
        assert_eq!(last.content(), "hey there");
        assert_eq!(conv.entries().iter().filter(|e| e.placeholder).count(), 0);
        assert!(!conv.is_loading());
    }

    #[test]
    fn test_chat_failure_removes_placeholder() {
        let mut conv = conv();
        conv.begin_chat("hi").unwrap();
        let before_placeholder = conv.len() - 1;

        conv.complete(RequestKind::Chat, Err::<String, _>("network down"))
            .unwrap();

        assert_eq!(conv.len(), before_placeholder);
        assert_eq!(conv.entries().last().unwrap().content(), "hi");
        assert!(!conv.is_loading());
    }

    #[test]
    fn test_analysis_prefixes_code_block() {
        let mut conv = conv();
        let code = conv.begin_analysis("fn main() {}").unwrap();
        assert_eq!(code, "fn main() {}");

        let user = &conv.entries()[1];
        assert_eq!(user.role(), Role::User);
        assert_eq!(user.content(), "Analyze this code:\n```rust\nfn main() {}\n```");
        assert_eq!(conv.entries()[2].content(), ANALYSIS_PLACEHOLDER);
        assert_eq!(conv.pending(), Some(RequestKind::AnalyzeCode));
    }

    #[test]
    fn test_analysis_failure_rolls_back_placeholder() {
        let mut conv = conv();
        conv.begin_analysis("let x = ;").unwrap();

        conv.complete(RequestKind::AnalyzeCode, Err::<String, _>(()))
            .unwrap();

        assert_eq!(conv.len(), 2);
        assert!(conv.entries().iter().all(|e| !e.placeholder));
        assert!(!conv.is_loading());
    }

    #[test]
    fn test_analysis_success() {
        let mut conv = conv();
        conv.begin_analysis("fn main() {}").unwrap();
        conv.complete(
            RequestKind::AnalyzeCode,
            Ok::<_, ()>("The code is correct.".to_string()),
        )
        .unwrap();

        assert_eq!(conv.len(), 3);
        assert_eq!(conv.entries()[2].content(), "The code is correct.");
    }

    #[test]
    fn test_empty_input_rejected() {
        let mut conv = conv();
        assert_eq!(conv.begin_chat("   "), Err(ConversationError::EmptyInput));
        assert_eq!(conv.begin_analysis("\n\t"), Err(ConversationError::EmptyInput));
        assert_eq!(conv.len(), 1);
        assert!(!conv.is_loading());
    }

    #[test]
    fn test_second_request_while_loading_is_busy() {
        let mut conv = conv();
        conv.begin_chat("first").unwrap();

        assert_eq!(
            conv.begin_chat("second"),
            Err(ConversationError::Busy(RequestKind::Chat))
        );
        assert_eq!(
            conv.begin_analysis("fn f() {}"),
            Err(ConversationError::Busy(RequestKind::Chat))
        );
        assert_eq!(conv.len(), 3);
    }

    #[test]
    fn test_complete_without_pending_is_rejected() {
        let mut conv = conv();
        let result = conv.complete(RequestKind::Chat, Ok::<_, ()>("stray".to_string()));
        assert_eq!(result, Err(ConversationError::NotPending));
        assert_eq!(conv.len(), 1);
    }

    #[test]
    fn test_complete_with_wrong_kind_is_rejected() {
        let mut conv = conv();
        conv.begin_chat("hi").unwrap();

        let result = conv.complete(RequestKind::AnalyzeCode, Ok::<_, ()>("x".to_string()));
        assert_eq!(
            result,
            Err(ConversationError::KindMismatch {
                pending: RequestKind::Chat,
                got: RequestKind::AnalyzeCode,
            })
        );
        assert!(conv.is_loading());
        assert!(conv.entries().last().unwrap().placeholder);
    }

    #[test]
    fn test_history_excludes_placeholder() {
        let mut conv = conv();
        conv.begin_chat("hi").unwrap();
        let history = conv.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history.last().unwrap(), &ChatMessage::user("hi"));
    }

    #[test]
    fn test_follow_up_chat_sends_full_history() {
        let mut conv = conv();
        conv.begin_chat("one").unwrap();
        conv.complete(RequestKind::Chat, Ok::<_, ()>("reply one".to_string()))
            .unwrap();

        let request = conv.begin_chat("two").unwrap();
        assert_eq!(
            request,
            vec![
                ChatMessage::system("Hello"),
                ChatMessage::user("one"),
                ChatMessage::system("reply one"),
                ChatMessage::user("two"),
            ]
        );
    }

    #[test]
    fn test_clear_resets_to_greeting() {
        let mut conv = conv();
        conv.begin_chat("hi").unwrap();
        assert!(conv.clear().is_err());

        conv.complete(RequestKind::Chat, Ok::<_, ()>("yo".to_string()))
            .unwrap();
        conv.clear().unwrap();
        assert_eq!(conv.len(), 1);
        assert_eq!(conv.entries()[0].content(), "Hello");
    }

    #[test]
    fn test_without_greeting_starts_empty() {
        let mut conv = Conversation::new();
        assert!(conv.is_empty());
        let request = conv.begin_chat("hi").unwrap();
        assert_eq!(request, vec![ChatMessage::user("hi")]);
    }
}
