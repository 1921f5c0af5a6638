//! codechat library
//!
//! Conversation state, backend clients, settings and the terminal interface
//! behind the `codechat` binary.

pub mod backend;
pub mod chat;
pub mod config;
pub mod runner;
pub mod tui;
