pub mod header;
mod messages;
pub mod status;

pub use header::Header;
pub use messages::{build_lines, MessageList, MessageListState};
pub use status::StatusBar;
