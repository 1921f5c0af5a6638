//! Configuration management.

mod settings;
mod xdg;

pub use settings::{Settings, SettingsError, DEFAULT_GREETING};
pub use xdg::XdgDirs;
