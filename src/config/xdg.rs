//! XDG Base Directory support.

use std::path::PathBuf;

const APP_DIR: &str = "codechat";

/// XDG directory paths for codechat.
pub struct XdgDirs {
    /// Config directory (~/.config/codechat or XDG_CONFIG_HOME/codechat)
    pub config: PathBuf,
    /// State directory (~/.local/state/codechat or XDG_STATE_HOME/codechat)
    pub state: PathBuf,
}

impl XdgDirs {
    /// Get XDG directories, respecting environment variables.
    pub fn new() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));

        Self {
            config: std::env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| home.join(".config"))
                .join(APP_DIR),
            state: std::env::var("XDG_STATE_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| home.join(".local/state"))
                .join(APP_DIR),
        }
    }

    /// Default settings file.
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.json")
    }

    /// Log file written while the TUI owns the terminal.
    pub fn log_file(&self) -> PathBuf {
        self.state.join("codechat.log")
    }

    /// Ensure all directories exist.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        for dir in [&self.config, &self.state] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

impl Default for XdgDirs {
    fn default() -> Self {
        Self::new()
    }
}
