//! codechat - terminal chat and Rust code analysis client
//!
//! Launches the TUI by default; `ask` and `analyze` run a single request and
//! print the reply.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use codechat::backend::BackendKind;
use codechat::runner::{run_analyze, run_ask, run_tui, AppConfig};

/// Chat with a backend and get Rust code analyzed, from the terminal
#[derive(Parser, Debug)]
#[command(name = "codechat")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Settings file (defaults to $XDG_CONFIG_HOME/codechat/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend transport
    #[arg(long, value_enum, global = true)]
    backend: Option<BackendKind>,

    /// Backend base URL
    #[arg(long, env = "CODECHAT_URL", global = true)]
    url: Option<String>,

    /// Model name for the llm backend
    #[arg(long, env = "CODECHAT_MODEL", global = true)]
    model: Option<String>,

    /// Bearer token sent with every request
    #[arg(long, env = "CODECHAT_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Enable debug logging
    #[arg(short = 'd', long, global = true)]
    debug: bool,

    /// Enable verbose (trace-level) logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send one message and print the reply
    Ask {
        /// Message text (joined with spaces)
        #[arg(required = true)]
        text: Vec<String>,

        /// Send the text as a bare prompt, without the greeting
        #[arg(long)]
        raw: bool,
    },
    /// Analyze Rust code from a file, or stdin when no file is given
    Analyze {
        file: Option<PathBuf>,
    },
}

impl From<&Args> for AppConfig {
    fn from(args: &Args) -> Self {
        AppConfig {
            debug: args.debug,
            verbose: args.verbose,
            config_path: args.config.clone(),
            backend: args.backend,
            url: args.url.clone(),
            model: args.model.clone(),
            api_key: args.api_key.clone(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = AppConfig::from(&args);

    match args.command {
        None => run_tui(config),
        Some(Command::Ask { text, raw }) => run_ask(config, &text.join(" "), raw),
        Some(Command::Analyze { file }) => run_analyze(config, file),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn test_ask_joins_words() {
        let args = Args::try_parse_from(["codechat", "ask", "what", "is", "Rust?"]).unwrap();
        match args.command {
            Some(Command::Ask { text, raw }) => {
                assert_eq!(text.join(" "), "what is Rust?");
                assert!(!raw);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_ask_raw_flag() {
        let args = Args::try_parse_from(["codechat", "ask", "--raw", "hello"]).unwrap();
        assert!(matches!(args.command, Some(Command::Ask { raw: true, .. })));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args =
            Args::try_parse_from(["codechat", "analyze", "main.rs", "--backend", "llm"]).unwrap();
        assert_eq!(args.backend, Some(BackendKind::Llm));
        assert!(matches!(args.command, Some(Command::Analyze { file: Some(_) })));
    }
}
