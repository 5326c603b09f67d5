// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `watchloop`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "watchloop",
    version,
    about = "Run tasks whenever files matching watch targets change.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Glob patterns are resolved relative to the directory containing it.
    #[arg(long, value_name = "PATH", default_value = "Watchloop.toml")]
    pub config: String,

    /// Watch only this `[target.<name>]`.
    #[arg(long, value_name = "NAME")]
    pub target: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `WATCHLOOP_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve targets, list the files they match, and exit.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_target_and_defaults() {
        let args = CliArgs::parse_from(["watchloop", "--target", "docs", "--log-level", "debug"]);
        assert_eq!(args.config, "Watchloop.toml");
        assert_eq!(args.target.as_deref(), Some("docs"));
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
        assert!(!args.dry_run);
    }
}
