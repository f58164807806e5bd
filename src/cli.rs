// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Command-line arguments for `shellpump`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "shellpump",
    version,
    about = "Run shell commands in the background and stream their output.",
    long_about = None
)]
pub struct CliArgs {
    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SHELLPUMP_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Run one or more commands concurrently and stream their output.
    Run(RunArgs),

    /// Check whether an executable named NAME exists in a PATH directory.
    Exists {
        #[arg(value_name = "NAME")]
        name: String,
    },
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Settings file (TOML). Defaults to `Shellpump.toml` if it exists.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Working directory for every command.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub cwd: PathBuf,

    /// Environment override; `PATH` entries are prepended. Repeatable.
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub env: Vec<(String, String)>,

    /// Treat a non-zero exit code as a failure.
    #[arg(long)]
    pub throw_on_non_zero: bool,

    /// Drain interval in milliseconds (overrides the settings file).
    #[arg(long, value_name = "MS")]
    pub tick_ms: Option<u64>,

    /// Don't print command output.
    #[arg(long)]
    pub quiet: bool,

    /// Commands to run, each through the platform shell.
    #[arg(required = true, value_name = "COMMAND")]
    pub commands: Vec<String>,
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

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got {s:?}")),
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
