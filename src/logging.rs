// src/logging.rs

//! `tracing` subscriber for the `shellpump` binary.
//!
//! The filter comes from, in order:
//! 1. the `--log-level` flag, applied to every target;
//! 2. `SHELLPUMP_LOG`, read as `EnvFilter` directives
//!    (`debug`, `shellpump::exec=trace,warn`, ...);
//! 3. `info`.
//!
//! Output goes to stderr; stdout is reserved for command output.

use anyhow::{Result, anyhow};
use tracing::warn;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use crate::cli::LogLevel;

/// Variable holding filter directives when no CLI level is given.
pub const LOG_ENV: &str = "SHELLPUMP_LOG";

/// Outcome of resolving the filter: the filter to install and, if
/// `SHELLPUMP_LOG` could not be parsed, the rejected value.
#[derive(Debug)]
pub struct ResolvedFilter {
    pub filter: EnvFilter,
    pub rejected: Option<String>,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Install the global subscriber. Errors if one is already set.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env_value = std::env::var(LOG_ENV).ok();
    let ResolvedFilter { filter, rejected } = resolve_filter(cli_level, env_value.as_deref());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))?;

    if let Some(value) = rejected {
        warn!(%value, "ignoring unparseable {LOG_ENV}; logging at info");
    }
    Ok(())
}

/// Pick the filter from the CLI level or the `SHELLPUMP_LOG` value.
pub fn resolve_filter(cli_level: Option<LogLevel>, env_value: Option<&str>) -> ResolvedFilter {
    if let Some(level) = cli_level {
        return ResolvedFilter {
            filter: level_only(LevelFilter::from(level)),
            rejected: None,
        };
    }

    let directives = env_value.map(str::trim).filter(|s| !s.is_empty());
    match directives.map(|d| (d, EnvFilter::try_new(d))) {
        Some((_, Ok(filter))) => ResolvedFilter {
            filter,
            rejected: None,
        },
        Some((raw, Err(_))) => ResolvedFilter {
            filter: level_only(LevelFilter::INFO),
            rejected: Some(raw.to_string()),
        },
        None => ResolvedFilter {
            filter: level_only(LevelFilter::INFO),
            rejected: None,
        },
    }
}

fn level_only(level: LevelFilter) -> EnvFilter {
    EnvFilter::default().add_directive(level.into())
}
