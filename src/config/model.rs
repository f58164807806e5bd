// src/config/model.rs

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

/// Settings file as read from TOML.
///
/// ```toml
/// [shell]
/// throw_on_non_zero_exit = true
/// tick_interval_ms = 20
///
/// [environment]
/// PATH = "/opt/tools/bin"
/// RUST_LOG = "debug"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawSettingsFile {
    #[serde(default)]
    pub shell: ShellSection,

    /// Default environment merged into every invocation. A `PATH` entry is
    /// prepended to the inherited `PATH` instead of replacing it.
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
}

/// `[shell]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ShellSection {
    /// Treat a non-zero exit code as a failure of the request.
    #[serde(default)]
    pub throw_on_non_zero_exit: bool,

    /// How often a driver should run the drain pump, in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

fn default_tick_interval_ms() -> u64 {
    16
}

impl Default for ShellSection {
    fn default() -> Self {
        Self {
            throw_on_non_zero_exit: false,
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

/// Shell-wide settings, read at every `run_command` call.
///
/// Usually set once at startup (from a file or in code) and only adjusted
/// between invocations through [`crate::Shell::settings_mut`]. Each request
/// keeps the policy that was in effect when it was launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellSettings {
    pub throw_on_non_zero_exit: bool,
    pub default_environment: BTreeMap<String, String>,
    /// Only used by tick drivers; the core never sleeps.
    pub tick_interval: Duration,
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            throw_on_non_zero_exit: false,
            default_environment: BTreeMap::new(),
            tick_interval: Duration::from_millis(default_tick_interval_ms()),
        }
    }
}

impl ShellSettings {
    /// Construct settings from a raw file without validation.
    ///
    /// Prefer `ShellSettings::try_from(raw)`.
    pub(crate) fn new_unchecked(raw: RawSettingsFile) -> Self {
        Self {
            throw_on_non_zero_exit: raw.shell.throw_on_non_zero_exit,
            default_environment: raw.environment,
            tick_interval: Duration::from_millis(raw.shell.tick_interval_ms),
        }
    }
}
