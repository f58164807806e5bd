// src/config/validate.rs

use crate::config::model::{RawSettingsFile, ShellSettings};
use crate::errors::{Result, ShellError};
use crate::exec::environment::validate_variable;

impl TryFrom<RawSettingsFile> for ShellSettings {
    type Error = crate::errors::ShellError;

    fn try_from(raw: RawSettingsFile) -> std::result::Result<Self, Self::Error> {
        validate_settings(&raw)?;
        Ok(ShellSettings::new_unchecked(raw))
    }
}

pub fn validate_settings(cfg: &RawSettingsFile) -> Result<()> {
    validate_shell_section(cfg)?;
    validate_environment(cfg)?;
    Ok(())
}

fn validate_shell_section(cfg: &RawSettingsFile) -> Result<()> {
    if cfg.shell.tick_interval_ms == 0 {
        return Err(ShellError::ConfigError(
            "[shell].tick_interval_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_environment(cfg: &RawSettingsFile) -> Result<()> {
    for (name, value) in cfg.environment.iter() {
        validate_variable(name, value)
            .map_err(|e| ShellError::ConfigError(format!("[environment]: {e}")))?;
    }
    Ok(())
}
