// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{RawSettingsFile, ShellSettings};
use crate::errors::Result;

/// Load a settings file and return the raw `RawSettingsFile`.
///
/// This only performs TOML deserialization; use [`load_and_validate`] to get
/// checked [`ShellSettings`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawSettingsFile> {
    let contents = fs::read_to_string(path.as_ref())?;
    let raw: RawSettingsFile = toml::from_str(&contents)?;
    Ok(raw)
}

/// Load a settings file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ShellSettings> {
    let raw = load_from_path(&path)?;
    ShellSettings::try_from(raw)
}

/// `Shellpump.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Shellpump.toml")
}
