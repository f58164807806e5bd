// src/config/mod.rs

//! Settings loading and validation.
//!
//! - `model.rs`: TOML-backed data model and the in-memory [`ShellSettings`].
//! - `loader.rs`: read a settings file from disk.
//! - `validate.rs`: sanity checks applied when converting to `ShellSettings`.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{RawSettingsFile, ShellSection, ShellSettings};
pub use validate::validate_settings;
