// src/exec/environment.rs

//! Environment merging and PATH lookup for launched commands.
//!
//! The effective environment of a child is built in layers:
//! 1. the current process environment (inherited as-is, bytes included),
//! 2. the shell's default environment (from [`crate::config::ShellSettings`]),
//! 3. the per-invocation overrides.
//!
//! Every variable is set verbatim except `PATH` (matched case-insensitively),
//! whose entries are *prepended* to the value accumulated so far.

use std::collections::BTreeMap;
use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::errors::{Result, ShellError};

const PATH_VAR: &str = "PATH";

/// Snapshot the current process environment without any lossy conversion.
pub fn process_environment() -> BTreeMap<OsString, OsString> {
    env::vars_os().collect()
}

/// Resolve the variables `layers` set on top of `base`.
///
/// Only the touched variables are returned; everything else is meant to be
/// inherited unchanged, so the launcher never clears the child environment.
pub fn resolve_overrides<'a, I>(
    base: &BTreeMap<OsString, OsString>,
    layers: I,
) -> Result<BTreeMap<OsString, OsString>>
where
    I: IntoIterator<Item = &'a BTreeMap<String, String>>,
{
    let mut resolved = BTreeMap::new();
    for layer in layers {
        apply_layer(base, &mut resolved, layer)?;
    }
    Ok(resolved)
}

/// Full environment: `base` with `layers` applied, in order.
pub fn merge_environment<'a, I>(
    base: BTreeMap<OsString, OsString>,
    layers: I,
) -> Result<BTreeMap<OsString, OsString>>
where
    I: IntoIterator<Item = &'a BTreeMap<String, String>>,
{
    let overrides = resolve_overrides(&base, layers)?;
    let mut merged = base;
    merged.extend(overrides);
    Ok(merged)
}

fn apply_layer(
    base: &BTreeMap<OsString, OsString>,
    resolved: &mut BTreeMap<OsString, OsString>,
    layer: &BTreeMap<String, String>,
) -> Result<()> {
    for (name, value) in layer {
        validate_variable(name, value)?;

        if name.eq_ignore_ascii_case(PATH_VAR) {
            // Keep whatever spelling is already in use ("Path" on Windows).
            let key = find_path_key(resolved)
                .or_else(|| find_path_key(base))
                .unwrap_or_else(|| OsString::from(name));
            let current = resolved
                .get(&key)
                .or_else(|| base.get(&key))
                .cloned()
                .unwrap_or_default();
            let path = prepend_path_entries(value, &current)?;
            trace!(key = ?key, path = ?path, "prepended PATH entries");
            resolved.insert(key, path);
        } else {
            resolved.insert(OsString::from(name), OsString::from(value));
        }
    }
    Ok(())
}

fn find_path_key(env: &BTreeMap<OsString, OsString>) -> Option<OsString> {
    env.keys()
        .find(|k| k.eq_ignore_ascii_case(PATH_VAR))
        .cloned()
}

/// Join the entries of `additional` in front of the entries of `current`,
/// using the platform path-list separator. Empty entries are dropped.
pub fn prepend_path_entries(
    additional: impl AsRef<OsStr>,
    current: impl AsRef<OsStr>,
) -> Result<OsString> {
    let entries: Vec<PathBuf> = env::split_paths(additional.as_ref())
        .chain(env::split_paths(current.as_ref()))
        .filter(|p| !p.as_os_str().is_empty())
        .collect();

    env::join_paths(entries)
        .map_err(|e| ShellError::InvalidEnvironment(format!("PATH entry: {e}")))
}

/// Reject names/values that cannot be handed to a child process.
pub fn validate_variable(name: &str, value: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ShellError::InvalidEnvironment(
            "empty variable name".to_string(),
        ));
    }
    if name.contains('=') || name.contains('\0') {
        return Err(ShellError::InvalidEnvironment(format!(
            "variable name {name:?} contains '=' or NUL"
        )));
    }
    if value.contains('\0') {
        return Err(ShellError::InvalidEnvironment(format!(
            "value of {name} contains NUL"
        )));
    }
    Ok(())
}

/// Whether a file named exactly `name` exists in a directory of the current
/// process `PATH`.
pub fn command_exists(name: &str) -> bool {
    command_exists_in(name, env::var_os(PATH_VAR).as_deref())
}

/// Same as [`command_exists`] against an explicit PATH-like value.
///
/// Returns `false` for an empty or missing value.
pub fn command_exists_in(name: &str, path_var: Option<&OsStr>) -> bool {
    let Some(path_var) = path_var else {
        return false;
    };
    if name.is_empty() {
        return false;
    }

    env::split_paths(path_var).any(|dir| {
        let dir = match dir.to_str() {
            Some(s) => PathBuf::from(s.trim()),
            None => dir,
        };
        !dir.as_os_str().is_empty() && is_file(&dir.join(name))
    })
}

fn is_file(path: &Path) -> bool {
    path.metadata().map(|m| m.is_file()).unwrap_or(false)
}
