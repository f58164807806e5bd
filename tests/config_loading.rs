// tests/config_loading.rs
mod common;
use crate::common::{TestResult, init_tracing};

use std::io::Write;
use std::time::Duration;

use shellpump::config::{ShellSettings, load_and_validate};
use shellpump::errors::ShellError;
use tempfile::NamedTempFile;

fn settings_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn empty_file_gives_defaults() -> TestResult {
    init_tracing();

    let file = settings_file("");
    let settings = load_and_validate(file.path())?;
    assert_eq!(settings, ShellSettings::default());
    assert!(!settings.throw_on_non_zero_exit);
    assert_eq!(settings.tick_interval, Duration::from_millis(16));
    Ok(())
}

#[test]
fn full_file_is_parsed() -> TestResult {
    init_tracing();

    let file = settings_file(
        r#"
[shell]
throw_on_non_zero_exit = true
tick_interval_ms = 40

[environment]
PATH = "/opt/tools/bin"
RUST_LOG = "debug"
"#,
    );

    let settings = load_and_validate(file.path())?;
    assert!(settings.throw_on_non_zero_exit);
    assert_eq!(settings.tick_interval, Duration::from_millis(40));
    assert_eq!(settings.default_environment["PATH"], "/opt/tools/bin");
    assert_eq!(settings.default_environment["RUST_LOG"], "debug");
    Ok(())
}

#[test]
fn zero_tick_interval_is_a_config_error() {
    init_tracing();

    let file = settings_file("[shell]\ntick_interval_ms = 0\n");
    match load_and_validate(file.path()) {
        Err(ShellError::ConfigError(msg)) => assert!(msg.contains("tick_interval_ms")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn bad_environment_name_is_a_config_error() {
    init_tracing();

    let file = settings_file("[environment]\n\"A=B\" = \"x\"\n");
    match load_and_validate(file.path()) {
        Err(ShellError::ConfigError(msg)) => assert!(msg.contains("[environment]")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn malformed_toml_is_a_toml_error() {
    init_tracing();

    let file = settings_file("[shell\nthrow_on_non_zero_exit = yes");
    assert!(matches!(
        load_and_validate(file.path()),
        Err(ShellError::TomlError(_))
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    init_tracing();

    assert!(matches!(
        load_and_validate("/definitely/not/here/Shellpump.toml"),
        Err(ShellError::IoError(_))
    ));
}
