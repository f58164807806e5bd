// tests/cli_args.rs

use std::path::PathBuf;

use clap::Parser;
use shellpump::cli::{CliArgs, CliCommand};

#[test]
fn run_subcommand_collects_commands_and_env() {
    let args = CliArgs::try_parse_from([
        "shellpump",
        "run",
        "--cwd",
        "/tmp",
        "--env",
        "PATH=/custom",
        "--env",
        "EMPTY=",
        "--throw-on-non-zero",
        "echo one",
        "echo two",
    ])
    .unwrap();

    let CliCommand::Run(run) = args.command else {
        panic!("expected run subcommand");
    };
    assert_eq!(run.cwd, PathBuf::from("/tmp"));
    assert_eq!(
        run.env,
        vec![
            ("PATH".to_string(), "/custom".to_string()),
            ("EMPTY".to_string(), String::new()),
        ]
    );
    assert!(run.throw_on_non_zero);
    assert!(!run.quiet);
    assert_eq!(run.commands, vec!["echo one", "echo two"]);
}

#[test]
fn env_without_equals_is_rejected() {
    let result = CliArgs::try_parse_from(["shellpump", "run", "--env", "NOPE", "true"]);
    assert!(result.is_err());
}

#[test]
fn run_requires_a_command() {
    assert!(CliArgs::try_parse_from(["shellpump", "run"]).is_err());
}

#[test]
fn exists_subcommand_takes_a_name() {
    let args = CliArgs::try_parse_from(["shellpump", "--log-level", "debug", "exists", "git"]).unwrap();
    assert!(args.log_level.is_some());
    assert!(matches!(args.command, CliCommand::Exists { ref name } if name == "git"));
}
