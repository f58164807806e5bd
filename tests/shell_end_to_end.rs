// tests/shell_end_to_end.rs
//
// Real child processes through `sh -c`; unix only.
#![cfg(unix)]

mod common;
use crate::common::{TestResult, init_tracing, pump_until_complete, with_timeout};

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use shellpump::config::ShellSettings;
use shellpump::errors::ShellError;
use shellpump::{Shell, ShellInvocation};
use shellpump_test_utils::builders::SettingsBuilder;
use shellpump_test_utils::recording::{Recorded, RecordingSink};

/// The worker drops the process right after queueing `EndStream`, so give it
/// a moment to get there.
fn wait_for_release(shell: &Shell) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while shell.live_processes() > 0 {
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    true
}

const THREE_OUT_ONE_ERR_EXIT_TWO: &str = "echo one; echo two; echo three; echo boom >&2; exit 2";

#[test]
fn three_out_one_err_exit_two_without_policy() -> TestResult {
    init_tracing();

    let shell = Shell::new(SettingsBuilder::new().build());
    let req = shell.run_command(THREE_OUT_ONE_ERR_EXIT_TWO, ".", None)?;
    let sink = RecordingSink::attach(&req);

    assert!(pump_until_complete(&shell, &[&req]));
    assert_eq!(
        sink.events(),
        vec![
            Recorded::Info("one".into()),
            Recorded::Info("two".into()),
            Recorded::Info("three".into()),
            Recorded::Error("boom".into()),
            Recorded::Complete(2),
        ]
    );
    assert_eq!(req.completion().unwrap().result()?, 2);
    assert!(wait_for_release(&shell), "process handle was not released");
    Ok(())
}

#[test]
fn three_out_one_err_exit_two_with_policy() -> TestResult {
    init_tracing();

    let shell = Shell::new(SettingsBuilder::new().throw_on_non_zero_exit(true).build());
    let req = shell.run_command(THREE_OUT_ONE_ERR_EXIT_TWO, ".", None)?;
    let sink = RecordingSink::attach(&req);

    assert!(pump_until_complete(&shell, &[&req]));
    assert_eq!(sink.info_lines(), vec!["one", "two", "three"]);
    assert_eq!(sink.error_lines(), vec!["boom"]);

    match req.completion().unwrap().result() {
        Err(ShellError::NonZeroExit { code, .. }) => assert_eq!(code, 2),
        other => panic!("expected NonZeroExit, got {other:?}"),
    }
    Ok(())
}

#[test]
fn policy_is_snapshotted_at_launch() -> TestResult {
    init_tracing();

    let mut shell = Shell::new(SettingsBuilder::new().build());
    let lenient = shell.run_command("exit 3", ".", None)?;
    shell.settings_mut().throw_on_non_zero_exit = true;
    let strict = shell.run_command("exit 3", ".", None)?;

    assert!(pump_until_complete(&shell, &[&lenient, &strict]));
    assert_eq!(lenient.completion().unwrap().result()?, 3);
    assert!(strict.completion().unwrap().result().is_err());
    Ok(())
}

#[test]
fn path_override_is_prepended_for_the_child() -> TestResult {
    init_tracing();

    let shell = Shell::new(SettingsBuilder::new().default_env("PATH", "/opt/default").build());
    let mut env = BTreeMap::new();
    env.insert("PATH".to_string(), "/custom".to_string());
    env.insert("GREETING".to_string(), "hello there".to_string());

    let req = shell.run_command("echo \"$PATH\"; echo \"$GREETING\"", ".", Some(&env))?;
    let sink = RecordingSink::attach(&req);
    assert!(pump_until_complete(&shell, &[&req]));

    let lines = sink.info_lines();
    assert!(
        lines[0].starts_with("/custom:/opt/default:"),
        "unexpected PATH {:?}",
        lines[0]
    );
    assert_eq!(lines[1], "hello there");
    Ok(())
}

#[test]
fn non_utf8_parent_variables_reach_the_child() -> TestResult {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    init_tracing();

    const NAME: &str = "SHELLPUMP_E2E_NON_UTF8";
    // SAFETY: no other test reads or writes this variable, and std serializes
    // its own environment access with process spawning.
    unsafe { std::env::set_var(NAME, OsStr::from_bytes(b"ab\xffcd")) };

    let shell = Shell::default();
    let mut env = BTreeMap::new();
    env.insert("PATH".to_string(), "/custom".to_string());
    let req = shell.run_command(&format!("echo \"${{{NAME}-UNSET}}\""), ".", Some(&env))?;
    let sink = RecordingSink::attach(&req);
    assert!(pump_until_complete(&shell, &[&req]));

    unsafe { std::env::remove_var(NAME) };

    let lines = sink.info_lines();
    assert_eq!(lines.len(), 1);
    assert_ne!(lines[0], "UNSET", "non-UTF-8 variable was dropped");
    assert!(lines[0].starts_with("ab") && lines[0].ends_with("cd"));
    Ok(())
}

#[test]
fn command_runs_in_the_working_directory() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let shell = Shell::default();
    let req = shell.run(&ShellInvocation::new("pwd -P").working_dir(dir.path()).quiet(true))?;
    let sink = RecordingSink::attach(&req);
    assert!(pump_until_complete(&shell, &[&req]));

    let expected = dir.path().canonicalize()?;
    assert_eq!(sink.info_lines(), vec![expected.display().to_string()]);
    Ok(())
}

#[test]
fn missing_working_directory_fails_synchronously() {
    init_tracing();

    let shell = Shell::default();
    match shell.run_command("true", "/definitely/not/a/dir", None) {
        Err(ShellError::InvalidWorkingDirectory(path)) => {
            assert!(path.ends_with("dir"));
        }
        other => panic!("expected InvalidWorkingDirectory, got {other:?}"),
    }
    assert!(shell.queue().is_empty());
    assert_eq!(shell.live_processes(), 0);
}

#[test]
fn stdin_is_closed_so_readers_do_not_hang() -> TestResult {
    init_tracing();

    let shell = Shell::default();
    let req = shell.run_command("cat; echo after-cat", ".", None)?;
    let sink = RecordingSink::attach(&req);

    assert!(pump_until_complete(&shell, &[&req]));
    assert_eq!(sink.info_lines(), vec!["after-cat"]);
    assert_eq!(req.exit_code(), Some(0));
    Ok(())
}

#[test]
fn concurrent_commands_keep_their_own_order() -> TestResult {
    init_tracing();

    let shell = Shell::default();
    let mut runs = Vec::new();
    for n in 0..4 {
        let cmd = format!("for i in 1 2 3 4 5; do echo {n}-$i; done; echo {n}-err >&2; exit {n}");
        let req = shell.run(&ShellInvocation::new(cmd).quiet(true))?;
        let sink = RecordingSink::attach(&req);
        runs.push((n, req, sink));
    }

    let handles: Vec<_> = runs.iter().map(|(_, req, _)| req).collect();
    assert!(pump_until_complete(&shell, &handles));

    for (n, _, sink) in &runs {
        let mut expected: Vec<Recorded> =
            (1..=5).map(|i| Recorded::Info(format!("{n}-{i}"))).collect();
        expected.push(Recorded::Error(format!("{n}-err")));
        expected.push(Recorded::Complete(*n));
        assert_eq!(sink.events(), expected);
    }
    assert!(wait_for_release(&shell));
    Ok(())
}

#[test]
fn large_stderr_output_does_not_stall_the_reader() -> TestResult {
    init_tracing();

    let shell = Shell::default();
    // ~150 KB on stderr before stdout closes; more than a pipe buffer holds.
    let req = shell.run(
        &ShellInvocation::new(
            "i=0; while [ $i -lt 15000 ]; do echo err-line-$i >&2; i=$((i+1)); done; echo done",
        )
        .quiet(true),
    )?;
    let sink = RecordingSink::attach(&req);

    assert!(pump_until_complete(&shell, &[&req]));
    assert_eq!(sink.info_lines(), vec!["done"]);
    let errors = sink.error_lines();
    assert_eq!(errors.len(), 15000);
    assert_eq!(errors.first().map(String::as_str), Some("err-line-0"));
    assert_eq!(errors.last().map(String::as_str), Some("err-line-14999"));
    Ok(())
}

#[test]
fn killed_child_surfaces_as_an_early_end_stream() -> TestResult {
    init_tracing();

    let shell = Shell::default();
    let req = shell.run_command("echo $$; exec sleep 30", ".", None)?;
    let sink = RecordingSink::attach(&req);

    // Wait for the pid line, then terminate the child from outside.
    let deadline = Instant::now() + Duration::from_secs(5);
    let pid = loop {
        shell.drain_queue_tick();
        if let Some(pid) = sink.info_lines().first().cloned() {
            break pid;
        }
        assert!(Instant::now() < deadline, "child never printed its pid");
        std::thread::sleep(Duration::from_millis(5));
    };
    let status = std::process::Command::new("kill").arg("-9").arg(&pid).status()?;
    assert!(status.success());

    assert!(pump_until_complete(&shell, &[&req]));
    assert_eq!(req.exit_code(), Some(-1));
    assert!(wait_for_release(&shell));
    Ok(())
}

#[tokio::test]
async fn wait_resolves_while_a_task_drives_the_pump() -> TestResult {
    init_tracing();

    let shell = Arc::new(Shell::new(ShellSettings::default()));
    let req = shell.run_command("echo hi; exit 7", ".", None)?;

    // Current-thread runtime: this task and the test body share one thread.
    let pump = {
        let shell = Arc::clone(&shell);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_millis(5));
            loop {
                ticker.tick().await;
                shell.drain_queue_tick();
            }
        })
    };

    let code = with_timeout(req.wait()).await?;
    assert_eq!(code, 7);
    pump.abort();
    Ok(())
}
