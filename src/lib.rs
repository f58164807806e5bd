// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod printer;
pub mod types;

use anyhow::{Context, Result};
use tracing::{debug, error, info};

use crate::cli::{CliArgs, CliCommand, RunArgs};
use crate::config::{ShellSettings, default_config_path, load_and_validate};
use crate::engine::RequestHandle;
use crate::printer::LinePrinter;

pub use crate::engine::{Completion, DrainPump, DrainReport, EventQueue, Shell};
pub use crate::errors::ShellError;
pub use crate::exec::{ShellInvocation, command_exists};
pub use crate::types::{LogKind, RequestId, ShellEvent};

/// High-level entry point used by `main.rs`. Returns the process exit code.
///
/// Must run on a current-thread runtime: the tick loop below is the single
/// consumer thread of the shell.
pub async fn run(args: CliArgs) -> Result<i32> {
    match args.command {
        CliCommand::Exists { name } => {
            let found = command_exists(&name);
            println!("{name}: {}", if found { "found" } else { "not found" });
            Ok(if found { 0 } else { 1 })
        }
        CliCommand::Run(run_args) => run_commands(run_args).await,
    }
}

async fn run_commands(args: RunArgs) -> Result<i32> {
    let settings = load_settings(&args)?;
    let tick_interval = settings.tick_interval;
    let shell = Shell::new(settings);

    let labelled = args.commands.len() > 1;
    let mut handles = Vec::with_capacity(args.commands.len());

    for (index, command) in args.commands.iter().enumerate() {
        // Output is printed by the callbacks below, not echoed to the log.
        let invocation = ShellInvocation::new(command.as_str())
            .working_dir(&args.cwd)
            .envs(args.env.iter().cloned())
            .quiet(true);

        let handle = shell
            .run(&invocation)
            .with_context(|| format!("launching command `{command}`"))?;

        if !args.quiet {
            attach_printers(&handle, labelled.then(|| format!("[{}] ", index + 1)));
        }
        handles.push(handle);
    }

    let mut ticker = tokio::time::interval(tick_interval);
    while !handles.iter().all(RequestHandle::is_completed) {
        ticker.tick().await;
        shell.drain_queue_tick();
    }

    let exit_code = summarize(&handles);
    info!(exit_code, "all commands finished");
    Ok(exit_code)
}

fn load_settings(args: &RunArgs) -> Result<ShellSettings> {
    let mut settings = match &args.config {
        Some(path) => load_and_validate(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => {
            let path = default_config_path();
            if path.is_file() {
                load_and_validate(&path)
                    .with_context(|| format!("loading settings from {}", path.display()))?
            } else {
                debug!("no settings file; using defaults");
                ShellSettings::default()
            }
        }
    };

    if args.throw_on_non_zero {
        settings.throw_on_non_zero_exit = true;
    }
    if let Some(ms) = args.tick_ms {
        settings.tick_interval = std::time::Duration::from_millis(ms.max(1));
    }
    Ok(settings)
}

fn attach_printers(handle: &RequestHandle, label: Option<String>) {
    let label = label.unwrap_or_default();
    let mut out = LinePrinter::new(std::io::stdout(), label.clone());
    let mut err = LinePrinter::new(std::io::stderr(), label);

    handle
        .on_info(move |line| out.print(line))
        .on_error(move |line| err.print(line));
}

/// First non-zero exit code in launch order, 1 for a policy failure, else 0.
fn summarize(handles: &[RequestHandle]) -> i32 {
    let mut exit_code = 0;
    for handle in handles {
        let Some(completion) = handle.completion() else {
            continue;
        };
        let code = match completion.result() {
            Ok(code) => code,
            Err(err) => {
                error!(request = %handle.id(), error = %err, "command failed");
                1
            }
        };
        if exit_code == 0 && code != 0 {
            exit_code = code;
        }
    }
    exit_code
}
