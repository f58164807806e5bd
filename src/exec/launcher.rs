// src/exec/launcher.rs

//! Process launcher: builds the platform shell invocation, starts the child
//! with redirected streams and hands it to a stream reader worker.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::ShellSettings;
use crate::engine::{EventQueue, RequestHandle};
use crate::errors::{Result, ShellError};
use crate::exec::environment::{process_environment, resolve_overrides};
use crate::exec::process::{OsProcess, ProcessTracker};
use crate::exec::worker::spawn_worker;
use crate::types::RequestId;

/// One command invocation. Immutable once launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellInvocation {
    pub command: String,
    /// Defaults to `.`.
    pub working_dir: PathBuf,
    /// Overrides applied after the shell's default environment.
    pub environment: BTreeMap<String, String>,
    /// Don't echo this request's output lines to the log.
    pub quiet: bool,
}

impl ShellInvocation {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            working_dir: PathBuf::from("."),
            environment: BTreeMap::new(),
            quiet: false,
        }
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    pub fn env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(name.into(), value.into());
        self
    }

    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.environment
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }
}

/// Build a command that runs `command` through the platform shell as a
/// single line, passed through unmodified.
pub fn shell_command(command: &str) -> Command {
    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;

        const CREATE_NO_WINDOW: u32 = 0x0800_0000;

        // cmd.exe does its own parsing, so the line goes in verbatim.
        let mut c = Command::new("cmd.exe");
        c.arg("/C")
            .raw_arg(format!("\"{command}\""))
            .creation_flags(CREATE_NO_WINDOW);
        c
    }
    #[cfg(not(windows))]
    {
        let mut c = Command::new("sh");
        c.arg("-c").arg(command);
        c
    }
}

/// Starts child processes and wires each one to its worker thread.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    queue: Arc<EventQueue>,
    tracker: ProcessTracker,
}

impl ProcessLauncher {
    pub fn new(queue: Arc<EventQueue>, tracker: ProcessTracker) -> Self {
        Self { queue, tracker }
    }

    pub fn tracker(&self) -> &ProcessTracker {
        &self.tracker
    }

    /// Start `invocation` and return its request handle without waiting for
    /// the process to finish.
    ///
    /// Every failure here is synchronous; once this returns `Ok`, all further
    /// outcomes arrive through the event queue.
    pub fn launch(
        &self,
        id: RequestId,
        invocation: &ShellInvocation,
        settings: &ShellSettings,
    ) -> Result<RequestHandle> {
        ensure_directory(&invocation.working_dir)?;

        // The child inherits the parent environment; only touched variables
        // are set on top of it.
        let overrides = resolve_overrides(
            &process_environment(),
            [&settings.default_environment, &invocation.environment],
        )?;

        let mut cmd = shell_command(&invocation.command);
        cmd.current_dir(&invocation.working_dir)
            .envs(&overrides)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|source| ShellError::Launch {
            command: invocation.command.clone(),
            source,
        })?;

        // Simple redirection only: close stdin so readers see EOF.
        drop(child.stdin.take());

        let process = OsProcess::new(child, self.tracker.track());
        info!(
            request = %id,
            cmd = %invocation.command,
            cwd = %invocation.working_dir.display(),
            pid = process.id(),
            "started command"
        );

        let request = RequestHandle::new(
            id,
            invocation.command.clone(),
            invocation.quiet,
            settings.throw_on_non_zero_exit,
        );

        spawn_worker(request.clone(), process, Arc::clone(&self.queue)).map_err(|source| {
            ShellError::Launch {
                command: invocation.command.clone(),
                source,
            }
        })?;
        debug!(request = %id, "stream reader worker spawned");

        Ok(request)
    }
}

fn ensure_directory(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(ShellError::InvalidWorkingDirectory(dir.to_path_buf()))
    }
}
