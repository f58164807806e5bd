// src/engine/shell.rs

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::ShellSettings;
use crate::engine::pump::{DrainPump, DrainReport};
use crate::engine::queue::EventQueue;
use crate::engine::request::RequestHandle;
use crate::errors::Result;
use crate::exec::environment;
use crate::exec::launcher::{ProcessLauncher, ShellInvocation};
use crate::exec::process::ProcessTracker;
use crate::types::RequestId;

/// Entry point tying the launcher, the event queue and the drain pump together.
///
/// - `run_command` / `run` may be called from any thread and return at once.
/// - `drain_queue_tick` must always be called from the same thread (the
///   consumer thread); that is where every callback of every request runs.
#[derive(Debug)]
pub struct Shell {
    settings: ShellSettings,
    launcher: ProcessLauncher,
    pump: DrainPump,
    next_id: AtomicU64,
}

impl Default for Shell {
    fn default() -> Self {
        Self::new(ShellSettings::default())
    }
}

impl Shell {
    pub fn new(settings: ShellSettings) -> Self {
        let queue = Arc::new(EventQueue::new());
        Self {
            settings,
            launcher: ProcessLauncher::new(Arc::clone(&queue), ProcessTracker::new()),
            pump: DrainPump::new(queue),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn settings(&self) -> &ShellSettings {
        &self.settings
    }

    /// Adjust settings between invocations. Requests already launched keep
    /// the settings they started with.
    pub fn settings_mut(&mut self) -> &mut ShellSettings {
        &mut self.settings
    }

    pub fn set_settings(&mut self, settings: ShellSettings) {
        self.settings = settings;
    }

    /// Run `command` through the platform shell in `working_dir`, with
    /// optional environment overrides.
    pub fn run_command(
        &self,
        command: &str,
        working_dir: impl AsRef<Path>,
        environment: Option<&BTreeMap<String, String>>,
    ) -> Result<RequestHandle> {
        let mut invocation = ShellInvocation::new(command).working_dir(working_dir.as_ref());
        if let Some(environment) = environment {
            invocation.environment = environment.clone();
        }
        self.run(&invocation)
    }

    pub fn run(&self, invocation: &ShellInvocation) -> Result<RequestHandle> {
        let id = RequestId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.launcher.launch(id, invocation, &self.settings)
    }

    /// One tick of the drain pump. A no-op when nothing is queued.
    pub fn drain_queue_tick(&self) {
        self.pump.tick();
    }

    /// Same as [`Shell::drain_queue_tick`], returning what was dispatched.
    pub fn drain(&self) -> DrainReport {
        self.pump.tick()
    }

    pub fn queue(&self) -> &Arc<EventQueue> {
        self.pump.queue()
    }

    /// Child processes whose handles have not been released yet.
    pub fn live_processes(&self) -> usize {
        self.launcher.tracker().live()
    }

    /// Whether a file named `name` exists in a directory of `PATH`.
    pub fn command_exists(name: &str) -> bool {
        environment::command_exists(name)
    }
}
