// src/core/worker.rs

use crate::{
    constants::MSG_COMMAND_NOT_PROVIDED,
    core::{
        command::{Command, Handler},
        commons::is_valid_identifier,
        flag_set::{FlagSet, FlagValue},
        phase::{FailureLog, Phase},
        task::Task,
    },
    models::{ExitStatus, PhaseName, PhaseStatus, TaskStatus},
    system::display_config::DisplayConfig,
};
use serde::de::DeserializeOwned;
use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fmt::Display,
    io,
    sync::{
        Arc,
        mpsc::{self, Receiver},
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant, SystemTime},
};
use thiserror::Error;
use uuid::Uuid;

/// Recoverable misuse of the task API, returned to the calling handler.
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("invalid task name '{0}'")]
    InvalidTaskName(String),
    #[error("task '{0}' was already started in this invocation")]
    DuplicateTask(String),
    #[error("no task named '{0}' was started")]
    UnknownTask(String),
    #[error("could not start task '{name}': {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("payload of task '{name}' is not valid JSON: {source}")]
    Payload {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// The execution context of one invocation, handed to every lifecycle handler.
#[derive(Debug)]
pub struct Worker {
    id: Uuid,
    started: Instant,
    started_at: SystemTime,
    current: PhaseName,
    phases: BTreeMap<PhaseName, Phase>,
    path: Vec<String>,
    flags: FlagSet,
    args: Vec<String>,
    display: DisplayConfig,
    task_names: HashSet<String>,
    handoffs: HashMap<String, Receiver<Vec<u8>>>,
    /// Tasks spawned since the current phase began.
    group: Vec<(String, JoinHandle<()>)>,
    /// Failures of the current phase.
    failures: Arc<FailureLog>,
}

impl Worker {
    /// A fresh worker with every phase pending.
    pub fn new(path: Vec<String>, flags: FlagSet, args: Vec<String>, display: DisplayConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            started: Instant::now(),
            started_at: SystemTime::now(),
            current: PhaseName::Before,
            phases: PhaseName::ALL.iter().map(|&p| (p, Phase::new(p))).collect(),
            path,
            flags,
            args,
            display,
            task_names: HashSet::new(),
            handoffs: HashMap::new(),
            group: Vec::new(),
            failures: Arc::new(FailureLog::default()),
        }
    }

    // --- Read access for handlers ---

    /// Identifies this invocation in logs.
    pub fn run_id(&self) -> Uuid {
        self.id
    }

    /// The resolved command names, root first.
    pub fn command_path(&self) -> &[String] {
        &self.path
    }

    /// Every flag on the resolved path, globals included.
    pub fn flags(&self) -> &FlagSet {
        &self.flags
    }

    /// Looks a flag up by name or alias.
    pub fn flag(&self, alias: &str) -> Option<&FlagValue> {
        self.flags.get(alias)
    }

    /// Positional arguments of the resolved command.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Positional argument `index`, if given.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// Presentation settings of the run.
    pub fn display(&self) -> &DisplayConfig {
        &self.display
    }

    /// Wall clock time the invocation started.
    pub fn started_at(&self) -> SystemTime {
        self.started_at
    }

    /// Time since the invocation started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// The phase currently running, or the last one that ran.
    pub fn current_phase(&self) -> PhaseName {
        self.current
    }

    /// State of phase `name`.
    pub fn phase(&self, name: PhaseName) -> Option<&Phase> {
        self.phases.get(&name)
    }

    /// All phases in lifecycle order.
    pub fn phases(&self) -> impl Iterator<Item = &Phase> {
        self.phases.values()
    }

    // --- Failures ---

    /// Fails the current phase. The phase keeps running; the first failure is the one reported.
    pub fn fail(&self, message: impl Display) {
        let message = message.to_string();
        log::debug!("phase {} failed: {}", self.current, message);
        self.failures.record(message);
    }

    /// Whether anything has failed the current phase so far.
    pub fn has_failed(&self) -> bool {
        self.failures.has_failures()
    }

    // --- Tasks ---

    /// Starts `body` on its own thread right away.
    ///
    /// Task names follow the command-name pattern and are unique for the whole
    /// invocation, since they key the payload handoff.
    pub fn task<F>(&mut self, name: &str, body: F) -> Result<(), WorkerError>
    where
        F: FnOnce(&mut Task) + Send + 'static,
    {
        if !is_valid_identifier(name) {
            return Err(WorkerError::InvalidTaskName(name.to_string()));
        }
        if self.task_names.contains(name) {
            return Err(WorkerError::DuplicateTask(name.to_string()));
        }

        let (sender, receiver) = mpsc::sync_channel::<Vec<u8>>(1);
        let failures = Arc::clone(&self.failures);
        let task_name = name.to_string();

        let handle = thread::Builder::new()
            .name(format!("task-{}", name))
            .spawn(move || {
                let mut task = Task::new(&task_name);
                body(&mut task);
                let outcome = task.finish();
                if outcome.status == TaskStatus::Failed {
                    let message = outcome
                        .message
                        .unwrap_or_else(|| format!("task {} failed", task_name));
                    log::warn!("task {} failed: {}", task_name, message);
                    failures.record(message);
                } else {
                    log::trace!("task {} finished", task_name);
                }
                // Nobody may ever ask for the payload; a closed receiver is fine.
                let _ = sender.send(outcome.payload);
            })
            .map_err(|source| WorkerError::Spawn {
                name: name.to_string(),
                source,
            })?;

        log::debug!("task {} started in phase {}", name, self.current);
        self.task_names.insert(name.to_string());
        self.handoffs.insert(name.to_string(), receiver);
        self.group.push((name.to_string(), handle));
        Ok(())
    }

    /// Blocks until every task spawned in the current phase has finished.
    /// Returns immediately when there are none.
    pub fn wait(&mut self) {
        let group = std::mem::take(&mut self.group);
        if !group.is_empty() {
            log::debug!("waiting for {} task(s) in phase {}", group.len(), self.current);
        }
        for (name, handle) in group {
            if handle.join().is_err() {
                log::warn!("task {} panicked", name);
                self.failures.record(format!("task {} panicked", name));
            }
        }
    }

    /// Blocks until task `name` has delivered its payload.
    ///
    /// The payload is delivered once: later calls for the same task get an empty payload.
    pub fn wait_task_payload_from(&mut self, name: &str) -> Result<Vec<u8>, WorkerError> {
        let receiver = self
            .handoffs
            .get(name)
            .ok_or_else(|| WorkerError::UnknownTask(name.to_string()))?;
        Ok(receiver.recv().unwrap_or_default())
    }

    /// Like [`Worker::wait_task_payload_from`], decoding the payload as JSON.
    pub fn wait_task_json_from<T: DeserializeOwned>(&mut self, name: &str) -> Result<T, WorkerError> {
        let payload = self.wait_task_payload_from(name)?;
        serde_json::from_slice(&payload).map_err(|source| WorkerError::Payload {
            name: name.to_string(),
            source,
        })
    }

    // --- Lifecycle ---

    /// Runs one phase: skipped without a handler, otherwise running → handler → join → terminal.
    pub(crate) fn run_phase(&mut self, name: PhaseName, handler: Option<&Handler>) -> PhaseStatus {
        self.current = name;
        self.failures = Arc::new(FailureLog::default());

        let Some(handler) = handler else {
            if let Some(phase) = self.phases.get_mut(&name) {
                phase.skip();
            }
            return PhaseStatus::Skipped;
        };

        if let Some(phase) = self.phases.get_mut(&name) {
            phase.start();
        }
        log::debug!("[{}] running phase {}", self.id, name);

        if let Err(e) = handler(self) {
            self.fail(format!("{:#}", e));
        }
        self.wait();

        let failures = self.failures.take();
        match self.phases.get_mut(&name) {
            Some(phase) => {
                phase.finish(failures);
                phase.status()
            }
            None => PhaseStatus::Failed,
        }
    }

    fn reject_phase(&mut self, name: PhaseName, message: &str) -> PhaseStatus {
        self.current = name;
        if let Some(phase) = self.phases.get_mut(&name) {
            phase.reject(message);
        }
        PhaseStatus::Failed
    }

    /// Runs the fixed lifecycle with the handlers of `command`, the deepest command of
    /// the resolved path: `before → do → after-failure | after-success → after-always`.
    ///
    /// Every phase of the sequence runs; a failed `before` or `do` picks the
    /// after-failure branch. The exit status is a failure if any phase failed.
    pub(crate) fn run_lifecycle(&mut self, command: &Command) -> ExitStatus {
        let before = self.run_phase(PhaseName::Before, command.handler(PhaseName::Before));

        let work = match command.handler(PhaseName::Do) {
            Some(handler) => self.run_phase(PhaseName::Do, Some(handler)),
            None => self.reject_phase(PhaseName::Do, MSG_COMMAND_NOT_PROVIDED),
        };

        let failed = before == PhaseStatus::Failed || work == PhaseStatus::Failed;
        let after = if failed {
            self.run_phase(PhaseName::AfterFailure, command.handler(PhaseName::AfterFailure))
        } else {
            self.run_phase(PhaseName::AfterSuccess, command.handler(PhaseName::AfterSuccess))
        };
        let always = self.run_phase(PhaseName::AfterAlways, command.handler(PhaseName::AfterAlways));

        if failed || after == PhaseStatus::Failed || always == PhaseStatus::Failed {
            ExitStatus::Failure
        } else {
            ExitStatus::Success
        }
    }

    /// The first failure of the lifecycle, if any.
    pub fn first_failure(&self) -> Option<(PhaseName, &str)> {
        self.phases
            .values()
            .find_map(|p| p.failure().map(|msg| (p.name(), msg)))
    }
}
