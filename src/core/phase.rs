// src/core/phase.rs

use crate::models::{PhaseName, PhaseStatus};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// One lifecycle stage of a dispatch and its outcome.
#[derive(Debug, Clone)]
pub struct Phase {
    name: PhaseName,
    status: PhaseStatus,
    started: Option<Instant>,
    finished: Option<Instant>,
    failures: Vec<String>,
}

impl Phase {
    /// A pending phase.
    pub fn new(name: PhaseName) -> Self {
        Self {
            name,
            status: PhaseStatus::Pending,
            started: None,
            finished: None,
            failures: Vec::new(),
        }
    }

    /// Which lifecycle stage this is.
    pub fn name(&self) -> PhaseName {
        self.name
    }

    /// Current status of the phase.
    pub fn status(&self) -> PhaseStatus {
        self.status
    }

    /// The first failure recorded while the phase ran.
    pub fn failure(&self) -> Option<&str> {
        self.failures.first().map(String::as_str)
    }

    /// Every failure recorded while the phase ran, in the order they happened.
    pub fn failures(&self) -> &[String] {
        &self.failures
    }

    /// Time spent running, `None` for phases that never started.
    pub fn elapsed(&self) -> Option<Duration> {
        match (self.started, self.finished) {
            (Some(start), Some(end)) => Some(end.duration_since(start)),
            (Some(start), None) => Some(start.elapsed()),
            _ => None,
        }
    }

    /// Applies a transition if it is allowed. Phases only move forward:
    /// `pending → running → success|failed`, or straight from `pending` to `skipped|failed`.
    fn transition(&mut self, to: PhaseStatus) -> bool {
        let allowed = match (self.status, to) {
            (PhaseStatus::Pending, PhaseStatus::Running)
            | (PhaseStatus::Pending, PhaseStatus::Skipped)
            | (PhaseStatus::Pending, PhaseStatus::Failed)
            | (PhaseStatus::Running, PhaseStatus::Success)
            | (PhaseStatus::Running, PhaseStatus::Failed) => true,
            _ => false,
        };
        if allowed {
            log::debug!("phase {}: {} -> {}", self.name, self.status, to);
            self.status = to;
        } else {
            log::warn!(
                "phase {}: ignoring transition {} -> {}",
                self.name,
                self.status,
                to
            );
        }
        allowed
    }

    pub(crate) fn start(&mut self) -> bool {
        let moved = self.transition(PhaseStatus::Running);
        if moved {
            self.started = Some(Instant::now());
        }
        moved
    }

    pub(crate) fn skip(&mut self) -> bool {
        self.transition(PhaseStatus::Skipped)
    }

    /// Fails a phase that never ran.
    pub(crate) fn reject(&mut self, message: &str) -> bool {
        let moved = self.transition(PhaseStatus::Failed);
        if moved {
            self.failures.push(message.to_string());
        }
        moved
    }

    /// Closes a running phase with whatever failures its handler and tasks recorded.
    pub(crate) fn finish(&mut self, failures: Vec<String>) -> bool {
        let to = if failures.is_empty() {
            PhaseStatus::Success
        } else {
            PhaseStatus::Failed
        };
        let moved = self.transition(to);
        if moved {
            self.finished = Some(Instant::now());
            self.failures = failures;
        }
        moved
    }
}

/// Failures reported during one phase, shared between the handler and its tasks.
///
/// Append-only; the first entry is the one the phase reports.
#[derive(Debug, Default)]
pub(crate) struct FailureLog {
    entries: Mutex<Vec<String>>,
}

impl FailureLog {
    pub(crate) fn record(&self, message: String) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message);
    }

    pub(crate) fn has_failures(&self) -> bool {
        !self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    pub(crate) fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.entries.lock().unwrap_or_else(PoisonError::into_inner))
    }
}
