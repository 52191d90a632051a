// src/core/task.rs

use crate::models::TaskStatus;
use serde::Serialize;
use std::fmt::Display;

/// The handle a task body works with. Created by [`Worker::task`](crate::core::worker::Worker::task)
/// and consumed once the body returns.
#[derive(Debug)]
pub struct Task {
    name: String,
    payload: Vec<u8>,
    status: TaskStatus,
    allow_failure: bool,
    message: Option<String>,
}

/// What is left of a task after its body returned.
#[derive(Debug)]
pub(crate) struct TaskOutcome {
    pub(crate) status: TaskStatus,
    pub(crate) message: Option<String>,
    pub(crate) payload: Vec<u8>,
}

impl Task {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            payload: Vec::new(),
            status: TaskStatus::Running,
            allow_failure: false,
            message: None,
        }
    }

    /// The name the task was started under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current status; `Running` until the body returns.
    pub fn status(&self) -> TaskStatus {
        self.status
    }

    /// Failures reported after this call are logged but do not fail the phase.
    pub fn allow_failure(&mut self) {
        self.allow_failure = true;
    }

    /// Marks the task failed with `message`, unless failure was allowed.
    pub fn fail(&mut self, message: impl Display) {
        let message = message.to_string();
        if self.allow_failure {
            log::info!("task {} failed (allowed): {}", self.name, message);
        } else {
            self.status = TaskStatus::Failed;
        }
        self.message = Some(message);
    }

    /// Stores the result handed to [`Worker::wait_task_payload_from`](crate::core::worker::Worker::wait_task_payload_from).
    pub fn set_payload(&mut self, payload: impl Into<Vec<u8>>) {
        self.payload = payload.into();
    }

    /// Stores `value` encoded as JSON, for [`Worker::wait_task_json_from`](crate::core::worker::Worker::wait_task_json_from).
    pub fn set_json_payload<T: Serialize>(&mut self, value: &T) -> serde_json::Result<()> {
        self.payload = serde_json::to_vec(value)?;
        Ok(())
    }

    /// The payload stored so far.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub(crate) fn finish(self) -> TaskOutcome {
        let status = match self.status {
            TaskStatus::Running => TaskStatus::Success,
            other => other,
        };
        let message = match status {
            TaskStatus::Failed => Some(
                self.message
                    .unwrap_or_else(|| format!("task {} failed", self.name)),
            ),
            _ => self.message,
        };
        TaskOutcome {
            status,
            message,
            payload: self.payload,
        }
    }
}
