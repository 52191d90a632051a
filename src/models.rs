// src/models.rs

use serde::Serialize;
use std::fmt;

// --- LIFECYCLE MODELS ---

/// The five fixed lifecycle stages of a single dispatch, in execution order.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum PhaseName {
    Before,
    Do,
    AfterFailure,
    AfterSuccess,
    AfterAlways,
}

impl PhaseName {
    /// All phases in declaration order. The sequencer never runs both after-failure and after-success.
    pub const ALL: [Self; 5] = [
        Self::Before,
        Self::Do,
        Self::AfterFailure,
        Self::AfterSuccess,
        Self::AfterAlways,
    ];

    /// Kebab-case name, as shown in logs and summaries.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::Do => "do",
            Self::AfterFailure => "after-failure",
            Self::AfterSuccess => "after-success",
            Self::AfterAlways => "after-always",
        }
    }

}

impl fmt::Display for PhaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a phase is in its state machine.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PhaseStatus {
    #[default]
    Pending,
    Running,
    Success,
    Skipped,
    Failed,
}

impl fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Success => "success",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Outcome of a task body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskStatus {
    #[default]
    Running,
    Success,
    Failed,
}

// --- FLAG MODELS ---

/// The value type of a flag. Values are always stored as strings and parsed on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagKind {
    Bool,
    String,
    Numeric,
    /// A string restricted to a fixed set of allowed values.
    Enum(Vec<String>),
}

impl FlagKind {
    /// The value a flag takes when it appears on the command line without an explicit value.
    pub fn implicit_value(&self) -> &str {
        match self {
            Self::Bool => "true",
            Self::Numeric => "0",
            Self::String | Self::Enum(_) => "",
        }
    }

    /// Name of the kind as shown in help.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::String => "string",
            Self::Numeric => "number",
            Self::Enum(_) => "enum",
        }
    }
}

// --- APPLICATION MODELS ---

/// Descriptive information about the embedding application, handed to the presenter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: String,
}

/// The process exit status of a run. Exactly one of these is produced per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Every phase that ran succeeded (or help/completion was served).
    Success,
    /// A handler or task reported a failure.
    Failure,
    /// Registration, configuration or resolution error, or no command supplied.
    ConfigError,
}

impl ExitStatus {
    /// The process exit code: 0, 1 or 2.
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
            Self::ConfigError => 2,
        }
    }
}
