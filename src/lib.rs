//! # phaserun
//!
//! A runtime for command-line applications. An application declares a tree of commands
//! and flags; each invocation resolves argv against that tree and runs the resolved
//! command through a fixed lifecycle:
//!
//! `before → do → after-failure | after-success → after-always`
//!
//! Handlers may fan out concurrent tasks, fail the current phase, and collect task
//! payloads through single-delivery handoff queues.
//!
//! ```no_run
//! use phaserun::{Application, Command};
//!
//! let mut app = Application::new("hello").version("0.1.0");
//! app.add_command(Command::new("greet").arity(1).run(|w| {
//!     println!("Hello, {}!", w.arg(0).unwrap_or("world"));
//!     Ok(())
//! }));
//! std::process::exit(app.run_from_env().code());
//! ```

pub mod constants;
pub mod core;
pub mod models;
pub mod system;

pub use crate::core::{
    application::{AppState, Application},
    command::{Command, Handler},
    errors::{RegistrationError, ResolveError},
    flag::{Flag, FlagError},
    resolver::Resolution,
    task::Task,
    worker::{Worker, WorkerError},
};
pub use crate::models::{ExitStatus, PhaseName, PhaseStatus};
