// src/core/command.rs

use crate::{
    core::{
        commons::is_valid_identifier,
        errors::RegistrationError,
        flag::Flag,
        flag_registry::{FlagRegistry, ReservedAliases},
        worker::Worker,
    },
    models::PhaseName,
};
use anyhow::Result;
use std::{collections::HashMap, fmt};

/// A lifecycle handler. Returning an error is the same as calling [`Worker::fail`].
pub type Handler = Box<dyn Fn(&mut Worker) -> Result<()> + Send + Sync>;

/// A node of the declared command tree.
///
/// Commands are built once at startup and never change afterwards; resolution
/// records the chosen path separately.
pub struct Command {
    name: String,
    hidden: bool,
    category: String,
    usage: String,
    short: String,
    long: String,
    arity: usize,
    handlers: HashMap<PhaseName, Handler>,
    children: Vec<Command>,
    flags: FlagRegistry,
    errors: Vec<RegistrationError>,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut phases: Vec<_> = self.handlers.keys().map(|p| p.as_str()).collect();
        phases.sort_unstable();
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("handlers", &phases)
            .field("children", &self.children)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

impl Command {
    /// A command named `name` with no handlers, flags or children.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            hidden: false,
            category: String::new(),
            usage: String::new(),
            short: String::new(),
            long: String::new(),
            arity: 0,
            handlers: HashMap::new(),
            children: Vec::new(),
            flags: FlagRegistry::for_command(name),
            errors: Vec::new(),
        }
    }

    // --- Builder ---

    /// Leaves the command out of help listings and completion candidates.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Group heading used by the help listing.
    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    /// Argument synopsis, e.g. `<name>`.
    pub fn usage(mut self, usage: &str) -> Self {
        self.usage = usage.to_string();
        self
    }

    /// One-line description.
    pub fn short(mut self, short: &str) -> Self {
        self.short = short.to_string();
        self
    }

    /// Multi-line description, preferred over the short one on the command's own help screen.
    pub fn long(mut self, long: &str) -> Self {
        self.long = long.to_string();
        self
    }

    /// Maximum number of positional arguments. Zero means none.
    pub fn arity(mut self, arity: usize) -> Self {
        self.arity = arity;
        self
    }

    /// Adds a local flag. Invalid or clashing flags are recorded for verification.
    pub fn flag(mut self, flag: Flag) -> Self {
        self.flags.add(flag);
        self
    }

    /// Adds a child command. A second child with the same name is recorded as an error.
    pub fn subcommand(mut self, child: Self) -> Self {
        if self.child(&child.name).is_some() {
            self.errors.push(RegistrationError::DuplicateCommand {
                name: child.name.clone(),
                parent: self.name.clone(),
            });
        } else {
            self.children.push(child);
        }
        self
    }

    /// Registers the handler of `phase`, replacing any earlier one.
    pub fn on<F>(mut self, phase: PhaseName, handler: F) -> Self
    where
        F: Fn(&mut Worker) -> Result<()> + Send + Sync + 'static,
    {
        self.handlers.insert(phase, Box::new(handler));
        self
    }

    /// Registers the `before` handler.
    pub fn before<F>(self, handler: F) -> Self
    where
        F: Fn(&mut Worker) -> Result<()> + Send + Sync + 'static,
    {
        self.on(PhaseName::Before, handler)
    }

    /// Registers the `do` handler, the command's main work.
    pub fn run<F>(self, handler: F) -> Self
    where
        F: Fn(&mut Worker) -> Result<()> + Send + Sync + 'static,
    {
        self.on(PhaseName::Do, handler)
    }

    /// Registers the handler run when `before` or `do` failed.
    pub fn after_failure<F>(self, handler: F) -> Self
    where
        F: Fn(&mut Worker) -> Result<()> + Send + Sync + 'static,
    {
        self.on(PhaseName::AfterFailure, handler)
    }

    /// Registers the handler run when `before` and `do` succeeded.
    pub fn after_success<F>(self, handler: F) -> Self
    where
        F: Fn(&mut Worker) -> Result<()> + Send + Sync + 'static,
    {
        self.on(PhaseName::AfterSuccess, handler)
    }

    /// Registers the handler that closes every lifecycle.
    pub fn after_always<F>(self, handler: F) -> Self
    where
        F: Fn(&mut Worker) -> Result<()> + Send + Sync + 'static,
    {
        self.on(PhaseName::AfterAlways, handler)
    }

    // --- Accessors ---

    /// The command name as typed on the command line.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the command is left out of help and completion.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Help group heading, empty for the default group.
    pub fn category_name(&self) -> &str {
        &self.category
    }

    /// Argument synopsis shown in the usage line.
    pub fn usage_text(&self) -> &str {
        &self.usage
    }

    /// One-line description.
    pub fn short_text(&self) -> &str {
        &self.short
    }

    /// Long description, empty when not set.
    pub fn long_text(&self) -> &str {
        &self.long
    }

    /// Maximum number of positional arguments.
    pub fn max_args(&self) -> usize {
        self.arity
    }

    /// The command's local flags.
    pub fn flags(&self) -> &FlagRegistry {
        &self.flags
    }

    /// Child commands, in registration order.
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// Looks a direct child up by name.
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Whether the command groups subcommands.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// The handler registered for `phase`, if any.
    pub fn handler(&self, phase: PhaseName) -> Option<&Handler> {
        self.handlers.get(&phase)
    }

    // --- Verification ---

    /// Verifies this command and its whole subtree, appending every problem to `errors`.
    ///
    /// `reserved` holds the aliases of the global flags and every ancestor; this
    /// command's own aliases are added to a copy before descending.
    pub fn verify(&self, reserved: &ReservedAliases, errors: &mut Vec<RegistrationError>) {
        if !is_valid_identifier(&self.name) {
            errors.push(RegistrationError::InvalidCommandName(self.name.clone()));
        }
        errors.extend(self.errors.iter().cloned());
        errors.extend(self.flags.errors().iter().cloned());
        errors.extend(self.flags.verify_against(reserved));

        if self.handler(PhaseName::Do).is_none() && self.children.is_empty() {
            errors.push(RegistrationError::MissingHandler(self.name.clone()));
        }

        let mut branch = reserved.clone();
        branch.reserve(&self.flags);
        for child in &self.children {
            child.verify(&branch, errors);
        }
    }
}
