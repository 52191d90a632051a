// src/core/errors.rs

use crate::core::flag::FlagError;
use thiserror::Error;

/// Problems found while declaring the command tree. These are collected, never raised
/// one at a time, so a single run reports every conflict.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("application name must not be empty")]
    MissingAppName,
    #[error("application has no commands")]
    NoCommands,
    #[error("application has no flags")]
    NoFlags,
    #[error("invalid command name '{0}'")]
    InvalidCommandName(String),
    #[error("command '{name}' is already registered under '{parent}'")]
    DuplicateCommand { name: String, parent: String },
    #[error("invalid flag in {scope}: {source}")]
    InvalidFlag {
        scope: String,
        #[source]
        source: FlagError,
    },
    #[error("flag '{flag}' shadows flag '{existing}' with alias '{alias}' in {scope}")]
    Shadowed {
        flag: String,
        existing: String,
        alias: String,
        scope: String,
    },
    #[error("command '{0}' has no do handler and no subcommands")]
    MissingHandler(String),
}

/// The first error met while resolving argv against the command tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("configuration must be verified before resolving arguments")]
    Unverified,
    #[error("unknown global flag '{0}'")]
    UnknownGlobalFlag(String),
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("unknown subcommand '{name}' for command {command}")]
    UnknownSubcommand { name: String, command: String },
    #[error("unknown flag '{flag}' for command {command}")]
    UnknownFlag { flag: String, command: String },
    #[error("flag '{0}' was already parsed")]
    AlreadyParsed(String),
    #[error("too many arguments for command {command} which accepts max ({max}) args")]
    TooManyArguments { command: String, max: usize },
    #[error(transparent)]
    Flag(#[from] FlagError),
}
