// src/core/resolver.rs

//! Argument resolution.
//!
//! Argv is consumed in a fixed order: global flags, the command name chain with each
//! command's local flags, then positional arguments up to the leaf's arity. The declared
//! tree is only read; everything resolution learns lands in a [`Resolution`].

use crate::{
    constants::FLAG_PREFIX,
    core::{
        command::Command,
        errors::ResolveError,
        flag::FlagMatch,
        flag_registry::FlagRegistry,
    },
};
use std::collections::{HashMap, HashSet};

/// Flag matches collected along one resolution, keyed by primary flag name.
///
/// Names are unique along a verified path because shadowing is rejected at registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFlags {
    matches: HashMap<String, FlagMatch>,
    preparsed: HashSet<String>,
}

impl ParsedFlags {
    /// Records a match made before resolution (the logging flags). Resolution treats
    /// such a flag as already satisfied instead of parsing it again.
    pub fn record_preparsed(&mut self, matched: FlagMatch) {
        self.preparsed.insert(matched.name.clone());
        self.matches.insert(matched.name.clone(), matched);
    }

    /// Records a match. A flag can only be matched once per resolution.
    pub fn record(&mut self, matched: FlagMatch) -> Result<(), ResolveError> {
        if self.matches.contains_key(&matched.name) {
            return Err(ResolveError::AlreadyParsed(matched.name));
        }
        self.matches.insert(matched.name.clone(), matched);
        Ok(())
    }

    /// Whether `name` was matched before resolution started.
    pub fn is_preparsed(&self, name: &str) -> bool {
        self.preparsed.contains(name)
    }

    /// The match of flag `name`, by primary name.
    pub fn get(&self, name: &str) -> Option<&FlagMatch> {
        self.matches.get(name)
    }

    /// Number of matched flags.
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Whether no flag matched.
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// The outcome of resolving argv: the chosen command path, the leaf's positional
/// arguments and every flag match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    path: Vec<String>,
    args: Vec<String>,
    flags: ParsedFlags,
}

impl Resolution {
    /// Command names from the top-level command down to the leaf.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Positional arguments left for the leaf command.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Every flag match of the resolution.
    pub fn flags(&self) -> &ParsedFlags {
        &self.flags
    }

    /// True when argv named no command at all.
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// The commands of the path, root first, looked up in `commands`.
    pub fn chain<'a>(&self, commands: &'a [Command]) -> Vec<&'a Command> {
        let mut chain = Vec::with_capacity(self.path.len());
        let mut level = commands;
        for name in &self.path {
            let Some(command) = level.iter().find(|c| c.name() == name.as_str()) else {
                break;
            };
            chain.push(command);
            level = command.children();
        }
        chain
    }
}

/// Resolves `args` (argv without the binary name) against the declared tree.
///
/// `parsed` may already hold pre-parsed flags. The first error ends resolution.
pub fn resolve(
    global: &FlagRegistry,
    commands: &[Command],
    mut args: Vec<String>,
    mut parsed: ParsedFlags,
) -> Result<Resolution, ResolveError> {
    log::debug!("resolving args: {:?}", args);

    parse_flags(global, &mut args, &mut parsed)?;

    if let Some(first) = args.first()
        && first.starts_with(FLAG_PREFIX)
    {
        return Err(ResolveError::UnknownGlobalFlag(first.clone()));
    }

    let mut path = Vec::new();
    let positional = if args.is_empty() {
        Vec::new()
    } else {
        let name = args.remove(0);
        let command = commands
            .iter()
            .find(|c| c.name() == name)
            .ok_or(ResolveError::UnknownCommand(name))?;
        parse_command(command, args, &mut path, &mut parsed)?
    };

    log::debug!("resolved path {:?} with args {:?}", path, positional);
    Ok(Resolution {
        path,
        args: positional,
        flags: parsed,
    })
}

/// The longest chain of declared command names found among the non-flag words of
/// `args`. Used to pick a help screen when resolution itself failed.
pub fn command_chain<'a>(commands: &'a [Command], args: &[String]) -> Vec<&'a Command> {
    let mut chain = Vec::new();
    let mut level = commands;
    for word in args.iter().filter(|a| !a.starts_with(FLAG_PREFIX)) {
        let Some(command) = level.iter().find(|c| c.name() == word.as_str()) else {
            break;
        };
        chain.push(command);
        level = command.children();
    }
    chain
}

fn parse_flags(
    registry: &FlagRegistry,
    args: &mut Vec<String>,
    parsed: &mut ParsedFlags,
) -> Result<(), ResolveError> {
    for flag in registry.iter() {
        if parsed.is_preparsed(flag.name()) {
            continue;
        }
        if let Some(matched) = flag.parse(args)? {
            parsed.record(matched)?;
        }
    }
    Ok(())
}

/// Consumes `command`'s local flags, then either descends into a named child or
/// treats what is left as the command's positional arguments.
fn parse_command(
    command: &Command,
    mut args: Vec<String>,
    path: &mut Vec<String>,
    parsed: &mut ParsedFlags,
) -> Result<Vec<String>, ResolveError> {
    path.push(command.name().to_string());
    parse_flags(command.flags(), &mut args, parsed)?;

    let next_word = args.iter().position(|a| !a.starts_with(FLAG_PREFIX));
    if let Some(index) = next_word
        && let Some(child) = args.get(index).and_then(|name| command.child(name))
    {
        args.remove(index);
        return parse_command(child, args, path, parsed);
    }

    if let Some(unknown) = args.iter().find(|a| a.starts_with(FLAG_PREFIX)) {
        return Err(ResolveError::UnknownFlag {
            flag: unknown.clone(),
            command: command.name().to_string(),
        });
    }

    if args.len() > command.max_args() {
        if command.max_args() == 0
            && command.has_children()
            && let Some(first) = args.first()
        {
            return Err(ResolveError::UnknownSubcommand {
                name: first.clone(),
                command: command.name().to_string(),
            });
        }
        return Err(ResolveError::TooManyArguments {
            command: command.name().to_string(),
            max: command.max_args(),
        });
    }

    Ok(args)
}
