// src/core/flag_registry.rs

use crate::core::{errors::RegistrationError, flag::Flag};
use std::collections::HashMap;

/// Index of a flag inside its registry, assigned in registration order.
pub type FlagId = usize;

/// An ordered collection of flags owned by the application (global) or by one command.
///
/// Errors found while adding flags are collected in the registry and surfaced together
/// by the application's verification step.
#[derive(Debug, Clone, Default)]
pub struct FlagRegistry {
    scope: String,
    global: bool,
    flags: Vec<Flag>,
    index: HashMap<String, FlagId>,
    errors: Vec<RegistrationError>,
}

impl FlagRegistry {
    /// The registry of global flags. Every flag added here is declared global.
    pub fn global() -> Self {
        Self {
            scope: "global flags".to_string(),
            global: true,
            ..Default::default()
        }
    }

    /// The registry of local flags of command `command`.
    pub fn for_command(command: &str) -> Self {
        Self {
            scope: format!("command {}", command),
            ..Default::default()
        }
    }

    /// Human readable owner of the registry, used in error messages.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Verifies and inserts `flag`. Returns its id, or `None` if it was rejected;
    /// the reason is kept in [`FlagRegistry::errors`].
    pub fn add(&mut self, flag: Flag) -> Option<FlagId> {
        if let Err(source) = flag.verify() {
            log::debug!("rejecting flag in {}: {}", self.scope, source);
            self.errors.push(RegistrationError::InvalidFlag {
                scope: self.scope.clone(),
                source,
            });
            return None;
        }

        let id = self.flags.len();
        let mut clash = false;
        for alias in flag.aliases() {
            if let Some(existing) = self.index.get(alias).and_then(|&other| self.flags.get(other)) {
                self.errors.push(RegistrationError::Shadowed {
                    flag: flag.name().to_string(),
                    existing: existing.name().to_string(),
                    alias: alias.clone(),
                    scope: self.scope.clone(),
                });
                clash = true;
            }
        }
        if clash {
            return None;
        }

        for alias in flag.aliases() {
            self.index.insert(alias.clone(), id);
        }
        log::trace!("registered flag '{}' as #{} in {}", flag.name(), id, self.scope);
        self.flags.push(flag.with_global(self.global));
        Some(id)
    }

    /// The flag registered under `id`.
    pub fn get(&self, id: FlagId) -> Option<&Flag> {
        self.flags.get(id)
    }

    /// Looks a flag up by its name or any alias.
    pub fn find(&self, alias: &str) -> Option<&Flag> {
        self.index.get(alias).and_then(|&id| self.flags.get(id))
    }

    /// Flags in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Flag> {
        self.flags.iter()
    }

    /// Number of accepted flags.
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Whether no flag was accepted.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Problems found while adding flags.
    pub fn errors(&self) -> &[RegistrationError] {
        &self.errors
    }

    /// Checks every alias of this registry against the aliases already reserved by the
    /// global flags and all ancestor commands.
    pub fn verify_against(&self, reserved: &ReservedAliases) -> Vec<RegistrationError> {
        let mut errors = Vec::new();
        for flag in &self.flags {
            for alias in flag.aliases() {
                if let Some(owner) = reserved.owner(alias) {
                    errors.push(RegistrationError::Shadowed {
                        flag: flag.name().to_string(),
                        existing: owner.flag.clone(),
                        alias: alias.clone(),
                        scope: format!("{} (declared in {})", self.scope, owner.scope),
                    });
                }
            }
        }
        errors
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AliasOwner {
    flag: String,
    scope: String,
}

/// Aliases claimed along one resolution path, passed down the command tree.
///
/// Each branch of the tree works on its own copy, so sibling commands may reuse aliases.
#[derive(Debug, Clone, Default)]
pub struct ReservedAliases {
    owners: HashMap<String, AliasOwner>,
}

impl ReservedAliases {
    /// Claims every alias of `registry`. Existing claims are kept.
    pub fn reserve(&mut self, registry: &FlagRegistry) {
        for flag in registry.iter() {
            for alias in flag.aliases() {
                self.owners
                    .entry(alias.clone())
                    .or_insert_with(|| AliasOwner {
                        flag: flag.name().to_string(),
                        scope: registry.scope().to_string(),
                    });
            }
        }
    }

    fn owner(&self, alias: &str) -> Option<&AliasOwner> {
        self.owners.get(alias)
    }

    /// Whether `alias` is already claimed on this path.
    pub fn contains(&self, alias: &str) -> bool {
        self.owners.contains_key(alias)
    }
}
