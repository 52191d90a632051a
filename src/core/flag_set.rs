// src/core/flag_set.rs

use crate::core::flag::{Flag, FlagMatch, parse_bool};
use std::collections::HashMap;

/// A declared flag together with what resolution found for it.
#[derive(Debug, Clone)]
pub struct FlagValue {
    flag: Flag,
    matched: Option<FlagMatch>,
}

impl FlagValue {
    /// Pairs a declaration with its match, if any.
    pub fn new(flag: Flag, matched: Option<FlagMatch>) -> Self {
        Self { flag, matched }
    }

    /// The declaration behind this value.
    pub fn flag(&self) -> &Flag {
        &self.flag
    }

    /// Primary name of the flag.
    pub fn name(&self) -> &str {
        self.flag.name()
    }

    /// Whether the flag appeared on the command line.
    pub fn present(&self) -> bool {
        self.matched.is_some()
    }

    /// Argv position of the match, counted in non-flag tokens.
    pub fn position(&self) -> Option<usize> {
        self.matched.as_ref().map(|m| m.position)
    }

    /// The raw string value: the parsed value when present, the declared default otherwise.
    pub fn value(&self) -> &str {
        self.matched
            .as_ref()
            .map_or(self.flag.default_value(), |m| m.value.as_str())
    }

    /// `false` unless the value parses as a true boolean.
    pub fn as_bool(&self) -> bool {
        parse_bool(self.value()).unwrap_or(false)
    }

    /// `None` when the value is not an integer.
    pub fn as_i64(&self) -> Option<i64> {
        self.value().parse().ok()
    }

    /// `None` when the value is not a number.
    pub fn as_f64(&self) -> Option<f64> {
        self.value().parse().ok()
    }
}

/// The flattened view of every flag on a resolution path: globals first, then each
/// command from root to leaf. Lookup works with any alias.
#[derive(Debug, Clone, Default)]
pub struct FlagSet {
    values: Vec<FlagValue>,
    by_alias: HashMap<String, usize>,
}

impl FlagSet {
    /// Appends a value, indexing it under every alias of its flag.
    pub fn push(&mut self, value: FlagValue) {
        let slot = self.values.len();
        for alias in value.flag().aliases() {
            // Shadowing was rejected during verification; the first declaration wins.
            self.by_alias.entry(alias.clone()).or_insert(slot);
        }
        self.values.push(value);
    }

    /// Looks a flag up by name or any alias.
    pub fn get(&self, alias: &str) -> Option<&FlagValue> {
        self.by_alias.get(alias).and_then(|&slot| self.values.get(slot))
    }

    /// True when the flag exists and was given on the command line.
    pub fn present(&self, alias: &str) -> bool {
        self.get(alias).is_some_and(FlagValue::present)
    }

    /// The flag's value, or an empty string for unknown flags.
    pub fn value(&self, alias: &str) -> &str {
        self.get(alias).map_or("", FlagValue::value)
    }

    /// The flag read as a boolean; `false` for unknown flags.
    pub fn bool(&self, alias: &str) -> bool {
        self.get(alias).is_some_and(FlagValue::as_bool)
    }

    /// Values in scope order: globals first, then root to leaf.
    pub fn iter(&self) -> impl Iterator<Item = &FlagValue> {
        self.values.iter()
    }

    /// Number of flags in scope.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no flag is in scope.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
