// src/core/flag.rs

use crate::{
    constants::{FLAG_PREFIX, FLAG_VALUE_SEPARATOR},
    core::commons::{dashed, is_valid_flag_alias},
    models::FlagKind,
};
use thiserror::Error;

/// Problems with a flag declaration or with a value given for it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlagError {
    #[error("flag name must not be empty")]
    EmptyName,
    #[error("flag '{flag}' has an invalid alias '{alias}'")]
    InvalidAlias { flag: String, alias: String },
    #[error("flag '{flag}' has default '{value}' outside of its allowed values")]
    InvalidDefault { flag: String, value: String },
    #[error("invalid value '{value}' for flag '{flag}', expected {expected}")]
    InvalidValue {
        flag: String,
        value: String,
        expected: String,
    },
}

/// A declared command-line switch.
///
/// The declaration is immutable once built: parsing returns a [`FlagMatch`] instead of
/// writing into the flag, so the same tree can be resolved any number of times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flag {
    name: String,
    /// Ordered, de-duplicated, always starts with `name`.
    aliases: Vec<String>,
    kind: FlagKind,
    default: String,
    usage: String,
    hidden: bool,
    global: bool,
}

/// The result of a successful [`Flag::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagMatch {
    /// Primary name of the matched flag.
    pub name: String,
    /// Raw value, already defaulted for its kind.
    pub value: String,
    /// Number of non-flag tokens seen before the match.
    pub position: usize,
    /// Copied from the declaration.
    pub global: bool,
}

impl Flag {
    fn new(name: &str, kind: FlagKind, default: String, usage: &str) -> Self {
        Self {
            name: name.to_string(),
            aliases: vec![name.to_string()],
            kind,
            default,
            usage: usage.to_string(),
            hidden: false,
            global: false,
        }
    }

    /// A switch that is `false` unless present. `--name` alone means `true`.
    pub fn bool(name: &str, usage: &str) -> Self {
        Self::new(name, FlagKind::Bool, "false".to_string(), usage)
    }

    /// A free-form string flag. `--name` alone means the empty string.
    pub fn string(name: &str, default: &str, usage: &str) -> Self {
        Self::new(name, FlagKind::String, default.to_string(), usage)
    }

    /// A number flag. `--name` alone means `0`; negative values may be detached.
    pub fn numeric(name: &str, default: f64, usage: &str) -> Self {
        Self::new(name, FlagKind::Numeric, default.to_string(), usage)
    }

    /// A string flag restricted to `allowed`.
    pub fn option(name: &str, allowed: &[&str], default: &str, usage: &str) -> Self {
        let allowed = allowed.iter().map(|s| s.to_string()).collect();
        Self::new(name, FlagKind::Enum(allowed), default.to_string(), usage)
    }

    /// Adds an alias. Single characters are typed as `-x`, anything longer as `--xyz`.
    pub fn alias(mut self, alias: &str) -> Self {
        if !self.aliases.iter().any(|a| a == alias) {
            self.aliases.push(alias.to_string());
        }
        self
    }

    /// Leaves the flag out of help and completion.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub(crate) fn with_global(mut self, global: bool) -> Self {
        self.global = global;
        self
    }

    /// The primary name, also the first alias.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every spelling of the flag, without dashes.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// The value type of the flag.
    pub fn kind(&self) -> &FlagKind {
        &self.kind
    }

    /// Value used when the flag is absent from argv.
    pub fn default_value(&self) -> &str {
        &self.default
    }

    /// Help text.
    pub fn usage(&self) -> &str {
        &self.usage
    }

    /// Whether the flag is left out of help and completion.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Whether the flag belongs to the application rather than a command.
    pub fn is_global(&self) -> bool {
        self.global
    }

    /// Checks the declaration itself. Run by the registry before the flag is accepted.
    pub fn verify(&self) -> Result<(), FlagError> {
        if self.name.is_empty() {
            return Err(FlagError::EmptyName);
        }
        if let Some(bad) = self.aliases.iter().find(|a| !is_valid_flag_alias(a)) {
            return Err(FlagError::InvalidAlias {
                flag: self.name.clone(),
                alias: bad.clone(),
            });
        }
        // A bare enum flag takes its default, so the default must be an allowed value.
        if let FlagKind::Enum(allowed) = &self.kind
            && !allowed.contains(&self.default)
        {
            return Err(FlagError::InvalidDefault {
                flag: self.name.clone(),
                value: self.default.clone(),
            });
        }
        Ok(())
    }

    /// Returns the inline value slot if `token` names this flag:
    /// `None` for no match, `Some(None)` for `--name`, `Some(Some(v))` for `--name=v`.
    fn match_token<'t>(&self, token: &'t str) -> Option<Option<&'t str>> {
        let (head, inline) = match token.split_once(FLAG_VALUE_SEPARATOR) {
            Some((head, value)) => (head, Some(value)),
            None => (token, None),
        };
        self.aliases
            .iter()
            .any(|alias| dashed(alias) == head)
            .then_some(inline)
    }

    /// Scans `args` left to right and removes the first token naming this flag,
    /// plus its detached value when the kind takes one.
    ///
    /// Non-flag tokens are left in place; they only advance the position counter.
    pub fn parse(&self, args: &mut Vec<String>) -> Result<Option<FlagMatch>, FlagError> {
        let mut position = 0;
        let mut index = 0;

        while let Some(token) = args.get(index) {
            if !token.starts_with(FLAG_PREFIX) {
                position += 1;
                index += 1;
                continue;
            }

            let Some(inline) = self.match_token(token) else {
                index += 1;
                continue;
            };
            let inline = inline.map(str::to_string);
            args.remove(index);

            let value = match inline {
                Some(value) => value,
                None if self.takes_detached_value() => match args.get(index) {
                    Some(next) if self.accepts_detached(next) => args.remove(index),
                    _ => self.kind.implicit_value_for(&self.default),
                },
                None => self.kind.implicit_value_for(&self.default),
            };

            self.validate(&value)?;
            log::trace!(
                "flag '{}' matched at position {} with value '{}'",
                self.name,
                position,
                value
            );
            return Ok(Some(FlagMatch {
                name: self.name.clone(),
                value,
                position,
                global: self.global,
            }));
        }

        Ok(None)
    }

    fn takes_detached_value(&self) -> bool {
        !matches!(self.kind, FlagKind::Bool)
    }

    /// A following token is taken as the value unless it looks like another flag.
    /// Negative numbers are allowed for numeric flags.
    fn accepts_detached(&self, next: &str) -> bool {
        if !next.starts_with(FLAG_PREFIX) {
            return true;
        }
        matches!(self.kind, FlagKind::Numeric) && next.parse::<f64>().is_ok()
    }

    /// Validates an explicit value against the flag kind.
    pub fn validate(&self, value: &str) -> Result<(), FlagError> {
        let expected = match &self.kind {
            FlagKind::String => return Ok(()),
            FlagKind::Bool if parse_bool(value).is_some() => return Ok(()),
            FlagKind::Bool => "a boolean".to_string(),
            FlagKind::Numeric if value.parse::<f64>().is_ok() => return Ok(()),
            FlagKind::Numeric => "a number".to_string(),
            FlagKind::Enum(allowed) if allowed.iter().any(|a| a == value) => return Ok(()),
            FlagKind::Enum(allowed) => format!("one of [{}]", allowed.join(", ")),
        };
        Err(FlagError::InvalidValue {
            flag: self.name.clone(),
            value: value.to_string(),
            expected,
        })
    }
}

impl FlagKind {
    /// Enum flags fall back to their declared default; other kinds use the fixed implicit value.
    fn implicit_value_for(&self, default: &str) -> String {
        match self {
            Self::Enum(_) => default.to_string(),
            other => other.implicit_value().to_string(),
        }
    }
}

/// Lenient boolean parsing shared by flag validation and the worker's typed accessors.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
