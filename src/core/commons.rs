// src/core/commons.rs

use crate::constants::{FLAG_ALIAS_PATTERN, IDENTIFIER_PATTERN};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref IDENTIFIER_RE: Regex =
        Regex::new(IDENTIFIER_PATTERN).expect("identifier pattern must compile");
    static ref FLAG_ALIAS_RE: Regex =
        Regex::new(FLAG_ALIAS_PATTERN).expect("flag alias pattern must compile");
}

/// Checks a command or task name against the identifier pattern.
pub fn is_valid_identifier(name: &str) -> bool {
    IDENTIFIER_RE.is_match(name)
}

/// Checks a flag alias (written without its leading dashes).
pub fn is_valid_flag_alias(alias: &str) -> bool {
    FLAG_ALIAS_RE.is_match(alias)
}

/// Renders an alias the way it is typed on the command line.
pub fn dashed(alias: &str) -> String {
    if alias.chars().count() == 1 {
        format!("-{}", alias)
    } else {
        format!("--{}", alias)
    }
}
