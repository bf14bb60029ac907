//! Single-line match predicate
//!
//! A `Matcher` is compiled once per query and shared read-only by every
//! engine worker.

use crate::distributed::protocol::{MatchFlags, MatchMode};
use crate::error::GrepError;
use regex::Regex;

/// Base test applied to a line before inversion
#[derive(Debug, Clone)]
enum Predicate {
    /// Substring containment; needle is already lower-cased when `fold_case`
    Fixed { needle: String, fold_case: bool },
    /// Regular expression; case-insensitivity is compiled into the pattern
    Regex(Regex),
}

/// Compiled pattern plus inversion
#[derive(Debug, Clone)]
pub struct Matcher {
    predicate: Predicate,
    invert: bool,
}

impl Matcher {
    /// Compile `pattern` according to `flags`
    ///
    /// Fixed mode never fails. Regex mode fails with `GrepError::Compile`
    /// when the pattern is not a valid regular expression.
    pub fn compile(pattern: &str, flags: &MatchFlags) -> Result<Self, GrepError> {
        let predicate = match flags.mode() {
            MatchMode::Fixed => Predicate::Fixed {
                needle: if flags.ignore_case {
                    pattern.to_lowercase()
                } else {
                    pattern.to_string()
                },
                fold_case: flags.ignore_case,
            },
            MatchMode::Regex => {
                let source = if flags.ignore_case {
                    format!("(?i){}", pattern)
                } else {
                    pattern.to_string()
                };
                Predicate::Regex(Regex::new(&source)?)
            }
        };

        Ok(Self {
            predicate,
            invert: flags.invert,
        })
    }

    /// Whether `line` is selected
    pub fn is_match(&self, line: &str) -> bool {
        let hit = match &self.predicate {
            Predicate::Fixed { needle, fold_case: true } => line.to_lowercase().contains(needle.as_str()),
            Predicate::Fixed { needle, fold_case: false } => line.contains(needle.as_str()),
            Predicate::Regex(re) => re.is_match(line),
        };
        hit != self.invert
    }
}
