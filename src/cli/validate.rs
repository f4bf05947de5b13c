/// Argument validation that runs before any API client is requested.
use std::collections::BTreeMap;
use std::fmt;

use crate::errors::RackError;

/// Accepted number of positional arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
    /// Inclusive range.
    Between(usize, usize),
}

impl Arity {
    #[must_use]
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Self::Exact(n) => count == n,
            Self::AtLeast(n) => count >= n,
            Self::Between(min, max) => (min..=max).contains(&count),
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(n) => write!(f, "{n}"),
            Self::AtLeast(n) => write!(f, "at least {n}"),
            Self::Between(min, max) => write!(f, "{min} to {max}"),
        }
    }
}

/// Check the number of positional arguments.
///
/// # Errors
///
/// Returns `RackError::InvalidArgs` naming the expected and actual counts.
pub fn check_arg_num(args: &[String], arity: Arity) -> Result<(), RackError> {
    if arity.accepts(args.len()) {
        return Ok(());
    }
    let count = args.len();
    let message = if args.is_empty() {
        format!("expected {arity} positional arguments but got {count}")
    } else {
        let given = args.join(" ");
        format!("expected {arity} positional arguments but got {count}: {given}")
    };
    Err(RackError::InvalidArgs(message))
}

/// Value of a required flag.
///
/// # Errors
///
/// Returns `RackError::MissingFlag` if the flag is absent or blank.
pub fn require_flag<'a>(flag: &'static str, value: Option<&'a str>) -> Result<&'a str, RackError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(RackError::MissingFlag { flag }),
    }
}

/// Parse `key=value,key=value` pairs.
///
/// # Errors
///
/// Returns `RackError::InvalidArgs` if a pair has no `=` or an empty key.
pub fn parse_metadata(flag: &str, raw: &str) -> Result<BTreeMap<String, String>, RackError> {
    let mut metadata = BTreeMap::new();
    for pair in parse_list(raw) {
        let Some((key, value)) = pair.split_once('=') else {
            return Err(RackError::InvalidArgs(format!(
                "--{flag}: expected key=value, got '{pair}'"
            )));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(RackError::InvalidArgs(format!(
                "--{flag}: empty key in '{pair}'"
            )));
        }
        metadata.insert(key.to_owned(), value.trim().to_owned());
    }
    Ok(metadata)
}

/// Split a comma-separated list, dropping blank items.
#[must_use]
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}
