//! Event identifiers and the sanitization rule shared by every entry point

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Result, TrackError};

const GRAND_PRIX_SUFFIX: &str = "Grand Prix";

/// Sanitize a race name into a stable event identifier.
///
/// Drops a trailing `Grand Prix`, trims, collapses whitespace runs into a
/// single underscore and removes everything outside `[A-Za-z0-9_]`. The rule is
/// idempotent, so already-sanitized identifiers pass through unchanged.
///
/// ```rust
/// use trackplot::sanitize_identifier;
///
/// assert_eq!(sanitize_identifier("Monaco Grand Prix"), "Monaco");
/// assert_eq!(sanitize_identifier("Emilia Romagna Grand Prix"), "Emilia_Romagna");
/// assert_eq!(sanitize_identifier("São Paulo Grand Prix"), "So_Paulo");
/// assert_eq!(sanitize_identifier("Emilia_Romagna"), "Emilia_Romagna");
/// ```
pub fn sanitize_identifier(name: &str) -> String {
    let trimmed = name.trim();
    let stem = trimmed.strip_suffix(GRAND_PRIX_SUFFIX).unwrap_or(trimmed).trim();

    let mut out = String::with_capacity(stem.len());
    let mut in_whitespace = false;
    for ch in stem.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                out.push('_');
                in_whitespace = true;
            }
            continue;
        }
        in_whitespace = false;
        if ch.is_ascii_alphanumeric() || ch == '_' {
            out.push(ch);
        }
    }
    out
}

/// A race identified independently of its session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventRef {
    year: i32,
    identifier: String,
}

impl EventRef {
    /// Build an event reference, sanitizing `name`.
    ///
    /// Fails with [`TrackError::InvalidRequest`] when nothing survives
    /// sanitization.
    pub fn new(year: i32, name: &str) -> Result<Self> {
        let identifier = sanitize_identifier(name);
        if identifier.is_empty() {
            return Err(TrackError::invalid_request(format!(
                "event name '{}' is empty after sanitization",
                name
            )));
        }
        Ok(Self { year, identifier })
    }

    /// Season year requested by the caller
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Sanitized event identifier
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

impl fmt::Display for EventRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.year, self.identifier)
    }
}
