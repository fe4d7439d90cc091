//! Token and name classification
//!
//! One place decides what is a numeric literal, how word names are
//! normalized, and which names belong to the host. Builtin registration,
//! user binding and the dispatcher all go through these functions.

use progcalc_core::{CalcError, Result};

/// Host-level control commands
///
/// These are intercepted by the host before a line reaches the
/// dispatcher, so no word may be registered under them. The first four
/// are the legacy reserved set of the calculator; the rest are the
/// terminal host's editing commands.
pub const CONTROL_WORDS: &[&str] = &[
    "execute",
    "save",
    "load",
    "reset",
    "new-func",
    "set-func",
    "edit-func",
    "show-func",
    "save-func",
    "revert-func",
    "reset-funcs",
    "list-funcs",
    "help",
    "quit",
    "exit",
];

/// Parse a token as a finite numeric literal
///
/// Accepts decimal and float syntax (`3`, `-2.5`, `.5`, `1e3`, `+4`) and
/// unsigned `0x`/`0o`/`0b` integers. `inf`, `nan` and anything that
/// overflows to infinity are not literals.
pub fn parse_number(token: &str) -> Option<f64> {
    if token.is_empty() {
        return None;
    }

    let lower = token.to_ascii_lowercase();
    for (prefix, radix) in [("0x", 16), ("0o", 8), ("0b", 2)] {
        if let Some(digits) = lower.strip_prefix(prefix) {
            if digits.is_empty() {
                return None;
            }
            return digits
                .chars()
                .try_fold(0.0_f64, |acc, c| {
                    c.to_digit(radix)
                        .map(|d| acc * f64::from(radix) + f64::from(d))
                })
                .filter(|n| n.is_finite());
        }
    }

    token.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Lowercase a word name for storage and lookup
pub fn normalize(name: &str) -> String {
    name.to_lowercase()
}

pub fn is_control_word(name: &str) -> bool {
    let name = normalize(name);
    CONTROL_WORDS.contains(&name.as_str())
}

/// Validate a word name and return its normalized form
pub fn validate_name(name: &str) -> Result<String> {
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(CalcError::InvalidName(name.to_string()));
    }

    let normalized = normalize(name);
    if parse_number(&normalized).is_some() {
        return Err(CalcError::NumericName(normalized));
    }
    if is_control_word(&normalized) {
        return Err(CalcError::ReservedName(normalized));
    }

    Ok(normalized)
}
