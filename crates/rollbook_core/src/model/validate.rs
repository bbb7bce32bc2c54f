//! Field format validators for student records.
//!
//! # Responsibility
//! - Hold the compiled patterns for every validated record field.
//! - Expose pure predicate functions with no side effects.
//!
//! # Invariants
//! - Callers pass already-trimmed values.
//! - Optional fields are validated only when present; absence is always valid.

use once_cell::sync::Lazy;
use regex::Regex;

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\p{Lu}\p{Ll}*$").expect("valid name regex"));
static GIT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://(github\.com|gitlab\.com)/[A-Za-z0-9_-]+(/[A-Za-z0-9_-]+)*$")
        .expect("valid git regex")
});
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid email regex")
});
static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\+7|8)[ (-]?[0-9]{3}[ )-]?[0-9]{3}[ -]?[0-9]{2}[ -]?[0-9]{2}$")
        .expect("valid phone regex")
});
static MESSAGING_HANDLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@[A-Za-z0-9_]{5,}$").expect("valid messaging handle regex"));

/// Capitalized single word: one uppercase letter followed by lowercase
/// letters, in any script.
pub fn is_valid_name(value: &str) -> bool {
    NAME_RE.is_match(value)
}

/// `https://<github.com|gitlab.com>/<segment>[/<segment>...]`.
pub fn is_valid_git(value: &str) -> bool {
    GIT_RE.is_match(value)
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// National format: `+7` or `8` prefix followed by 10 ASCII digits,
/// optionally grouped by spaces, hyphens or parentheses.
pub fn is_valid_phone(value: &str) -> bool {
    PHONE_RE.is_match(value)
}

/// `@` followed by at least five word characters.
pub fn is_valid_messaging_handle(value: &str) -> bool {
    MESSAGING_HANDLE_RE.is_match(value)
}
