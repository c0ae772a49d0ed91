//! Entity identifier sanitization.
//!
//! Port only accepts identifiers made of `[A-Za-z0-9@_.:\\/=-]`. Identifiers
//! derived from free-form text (team names) are passed through
//! [`sanitize_identifier`] so that every reference to the same team resolves
//! to the same identifier.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static VALID_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9@_.:\\/=-]+$").expect("identifier pattern is a valid regex")
});

static DISALLOWED_CHAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^A-Za-z0-9@_.:\\/=-]").expect("identifier pattern is a valid regex")
});

/// Replacement for every character outside the allowed set.
pub const REPLACEMENT: &str = "-";

/// Returns true if `identifier` is non-empty and only uses allowed characters.
pub fn is_valid_identifier(identifier: &str) -> bool {
    VALID_IDENTIFIER.is_match(identifier)
}

/// Replace every disallowed character with a hyphen.
///
/// Valid input is returned borrowed and unchanged. The replacement works per
/// character, so a multi-byte character becomes a single hyphen.
pub fn sanitize_identifier(identifier: &str) -> Cow<'_, str> {
    if is_valid_identifier(identifier) {
        return Cow::Borrowed(identifier);
    }
    DISALLOWED_CHAR.replace_all(identifier, REPLACEMENT)
}
