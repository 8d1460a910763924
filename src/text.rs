//! String normalization for decoded field values.
//!
//! DBF fields are fixed width and space padded, and files produced by legacy
//! tooling often carry stray control bytes inside character data. Every value
//! the reader emits goes through one of these helpers before it reaches the
//! caller.

use once_cell::sync::Lazy;
use regex::Regex;

/// Control and other non-printable characters that never belong in a decoded
/// field value
static NON_DISPLAYABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{Cc}\p{Cf}]+").expect("Invalid regex pattern for non-displayable characters")
});

/// Any run of whitespace, including \r \n \t
static WHITESPACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").expect("Invalid regex pattern for whitespace runs")
});

/// Strip non-displayable characters and trim surrounding whitespace
pub fn clean(input: &str) -> String {
    NON_DISPLAYABLE.replace_all(input, "").trim().to_string()
}

/// Like [`clean`], but additionally removes every interior whitespace run
pub fn compact(input: &str) -> String {
    let cleaned = clean(input);
    WHITESPACE.replace_all(&cleaned, "").into_owned()
}

/// Like [`clean`], but collapses interior whitespace runs to a single space
pub fn collapse(input: &str) -> String {
    let cleaned = clean(input);
    WHITESPACE.replace_all(&cleaned, " ").into_owned()
}
