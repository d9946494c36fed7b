//! Text normalization applied between extraction and chunking.

use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern"));
static NON_ASCII: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\x00-\x7F]+").expect("non-ascii pattern"));
static CURLY_QUOTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[\u{201C}\u{201D}\u{2018}\u{2019}]").expect("quote pattern"));
static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9\s.,;:!?()\-]").expect("charset pattern"));

/// Normalize raw extracted text.
///
/// Steps, in order: lowercase, collapse whitespace runs to one space,
/// replace non-ASCII runs with a space, map curly quotes to `"`, drop every
/// character outside ASCII alphanumerics, whitespace and `. , ; : ! ? ( ) -`,
/// then trim. Deterministic; empty input yields an empty string.
pub fn normalize(raw: &str) -> String {
    let text = raw.to_lowercase();
    let text = WHITESPACE.replace_all(&text, " ");
    let text = NON_ASCII.replace_all(&text, " ");
    let text = CURLY_QUOTES.replace_all(&text, "\"");
    let text = DISALLOWED.replace_all(&text, "");
    text.trim().to_string()
}
