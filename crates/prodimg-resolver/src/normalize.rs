//! Free-text product name cleanup and tokenization.
//!
//! Retail names carry noise that never shows up in page titles: internal
//! SKU codes, embedded barcodes, and parenthetical notes. Stripping them
//! before scoring keeps the overlap focused on descriptive words.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static PARENTHETICAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("valid parenthetical regex"));
/// Two letters followed by three or more digits, e.g. `BR12345`.
static SKU_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b[a-z]{2}[0-9]{3,}\b").expect("valid sku regex"));
static LONG_DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{6,}").expect("valid digit-run regex"));
static NON_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}\s]").expect("valid punctuation regex"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Strips noise tokens from a product name and collapses whitespace.
///
/// Punctuation is replaced by a space rather than deleted so hyphenated
/// words (`Salon-Bas`) stay separate tokens. Never fails; may return `""`.
#[must_use]
pub fn clean_name(raw: &str) -> String {
    let s = PARENTHETICAL_RE.replace_all(raw, " ");
    let s = SKU_RE.replace_all(&s, " ");
    let s = LONG_DIGITS_RE.replace_all(&s, " ");
    let s = NON_WORD_RE.replace_all(&s, " ");
    let s = WHITESPACE_RE.replace_all(&s, " ");
    s.trim().to_string()
}

/// Lowercases and splits on whitespace. Duplicates collapse.
#[must_use]
pub fn tokenize(text: &str) -> HashSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
