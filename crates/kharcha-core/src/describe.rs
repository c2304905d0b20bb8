//! Description cleanup: strip the amount and field labels from expense text

use once_cell::sync::Lazy;
use regex::Regex;

/// Optional symbol, number, optional currency word
static AMOUNT_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[₹$€£]?\s*\d+(?:[.,]\d{1,2})?\s*(?:rs|rupees|dollars)?").expect("valid regex")
});

/// A labelled field and the rest of its line
static FIELD_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:amount|category|total|cost|price)\s*:?\s*[^\n]*").expect("valid regex")
});

static RUNS_OF_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").expect("valid regex"));

const EDGE_PUNCTUATION: &[char] = &[' ', '-', ':', ';', ',', '.', '\n', '\t'];

/// Shortest description kept before falling back to the raw text
const MIN_DESCRIPTION_LEN: usize = 3;

/// Human-readable description for an expense text
///
/// Removes the first amount token and any `amount:`/`category:`/`total:`/`cost:`/
/// `price:` field, collapses whitespace and trims edge punctuation. When fewer
/// than three characters survive, the input text (trimmed) is returned so a
/// description is never empty for non-empty input.
pub fn clean_description(text: &str) -> String {
    // Replaced by a space so the words either side stay apart
    let without_amount = AMOUNT_TOKEN.replace(text, " ");
    let without_fields = FIELD_LINE.replace_all(&without_amount, "");
    let collapsed = RUNS_OF_WHITESPACE.replace_all(&without_fields, " ");
    let cleaned = collapsed.trim().trim_matches(EDGE_PUNCTUATION);

    if cleaned.chars().count() < MIN_DESCRIPTION_LEN {
        text.trim().to_string()
    } else {
        cleaned.to_string()
    }
}
