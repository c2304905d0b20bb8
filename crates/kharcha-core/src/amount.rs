//! Amount extraction from free text
//!
//! Finds the single most plausible monetary amount in a text blob. Signals are
//! tried in a fixed priority order and the first tier that yields a valid amount
//! wins; later tiers are never consulted once one succeeds:
//!
//! 1. `ExplicitLabel`: `amount: 250`
//! 2. `LabeledTotal`: `total`, `grand total`, ... followed by a two-decimal figure
//! 3. `CurrencyLines`: largest figure tagged with a currency symbol or word
//! 4. `LargestDecimal`: largest number with exactly two decimal digits
//! 5. `BareNumber`: first number, skipping a leading pincode-like integer
//!
//! A value is only accepted when `0 < amount < 1,000,000`. Comma is always a
//! decimal separator (`12,50` is twelve and a half), never a thousands separator.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, trace};

/// Exclusive upper bound for an accepted amount
pub const MAX_AMOUNT: f64 = 1_000_000.0;

/// Phrases that label a receipt total, in the order they are tried
pub const TOTAL_KEYWORDS: [&str; 6] = [
    "total",
    "grand total",
    "final amount",
    "amount due",
    "total amount",
    "total cost",
];

static EXPLICIT_AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)amount\s*:?\s*[₹$€£]?\s*(\d+(?:[.,]\d{2})?)").expect("valid regex")
});

static LABELED_TOTALS: Lazy<Vec<Regex>> = Lazy::new(|| {
    TOTAL_KEYWORDS
        .iter()
        .map(|keyword| {
            let label = keyword.replace(' ', r"\s+");
            Regex::new(&format!(r"(?i){}\s*:?\s*[₹$€£]?\s*(\d+[.,]\d{{2}})", label))
                .expect("valid regex")
        })
        .collect()
});

static CURRENCY_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[₹$€£]|rs\.|rs |rupee|dollar").expect("valid regex")
});

/// Lines describing individual items rather than totals
static ITEM_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)item|product|qty|quantity|x\d|each|piece").expect("valid regex")
});

static SYMBOL_AMOUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[₹$€£]\s*(\d+(?:[.,]\d{2})?)").expect("valid regex"));

static WORD_AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:rs\.|rs|rupees?|dollars?)\s*:?\s*(\d+(?:[.,]\d{2})?)")
        .expect("valid regex")
});

static TWO_DECIMAL_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+[.,]\d{2}").expect("valid regex"));

static ANY_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(?:[.,]\d{2})?").expect("valid regex"));

/// Which signal produced an amount; the discriminant is the priority rank
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountTier {
    ExplicitLabel = 1,
    LabeledTotal = 2,
    CurrencyLines = 3,
    LargestDecimal = 4,
    BareNumber = 5,
}

impl AmountTier {
    /// Priority rank, 1 is tried first
    pub fn rank(&self) -> u8 {
        *self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExplicitLabel => "explicit_label",
            Self::LabeledTotal => "labeled_total",
            Self::CurrencyLines => "currency_lines",
            Self::LargestDecimal => "largest_decimal",
            Self::BareNumber => "bare_number",
        }
    }

    /// All tiers in priority order
    pub fn all() -> &'static [AmountTier] {
        &[
            Self::ExplicitLabel,
            Self::LabeledTotal,
            Self::CurrencyLines,
            Self::LargestDecimal,
            Self::BareNumber,
        ]
    }

    fn run(&self, text: &str) -> Option<f64> {
        match self {
            Self::ExplicitLabel => explicit_amount(text),
            Self::LabeledTotal => labeled_total(text),
            Self::CurrencyLines => currency_line_max(text),
            Self::LargestDecimal => largest_decimal(text),
            Self::BareNumber => first_bare_number(text),
        }
    }
}

impl std::fmt::Display for AmountTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An accepted amount and the tier that found it
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AmountMatch {
    pub value: f64,
    pub tier: AmountTier,
}

/// Best amount in `text`, or `None` when every tier comes up empty
pub fn extract_amount(text: &str) -> Option<f64> {
    extract_amount_match(text).map(|m| m.value)
}

/// Like [`extract_amount`] but also reports which tier fired
pub fn extract_amount_match(text: &str) -> Option<AmountMatch> {
    for tier in AmountTier::all() {
        if let Some(value) = tier.run(text) {
            debug!(tier = %tier, value, "Amount found");
            return Some(AmountMatch { value, tier: *tier });
        }
    }
    debug!("No amount found");
    None
}

/// Parse a figure, treating `,` as the decimal point; no bounds check
pub fn parse_figure(s: &str) -> Option<f64> {
    s.trim().replace(',', ".").parse::<f64>().ok()
}

/// Parse a figure and accept it only inside `(0, MAX_AMOUNT)`
pub fn parse_amount(s: &str) -> Option<f64> {
    let value = parse_figure(s)?;
    if value > 0.0 && value < MAX_AMOUNT {
        Some(value)
    } else {
        trace!(raw = %s, "Amount outside accepted range");
        None
    }
}

/// Whether the text mentions any currency symbol or word
pub fn has_currency_marker(text: &str) -> bool {
    CURRENCY_MARKER.is_match(text)
}

/// Tier 1: `amount`, optional `:`, optional symbol, number
pub fn explicit_amount(text: &str) -> Option<f64> {
    let caps = EXPLICIT_AMOUNT.captures(text)?;
    parse_amount(caps.get(1)?.as_str())
}

/// Tier 2: a total label followed by a figure with exactly two decimals
pub fn labeled_total(text: &str) -> Option<f64> {
    LABELED_TOTALS.iter().find_map(|re| {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| parse_amount(m.as_str()))
    })
}

/// Tier 3: the largest currency-tagged figure on non-item lines
///
/// The total is usually the biggest tagged number on a receipt, so the maximum
/// is taken rather than the first or last occurrence.
pub fn currency_line_max(text: &str) -> Option<f64> {
    if !has_currency_marker(text) {
        return None;
    }

    let mut found: Vec<f64> = Vec::new();
    for line in text.lines().filter(|l| has_currency_marker(l)) {
        if ITEM_LINE.is_match(line) {
            trace!(line = %line, "Skipping item line");
            continue;
        }

        for re in [&*SYMBOL_AMOUNT, &*WORD_AMOUNT] {
            if let Some(value) = re
                .captures(line)
                .and_then(|caps| caps.get(1))
                .and_then(|m| parse_amount(m.as_str()))
            {
                found.push(value);
            }
        }
    }

    found.into_iter().reduce(f64::max)
}

/// Tier 4: the numerically largest valid two-decimal figure
pub fn largest_decimal(text: &str) -> Option<f64> {
    TWO_DECIMAL_NUMBER
        .find_iter(text)
        .filter_map(|m| parse_amount(m.as_str()))
        .reduce(f64::max)
}

/// Tier 5: the first valid number, skipping a leading pincode
///
/// When the very first number in the text is a 5 or 6 digit integer it is taken
/// to be a postal code and passed over.
pub fn first_bare_number(text: &str) -> Option<f64> {
    for (idx, m) in ANY_NUMBER.find_iter(text).enumerate() {
        let raw = m.as_str();
        let Some(value) = parse_amount(raw) else {
            continue;
        };
        if idx == 0 && looks_like_pincode(raw) {
            trace!(raw = %raw, "Skipping leading pincode");
            continue;
        }
        return Some(value);
    }
    None
}

fn looks_like_pincode(raw: &str) -> bool {
    (raw.len() == 5 || raw.len() == 6) && raw.chars().all(|c| c.is_ascii_digit())
}
