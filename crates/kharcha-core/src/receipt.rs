//! Receipt analysis
//!
//! Breaks multi-line receipt text (usually OCR output) into merchant details,
//! line items, subtotal, taxes, service charge, discount and the final bill.
//! Every field is matched independently and may be absent; nothing here
//! fails on malformed input. Missing items or totals lower the confidence.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

use crate::amount::{extract_amount, parse_figure};
use crate::classify::CategoryClassifier;
use crate::config::{CategoryVocabulary, PaymentMethodSet, ReceiptSettings};
use crate::models::{
    Confidence, Currency, LineItem, Merchant, PaymentMethod, ReceiptAnalysis, ReceiptSummary,
    TaxBreakdown,
};

/// Optional currency marker in front of a receipt figure
const CUR: &str = r"(?:₹|rs\.?|\$|€|£)?";

/// Receipt figure: digits with up to two decimals, `.` or `,` separated
const NUM: &str = r"(\d+(?:[.,]\d{1,2})?)";

/// Lines scanned for merchant name and address
const HEADER_LINES: usize = 5;

/// Highest accepted line item price
const MAX_ITEM_PRICE: f64 = 999_999.0;

pub const EMPTY_RECEIPT_ERROR: &str = "Empty receipt text";

/// `label`, optional `:`, optional currency, figure
fn labeled(label: &str) -> Regex {
    Regex::new(&format!(r"(?i){}\s*:?\s*{}\s*{}", label, CUR, NUM)).expect("valid regex")
}

static SUBTOTAL: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        labeled("subtotal"),
        labeled(r"sub[\s-]?total"),
        labeled(r"items\s*total"),
    ]
});

/// The rate must carry a `%` so `GST 18` is read as the amount, not a rate
static GST: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        labeled(r"(?:sgst|cgst|gst)\s*(?:\(?\s*\d+(?:\.\d+)?\s*%\s*\)?)?"),
        labeled("gst"),
    ]
});

static OTHER_TAX: Lazy<Vec<Regex>> = Lazy::new(|| vec![labeled("tax"), labeled("vat")]);

static SERVICE_CHARGE: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        labeled(r"service\s*charge"),
        labeled("service"),
        labeled(r"\btip"),
    ]
});

static DISCOUNT: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        labeled(r"discount\s*:?\s*-?"),
        labeled(r"offer\s*:?\s*-?"),
        labeled(r"promotion\s*:?\s*-?"),
    ]
});

/// Searched against the line-reversed text so the bottom of the receipt wins
static FINAL_AMOUNT: Lazy<Vec<Regex>> = Lazy::new(|| {
    let build = |label: &str, anchored: bool| {
        let end = if anchored { r"\s*$" } else { "" };
        Regex::new(&format!(r"(?im){}\s*:?\s*{}\s*{}{}", label, CUR, NUM, end))
            .expect("valid regex")
    };
    vec![
        build(r"(?:total|final|payable|amount|due|bill)\s*(?:amount)?", true),
        build(r"(?:total|final|payable)", false),
        build(r"(?:grand\s+total|total\s+due)", false),
    ]
});

static PHONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{10}\b").expect("valid regex"));

static ADDRESS_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)address|location").expect("valid regex"));

/// name, quantity, unit price, total price
static ITEM_WITH_QUANTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^([a-z][a-z\s]*?)\s+(\d+)\s+{cur}\s*{num}\s+{cur}\s*{num}$",
        cur = CUR,
        num = NUM
    ))
    .expect("valid regex")
});

/// name, optional `-`/`.`/`x` separator, optional currency, price, optional note
static ITEM_WITH_PRICE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^([a-z\s]+?)\s+(?:[\-.]|x\s*)?\s*{}\s*{}\s*(?:\(.*?\))?$",
        CUR, NUM
    ))
    .expect("valid regex")
});

/// Labels that look like items but are totals or header fields
static NON_ITEM_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:sub\s*total|total|tax(?:es)?|vat|service|discounts?|amount|payable|phone|address)\b|\b[csiu]?gst(?:in)?\b",
    )
    .expect("valid regex")
});

static PAYMENT_PATTERNS: Lazy<Vec<(PaymentMethod, Regex)>> = Lazy::new(|| {
    [
        (PaymentMethod::Cash, r"\bcash\b"),
        (PaymentMethod::CreditCard, r"\bcredit\s*card\b"),
        (PaymentMethod::DebitCard, r"\bdebit\s*card\b"),
        (PaymentMethod::Card, r"\bcard\b"),
        (PaymentMethod::Upi, r"\bupi\b"),
        (
            PaymentMethod::DigitalWallet,
            r"\b(?:wallet|paytm|googlepay|google\s+pay|phonepay|phonepe)\b",
        ),
        (PaymentMethod::Cheque, r"\b(?:cheque|check)\b"),
        (PaymentMethod::NetBanking, r"\b(?:net\s*banking|online)\b"),
    ]
    .into_iter()
    .map(|(method, pattern)| {
        let re = Regex::new(&format!("(?i){}", pattern)).expect("valid regex");
        (method, re)
    })
    .collect()
});

static CURRENCY_PATTERNS: Lazy<Vec<(Currency, Regex)>> = Lazy::new(|| {
    [
        (Currency::Inr, r"₹|\brs(?:\b|\d)|\drs\b|\binr\b"),
        (Currency::Usd, r"\$|\busd\b"),
        (Currency::Eur, r"€|\beur\b"),
        (Currency::Gbp, r"£|\bgbp\b"),
    ]
    .into_iter()
    .map(|(currency, pattern)| {
        let re = Regex::new(&format!("(?i){}", pattern)).expect("valid regex");
        (currency, re)
    })
    .collect()
});

/// First figure matched by the first pattern that matches
fn first_figure(patterns: &[Regex], text: &str) -> Option<f64> {
    patterns.iter().find_map(|re| {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| parse_figure(m.as_str()))
    })
}

/// Name, address and phone from the receipt header
pub fn extract_merchant(text: &str) -> Merchant {
    let header: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(HEADER_LINES)
        .collect();

    let name = header
        .iter()
        .find(|line| {
            let len = line.chars().count();
            (4..50).contains(&len) && !line.chars().take(5).any(|c| c.is_ascii_digit())
        })
        .map(|line| line.to_string());

    let address = header
        .iter()
        .filter(|line| ADDRESS_LABEL.is_match(line))
        .map(|line| {
            let stripped = ADDRESS_LABEL.replace_all(line, "");
            stripped.trim().trim_start_matches(':').trim().to_string()
        })
        .last();

    let phone = PHONE.find(text).map(|m| m.as_str().to_string());

    Merchant {
        name,
        address,
        phone,
    }
}

pub fn extract_subtotal(text: &str) -> Option<f64> {
    first_figure(&SUBTOTAL, text)
}

/// GST (first of SGST/CGST/GST found) and any generic tax or VAT
pub fn extract_taxes(text: &str) -> TaxBreakdown {
    TaxBreakdown {
        gst: first_figure(&GST, text),
        other: first_figure(&OTHER_TAX, text),
    }
}

pub fn extract_service_charge(text: &str) -> Option<f64> {
    first_figure(&SERVICE_CHARGE, text)
}

/// Discount as a positive figure, even when printed as `-20.00`
pub fn extract_discount(text: &str) -> Option<f64> {
    first_figure(&DISCOUNT, text)
}

/// The payable total, preferring the lowest matching line on the receipt
pub fn extract_final_amount(text: &str) -> Option<f64> {
    let reversed: Vec<&str> = text.lines().rev().collect();
    first_figure(&FINAL_AMOUNT, &reversed.join("\n"))
}

/// First payment method mentioned, limited to the configured vocabulary
pub fn detect_payment_method(text: &str, set: PaymentMethodSet) -> Option<PaymentMethod> {
    PAYMENT_PATTERNS
        .iter()
        .filter(|(method, _)| match set {
            PaymentMethodSet::Extended => true,
            PaymentMethodSet::Basic => matches!(
                method,
                PaymentMethod::Cash | PaymentMethod::Card | PaymentMethod::Upi
            ),
        })
        .find(|(_, re)| re.is_match(text))
        .map(|(method, _)| *method)
}

/// Currency named by the first marker found in priority order, else `home`
pub fn detect_currency(text: &str, home: Currency) -> Currency {
    CURRENCY_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(currency, _)| *currency)
        .unwrap_or(home)
}

/// High with items and a total, medium with one of them, low otherwise
pub fn confidence_for(has_items: bool, final_amount: Option<f64>) -> Confidence {
    let has_total = final_amount.is_some_and(|a| a > 0.0);
    match (has_items, has_total) {
        (true, true) => Confidence::High,
        (true, false) | (false, true) => Confidence::Medium,
        (false, false) => Confidence::Low,
    }
}

/// Structured receipt extraction over a shared category vocabulary
#[derive(Debug, Clone)]
pub struct ReceiptAnalyzer {
    classifier: CategoryClassifier,
    settings: ReceiptSettings,
}

impl ReceiptAnalyzer {
    pub fn new(vocabulary: Arc<CategoryVocabulary>, settings: ReceiptSettings) -> Self {
        Self {
            classifier: CategoryClassifier::new(vocabulary),
            settings,
        }
    }

    pub fn settings(&self) -> &ReceiptSettings {
        &self.settings
    }

    /// Full breakdown of a receipt; empty input yields a low-confidence error result
    pub fn analyze(&self, text: &str) -> ReceiptAnalysis {
        let text = text.trim();
        if text.is_empty() {
            debug!("Empty receipt text");
            let mut analysis = ReceiptAnalysis::empty(self.settings.home_currency);
            analysis.error = Some(EMPTY_RECEIPT_ERROR.to_string());
            return analysis;
        }

        let items = self.extract_items(text);
        let final_amount = extract_final_amount(text);
        let confidence = confidence_for(!items.is_empty(), final_amount);

        let analysis = ReceiptAnalysis {
            merchant: extract_merchant(text),
            items,
            subtotal: extract_subtotal(text),
            tax: extract_taxes(text),
            service_charge: extract_service_charge(text),
            discount: extract_discount(text),
            final_amount,
            currency: detect_currency(text, self.settings.home_currency),
            payment_method: detect_payment_method(text, self.settings.payment_methods),
            confidence,
            error: None,
        };

        debug!(
            items = analysis.items.len(),
            final_amount = ?analysis.final_amount,
            confidence = %analysis.confidence,
            "Analyzed receipt"
        );
        analysis
    }

    /// Line items in order of appearance
    pub fn extract_items(&self, text: &str) -> Vec<LineItem> {
        text.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .filter_map(|line| self.parse_item_line(line))
            .collect()
    }

    fn parse_item_line(&self, line: &str) -> Option<LineItem> {
        let (name, quantity, unit_price, total_price) =
            if let Some(caps) = ITEM_WITH_QUANTITY.captures(line) {
                (
                    caps.get(1)?.as_str().trim(),
                    caps.get(2)?.as_str().parse::<u32>().ok(),
                    parse_figure(caps.get(3)?.as_str()),
                    parse_figure(caps.get(4)?.as_str())?,
                )
            } else {
                let caps = ITEM_WITH_PRICE.captures(line)?;
                (
                    caps.get(1)?.as_str().trim(),
                    None,
                    None,
                    parse_figure(caps.get(2)?.as_str())?,
                )
            };

        if NON_ITEM_LABEL.is_match(name) {
            trace!(line = %line, "Skipping non-item label");
            return None;
        }
        if name.chars().count() < 2 || total_price <= 0.0 || total_price > MAX_ITEM_PRICE {
            trace!(line = %line, "Rejecting item");
            return None;
        }

        Some(LineItem {
            name: name.to_string(),
            quantity,
            unit_price,
            total_price,
            category: self.classifier.classify(&name.to_lowercase()),
        })
    }

    /// One total and one category for the whole receipt
    ///
    /// Used when line items are not worth recording individually. Falls back
    /// to the generic amount extractor when no labelled total is present.
    pub fn summarize(&self, text: &str) -> ReceiptSummary {
        self.summarize_from(&self.analyze(text), text)
    }

    /// Summary over an analysis already computed for `text`
    pub fn summarize_from(&self, analysis: &ReceiptAnalysis, text: &str) -> ReceiptSummary {
        let final_amount = analysis.final_amount.or_else(|| extract_amount(text));

        ReceiptSummary {
            final_amount,
            category: self.classifier.classify(&text.to_lowercase()),
        }
    }
}

impl ReceiptAnalysis {
    /// Short confirmation text: items, subtotal, tax and total
    pub fn to_plain_text(&self) -> String {
        let money = |amount: f64| self.currency.format(amount);
        let mut lines = vec!["Food Items:".to_string()];

        if self.items.is_empty() {
            lines.push("(none found)".to_string());
        }
        for (i, item) in self.items.iter().enumerate() {
            lines.push(format!("{}. {} - {}", i + 1, item.name, money(item.total_price)));
        }

        if let Some(subtotal) = self.subtotal {
            lines.push(format!("Subtotal: {}", money(subtotal)));
        }
        match self.tax.total() {
            Some(tax) => lines.push(format!("Tax: {}", money(tax))),
            None => lines.push("Tax: Not available".to_string()),
        }
        if let Some(total) = self.final_amount {
            lines.push(format!("Total Amount: {}", money(total)));
        }

        lines.join("\n")
    }
}
