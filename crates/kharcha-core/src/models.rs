//! Domain models for Kharcha

use serde::{Deserialize, Serialize};

/// Label for text that matches no category keyword
pub const OTHER_CATEGORY: &str = "Other";

/// A single expense extracted from free text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedExpense {
    /// Always within `(0, 1_000_000)`
    pub amount: f64,
    pub category: String,
    pub description: String,
}

/// Where the raw text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseSource {
    /// Typed chat message
    #[default]
    Text,
    /// OCR output of a receipt photo
    Image,
    /// Speech-to-text transcript
    Voice,
}

impl ExpenseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Voice => "voice",
        }
    }
}

impl std::fmt::Display for ExpenseSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Currencies recognised on receipts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Inr,
    Usd,
    Eur,
    Gbp,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inr => "INR",
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
        }
    }

    /// Symbol used when rendering amounts
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Inr => "₹",
            Self::Usd => "$",
            Self::Eur => "€",
            Self::Gbp => "£",
        }
    }

    /// Format an amount with two decimals, e.g. `₹250.00`
    pub fn format(&self, amount: f64) -> String {
        format!("{}{:.2}", self.symbol(), amount)
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "INR" | "RS" | "₹" => Ok(Self::Inr),
            "USD" | "$" => Ok(Self::Usd),
            "EUR" | "€" => Ok(Self::Eur),
            "GBP" | "£" => Ok(Self::Gbp),
            _ => Err(format!("Unknown currency: {}", s)),
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a receipt was paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    #[serde(rename = "Credit Card")]
    CreditCard,
    #[serde(rename = "Debit Card")]
    DebitCard,
    Card,
    #[serde(rename = "UPI")]
    Upi,
    /// Paytm, Google Pay, PhonePe and similar
    #[serde(rename = "Digital Wallet")]
    DigitalWallet,
    Cheque,
    #[serde(rename = "Net Banking")]
    NetBanking,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::CreditCard => "Credit Card",
            Self::DebitCard => "Debit Card",
            Self::Card => "Card",
            Self::Upi => "UPI",
            Self::DigitalWallet => "Digital Wallet",
            Self::Cheque => "Cheque",
            Self::NetBanking => "Net Banking",
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace(['_', '-'], " ").as_str() {
            "cash" => Ok(Self::Cash),
            "credit card" => Ok(Self::CreditCard),
            "debit card" => Ok(Self::DebitCard),
            "card" => Ok(Self::Card),
            "upi" => Ok(Self::Upi),
            "digital wallet" | "wallet" => Ok(Self::DigitalWallet),
            "cheque" | "check" => Ok(Self::Cheque),
            "net banking" => Ok(Self::NetBanking),
            _ => Err(format!("Unknown payment method: {}", s)),
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coarse quality signal for a receipt analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Merchant identity printed at the top of a receipt
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Merchant {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// One purchased item on a receipt, in order of appearance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub quantity: Option<u32>,
    pub unit_price: Option<f64>,
    pub total_price: f64,
    pub category: String,
}

/// Taxes found on a receipt
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    /// GST / SGST / CGST
    pub gst: Option<f64>,
    /// Generic tax or VAT
    pub other: Option<f64>,
}

impl TaxBreakdown {
    /// Sum of whichever parts were found, `None` if neither
    pub fn total(&self) -> Option<f64> {
        match (self.gst, self.other) {
            (None, None) => None,
            (gst, other) => Some(gst.unwrap_or(0.0) + other.unwrap_or(0.0)),
        }
    }
}

/// Structured breakdown of a multi-line receipt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptAnalysis {
    #[serde(rename = "restaurant")]
    pub merchant: Merchant,
    pub items: Vec<LineItem>,
    pub subtotal: Option<f64>,
    pub tax: TaxBreakdown,
    pub service_charge: Option<f64>,
    pub discount: Option<f64>,
    pub final_amount: Option<f64>,
    pub currency: Currency,
    pub payment_method: Option<PaymentMethod>,
    pub confidence: Confidence,
    /// Set when the input could not be analysed at all (empty text)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl ReceiptAnalysis {
    /// An analysis with nothing found
    pub fn empty(currency: Currency) -> Self {
        Self {
            merchant: Merchant::default(),
            items: Vec::new(),
            subtotal: None,
            tax: TaxBreakdown::default(),
            service_charge: None,
            discount: None,
            final_amount: None,
            currency,
            payment_method: None,
            confidence: Confidence::Low,
            error: None,
        }
    }

    /// Sum of all line item totals
    pub fn items_total(&self) -> f64 {
        self.items.iter().map(|i| i.total_price).sum()
    }
}

/// Single total + category for a receipt whose items could not be used
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptSummary {
    pub final_amount: Option<f64>,
    pub category: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_parse_and_format() {
        assert_eq!("inr".parse::<Currency>().unwrap(), Currency::Inr);
        assert_eq!("€".parse::<Currency>().unwrap(), Currency::Eur);
        assert!("yen".parse::<Currency>().is_err());
        assert_eq!(Currency::Inr.format(250.0), "₹250.00");
        assert_eq!(Currency::Usd.format(3.5), "$3.50");
    }

    #[test]
    fn test_payment_method_serializes_display_name() {
        let json = serde_json::to_string(&PaymentMethod::CreditCard).unwrap();
        assert_eq!(json, "\"Credit Card\"");
        assert_eq!("net_banking".parse::<PaymentMethod>().unwrap(), PaymentMethod::NetBanking);
    }

    #[test]
    fn test_tax_total() {
        let none = TaxBreakdown::default();
        assert_eq!(none.total(), None);

        let both = TaxBreakdown {
            gst: Some(27.5),
            other: Some(10.0),
        };
        assert_eq!(both.total(), Some(37.5));
    }

    #[test]
    fn test_receipt_analysis_json_shape() {
        let analysis = ReceiptAnalysis::empty(Currency::Inr);
        let value = serde_json::to_value(&analysis).unwrap();
        assert!(value.get("restaurant").is_some());
        assert_eq!(value["confidence"], "low");
        assert_eq!(value["currency"], "INR");
        assert!(value.get("error").is_none());
    }
}
