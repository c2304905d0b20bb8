//! Kharcha Core Library
//!
//! Expense extraction for chat messages, receipt OCR text and voice transcripts:
//! - Tiered amount extraction from free text
//! - Keyword category classification with explicit `category:` overrides
//! - Single and multi-expense parsing
//! - Structured receipt analysis with a confidence level
//! - Validation against a closed category vocabulary
//! - Pluggable OCR / speech-to-text backends (Tesseract, external commands, Ollama vision)
//!
//! The parsing modules are pure and synchronous; only `extract` does I/O.

pub mod amount;
pub mod classify;
pub mod config;
pub mod describe;
pub mod error;
pub mod extract;
pub mod intake;
pub mod models;
pub mod parser;
pub mod receipt;
pub mod split;
pub mod validate;

pub use amount::{extract_amount, extract_amount_match, AmountMatch, AmountTier};
pub use classify::CategoryClassifier;
pub use config::{
    BackendSettings, CategoryEntry, CategoryVocabulary, ConfigSource, ExtractorSettings,
    KharchaConfig, PaymentMethodSet, ReceiptSettings,
};
pub use describe::clean_description;
pub use error::{Error, Result};
pub use extract::{
    CommandBackend, ExtractorChain, ExtractorClient, MockBackend, OllamaVisionBackend,
    TesseractBackend, TextExtractor,
};
pub use intake::{CategoryTotal, Intake, MessageOutcome, ReceiptOutcome, TranscriptOutcome};
pub use models::{
    Confidence, Currency, ExpenseSource, LineItem, Merchant, ParsedExpense, PaymentMethod,
    ReceiptAnalysis, ReceiptSummary, TaxBreakdown, OTHER_CATEGORY,
};
pub use parser::ExpenseParser;
pub use receipt::ReceiptAnalyzer;
pub use split::{segment, Segmentation, SegmentationTier};
pub use validate::Validator;
