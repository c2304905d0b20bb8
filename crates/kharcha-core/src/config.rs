//! Configuration: category vocabulary, receipt defaults and extractor backends
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a three-layer resolution:
//! 1. Explicit path (`--config` or `KHARCHA_CONFIG`), which must exist
//! 2. Override in data dir (~/.local/share/kharcha/config/kharcha.toml)
//! 3. Fall back to embedded defaults (compiled into binary)
//!
//! The vocabulary is immutable once built and is shared through an `Arc` by the
//! classifier, parser and receipt analyzer.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{Currency, OTHER_CATEGORY};

/// Embedded default config (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../../../config/kharcha.toml");

/// Environment variable pointing at a config file
pub const CONFIG_ENV: &str = "KHARCHA_CONFIG";

/// Environment variable forcing which OCR backend is tried first
pub const OCR_BACKEND_ENV: &str = "KHARCHA_OCR_BACKEND";

/// One category and the keywords that select it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryEntry {
    pub name: String,
    /// Lowercase substrings, checked in order
    pub keywords: Vec<String>,
}

/// Ordered category table plus the closed set of valid labels
///
/// Table order is classifier priority: the first category with a keyword
/// contained in the text wins. "Other" is always a valid label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryVocabulary {
    entries: Vec<CategoryEntry>,
}

impl CategoryVocabulary {
    /// Build a vocabulary, rejecting tables that could never classify anything
    pub fn new(entries: Vec<CategoryEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::Config("category vocabulary is empty".into()));
        }

        let mut normalized: Vec<CategoryEntry> = Vec::with_capacity(entries.len());
        for entry in entries {
            let name = entry.name.trim().to_string();
            if name.is_empty() {
                return Err(Error::Config("category with empty name".into()));
            }
            if normalized
                .iter()
                .any(|e| e.name.eq_ignore_ascii_case(&name))
            {
                return Err(Error::Config(format!("duplicate category: {}", name)));
            }

            let mut keywords = Vec::with_capacity(entry.keywords.len());
            for keyword in entry.keywords {
                let keyword = keyword.trim().to_lowercase();
                if keyword.is_empty() {
                    return Err(Error::Config(format!("empty keyword in category {}", name)));
                }
                keywords.push(keyword);
            }

            if name.eq_ignore_ascii_case(OTHER_CATEGORY) && !keywords.is_empty() {
                return Err(Error::Config(
                    "the Other category is the fallback and cannot carry keywords".into(),
                ));
            }

            normalized.push(CategoryEntry { name, keywords });
        }

        Ok(Self {
            entries: normalized,
        })
    }

    /// The vocabulary compiled into the binary
    pub fn builtin() -> Self {
        parse_config(DEFAULT_CONFIG)
            .map(|c| Arc::unwrap_or_clone(c.vocabulary))
            .unwrap_or_else(|e| panic!("embedded config is invalid: {}", e))
    }

    /// Categories in priority order
    pub fn entries(&self) -> &[CategoryEntry] {
        &self.entries
    }

    /// Every valid label, in table order, ending with "Other"
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self
            .entries
            .iter()
            .map(|e| e.name.as_str())
            .filter(|n| *n != OTHER_CATEGORY)
            .collect();
        labels.push(OTHER_CATEGORY);
        labels
    }

    /// Exact (case-sensitive) membership in the closed set
    pub fn contains(&self, label: &str) -> bool {
        label == OTHER_CATEGORY || self.entries.iter().any(|e| e.name == label)
    }

    /// Canonical label for a case-insensitive name
    pub fn canonical(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        if name.eq_ignore_ascii_case(OTHER_CATEGORY) {
            return Some(OTHER_CATEGORY);
        }
        self.entries
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
            .map(|e| e.name.as_str())
    }

    /// Keywords registered for a category
    pub fn keywords_for(&self, name: &str) -> Result<&[String]> {
        if name.trim().eq_ignore_ascii_case(OTHER_CATEGORY) {
            return Ok(&[]);
        }
        self.entries
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name.trim()))
            .map(|e| e.keywords.as_slice())
            .ok_or_else(|| Error::UnknownCategory(name.to_string()))
    }
}

/// Which payment method vocabulary the receipt analyzer recognises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethodSet {
    /// Cash, Card, UPI
    Basic,
    /// Adds credit/debit card, wallets, cheque and net banking
    #[default]
    Extended,
}

impl PaymentMethodSet {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Extended => "extended",
        }
    }
}

/// Receipt analyzer settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReceiptSettings {
    /// Currency used when the text carries no marker
    pub home_currency: Currency,
    pub payment_methods: PaymentMethodSet,
}

/// One OCR or speech backend, tagged by `kind` in TOML
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendSettings {
    /// Tesseract command-line OCR
    Tesseract {
        #[serde(default)]
        program: Option<String>,
        #[serde(default)]
        language: Option<String>,
    },
    /// Any external program; `{input}` in args is replaced by the file path
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
    /// Local vision model served by Ollama
    OllamaVision {
        #[serde(default)]
        host: Option<String>,
        #[serde(default)]
        model: Option<String>,
    },
    /// Fixed text, for tests and demos
    Mock { text: String },
}

impl BackendSettings {
    /// The `kind` tag as written in config
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Tesseract { .. } => "tesseract",
            Self::Command { .. } => "command",
            Self::OllamaVision { .. } => "ollama_vision",
            Self::Mock { .. } => "mock",
        }
    }

    /// Default settings for a backend kind that needs no parameters
    pub fn default_for_kind(kind: &str) -> Option<Self> {
        match kind {
            "tesseract" => Some(Self::Tesseract {
                program: None,
                language: None,
            }),
            "ollama_vision" | "ollama" => Some(Self::OllamaVision {
                host: None,
                model: None,
            }),
            _ => None,
        }
    }
}

/// Settings shared by all external text extractors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorSettings {
    /// OCR backends, tried in order
    pub ocr: Vec<BackendSettings>,
    /// Speech-to-text backends, tried in order
    pub speech: Vec<BackendSettings>,
    pub timeout_secs: u64,
    /// Extra attempts per backend after the first failure
    pub max_retries: u32,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            ocr: vec![BackendSettings::Tesseract {
                program: None,
                language: None,
            }],
            speech: Vec::new(),
            timeout_secs: 60,
            max_retries: 1,
        }
    }
}

impl ExtractorSettings {
    /// Move OCR backends of `kind` to the front so they are tried first
    ///
    /// Unknown kinds with a parameterless default are inserted at the front.
    pub fn prefer_ocr_backend(&mut self, kind: &str) {
        let kind = kind.trim().to_lowercase();
        let (mut preferred, rest): (Vec<_>, Vec<_>) =
            self.ocr.drain(..).partition(|b| b.kind() == kind);

        if preferred.is_empty() {
            match BackendSettings::default_for_kind(&kind) {
                Some(settings) => preferred.push(settings),
                None => warn!(kind = %kind, "Unknown OCR backend preference ignored"),
            }
        }

        preferred.extend(rest);
        self.ocr = preferred;
    }
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Explicit(PathBuf),
    Override(PathBuf),
    Embedded,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Explicit(p) => write!(f, "{}", p.display()),
            Self::Override(p) => write!(f, "{} (data dir override)", p.display()),
            Self::Embedded => write!(f, "embedded defaults"),
        }
    }
}

/// Fully resolved configuration
#[derive(Debug, Clone)]
pub struct KharchaConfig {
    pub vocabulary: Arc<CategoryVocabulary>,
    pub receipt: ReceiptSettings,
    pub extractors: ExtractorSettings,
    pub source: ConfigSource,
}

impl KharchaConfig {
    /// Resolve config from an explicit path, `KHARCHA_CONFIG`, the data dir or defaults,
    /// then apply `KHARCHA_OCR_BACKEND`
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var(CONFIG_ENV).ok().map(PathBuf::from);
        let explicit = explicit.map(Path::to_path_buf).or(env_path);

        let mut config = load_config(explicit.as_deref())?;

        if let Ok(kind) = std::env::var(OCR_BACKEND_ENV) {
            debug!(kind = %kind, "Preferring OCR backend from environment");
            config.extractors.prefer_ocr_backend(&kind);
        }

        Ok(config)
    }

    /// Embedded defaults only
    pub fn embedded() -> Result<Self> {
        parse_config(DEFAULT_CONFIG)
    }

    /// Parse config from TOML content (no file access)
    pub fn from_toml(content: &str) -> Result<Self> {
        parse_config(content)
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("kharcha").join("config").join("kharcha.toml"))
}

/// Load configuration (explicit first, then override, then default)
fn load_config(explicit: Option<&Path>) -> Result<KharchaConfig> {
    if let Some(path) = explicit {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        let mut config = parse_config(&content)?;
        config.source = ConfigSource::Explicit(path.to_path_buf());
        return Ok(config);
    }

    if let Some(path) = default_config_path() {
        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read config {}: {}", path.display(), e))
            })?;
            let mut config = parse_config(&content)?;
            config.source = ConfigSource::Override(path);
            return Ok(config);
        }
    }

    parse_config(DEFAULT_CONFIG)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    categories: Option<Vec<RawCategory>>,
    receipt: Option<RawReceipt>,
    extractors: Option<RawExtractors>,
}

#[derive(Debug, Deserialize)]
struct RawCategory {
    name: String,
    #[serde(default)]
    keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawReceipt {
    home_currency: Option<String>,
    payment_methods: Option<PaymentMethodSet>,
}

#[derive(Debug, Deserialize)]
struct RawExtractors {
    timeout_secs: Option<u64>,
    max_retries: Option<u32>,
    ocr: Option<Vec<BackendSettings>>,
    speech: Option<Vec<BackendSettings>>,
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<KharchaConfig> {
    let raw: RawConfig = toml::from_str(content)?;

    let categories = raw
        .categories
        .ok_or_else(|| Error::Config("missing [[categories]] table".into()))?;
    let vocabulary = CategoryVocabulary::new(
        categories
            .into_iter()
            .map(|c| CategoryEntry {
                name: c.name,
                keywords: c.keywords,
            })
            .collect(),
    )?;

    let mut receipt = ReceiptSettings::default();
    if let Some(r) = raw.receipt {
        if let Some(currency) = r.home_currency {
            receipt.home_currency = currency.parse().map_err(Error::Config)?;
        }
        if let Some(methods) = r.payment_methods {
            receipt.payment_methods = methods;
        }
    }

    let mut extractors = ExtractorSettings::default();
    if let Some(e) = raw.extractors {
        if let Some(timeout) = e.timeout_secs {
            extractors.timeout_secs = timeout;
        }
        if let Some(retries) = e.max_retries {
            extractors.max_retries = retries;
        }
        if let Some(ocr) = e.ocr {
            extractors.ocr = ocr;
        }
        if let Some(speech) = e.speech {
            extractors.speech = speech;
        }
    }

    Ok(KharchaConfig {
        vocabulary: Arc::new(vocabulary),
        receipt,
        extractors,
        source: ConfigSource::Embedded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn entry(name: &str, keywords: &[&str]) -> CategoryEntry {
        CategoryEntry {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    #[test]
    fn test_parse_default_config() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        let labels = config.vocabulary.labels();
        assert_eq!(labels.first(), Some(&"Food"));
        assert_eq!(labels.last(), Some(&"Other"));
        assert!(labels.contains(&"Hot Drinks"));
        assert_eq!(config.receipt.home_currency, Currency::Inr);
        assert_eq!(config.receipt.payment_methods, PaymentMethodSet::Extended);
        assert_eq!(config.extractors.ocr[0].kind(), "tesseract");
        assert_eq!(config.source, ConfigSource::Embedded);
    }

    #[test]
    fn test_vocabulary_rejects_empty_and_duplicates() {
        assert!(CategoryVocabulary::new(vec![]).is_err());
        assert!(CategoryVocabulary::new(vec![entry("Food", &["pizza"]), entry("food", &[])])
            .is_err());
        assert!(CategoryVocabulary::new(vec![entry("Food", &["  "])]).is_err());
        assert!(CategoryVocabulary::new(vec![entry("Other", &["misc"])]).is_err());
    }

    #[test]
    fn test_vocabulary_normalizes_keywords() {
        let vocab = CategoryVocabulary::new(vec![entry("Food", &[" Pizza "])]).unwrap();
        assert_eq!(vocab.keywords_for("food").unwrap(), &["pizza".to_string()]);
        assert!(matches!(
            vocab.keywords_for("Rent"),
            Err(Error::UnknownCategory(_))
        ));
        assert!(vocab.keywords_for("other").unwrap().is_empty());
    }

    #[test]
    fn test_vocabulary_membership() {
        let vocab = CategoryVocabulary::builtin();
        assert!(vocab.contains("Food"));
        assert!(vocab.contains("Other"));
        assert!(!vocab.contains("food"));
        assert!(!vocab.contains("NotACategory"));
        assert_eq!(vocab.canonical("hot drinks"), Some("Hot Drinks"));
        assert_eq!(vocab.canonical("other"), Some("Other"));
        assert_eq!(vocab.canonical("rent"), None);
    }

    #[test]
    fn test_missing_categories_is_error() {
        let err = parse_config("[receipt]\nhome_currency = \"USD\"\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_bad_currency_is_error() {
        let toml = r#"
[[categories]]
name = "Food"
keywords = ["pizza"]

[receipt]
home_currency = "XYZ"
"#;
        assert!(matches!(parse_config(toml), Err(Error::Config(_))));
    }

    #[test]
    fn test_backend_settings_parse() {
        let toml = r#"
[[categories]]
name = "Food"
keywords = ["pizza"]

[extractors]
timeout_secs = 5
max_retries = 0

[[extractors.ocr]]
kind = "ollama_vision"
model = "llava"

[[extractors.ocr]]
kind = "mock"
text = "Pizza 100"
"#;
        let config = parse_config(toml).unwrap();
        assert_eq!(config.extractors.timeout_secs, 5);
        assert_eq!(config.extractors.max_retries, 0);
        assert_eq!(
            config.extractors.ocr[0],
            BackendSettings::OllamaVision {
                host: None,
                model: Some("llava".into())
            }
        );
        assert_eq!(config.extractors.ocr[1].kind(), "mock");
        assert!(config.extractors.speech.is_empty());
    }

    #[test]
    fn test_prefer_ocr_backend_reorders() {
        let mut settings = ExtractorSettings {
            ocr: vec![
                BackendSettings::Tesseract {
                    program: None,
                    language: None,
                },
                BackendSettings::Mock { text: "x".into() },
            ],
            ..Default::default()
        };
        settings.prefer_ocr_backend("mock");
        assert_eq!(settings.ocr[0].kind(), "mock");
        assert_eq!(settings.ocr[1].kind(), "tesseract");

        settings.prefer_ocr_backend("ollama_vision");
        assert_eq!(settings.ocr[0].kind(), "ollama_vision");
        assert_eq!(settings.ocr.len(), 3);

        settings.prefer_ocr_backend("nonsense");
        assert_eq!(settings.ocr.len(), 3);
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[[categories]]\nname = \"Groceries\"\nkeywords = [\"milk\"]"
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.vocabulary.labels(), vec!["Groceries", "Other"]);
        assert_eq!(config.source, ConfigSource::Explicit(file.path().to_path_buf()));
    }

    #[test]
    fn test_load_missing_explicit_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            load_config(Some(&missing)),
            Err(Error::Config(_))
        ));
    }
}
