//! Keyword-based category classification
//!
//! Two entry points:
//! - `classify`: walk the vocabulary in table order and return the first
//!   category whose keyword occurs as a substring of the text
//! - `explicit_category`: honour a `category: <value>` field written in the text
//!
//! Matching is plain substring containment, so "tea" also matches "steak".

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::config::CategoryVocabulary;
use crate::models::OTHER_CATEGORY;

/// `category`, optional `:`, then the value up to a newline, colon or comma
static EXPLICIT_CATEGORY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)category\s*:?\s*([^\n:,]+)").expect("valid regex"));

/// Maps free text to a label from the closed category set
#[derive(Debug, Clone)]
pub struct CategoryClassifier {
    vocabulary: Arc<CategoryVocabulary>,
}

impl CategoryClassifier {
    pub fn new(vocabulary: Arc<CategoryVocabulary>) -> Self {
        Self { vocabulary }
    }

    pub fn vocabulary(&self) -> &CategoryVocabulary {
        &self.vocabulary
    }

    /// Classify lowercased text; first category/keyword hit in table order wins
    pub fn classify(&self, text_lower: &str) -> String {
        for entry in self.vocabulary.entries() {
            if let Some(keyword) = entry.keywords.iter().find(|k| text_lower.contains(k.as_str())) {
                trace!(category = %entry.name, keyword = %keyword, "Keyword matched");
                return entry.name.clone();
            }
        }
        OTHER_CATEGORY.to_string()
    }

    /// Resolve an explicit `category: value` field, if the text has one
    ///
    /// The value is first compared against the category names (case-insensitive),
    /// then against the keyword table, mapping a keyword hit back to its category.
    pub fn explicit_category(&self, text: &str) -> Option<String> {
        let caps = EXPLICIT_CATEGORY.captures(text)?;
        let value = caps.get(1)?.as_str().trim().to_lowercase();
        if value.is_empty() {
            return None;
        }

        if let Some(label) = self.vocabulary.canonical(&value) {
            return Some(label.to_string());
        }

        self.vocabulary
            .entries()
            .iter()
            .find(|entry| {
                entry
                    .keywords
                    .iter()
                    .any(|k| *k == value || value.contains(k.as_str()))
            })
            .map(|entry| entry.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CategoryEntry;

    fn classifier() -> CategoryClassifier {
        CategoryClassifier::new(Arc::new(CategoryVocabulary::builtin()))
    }

    #[test]
    fn test_classify_keywords() {
        let c = classifier();
        assert_eq!(c.classify("spent 150 for biriyani"), "Food");
        assert_eq!(c.classify("coffee"), "Hot Drinks");
        assert_eq!(c.classify("electricity bill"), "Utilities");
        assert_eq!(c.classify("uber ride"), "Other");
        assert_eq!(c.classify(""), "Other");
    }

    #[test]
    fn test_classify_table_order_wins() {
        // "lunch" (Food) and "taxi" (Transport): Food comes first in the table
        let c = classifier();
        assert_eq!(c.classify("taxi after lunch"), "Food");
    }

    #[test]
    fn test_classify_is_substring_based() {
        // "steak" contains "tea" but Meat precedes Hot Drinks in the table
        let c = classifier();
        assert_eq!(c.classify("steak"), "Meat");
        // "instead" contains "tea" and nothing earlier
        assert_eq!(c.classify("instead"), "Hot Drinks");
    }

    #[test]
    fn test_explicit_category_exact_name() {
        let c = classifier();
        assert_eq!(
            c.explicit_category("Item: Coffee\nCategory: Hot Drinks"),
            Some("Hot Drinks".to_string())
        );
        assert_eq!(
            c.explicit_category("category:food"),
            Some("Food".to_string())
        );
    }

    #[test]
    fn test_explicit_category_via_keyword() {
        let c = classifier();
        assert_eq!(
            c.explicit_category("Category: biryani"),
            Some("Food".to_string())
        );
        assert_eq!(
            c.explicit_category("category : petrol refill"),
            Some("Transport".to_string())
        );
    }

    #[test]
    fn test_explicit_category_absent_or_unknown() {
        let c = classifier();
        assert_eq!(c.explicit_category("Spent 150 for biriyani"), None);
        assert_eq!(c.explicit_category("Category: zzz"), None);
    }

    #[test]
    fn test_substituted_vocabulary() {
        let vocab = CategoryVocabulary::new(vec![CategoryEntry {
            name: "Groceries".into(),
            keywords: vec!["milk".into()],
        }])
        .unwrap();
        let c = CategoryClassifier::new(Arc::new(vocab));
        assert_eq!(c.classify("milk and bread"), "Groceries");
        assert_eq!(c.classify("pizza"), "Other");
    }
}
