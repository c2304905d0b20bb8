//! Single-expense parsing
//!
//! Composes the amount extractor, category classifier and description cleaner
//! into one `text -> ParsedExpense` step. The amount is mandatory: text with no
//! amount is not an expense, whatever else it says.

use std::sync::Arc;

use tracing::debug;

use crate::amount::extract_amount;
use crate::classify::CategoryClassifier;
use crate::config::CategoryVocabulary;
use crate::describe::clean_description;
use crate::models::{ParsedExpense, OTHER_CATEGORY};

/// Turns one chunk of free text into a [`ParsedExpense`]
#[derive(Debug, Clone)]
pub struct ExpenseParser {
    classifier: CategoryClassifier,
}

impl ExpenseParser {
    pub fn new(vocabulary: Arc<CategoryVocabulary>) -> Self {
        Self {
            classifier: CategoryClassifier::new(vocabulary),
        }
    }

    pub fn classifier(&self) -> &CategoryClassifier {
        &self.classifier
    }

    /// Parse one expense, or `None` when the text carries no valid amount
    ///
    /// An explicit `category:` field wins. Otherwise (or when it names "Other")
    /// the cleaned description is run through the keyword classifier.
    pub fn parse(&self, text: &str) -> Option<ParsedExpense> {
        let explicit = self.classifier.explicit_category(text);

        let Some(amount) = extract_amount(text) else {
            debug!("No amount, not an expense");
            return None;
        };

        let description = clean_description(text);

        let category = match explicit {
            Some(label) if label != OTHER_CATEGORY => label,
            _ => self.classifier.classify(&description.to_lowercase()),
        };

        debug!(amount, category = %category, "Parsed expense");
        Some(ParsedExpense {
            amount,
            category,
            description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> ExpenseParser {
        ExpenseParser::new(Arc::new(CategoryVocabulary::builtin()))
    }

    #[test]
    fn test_parse_spent_for_biriyani() {
        let expense = parser().parse("Spent 150 for biriyani").unwrap();
        assert_eq!(expense.amount, 150.0);
        assert_eq!(expense.category, "Food");
        assert!(!expense.description.is_empty());
    }

    #[test]
    fn test_parse_coffee() {
        let expense = parser().parse("Coffee - 30").unwrap();
        assert_eq!(expense.amount, 30.0);
        assert_eq!(expense.category, "Hot Drinks");
        assert_eq!(expense.description, "Coffee");
    }

    #[test]
    fn test_explicit_category_overrides_keywords() {
        let expense = parser()
            .parse("Item: Biryani\nAmount: 250\nCategory: Hot Drinks")
            .unwrap();
        assert_eq!(expense.amount, 250.0);
        assert_eq!(expense.category, "Hot Drinks");
    }

    #[test]
    fn test_explicit_other_falls_back_to_keywords() {
        let expense = parser().parse("Pizza 300\ncategory: other").unwrap();
        assert_eq!(expense.category, "Food");
    }

    #[test]
    fn test_no_amount_fails_whole_parse() {
        assert_eq!(parser().parse("Category: Food"), None);
        assert_eq!(parser().parse("lunch with the team"), None);
        assert_eq!(parser().parse(""), None);
    }

    #[test]
    fn test_unmatched_text_is_other() {
        let expense = parser().parse("uber 220").unwrap();
        assert_eq!(expense.category, "Other");
    }

    #[test]
    fn test_reparsing_description_keeps_amount() {
        let p = parser();
        for text in [
            "Spent 150 for biriyani",
            "Coffee - 30",
            "Paid 200 rupees for groceries",
            "Movie tickets 450.50",
            "Item: Tea\nAmount: 20",
        ] {
            let first = p.parse(text).unwrap();
            let again = format!("{} {:.2}", first.description, first.amount);
            let second = p.parse(&again).unwrap();
            assert_eq!(second.amount, first.amount, "input {:?}", text);
        }
    }
}
