//! Final gate before an expense is handed to storage

use std::sync::Arc;

use tracing::debug;

use crate::config::CategoryVocabulary;
use crate::models::ParsedExpense;

/// Checks amount/category pairs against the closed category set
#[derive(Debug, Clone)]
pub struct Validator {
    vocabulary: Arc<CategoryVocabulary>,
}

impl Validator {
    pub fn new(vocabulary: Arc<CategoryVocabulary>) -> Self {
        Self { vocabulary }
    }

    /// Amount present and positive, category present and known (or "Other")
    pub fn is_valid(&self, amount: Option<f64>, category: Option<&str>) -> bool {
        let amount_ok = amount.is_some_and(|a| a > 0.0);
        let category_ok = category.is_some_and(|c| self.vocabulary.contains(c));

        if !(amount_ok && category_ok) {
            debug!(?amount, ?category, "Rejected expense");
        }
        amount_ok && category_ok
    }

    pub fn is_valid_expense(&self, expense: &ParsedExpense) -> bool {
        self.is_valid(Some(expense.amount), Some(expense.category.as_str()))
    }
}
