//! Intake flows: what happens to a chat message, a voice transcript or a
//! receipt's OCR text before anything is stored
//!
//! Each flow returns a serializable outcome listing the expenses that passed
//! the validator. Storage and transport are the caller's business; the
//! `Display` impls give a plain-text confirmation to echo back.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::{CategoryVocabulary, KharchaConfig, ReceiptSettings};
use crate::models::{Currency, ExpenseSource, ParsedExpense};
use crate::parser::ExpenseParser;
use crate::receipt::ReceiptAnalyzer;
use crate::validate::Validator;

/// Running total for one category, in order of first appearance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

/// Result of a chat message or transcript
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MessageOutcome {
    /// Bot command, not an expense
    Ignored,
    NoAmount,
    Invalid {
        expense: ParsedExpense,
    },
    Recorded {
        expense: ParsedExpense,
        source: ExpenseSource,
        currency: Currency,
    },
    /// Multi-line message; `recorded` may be empty when every expense was rejected
    Batch {
        recorded: Vec<ParsedExpense>,
        rejected: Vec<ParsedExpense>,
        currency: Currency,
    },
}

/// Result of a voice note, with the transcript kept for confirmation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptOutcome {
    pub transcript: String,
    #[serde(flatten)]
    pub outcome: MessageOutcome,
}

/// Result of a receipt's OCR text
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReceiptOutcome {
    /// One expense per valid line item
    Itemized {
        expenses: Vec<ParsedExpense>,
        items_total: f64,
        category_totals: Vec<CategoryTotal>,
        /// The total printed on the receipt, which may differ from the item sum
        bill_total: Option<f64>,
        currency: Currency,
    },
    /// No usable items; the whole receipt recorded as one expense
    Summary {
        expense: ParsedExpense,
        currency: Currency,
    },
    NoAmount,
}

impl ReceiptOutcome {
    /// Expenses to store, in receipt order
    pub fn expenses(&self) -> Vec<&ParsedExpense> {
        match self {
            Self::Itemized { expenses, .. } => expenses.iter().collect(),
            Self::Summary { expense, .. } => vec![expense],
            Self::NoAmount => Vec::new(),
        }
    }
}

fn category_totals(expenses: &[ParsedExpense]) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();
    for expense in expenses {
        match totals.iter_mut().find(|t| t.category == expense.category) {
            Some(t) => t.total += expense.amount,
            None => totals.push(CategoryTotal {
                category: expense.category.clone(),
                total: expense.amount,
            }),
        }
    }
    totals
}

/// Parser, receipt analyzer and validator over one shared vocabulary
#[derive(Debug, Clone)]
pub struct Intake {
    parser: ExpenseParser,
    analyzer: ReceiptAnalyzer,
    validator: Validator,
    currency: Currency,
}

impl Intake {
    pub fn new(config: &KharchaConfig) -> Self {
        Self::with_vocabulary(config.vocabulary.clone(), config.receipt)
    }

    pub fn with_vocabulary(vocabulary: Arc<CategoryVocabulary>, receipt: ReceiptSettings) -> Self {
        Self {
            parser: ExpenseParser::new(vocabulary.clone()),
            analyzer: ReceiptAnalyzer::new(vocabulary.clone(), receipt),
            validator: Validator::new(vocabulary),
            currency: receipt.home_currency,
        }
    }

    pub fn parser(&self) -> &ExpenseParser {
        &self.parser
    }

    pub fn analyzer(&self) -> &ReceiptAnalyzer {
        &self.analyzer
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Chat message: commands are ignored, multi-line text is split
    pub fn process_message(&self, text: &str) -> MessageOutcome {
        let text = text.trim();
        if text.starts_with('/') {
            return MessageOutcome::Ignored;
        }

        if !text.contains('\n') {
            return self.single(text, ExpenseSource::Text);
        }

        let parsed = self.parser.split_and_parse(text);
        if parsed.is_empty() {
            return MessageOutcome::NoAmount;
        }

        let (recorded, rejected): (Vec<_>, Vec<_>) = parsed
            .into_iter()
            .partition(|e| self.validator.is_valid_expense(e));
        info!(
            recorded = recorded.len(),
            rejected = rejected.len(),
            "Processed multi-expense message"
        );

        MessageOutcome::Batch {
            recorded,
            rejected,
            currency: self.currency,
        }
    }

    /// Voice transcript: always a single expense
    pub fn process_transcript(&self, transcript: &str) -> TranscriptOutcome {
        let transcript = transcript.trim();
        TranscriptOutcome {
            transcript: transcript.to_string(),
            outcome: self.single(transcript, ExpenseSource::Voice),
        }
    }

    fn single(&self, text: &str, source: ExpenseSource) -> MessageOutcome {
        let Some(expense) = self.parser.parse(text) else {
            return MessageOutcome::NoAmount;
        };

        if !self.validator.is_valid_expense(&expense) {
            return MessageOutcome::Invalid { expense };
        }

        debug!(source = %source, amount = expense.amount, "Recorded expense");
        MessageOutcome::Recorded {
            expense,
            source,
            currency: self.currency,
        }
    }

    /// Receipt text: one expense per item, else one for the whole bill
    pub fn process_receipt_text(&self, text: &str) -> ReceiptOutcome {
        let analysis = self.analyzer.analyze(text);

        let expenses: Vec<ParsedExpense> = analysis
            .items
            .iter()
            .filter(|item| {
                self.validator
                    .is_valid(Some(item.total_price), Some(item.category.as_str()))
            })
            .map(|item| ParsedExpense {
                amount: item.total_price,
                category: item.category.clone(),
                description: format!("Receipt - {}", item.name),
            })
            .collect();

        if !expenses.is_empty() {
            info!(items = expenses.len(), "Processed itemized receipt");
            return ReceiptOutcome::Itemized {
                items_total: expenses.iter().map(|e| e.amount).sum(),
                category_totals: category_totals(&expenses),
                expenses,
                bill_total: analysis.final_amount,
                currency: analysis.currency,
            };
        }

        let summary = self.analyzer.summarize_from(&analysis, text);
        match summary.final_amount {
            Some(amount) if self.validator.is_valid(Some(amount), Some(summary.category.as_str())) => {
                info!(amount, "Processed receipt as a single total");
                ReceiptOutcome::Summary {
                    expense: ParsedExpense {
                        amount,
                        category: summary.category,
                        description: format!("Receipt - Amount: {:.2}", amount),
                    },
                    currency: analysis.currency,
                }
            }
            _ => ReceiptOutcome::NoAmount,
        }
    }
}

impl fmt::Display for MessageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ignored => write!(f, "Ignored command"),
            Self::NoAmount => write!(
                f,
                "Could not extract an amount.\n\
                 Try 'Spent 150 for biriyani' or '200 for movie',\n\
                 or send one expense per line:\nCoffee 30\nApple 150\nTea 40"
            ),
            Self::Invalid { expense } => write!(
                f,
                "Invalid expense: {} ({})",
                expense.description, expense.category
            ),
            Self::Recorded {
                expense, currency, ..
            } => write!(
                f,
                "Expense recorded\nAmount: {}\nCategory: {}\nDescription: {}",
                currency.format(expense.amount),
                expense.category,
                expense.description
            ),
            Self::Batch {
                recorded, currency, ..
            } => {
                if recorded.is_empty() {
                    return write!(f, "Could not process any of the expenses");
                }
                writeln!(f, "Multiple expenses recorded")?;
                for expense in recorded {
                    writeln!(f, "- {}", expense.description)?;
                    writeln!(
                        f,
                        "  Amount: {} | Category: {}",
                        currency.format(expense.amount),
                        expense.category
                    )?;
                }
                write!(f, "Total: {} expenses recorded", recorded.len())
            }
        }
    }
}

impl fmt::Display for TranscriptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Transcribed: {}", self.transcript)?;
        write!(f, "{}", self.outcome)
    }
}

impl fmt::Display for ReceiptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Itemized {
                expenses,
                items_total,
                category_totals,
                bill_total,
                currency,
            } => {
                writeln!(f, "Receipt processed")?;
                writeln!(f, "Items saved: {}", expenses.len())?;
                write!(f, "Total (items sum): {}", currency.format(*items_total))?;
                for total in category_totals {
                    write!(f, "\n{} total: {}", total.category, currency.format(total.total))?;
                }
                if let Some(bill) = bill_total {
                    write!(f, "\nBill total (receipt): {}", currency.format(*bill))?;
                }
                Ok(())
            }
            Self::Summary { expense, currency } => write!(
                f,
                "Receipt processed\nAmount: {}\nCategory: {}",
                currency.format(expense.amount),
                expense.category
            ),
            Self::NoAmount => write!(
                f,
                "Could not find a total amount in the receipt.\n\
                 Enter it manually, e.g. 'Spent 500 for food'"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intake() -> Intake {
        Intake::new(&KharchaConfig::embedded().unwrap())
    }

    #[test]
    fn test_commands_are_ignored() {
        assert_eq!(intake().process_message("/summary"), MessageOutcome::Ignored);
        assert_eq!(intake().process_message("  /start"), MessageOutcome::Ignored);
    }

    #[test]
    fn test_single_message() {
        match intake().process_message("Spent 150 for biriyani") {
            MessageOutcome::Recorded {
                expense, source, ..
            } => {
                assert_eq!(expense.amount, 150.0);
                assert_eq!(expense.category, "Food");
                assert_eq!(source, ExpenseSource::Text);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(
            intake().process_message("no money here"),
            MessageOutcome::NoAmount
        );
    }

    #[test]
    fn test_multi_line_message() {
        let outcome = intake().process_message("Coffee 30\nApple 150\nTea 40");
        let MessageOutcome::Batch {
            recorded, rejected, ..
        } = &outcome
        else {
            panic!("expected batch, got {:?}", outcome);
        };
        let categories: Vec<&str> = recorded.iter().map(|e| e.category.as_str()).collect();
        assert_eq!(categories, vec!["Hot Drinks", "Fruits", "Hot Drinks"]);
        assert!(rejected.is_empty());
        assert!(outcome.to_string().ends_with("Total: 3 expenses recorded"));
    }

    #[test]
    fn test_multi_line_without_amounts() {
        assert_eq!(
            intake().process_message("hello\nworld"),
            MessageOutcome::NoAmount
        );
    }

    #[test]
    fn test_transcript() {
        let outcome = intake().process_transcript("spent 200 on movie ");
        assert_eq!(outcome.transcript, "spent 200 on movie");
        match &outcome.outcome {
            MessageOutcome::Recorded {
                expense, source, ..
            } => {
                assert_eq!(expense.category, "Entertainment");
                assert_eq!(*source, ExpenseSource::Voice);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(outcome.to_string().starts_with("Transcribed: spent 200 on movie\n"));
    }

    #[test]
    fn test_itemized_receipt() {
        let text = "Spice Garden\nBiryani - 250\nPizza - 200\nMasala Tea 40\nTotal: 490.00";
        let outcome = intake().process_receipt_text(text);
        let ReceiptOutcome::Itemized {
            expenses,
            items_total,
            category_totals,
            bill_total,
            ..
        } = &outcome
        else {
            panic!("expected itemized receipt, got {:?}", outcome);
        };

        assert_eq!(expenses.len(), 3);
        assert_eq!(expenses[0].description, "Receipt - Biryani");
        assert_eq!(*items_total, 490.0);
        assert_eq!(
            category_totals,
            &vec![
                CategoryTotal {
                    category: "Food".into(),
                    total: 450.0
                },
                CategoryTotal {
                    category: "Hot Drinks".into(),
                    total: 40.0
                },
            ]
        );
        assert_eq!(*bill_total, Some(490.0));
        assert!(outcome.to_string().contains("Food total: ₹450.00"));
    }

    #[test]
    fn test_gst_lines_do_not_become_expenses() {
        let text = "Spice Garden\nBiryani - 250\nCGST 6.25\nSGST 6.25\nTaxes 12\nTotal: 262.50";
        let outcome = intake().process_receipt_text(text);
        let descriptions: Vec<&str> = outcome
            .expenses()
            .iter()
            .map(|e| e.description.as_str())
            .collect();
        assert_eq!(descriptions, vec!["Receipt - Biryani"]);
        match outcome {
            ReceiptOutcome::Itemized {
                items_total,
                bill_total,
                ..
            } => {
                assert_eq!(items_total, 250.0);
                assert_eq!(bill_total, Some(262.5));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_receipt_summary_fallback() {
        let outcome = intake().process_receipt_text("Thank you\nTotal due $45.99");
        match &outcome {
            ReceiptOutcome::Summary { expense, currency } => {
                assert_eq!(expense.amount, 45.99);
                assert_eq!(expense.description, "Receipt - Amount: 45.99");
                assert_eq!(*currency, Currency::Usd);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(outcome.expenses().len(), 1);
    }

    #[test]
    fn test_receipt_without_amount() {
        let outcome = intake().process_receipt_text("hello world");
        assert_eq!(outcome, ReceiptOutcome::NoAmount);
        assert!(outcome.expenses().is_empty());
    }

    #[test]
    fn test_outcome_json_is_tagged() {
        let value = serde_json::to_value(intake().process_message("/x")).unwrap();
        assert_eq!(value["outcome"], "ignored");
    }
}
