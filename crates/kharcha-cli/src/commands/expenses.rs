//! Message parsing commands

use std::path::Path;

use anyhow::Result;
use kharcha_core::{Intake, KharchaConfig, ParsedExpense};
use serde_json::json;

use super::{print_json, read_input};

fn print_expense(expense: &ParsedExpense, valid: bool, config: &KharchaConfig) {
    let marker = if valid { "✅" } else { "❌" };
    println!(
        "  {} {} [{}] {}",
        marker,
        config.receipt.home_currency.format(expense.amount),
        expense.category,
        expense.description
    );
}

/// Parse one expense and report whether it would be accepted
pub fn cmd_parse(config: &KharchaConfig, text: &str, json: bool) -> Result<()> {
    let intake = Intake::new(config);
    let parsed = intake.parser().parse(text);
    let valid = parsed
        .as_ref()
        .is_some_and(|e| intake.validator().is_valid_expense(e));

    if json {
        return print_json(&json!({ "expense": parsed, "valid": valid }));
    }

    match parsed {
        Some(expense) => print_expense(&expense, valid, config),
        None => println!("⚠️  No amount found in \"{}\"", text.trim()),
    }
    Ok(())
}

/// Split a message into expenses, one per segment
pub fn cmd_split(
    config: &KharchaConfig,
    file: Option<&Path>,
    text: Option<&str>,
    json: bool,
) -> Result<()> {
    let input = read_input(file, text)?;
    let intake = Intake::new(config);
    let expenses = intake.parser().split_and_parse(&input);

    if json {
        let rows: Vec<_> = expenses
            .iter()
            .map(|e| json!({ "expense": e, "valid": intake.validator().is_valid_expense(e) }))
            .collect();
        return print_json(&rows);
    }

    if expenses.is_empty() {
        println!("⚠️  No expenses found");
        return Ok(());
    }

    println!("🧾 {} expense(s):\n", expenses.len());
    for expense in &expenses {
        print_expense(expense, intake.validator().is_valid_expense(expense), config);
    }

    let total: f64 = expenses.iter().map(|e| e.amount).sum();
    println!("\n  Total: {}", config.receipt.home_currency.format(total));
    Ok(())
}

/// Check an amount/category pair against the vocabulary
pub fn cmd_validate(config: &KharchaConfig, amount: f64, category: &str, json: bool) -> Result<()> {
    let intake = Intake::new(config);
    let valid = intake.validator().is_valid(Some(amount), Some(category));

    if json {
        return print_json(&json!({
            "amount": amount,
            "category": category,
            "valid": valid,
        }));
    }

    if valid {
        println!("✅ Valid: {:.2} [{}]", amount, category);
    } else if amount <= 0.0 {
        println!("❌ Invalid: amount must be positive");
    } else {
        println!("❌ Invalid: unknown category \"{}\"", category);
        println!(
            "   Known categories: {}",
            config.vocabulary.labels().join(", ")
        );
    }
    Ok(())
}
