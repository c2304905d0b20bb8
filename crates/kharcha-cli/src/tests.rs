//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::io::Write;

use kharcha_core::KharchaConfig;

use crate::commands::{self, read_input, truncate};

fn embedded_config() -> KharchaConfig {
    KharchaConfig::embedded().unwrap()
}

/// Config whose OCR and speech backends return fixed text
fn mock_config() -> KharchaConfig {
    KharchaConfig::from_toml(
        r#"
[[categories]]
name = "Food"
keywords = ["dosa", "lunch"]

[[categories]]
name = "Transport"
keywords = ["auto", "taxi"]

[extractors]
timeout_secs = 5
max_retries = 0

[[extractors.ocr]]
kind = "mock"
text = "Anand Bhavan\nMasala Dosa - 120\nTotal: 120.00"

[[extractors.speech]]
kind = "mock"
text = "paid 180 for auto"
"#,
    )
    .unwrap()
}

fn temp_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", content).unwrap();
    file
}

// ========== Input Helper Tests ==========

#[test]
fn test_read_input_prefers_text() {
    let file = temp_file("from file");
    let input = read_input(Some(file.path()), Some("from arg")).unwrap();
    assert_eq!(input, "from arg");
}

#[test]
fn test_read_input_from_file() {
    let file = temp_file("Coffee - 30\nTea - 20");
    let input = read_input(Some(file.path()), None).unwrap();
    assert_eq!(input, "Coffee - 30\nTea - 20");
}

#[test]
fn test_read_input_missing_file() {
    let result = read_input(Some(std::path::Path::new("/nonexistent/input.txt")), None);
    assert!(result.is_err());
}

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a very long keyword list", 10), "a very ...");
    assert_eq!(truncate("₹₹₹₹₹₹₹₹", 5), "₹₹...");
}

// ========== Expense Command Tests ==========

#[test]
fn test_cmd_parse() {
    let config = embedded_config();
    assert!(commands::cmd_parse(&config, "Spent 150 for biriyani", false).is_ok());
    assert!(commands::cmd_parse(&config, "Spent 150 for biriyani", true).is_ok());
}

#[test]
fn test_cmd_parse_no_amount() {
    let config = embedded_config();
    assert!(commands::cmd_parse(&config, "hello there", false).is_ok());
}

#[test]
fn test_cmd_split_text() {
    let config = embedded_config();
    let result = commands::cmd_split(&config, None, Some("Biryani - 250\nCoffee - 100"), false);
    assert!(result.is_ok());
}

#[test]
fn test_cmd_split_file_json() {
    let config = embedded_config();
    let file = temp_file("Item: Chai\nAmount: 20\n---\nItem: Pizza\nAmount: 300");
    assert!(commands::cmd_split(&config, Some(file.path()), None, true).is_ok());
}

#[test]
fn test_cmd_validate() {
    let config = embedded_config();
    assert!(commands::cmd_validate(&config, 100.0, "Food", false).is_ok());
    assert!(commands::cmd_validate(&config, 0.0, "Food", false).is_ok());
    assert!(commands::cmd_validate(&config, 100.0, "NotACategory", true).is_ok());
}

// ========== Receipt Command Tests ==========

#[test]
fn test_cmd_receipt_modes() {
    let config = embedded_config();
    let file = temp_file("Cafe Coffee Day\nCappuccino - 180\nGST (5%): 9.00\nTotal: 189.00");

    assert!(commands::cmd_receipt(&config, Some(file.path()), false, false).is_ok());
    assert!(commands::cmd_receipt(&config, Some(file.path()), true, false).is_ok());
    assert!(commands::cmd_receipt(&config, Some(file.path()), false, true).is_ok());
}

#[test]
fn test_cmd_receipt_empty_file() {
    let config = embedded_config();
    let file = temp_file("");
    assert!(commands::cmd_receipt(&config, Some(file.path()), false, false).is_ok());
}

#[tokio::test]
async fn test_cmd_ocr_with_mock_backend() {
    let config = mock_config();
    let image = temp_file("not really an image");
    assert!(commands::cmd_ocr(&config, image.path(), false).await.is_ok());
    assert!(commands::cmd_ocr(&config, image.path(), true).await.is_ok());
}

#[tokio::test]
async fn test_cmd_ocr_missing_image() {
    let config = mock_config();
    let result = commands::cmd_ocr(&config, std::path::Path::new("/nonexistent/bill.jpg"), false).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_cmd_transcribe_with_mock_backend() {
    let config = mock_config();
    let audio = temp_file("voice");
    assert!(commands::cmd_transcribe(&config, audio.path(), false)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_cmd_transcribe_without_backend() {
    let config = KharchaConfig::from_toml("[[categories]]\nname = \"Food\"\nkeywords = [\"dosa\"]\n")
        .unwrap();
    assert!(config.extractors.speech.is_empty());
    let audio = temp_file("voice");
    let result = commands::cmd_transcribe(&config, audio.path(), false).await;
    assert!(result.is_err());
}

// ========== Info Command Tests ==========

#[test]
fn test_cmd_categories() {
    let config = embedded_config();
    assert!(commands::cmd_categories(&config, None, false).is_ok());
    assert!(commands::cmd_categories(&config, None, true).is_ok());
}

#[test]
fn test_cmd_categories_single() {
    let config = embedded_config();
    assert!(commands::cmd_categories(&config, Some("hot drinks"), false).is_ok());
    assert!(commands::cmd_categories(&config, Some("Other"), true).is_ok());
    assert!(commands::cmd_categories(&config, Some("Rent"), false).is_err());
}

#[tokio::test]
async fn test_cmd_config() {
    let config = mock_config();
    assert!(commands::cmd_config(&config, false, false).await.is_ok());
    assert!(commands::cmd_config(&config, false, true).await.is_ok());
}

#[tokio::test]
async fn test_cmd_config_health_check() {
    // Mock backends with text report healthy
    let config = mock_config();
    assert!(commands::cmd_config(&config, true, false).await.is_ok());
    assert!(commands::cmd_config(&config, true, true).await.is_ok());
}
