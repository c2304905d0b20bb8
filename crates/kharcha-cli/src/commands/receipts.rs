//! Receipt and voice note commands

use std::path::Path;

use anyhow::{bail, Context, Result};
use kharcha_core::{ExtractorChain, Intake, KharchaConfig, TextExtractor};
use serde_json::json;

use super::{print_json, read_input};

/// Analyze receipt text from a file or stdin
pub fn cmd_receipt(
    config: &KharchaConfig,
    file: Option<&Path>,
    plain: bool,
    json: bool,
) -> Result<()> {
    let text = read_input(file, None)?;
    let intake = Intake::new(config);
    let analysis = intake.analyzer().analyze(&text);

    if json {
        return print_json(&analysis);
    }

    if plain {
        println!("{}", analysis.to_plain_text());
        return Ok(());
    }

    if let Some(error) = &analysis.error {
        println!("⚠️  {}", error);
        return Ok(());
    }

    let currency = analysis.currency;
    println!("🧾 Receipt analysis\n");
    if let Some(name) = &analysis.merchant.name {
        println!("  Restaurant: {}", name);
    }
    if let Some(address) = &analysis.merchant.address {
        println!("  Address:    {}", address);
    }
    if let Some(phone) = &analysis.merchant.phone {
        println!("  Phone:      {}", phone);
    }

    println!("\n  Items ({}):", analysis.items.len());
    for item in &analysis.items {
        let quantity = item
            .quantity
            .map(|q| format!(" x{}", q))
            .unwrap_or_default();
        println!(
            "    {}{} - {} [{}]",
            item.name,
            quantity,
            currency.format(item.total_price),
            item.category
        );
    }

    println!();
    let amounts = [
        ("Subtotal", analysis.subtotal),
        ("GST", analysis.tax.gst),
        ("Other tax", analysis.tax.other),
        ("Service", analysis.service_charge),
        ("Discount", analysis.discount),
        ("Total", analysis.final_amount),
    ];
    for (label, value) in amounts {
        if let Some(value) = value {
            println!("  {:<10} {}", format!("{}:", label), currency.format(value));
        }
    }
    if let Some(method) = analysis.payment_method {
        println!("  {:<10} {}", "Paid by:", method);
    }
    println!("  {:<10} {}", "Confidence:", analysis.confidence);
    Ok(())
}

/// OCR a receipt image, then record its items
pub async fn cmd_ocr(config: &KharchaConfig, image: &Path, json: bool) -> Result<()> {
    let chain = ExtractorChain::ocr(&config.extractors);
    let text = run_chain(&chain, image, "OCR").await?;

    let outcome = Intake::new(config).process_receipt_text(&text);
    if json {
        return print_json(&json!({ "text": text, "outcome": outcome }));
    }

    println!("{}", outcome);
    Ok(())
}

/// Transcribe a voice note, then record it as a single expense
pub async fn cmd_transcribe(config: &KharchaConfig, audio: &Path, json: bool) -> Result<()> {
    let chain = ExtractorChain::speech(&config.extractors);
    let transcript = run_chain(&chain, audio, "Speech-to-text").await?;

    let outcome = Intake::new(config).process_transcript(&transcript);
    if json {
        return print_json(&outcome);
    }

    println!("{}", outcome);
    Ok(())
}

async fn run_chain(chain: &ExtractorChain, path: &Path, label: &str) -> Result<String> {
    if chain.is_empty() {
        bail!(
            "{} is not configured; add a backend to the [extractors] section",
            label
        );
    }

    let names: Vec<&str> = chain.backends().iter().map(|b| b.name()).collect();
    tracing::info!(backends = ?names, file = %path.display(), "Extracting text");

    chain
        .extract(path)
        .await
        .with_context(|| format!("{} failed for {}", label, path.display()))
}
