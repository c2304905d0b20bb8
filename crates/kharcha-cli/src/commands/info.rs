//! Vocabulary and configuration listing

use anyhow::Result;
use kharcha_core::{
    config::default_config_path, BackendSettings, ExtractorClient, KharchaConfig, TextExtractor,
};
use serde_json::json;

use super::{print_json, truncate};

/// List categories in classifier priority order, or one category's keywords
pub fn cmd_categories(config: &KharchaConfig, name: Option<&str>, json: bool) -> Result<()> {
    if let Some(name) = name {
        let keywords = config.vocabulary.keywords_for(name)?;
        if json {
            return print_json(&json!({ "name": name, "keywords": keywords }));
        }
        if keywords.is_empty() {
            println!("🏷️  {}: (fallback, no keywords)", name);
        } else {
            println!("🏷️  {}: {}", name, keywords.join(", "));
        }
        return Ok(());
    }

    let entries = config.vocabulary.entries();

    if json {
        let rows: Vec<_> = entries
            .iter()
            .map(|e| json!({ "name": e.name, "keywords": e.keywords }))
            .collect();
        return print_json(&rows);
    }

    println!("🏷️  Categories ({}):\n", entries.len());
    for entry in entries {
        let keywords = if entry.keywords.is_empty() {
            "(fallback)".to_string()
        } else {
            truncate(&entry.keywords.join(", "), 60)
        };
        println!("  {:<14} {}", entry.name, keywords);
    }
    Ok(())
}

fn describe_backends(backends: &[BackendSettings]) -> Vec<&'static str> {
    backends.iter().map(BackendSettings::kind).collect()
}

fn chain_order(kinds: &[&str]) -> String {
    if kinds.is_empty() {
        "(none)".to_string()
    } else {
        kinds.join(" → ")
    }
}

/// Health of each configured backend, as (kind, healthy)
async fn check_backends(backends: &[BackendSettings]) -> Vec<(&'static str, bool)> {
    let mut results = Vec::with_capacity(backends.len());
    for settings in backends {
        let healthy = ExtractorClient::from_settings(settings).health_check().await;
        results.push((settings.kind(), healthy));
    }
    results
}

/// Show where configuration came from and what it resolved to
pub async fn cmd_config(config: &KharchaConfig, check: bool, json: bool) -> Result<()> {
    let extractors = &config.extractors;
    let ocr = describe_backends(&extractors.ocr);
    let speech = describe_backends(&extractors.speech);

    let health = if check {
        let mut all = check_backends(&extractors.ocr).await;
        all.extend(check_backends(&extractors.speech).await);
        Some(all)
    } else {
        None
    };

    if json {
        let health_rows: Option<Vec<_>> = health.as_ref().map(|rows| {
            rows.iter()
                .map(|(kind, healthy)| json!({ "kind": kind, "healthy": healthy }))
                .collect()
        });
        return print_json(&json!({
            "source": config.source.to_string(),
            "override_path": default_config_path(),
            "categories": config.vocabulary.labels(),
            "home_currency": config.receipt.home_currency,
            "payment_methods": config.receipt.payment_methods.as_str(),
            "ocr_backends": ocr,
            "speech_backends": speech,
            "timeout_secs": extractors.timeout_secs,
            "max_retries": extractors.max_retries,
            "health": health_rows,
        }));
    }

    println!("⚙️  Configuration\n");
    println!("  Source:          {}", config.source);
    if let Some(path) = default_config_path() {
        println!("  Override path:   {}", path.display());
    }
    println!("  Categories:      {}", config.vocabulary.labels().len());
    println!("  Home currency:   {}", config.receipt.home_currency);
    println!(
        "  Payment methods: {}",
        config.receipt.payment_methods.as_str()
    );

    println!("  OCR backends:    {}", chain_order(&ocr));
    println!("  Speech backends: {}", chain_order(&speech));
    println!(
        "  Timeout:         {}s, {} retr{}",
        extractors.timeout_secs,
        extractors.max_retries,
        if extractors.max_retries == 1 { "y" } else { "ies" }
    );

    if let Some(health) = health {
        println!("\n  Backend health:");
        for (kind, healthy) in health {
            let marker = if healthy { "✅" } else { "❌" };
            println!("    {} {}", marker, kind);
        }
    }
    Ok(())
}
