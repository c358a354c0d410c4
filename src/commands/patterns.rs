//! Patterns command handler

use std::fmt::Write as _;

use anyhow::Result;

use docsift::cli::{PatternsArgs, PatternsCommands};
use docsift::registry::PatternRegistry;
use docsift::service::{ScanOptions, ScanService};
use docsift::types::ContextualMatch;

use super::{load_config, load_registry};

/// List the tiers, or run them over a text.
#[cfg(not(tarpaulin_include))]
pub fn handle(args: &PatternsArgs) -> Result<()> {
    let (config, _) = load_config(args.config.as_deref())?;
    let registry = load_registry(&config)?;

    match &args.command {
        None => print!("{}", render_tiers(&registry)),
        Some(PatternsCommands::Test { text, window }) => {
            let mut options = ScanOptions::from_config(&config.scan).quiet();
            if let Some(window) = window {
                options = options.window(*window);
            }
            let service = ScanService::new(registry, options);
            print!("{}", render_matches(&service.scan_text(text)));
        }
    }
    Ok(())
}

/// Tiers in rank order with their patterns.
pub fn render_tiers(registry: &PatternRegistry) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} tiers, {} patterns",
        registry.tiers().len(),
        registry.pattern_count()
    );
    for tier in registry.tiers() {
        let patterns = registry.patterns_for(tier.rank).unwrap_or_default();
        let _ = writeln!(out);
        let _ = writeln!(out, "{}. {} ({})", tier.rank, tier.label, patterns.len());
        for pattern in patterns {
            if pattern.label == pattern.source() {
                let _ = writeln!(out, "   {}", pattern.source());
            } else {
                let _ = writeln!(out, "   {}: {}", pattern.label, pattern.source());
            }
        }
    }
    out
}

/// One block per match: tier, text, offsets and context.
pub fn render_matches(matches: &[ContextualMatch]) -> String {
    if matches.is_empty() {
        return "No matches\n".to_string();
    }
    let mut out = String::new();
    for matched in matches {
        let raw = &matched.raw;
        let _ = writeln!(
            out,
            "[{}] \"{}\" at {}..{} ({}, {})",
            raw.tier,
            raw.match_text,
            raw.start_offset,
            raw.end_offset,
            raw.tier_label,
            matched.context_status
        );
        if let Some(context) = &matched.context_text {
            let _ = writeln!(out, "    {}", context);
        }
    }
    out
}
