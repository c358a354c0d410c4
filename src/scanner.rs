//! Runs the pattern registry over page text.

use crate::diagnostics::{DiagnosticEvent, DiagnosticKind, DiagnosticSink};
use crate::registry::PatternRegistry;
use crate::types::{ExtractionMethod, PageText, RawMatch};

/// Produces raw matches for a page.
///
/// Tiers are visited in ascending rank order, patterns in registry order,
/// and each pattern reports every non-overlapping leftmost-first match.
/// Hits of different patterns are never merged, so overlapping spans from
/// two patterns both appear.
#[derive(Debug, Clone)]
pub struct MatchScanner {
    max_page_text_length: usize,
}

impl MatchScanner {
    pub fn new(max_page_text_length: usize) -> Self {
        Self {
            max_page_text_length,
        }
    }

    pub fn scan(
        &self,
        page: &PageText,
        document: &str,
        registry: &PatternRegistry,
        diagnostics: &dyn DiagnosticSink,
    ) -> Vec<RawMatch> {
        if page.method == ExtractionMethod::Failed || page.text.is_empty() {
            return Vec::new();
        }

        let length = page.char_len();
        if length > self.max_page_text_length {
            diagnostics.emit(DiagnosticEvent::page(
                document,
                page.document_index,
                page.page_number,
                DiagnosticKind::PageTruncated,
                format!(
                    "page has {} characters, above the {} limit; scanned in full",
                    length, self.max_page_text_length
                ),
            ));
        }

        let mut matches = Vec::new();
        for tier in registry.tiers() {
            let Some(patterns) = registry.patterns_for(tier.rank) else {
                continue;
            };
            for pattern in patterns {
                for found in pattern.regex.find_iter(&page.text) {
                    if found.start() == found.end() {
                        continue;
                    }
                    diagnostics.emit(DiagnosticEvent::page(
                        document,
                        page.document_index,
                        page.page_number,
                        DiagnosticKind::MatchFound,
                        format!(
                            "{} '{}' matched \"{}\" at {}",
                            tier.label,
                            pattern.label,
                            found.as_str(),
                            found.start()
                        ),
                    ));
                    matches.push(RawMatch {
                        document_index: page.document_index,
                        page_number: page.page_number,
                        tier: tier.rank,
                        tier_label: tier.label.clone(),
                        pattern_index: pattern.index,
                        pattern_label: pattern.label.clone(),
                        match_text: found.as_str().to_string(),
                        start_offset: found.start(),
                        end_offset: found.end(),
                    });
                }
            }
        }

        matches
    }
}

impl Default for MatchScanner {
    fn default() -> Self {
        Self::new(crate::config::default_max_page_text_length())
    }
}
