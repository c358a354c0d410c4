//! Unit tests for extraction, scanning and context capture working together

use std::sync::Arc;

use docsift::diagnostics::{DiagnosticKind, NullSink};
use docsift::{ContextExtractor, ContextStatus, ExtractionMethod, MatchScanner, TextExtractor};

use crate::helpers::{page, registry, RecordingSink, ScriptedBackend};

#[test]
fn two_budget_hits_on_one_page() {
    let registry = registry(&[&[r"\bbudget\b"]]);
    let text = "...the Budget Committee approved...the Budget shortfall...";
    let page = page(1, text);

    let raw = MatchScanner::default().scan(&page, "minutes.pdf", &registry, &NullSink);
    assert_eq!(raw.len(), 2);
    assert_eq!(raw[0].match_text, "Budget");
    assert_eq!(raw[1].match_text, "Budget");
    assert!(raw[0].start_offset < raw[1].start_offset);

    let extractor = ContextExtractor::new(10).preserve_whitespace();
    let first = extractor.extract_context(&raw[0], &page.text);
    let second = extractor.extract_context(&raw[1], &page.text);

    // Only 7 characters precede the first hit
    assert_eq!(first.context_status, ContextStatus::Partial);
    assert_eq!(first.context_start, 0);
    assert_eq!(second.context_status, ContextStatus::Full);
    assert_eq!(text[second.context_start..raw[1].start_offset].chars().count(), 10);
}

#[test]
fn page_empty_under_both_backends_is_failed() {
    let primary = ScriptedBackend::with_pages(&[(1, "budget on page one"), (2, "")], 2);
    let fallback = ScriptedBackend::with_pages(&[(2, "   ")], 2);
    let extractor = TextExtractor::with_backends(Arc::new(primary), Arc::new(fallback));
    let sink = RecordingSink::default();

    let text = extractor.extract_bytes(0, "doc.pdf", b"%PDF", &sink).unwrap();

    assert_eq!(text.page_count(), 2);
    assert_eq!(text.pages[0].method, ExtractionMethod::Primary);
    assert_eq!(text.pages[1].method, ExtractionMethod::Failed);
    assert!(text.pages[1].text.is_empty());
    assert_eq!(sink.kinds(), vec!["page_extracted", "extraction_failed"]);

    let tiers = registry(&[&["budget"]]);
    let matches = MatchScanner::default().scan(&text.pages[1], "doc.pdf", &tiers, &sink);
    assert!(matches.is_empty());
}

#[test]
fn fallback_supplies_unreadable_pages() {
    let primary = ScriptedBackend::with_pages(&[(1, "first")], 2);
    let fallback = ScriptedBackend::with_pages(&[(1, "ignored"), (2, "audit from fallback")], 2);
    let fallback_loads = fallback.loads.clone();
    let extractor = TextExtractor::with_backends(Arc::new(primary), Arc::new(fallback));
    let sink = RecordingSink::default();

    let text = extractor.extract_bytes(3, "doc.pdf", b"%PDF", &sink).unwrap();

    assert_eq!(text.pages[0].text, "first");
    assert_eq!(text.pages[1].method, ExtractionMethod::Fallback);
    assert_eq!(text.pages[1].text, "audit from fallback");
    assert_eq!(text.pages[1].document_index, 3);
    assert_eq!(fallback_loads.load(std::sync::atomic::Ordering::SeqCst), 1);

    let events = sink.events();
    assert_eq!(events[1].kind, DiagnosticKind::ExtractionFallback);
    assert_eq!(events[1].page, Some(2));
}

#[test]
fn fallback_is_not_parsed_when_primary_succeeds() {
    let primary = ScriptedBackend::with_pages(&[(1, "one"), (2, "two")], 2);
    let fallback = ScriptedBackend::with_pages(&[], 2);
    let fallback_loads = fallback.loads.clone();
    let extractor = TextExtractor::with_backends(Arc::new(primary), Arc::new(fallback));

    extractor.extract_bytes(0, "doc.pdf", b"%PDF", &NullSink).unwrap();
    assert_eq!(fallback_loads.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[test]
fn document_no_backend_can_open_is_unreadable() {
    let extractor = TextExtractor::with_backends(
        Arc::new(ScriptedBackend::unreadable()),
        Arc::new(ScriptedBackend::unreadable()),
    );
    let err = extractor.extract_bytes(0, "bad.pdf", b"junk", &NullSink).unwrap_err();
    assert_eq!(err.kind(), "unreadable");
    assert!(err.to_string().contains("scripted parse failure"));
}

#[test]
fn fallback_alone_can_open_a_document() {
    let fallback = ScriptedBackend::with_pages(&[(1, "recovered budget")], 1);
    let extractor =
        TextExtractor::with_backends(Arc::new(ScriptedBackend::unreadable()), Arc::new(fallback));
    let sink = RecordingSink::default();

    let text = extractor.extract_bytes(0, "odd.pdf", b"%PDF", &sink).unwrap();
    assert_eq!(text.page_count(), 1);
    assert_eq!(text.pages[0].method, ExtractionMethod::Fallback);
    assert_eq!(sink.kinds(), vec!["extraction_fallback"]);
}

#[test]
fn overlapping_patterns_both_report() {
    let registry = registry(&[&[r"budget committee"], &[r"committee"]]);
    let page = page(1, "The Budget Committee met");

    let raw = MatchScanner::default().scan(&page, "doc.pdf", &registry, &NullSink);
    let found: Vec<_> = raw.iter().map(|m| (m.tier, m.match_text.as_str())).collect();
    assert_eq!(found, vec![(1, "Budget Committee"), (2, "Committee")]);
}

#[test]
fn long_pages_are_flagged_and_still_scanned() {
    let registry = registry(&[&["needle"]]);
    let text = format!("{} needle", "x".repeat(50));
    let sink = RecordingSink::default();

    let raw = MatchScanner::new(20).scan(&page(1, &text), "doc.pdf", &registry, &sink);
    assert_eq!(raw.len(), 1);
    assert_eq!(sink.kinds(), vec!["page_truncated", "match_found"]);
}
