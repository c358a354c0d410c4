//! End-to-end scans over generated PDF folders

use std::fs;

use docsift::config::{PatternConfig, ReportFormat, TierConfig};
use docsift::diagnostics::DiagnosticKind;
use docsift::discovery::{discover, DiscoveryOptions};
use docsift::report::sinks_for;
use docsift::service::DocumentOutcome;
use docsift::{PatternRegistry, RunStatus, ScanOptions, ScanService};
use tempfile::TempDir;

use crate::helpers::{three_document_folder, write_pdf};

fn registry() -> PatternRegistry {
    PatternRegistry::load(&PatternConfig::new(vec![
        TierConfig::new(
            "urgent",
            &[r"\bethics\s+training\b", r"\bconflict\s+of\s+interest\b"],
        ),
        TierConfig::new("watch", &[r"\bnothing\b"]),
    ]))
    .unwrap()
}

fn scan_folder(dir: &TempDir, options: ScanOptions) -> docsift::ScanReport {
    let documents = discover(dir.path(), &DiscoveryOptions::default()).unwrap();
    ScanService::new(registry(), options.quiet())
        .scan(documents)
        .unwrap()
}

#[test]
fn unreadable_document_gives_partial_failure() {
    let dir = three_document_folder();
    let report = scan_folder(&dir, ScanOptions::default().window(10));

    assert_eq!(report.status, RunStatus::PartialFailure);
    assert_eq!(report.status.exit_code(), 2);
    assert_eq!(report.counts_by_tier.get(&1), Some(&2));
    assert_eq!(report.counts_by_tier.get(&2), Some(&1));

    assert_eq!(report.failed_documents.len(), 1);
    assert_eq!(report.failed_documents[0].source_filename, "b_broken.pdf");
    assert_eq!(report.failed_documents[0].kind, "unreadable");
    assert!(matches!(report.documents[1].outcome, DocumentOutcome::Unreadable { .. }));
    assert_eq!(
        report.diagnostic_counts.get(&DiagnosticKind::DocumentUnreadable),
        Some(&1)
    );
}

#[test]
fn findings_are_ordered_by_document_then_page() {
    let dir = three_document_folder();
    let report = scan_folder(&dir, ScanOptions::default());

    let found: Vec<_> = report
        .records
        .iter()
        .map(|r| {
            (
                r.source_filename.as_str(),
                r.raw().page_number,
                r.raw().match_text.to_lowercase(),
            )
        })
        .collect();
    assert_eq!(
        found,
        vec![
            ("a_minutes.pdf", 1, "ethics training".to_string()),
            ("c_agenda.pdf", 1, "conflict of interest".to_string()),
            ("c_agenda.pdf", 2, "nothing".to_string()),
        ]
    );
    assert_eq!(report.records[2].raw().document_index, 2);
}

#[test]
fn parallel_scan_matches_sequential_scan() {
    let dir = TempDir::new().unwrap();
    for i in 0..8 {
        write_pdf(
            dir.path(),
            &format!("doc_{:02}.pdf", i),
            &["ethics training notes", "conflict of interest"],
        );
    }

    let sequential = scan_folder(&dir, ScanOptions::default().sequential());
    let parallel = scan_folder(&dir, ScanOptions::default().concurrency(4));

    assert_eq!(sequential.status, RunStatus::Success);
    assert_eq!(sequential.records.len(), 16);
    assert_eq!(sequential.records, parallel.records);
}

#[test]
fn reports_are_written_even_without_findings() {
    let dir = TempDir::new().unwrap();
    write_pdf(dir.path(), "quiet.pdf", &["routine business only"]);
    let report = scan_folder(&dir, ScanOptions::default());
    assert_eq!(report.status, RunStatus::Success);
    assert!(report.records.is_empty());

    let out = TempDir::new().unwrap();
    let written: Vec<_> = sinks_for(&[ReportFormat::Json, ReportFormat::Summary], out.path())
        .iter()
        .map(|sink| sink.write(&report).unwrap())
        .collect();
    assert_eq!(written.len(), 2);

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&written[0]).unwrap()).unwrap();
    assert_eq!(json["run"]["findings"], 0);
    assert_eq!(json["sheets"]["all_findings"].as_array().unwrap().len(), 0);

    let summary = fs::read_to_string(&written[1]).unwrap();
    assert!(summary.contains("Documents without findings (1)"));
    assert!(summary.contains("quiet.pdf"));
}

#[test]
fn recursive_scan_tags_collections() {
    let dir = TempDir::new().unwrap();
    write_pdf(dir.path(), "finance/q1.pdf", &["conflict of interest"]);
    write_pdf(dir.path(), "top.pdf", &["ethics training"]);

    let documents = discover(
        dir.path(),
        &DiscoveryOptions {
            recursive: true,
            ..DiscoveryOptions::default()
        },
    )
    .unwrap();
    let report = ScanService::new(registry(), ScanOptions::default().quiet())
        .scan(documents)
        .unwrap();

    let collections: Vec<_> = report
        .records
        .iter()
        .map(|r| r.collection.as_deref())
        .collect();
    assert_eq!(collections, vec![Some("finance"), None]);
}
