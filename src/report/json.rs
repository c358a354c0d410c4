//! JSON workbook sink.
//!
//! Writes one JSON object whose `sheets` mirror the tabs of a findings
//! spreadsheet: every finding, then summaries by tier, document, collection,
//! document date and matched term, then degraded pages and failed documents.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::{
    collection_tallies, file_timestamp, term_frequency, timeline_tallies, write_file, ReportError,
    ReportSink,
};
use crate::result::FailedDocumentInfo;
use crate::service::{DocumentOutcome, RunStatus, ScanReport};
use crate::types::{ContextStatus, ExtractionMethod, ResultRecord};

/// Writes `docsift_findings_<timestamp>.json`.
pub struct JsonWorkbookSink {
    directory: PathBuf,
}

impl JsonWorkbookSink {
    pub fn new(directory: &Path) -> Self {
        Self {
            directory: directory.to_path_buf(),
        }
    }

    pub fn file_name(report: &ScanReport) -> String {
        format!("docsift_findings_{}.json", file_timestamp(&report.started_at))
    }
}

impl ReportSink for JsonWorkbookSink {
    fn name(&self) -> &'static str {
        "json"
    }

    fn write(&self, report: &ScanReport) -> Result<PathBuf, ReportError> {
        let workbook = Workbook::build(report);
        let mut encoded = serde_json::to_vec_pretty(&workbook)?;
        encoded.push(b'\n');
        write_file(&self.directory, &Self::file_name(report), &encoded)
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct Workbook<'a> {
    run: RunSheet<'a>,
    sheets: Sheets<'a>,
}

#[derive(Debug, Serialize)]
struct RunSheet<'a> {
    status: RunStatus,
    started_at: String,
    finished_at: String,
    duration_ms: u128,
    context_window: usize,
    documents: usize,
    findings: usize,
    failed_documents: usize,
    full_context_rate: f64,
    context_status: BTreeMap<ContextStatus, usize>,
    diagnostics: &'a BTreeMap<crate::diagnostics::DiagnosticKind, usize>,
}

#[derive(Debug, Serialize)]
struct Sheets<'a> {
    all_findings: &'a [ResultRecord],
    tier_summary: Vec<TierRow<'a>>,
    document_summary: Vec<DocumentRow<'a>>,
    collection_summary: Vec<CollectionRow>,
    timeline: Vec<TimelineRow>,
    pattern_frequency: Vec<TermRow>,
    degraded_pages: Vec<DegradedRow<'a>>,
    failed_documents: &'a [FailedDocumentInfo],
}

#[derive(Debug, Serialize)]
struct TierRow<'a> {
    rank: u8,
    label: &'a str,
    findings: usize,
    documents: usize,
}

#[derive(Debug, Serialize)]
struct DocumentRow<'a> {
    document_index: usize,
    source_filename: &'a str,
    collection: Option<&'a str>,
    document_date: Option<&'a str>,
    source_url: Option<&'a str>,
    outcome: &'static str,
    pages: usize,
    findings: usize,
    /// Findings per tier label
    by_tier: BTreeMap<&'a str, usize>,
}

#[derive(Debug, Serialize)]
struct CollectionRow {
    collection: String,
    findings: usize,
    by_tier: BTreeMap<u8, usize>,
}

#[derive(Debug, Serialize)]
struct TimelineRow {
    document_date: String,
    collection: String,
    findings: usize,
    by_tier: BTreeMap<u8, usize>,
}

#[derive(Debug, Serialize)]
struct TermRow {
    term: String,
    tier: u8,
    count: usize,
}

#[derive(Debug, Serialize)]
struct DegradedRow<'a> {
    source_filename: &'a str,
    page_number: u32,
    method: ExtractionMethod,
}

impl<'a> Workbook<'a> {
    pub(crate) fn build(report: &'a ScanReport) -> Self {
        Self {
            run: RunSheet {
                status: report.status,
                started_at: report.started_at.to_rfc3339(),
                finished_at: report.finished_at.to_rfc3339(),
                duration_ms: report.duration_ms,
                context_window: report.context_window,
                documents: report.documents.len(),
                findings: report.records.len(),
                failed_documents: report.failed_documents.len(),
                full_context_rate: report.full_context_rate(),
                context_status: report.context_counts(),
                diagnostics: &report.diagnostic_counts,
            },
            sheets: Sheets {
                all_findings: &report.records,
                tier_summary: tier_rows(report),
                document_summary: document_rows(report),
                collection_summary: collection_tallies(report)
                    .into_iter()
                    .map(|(collection, tally)| CollectionRow {
                        collection,
                        findings: tally.total,
                        by_tier: tally.by_tier,
                    })
                    .collect(),
                timeline: timeline_tallies(report)
                    .into_iter()
                    .map(|(key, tally)| TimelineRow {
                        document_date: key.date,
                        collection: key.collection,
                        findings: tally.total,
                        by_tier: tally.by_tier,
                    })
                    .collect(),
                pattern_frequency: term_frequency(report)
                    .into_iter()
                    .map(|(term, tier, count)| TermRow { term, tier, count })
                    .collect(),
                degraded_pages: report
                    .documents
                    .iter()
                    .flat_map(|doc| {
                        doc.degraded_pages.iter().map(move |page| DegradedRow {
                            source_filename: &doc.metadata.source_filename,
                            page_number: page.page_number,
                            method: page.method,
                        })
                    })
                    .collect(),
                failed_documents: &report.failed_documents,
            },
        }
    }
}

fn tier_rows(report: &ScanReport) -> Vec<TierRow<'_>> {
    report
        .tiers
        .iter()
        .map(|tier| {
            let mut documents: Vec<usize> = report
                .records
                .iter()
                .filter(|r| r.raw().tier == tier.rank)
                .map(|r| r.raw().document_index)
                .collect();
            documents.dedup();
            TierRow {
                rank: tier.rank,
                label: &tier.label,
                findings: report.counts_by_tier.get(&tier.rank).copied().unwrap_or(0),
                documents: documents.len(),
            }
        })
        .collect()
}

fn document_rows(report: &ScanReport) -> Vec<DocumentRow<'_>> {
    report
        .documents
        .iter()
        .map(|doc| {
            let mut by_tier = BTreeMap::new();
            for record in report
                .records
                .iter()
                .filter(|r| r.raw().document_index == doc.metadata.document_index)
            {
                *by_tier.entry(record.raw().tier_label.as_str()).or_insert(0) += 1;
            }
            DocumentRow {
                document_index: doc.metadata.document_index,
                source_filename: &doc.metadata.source_filename,
                collection: doc.metadata.collection.as_deref(),
                document_date: doc.metadata.document_date.as_deref(),
                source_url: doc.metadata.source_url.as_deref(),
                outcome: outcome_name(&doc.outcome),
                pages: doc.pages,
                findings: doc.matches,
                by_tier,
            }
        })
        .collect()
}

fn outcome_name(outcome: &DocumentOutcome) -> &'static str {
    match outcome {
        DocumentOutcome::Scanned => "scanned",
        DocumentOutcome::Unreadable { .. } => "unreadable",
        DocumentOutcome::TimedOut { .. } => "timed_out",
        DocumentOutcome::Skipped => "skipped",
    }
}
