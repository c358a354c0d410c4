//! ScanService facade for orchestrating a scan.
//!
//! This module provides the main entry point for scanning a set of PDF
//! documents. The `ScanService` wires every pipeline stage together.
//!
//! # Workflow
//!
//! 1. Extract page text for a document (under the per-document timeout)
//! 2. Run the pattern registry over every page
//! 3. Capture context around every match
//! 4. Hand contextual matches to the aggregator
//! 5. Repeat per document, sequentially or on the worker pool
//! 6. Finalize the aggregator and assemble the `ScanReport`

use std::collections::BTreeMap;
use std::fs;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::cancel::CancelToken;
use crate::config::ScanConfig;
use crate::context::ContextExtractor;
use crate::diagnostics::{
    DiagnosticBuffer, DiagnosticEvent, DiagnosticKind, DiagnosticLog, DiagnosticSink, NullSink,
};
use crate::error::{DocumentError, InvalidStateError};
use crate::extract::TextExtractor;
use crate::progress::DefaultProgressReporter;
use crate::registry::PatternRegistry;
use crate::result::{FailedDocumentInfo, ResultAggregator};
use crate::scanner::MatchScanner;
use crate::types::{
    ContextStatus, ContextualMatch, DocumentMetadata, ExtractionMethod, PageText, ResultRecord,
};
use crate::worker::{run_with_timeout, ParallelExecutor, WorkerScaler};

/// Default per-document extraction timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration options for a scan.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Characters of context on each side of a match
    pub context_window: usize,
    /// Page length (characters) above which a truncation diagnostic is emitted
    pub max_page_text_length: usize,
    /// Documents processed at once (0 = one per CPU)
    pub concurrency: usize,
    /// Per-document extraction timeout (None = unlimited)
    pub timeout: Option<Duration>,
    /// Non-whitespace characters a page needs before primary text is accepted
    pub min_page_chars: usize,
    /// Collapse whitespace runs in captured context
    pub collapse_whitespace: bool,
    /// Quiet mode (suppress progress output)
    pub quiet: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::from_config(&ScanConfig::default())
    }
}

impl ScanOptions {
    /// Options matching a `[scan]` config section.
    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            context_window: config.context_window,
            max_page_text_length: config.max_page_text_length,
            concurrency: config.concurrency,
            timeout: match config.document_timeout_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            min_page_chars: config.min_page_chars,
            collapse_whitespace: config.collapse_whitespace,
            quiet: false,
        }
    }

    /// Set the context window.
    pub fn window(mut self, chars: usize) -> Self {
        self.context_window = chars;
        self
    }

    /// Set the worker count (0 = one per CPU).
    pub fn concurrency(mut self, workers: usize) -> Self {
        self.concurrency = workers;
        self
    }

    /// Set the per-document timeout in seconds; 0 disables it.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = if secs == 0 { None } else { Some(Duration::from_secs(secs)) };
        self
    }

    /// Set the per-document timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Process one document at a time.
    pub fn sequential(mut self) -> Self {
        self.concurrency = 1;
        self
    }

    /// Enable quiet mode.
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }
}

/// Overall outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every document was processed (pages may still be degraded)
    Success,
    /// At least one document was unreadable or timed out
    PartialFailure,
    /// Stopped by a cancellation request
    Cancelled,
}

impl RunStatus {
    /// Process exit code for this status.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunStatus::Success => 0,
            RunStatus::PartialFailure => 2,
            RunStatus::Cancelled => 130,
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Success => write!(f, "success"),
            RunStatus::PartialFailure => write!(f, "partial_failure"),
            RunStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// What happened to a single document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum DocumentOutcome {
    Scanned,
    Unreadable { reason: String },
    TimedOut { after_ms: u128 },
    /// Not started because the run was cancelled
    Skipped,
}

impl DocumentOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, DocumentOutcome::Unreadable { .. } | DocumentOutcome::TimedOut { .. })
    }
}

/// A page that did not come from the primary backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DegradedPage {
    pub page_number: u32,
    pub method: ExtractionMethod,
}

/// Per-document summary.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    #[serde(flatten)]
    pub metadata: DocumentMetadata,
    #[serde(flatten)]
    pub outcome: DocumentOutcome,
    pub pages: usize,
    pub degraded_pages: Vec<DegradedPage>,
    pub matches: usize,
}

impl DocumentReport {
    fn new(metadata: DocumentMetadata, outcome: DocumentOutcome) -> Self {
        Self {
            metadata,
            outcome,
            pages: 0,
            degraded_pages: Vec::new(),
            matches: 0,
        }
    }
}

/// A tier as shown in reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierSummary {
    pub rank: u8,
    pub label: String,
}

/// Result of a scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub status: RunStatus,
    /// Findings in canonical order
    pub records: Vec<ResultRecord>,
    pub tiers: Vec<TierSummary>,
    /// Findings per tier rank, every tier present
    pub counts_by_tier: BTreeMap<u8, usize>,
    pub documents: Vec<DocumentReport>,
    pub failed_documents: Vec<FailedDocumentInfo>,
    /// Degradation events, in emission order
    pub diagnostics: Vec<DiagnosticEvent>,
    /// Events seen per kind, including routine ones
    pub diagnostic_counts: BTreeMap<DiagnosticKind, usize>,
    pub context_window: usize,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub duration_ms: u128,
}

impl ScanReport {
    /// Check if every document was processed.
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Success
    }

    /// Check if some documents failed.
    pub fn is_partial(&self) -> bool {
        self.status == RunStatus::PartialFailure
    }

    pub fn tier_label(&self, rank: u8) -> Option<&str> {
        self.tiers
            .iter()
            .find(|t| t.rank == rank)
            .map(|t| t.label.as_str())
    }

    /// Findings per context status.
    pub fn context_counts(&self) -> BTreeMap<ContextStatus, usize> {
        let mut counts = BTreeMap::new();
        for status in [ContextStatus::Full, ContextStatus::Partial, ContextStatus::Unavailable] {
            counts.insert(status, 0);
        }
        for record in &self.records {
            *counts.entry(record.matched.context_status).or_insert(0) += 1;
        }
        counts
    }

    /// Share of findings with full context, in percent.
    pub fn full_context_rate(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        let full = self
            .records
            .iter()
            .filter(|r| r.matched.context_status == ContextStatus::Full)
            .count();
        full as f64 * 100.0 / self.records.len() as f64
    }

    /// Documents that were scanned but produced no findings.
    pub fn documents_without_findings(&self) -> impl Iterator<Item = &DocumentReport> {
        self.documents
            .iter()
            .filter(|d| d.outcome == DocumentOutcome::Scanned && d.matches == 0)
    }
}

/// Main service for scanning documents.
///
/// Facade pattern - coordinates extraction, matching, context capture and aggregation.
pub struct ScanService {
    registry: Arc<PatternRegistry>,
    extractor: TextExtractor,
    options: ScanOptions,
    cancel: CancelToken,
}

impl ScanService {
    /// Create a service with the default extraction backends.
    pub fn new(registry: PatternRegistry, options: ScanOptions) -> Self {
        Self::with_extractor(registry, options, TextExtractor::new())
    }

    /// Create with a custom extractor (for testing).
    pub fn with_extractor(
        registry: PatternRegistry,
        options: ScanOptions,
        extractor: TextExtractor,
    ) -> Self {
        let extractor = extractor.min_page_chars(options.min_page_chars);
        Self {
            registry: Arc::new(registry),
            extractor,
            options,
            cancel: CancelToken::new(),
        }
    }

    /// Use an externally controlled cancellation token.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn registry(&self) -> &PatternRegistry {
        &self.registry
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    fn context_extractor(&self) -> ContextExtractor {
        ContextExtractor::new(self.options.context_window)
            .collapse_whitespace(self.options.collapse_whitespace)
    }

    /// Scan documents in the given order.
    ///
    /// Per-document failures are recorded in the report; only an aggregator
    /// contract violation aborts the run.
    pub fn scan(&self, documents: Vec<DocumentMetadata>) -> Result<ScanReport, InvalidStateError> {
        let started_at = Local::now();
        let clock = Instant::now();

        let log = DiagnosticLog::new();
        let aggregator = ResultAggregator::for_registry(&self.registry);
        let workers = WorkerScaler::for_concurrency(self.options.concurrency)
            .calculate_workers(documents.len());

        let progress = if self.options.quiet {
            DefaultProgressReporter::quiet(documents.len())
        } else {
            DefaultProgressReporter::new(documents.len())
        };
        let total_bytes: u64 = documents
            .iter()
            .filter_map(|d| fs::metadata(&d.source_path).ok())
            .map(|m| m.len())
            .sum();
        progress.start(documents.len(), total_bytes, workers);

        tracing::info!(documents = documents.len(), workers, "Starting scan");

        let executor = ParallelExecutor::new(workers, &self.cancel);
        let slots = executor.execute(documents.clone(), |metadata| {
            let report = self.process_document(metadata, &aggregator, &log);
            if let Ok(report) = &report {
                progress.document_completed(&report.metadata.source_filename);
            }
            report
        });

        let mut reports = Vec::with_capacity(slots.len());
        for (metadata, slot) in documents.into_iter().zip(slots) {
            match slot {
                Some(report) => reports.push(report?),
                None => reports.push(DocumentReport::new(metadata, DocumentOutcome::Skipped)),
            }
        }

        let records = aggregator.finalize();
        let counts_by_tier = aggregator.counts_by_tier();

        let failed_documents: Vec<FailedDocumentInfo> = reports
            .iter()
            .filter_map(|r| {
                let (kind, error) = match &r.outcome {
                    DocumentOutcome::Unreadable { reason } => ("unreadable", reason.clone()),
                    DocumentOutcome::TimedOut { after_ms } => {
                        ("timed_out", format!("Extraction timed out after {}ms", after_ms))
                    }
                    _ => return None,
                };
                Some(FailedDocumentInfo {
                    document_index: r.metadata.document_index,
                    source_filename: r.metadata.source_filename.clone(),
                    kind: kind.to_string(),
                    error,
                })
            })
            .collect();

        // A cancel that lands after the last document started changes nothing
        let skipped = reports
            .iter()
            .any(|r| r.outcome == DocumentOutcome::Skipped);
        let status = if skipped {
            RunStatus::Cancelled
        } else if !failed_documents.is_empty() {
            RunStatus::PartialFailure
        } else {
            RunStatus::Success
        };

        let (diagnostics, diagnostic_counts) = log.into_parts();
        progress.finish(records.len(), failed_documents.len(), status == RunStatus::Cancelled);

        tracing::info!(
            status = %status,
            findings = records.len(),
            failed = failed_documents.len(),
            "Scan finished"
        );

        Ok(ScanReport {
            status,
            records,
            tiers: self
                .registry
                .tiers()
                .iter()
                .map(|t| TierSummary {
                    rank: t.rank,
                    label: t.label.clone(),
                })
                .collect(),
            counts_by_tier,
            documents: reports,
            failed_documents,
            diagnostics,
            diagnostic_counts,
            context_window: self.options.context_window,
            started_at,
            finished_at: Local::now(),
            duration_ms: clock.elapsed().as_millis(),
        })
    }

    /// Extract, scan and aggregate a single document.
    fn process_document(
        &self,
        metadata: DocumentMetadata,
        aggregator: &ResultAggregator,
        log: &DiagnosticLog,
    ) -> Result<DocumentReport, InvalidStateError> {
        let name = metadata.source_filename.clone();
        let index = metadata.document_index;
        tracing::debug!(document = %name, index, "Processing document");

        let extractor = self.extractor.clone();
        let job_metadata = metadata.clone();
        let extracted = run_with_timeout(self.options.timeout, move || {
            let buffer = DiagnosticBuffer::new();
            let result = extractor.extract(&job_metadata, &buffer);
            (result, buffer)
        });

        let text = match extracted {
            Ok((Ok(text), buffer)) => {
                buffer.replay_into(log);
                text
            }
            Ok((Err(err), buffer)) => {
                buffer.replay_into(log);
                return Ok(self.record_failure(metadata, err, log));
            }
            Err(err) => return Ok(self.record_failure(metadata, err, log)),
        };

        let scanner = MatchScanner::new(self.options.max_page_text_length);
        let context = self.context_extractor();
        let mut report = DocumentReport::new(metadata, DocumentOutcome::Scanned);
        report.pages = text.page_count();

        for page in &text.pages {
            if page.method.is_degraded() {
                report.degraded_pages.push(DegradedPage {
                    page_number: page.page_number,
                    method: page.method,
                });
            }
            for matched in self.contextualize(page, &name, &scanner, &context, log) {
                aggregator.add(matched, &report.metadata)?;
                report.matches += 1;
            }
        }

        Ok(report)
    }

    fn contextualize(
        &self,
        page: &PageText,
        document: &str,
        scanner: &MatchScanner,
        context: &ContextExtractor,
        diagnostics: &dyn DiagnosticSink,
    ) -> Vec<ContextualMatch> {
        scanner
            .scan(page, document, &self.registry, diagnostics)
            .iter()
            .map(|raw| {
                let matched = context.extract_context(raw, &page.text);
                if matched.context_status == ContextStatus::Unavailable {
                    diagnostics.emit(DiagnosticEvent::page(
                        document,
                        page.document_index,
                        page.page_number,
                        DiagnosticKind::ContextUnavailable,
                        format!("no context around \"{}\" at {}", raw.match_text, raw.start_offset),
                    ));
                }
                matched
            })
            .collect()
    }

    fn record_failure(
        &self,
        metadata: DocumentMetadata,
        err: DocumentError,
        log: &DiagnosticLog,
    ) -> DocumentReport {
        let (kind, outcome) = match &err {
            DocumentError::TimedOut(after) => (
                DiagnosticKind::DocumentTimedOut,
                DocumentOutcome::TimedOut {
                    after_ms: after.as_millis(),
                },
            ),
            _ => (
                DiagnosticKind::DocumentUnreadable,
                DocumentOutcome::Unreadable {
                    reason: err.to_string(),
                },
            ),
        };
        log.emit(DiagnosticEvent::document(
            &metadata.source_filename,
            metadata.document_index,
            kind,
            err.to_string(),
        ));
        DocumentReport::new(metadata, outcome)
    }

    /// Run the registry over a literal text, as if it were a single page.
    pub fn scan_text(&self, text: &str) -> Vec<ContextualMatch> {
        let page = PageText::new(0, 1, text.to_string(), ExtractionMethod::Primary);
        let scanner = MatchScanner::new(self.options.max_page_text_length);
        self.contextualize(&page, "<text>", &scanner, &self.context_extractor(), &NullSink)
    }
}
