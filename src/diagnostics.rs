//! Diagnostic events emitted while a scan runs.
//!
//! Every degraded outcome (fallback extraction, failed page, truncated page,
//! missing context, unreadable document) produces an event instead of an
//! error. Events go to a [`DiagnosticSink`]; the default [`DiagnosticLog`]
//! keeps them for the report and forwards each one to `tracing`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Mutex;

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    PageExtracted,
    ExtractionFallback,
    ExtractionFailed,
    PageTruncated,
    MatchFound,
    ContextUnavailable,
    DocumentUnreadable,
    DocumentTimedOut,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::PageExtracted => "page_extracted",
            DiagnosticKind::ExtractionFallback => "extraction_fallback",
            DiagnosticKind::ExtractionFailed => "extraction_failed",
            DiagnosticKind::PageTruncated => "page_truncated",
            DiagnosticKind::MatchFound => "match_found",
            DiagnosticKind::ContextUnavailable => "context_unavailable",
            DiagnosticKind::DocumentUnreadable => "document_unreadable",
            DiagnosticKind::DocumentTimedOut => "document_timed_out",
        }
    }

    /// Kinds that indicate degraded output and are worth keeping in a report.
    pub fn is_degradation(&self) -> bool {
        !matches!(self, DiagnosticKind::PageExtracted | DiagnosticKind::MatchFound)
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticEvent {
    /// Source file name of the document
    pub document: String,
    pub document_index: usize,
    /// Page number, absent for document-level events
    pub page: Option<u32>,
    pub kind: DiagnosticKind,
    pub detail: String,
}

impl DiagnosticEvent {
    pub fn page(
        document: &str,
        document_index: usize,
        page: u32,
        kind: DiagnosticKind,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            document: document.to_string(),
            document_index,
            page: Some(page),
            kind,
            detail: detail.into(),
        }
    }

    pub fn document(
        document: &str,
        document_index: usize,
        kind: DiagnosticKind,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            document: document.to_string(),
            document_index,
            page: None,
            kind,
            detail: detail.into(),
        }
    }
}

/// Receiver of diagnostic events.
///
/// Sinks are shared between worker threads.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, event: DiagnosticEvent);
}

/// Sink that discards everything.
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn emit(&self, _event: DiagnosticEvent) {}
}

/// Forward an event to `tracing` at the level matching its kind.
pub fn trace_event(event: &DiagnosticEvent) {
    let page = event.page.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string());
    match event.kind {
        DiagnosticKind::PageExtracted => {
            tracing::trace!(
                document = %event.document,
                page = %page,
                kind = %event.kind,
                "{}",
                event.detail
            )
        }
        DiagnosticKind::MatchFound => {
            tracing::debug!(
                document = %event.document,
                page = %page,
                kind = %event.kind,
                "{}",
                event.detail
            )
        }
        DiagnosticKind::ExtractionFallback => {
            tracing::info!(
                document = %event.document,
                page = %page,
                kind = %event.kind,
                "{}",
                event.detail
            )
        }
        DiagnosticKind::ExtractionFailed
        | DiagnosticKind::PageTruncated
        | DiagnosticKind::ContextUnavailable
        | DiagnosticKind::DocumentTimedOut => {
            tracing::warn!(
                document = %event.document,
                page = %page,
                kind = %event.kind,
                "{}",
                event.detail
            )
        }
        DiagnosticKind::DocumentUnreadable => {
            tracing::error!(document = %event.document, kind = %event.kind, "{}", event.detail)
        }
    }
}

/// Default sink: records every event and forwards it to `tracing`.
///
/// `match_found` and `page_extracted` events are only counted, since a large
/// collection produces one per hit and per page.
#[derive(Default)]
pub struct DiagnosticLog {
    inner: Mutex<LogState>,
}

#[derive(Default)]
struct LogState {
    events: Vec<DiagnosticEvent>,
    counts: BTreeMap<DiagnosticKind, usize>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded degradation events, in emission order.
    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.lock().events.clone()
    }

    /// Number of events seen per kind, including the ones not retained.
    pub fn counts(&self) -> BTreeMap<DiagnosticKind, usize> {
        self.lock().counts.clone()
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.lock().counts.get(&kind).copied().unwrap_or(0)
    }

    /// Consume the log, returning retained events and per-kind counts.
    pub fn into_parts(self) -> (Vec<DiagnosticEvent>, BTreeMap<DiagnosticKind, usize>) {
        let state = self.inner.into_inner().unwrap_or_else(|e| e.into_inner());
        (state.events, state.counts)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LogState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl DiagnosticSink for DiagnosticLog {
    fn emit(&self, event: DiagnosticEvent) {
        trace_event(&event);
        let mut state = self.lock();
        *state.counts.entry(event.kind).or_insert(0) += 1;
        if event.kind.is_degradation() {
            state.events.push(event);
        }
    }
}

/// Holds events back until a document finishes.
///
/// A document that times out must not leave half of its page events in the
/// shared log, so workers collect into a buffer and replay it on success.
#[derive(Default)]
pub struct DiagnosticBuffer {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl DiagnosticBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forward buffered events to `sink` in emission order.
    pub fn replay_into(self, sink: &dyn DiagnosticSink) {
        let events = self.events.into_inner().unwrap_or_else(|e| e.into_inner());
        for event in events {
            sink.emit(event);
        }
    }
}

impl DiagnosticSink for DiagnosticBuffer {
    fn emit(&self, event: DiagnosticEvent) {
        let mut events = self.events.lock().unwrap_or_else(|e| e.into_inner());
        events.push(event);
    }
}
