//! Progress reporting for document scans.
//!
//! Thread-safe progress tracking; workers report completed documents with
//! lock-free atomic updates and the reporter redraws a single stderr line.

use humansize::{format_size, DECIMAL};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Default progress reporter that writes to stderr.
pub struct DefaultProgressReporter {
    /// Current count of finished documents
    completed: Arc<AtomicUsize>,
    /// Total number of documents
    total: usize,
    /// Whether to show output (disabled in quiet mode or when stderr is not a terminal)
    show_output: bool,
    /// Whether progress has started
    started: AtomicBool,
}

impl DefaultProgressReporter {
    /// Create a reporter that draws only when stderr is a terminal.
    pub fn new(total: usize) -> Self {
        Self {
            completed: Arc::new(AtomicUsize::new(0)),
            total,
            show_output: atty::is(atty::Stream::Stderr),
            started: AtomicBool::new(false),
        }
    }

    /// Create a progress reporter with output disabled.
    pub fn quiet(total: usize) -> Self {
        Self {
            completed: Arc::new(AtomicUsize::new(0)),
            total,
            show_output: false,
            started: AtomicBool::new(false),
        }
    }

    /// Report that the scan is starting.
    pub fn start(&self, document_count: usize, total_bytes: u64, workers: usize) {
        if !self.show_output {
            return;
        }

        if self
            .started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            eprintln!(
                "Scanning {} document{} ({}, {} worker{})",
                document_count,
                plural(document_count),
                format_size(total_bytes, DECIMAL),
                workers,
                plural(workers)
            );
        }
    }

    /// Report that one document has finished.
    ///
    /// Returns the new count of finished documents.
    pub fn document_completed(&self, name: &str) -> usize {
        let completed = self.completed.fetch_add(1, Ordering::SeqCst) + 1;

        if self.show_output {
            eprint!(
                "\r\x1b[2K  [{}/{}] {}",
                completed,
                self.total,
                truncate_string(name, 48)
            );
            let _ = io::stderr().flush();
        }
        completed
    }

    /// Report the end of the scan.
    pub fn finish(&self, records: usize, failed_documents: usize, cancelled: bool) {
        if !self.show_output {
            return;
        }

        // Clear the progress line
        eprint!("\r\x1b[2K");
        if cancelled {
            eprintln!(
                "Scan cancelled after {}/{} documents, {} finding{} kept",
                self.completed.load(Ordering::SeqCst),
                self.total,
                records,
                plural(records)
            );
        } else if failed_documents > 0 {
            eprintln!(
                "Scan partially complete: {} finding{}, {} document{} could not be read",
                records,
                plural(records),
                failed_documents,
                plural(failed_documents)
            );
        } else {
            eprintln!("Scan complete: {} finding{}", records, plural(records));
        }
    }

    /// Get current progress (completed, total).
    pub fn get_progress(&self) -> (usize, usize) {
        (self.completed.load(Ordering::SeqCst), self.total)
    }

    /// Get the completed counter for sharing.
    pub fn completed_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.completed)
    }
}

/// Truncate a string to a maximum length, adding ellipsis if needed.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    } else {
        s.chars().take(max_len).collect()
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
