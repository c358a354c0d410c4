//! Error types for the scanning pipeline.
//!
//! - `ConfigurationError` - invalid pattern or scan configuration, fatal before a run starts
//! - `InvalidStateError` - aggregator used after it was finalized
//! - `DocumentError` - a single document could not be processed, recorded and skipped
//!
//! Page-level problems are never errors: they are expressed through
//! `ExtractionMethod`, `ContextStatus` and diagnostics.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Invalid configuration detected before any document is touched.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("No priority tiers configured")]
    NoTiers,

    #[error("Tier '{label}' has no patterns")]
    EmptyTier { label: String },

    #[error("Tier '{label}' declares priority {priority}, expected a value between 1 and {max}")]
    PriorityOutOfRange { label: String, priority: u8, max: usize },

    #[error("Priority {priority} is declared by more than one tier")]
    DuplicatePriority { priority: u8 },

    #[error("Tier label '{label}' is used more than once")]
    DuplicateTierLabel { label: String },

    #[error("Too many tiers: {count} (at most 255 are supported)")]
    TooManyTiers { count: usize },

    #[error("Pattern '{pattern}' in tier '{tier}' is invalid: {source}")]
    InvalidPattern {
        tier: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Pattern '{pattern}' in tier '{tier}' can match an empty span")]
    EmptyMatchPattern { tier: String, pattern: String },

    #[error("Invalid setting '{key}': {reason}")]
    InvalidSetting { key: &'static str, reason: String },
}

/// Contract violation on the result aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidStateError {
    #[error("Cannot add results after the aggregator was finalized")]
    AddAfterFinalize,
}

/// Why a document was skipped.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Document is unreadable: {reason}")]
    Unreadable { reason: String },

    #[error("Extraction timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Extraction worker stopped unexpectedly")]
    WorkerLost,
}

impl DocumentError {
    /// Short machine-friendly kind used in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            DocumentError::Io { .. }
            | DocumentError::Unreadable { .. }
            | DocumentError::WorkerLost => "unreadable",
            DocumentError::TimedOut(_) => "timed_out",
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, DocumentError::TimedOut(_))
    }
}
