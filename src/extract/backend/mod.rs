//! PDF text backends.
//!
//! This module provides the Strategy pattern for the libraries that turn PDF
//! bytes into page text. The extractor holds a primary and a fallback
//! backend and never needs to know which library sits behind either.
//!
//! # Supported Backends
//!
//! - **lopdf**: per-page content stream decoding (primary)
//! - **pdf-extract**: layout-based extraction, page by page (fallback)

mod lopdf_backend;
mod pdf_extract_backend;

pub use lopdf_backend::LopdfBackend;
pub use pdf_extract_backend::PdfExtractBackend;

use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Trait for PDF text backends (Strategy pattern).
///
/// Implementors must be thread-safe as one backend instance is shared by
/// every worker during parallel scans.
pub trait TextBackend: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &'static str;

    /// Parse a document from its raw bytes.
    fn load(&self, bytes: &[u8]) -> BackendResult<Box<dyn LoadedDocument>>;
}

/// A document parsed by a backend.
pub trait LoadedDocument: Send {
    /// Number of pages the backend sees.
    fn page_count(&self) -> u32;

    /// Text of a 1-based page.
    fn page_text(&mut self, page_number: u32) -> BackendResult<String>;
}

/// Backends available for the primary and fallback slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    Lopdf,
    PdfExtract,
}

impl BackendKind {
    /// Create the backend for this kind.
    pub fn create_backend(&self) -> Box<dyn TextBackend> {
        match self {
            BackendKind::Lopdf => Box::new(LopdfBackend::new()),
            BackendKind::PdfExtract => Box::new(PdfExtractBackend::new()),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Lopdf => write!(f, "lopdf"),
            BackendKind::PdfExtract => write!(f, "pdf-extract"),
        }
    }
}

/// Errors from text backends.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("Failed to parse document: {0}")]
    Parse(String),

    #[error("Failed to extract page {page}: {reason}")]
    Page { page: u32, reason: String },

    #[error("Page {0} does not exist")]
    PageOutOfRange(u32),

    #[error("Backend panicked: {0}")]
    Panicked(String),
}

/// Run library code that may panic on malformed input.
///
/// A panic becomes `BackendError::Panicked` instead of unwinding through a
/// worker thread.
pub(crate) fn catch_panic<T>(f: impl FnOnce() -> BackendResult<T>) -> BackendResult<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(BackendError::Panicked(message))
        }
    }
}
