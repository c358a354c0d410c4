//! Page text extraction with a primary and a fallback backend.
//!
//! For every page the primary backend is tried first. When it errors or
//! returns fewer than `min_page_chars` non-whitespace characters, the
//! fallback backend is asked for the same page. A page neither backend can
//! read becomes an empty `Failed` page; only a document that no backend can
//! open at all is an error.

pub mod backend;

use std::fs;
use std::sync::Arc;

use crate::diagnostics::{DiagnosticEvent, DiagnosticKind, DiagnosticSink};
use crate::error::DocumentError;
use crate::types::{DocumentMetadata, ExtractionMethod, PageText};

pub use backend::{
    BackendError, BackendKind, BackendResult, LoadedDocument, LopdfBackend, PdfExtractBackend,
    TextBackend,
};

/// Pages of one document, in page order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentText {
    pub pages: Vec<PageText>,
}

impl DocumentText {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Pages that did not come from the primary backend.
    pub fn degraded_pages(&self) -> impl Iterator<Item = &PageText> {
        self.pages.iter().filter(|p| p.method.is_degraded())
    }
}

/// Turns PDF documents into page text.
#[derive(Clone)]
pub struct TextExtractor {
    primary: Arc<dyn TextBackend>,
    fallback: Arc<dyn TextBackend>,
    min_page_chars: usize,
}

impl TextExtractor {
    /// Extractor with `lopdf` as primary and `pdf-extract` as fallback.
    pub fn new() -> Self {
        Self::with_backends(
            Arc::from(BackendKind::Lopdf.create_backend()),
            Arc::from(BackendKind::PdfExtract.create_backend()),
        )
    }

    /// Extractor with custom backends (for testing or alternative libraries).
    pub fn with_backends(primary: Arc<dyn TextBackend>, fallback: Arc<dyn TextBackend>) -> Self {
        Self {
            primary,
            fallback,
            min_page_chars: crate::config::default_min_page_chars(),
        }
    }

    /// Minimum non-whitespace characters for page text to count as extracted.
    pub fn min_page_chars(mut self, min: usize) -> Self {
        self.min_page_chars = min.max(1);
        self
    }

    /// Read a document from disk and extract its pages.
    pub fn extract(
        &self,
        metadata: &DocumentMetadata,
        diagnostics: &dyn DiagnosticSink,
    ) -> Result<DocumentText, DocumentError> {
        let bytes = fs::read(&metadata.source_path).map_err(|source| DocumentError::Io {
            path: metadata.source_path.clone(),
            source,
        })?;
        self.extract_bytes(
            metadata.document_index,
            &metadata.source_filename,
            &bytes,
            diagnostics,
        )
    }

    /// Extract the pages of a document held in memory.
    ///
    /// Emits exactly one of `page_extracted`, `extraction_fallback` or
    /// `extraction_failed` per page.
    pub fn extract_bytes(
        &self,
        document_index: usize,
        document: &str,
        bytes: &[u8],
        diagnostics: &dyn DiagnosticSink,
    ) -> Result<DocumentText, DocumentError> {
        let mut fallback = LazyDocument::new(self.fallback.as_ref(), bytes);

        let mut primary = match self.primary.load(bytes) {
            Ok(loaded) => Some(loaded),
            Err(primary_err) => {
                tracing::debug!(
                    document,
                    backend = self.primary.name(),
                    error = %primary_err,
                    "Primary backend could not open document"
                );
                if let Err(fallback_err) = fallback.get() {
                    return Err(DocumentError::Unreadable {
                        reason: format!(
                            "{}: {}; {}: {}",
                            self.primary.name(),
                            primary_err,
                            self.fallback.name(),
                            fallback_err
                        ),
                    });
                }
                None
            }
        };

        let page_count = match (&primary, fallback.loaded()) {
            (Some(doc), _) => doc.page_count(),
            (None, Some(doc)) => doc.page_count(),
            (None, None) => 0,
        };

        let mut pages = Vec::with_capacity(page_count as usize);
        for page_number in 1..=page_count {
            let primary_outcome = match primary.as_mut() {
                Some(doc) => doc.page_text(page_number),
                None => Err(BackendError::Parse("document not loaded".to_string())),
            };

            let primary_reason = match primary_outcome {
                Ok(text) if self.is_usable(&text) => {
                    diagnostics.emit(DiagnosticEvent::page(
                        document,
                        document_index,
                        page_number,
                        DiagnosticKind::PageExtracted,
                        format!(
                            "{} characters via {}",
                            text.chars().count(),
                            self.primary.name()
                        ),
                    ));
                    pages.push(PageText::new(
                        document_index,
                        page_number,
                        text,
                        ExtractionMethod::Primary,
                    ));
                    continue;
                }
                Ok(_) => "no usable text".to_string(),
                Err(e) => e.to_string(),
            };

            let fallback_outcome = match fallback.get() {
                Ok(doc) => doc.page_text(page_number),
                Err(e) => Err(e.clone()),
            };

            match fallback_outcome {
                Ok(text) if self.is_usable(&text) => {
                    diagnostics.emit(DiagnosticEvent::page(
                        document,
                        document_index,
                        page_number,
                        DiagnosticKind::ExtractionFallback,
                        format!(
                            "{} failed ({}), used {}",
                            self.primary.name(),
                            primary_reason,
                            self.fallback.name()
                        ),
                    ));
                    pages.push(PageText::new(
                        document_index,
                        page_number,
                        text,
                        ExtractionMethod::Fallback,
                    ));
                }
                outcome => {
                    let fallback_reason = match outcome {
                        Ok(_) => "no usable text".to_string(),
                        Err(e) => e.to_string(),
                    };
                    diagnostics.emit(DiagnosticEvent::page(
                        document,
                        document_index,
                        page_number,
                        DiagnosticKind::ExtractionFailed,
                        format!(
                            "{}: {}; {}: {}",
                            self.primary.name(),
                            primary_reason,
                            self.fallback.name(),
                            fallback_reason
                        ),
                    ));
                    pages.push(PageText::failed(document_index, page_number));
                }
            }
        }

        Ok(DocumentText { pages })
    }

    fn is_usable(&self, text: &str) -> bool {
        text.chars()
            .filter(|c| !c.is_whitespace())
            .take(self.min_page_chars)
            .count()
            >= self.min_page_chars
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// The fallback document, parsed the first time a page needs it.
struct LazyDocument<'a> {
    backend: &'a dyn TextBackend,
    bytes: &'a [u8],
    state: Option<Result<Box<dyn LoadedDocument>, BackendError>>,
}

impl<'a> LazyDocument<'a> {
    fn new(backend: &'a dyn TextBackend, bytes: &'a [u8]) -> Self {
        Self {
            backend,
            bytes,
            state: None,
        }
    }

    fn get(&mut self) -> Result<&mut Box<dyn LoadedDocument>, &BackendError> {
        let (backend, bytes) = (self.backend, self.bytes);
        self.state.get_or_insert_with(|| backend.load(bytes)).as_mut().map_err(|e| &*e)
    }

    fn loaded(&self) -> Option<&dyn LoadedDocument> {
        match &self.state {
            Some(Ok(doc)) => Some(doc.as_ref()),
            _ => None,
        }
    }
}
