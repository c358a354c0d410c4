//! Fallback backend built on `pdf-extract`.
//!
//! `pdf-extract` lays out every page in one pass over the document. The
//! per-page strings are kept and served by page number.

use super::{catch_panic, BackendError, BackendResult, LoadedDocument, TextBackend};

/// Layout-based extraction with `pdf-extract`.
#[derive(Debug, Default)]
pub struct PdfExtractBackend;

impl PdfExtractBackend {
    pub fn new() -> Self {
        Self
    }
}

impl TextBackend for PdfExtractBackend {
    fn name(&self) -> &'static str {
        "pdf-extract"
    }

    fn load(&self, bytes: &[u8]) -> BackendResult<Box<dyn LoadedDocument>> {
        let pages = catch_panic(|| {
            pdf_extract::extract_text_from_mem_by_pages(bytes)
                .map_err(|e| BackendError::Parse(e.to_string()))
        })?;
        Ok(Box::new(PagedDocument::new(pages)))
    }
}

/// Page texts produced up front, indexed by page number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PagedDocument {
    pages: Vec<String>,
}

impl PagedDocument {
    pub(crate) fn new(pages: Vec<String>) -> Self {
        Self { pages }
    }
}

impl LoadedDocument for PagedDocument {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_text(&mut self, page_number: u32) -> BackendResult<String> {
        page_number
            .checked_sub(1)
            .and_then(|index| self.pages.get(index as usize))
            .cloned()
            .ok_or(BackendError::PageOutOfRange(page_number))
    }
}
