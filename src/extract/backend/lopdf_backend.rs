//! Primary backend built on `lopdf`.

use lopdf::Document;

use super::{catch_panic, BackendError, BackendResult, LoadedDocument, TextBackend};

/// Decodes page content streams with `lopdf`.
#[derive(Debug, Default)]
pub struct LopdfBackend;

impl LopdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl TextBackend for LopdfBackend {
    fn name(&self) -> &'static str {
        "lopdf"
    }

    fn load(&self, bytes: &[u8]) -> BackendResult<Box<dyn LoadedDocument>> {
        let document = catch_panic(|| {
            Document::load_mem(bytes).map_err(|e| BackendError::Parse(e.to_string()))
        })?;
        let pages: Vec<u32> = document.get_pages().keys().copied().collect();
        Ok(Box::new(LopdfDocument { document, pages }))
    }
}

struct LopdfDocument {
    document: Document,
    /// Page numbers as lopdf numbers them, ascending
    pages: Vec<u32>,
}

impl LoadedDocument for LopdfDocument {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_text(&mut self, page_number: u32) -> BackendResult<String> {
        if page_number == 0 || page_number as usize > self.pages.len() {
            return Err(BackendError::PageOutOfRange(page_number));
        }
        let lopdf_page = self.pages[page_number as usize - 1];
        let document = &self.document;
        catch_panic(|| {
            document
                .extract_text(&[lopdf_page])
                .map_err(|e| BackendError::Page {
                    page: page_number,
                    reason: e.to_string(),
                })
        })
    }
}
