//! Test helper utilities

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use docsift::config::{PatternConfig, TierConfig};
use docsift::diagnostics::{DiagnosticEvent, DiagnosticSink};
use docsift::extract::{BackendError, BackendResult, LoadedDocument, TextBackend};
use docsift::types::{DocumentMetadata, ExtractionMethod, PageText, RawMatch};
use docsift::PatternRegistry;

/// Registry with one pattern list per tier, labelled `priority_N`.
pub fn registry(tiers: &[&[&str]]) -> PatternRegistry {
    let tiers = tiers
        .iter()
        .enumerate()
        .map(|(i, patterns)| TierConfig::new(&format!("priority_{}", i + 1), patterns))
        .collect();
    PatternRegistry::load(&PatternConfig::new(tiers)).expect("valid test registry")
}

/// A primary-method page of document 0.
pub fn page(page_number: u32, text: &str) -> PageText {
    PageText::new(0, page_number, text.to_string(), ExtractionMethod::Primary)
}

pub fn metadata(index: usize, name: &str) -> DocumentMetadata {
    DocumentMetadata {
        document_index: index,
        source_filename: name.to_string(),
        source_path: name.into(),
        source_url: None,
        collection: None,
        document_date: None,
    }
}

/// Raw match for `needle` at its first occurrence in `text`.
pub fn raw_match(text: &str, needle: &str) -> RawMatch {
    let start = text.find(needle).expect("needle present in text");
    RawMatch {
        document_index: 0,
        page_number: 1,
        tier: 1,
        tier_label: "priority_1".to_string(),
        pattern_index: 0,
        pattern_label: needle.to_string(),
        match_text: needle.to_string(),
        start_offset: start,
        end_offset: start + needle.len(),
    }
}

/// Sink that keeps every event for inspection.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<String> {
        self.events()
            .iter()
            .map(|e| e.kind.as_str().to_string())
            .collect()
    }
}

impl DiagnosticSink for RecordingSink {
    fn emit(&self, event: DiagnosticEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Backend whose page texts are scripted per page number.
///
/// A missing page entry is a page-level error; `fail_load` makes the whole
/// document unreadable.
#[derive(Default)]
pub struct ScriptedBackend {
    pub pages: HashMap<u32, String>,
    pub page_count: u32,
    pub fail_load: bool,
    pub loads: Arc<AtomicUsize>,
}

impl ScriptedBackend {
    pub fn with_pages(pages: &[(u32, &str)], page_count: u32) -> Self {
        Self {
            pages: pages.iter().map(|(n, t)| (*n, t.to_string())).collect(),
            page_count,
            ..Self::default()
        }
    }

    pub fn unreadable() -> Self {
        Self {
            fail_load: true,
            ..Self::default()
        }
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

struct ScriptedDocument {
    pages: HashMap<u32, String>,
    page_count: u32,
}

impl LoadedDocument for ScriptedDocument {
    fn page_count(&self) -> u32 {
        self.page_count
    }

    fn page_text(&mut self, page_number: u32) -> BackendResult<String> {
        self.pages
            .get(&page_number)
            .cloned()
            .ok_or_else(|| BackendError::Page {
                page: page_number,
                reason: "scripted failure".to_string(),
            })
    }
}

impl TextBackend for ScriptedBackend {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn load(&self, _bytes: &[u8]) -> BackendResult<Box<dyn LoadedDocument>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.fail_load {
            return Err(BackendError::Parse("scripted parse failure".to_string()));
        }
        Ok(Box::new(ScriptedDocument {
            pages: self.pages.clone(),
            page_count: self.page_count,
        }))
    }
}
