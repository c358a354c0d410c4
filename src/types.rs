//! Data structures flowing through the match-extraction pipeline.
//!
//! Every stage produces a new value from the previous one:
//! `PageText` → `RawMatch` → `ContextualMatch` → `ResultRecord`.
//! None of them is mutated after construction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// How the text of a page was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// Primary backend produced usable text
    Primary,
    /// Primary backend failed or came back empty, fallback produced usable text
    Fallback,
    /// Neither backend produced usable text
    Failed,
}

impl ExtractionMethod {
    pub fn is_degraded(&self) -> bool {
        !matches!(self, ExtractionMethod::Primary)
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionMethod::Primary => write!(f, "primary"),
            ExtractionMethod::Fallback => write!(f, "fallback"),
            ExtractionMethod::Failed => write!(f, "failed"),
        }
    }
}

/// Extracted text of a single page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// Position of the document in the input order
    pub document_index: usize,
    /// 1-based page number
    pub page_number: u32,
    /// Plain text (empty when extraction failed)
    pub text: String,
    /// Which extraction path produced the text
    pub method: ExtractionMethod,
}

impl PageText {
    pub fn new(
        document_index: usize,
        page_number: u32,
        text: String,
        method: ExtractionMethod,
    ) -> Self {
        Self {
            document_index,
            page_number,
            text,
            method,
        }
    }

    /// A page neither backend could read.
    pub fn failed(document_index: usize, page_number: u32) -> Self {
        Self::new(document_index, page_number, String::new(), ExtractionMethod::Failed)
    }

    /// Length of the page text in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// A single pattern hit on a page.
///
/// Offsets are UTF-8 byte offsets into the page text and always fall on
/// character boundaries, so `text[start_offset..end_offset] == match_text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMatch {
    pub document_index: usize,
    pub page_number: u32,
    /// Priority rank of the tier (1 = highest)
    pub tier: u8,
    pub tier_label: String,
    /// Position of the pattern within its tier
    pub pattern_index: usize,
    pub pattern_label: String,
    pub match_text: String,
    pub start_offset: usize,
    pub end_offset: usize,
}

/// Outcome of capturing the text around a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextStatus {
    /// The full window was available on both sides
    Full,
    /// At least one side was clamped, some context was still captured
    Partial,
    /// No context beyond the match itself could be captured
    Unavailable,
}

impl fmt::Display for ContextStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextStatus::Full => write!(f, "full"),
            ContextStatus::Partial => write!(f, "partial"),
            ContextStatus::Unavailable => write!(f, "unavailable"),
        }
    }
}

/// A raw match together with its surrounding context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextualMatch {
    #[serde(flatten)]
    pub raw: RawMatch,
    /// Window text, absent when the status is `Unavailable`
    pub context_text: Option<String>,
    pub context_status: ContextStatus,
    /// Effective (clamped) window start, byte offset
    pub context_start: usize,
    /// Effective (clamped) window end, byte offset
    pub context_end: usize,
}

/// Document-level information attached to every record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub document_index: usize,
    pub source_filename: String,
    pub source_path: PathBuf,
    pub source_url: Option<String>,
    /// Sub-folder of the input root the document was found in
    pub collection: Option<String>,
    /// Date-like token recognised in the file name
    pub document_date: Option<String>,
}

/// The unit stored by the aggregator and handed to report sinks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    #[serde(flatten)]
    pub matched: ContextualMatch,
    pub source_filename: String,
    pub source_url: Option<String>,
    pub collection: Option<String>,
    pub document_date: Option<String>,
}

impl ResultRecord {
    pub fn new(matched: ContextualMatch, metadata: &DocumentMetadata) -> Self {
        Self {
            matched,
            source_filename: metadata.source_filename.clone(),
            source_url: metadata.source_url.clone(),
            collection: metadata.collection.clone(),
            document_date: metadata.document_date.clone(),
        }
    }

    pub fn raw(&self) -> &RawMatch {
        &self.matched.raw
    }

    /// Sort key defining the finalized order of records.
    ///
    /// Document, page, tier and offset are the primary ordering; pattern
    /// index and end offset only break ties between distinct patterns that
    /// hit at the same position.
    pub fn order_key(&self) -> (usize, u32, u8, usize, usize, usize) {
        let raw = self.raw();
        (
            raw.document_index,
            raw.page_number,
            raw.tier,
            raw.start_offset,
            raw.pattern_index,
            raw.end_offset,
        )
    }
}
