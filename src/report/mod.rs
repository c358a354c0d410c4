//! Report sinks for finished scans.
//!
//! A sink turns a `ScanReport` into a file in the output directory and
//! returns the path it wrote. Sinks are called for every completed run,
//! including cancelled runs and runs without findings.

mod json;
mod summary;

pub use json::JsonWorkbookSink;
pub use summary::TextSummarySink;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use thiserror::Error;

use crate::config::ReportFormat;
use crate::service::ScanReport;

/// Failure to write a report file.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to create output directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Consumes a finished scan report.
pub trait ReportSink {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    /// Write the report, returning the file created.
    fn write(&self, report: &ScanReport) -> Result<PathBuf, ReportError>;
}

/// Build the sinks for the requested formats, writing into `directory`.
pub fn sinks_for(formats: &[ReportFormat], directory: &Path) -> Vec<Box<dyn ReportSink>> {
    let mut sinks: Vec<Box<dyn ReportSink>> = Vec::new();
    for format in formats {
        let sink: Box<dyn ReportSink> = match format {
            ReportFormat::Json => Box::new(JsonWorkbookSink::new(directory)),
            ReportFormat::Summary => Box::new(TextSummarySink::new(directory)),
        };
        if !sinks.iter().any(|s| s.name() == sink.name()) {
            sinks.push(sink);
        }
    }
    sinks
}

/// Timestamp fragment used in report file names.
pub fn file_timestamp(at: &DateTime<Local>) -> String {
    at.format("%Y%m%d_%H%M%S").to_string()
}

fn write_file(directory: &Path, file_name: &str, contents: &[u8]) -> Result<PathBuf, ReportError> {
    fs::create_dir_all(directory).map_err(|source| ReportError::CreateDir {
        path: directory.to_path_buf(),
        source,
    })?;
    let path = directory.join(file_name);
    fs::write(&path, contents).map_err(|source| ReportError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Aggregate of findings for one key (document, collection, pattern).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Tally {
    pub total: usize,
    /// Findings per tier rank
    pub by_tier: BTreeMap<u8, usize>,
}

impl Tally {
    fn add(&mut self, tier: u8) {
        self.total += 1;
        *self.by_tier.entry(tier).or_insert(0) += 1;
    }
}

/// Findings grouped by collection; documents at the input root count as "(root)".
pub(crate) fn collection_tallies(report: &ScanReport) -> BTreeMap<String, Tally> {
    let mut tallies: BTreeMap<String, Tally> = BTreeMap::new();
    for record in &report.records {
        let key = record
            .collection
            .clone()
            .unwrap_or_else(|| ROOT_COLLECTION.to_string());
        tallies.entry(key).or_default().add(record.raw().tier);
    }
    tallies
}

/// One timeline bucket: document date and collection.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct TimelineKey {
    /// Sorts dated buckets before the undated one
    undated: bool,
    pub date: String,
    pub collection: String,
}

/// Findings grouped by document date, then collection.
///
/// Documents without a date in their file name share the "(undated)" bucket,
/// listed after every dated one.
pub(crate) fn timeline_tallies(report: &ScanReport) -> BTreeMap<TimelineKey, Tally> {
    let mut tallies: BTreeMap<TimelineKey, Tally> = BTreeMap::new();
    for record in &report.records {
        let key = TimelineKey {
            undated: record.document_date.is_none(),
            date: record
                .document_date
                .clone()
                .unwrap_or_else(|| UNDATED.to_string()),
            collection: record
                .collection
                .clone()
                .unwrap_or_else(|| ROOT_COLLECTION.to_string()),
        };
        tallies.entry(key).or_default().add(record.raw().tier);
    }
    tallies
}

/// Matched terms, lower-cased, with how often each was found.
///
/// Sorted by count descending, then alphabetically.
pub(crate) fn term_frequency(report: &ScanReport) -> Vec<(String, u8, usize)> {
    let mut counts: BTreeMap<(String, u8), usize> = BTreeMap::new();
    for record in &report.records {
        let raw = record.raw();
        let term = crate::context::collapse(&raw.match_text).to_lowercase();
        *counts.entry((term, raw.tier)).or_insert(0) += 1;
    }
    let mut terms: Vec<_> = counts
        .into_iter()
        .map(|((term, tier), count)| (term, tier, count))
        .collect();
    terms.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(&b.0)));
    terms
}

pub(crate) const ROOT_COLLECTION: &str = "(root)";
pub(crate) const UNDATED: &str = "(undated)";
