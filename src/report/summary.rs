//! Plain-text summary sink.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use super::{
    collection_tallies, file_timestamp, term_frequency, write_file, ReportError, ReportSink,
};
use crate::service::ScanReport;

/// Characters of context shown per tier-1 finding.
const PREVIEW_CHARS: usize = 200;
/// Matched terms listed in the frequency section.
const TOP_TERMS: usize = 20;

const RULE: &str = "================================================================";

/// Writes `docsift_summary_<timestamp>.txt`.
pub struct TextSummarySink {
    directory: PathBuf,
}

impl TextSummarySink {
    pub fn new(directory: &Path) -> Self {
        Self {
            directory: directory.to_path_buf(),
        }
    }

    pub fn file_name(report: &ScanReport) -> String {
        format!("docsift_summary_{}.txt", file_timestamp(&report.started_at))
    }
}

impl ReportSink for TextSummarySink {
    fn name(&self) -> &'static str {
        "summary"
    }

    fn write(&self, report: &ScanReport) -> Result<PathBuf, ReportError> {
        let text = render(report);
        write_file(&self.directory, &Self::file_name(report), text.as_bytes())
    }
}

/// Render the summary text.
pub fn render(report: &ScanReport) -> String {
    // Writing to a String cannot fail
    let mut out = String::new();
    let _ = write_overview(&mut out, report);
    let _ = write_tiers(&mut out, report);
    let _ = write_collections(&mut out, report);
    let _ = write_top_tier(&mut out, report);
    let _ = write_terms(&mut out, report);
    let _ = write_quiet_documents(&mut out, report);
    let _ = write_degraded(&mut out, report);
    out
}

fn heading(out: &mut String, title: &str) -> std::fmt::Result {
    writeln!(out)?;
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", "-".repeat(title.len()))
}

fn write_overview(out: &mut String, report: &ScanReport) -> std::fmt::Result {
    writeln!(out, "{}", RULE)?;
    writeln!(out, "docsift scan summary")?;
    writeln!(out, "{}", RULE)?;
    writeln!(out, "Started:            {}", report.started_at.format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(out, "Status:             {}", report.status)?;
    writeln!(out, "Documents:          {}", report.documents.len())?;
    writeln!(out, "Failed documents:   {}", report.failed_documents.len())?;
    writeln!(out, "Total findings:     {}", report.records.len())?;
    writeln!(out, "Context window:     {} characters", report.context_window)?;
    writeln!(out, "Full context rate:  {:.1}%", report.full_context_rate())?;
    writeln!(out, "Duration:           {:.1}s", report.duration_ms as f64 / 1000.0)
}

fn write_tiers(out: &mut String, report: &ScanReport) -> std::fmt::Result {
    heading(out, "Findings by tier")?;
    let total = report.records.len();
    for tier in &report.tiers {
        let count = report.counts_by_tier.get(&tier.rank).copied().unwrap_or(0);
        writeln!(
            out,
            "  {:>2}. {:<24} {:>6}  ({:.1}%)",
            tier.rank,
            tier.label,
            count,
            percent(count, total)
        )?;
    }
    Ok(())
}

fn write_collections(out: &mut String, report: &ScanReport) -> std::fmt::Result {
    let tallies = collection_tallies(report);
    if tallies.is_empty() {
        return Ok(());
    }
    heading(out, "Findings by collection")?;
    for (collection, tally) in tallies {
        writeln!(out, "  {:<32} {:>6}", collection, tally.total)?;
    }
    Ok(())
}

fn write_top_tier(out: &mut String, report: &ScanReport) -> std::fmt::Result {
    let Some(top) = report.tiers.first() else {
        return Ok(());
    };
    let records: Vec<_> = report
        .records
        .iter()
        .filter(|r| r.raw().tier == top.rank)
        .collect();

    heading(out, &format!("{} findings ({})", top.label, records.len()))?;
    if records.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for record in records {
        let raw = record.raw();
        writeln!(
            out,
            "  {} p.{}  \"{}\"  [{}]",
            record.source_filename, raw.page_number, raw.match_text, record.matched.context_status
        )?;
        if let Some(context) = &record.matched.context_text {
            writeln!(out, "      {}", preview(context))?;
        }
    }
    Ok(())
}

fn write_terms(out: &mut String, report: &ScanReport) -> std::fmt::Result {
    let terms = term_frequency(report);
    if terms.is_empty() {
        return Ok(());
    }
    heading(out, "Most frequent terms")?;
    for (term, tier, count) in terms.into_iter().take(TOP_TERMS) {
        let label = report.tier_label(tier).unwrap_or("?");
        writeln!(out, "  {:>6}  {:<40} {}", count, term, label)?;
    }
    Ok(())
}

fn write_quiet_documents(out: &mut String, report: &ScanReport) -> std::fmt::Result {
    let quiet: Vec<_> = report.documents_without_findings().collect();
    if quiet.is_empty() {
        return Ok(());
    }
    heading(out, &format!("Documents without findings ({})", quiet.len()))?;
    for doc in quiet {
        writeln!(out, "  {}", doc.metadata.source_filename)?;
    }
    Ok(())
}

fn write_degraded(out: &mut String, report: &ScanReport) -> std::fmt::Result {
    let degraded: Vec<_> = report
        .documents
        .iter()
        .filter(|d| !d.degraded_pages.is_empty())
        .collect();
    if degraded.is_empty() && report.failed_documents.is_empty() {
        return Ok(());
    }

    heading(out, "Extraction problems")?;
    for doc in degraded {
        let pages: Vec<String> = doc
            .degraded_pages
            .iter()
            .map(|p| format!("{} ({})", p.page_number, p.method))
            .collect();
        writeln!(out, "  {}: pages {}", doc.metadata.source_filename, pages.join(", "))?;
    }
    for failed in &report.failed_documents {
        writeln!(out, "  {}: {} - {}", failed.source_filename, failed.kind, failed.error)?;
    }
    Ok(())
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

/// First `PREVIEW_CHARS` characters, with an ellipsis when cut.
fn preview(context: &str) -> String {
    let mut chars = context.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
