//! Finding the documents to scan.
//!
//! Documents are the `.pdf` files (extension matched case-insensitively) in
//! the input folder, plus its sub-folders in recursive mode. They are sorted
//! by path, and that order defines the document index used everywhere else.

use anyhow::{Context, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::types::DocumentMetadata;

/// Options for folder discovery.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    pub recursive: bool,
    /// Source URL per file name
    pub sources: BTreeMap<String, String>,
}

/// List the PDF documents under `root` and build their metadata.
pub fn discover(root: &Path, options: &DiscoveryOptions) -> Result<Vec<DocumentMetadata>> {
    if !root.is_dir() {
        anyhow::bail!("Input folder not found: {}", root.display());
    }

    let mut paths = Vec::new();
    collect_pdfs(root, options.recursive, &mut paths)?;
    paths.sort();

    let documents = paths
        .into_iter()
        .enumerate()
        .map(|(index, path)| metadata_for(root, path, index, &options.sources))
        .collect();
    Ok(documents)
}

fn collect_pdfs(dir: &Path, recursive: bool, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to read directory: {:?}", dir))?;

    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to read directory: {:?}", dir))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .with_context(|| format!("Failed to inspect: {:?}", path))?;

        if file_type.is_dir() {
            if recursive {
                collect_pdfs(&path, recursive, out)?;
            }
        } else if is_pdf(&path) {
            out.push(path);
        }
    }
    Ok(())
}

/// Whether the path has a `.pdf` extension, ignoring case.
pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Build metadata for a single document path.
pub fn metadata_for(
    root: &Path,
    path: PathBuf,
    index: usize,
    sources: &BTreeMap<String, String>,
) -> DocumentMetadata {
    let source_filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    DocumentMetadata {
        document_index: index,
        source_url: sources.get(&source_filename).cloned(),
        collection: collection_of(root, &path),
        document_date: date_in_filename(&source_filename),
        source_filename,
        source_path: path,
    }
}

/// Sub-folder of `root` containing `path`, with `/` separators.
pub fn collection_of(root: &Path, path: &Path) -> Option<String> {
    let parent = path.parent()?.strip_prefix(root).ok()?;
    let parts: Vec<_> = parent
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

fn date_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(concat!(
                r"(\d{1,2}[-/_.]\d{1,2}[-/_.]\d{2,4})",
                r"|([A-Za-z]+\s+\d{1,2},?\s+\d{4})",
                r"|(\d{4}-\d{2}-\d{2})",
            ))
            .ok()
        })
        .as_ref()
}

/// First date-like token in a file name (`12-05-2023`, `March 5, 2024`, `2024-01-05`).
pub fn date_in_filename(name: &str) -> Option<String> {
    let stem = Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string());
    let normalized = stem.replace('_', " ");
    date_pattern()?
        .find(&normalized)
        .map(|m| m.as_str().trim().to_string())
}
