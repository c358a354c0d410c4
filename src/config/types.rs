//! Configuration type definitions and defaults

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::ConfigurationError;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Ordered priority tiers; the first tier is priority 1 unless ranks are explicit
    #[serde(default = "default_priority_tiers")]
    pub priority_tiers: Vec<TierConfig>,
    /// Source URL per document file name
    #[serde(default)]
    pub sources: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scan: ScanConfig::default(),
            matching: MatchingConfig::default(),
            output: OutputConfig::default(),
            priority_tiers: default_priority_tiers(),
            sources: BTreeMap::new(),
        }
    }
}

impl Config {
    /// The pattern half of the configuration, as consumed by the registry.
    pub fn pattern_config(&self) -> PatternConfig {
        PatternConfig {
            tiers: self.priority_tiers.clone(),
            matching: self.matching.clone(),
        }
    }

    /// Validate non-pattern settings.
    ///
    /// Patterns are validated when the registry is built.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.scan.validate()?;
        self.output.validate()
    }
}

/// Scan behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Characters of context captured on each side of a match
    #[serde(default = "default_context_window")]
    pub context_window: usize,
    /// Pages longer than this (in characters) are reported as truncated
    #[serde(default = "default_max_page_text_length")]
    pub max_page_text_length: usize,
    /// Documents processed at once (0 = one per CPU)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Per-document extraction timeout in seconds (0 = no timeout)
    #[serde(default = "default_document_timeout_secs")]
    pub document_timeout_secs: u64,
    /// Descend into sub-folders of the input folder
    #[serde(default)]
    pub recursive: bool,
    /// Non-whitespace characters a page needs before the primary text is accepted
    #[serde(default = "default_min_page_chars")]
    pub min_page_chars: usize,
    /// Collapse whitespace runs in captured context
    #[serde(default = "default_collapse_whitespace")]
    pub collapse_whitespace: bool,
}

pub fn default_context_window() -> usize {
    300
}

pub fn default_max_page_text_length() -> usize {
    200_000
}

pub fn default_concurrency() -> usize {
    1
}

pub fn default_document_timeout_secs() -> u64 {
    120
}

pub fn default_min_page_chars() -> usize {
    1
}

pub fn default_collapse_whitespace() -> bool {
    true
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            context_window: default_context_window(),
            max_page_text_length: default_max_page_text_length(),
            concurrency: default_concurrency(),
            document_timeout_secs: default_document_timeout_secs(),
            recursive: false,
            min_page_chars: default_min_page_chars(),
            collapse_whitespace: default_collapse_whitespace(),
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.max_page_text_length == 0 {
            return Err(ConfigurationError::InvalidSetting {
                key: "scan.max_page_text_length",
                reason: "must be > 0".to_string(),
            });
        }
        if self.min_page_chars == 0 {
            return Err(ConfigurationError::InvalidSetting {
                key: "scan.min_page_chars",
                reason: "must be > 0".to_string(),
            });
        }
        if self.document_timeout_secs > 86_400 {
            return Err(ConfigurationError::InvalidSetting {
                key: "scan.document_timeout_secs",
                reason: format!("{} exceeds one day", self.document_timeout_secs),
            });
        }
        Ok(())
    }
}

/// Regex flags applied to every pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingConfig {
    #[serde(default = "default_true")]
    pub case_insensitive: bool,
    #[serde(default = "default_true")]
    pub dot_matches_newline: bool,
}

fn default_true() -> bool {
    true
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            case_insensitive: true,
            dot_matches_newline: true,
        }
    }
}

/// Report output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_directory")]
    pub directory: String,
    #[serde(default = "default_formats")]
    pub formats: Vec<ReportFormat>,
}

pub fn default_output_directory() -> String {
    "results".to_string()
}

pub fn default_formats() -> Vec<ReportFormat> {
    vec![ReportFormat::Json, ReportFormat::Summary]
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            formats: default_formats(),
        }
    }
}

impl OutputConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.directory.trim().is_empty() {
            return Err(ConfigurationError::InvalidSetting {
                key: "output.directory",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Report formats a scan can write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Multi-sheet JSON workbook
    Json,
    /// Plain-text summary
    Summary,
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Json => write!(f, "json"),
            ReportFormat::Summary => write!(f, "summary"),
        }
    }
}

/// One priority tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierConfig {
    pub label: String,
    /// Explicit rank; tiers without one are ranked by position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
    #[serde(default)]
    pub patterns: Vec<PatternSpec>,
}

impl TierConfig {
    pub fn new(label: &str, patterns: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            priority: None,
            patterns: patterns.iter().map(|p| PatternSpec::from(*p)).collect(),
        }
    }
}

/// A pattern as written in the config: a bare regex or a labelled one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatternSpec {
    Plain(String),
    Labeled { label: String, regex: String },
}

impl PatternSpec {
    pub fn regex(&self) -> &str {
        match self {
            PatternSpec::Plain(regex) => regex,
            PatternSpec::Labeled { regex, .. } => regex,
        }
    }

    /// Label used in reports; bare patterns are labelled with their source.
    pub fn label(&self) -> &str {
        match self {
            PatternSpec::Plain(regex) => regex,
            PatternSpec::Labeled { label, .. } => label,
        }
    }
}

impl From<&str> for PatternSpec {
    fn from(regex: &str) -> Self {
        PatternSpec::Plain(regex.to_string())
    }
}

/// Everything the pattern registry is built from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PatternConfig {
    pub tiers: Vec<TierConfig>,
    pub matching: MatchingConfig,
}

impl PatternConfig {
    pub fn new(tiers: Vec<TierConfig>) -> Self {
        Self {
            tiers,
            matching: MatchingConfig::default(),
        }
    }
}

/// Built-in governance-review tiers.
pub fn default_priority_tiers() -> Vec<TierConfig> {
    vec![
        TierConfig::new(
            "priority_1",
            &[
                r"\bethics\s+training\b",
                r"\babuse\s+of\s+(authority|position)\b",
                r"\bconflict\s+of\s+interest\b",
                r"\bemployee\s+misconduct\b",
                r"\bhighway\s+department\b.*?\b(complaint|incident|investigation)\b",
                r"\btrailer\s+removal\b",
            ],
        ),
        TierConfig::new(
            "priority_2",
            &[
                r"\bethics\b.*?\b(training|policy|violation)\b",
                r"\bcode\s+of\s+conduct\b",
                r"\bemployee\s+handbook\b",
                r"\bdisciplinary\s+action\b",
                r"\b(grievance|complaint)\b",
                r"\binappropriate\s+use\b",
                r"\bpersonal\s+use\b.*?\b(vehicle|position|authority)\b",
                r"\bsheriff\b.*?\bhighway\b",
                r"\b(intimidation|threatening)\b",
                r"\bretaliation\b",
            ],
        ),
        TierConfig::new(
            "priority_3",
            &[
                r"\boversight\b",
                r"\baccountability\b",
                r"\binternal\s+investigation\b",
                r"\boutside\s+counsel\b",
                r"\blitigation\s+hold\b",
                r"\b(lawsuit|legal\s+action)\b",
                r"\bsettlement\b",
                r"\binsurance\s+claim\b",
                r"\b(FOIA|freedom\s+of\s+information)\b",
                r"\bpublic\s+comment\b.*?\b(complaint|concern)\b",
            ],
        ),
        TierConfig::new(
            "priority_4",
            &[
                r"\btraining\s+budget\b",
                r"\bprofessional\s+development\b",
                r"\bmandatory\s+training\b",
                r"\bcompliance\s+training\b",
                r"\bharassment\s+training\b",
                r"\bdiscrimination\b",
                r"\bhostile\s+work\s+environment\b",
            ],
        ),
    ]
}
