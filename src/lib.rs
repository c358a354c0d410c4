//! docsift Library
//!
//! Scans folders of PDF documents for prioritised regex patterns and reports
//! every match with its page, tier and surrounding context.
//!
//! The pipeline is `TextExtractor` -> `MatchScanner` -> `ContextExtractor`
//! -> `ResultAggregator`, driven by [`service::ScanService`] and written out
//! by the sinks in [`report`].

pub mod cancel;
pub mod cli;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod progress;
pub mod registry;
pub mod report;
pub mod result;
pub mod scanner;
pub mod service;
pub mod types;
pub mod worker;

pub use config::Config;
pub use context::ContextExtractor;
pub use error::{ConfigurationError, DocumentError, InvalidStateError};
pub use extract::TextExtractor;
pub use registry::PatternRegistry;
pub use result::ResultAggregator;
pub use scanner::MatchScanner;
pub use service::{RunStatus, ScanOptions, ScanReport, ScanService};
pub use types::{ContextStatus, ContextualMatch, ExtractionMethod, PageText, RawMatch, ResultRecord};
