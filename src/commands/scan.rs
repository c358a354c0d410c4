//! Scan command handler
//!
//! Uses the ScanService facade to run the pipeline:
//! 1. Load config and apply command-line overrides
//! 2. Compile the pattern registry
//! 3. Discover the PDF documents in the input folder
//! 4. Scan every document (cancellable with Ctrl+C)
//! 5. Hand the report to every configured sink

use std::path::PathBuf;

use anyhow::{Context, Result};

use docsift::cancel::CancelToken;
use docsift::cli::ScanArgs;
use docsift::discovery::{discover, DiscoveryOptions};
use docsift::report::sinks_for;
use docsift::service::{ScanOptions, ScanService};
use docsift::Config;

use super::{load_config, load_registry};

/// Scan a folder and write the reports.
///
/// Returns the process exit code for the run status.
#[cfg(not(tarpaulin_include))]
pub fn handle(args: &ScanArgs) -> Result<i32> {
    let (mut config, _) = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, args);
    config.validate().context("Invalid configuration")?;

    let registry = load_registry(&config)?;
    let documents = discover(
        &args.folder,
        &DiscoveryOptions {
            recursive: config.scan.recursive,
            sources: config.sources.clone(),
        },
    )?;

    if documents.is_empty() {
        eprintln!("No PDF documents found in {}", args.folder.display());
    }

    let mut options = ScanOptions::from_config(&config.scan);
    if args.quiet {
        options = options.quiet();
    }

    let cancel = CancelToken::new();
    cancel.register_signal_handlers();

    let service = ScanService::new(registry, options).with_cancel_token(cancel);
    let report = service.scan(documents)?;

    let output_dir = output_directory(&config, args);
    for sink in sinks_for(&config.output.formats, &output_dir) {
        let path = sink
            .write(&report)
            .with_context(|| format!("Failed to write {} report", sink.name()))?;
        println!("{}", path.display());
    }

    Ok(report.status.exit_code())
}

/// Apply command-line flags on top of the loaded configuration.
pub fn apply_overrides(config: &mut Config, args: &ScanArgs) {
    if let Some(window) = args.window {
        config.scan.context_window = window;
    }
    if let Some(concurrency) = args.concurrency {
        config.scan.concurrency = concurrency;
    }
    if let Some(timeout) = args.timeout {
        config.scan.document_timeout_secs = timeout;
    }
    if args.recursive {
        config.scan.recursive = true;
    }
    if let Some(format) = args.format {
        config.output.formats = format.formats();
    }
}

fn output_directory(config: &Config, args: &ScanArgs) -> PathBuf {
    args.output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.directory))
}
