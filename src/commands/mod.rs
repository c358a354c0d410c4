//! Command handlers for the docsift CLI.
//!
//! Each submodule handles a specific CLI command or command group.
//! The main dispatch logic remains in main.rs.

pub mod completions;
pub mod config;
pub mod patterns;
pub mod scan;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use docsift::registry::PatternRegistry;
use docsift::Config;

/// Load the effective configuration, reporting where it came from.
pub fn load_config(explicit: Option<&Path>) -> Result<(Config, Option<PathBuf>)> {
    let (config, source) = Config::load(explicit)?;
    match &source {
        Some(path) => tracing::info!(path = %path.display(), "Using config file"),
        None => tracing::info!("Using built-in configuration"),
    }
    Ok((config, source))
}

/// Compile the configured priority tiers.
pub fn load_registry(config: &Config) -> Result<PatternRegistry> {
    PatternRegistry::load(&config.pattern_config()).context("Invalid pattern configuration")
}
