//! Configuration management for docsift

mod io;
mod types;

pub use io::LOCAL_CONFIG_FILE;
pub use types::*;

use anyhow::Result;
use std::path::{Path, PathBuf};

impl Config {
    /// Get the user config file path (~/.config/docsift/config.toml)
    pub fn config_path() -> Result<PathBuf> {
        io::config_path()
    }

    /// Get the user config directory path (~/.config/docsift)
    pub fn config_dir() -> Result<PathBuf> {
        io::config_dir()
    }

    /// Load the effective configuration.
    ///
    /// Lookup order: `explicit`, `./docsift.toml`, the user config, defaults.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        io::load(explicit)
    }

    /// Load a specific config file
    pub fn load_from(path: &Path) -> Result<Self> {
        io::load_from(path)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        io::save_to(self, path)
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        io::to_toml(self)
    }

    /// Source URL configured for a document file name
    pub fn source_url(&self, filename: &str) -> Option<&str> {
        self.sources.get(filename).map(String::as_str)
    }
}
