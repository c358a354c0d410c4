//! Config subcommands handler

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use docsift::Config;

use super::load_config;

/// Show the effective configuration as TOML.
#[cfg(not(tarpaulin_include))]
pub fn handle_show(explicit: Option<&Path>) -> Result<()> {
    let (config, source) = load_config(explicit)?;
    print!("{}", render_show(&config, source.as_deref())?);
    Ok(())
}

/// Effective configuration with a header naming its origin.
pub fn render_show(config: &Config, source: Option<&Path>) -> Result<String> {
    let origin = match source {
        Some(path) => format!("# Loaded from {}\n", path.display()),
        None => "# Built-in defaults\n".to_string(),
    };
    Ok(format!("{}\n{}", origin, config.to_toml()?))
}

/// Write the default configuration to the user config file.
#[cfg(not(tarpaulin_include))]
pub fn handle_init(force: bool) -> Result<()> {
    let path = Config::config_path()?;
    let written = init_at(&path, force)?;
    println!("Wrote default configuration to {}", written.display());
    Ok(())
}

/// Write defaults to `path`, refusing to overwrite unless `force` is set.
pub fn init_at(path: &Path, force: bool) -> Result<PathBuf> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {}\nUse --force to overwrite it.",
            path.display()
        );
    }
    Config::default()
        .save_to(path)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;
    Ok(path.to_path_buf())
}

/// Print the user config file path.
#[cfg(not(tarpaulin_include))]
pub fn handle_path() -> Result<()> {
    println!("{}", Config::config_path()?.display());
    Ok(())
}
