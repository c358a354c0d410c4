//! Configuration I/O operations

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::types::Config;

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "docsift.toml";

/// Get the user config file path (~/.config/docsift/config.toml)
pub fn config_path() -> Result<PathBuf> {
    let config_dir = config_dir()?;
    Ok(config_dir.join("config.toml"))
}

/// Get the user config directory path (~/.config/docsift)
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("docsift"))
}

/// Decide which config file applies.
///
/// An explicit path must exist. Otherwise `./docsift.toml` wins over the
/// user config; `None` means built-in defaults.
pub fn resolve(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.is_file() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        return Ok(Some(path.to_path_buf()));
    }

    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Ok(Some(local));
    }

    // A missing home directory just means there is no user config
    if let Ok(user) = config_path() {
        if user.is_file() {
            return Ok(Some(user));
        }
    }

    Ok(None)
}

/// Load and validate a config file
pub fn load_from(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid config {:?}: {}", path, e))?;
    Ok(config)
}

/// Load the effective configuration, returning it with the file it came from
pub fn load(explicit: Option<&Path>) -> Result<(Config, Option<PathBuf>)> {
    match resolve(explicit)? {
        Some(path) => {
            let config = load_from(&path)?;
            tracing::debug!(path = %path.display(), "Loaded configuration");
            Ok((config, Some(path)))
        }
        None => Ok((Config::default(), None)),
    }
}

/// Save configuration to `path`, creating parent directories
pub fn save_to(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }
    }

    let contents = to_toml(config)?;
    fs::write(path, contents).with_context(|| format!("Failed to write config file: {:?}", path))?;

    Ok(())
}

/// Render configuration as TOML
pub fn to_toml(config: &Config) -> Result<String> {
    toml::to_string_pretty(config).context("Failed to serialize config")
}
