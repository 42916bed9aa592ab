//! Application configuration.
//!
//! Settings are layered: built-in defaults, then
//! `~/.config/carrent/config.toml`, then `CARRENT_*` environment variables.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::history::store::DEFAULT_HISTORY_FILE;

/// Directory name under the platform config and data roots.
pub const APP_DIR: &str = "carrent";
/// Prefix for environment overrides, e.g. `CARRENT_RENTER=alice`.
pub const ENV_PREFIX: &str = "CARRENT";

const DEFAULT_CONFIG: &str = r#"# carrent configuration

# Directory holding the rental history file.
# data_dir = "/home/me/.local/share/carrent"

# History file name inside data_dir.
history_file = "rental_history.txt"

# Directory for log files.
# log_dir = "/home/me/.local/share/carrent/logs"

# Optional JSON colour palette for the terminal UI.
# theme_file = "/home/me/.config/carrent/theme.json"

# Pre-fill the renter name prompt.
# renter = "alice"
"#;

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding persisted data.
    pub data_dir: PathBuf,
    /// History file name, relative to `data_dir` unless absolute.
    pub history_file: PathBuf,
    /// Directory for log output.
    pub log_dir: PathBuf,
    /// Optional palette file for the terminal UI.
    #[serde(default)]
    pub theme_file: Option<PathBuf>,
    /// Default renter name.
    #[serde(default)]
    pub renter: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = default_data_dir();
        Self {
            log_dir: data_dir.join("logs"),
            data_dir,
            history_file: PathBuf::from(DEFAULT_HISTORY_FILE),
            theme_file: None,
            renter: None,
        }
    }
}

impl AppConfig {
    /// Load from the default config file and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load from a specific config file (which may be missing) and the environment.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let defaults = AppConfig::default();
        let settings = Config::builder()
            .set_default("data_dir", defaults.data_dir.to_string_lossy().to_string())?
            .set_default(
                "history_file",
                defaults.history_file.to_string_lossy().to_string(),
            )?
            .set_default("log_dir", defaults.log_dir.to_string_lossy().to_string())?
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()
            .with_context(|| format!("failed to read configuration {}", path.display()))?;

        let config: AppConfig = settings
            .try_deserialize()
            .context("failed to parse configuration")?;
        Ok(config.normalized())
    }

    /// Absolute location of the history file.
    pub fn history_path(&self) -> PathBuf {
        if self.history_file.is_absolute() {
            self.history_file.clone()
        } else {
            self.data_dir.join(&self.history_file)
        }
    }

    fn normalized(mut self) -> Self {
        self.renter = self
            .renter
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        self
    }
}

/// Path of the user's config file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("config.toml")
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Write a commented default config file if none exists yet.
pub fn ensure_default_config() -> Result<()> {
    write_default_config(config_path())
}

fn write_default_config(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "Wrote default configuration");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_uses_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_from(dir.path().join("absent.toml"))?;
        assert_eq!(config.history_file, PathBuf::from(DEFAULT_HISTORY_FILE));
        assert_eq!(
            config.history_path(),
            config.data_dir.join(DEFAULT_HISTORY_FILE)
        );
        Ok(())
    }

    #[test]
    fn file_values_override_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        let data_dir = dir.path().join("data");
        fs::write(
            &path,
            format!(
                "data_dir = {:?}\nhistory_file = \"log.txt\"\nrenter = \"  alice  \"\n",
                data_dir.to_string_lossy()
            ),
        )?;

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.history_path(), data_dir.join("log.txt"));
        assert_eq!(config.renter.as_deref(), Some("alice"));
        Ok(())
    }

    #[test]
    fn default_file_is_written_once_and_parses() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("carrent/config.toml");
        write_default_config(&path)?;
        assert!(path.exists());

        fs::write(&path, "history_file = \"custom.txt\"\n")?;
        write_default_config(&path)?;
        assert_eq!(fs::read_to_string(&path)?, "history_file = \"custom.txt\"\n");

        fs::write(&path, DEFAULT_CONFIG)?;
        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.history_file, PathBuf::from(DEFAULT_HISTORY_FILE));
        assert_eq!(config.renter, None);
        Ok(())
    }
}
