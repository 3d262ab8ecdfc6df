use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::data::column::NUMBERING_HEADERS;
use crate::data::data_exporter::{ExportOptions, EXPORT_FILENAME};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Rows per page
    pub page_size: usize,

    /// Prepend a derived `No` column to inferred schemas
    pub show_row_numbers: bool,

    /// Cells wider than this are truncated in the table view
    pub max_column_width: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// File name used when `--export` points at a directory
    pub filename: String,

    /// Headers that make a derived column exportable
    pub numbering_headers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directive used when RUST_LOG is not set
    pub default_filter: String,

    /// Entries kept for the `logs` command
    pub ring_buffer: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            show_row_numbers: false,
            max_column_width: 40,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            filename: EXPORT_FILENAME.to_string(),
            numbering_headers: NUMBERING_HEADERS.iter().map(|h| h.to_string()).collect(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_filter: "info".to_string(),
            ring_buffer: 1000,
        }
    }
}

impl ExportConfig {
    pub fn to_options(&self) -> ExportOptions {
        ExportOptions {
            filename: self.filename.clone(),
            numbering_headers: self.numbering_headers.clone(),
        }
    }
}

impl Config {
    /// Load config from the default location, falling back to defaults
    /// when no file exists yet
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        if !config_path.exists() {
            debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("datagrid").join("config.toml"))
    }

    /// Write the commented default file, leaving an existing one alone.
    /// Returns the path and whether a file was written.
    pub fn init_default_file(path: &Path) -> Result<(PathBuf, bool)> {
        if path.exists() {
            return Ok((path.to_path_buf(), false));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(path, Self::create_default_with_comments())
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok((path.to_path_buf(), true))
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        r##"# datagrid configuration
# Location: ~/.config/datagrid/config.toml (Linux)
#           ~/Library/Application Support/datagrid/config.toml (macOS)
#           %APPDATA%\datagrid\config.toml (Windows)

[display]
# Rows shown per page
page_size = 10

# Prepend a "No" column numbering the rows
show_row_numbers = false

# Truncate cells wider than this many characters
max_column_width = 40

[export]
# File name used when --export is given a directory
filename = "data.csv"

# A computed column is exported only when its header is one of these
numbering_headers = ["No", "#", "Number"]

[logging]
# Filter directive used when RUST_LOG is unset, e.g. "debug" or "filter=trace,info"
default_filter = "info"

# Number of recent log lines kept for the `logs` command
ring_buffer = 1000
"##
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.display.page_size, 10);
        assert_eq!(config.export.filename, "data.csv");
        assert_eq!(config.export.numbering_headers, vec!["No", "#", "Number"]);
    }

    #[test]
    fn test_commented_default_matches_default() {
        let parsed: Config = toml::from_str(&Config::create_default_with_comments()).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let parsed: Config = toml::from_str("[display]\npage_size = 25\n").unwrap();
        assert_eq!(parsed.display.page_size, 25);
        assert_eq!(parsed.display.max_column_width, 40);
        assert_eq!(parsed.logging, LoggingConfig::default());
    }

    #[test]
    fn test_save_and_load_round_trip() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.export.filename = "people.csv".to_string();
        config.save_to(&path)?;
        assert_eq!(Config::load_from(&path)?, config);
        Ok(())
    }

    #[test]
    fn test_init_does_not_overwrite() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("config.toml");
        let (_, written) = Config::init_default_file(&path)?;
        assert!(written);
        fs::write(&path, "[display]\npage_size = 3\n")?;
        let (_, written) = Config::init_default_file(&path)?;
        assert!(!written);
        assert_eq!(Config::load_from(&path)?.display.page_size, 3);
        Ok(())
    }

    #[test]
    fn test_invalid_file_reports_path() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("config.toml");
        fs::write(&path, "[display\n")?;
        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid config file"));
        Ok(())
    }
}
