use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::PathBuf;

/// Per-user locations used by the interactive shell
pub struct AppPaths;

impl AppPaths {
    pub fn data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow!("Cannot determine data directory"))?
            .join("datagrid");

        fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create {}", data_dir.display()))?;
        Ok(data_dir)
    }

    /// Line history of the interactive prompt
    pub fn history_file() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("history.txt"))
    }
}
