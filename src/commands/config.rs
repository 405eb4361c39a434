//! @acp:module "Save Config Command"
//! @acp:summary "Write the effective configuration to disk"
//! @acp:domain cli
//! @acp:layer handler

use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use crate::config::Config;

/// Execute `--save-config`: persist `config` as pretty JSON at `path`
pub fn execute_save_config(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    config
        .save(path)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    println!(
        "{} Config written to {}",
        style("✓").green(),
        path.display()
    );
    Ok(())
}
