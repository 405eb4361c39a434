//! @acp:module "Configuration"
//! @acp:summary "Packager configuration loading and defaults"
//! @acp:domain cli
//! @acp:layer config

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_PATH: &str = ".dmpack.config.json";

/// Extension given to finished packages
pub const DEFAULT_PACKAGE_EXTENSION: &str = "dmprotocol";

fn default_package_extension() -> String {
    DEFAULT_PACKAGE_EXTENSION.to_string()
}

fn default_data_extension() -> String {
    "csv".to_string()
}

fn default_value_separator() -> String {
    ",\n".to_string()
}

fn default_true() -> bool {
    true
}

/// @acp:summary "Main packager configuration structure"
/// @acp:lock normal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// File extension of produced packages (without the dot)
    #[serde(default = "default_package_extension")]
    pub package_extension: String,

    /// Extension that selects data files in the data directory
    #[serde(default = "default_data_extension")]
    pub data_extension: String,

    /// Joins the values of a column before substitution
    #[serde(default = "default_value_separator")]
    pub value_separator: String,

    /// Tokens replaced in every template file
    #[serde(default = "default_placeholders")]
    pub placeholders: Vec<Placeholder>,

    /// Replace a package that already exists in the output directory
    #[serde(default = "default_true")]
    pub overwrite: bool,

    /// Parent directory for scratch trees (system temp dir when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scratch_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            package_extension: default_package_extension(),
            data_extension: default_data_extension(),
            value_separator: default_value_separator(),
            placeholders: default_placeholders(),
            overwrite: true,
            scratch_dir: None,
        }
    }
}

impl Config {
    /// @acp:summary "Load config from a JSON file"
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// @acp:summary "Save config to a file"
    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// @acp:summary "Load the config file if present, then apply CLI overrides"
    pub fn resolve<P: AsRef<Path>>(path: P, cli: &CliOverrides) -> crate::Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            Self::load(path)?
        } else {
            Self::default()
        };
        config.apply_cli_overrides(cli);
        Ok(config)
    }

    /// Command-line values win over the config file
    pub fn apply_cli_overrides(&mut self, cli: &CliOverrides) {
        if let Some(ref extension) = cli.extension {
            self.package_extension = extension.clone();
        }
    }

    /// Columns the placeholders pull values from, in declaration order
    pub fn required_columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = Vec::new();
        for placeholder in &self.placeholders {
            if let PlaceholderSource::Column(column) = &placeholder.source {
                if !columns.contains(&column.as_str()) {
                    columns.push(column);
                }
            }
        }
        columns
    }
}

/// CLI overrides for the configuration file
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Replaces `package_extension`
    pub extension: Option<String>,
}

/// @acp:summary "A literal token and where its replacement comes from"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholder {
    /// Literal text searched for in template files
    pub token: String,
    pub source: PlaceholderSource,
}

impl Placeholder {
    pub fn version_suffix(token: &str) -> Self {
        Self {
            token: token.to_string(),
            source: PlaceholderSource::VersionSuffix,
        }
    }

    pub fn column(token: &str, column: &str) -> Self {
        Self {
            token: token.to_string(),
            source: PlaceholderSource::Column(column.to_string()),
        }
    }
}

/// Replacement source for a placeholder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderSource {
    /// Base name of the data file
    VersionSuffix,
    /// All values of a column, joined by the value separator
    Column(String),
}

fn default_placeholders() -> Vec<Placeholder> {
    vec![
        Placeholder::version_suffix("{PROTOCOL_VERSION_SUFFIX}"),
        Placeholder::column("//PROTOCOL_DATA_PA1", "pa1"),
        Placeholder::column("//PROTOCOL_DATA_PA2", "pa2"),
        Placeholder::column("//PROTOCOL_DATA_PA3", "pa3"),
        Placeholder::column("//PROTOCOL_DATA_TOTAL_OUTPUT_POWER", "total_output_power"),
    ]
}
