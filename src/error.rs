//! @acp:module "Errors"
//! @acp:summary "Error taxonomy for configuration, data and filesystem failures"
//! @acp:domain cli
//! @acp:layer utility

use std::path::PathBuf;

use thiserror::Error;

/// @acp:summary "Every failure the packager can report"
#[derive(Debug, Error)]
pub enum PackError {
    /// Invalid or missing arguments, detected before any file is written
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed parameter table
    #[error("Data format error in {}{}: {message}", .path.display(), .line.map(|l| format!(" (line {})", l)).unwrap_or_default())]
    DataFormat {
        path: PathBuf,
        line: Option<u64>,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid data file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// Target package exists and overwriting is disabled
    #[error("Package already exists: {}", .0.display())]
    PackageExists(PathBuf),
}

impl PackError {
    pub fn data_format(path: impl Into<PathBuf>, line: Option<u64>, message: impl Into<String>) -> Self {
        PackError::DataFormat {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    /// True for errors raised by argument validation
    pub fn is_configuration(&self) -> bool {
        matches!(self, PackError::Configuration(_))
    }
}

impl From<glob::GlobError> for PackError {
    fn from(e: glob::GlobError) -> Self {
        PackError::Io(e.into())
    }
}

pub type Result<T> = std::result::Result<T, PackError>;
