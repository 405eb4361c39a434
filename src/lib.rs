#![forbid(unsafe_code)]

//! @acp:module "dmpack Library"
//! @acp:summary "Generate protocol packages from template trees and CSV parameter tables"
//! @acp:domain cli
//! @acp:layer api
//! @acp:stability stable
//!
//! # dmpack
//!
//! Renders protocol template directories with per-variant parameter tables
//! and packages each result as a `.dmprotocol` archive.
//!
//! ## Pipeline
//!
//! - **Table**: CSV data file to column-oriented [`ParameterTable`]
//! - **Render**: placeholder substitution over a template tree
//! - **Package**: zip the rendered tree, rename to the package extension
//! - **Batch**: every template directory crossed with every data file
//!
//! ## Example
//!
//! ```rust,no_run
//! use dmpack::{BatchOptions, BatchPlan, Config};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let options = BatchOptions {
//!         templates: vec!["protocols/Commtia DAB".into()],
//!         output_dir: Some("dist".into()),
//!         package_name: None,
//!         data_dir: Some("data".into()),
//!     };
//!
//!     let plan = BatchPlan::new(options, &config)?;
//!     let report = plan.execute(&config, |_| {})?;
//!     println!("{} packages", report.artifacts.len());
//!
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod commands;
pub mod config;
pub mod error;
pub mod package;
pub mod render;
pub mod table;

// Re-exports
pub use batch::{Artifact, BatchOptions, BatchPlan, BatchReport, Job};
pub use config::{Config, Placeholder, PlaceholderSource};
pub use error::{PackError, Result};
pub use package::{list_entries, Archiver};
pub use render::{RenderSummary, Renderer, Substitutions};
pub use table::ParameterTable;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
