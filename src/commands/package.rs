//! @acp:module "Package Command"
//! @acp:summary "Render and package every protocol/data file combination"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Implements the `dmpack` entry point: validate arguments, build the plan,
//! then run it with progress output.

use std::path::PathBuf;

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::batch::{BatchOptions, BatchPlan};
use crate::config::Config;
use crate::package::{list_entries, Archiver};

/// Options for the package command
#[derive(Debug, Clone, Default)]
pub struct PackageOptions {
    /// Protocol template directories
    pub templates: Vec<PathBuf>,
    /// Output directory for packages
    pub output_dir: Option<PathBuf>,
    /// Explicit package name (single protocol only)
    pub package_name: Option<String>,
    /// Directory with the CSV data files
    pub data_dir: Option<PathBuf>,
    /// Print the planned packages without writing anything
    pub dry_run: bool,
    /// Print the entries of every package produced
    pub list: bool,
    /// Draw a progress bar while packages are built
    pub show_progress: bool,
}

/// Execute the package command
pub fn execute_package(options: PackageOptions, config: Config) -> Result<()> {
    let batch_options = BatchOptions {
        templates: options.templates,
        output_dir: options.output_dir,
        package_name: options.package_name,
        data_dir: options.data_dir,
    };
    let plan = BatchPlan::new(batch_options, &config)?;

    if options.dry_run {
        let archiver = Archiver::new(&config);
        println!(
            "{} Would create {} package(s) in {}",
            style("→").cyan(),
            plan.jobs().len(),
            style(plan.output_dir().display()).cyan()
        );
        for job in plan.jobs() {
            println!(
                "  {}.{}  {} + {}",
                job.package_name,
                archiver.extension(),
                style(job.template_dir.display()).dim(),
                style(job.data_file.display()).dim()
            );
        }
        return Ok(());
    }

    println!(
        "{} Creating {} package(s) in {}",
        style("→").cyan(),
        plan.jobs().len(),
        style(plan.output_dir().display()).cyan()
    );

    let progress = if options.show_progress {
        let bar = ProgressBar::new(plan.jobs().len() as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .context("Invalid progress template")?
                .progress_chars("#>-"),
        );
        bar
    } else {
        ProgressBar::hidden()
    };

    let report = plan.execute(&config, |artifact| {
        progress.set_message(artifact.job.package_name.clone());
        progress.inc(1);
    });
    progress.finish_and_clear();
    let report = report?;

    for artifact in &report.artifacts {
        println!(
            "  {} {} ({} file(s), {} substituted)",
            style("✓").green(),
            artifact.path.display(),
            artifact.render.files,
            artifact.render.substituted
        );

        if options.list {
            let entries = list_entries(&artifact.path)
                .with_context(|| format!("Failed to read {}", artifact.path.display()))?;
            for entry in entries {
                println!("      {}", style(entry).dim());
            }
        }
    }

    println!(
        "{} Created {} package(s)",
        style("✓").green().bold(),
        report.artifacts.len()
    );

    Ok(())
}
