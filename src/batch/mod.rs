//! @acp:module "Batch Orchestrator"
//! @acp:summary "Cross every template directory with every data file and build packages"
//! @acp:domain cli
//! @acp:layer service
//!
//! Planning validates arguments and discovers data files without touching the
//! filesystem. Execution then runs each (template, data file) job in order:
//! load table, render into a scratch dir, archive, drop the scratch dir.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{PackError, Result};
use crate::package::Archiver;
use crate::render::{RenderSummary, Renderer};
use crate::table::{version_suffix, ParameterTable};

/// Arguments of one packaging run
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Protocol template directories
    pub templates: Vec<PathBuf>,
    /// Destination for packages
    pub output_dir: Option<PathBuf>,
    /// Explicit package base name (single template only)
    pub package_name: Option<String>,
    /// Directory scanned for data files
    pub data_dir: Option<PathBuf>,
}

/// One (template, data file) combination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub template_dir: PathBuf,
    pub data_file: PathBuf,
    /// `{base}_{version_suffix}`
    pub package_name: String,
    pub version_suffix: String,
}

/// A package written by [`BatchPlan::execute`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub job: Job,
    pub path: PathBuf,
    pub render: RenderSummary,
}

/// Result of a complete run
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub artifacts: Vec<Artifact>,
}

impl BatchReport {
    pub fn paths(&self) -> Vec<&Path> {
        self.artifacts.iter().map(|a| a.path.as_path()).collect()
    }
}

/// @acp:summary "Validated set of jobs for one run"
#[derive(Debug, Clone)]
pub struct BatchPlan {
    output_dir: PathBuf,
    jobs: Vec<Job>,
}

impl BatchPlan {
    /// @acp:summary "Validate options and enumerate jobs; performs no writes"
    pub fn new(options: BatchOptions, config: &Config) -> Result<Self> {
        let output_dir = options.output_dir.ok_or_else(|| {
            PackError::Configuration("Output directory argument is required".to_string())
        })?;

        if options.templates.is_empty() {
            return Err(PackError::Configuration(
                "At least one protocol directory must be specified".to_string(),
            ));
        }

        if options.templates.len() > 1 && options.package_name.is_some() {
            return Err(PackError::Configuration(
                "Package name argument can only be used with one protocol".to_string(),
            ));
        }

        let data_dir = options.data_dir.ok_or_else(|| {
            PackError::Configuration("Data directory argument is required".to_string())
        })?;

        for template in &options.templates {
            if !template.is_dir() {
                return Err(PackError::Configuration(format!(
                    "Protocol directory not found: {}",
                    template.display()
                )));
            }
        }

        let data_files = discover_data_files(&data_dir, &config.data_extension)?;
        if data_files.is_empty() {
            return Err(PackError::Configuration(format!(
                "No *.{} data files found in {}",
                config.data_extension,
                data_dir.display()
            )));
        }

        let mut jobs = Vec::with_capacity(options.templates.len() * data_files.len());
        for template in &options.templates {
            let base = match &options.package_name {
                Some(name) => name.clone(),
                None => template_name(template)?,
            };

            for data_file in &data_files {
                let suffix = version_suffix(data_file);
                jobs.push(Job {
                    template_dir: template.clone(),
                    data_file: data_file.clone(),
                    package_name: format!("{}_{}", base, suffix),
                    version_suffix: suffix,
                });
            }
        }

        Ok(Self { output_dir, jobs })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// @acp:summary "Build every package; aborts on the first error"
    /// @acp:ai-careful "Scratch directories are removed on success and on failure"
    pub fn execute<F>(&self, config: &Config, mut on_built: F) -> Result<BatchReport>
    where
        F: FnMut(&Artifact),
    {
        fs::create_dir_all(&self.output_dir)?;

        let renderer = Renderer::new(config);
        let archiver = Archiver::new(config);
        let mut report = BatchReport::default();

        for job in &self.jobs {
            let artifact = run_job(job, &self.output_dir, config, &renderer, &archiver)?;
            on_built(&artifact);
            report.artifacts.push(artifact);
        }

        Ok(report)
    }
}

fn run_job(
    job: &Job,
    output_dir: &Path,
    config: &Config,
    renderer: &Renderer,
    archiver: &Archiver,
) -> Result<Artifact> {
    let _span = tracing::info_span!(
        "job",
        template = %job.template_dir.display(),
        data = %job.data_file.display()
    )
    .entered();

    let table = ParameterTable::from_path(&job.data_file)?;
    tracing::debug!(
        source = %table.source().display(),
        rows = table.row_count(),
        "Parameter table ready"
    );

    let scratch = scratch_dir(config)?;
    tracing::debug!(scratch = %scratch.path().display(), "Allocated scratch directory");

    let render = renderer.render(&job.template_dir, scratch.path(), &job.version_suffix, &table)?;
    let path = archiver.archive(scratch.path(), output_dir, &job.package_name)?;

    scratch.close()?;

    Ok(Artifact {
        job: job.clone(),
        path,
        render,
    })
}

fn scratch_dir(config: &Config) -> Result<tempfile::TempDir> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("dmpack-");
    let dir = match &config.scratch_dir {
        Some(parent) => builder.tempdir_in(parent)?,
        None => builder.tempdir()?,
    };
    Ok(dir)
}

/// Data files directly inside `data_dir` with the given extension, sorted
fn discover_data_files(data_dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !data_dir.is_dir() {
        return Err(PackError::Configuration(format!(
            "Data directory not found: {}",
            data_dir.display()
        )));
    }

    let pattern = format!(
        "{}/*.{}",
        glob::Pattern::escape(&data_dir.to_string_lossy()),
        glob::Pattern::escape(extension.trim_start_matches('.'))
    );

    let mut files = Vec::new();
    for entry in glob::glob(&pattern)? {
        let path = entry?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    tracing::debug!(data_dir = %data_dir.display(), count = files.len(), "Discovered data files");
    Ok(files)
}

/// Last path component of a template dir, resolving `.`/`..` when needed
fn template_name(template: &Path) -> Result<String> {
    if let Some(name) = template.file_name() {
        return Ok(name.to_string_lossy().to_string());
    }
    let canonical = fs::canonicalize(template)?;
    canonical
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| {
            PackError::Configuration(format!(
                "Cannot derive a package name from {}; use --package-name",
                template.display()
            ))
        })
}
