//! @acp:module "Package Archiver"
//! @acp:summary "Zip a rendered tree and publish it under the package extension"
//! @acp:domain cli
//! @acp:layer io
//!
//! The archive root is the content of the source directory. The zip is first
//! written as `{name}.zip` and then renamed to `{name}.{extension}`.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::config::Config;
use crate::error::{PackError, Result};

/// @acp:summary "Builds package archives into an output directory"
#[derive(Debug, Clone)]
pub struct Archiver {
    extension: String,
    overwrite: bool,
}

impl Default for Archiver {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl Archiver {
    pub fn new(config: &Config) -> Self {
        Self {
            extension: config.package_extension.trim_start_matches('.').to_string(),
            overwrite: config.overwrite,
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Final path of a package named `package_name` inside `output_dir`
    pub fn package_path(&self, output_dir: &Path, package_name: &str) -> PathBuf {
        output_dir.join(format!("{}.{}", package_name, self.extension))
    }

    /// @acp:summary "Archive `source_dir` as `{output_dir}/{package_name}.{extension}`"
    /// @acp:ai-careful "Replaces an existing package unless overwrite is disabled"
    pub fn archive(&self, source_dir: &Path, output_dir: &Path, package_name: &str) -> Result<PathBuf> {
        let package_path = self.package_path(output_dir, package_name);
        if package_path.exists() && !self.overwrite {
            return Err(PackError::PackageExists(package_path));
        }

        let zip_path = output_dir.join(format!("{}.zip", package_name));
        if let Err(e) = write_zip(source_dir, &zip_path) {
            let _ = fs::remove_file(&zip_path);
            return Err(e);
        }

        if zip_path != package_path {
            if let Err(e) = fs::rename(&zip_path, &package_path) {
                let _ = fs::remove_file(&zip_path);
                return Err(e.into());
            }
        }

        tracing::info!(package = %package_path.display(), "Created package");
        Ok(package_path)
    }
}

/// Write every file and directory under `source_dir` into a zip at `zip_path`
fn write_zip(source_dir: &Path, zip_path: &Path) -> Result<()> {
    let file = File::create(zip_path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in WalkDir::new(source_dir).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(source_dir)
            .unwrap_or(entry.path());
        let name = archive_name(relative);

        if entry.file_type().is_dir() {
            zip.add_directory(format!("{}/", name), options)?;
        } else if entry.file_type().is_file() {
            zip.start_file(name, options)?;
            let mut input = File::open(entry.path())?;
            io::copy(&mut input, &mut zip)?;
        }
    }

    zip.finish()?;
    Ok(())
}

/// Zip entry names always use `/` separators
fn archive_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// @acp:summary "Entry names stored in a package, in archive order"
pub fn list_entries(package: &Path) -> Result<Vec<String>> {
    let file = File::open(package)?;
    let archive = ZipArchive::new(file)?;
    Ok(archive.file_names().map(str::to_string).collect())
}
