#![forbid(unsafe_code)]
//! dmpack Command Line Interface

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use dmpack::commands::{execute_package, execute_save_config, PackageOptions};
use dmpack::config::{CliOverrides, DEFAULT_CONFIG_PATH};
use dmpack::Config;

const LOG_ENV_VAR: &str = "DMPACK_LOG";

#[derive(Parser)]
#[command(name = "dmpack")]
#[command(about = "Create .dmprotocol files from directories with protocols")]
#[command(version)]
struct Cli {
    /// Directories with protocols
    protocols: Vec<PathBuf>,

    /// Output directory for .dmprotocol files
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Name of the package (can only be used with one protocol)
    #[arg(long)]
    package_name: Option<String>,

    /// Directory with all csv data
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Package file extension (overrides the config file)
    #[arg(long)]
    extension: Option<String>,

    /// Show the packages that would be created without writing them
    #[arg(long)]
    dry_run: bool,

    /// List the entries of each created package
    #[arg(long)]
    list: bool,

    /// Write the effective configuration to the config file path and exit
    #[arg(long)]
    save_config: bool,

    /// Config file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Load config
    let overrides = CliOverrides {
        extension: cli.extension,
    };
    let config = Config::resolve(&cli.config, &overrides)?;
    tracing::debug!(?config, "Effective configuration");

    if cli.save_config {
        execute_save_config(&config, &cli.config)?;
        return Ok(());
    }

    let options = PackageOptions {
        templates: cli.protocols,
        output_dir: cli.output_dir,
        package_name: cli.package_name,
        data_dir: cli.data_dir,
        dry_run: cli.dry_run,
        list: cli.list,
        // Debug logs share stderr with the bar
        show_progress: !cli.verbose,
    };
    execute_package(options, config)?;

    Ok(())
}
