//! roikit CLI
//!
//! Inspect ROI sets and convert them between JSON, single ImageJ `.roi`
//! records and ImageJ `.zip` archives.

use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;
use roikit_core::RoiData;
use roikit_io::{read_imagej_records, read_roiset, LoadedRois, ReadOptions, RoiFileFormat};
use roikit_manager::{ManagerConfig, RoiManager};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ROI file error: {0}")]
    RoiIo(#[from] roikit_io::Error),

    #[error("Manager error: {0}")]
    Manager(#[from] roikit_manager::Error),

    #[error("Core error: {0}")]
    Core(#[from] roikit_core::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Region-of-interest set inspector and converter.
#[derive(Parser)]
#[command(name = "roikit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the ROIs stored in a file
    Info {
        /// Input `.json`, `.roi` or `.zip` file
        input: PathBuf,

        /// Dump the parsed records as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Convert a ROI set to another format, chosen by the output extension
    Convert {
        /// Input `.json`, `.roi` or `.zip` file
        input: PathBuf,

        /// Output `.json`, `.roi` or `.zip` file
        output: PathBuf,

        /// Drop ImageJ records without a shape counterpart instead of failing
        #[arg(long)]
        skip_unsupported: bool,

        /// Manager configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Info { input, json } => info(&input, json),
        Commands::Convert {
            input,
            output,
            skip_unsupported,
            config,
        } => convert(&input, &output, skip_unsupported, config.as_deref()),
    }
}

fn info(input: &Path, json: bool) -> Result<()> {
    let format = RoiFileFormat::from_path(input);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if json {
        if format.is_imagej() {
            let records = read_imagej_records(input)?;
            serde_json::to_writer_pretty(&mut out, &records)?;
        } else {
            let rois = RoiData::from_reader(std::fs::File::open(input)?)?;
            serde_json::to_writer_pretty(&mut out, &rois.to_json()?)?;
        }
        writeln!(out)?;
        return Ok(());
    }

    let options = ReadOptions::default().with_policy(roikit_ij::BatchPolicy::SkipUnsupported);
    let LoadedRois { shapes, warnings } = read_roiset(input, &options)?;

    writeln!(out, "File: {}", input.display())?;
    writeln!(out, "Format: {format:?}")?;
    writeln!(out, "ROIs: {}", shapes.len())?;
    writeln!(
        out,
        "{:<6} | {:<10} | {:<20} | {:<8} | {}",
        "Index", "Kind", "Name", "Vertices", "Axes"
    )?;
    writeln!(out, "{:-<65}", "")?;
    for (index, roi) in shapes.iter().enumerate() {
        writeln!(
            out,
            "{:<6} | {:<10} | {:<20} | {:<8} | {:?}",
            index,
            roi.kind,
            roi.name.as_deref().unwrap_or("-"),
            roi.points().len(),
            roi.extra_axes().to_vec(),
        )?;
    }
    for warning in &warnings {
        writeln!(out, "warning: {warning}")?;
    }
    Ok(())
}

fn convert(
    input: &Path,
    output: &Path,
    skip_unsupported: bool,
    config: Option<&Path>,
) -> Result<()> {
    let mut config = match config {
        Some(path) => ManagerConfig::from_file(path)?,
        None => ManagerConfig::default(),
    };
    if skip_unsupported {
        config = config.with_skip_unsupported(true);
    }
    let mut manager = RoiManager::new(config);
    let count = manager.load_roiset(input, false)?;
    manager.save_roiset(output)?;
    log::info!(
        "converted {count} ROIs: {} -> {}",
        input.display(),
        output.display()
    );
    println!("Converted {count} ROIs to {}", output.display());
    Ok(())
}
