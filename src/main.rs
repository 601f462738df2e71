//! sectorval - command-line front end
//!
//! Normalizes one device payload into a canonical sector, or compares a
//! stored payload against a current one, printing JSON to stdout.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use sectorval::adapters::adapter_for;
use sectorval::catalog::{load_catalog, Device, ParameterCatalog};
use sectorval::diff::{load_settings, load_user_settings, DiffEngine, DiffSettings};
use sectorval::sector::Sector;
use sectorval::standards::{Gs1Table, Standard};
use sectorval::template::JobContext;

/// Command-line arguments for sectorval
#[derive(Parser, Debug)]
#[command(name = "sectorval")]
#[command(about = "Barcode verification report normalization and sector differencing")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse one device payload and print the canonical sector
    Parse {
        /// Device dialect: json_rich, json_alt or fixed_text
        #[arg(short, long, env = "SECTORVAL_DEVICE")]
        device: Device,

        /// Raw device payload
        #[arg(short, long)]
        payload: PathBuf,

        /// Job context JSON supplied with the read
        #[arg(short, long)]
        job: Option<PathBuf>,

        /// Expected grading standard, e.g. "ISO 15415" or "GS1"
        #[arg(long, default_value = "none")]
        standard: String,

        /// Expected GS1 table, e.g. "Table 7.1"
        #[arg(long, default_value = "none")]
        table: String,

        /// Parameter catalog TOML replacing the built-in one
        #[arg(long, env = "SECTORVAL_CATALOG")]
        catalog: Option<PathBuf>,
    },

    /// Compare a stored payload against a current one
    Compare {
        #[arg(short, long, env = "SECTORVAL_DEVICE")]
        device: Device,

        #[arg(long)]
        stored: PathBuf,

        #[arg(long)]
        current: PathBuf,

        #[arg(long)]
        stored_job: Option<PathBuf>,

        /// Defaults to the stored job
        #[arg(long)]
        current_job: Option<PathBuf>,

        #[arg(long, default_value = "none")]
        standard: String,

        #[arg(long, default_value = "none")]
        table: String,

        /// Comparison settings TOML; the per-user file is used when omitted
        #[arg(long, env = "SECTORVAL_SETTINGS")]
        settings: Option<PathBuf>,

        /// Parameter catalog TOML replacing the built-in one
        #[arg(long, env = "SECTORVAL_CATALOG")]
        catalog: Option<PathBuf>,
    },
}

fn read_job(path: Option<&Path>) -> Result<JobContext> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read job file {}", path.display()))?;
            JobContext::from_json(&json)
                .with_context(|| format!("Invalid job file {}", path.display()))
        }
        None => Ok(JobContext::default()),
    }
}

fn read_sector(
    catalog: &ParameterCatalog,
    device: Device,
    payload: &Path,
    job: &JobContext,
    standard: Standard,
    table: Gs1Table,
) -> Result<Sector> {
    let raw = std::fs::read_to_string(payload)
        .with_context(|| format!("Failed to read payload {}", payload.display()))?;
    let adapter = adapter_for(device);
    let report = adapter
        .parse_with_catalog(catalog, &raw, job, standard, table)
        .with_context(|| format!("Failed to parse {}", payload.display()))?;
    Ok(Sector::new(adapter.template(job), report, standard, table))
}

fn load_custom_catalog(path: Option<&Path>) -> Result<Option<ParameterCatalog>> {
    match path {
        Some(path) => load_catalog(path)
            .map(Some)
            .with_context(|| format!("Failed to load catalog {}", path.display())),
        None => Ok(None),
    }
}

fn load_diff_settings(path: Option<&Path>) -> Result<DiffSettings> {
    match path {
        Some(path) => load_settings(path)
            .with_context(|| format!("Failed to load settings {}", path.display())),
        None => load_user_settings().context("Failed to load user diff settings"),
    }
}

fn main() -> Result<()> {
    sectorval::init_tracing();

    let args = Args::parse();

    match args.command {
        Command::Parse {
            device,
            payload,
            job,
            standard,
            table,
            catalog,
        } => {
            let custom = load_custom_catalog(catalog.as_deref())?;
            let catalog = custom.as_ref().unwrap_or_else(|| ParameterCatalog::global());
            let job = read_job(job.as_deref())?;
            let sector = read_sector(
                catalog,
                device,
                &payload,
                &job,
                Standard::from_label(&standard),
                Gs1Table::from_label(&table),
            )?;

            info!(
                "Parsed sector '{}' ({}, {} parameters)",
                sector.name(),
                sector.symbology(),
                sector.report().parameters.len()
            );
            println!("{}", serde_json::to_string_pretty(&sector)?);
        }

        Command::Compare {
            device,
            stored,
            current,
            stored_job,
            current_job,
            standard,
            table,
            settings,
            catalog,
        } => {
            let settings = load_diff_settings(settings.as_deref())?;
            let standard = Standard::from_label(&standard);
            let table = Gs1Table::from_label(&table);
            let custom = load_custom_catalog(catalog.as_deref())?;
            let catalog = custom.as_ref().unwrap_or_else(|| ParameterCatalog::global());

            let stored_job = read_job(stored_job.as_deref())?;
            let current_job = match current_job.as_deref() {
                Some(path) => read_job(Some(path))?,
                None => stored_job.clone(),
            };

            let stored = read_sector(catalog, device, &stored, &stored_job, standard, table)?;
            let current = read_sector(catalog, device, &current, &current_job, standard, table)?;

            let diff = DiffEngine::new(settings).compare_sectors(&stored, &current);
            if diff.is_not_empty() {
                info!("Sector '{}' differs", diff.name);
                println!("{}", serde_json::to_string_pretty(&diff)?);
            } else {
                info!("Sector '{}' unchanged", diff.name);
                println!("null");
            }
        }
    }

    Ok(())
}
