// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platescan — read licence plates from photographs.
//
// Entry point. Initialises logging, loads the pipeline configuration, and
// feeds each selected image through the plate scanner, printing the
// recognised text to stdout (one line per image). Diagnostics go to stderr.

mod source;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use platescan_core::error::{PlateScanError, Result};
use platescan_core::PipelineConfig;
use platescan_vision::{PlateReading, PlateScanner, RecognizerFactory};
use tracing::{error, info, warn};

#[derive(Debug, Parser)]
#[command(name = "platescan")]
#[command(about = "Locate licence plates in photos, crop them, and print the recognised text")]
#[command(version)]
struct Cli {
    /// Image files to read, in order.
    paths: Vec<PathBuf>,

    /// After any given paths, choose images from a file dialog until cancelled.
    #[arg(long, short)]
    interactive: bool,

    /// JSON pipeline configuration (missing fields take their defaults).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory containing text-detection.rten and text-recognition.rten.
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Write `<name>-smoothed.png` and `<name>-plate.png` for each image here.
    #[arg(long)]
    save_crops: Option<PathBuf>,
}

/// Counts reported at the end of a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct RunSummary {
    processed: usize,
    plates_found: usize,
    failed: usize,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run_cli(cli) {
        Ok(summary) => {
            info!(
                processed = summary.processed,
                plates_found = summary.plates_found,
                failed = summary.failed,
                "Platescan finished"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "Platescan aborted");
            ExitCode::FAILURE
        }
    }
}

fn run_cli(cli: Cli) -> Result<RunSummary> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(dir) = cli.model_dir {
        config.ocr.model_dir = Some(dir);
    }
    let scanner = PlateScanner::new(config)?;

    if let Some(dir) = &cli.save_crops {
        std::fs::create_dir_all(dir)?;
    }

    #[cfg(feature = "ocr")]
    let factory = platescan_vision::OcrsFactory::from_settings(&scanner.config().ocr);
    #[cfg(not(feature = "ocr"))]
    let factory = {
        warn!("built without the `ocr` feature; plates will be located but not read");
        platescan_vision::UnavailableFactory
    };

    info!("Platescan starting");
    let paths = source::path_source(cli.paths, cli.interactive);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(&scanner, paths, &factory, cli.save_crops.as_deref(), &mut out)
}

/// Scan every path in turn. A failing image is logged and printed as an
/// empty line; only output errors stop the loop.
fn run<F, I, W>(
    scanner: &PlateScanner,
    paths: I,
    factory: &F,
    save_dir: Option<&Path>,
    out: &mut W,
) -> Result<RunSummary>
where
    F: RecognizerFactory,
    I: IntoIterator<Item = PathBuf>,
    W: Write,
{
    let mut summary = RunSummary::default();

    for path in paths {
        match scanner.scan_path(&path, factory) {
            Ok(reading) => {
                if let Some(dir) = save_dir {
                    if let Err(err) = save_debug_images(dir, &path, &reading) {
                        warn!(path = %path.display(), error = %err, "Could not save debug images");
                    }
                }
                writeln!(out, "{}", reading.text.trim_end())?;
                summary.processed += 1;
                if reading.polygon.is_some() {
                    summary.plates_found += 1;
                }
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Skipping image");
                writeln!(out)?;
                summary.failed += 1;
            }
        }
        out.flush()?;
    }

    Ok(summary)
}

fn save_debug_images(dir: &Path, source: &Path, reading: &PlateReading) -> Result<()> {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    let smoothed_path = dir.join(format!("{stem}-smoothed.png"));
    reading.smoothed.save(&smoothed_path).map_err(|err| {
        PlateScanError::ImageError(format!("failed to write {}: {}", smoothed_path.display(), err))
    })?;

    if let Some(plate) = &reading.plate {
        let plate_path = dir.join(format!("{stem}-plate.png"));
        plate.save(&plate_path).map_err(|err| {
            PlateScanError::ImageError(format!("failed to write {}: {}", plate_path.display(), err))
        })?;
    }
    Ok(())
}
