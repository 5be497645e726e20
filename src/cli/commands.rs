use crate::cli::args::{Cli, Commands};
use crate::config::Settings;
use crate::error::{ProcessingError, Result};
use crate::models::{Cell, Parameter, QualityFlag, RangeLimits, STATION_REGISTRY};
use crate::processors::{BatchProcessor, Pipeline, ValidationResult};
use crate::utils::constants::VALIDATED_PARQUET_FILE;
use crate::utils::filename::{generate_default_output_dir, is_export_file};
use crate::utils::progress::ProgressReporter;
use crate::writers::{write_artifacts, ParquetWriter};
use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

pub async fn run(cli: Cli) -> Result<()> {
    setup_logging(cli.verbose, cli.log_file.as_deref())?;
    let mut settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Process {
            input,
            output_dir,
            compression,
        } => {
            if let Some(compression) = compression {
                settings.compression = compression;
            }
            let output_dir = output_dir.unwrap_or_else(generate_default_output_dir);

            println!("Validating ENVISTA export...");
            println!("Input file: {}", input.display());
            println!("Output directory: {}", output_dir.display());

            let progress = ProgressReporter::new_spinner("Running validation pipeline...", false);
            let result = run_pipeline(&settings, input).await?;
            progress.finish_with_message(&format!(
                "Validated {} station-hour records",
                result.records.len()
            ));

            print_report(&result);

            let written = write_artifacts(&output_dir, &result, &settings)?;
            println!("\nArtifacts:");
            for path in &written {
                println!("  {}", path.display());
            }

            let file_info =
                ParquetWriter::new().get_file_info(&output_dir.join(VALIDATED_PARQUET_FILE))?;
            println!("\n{}", file_info.summary());
            println!("Processing complete!");
        }

        Commands::ProcessDirectory {
            input_dir,
            output_dir,
            compression,
            max_workers,
            file_pattern,
        } => {
            if let Some(compression) = compression {
                settings.compression = compression;
            }
            let output_dir = output_dir.unwrap_or_else(generate_default_output_dir);

            let files = find_exports(&input_dir, &file_pattern)?;
            if files.is_empty() {
                println!(
                    "No export files found in {} matching '{}'",
                    input_dir.display(),
                    file_pattern
                );
                return Ok(());
            }

            println!("Found {} export files", files.len());
            println!("Output directory: {}", output_dir.display());
            println!("Workers: {}", max_workers);

            let outcomes = tokio::task::spawn_blocking(move || {
                let progress =
                    ProgressReporter::new(files.len() as u64, "Validating exports...", false);
                let processor = BatchProcessor::new(max_workers, settings);
                let outcomes = processor.process_files(&files, &output_dir, Some(&progress));
                progress.finish_with_message("Batch complete");
                outcomes
            })
            .await??;

            let mut failed = 0;
            for outcome in &outcomes {
                match &outcome.result {
                    Ok(stats) => println!(
                        "✅ {}: {} records, {} flagged cells -> {}",
                        outcome.input.display(),
                        stats.records,
                        stats.flagged_cells,
                        outcome.output_dir.display()
                    ),
                    Err(e) => {
                        failed += 1;
                        println!("❌ {}: {}", outcome.input.display(), e);
                    }
                }
            }

            println!(
                "\nProcessed {} files: {} succeeded, {} failed",
                outcomes.len(),
                outcomes.len() - failed,
                failed
            );
            if failed == outcomes.len() {
                return Err(ProcessingError::Load(
                    "no export in the directory could be validated".to_string(),
                ));
            }
        }

        Commands::Validate { input } => {
            println!("Validating ENVISTA export: {}", input.display());

            let progress = ProgressReporter::new_spinner("Running validation pipeline...", false);
            let result = run_pipeline(&settings, input).await?;
            progress.finish_with_message("Validation complete");

            print_report(&result);
            println!("\nValidation complete - no artifacts written");
        }

        Commands::Config => {
            let dump = ConfigDump::new(&settings);
            println!("{}", serde_json::to_string_pretty(&dump)?);
        }

        Commands::Info { file, sample } => {
            println!("Analyzing Parquet file: {}", file.display());

            let writer = ParquetWriter::new();
            let file_info = writer.get_file_info(&file)?;
            println!("\n{}", file_info.summary());

            if sample > 0 {
                println!("\nSample Records (showing up to {} records):", sample);
                match writer.read_records(&file, sample) {
                    Ok(records) => {
                        for (i, record) in records.iter().enumerate() {
                            let cells: Vec<String> = record
                                .cells()
                                .filter_map(|(p, cell)| match cell? {
                                    Cell::Value(v) => Some(format!("{}={}", p, v)),
                                    Cell::Flag(f) => Some(format!("{}={}", p, f)),
                                })
                                .collect();
                            println!(
                                "{}. {} {}: {}",
                                i + 1,
                                record.station,
                                record.date_string(),
                                cells.join(", ")
                            );
                        }
                    }
                    Err(e) => println!("Error reading sample data: {}", e),
                }
            }
        }
    }

    Ok(())
}

/// Install the tracing subscriber: `aq_validator=info` by default, `debug`
/// with `--verbose`, `RUST_LOG` wins over both.
fn setup_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("aq_validator={}", level)));

    let installed = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .try_init()
        }
        None => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init(),
    };
    installed.map_err(|e| ProcessingError::Config(format!("Could not initialize logging: {}", e)))?;

    debug!("Logging initialized at level: {}", level);
    Ok(())
}

/// The pipeline is synchronous; keep it off the async runtime
async fn run_pipeline(settings: &Settings, input: PathBuf) -> Result<ValidationResult> {
    let pipeline = Pipeline::from_settings(settings);
    tokio::task::spawn_blocking(move || pipeline.run_file(&input)).await?
}

fn find_exports(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_export_file(path, pattern))
        .collect();
    files.sort();
    info!("Found {} exports in {}", files.len(), dir.display());
    Ok(files)
}

fn print_report(result: &ValidationResult) {
    println!("\n{}", result.summary.summary());
    println!("\n{}", result.qc_report.summary());

    if !result.summary.flag_totals.is_empty() {
        println!("\nFlag Totals:");
        for flag in &result.summary.flag_totals {
            println!("  {} {:>8}  {}", flag.flag, flag.count, flag.description);
        }
    }
}

#[derive(Serialize)]
struct StationEntry {
    name: &'static str,
    code: &'static str,
}

#[derive(Serialize)]
struct ParameterEntry {
    code: &'static str,
    name: &'static str,
    range: Option<RangeLimits>,
    decimals: u32,
}

#[derive(Serialize)]
struct FlagEntry {
    code: &'static str,
    description: &'static str,
}

/// Effective runtime settings plus the compiled-in QC tables
#[derive(Serialize)]
struct ConfigDump<'a> {
    settings: &'a Settings,
    stations: Vec<StationEntry>,
    parameters: Vec<ParameterEntry>,
    flags: Vec<FlagEntry>,
}

impl<'a> ConfigDump<'a> {
    fn new(settings: &'a Settings) -> Self {
        Self {
            settings,
            stations: STATION_REGISTRY
                .iter()
                .map(|(name, station)| StationEntry {
                    name: *name,
                    code: station.code(),
                })
                .collect(),
            parameters: Parameter::ALL
                .iter()
                .map(|p| ParameterEntry {
                    code: p.code(),
                    name: p.display_name(),
                    range: p.range(),
                    decimals: p.decimals(),
                })
                .collect(),
            flags: QualityFlag::ALL
                .iter()
                .map(|f| FlagEntry {
                    code: f.code(),
                    description: f.description(),
                })
                .collect(),
        }
    }
}
