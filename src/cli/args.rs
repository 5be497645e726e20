use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "aq-validator")]
#[command(about = "Conversion and quality control for ENVISTA air-quality exports")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(long, global = true, help = "Settings file (TOML)")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate one ENVISTA export and write the validated artifacts
    Process {
        #[arg(short, long, help = "ENVISTA export file (csv/txt)")]
        input: PathBuf,

        #[arg(
            short,
            long,
            help = "Output directory [default: output/aq-validated-{YYMMDD}]"
        )]
        output_dir: Option<PathBuf>,

        #[arg(short, long, help = "Parquet compression (overrides settings)")]
        compression: Option<String>,
    },

    /// Validate every export in a directory, one output folder per file
    ProcessDirectory {
        #[arg(short, long, help = "Directory containing ENVISTA exports")]
        input_dir: PathBuf,

        #[arg(
            short,
            long,
            help = "Base output directory [default: output/aq-validated-{YYMMDD}]"
        )]
        output_dir: Option<PathBuf>,

        #[arg(short, long, help = "Parquet compression (overrides settings)")]
        compression: Option<String>,

        #[arg(long, default_value_t = num_cpus::get())]
        max_workers: usize,

        #[arg(
            long,
            help = "Only files whose name contains this pattern (e.g., 'Trs_')",
            default_value = ""
        )]
        file_pattern: String,
    },

    /// Run the validation and report results without writing artifacts
    Validate {
        #[arg(short, long, help = "ENVISTA export file (csv/txt)")]
        input: PathBuf,
    },

    /// Print the effective settings and the QC tables as JSON
    Config,

    /// Display information about a validated Parquet file
    Info {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = "10")]
        sample: usize,
    },
}
