pub mod csv_writer;
pub mod json_writer;
pub mod parquet_writer;

pub use csv_writer::CsvWriter;
pub use json_writer::JsonReport;
pub use parquet_writer::{ParquetFileInfo, ParquetWriter};

use crate::config::Settings;
use crate::error::Result;
use crate::processors::ValidationResult;
use crate::utils::constants::{SUMMARY_JSON_FILE, VALIDATED_PARQUET_FILE};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Write the CSV sheets, `summary.json` and the Parquet table into `dir`
pub fn write_artifacts(
    dir: &Path,
    result: &ValidationResult,
    settings: &Settings,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let mut written = CsvWriter::new().write_all(dir, &result.records, &result.summary)?;

    let json_path = dir.join(SUMMARY_JSON_FILE);
    JsonReport::new(&result.records, &result.summary, &result.qc_report).write(&json_path)?;
    written.push(json_path);

    let parquet_path = dir.join(VALIDATED_PARQUET_FILE);
    ParquetWriter::new()
        .with_compression(&settings.compression)?
        .with_row_group_size(settings.row_group_size)
        .write_records(&result.records, &parquet_path)?;
    written.push(parquet_path);

    info!("Wrote {} artifacts to {}", written.len(), dir.display());
    Ok(written)
}
