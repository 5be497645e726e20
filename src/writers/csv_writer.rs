use crate::analyzers::ValidationSummary;
use crate::error::Result;
use crate::models::{CanonicalRecord, Cell, Parameter};
use crate::utils::constants::{
    CONFIGURATION_FILE, DATE_FORMAT, DETAILED_STATISTICS_FILE, FLAG_SUMMARY_DETAILED_FILE,
    FLAG_SUMMARY_GLOBAL_FILE, GENERAL_STATISTICS_FILE, VALIDATED_DATA_FILE,
};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Serialize)]
struct ConfigurationRow {
    parameter: Parameter,
    name: &'static str,
    min: Option<f64>,
    max: Option<f64>,
    detection_limit: Option<f64>,
    decimals: u32,
}

/// Writes the validated dataset and its summary as a set of CSV sheets.
pub struct CsvWriter;

impl CsvWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write every sheet into `dir`, returning the files written
    pub fn write_all(
        &self,
        dir: &Path,
        records: &[CanonicalRecord],
        summary: &ValidationSummary,
    ) -> Result<Vec<PathBuf>> {
        let sheets = [
            VALIDATED_DATA_FILE,
            FLAG_SUMMARY_GLOBAL_FILE,
            FLAG_SUMMARY_DETAILED_FILE,
            GENERAL_STATISTICS_FILE,
            DETAILED_STATISTICS_FILE,
            CONFIGURATION_FILE,
        ]
        .map(|name| dir.join(name));

        self.write_validated_data(&sheets[0], records)?;
        self.write_flag_summary_global(&sheets[1], summary)?;
        self.write_flag_summary_detailed(&sheets[2], summary)?;
        self.write_general_statistics(&sheets[3], summary)?;
        self.write_detailed_statistics(&sheets[4], summary)?;
        self.write_configuration(&sheets[5])?;

        debug!("Wrote {} CSV sheets to {}", sheets.len(), dir.display());
        Ok(sheets.to_vec())
    }

    /// Canonical wide table; cells hold the value, the flag code, or nothing
    pub fn write_validated_data(&self, path: &Path, records: &[CanonicalRecord]) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;

        let mut header = vec!["STATION", "DATE", "HOUR"];
        header.extend(Parameter::ALL.iter().map(|p| p.code()));
        writer.write_record(&header)?;

        for record in records {
            let mut row = vec![
                record.station.code().to_string(),
                record.date_string(),
                record.hour.to_string(),
            ];
            row.extend(record.cells().map(|(_, cell)| match cell {
                Some(Cell::Value(v)) => v.to_string(),
                Some(Cell::Flag(f)) => f.code().to_string(),
                None => String::new(),
            }));
            writer.write_record(&row)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Flag tally; the header is written even when nothing was flagged
    pub fn write_flag_summary_global(&self, path: &Path, summary: &ValidationSummary) -> Result<()> {
        let mut writer = headed_writer(path, &["flag", "description", "count"])?;
        for row in &summary.flag_totals {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_flag_summary_detailed(
        &self,
        path: &Path,
        summary: &ValidationSummary,
    ) -> Result<()> {
        let mut writer = headed_writer(path, &["station", "parameter", "flag", "count"])?;
        for row in &summary.flag_breakdown {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_general_statistics(&self, path: &Path, summary: &ValidationSummary) -> Result<()> {
        let general = &summary.general;
        let date = |d: Option<NaiveDateTime>| {
            d.map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default()
        };
        let rows = [
            ("total_records", general.total_records.to_string()),
            ("stations", general.stations.to_string()),
            ("distinct_dates", general.distinct_dates.to_string()),
            ("distinct_days", general.distinct_days.to_string()),
            ("numeric_cells", general.numeric_cells.to_string()),
            ("first_date", date(general.first_date)),
            ("last_date", date(general.last_date)),
        ];

        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(["metric", "value"])?;
        for (metric, value) in &rows {
            writer.write_record([*metric, value.as_str()])?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_detailed_statistics(
        &self,
        path: &Path,
        summary: &ValidationSummary,
    ) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for row in &summary.statistics {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Range limits and decimals applied to each parameter
    pub fn write_configuration(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for parameter in Parameter::ALL {
            let limits = parameter.range();
            writer.serialize(ConfigurationRow {
                parameter,
                name: parameter.display_name(),
                min: limits.map(|l| l.min),
                max: limits.map(|l| l.max),
                detection_limit: limits.and_then(|l| l.detection_limit),
                decimals: parameter.decimals(),
            })?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Writer with an explicit header row, so empty sheets still describe their columns
fn headed_writer(path: &Path, header: &[&str]) -> Result<csv::Writer<File>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(header)?;
    Ok(writer)
}
