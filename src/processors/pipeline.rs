use crate::analyzers::{Summarizer, ValidationSummary};
use crate::config::Settings;
use crate::error::{ProcessingError, Result};
use crate::models::{CanonicalRecord, RawExport};
use crate::processors::formatter::format_records;
use crate::processors::{QcReport, QualityControl, SchemaConverter};
use crate::readers::EnvistaReader;
use std::path::Path;
use tracing::{debug, info};

/// Outcome of one pipeline run.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub records: Vec<CanonicalRecord>,
    pub summary: ValidationSummary,
    pub qc_report: QcReport,
}

/// Runs one export through reshape, conversion, QC, formatting and summary.
///
/// Each run owns its dataset; a `Pipeline` holds configuration only and can be
/// shared between threads.
pub struct Pipeline {
    reader: EnvistaReader,
    converter: SchemaConverter,
    quality_control: QualityControl,
    summarizer: Summarizer,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            reader: EnvistaReader::new(),
            converter: SchemaConverter::new(),
            quality_control: QualityControl::new(),
            summarizer: Summarizer::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            reader: EnvistaReader::new()
                .with_layout(settings.layout)
                .with_delimiter(settings.delimiter_byte()),
            ..Self::new()
        }
    }

    /// Read an export file and validate it
    pub fn run_file(&self, path: &Path) -> Result<ValidationResult> {
        info!("Validating {}", path.display());
        let export = self.reader.read_export(path)?;
        self.run(&export)
    }

    /// Validate an in-memory export grid
    pub fn run(&self, export: &RawExport) -> Result<ValidationResult> {
        let long_form = self.reader.reshape(export)?;
        if long_form.is_empty() {
            return Err(ProcessingError::Load(
                "no data row has a parseable timestamp".to_string(),
            ));
        }

        let records = self.converter.convert(&long_form)?;
        if records.is_empty() {
            return Err(ProcessingError::Conversion(
                "no station-hour record could be built from the export".to_string(),
            ));
        }

        Ok(self.validate_records(records))
    }

    /// QC, formatting and summary over already-converted records
    pub fn validate_records(&self, mut records: Vec<CanonicalRecord>) -> ValidationResult {
        let qc_report = self.quality_control.run(&mut records);
        format_records(&mut records);
        let summary = self.summarizer.summarize(&records);
        debug!("{}", summary.summary());

        ValidationResult {
            records,
            summary,
            qc_report,
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cell, Parameter, QualityFlag, Station};

    fn export(rows: &[&[&str]]) -> RawExport {
        let mut all: Vec<&[&str]> = vec![
            &["Envista"],
            &[""],
            &["Date & Time", "Atemajac", "Atemajac", "Atemajac", "Oblatos"],
            &["", "O3", "TempInt", "CO", "PM10"],
            &["", "ppm", "C", "ppm", "ug/m3"],
        ];
        all.extend_from_slice(rows);
        RawExport::from_str_rows(&all)
    }

    #[test]
    fn test_full_run() {
        let raw = export(&[
            &["15/01/2024 01:00", "0.0214", "35", "-0.01", "30.4"],
            &["15/01/2024 02:00", "0.0226", "25", "Zero", "NoData"],
            &["Average", "0.022", "30", "1", "30"],
        ]);
        let result = Pipeline::new().run(&raw).unwrap();

        assert_eq!(result.records.len(), 4);
        let atm: Vec<&CanonicalRecord> = result
            .records
            .iter()
            .filter(|r| r.station == Station::Atm)
            .collect();

        // Cabin at 35 °C invalidates the pollutants of the first hour
        assert_eq!(
            atm[0].get(Parameter::Ozone),
            Some(Cell::Flag(QualityFlag::InvalidByOperator))
        );
        assert_eq!(atm[0].value(Parameter::InternalTemperature), Some(35.0));
        assert_eq!(
            atm[1].get(Parameter::CarbonMonoxide),
            Some(Cell::Flag(QualityFlag::Calibration))
        );
        assert_eq!(atm[1].value(Parameter::Ozone), Some(0.023));

        let obl: Vec<&CanonicalRecord> = result
            .records
            .iter()
            .filter(|r| r.station == Station::Obl)
            .collect();
        assert_eq!(obl[0].value(Parameter::Pm10), Some(30.0));
        assert_eq!(obl[1].get(Parameter::Pm10), Some(Cell::Flag(QualityFlag::NoData)));

        assert_eq!(result.summary.general.total_records, 4);
        assert_eq!(result.qc_report.cabin_temperature, 2);
    }

    #[test]
    fn test_run_is_deterministic() {
        let raw = export(&[
            &["2024-01-15 01:00", "0.01", "25", "0.5", "12"],
            &["2024-01-15 02:00", "0.01", "25", "0.5", "12"],
            &["2024-01-15 03:00", "0.01", "25", "0.5", "12"],
            &["2024-01-15 04:00", "0.01", "25", "0.5", "12"],
        ]);
        let pipeline = Pipeline::new();
        let first = pipeline.run(&raw).unwrap();
        let second = pipeline.run(&raw).unwrap();
        assert_eq!(first.records, second.records);
        assert_eq!(first.summary, second.summary);
        assert_eq!(first.qc_report, second.qc_report);
    }

    #[test]
    fn test_no_timestamps_is_a_load_error() {
        let raw = export(&[&["Average", "0.01", "25", "0.5", "12"]]);
        assert!(matches!(
            Pipeline::new().run(&raw),
            Err(ProcessingError::Load(_))
        ));
    }

    #[test]
    fn test_nothing_converted_is_a_conversion_error() {
        let raw = export(&[&["2024-01-15 01:00", "", "", "", ""]]);
        assert!(matches!(
            Pipeline::new().run(&raw),
            Err(ProcessingError::Conversion(_))
        ));
    }
}
