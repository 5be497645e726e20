use crate::analyzers::{FlagCount, GeneralStatistics, ParameterStatistics, ValidationSummary};
use crate::error::Result;
use crate::models::{CanonicalRecord, Station};
use crate::processors::QcReport;
use crate::utils::constants::DATE_FORMAT;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Top-level layout of `summary.json`.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub total_records: usize,
    pub stations: Vec<Station>,
    pub date_range: Option<[String; 2]>,
    pub flag_totals: &'a [FlagCount],
    pub general: &'a GeneralStatistics,
    pub quality_control: &'a QcReport,
    pub statistics: &'a [ParameterStatistics],
    pub records: &'a [CanonicalRecord],
}

impl<'a> JsonReport<'a> {
    pub fn new(
        records: &'a [CanonicalRecord],
        summary: &'a ValidationSummary,
        qc_report: &'a QcReport,
    ) -> Self {
        let stations: BTreeSet<Station> = records.iter().map(|r| r.station).collect();
        let general = &summary.general;
        let date_range = general
            .first_date
            .zip(general.last_date)
            .map(|(first, last)| [first, last].map(|d| d.format(DATE_FORMAT).to_string()));

        Self {
            total_records: records.len(),
            stations: stations.into_iter().collect(),
            date_range,
            flag_totals: &summary.flag_totals,
            general,
            quality_control: qc_report,
            statistics: &summary.statistics,
            records,
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::Summarizer;
    use crate::models::{Parameter, QualityFlag};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn test_json_report() -> Result<()> {
        let timestamp = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(1, 0, 0)
            .unwrap();
        let records = vec![CanonicalRecord::builder()
            .station(Station::Mir)
            .timestamp(timestamp)
            .value(Parameter::Pm10, 33.0)
            .flag(Parameter::Ozone, QualityFlag::OutOfRange)
            .build()?];
        let summary = Summarizer::new().summarize(&records);
        let qc = QcReport::default();

        let dir = TempDir::new()?;
        let path = dir.path().join("summary.json");
        JsonReport::new(&records, &summary, &qc).write(&path)?;

        let json: serde_json::Value = serde_json::from_reader(File::open(&path)?)?;
        assert_eq!(json["total_records"], 1);
        assert_eq!(json["stations"][0], "MIR");
        assert_eq!(json["date_range"][0], "2024-01-15 01:00");
        assert_eq!(json["flag_totals"][0]["flag"], "IR");
        assert_eq!(json["records"][0]["O3"], "IR");
        assert_eq!(json["records"][0]["PM10"], 33.0);
        assert_eq!(json["records"][0]["NO"], "");
        Ok(())
    }
}
