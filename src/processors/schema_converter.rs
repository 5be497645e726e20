use crate::error::{ProcessingError, Result};
use crate::models::{
    CanonicalRecord, Cell, ColumnLabel, LongFormData, LongReading, Parameter, QualityFlag,
    Station,
};
use crate::processors::flag_mapper::map_status_token;
use chrono::NaiveDateTime;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// Projects long-form readings into canonical station-hour records.
pub struct SchemaConverter;

impl SchemaConverter {
    pub fn new() -> Self {
        Self
    }

    /// Convert long-form readings into canonical records ordered by
    /// (station, date, hour). Station-hours without any populated cell are
    /// not emitted.
    pub fn convert(&self, data: &LongFormData) -> Result<Vec<CanonicalRecord>> {
        if !data.is_empty() && !self.has_canonical_columns(&data.columns) {
            return Err(ProcessingError::Conversion(
                "no export column matches a registered station and parameter".to_string(),
            ));
        }

        let mut grouped: BTreeMap<(Station, NaiveDateTime), CanonicalRecord> = BTreeMap::new();
        let mut unknown_stations = BTreeSet::new();
        let mut unknown_parameters = BTreeSet::new();

        for reading in &data.readings {
            let Some(station) = Station::from_envista_name(&reading.station) else {
                unknown_stations.insert(reading.station.as_str());
                continue;
            };
            let Some(parameter) = Parameter::from_envista_label(&reading.parameter) else {
                unknown_parameters.insert(reading.parameter.as_str());
                continue;
            };
            let Some(cell) = self.convert_cell(reading) else {
                continue;
            };

            let blank = CanonicalRecord::new(station, reading.timestamp);
            grouped
                .entry((station, blank.date))
                .or_insert(blank)
                .set(parameter, cell);
        }

        if !unknown_stations.is_empty() {
            warn!("Ignored columns for unregistered stations: {:?}", unknown_stations);
        }
        if !unknown_parameters.is_empty() {
            debug!("Ignored unrecognised parameters: {:?}", unknown_parameters);
        }

        let records: Vec<CanonicalRecord> = grouped
            .into_values()
            .filter(|record| !record.is_empty())
            .collect();

        info!(
            "Converted {} readings into {} station-hour records",
            data.readings.len(),
            records.len()
        );
        Ok(records)
    }

    /// Resolve one raw cell: flag token, measurement, or `IO` for text that
    /// maps to neither.
    fn convert_cell(&self, reading: &LongReading) -> Option<Cell> {
        let raw = reading.raw.as_deref()?;
        let cell = match map_status_token(raw) {
            Some(flag) => Cell::Flag(flag),
            None => raw
                .trim()
                .parse::<f64>()
                .map(Cell::Value)
                .unwrap_or(Cell::Flag(QualityFlag::InvalidByOperator)),
        };
        Some(cell)
    }

    fn has_canonical_columns(&self, columns: &[ColumnLabel]) -> bool {
        columns.iter().any(|label| {
            matches!(
                (label.station(), label.parameter()),
                (Some(station), Some(parameter))
                    if Station::from_envista_name(station).is_some()
                        && Parameter::from_envista_label(parameter).is_some()
            )
        })
    }
}

impl Default for SchemaConverter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn mapped(station: &str, parameter: &str) -> ColumnLabel {
        ColumnLabel::Mapped {
            station: station.to_string(),
            parameter: parameter.to_string(),
        }
    }

    fn long_form(readings: Vec<LongReading>) -> LongFormData {
        let mut timestamps: Vec<NaiveDateTime> = readings.iter().map(|r| r.timestamp).collect();
        timestamps.dedup();
        let columns = readings
            .iter()
            .map(|r| mapped(&r.station, &r.parameter))
            .collect();
        LongFormData {
            columns,
            readings,
            timestamps,
            dropped_rows: 0,
        }
    }

    fn reading(hour: u32, station: &str, parameter: &str, raw: &str) -> LongReading {
        LongReading::new(at(hour, 0), station, parameter, Some(raw.to_string()))
    }

    #[test]
    fn test_convert_values_and_flags() {
        let data = long_form(vec![
            reading(1, "Atemajac", "O3", "0.021"),
            reading(1, "Atemajac", "TempInt", "24.5"),
            reading(1, "Atemajac", "CO", "Zero"),
            reading(1, "Atemajac", "SO2", "Purge"),
        ]);

        let records = SchemaConverter::new().convert(&data).unwrap();
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.station, Station::Atm);
        assert_eq!(record.hour, 1);
        assert_eq!(record.get(Parameter::Ozone), Some(Cell::Value(0.021)));
        assert_eq!(
            record.get(Parameter::InternalTemperature),
            Some(Cell::Value(24.5))
        );
        assert_eq!(
            record.get(Parameter::CarbonMonoxide),
            Some(Cell::Flag(QualityFlag::Calibration))
        );
        assert_eq!(
            record.get(Parameter::SulfurDioxide),
            Some(Cell::Flag(QualityFlag::InvalidByOperator))
        );
        assert_eq!(record.get(Parameter::Pm10), None);
    }

    #[test]
    fn test_records_are_sorted_by_station_then_time() {
        let data = long_form(vec![
            reading(2, "Vallarta", "O3", "0.01"),
            reading(1, "Vallarta", "O3", "0.02"),
            reading(2, "Las Aguilas", "O3", "0.03"),
            reading(1, "Atemajac", "O3", "0.04"),
        ]);

        let records = SchemaConverter::new().convert(&data).unwrap();
        let keys: Vec<(&str, u32)> = records.iter().map(|r| (r.station.code(), r.hour)).collect();
        assert_eq!(keys, vec![("AGU", 2), ("ATM", 1), ("VAL", 1), ("VAL", 2)]);
    }

    #[test]
    fn test_unknown_stations_and_parameters_are_skipped() {
        let data = long_form(vec![
            reading(1, "Atemajac", "O3", "0.02"),
            reading(1, "Guadalajara Norte", "O3", "0.02"),
            reading(2, "Atemajac", "Benzene", "1.2"),
        ]);

        let records = SchemaConverter::new().convert(&data).unwrap();
        // Hour 2 has no recognised cell, so the station-hour is elided
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].station, Station::Atm);
        assert_eq!(records[0].hour, 1);
    }

    #[test]
    fn test_duplicate_keys_merge_into_one_record() {
        let mut later = reading(1, "Oblatos", "O3", "0.05");
        later.timestamp = at(1, 0) + chrono::Duration::seconds(30);
        let data = long_form(vec![
            reading(1, "Oblatos", "O3", "0.04"),
            reading(1, "Oblatos", "NO", "0.01"),
            later,
        ]);

        let records = SchemaConverter::new().convert(&data).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value(Parameter::Ozone), Some(0.05));
        assert_eq!(records[0].value(Parameter::NitricOxide), Some(0.01));
    }

    #[test]
    fn test_no_canonical_columns_is_a_conversion_error() {
        let data = long_form(vec![reading(1, "Unknown", "X", "1")]);
        let result = SchemaConverter::new().convert(&data);
        assert!(matches!(result, Err(ProcessingError::Conversion(_))));
    }

    #[test]
    fn test_empty_long_form_converts_to_nothing() {
        let records = SchemaConverter::new().convert(&LongFormData::default()).unwrap();
        assert!(records.is_empty());
    }
}
