use chrono::{NaiveDateTime, Timelike};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{ProcessingError, Result};
use crate::models::{Cell, Parameter, QualityFlag, Station, PARAMETER_COUNT};
use crate::utils::constants::DATE_FORMAT;

/// One canonical row: a station-hour with one optional cell per parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRecord {
    pub station: Station,
    /// Observation timestamp truncated to the minute.
    pub date: NaiveDateTime,
    pub hour: u32,
    cells: [Option<Cell>; PARAMETER_COUNT],
}

impl CanonicalRecord {
    pub fn new(station: Station, timestamp: NaiveDateTime) -> Self {
        let date = truncate_to_minute(timestamp);
        Self {
            station,
            hour: date.hour(),
            date,
            cells: [None; PARAMETER_COUNT],
        }
    }

    pub fn builder() -> CanonicalRecordBuilder {
        CanonicalRecordBuilder::new()
    }

    pub fn get(&self, parameter: Parameter) -> Option<Cell> {
        self.cells[parameter.index()]
    }

    pub fn value(&self, parameter: Parameter) -> Option<f64> {
        self.get(parameter).and_then(|c| c.value())
    }

    pub fn set(&mut self, parameter: Parameter, cell: Cell) {
        self.cells[parameter.index()] = Some(cell);
    }

    /// Replace a numeric cell with a flag. Cells that are empty or already
    /// flagged are left alone; returns whether the cell changed.
    pub fn flag_if_numeric(&mut self, parameter: Parameter, flag: QualityFlag) -> bool {
        let slot = &mut self.cells[parameter.index()];
        if matches!(slot, Some(Cell::Value(_))) {
            *slot = Some(Cell::Flag(flag));
            true
        } else {
            false
        }
    }

    /// Replace a numeric value with another numeric value.
    pub fn replace_value(&mut self, parameter: Parameter, value: f64) -> bool {
        let slot = &mut self.cells[parameter.index()];
        if matches!(slot, Some(Cell::Value(_))) {
            *slot = Some(Cell::Value(value));
            true
        } else {
            false
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = (Parameter, Option<Cell>)> + '_ {
        Parameter::ALL.into_iter().map(|p| (p, self.cells[p.index()]))
    }

    pub fn populated_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn numeric_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| matches!(c, Some(Cell::Value(_))))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.populated_count() == 0
    }

    pub fn date_string(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}

fn truncate_to_minute(timestamp: NaiveDateTime) -> NaiveDateTime {
    timestamp
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(timestamp)
}

impl Serialize for CanonicalRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3 + PARAMETER_COUNT))?;
        map.serialize_entry("STATION", self.station.code())?;
        map.serialize_entry("DATE", &self.date_string())?;
        map.serialize_entry("HOUR", &self.hour)?;
        for (parameter, cell) in self.cells() {
            match cell {
                Some(cell) => map.serialize_entry(parameter.code(), &cell)?,
                None => map.serialize_entry(parameter.code(), "")?,
            }
        }
        map.end()
    }
}

pub struct CanonicalRecordBuilder {
    station: Option<Station>,
    timestamp: Option<NaiveDateTime>,
    cells: Vec<(Parameter, Cell)>,
}

impl Default for CanonicalRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CanonicalRecordBuilder {
    pub fn new() -> Self {
        Self {
            station: None,
            timestamp: None,
            cells: Vec::new(),
        }
    }

    pub fn station(mut self, station: Station) -> Self {
        self.station = Some(station);
        self
    }

    pub fn timestamp(mut self, timestamp: NaiveDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn value(mut self, parameter: Parameter, value: f64) -> Self {
        self.cells.push((parameter, Cell::Value(value)));
        self
    }

    pub fn flag(mut self, parameter: Parameter, flag: QualityFlag) -> Self {
        self.cells.push((parameter, Cell::Flag(flag)));
        self
    }

    pub fn build(self) -> Result<CanonicalRecord> {
        let station = self
            .station
            .ok_or_else(|| ProcessingError::Conversion("station is required".to_string()))?;
        let timestamp = self
            .timestamp
            .ok_or_else(|| ProcessingError::Conversion("timestamp is required".to_string()))?;

        let mut record = CanonicalRecord::new(station, timestamp);
        for (parameter, cell) in self.cells {
            record.set(parameter, cell);
        }
        Ok(record)
    }
}
