use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::QualityFlag;

/// Content of one canonical cell: a measurement or a quality flag, never both.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Value(f64),
    Flag(QualityFlag),
}

impl Cell {
    pub fn value(&self) -> Option<f64> {
        match self {
            Cell::Value(v) => Some(*v),
            Cell::Flag(_) => None,
        }
    }

    pub fn flag(&self) -> Option<QualityFlag> {
        match self {
            Cell::Value(_) => None,
            Cell::Flag(f) => Some(*f),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Cell::Value(_))
    }
}

/// Typed label inferred for one column of the raw export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnLabel {
    Mapped { station: String, parameter: String },
    /// Column without station or parameter label; kept by position only.
    Placeholder(String),
}

impl ColumnLabel {
    pub fn placeholder(index: usize) -> Self {
        ColumnLabel::Placeholder(format!("Col_{}", index))
    }

    pub fn station(&self) -> Option<&str> {
        match self {
            ColumnLabel::Mapped { station, .. } => Some(station),
            ColumnLabel::Placeholder(_) => None,
        }
    }

    pub fn parameter(&self) -> Option<&str> {
        match self {
            ColumnLabel::Mapped { parameter, .. } => Some(parameter),
            ColumnLabel::Placeholder(_) => None,
        }
    }

    pub fn name(&self) -> String {
        match self {
            ColumnLabel::Mapped { station, parameter } => format!("{}_{}", station, parameter),
            ColumnLabel::Placeholder(name) => name.clone(),
        }
    }
}

/// One long-form reading produced by the reshaper.
#[derive(Debug, Clone, PartialEq)]
pub struct LongReading {
    pub timestamp: NaiveDateTime,
    pub station: String,
    pub parameter: String,
    /// Raw instrument cell; `None` when the export cell was empty.
    pub raw: Option<String>,
}

impl LongReading {
    pub fn new(
        timestamp: NaiveDateTime,
        station: impl Into<String>,
        parameter: impl Into<String>,
        raw: Option<String>,
    ) -> Self {
        Self {
            timestamp,
            station: station.into(),
            parameter: parameter.into(),
            raw,
        }
    }
}

/// Raw export grid as handed over by the file layer: rows of text cells,
/// header block included. Rows may have different lengths.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawExport {
    pub rows: Vec<Vec<String>>,
}

impl RawExport {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn from_str_rows(rows: &[&[&str]]) -> Self {
        Self {
            rows: rows
                .iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
    }
}

/// Output of the reshaper: inferred column labels plus long-form readings.
#[derive(Debug, Clone, Default)]
pub struct LongFormData {
    pub columns: Vec<ColumnLabel>,
    pub readings: Vec<LongReading>,
    pub timestamps: Vec<NaiveDateTime>,
    pub dropped_rows: usize,
}

impl LongFormData {
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn mapped_columns(&self) -> usize {
        self.columns
            .iter()
            .filter(|c| matches!(c, ColumnLabel::Mapped { .. }))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_accessors() {
        let value = Cell::Value(0.02);
        assert_eq!(value.value(), Some(0.02));
        assert_eq!(value.flag(), None);
        assert!(value.is_numeric());

        let flag = Cell::Flag(QualityFlag::Suspicious);
        assert_eq!(flag.value(), None);
        assert_eq!(flag.flag(), Some(QualityFlag::Suspicious));
        assert!(!flag.is_numeric());
    }

    #[test]
    fn test_cell_serializes_untagged() {
        assert_eq!(serde_json::to_string(&Cell::Value(1.5)).unwrap(), "1.5");
        assert_eq!(
            serde_json::to_string(&Cell::Flag(QualityFlag::OutOfRange)).unwrap(),
            "\"IR\""
        );
    }

    #[test]
    fn test_column_label_names() {
        let mapped = ColumnLabel::Mapped {
            station: "Atemajac".to_string(),
            parameter: "O3".to_string(),
        };
        assert_eq!(mapped.name(), "Atemajac_O3");
        assert_eq!(mapped.station(), Some("Atemajac"));
        assert_eq!(ColumnLabel::placeholder(7).name(), "Col_7");
        assert_eq!(ColumnLabel::placeholder(7).parameter(), None);
    }
}
