use crate::config::ExportLayout;
use crate::error::{ProcessingError, Result};
use crate::models::{ColumnLabel, LongFormData, LongReading, RawExport};
use crate::utils::constants::TIMESTAMP_COLUMN;
use crate::utils::timestamp::parse_timestamp;
use encoding_rs::{UTF_8, WINDOWS_1252};
use std::borrow::Cow;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Reads ENVISTA exports and reshapes them from the wide multi-header layout
/// into long-form readings.
pub struct EnvistaReader {
    layout: ExportLayout,
    delimiter: u8,
}

impl EnvistaReader {
    pub fn new() -> Self {
        Self {
            layout: ExportLayout::default(),
            delimiter: b',',
        }
    }

    pub fn with_layout(mut self, layout: ExportLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Read an export file and reshape it in one go
    pub fn read_long_form(&self, path: &Path) -> Result<LongFormData> {
        let export = self.read_export(path)?;
        self.reshape(&export)
    }

    /// Load a delimited-text export into a raw grid
    pub fn read_export(&self, path: &Path) -> Result<RawExport> {
        let bytes = fs::read(path)?;
        let text = decode_export(&bytes);
        let export = self.parse_grid(&text)?;

        debug!(
            "Read {} rows x {} columns from {}",
            export.rows.len(),
            export.width(),
            path.display()
        );
        Ok(export)
    }

    /// Parse delimited text into a raw grid.
    ///
    /// Header offsets are positional, so every physical line becomes one row
    /// and blank lines come back as empty rows. ENVISTA never quotes line
    /// breaks, so each line is parsed as a single record.
    pub fn parse_grid(&self, text: &str) -> Result<RawExport> {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter);

        let mut rows = Vec::new();
        for (index, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                rows.push(Vec::new());
                continue;
            }

            let mut record = csv::StringRecord::new();
            builder
                .from_reader(line.as_bytes())
                .read_record(&mut record)
                .map_err(|e| {
                    ProcessingError::Load(format!(
                        "not a tabular export (line {}): {}",
                        index + 1,
                        e
                    ))
                })?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(RawExport::new(rows))
    }

    /// Reshape the wide export into long-form readings.
    ///
    /// Rows whose timestamp cannot be parsed are dropped; empty cells produce no
    /// reading. Fails when there is nothing below the header block.
    pub fn reshape(&self, export: &RawExport) -> Result<LongFormData> {
        if export.rows.len() <= self.layout.data_row {
            return Err(ProcessingError::Load(format!(
                "expected data from row {}, export has {} rows",
                self.layout.data_row + 1,
                export.rows.len()
            )));
        }

        let columns = self.infer_columns(export);
        let unlabelled: Vec<String> = columns
            .iter()
            .skip(TIMESTAMP_COLUMN + 1)
            .filter(|c| matches!(c, ColumnLabel::Placeholder(_)))
            .map(ColumnLabel::name)
            .collect();
        if !unlabelled.is_empty() {
            debug!("Columns without station or parameter label: {:?}", unlabelled);
        }
        let mut data = LongFormData {
            columns,
            ..Default::default()
        };

        for row in &export.rows[self.layout.data_row..] {
            let timestamp = row
                .get(TIMESTAMP_COLUMN)
                .and_then(|cell| parse_timestamp(cell));

            let Some(timestamp) = timestamp else {
                data.dropped_rows += 1;
                continue;
            };
            data.timestamps.push(timestamp);

            for (index, label) in data.columns.iter().enumerate().skip(TIMESTAMP_COLUMN + 1) {
                let ColumnLabel::Mapped { station, parameter } = label else {
                    continue;
                };
                let Some(raw) = row.get(index).filter(|cell| !cell.is_empty()) else {
                    continue;
                };
                data.readings.push(LongReading::new(
                    timestamp,
                    station.as_str(),
                    parameter.as_str(),
                    Some(raw.clone()),
                ));
            }
        }

        if data.dropped_rows > 0 {
            warn!(
                "Dropped {} data rows with unparseable timestamps",
                data.dropped_rows
            );
        }
        info!(
            "Reshaped export: {} timestamps, {} mapped columns, {} readings",
            data.timestamps.len(),
            data.mapped_columns(),
            data.readings.len()
        );

        Ok(data)
    }

    /// Build a typed label for every column from the station and parameter rows
    fn infer_columns(&self, export: &RawExport) -> Vec<ColumnLabel> {
        (0..export.width())
            .map(|index| {
                if index == TIMESTAMP_COLUMN {
                    return ColumnLabel::Placeholder("DateTime".to_string());
                }
                let station = label_at(export, self.layout.station_row, index);
                let parameter = label_at(export, self.layout.parameter_row, index);
                match (station, parameter) {
                    (Some(station), Some(parameter)) => ColumnLabel::Mapped {
                        station: station.to_string(),
                        parameter: parameter.to_string(),
                    },
                    _ => ColumnLabel::placeholder(index),
                }
            })
            .collect()
    }
}

impl Default for EnvistaReader {
    fn default() -> Self {
        Self::new()
    }
}

fn label_at(export: &RawExport, row: usize, column: usize) -> Option<&str> {
    export
        .cell(row, column)
        .map(str::trim)
        .filter(|label| !label.is_empty())
}

/// ENVISTA exports are UTF-8 or Windows-1252 depending on the logger's locale
fn decode_export(bytes: &[u8]) -> Cow<'_, str> {
    let (text, _, had_errors) = UTF_8.decode(bytes);
    if !had_errors {
        return text;
    }
    let (text, _, _) = WINDOWS_1252.decode(bytes);
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample_export() -> RawExport {
        RawExport::from_str_rows(&[
            &["Envista report"],
            &[""],
            &["Date & Time", "Atemajac", "Atemajac", "", "Oblatos"],
            &["", "O3", "TempInt", "PM10", "NO2"],
            &["", "ppm", "°C", "ug/m3", "ppm"],
            &["2024-01-15 01:00", "0.021", "25.1", "30", "InvId"],
            &["Minimum", "0.001", "20.0", "1", "0.001"],
            &["2024-01-15 02:00", "", "25.3", "31", "0.018"],
        ])
    }

    #[test]
    fn test_reshape_long_form() {
        let reader = EnvistaReader::new();
        let data = reader.reshape(&sample_export()).unwrap();

        assert_eq!(data.timestamps.len(), 2);
        assert_eq!(data.dropped_rows, 1);
        assert_eq!(data.mapped_columns(), 3);

        // Column 3 has no station label
        assert_eq!(data.columns[3], ColumnLabel::Placeholder("Col_3".to_string()));

        let first = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(1, 0, 0)
            .unwrap();
        assert_eq!(
            data.readings[0],
            LongReading::new(first, "Atemajac", "O3", Some("0.021".to_string()))
        );
        assert!(data
            .readings
            .iter()
            .any(|r| r.station == "Oblatos" && r.raw.as_deref() == Some("InvId")));

        // Empty O3 cell at 02:00 produces no reading; placeholder column never does
        assert_eq!(data.readings.len(), 3 + 2);
        assert!(data.readings.iter().all(|r| r.parameter != "PM10"));
    }

    #[test]
    fn test_reshape_without_data_rows_fails() {
        let export = RawExport::from_str_rows(&[
            &["Envista report"],
            &[""],
            &["Date & Time", "Atemajac"],
            &["", "O3"],
        ]);
        let result = EnvistaReader::new().reshape(&export);
        assert!(matches!(result, Err(ProcessingError::Load(_))));
    }

    #[test]
    fn test_reshape_with_no_parseable_timestamps_is_empty() {
        let export = RawExport::from_str_rows(&[
            &[""],
            &[""],
            &["", "Atemajac"],
            &["", "O3"],
            &["", "ppm"],
            &["Average", "0.02"],
        ]);
        let data = EnvistaReader::new().reshape(&export).unwrap();
        assert!(data.is_empty());
        assert!(data.readings.is_empty());
    }

    #[test]
    fn test_read_windows_1252_export() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        let text = "\n\n,Estación Centro\n,Radiación\n,W/m2\n2024-01-15 01:00,512.3\n";
        let (bytes, _, _) = WINDOWS_1252.encode(text);
        file.write_all(&bytes)?;

        let data = EnvistaReader::new().read_long_form(file.path())?;
        assert_eq!(data.readings.len(), 1);
        assert_eq!(data.readings[0].station, "Estación Centro");
        assert_eq!(data.readings[0].parameter, "Radiación");
        Ok(())
    }

    #[test]
    fn test_custom_delimiter() -> Result<()> {
        let reader = EnvistaReader::new().with_delimiter(b';');
        let export = reader.parse_grid("a;b;c\n1;2\n")?;
        assert_eq!(export.rows.len(), 2);
        assert_eq!(export.width(), 3);
        assert_eq!(export.cell(1, 1), Some("2"));
        Ok(())
    }

    #[test]
    fn test_blank_lines_keep_row_offsets() -> Result<()> {
        let export = EnvistaReader::new().parse_grid("title\n\n,Atemajac\n,O3\n\n2024-01-15 01:00,0.02\n")?;
        assert_eq!(export.rows.len(), 6);
        assert!(export.rows[1].iter().all(|c| c.is_empty()));
        assert_eq!(export.cell(2, 1), Some("Atemajac"));
        assert_eq!(export.cell(5, 1), Some("0.02"));
        Ok(())
    }

    #[test]
    fn test_blank_lines_with_crlf_and_leading_blanks() -> Result<()> {
        let export =
            EnvistaReader::new().parse_grid("\r\n\r\n,Atemajac\r\n,O3\r\n,ppm\r\n\r\n2024-01-15 01:00,0.02\r\n")?;
        assert_eq!(export.rows.len(), 7);
        assert!(export.rows[0].is_empty());
        assert!(export.rows[1].is_empty());
        assert_eq!(export.cell(2, 1), Some("Atemajac"));
        assert!(export.rows[5].is_empty());
        assert_eq!(export.cell(6, 0), Some("2024-01-15 01:00"));
        Ok(())
    }

    #[test]
    fn test_default_layout_export_with_blank_second_line() -> Result<()> {
        let reader = EnvistaReader::new();
        let export = reader.parse_grid(
            "Envista\n\nDate & Time,Atemajac\n,O3\n,ppm\n2024-01-15 01:00,0.021\n",
        )?;
        let data = reader.reshape(&export)?;
        assert_eq!(data.mapped_columns(), 1);
        assert_eq!(data.readings.len(), 1);
        assert_eq!(data.readings[0].station, "Atemajac");
        assert_eq!(data.readings[0].parameter, "O3");
        Ok(())
    }
}
