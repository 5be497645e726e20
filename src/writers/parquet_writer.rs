use crate::error::{ProcessingError, Result};
use crate::models::{CanonicalRecord, Cell, Parameter, QualityFlag, Station};
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DEFAULT_ROW_GROUP_SIZE,
};
use arrow::array::*;
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::DateTime;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// Writes validated records as a wide Parquet table: one value column and one
/// flag column per parameter.
pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Write validated records to a Parquet file, one batch per row group
    pub fn write_records(&self, records: &[CanonicalRecord], path: &Path) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let schema = Self::create_schema();
        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;
        for chunk in records.chunks(self.row_group_size.max(1)) {
            let batch = Self::records_to_batch(chunk, schema.clone())?;
            writer.write(&batch)?;
        }
        writer.close()?;

        Ok(())
    }

    fn create_schema() -> Arc<Schema> {
        let mut fields = vec![
            Field::new("STATION", DataType::Utf8, false),
            Field::new("DATE", DataType::Timestamp(TimeUnit::Second, None), false),
            Field::new("HOUR", DataType::UInt32, false),
        ];
        for parameter in Parameter::ALL {
            fields.push(Field::new(parameter.code(), DataType::Float64, true));
            fields.push(Field::new(flag_column(parameter), DataType::Utf8, true));
        }

        Arc::new(Schema::new(fields))
    }

    fn records_to_batch(records: &[CanonicalRecord], schema: Arc<Schema>) -> Result<RecordBatch> {
        let stations: Vec<&str> = records.iter().map(|r| r.station.code()).collect();
        let dates: Vec<i64> = records
            .iter()
            .map(|r| r.date.and_utc().timestamp())
            .collect();
        let hours: Vec<u32> = records.iter().map(|r| r.hour).collect();

        let mut columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(stations)),
            Arc::new(TimestampSecondArray::from(dates)),
            Arc::new(UInt32Array::from(hours)),
        ];

        for parameter in Parameter::ALL {
            let values: Vec<Option<f64>> = records.iter().map(|r| r.value(parameter)).collect();
            let flags: Vec<Option<&str>> = records
                .iter()
                .map(|r| r.get(parameter).and_then(|c| c.flag()).map(|f| f.code()))
                .collect();
            columns.push(Arc::new(Float64Array::from(values)));
            columns.push(Arc::new(StringArray::from(flags)));
        }

        Ok(RecordBatch::try_new(schema, columns)?)
    }

    /// Read up to `limit` records back from a validated Parquet file
    pub fn read_records(&self, path: &Path, limit: usize) -> Result<Vec<CanonicalRecord>> {
        let file = File::open(path)?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?
            .with_batch_size(limit.clamp(1, 8192))
            .build()?;

        let mut records = Vec::new();
        for batch in reader {
            let batch = batch?;
            let stations = typed_column::<StringArray>(&batch, "STATION")?;
            let dates = typed_column::<TimestampSecondArray>(&batch, "DATE")?;

            for row in 0..batch.num_rows() {
                if records.len() >= limit {
                    return Ok(records);
                }

                let station = Station::from_code(stations.value(row)).ok_or_else(|| {
                    ProcessingError::Conversion(format!(
                        "Unknown station code in Parquet file: {}",
                        stations.value(row)
                    ))
                })?;
                let date = DateTime::from_timestamp(dates.value(row), 0)
                    .map(|d| d.naive_utc())
                    .ok_or_else(|| {
                        ProcessingError::Conversion("Invalid date in Parquet file".to_string())
                    })?;

                let mut record = CanonicalRecord::new(station, date);
                for parameter in Parameter::ALL {
                    if let Some(cell) = read_cell(&batch, parameter, row)? {
                        record.set(parameter, cell);
                    }
                }
                records.push(record);
            }
        }

        Ok(records)
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        use parquet::file::reader::{FileReader, SerializedFileReader};

        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let row_groups = metadata.num_row_groups();
        let total_rows = metadata.file_metadata().num_rows();
        let file_size = std::fs::metadata(path)?.len();
        let row_group_sizes = (0..row_groups)
            .map(|i| metadata.row_group(i).num_rows())
            .collect();
        let compression = if row_groups > 0 && metadata.row_group(0).num_columns() > 0 {
            metadata.row_group(0).column(0).compression()
        } else {
            self.compression
        };

        Ok(ParquetFileInfo {
            total_rows,
            row_groups: row_groups as i32,
            row_group_sizes,
            file_size,
            compression,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn flag_column(parameter: Parameter) -> String {
    format!("{}_FLAG", parameter.code())
}

fn typed_column<'a, T: 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<T>())
        .ok_or_else(|| ProcessingError::Conversion(format!("Invalid {} column", name)))
}

fn read_cell(batch: &RecordBatch, parameter: Parameter, row: usize) -> Result<Option<Cell>> {
    let values = typed_column::<Float64Array>(batch, parameter.code())?;
    if values.is_valid(row) {
        return Ok(Some(Cell::Value(values.value(row))));
    }

    let flag_name = flag_column(parameter);
    let flags = typed_column::<StringArray>(batch, &flag_name)?;
    if flags.is_valid(row) {
        return Ok(Some(Cell::Flag(QualityFlag::from_code(flags.value(row))?)));
    }
    Ok(None)
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub row_group_sizes: Vec<i64>,
    pub file_size: u64,
    pub compression: Compression,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        let avg_rows = if self.row_groups > 0 {
            self.total_rows as f64 / self.row_groups as f64
        } else {
            0.0
        };
        format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} MB\n\
            - Compression: {:?}\n\
            - Avg rows per group: {:.0}",
            self.total_rows,
            self.row_groups,
            self.file_size as f64 / 1_048_576.0,
            self.compression,
            avg_rows
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use tempfile::NamedTempFile;

    fn sample_records() -> Vec<CanonicalRecord> {
        (0..5)
            .map(|hour| {
                let timestamp = NaiveDate::from_ymd_opt(2024, 1, 15)
                    .unwrap()
                    .and_hms_opt(hour, 0, 0)
                    .unwrap();
                CanonicalRecord::builder()
                    .station(Station::Cen)
                    .timestamp(timestamp)
                    .value(Parameter::Ozone, 0.02)
                    .flag(Parameter::Pm25, QualityFlag::EquipmentFailure)
                    .build()
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_write_empty_records() {
        let writer = ParquetWriter::new();
        let temp_file = NamedTempFile::new().unwrap();

        let result = writer.write_records(&[], temp_file.path());
        assert!(result.is_ok());
    }

    #[test]
    fn test_write_and_read_back() -> Result<()> {
        let writer = ParquetWriter::new().with_row_group_size(2);
        let temp_file = NamedTempFile::new()?;
        let records = sample_records();

        writer.write_records(&records, temp_file.path())?;

        let info = writer.get_file_info(temp_file.path())?;
        assert_eq!(info.total_rows, 5);
        assert_eq!(info.row_groups, 3);
        assert_eq!(info.row_group_sizes, vec![2, 2, 1]);

        let read = writer.read_records(temp_file.path(), 10)?;
        assert_eq!(read, records);

        let limited = writer.read_records(temp_file.path(), 3)?;
        assert_eq!(limited.len(), 3);
        Ok(())
    }

    #[test]
    fn test_different_compressions() -> Result<()> {
        let compressions = ["snappy", "gzip", "lz4", "zstd", "none"];

        for compression in &compressions {
            let writer = ParquetWriter::new().with_compression(compression)?;
            let temp_file = NamedTempFile::new()?;

            let result = writer.write_records(&sample_records(), temp_file.path());
            assert!(result.is_ok(), "Failed with compression: {}", compression);
        }

        assert!(ParquetWriter::new().with_compression("brotli-ish").is_err());
        Ok(())
    }
}
