/// Canonical DATE column format
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// ENVISTA export layout (zero-based row offsets)
pub const DEFAULT_STATION_ROW: usize = 2;
pub const DEFAULT_PARAMETER_ROW: usize = 3;
pub const DEFAULT_DATA_ROW: usize = 5;
pub const TIMESTAMP_COLUMN: usize = 0;

/// Cabin temperature band in °C
pub const CABIN_TEMP_MIN: f64 = 20.0;
pub const CABIN_TEMP_MAX: f64 = 30.0;

/// Accepted (NO + NO2) / NOX band
pub const NOX_RATIO_MIN: f64 = 0.85;
pub const NOX_RATIO_MAX: f64 = 1.15;

/// Upper bound for PM2.5 / PM10
pub const PM_RATIO_MAX: f64 = 1.15;

/// Runs of identical readings longer than this many hours are suspicious
pub const MAX_CONSTANT_RUN: usize = 3;

/// Spreadsheet serial day 0
pub const SPREADSHEET_EPOCH: (i32, u32, u32) = (1899, 12, 30);
/// Smallest serial day accepted from a text cell (1970-01-01); bare numbers
/// below it are stray values such as a year, not timestamps
pub const MIN_SPREADSHEET_SERIAL: f64 = 25_569.0;

/// Processing defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;

/// Output artifact names
pub const VALIDATED_DATA_FILE: &str = "validated_data.csv";
pub const FLAG_SUMMARY_GLOBAL_FILE: &str = "flag_summary_global.csv";
pub const FLAG_SUMMARY_DETAILED_FILE: &str = "flag_summary_detailed.csv";
pub const GENERAL_STATISTICS_FILE: &str = "general_statistics.csv";
pub const DETAILED_STATISTICS_FILE: &str = "detailed_statistics.csv";
pub const CONFIGURATION_FILE: &str = "configuration.csv";
pub const SUMMARY_JSON_FILE: &str = "summary.json";
pub const VALIDATED_PARQUET_FILE: &str = "validated_data.parquet";

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";
