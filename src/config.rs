//! Runtime settings.
//!
//! The QC tables (stations, parameters, ranges, decimals, flags) are compile-time
//! constants in [`crate::models`]. What can vary between deployments is the export
//! layout and the artifact options, loaded once from an optional TOML file layered
//! under `AQV_*` environment variables.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;
use validator::{Validate, ValidationError};

use crate::error::{ProcessingError, Result};
use crate::utils::constants::{
    COMPRESSION_SNAPPY, DEFAULT_DATA_ROW, DEFAULT_PARAMETER_ROW, DEFAULT_ROW_GROUP_SIZE,
    DEFAULT_STATION_ROW,
};

/// Row offsets of the ENVISTA header block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_layout_order"))]
pub struct ExportLayout {
    pub station_row: usize,
    pub parameter_row: usize,
    pub data_row: usize,
}

impl Default for ExportLayout {
    fn default() -> Self {
        Self {
            station_row: DEFAULT_STATION_ROW,
            parameter_row: DEFAULT_PARAMETER_ROW,
            data_row: DEFAULT_DATA_ROW,
        }
    }
}

fn validate_layout_order(layout: &ExportLayout) -> std::result::Result<(), ValidationError> {
    if layout.data_row <= layout.station_row || layout.data_row <= layout.parameter_row {
        return Err(ValidationError::new("data_row_must_follow_header_rows"));
    }
    if layout.station_row == layout.parameter_row {
        return Err(ValidationError::new("station_and_parameter_rows_must_differ"));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Settings {
    #[validate(nested)]
    pub layout: ExportLayout,

    /// Field delimiter of the export text file.
    #[validate(length(equal = 1))]
    pub delimiter: String,

    pub compression: String,

    #[validate(range(min = 1))]
    pub row_group_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            layout: ExportLayout::default(),
            delimiter: ",".to_string(),
            compression: COMPRESSION_SNAPPY.to_string(),
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }
}

impl Settings {
    /// Load settings: defaults, then the optional file, then `AQV_*` variables
    /// (nested keys separated by `__`, e.g. `AQV_LAYOUT__DATA_ROW=6`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(ProcessingError::Config(format!(
                    "Settings file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(::config::File::from(path).required(true));
        }

        let settings: Settings = builder
            .add_source(
                ::config::Environment::with_prefix("AQV")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }

    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter.as_bytes().first().copied().unwrap_or(b',')
    }
}
