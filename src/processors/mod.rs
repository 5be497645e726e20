pub mod batch_processor;
pub mod flag_mapper;
pub mod formatter;
pub mod pipeline;
pub mod quality_control;
pub mod schema_converter;

pub use batch_processor::{BatchProcessor, FileOutcome, FileStats};
pub use flag_mapper::{map_status_token, ENVISTA_STATUS_TOKENS};
pub use formatter::{format_records, round_to_decimals};
pub use pipeline::{Pipeline, ValidationResult};
pub use quality_control::{QcReport, QualityControl};
pub use schema_converter::SchemaConverter;
