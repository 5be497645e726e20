pub mod constants;
pub mod filename;
pub mod progress;
pub mod timestamp;

pub use constants::*;
pub use filename::{generate_default_output_dir, is_export_file, output_dir_for_export};
pub use progress::ProgressReporter;
pub use timestamp::{from_spreadsheet_serial, parse_timestamp};
