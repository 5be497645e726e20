use crate::models::{CanonicalRecord, Parameter};
use tracing::debug;

/// Round a value to `decimals` places, ties to even.
pub fn round_to_decimals(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round_ties_even() / scale
}

/// Rounds every numeric cell to its parameter's published precision.
/// Flags pass through untouched.
pub fn format_records(records: &mut [CanonicalRecord]) {
    let mut rounded = 0usize;
    for record in records.iter_mut() {
        for parameter in Parameter::ALL {
            if let Some(value) = record.value(parameter) {
                let formatted = round_to_decimals(value, parameter.decimals());
                if formatted != value {
                    record.replace_value(parameter, formatted);
                    rounded += 1;
                }
            }
        }
    }
    debug!("Rounded {} cells across {} records", rounded, records.len());
}
