pub mod flag;
pub mod parameter;
pub mod reading;
pub mod record;
pub mod station;

pub use flag::QualityFlag;
pub use parameter::{Parameter, RangeLimits, PARAMETER_ALIASES, PARAMETER_COUNT};
pub use reading::{Cell, ColumnLabel, LongFormData, LongReading, RawExport};
pub use record::{CanonicalRecord, CanonicalRecordBuilder};
pub use station::{Station, STATION_REGISTRY};
