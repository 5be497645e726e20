pub mod summarizer;

pub use summarizer::{
    DetailedFlagCount, FlagCount, GeneralStatistics, ParameterStatistics, Summarizer,
    ValidationSummary,
};
