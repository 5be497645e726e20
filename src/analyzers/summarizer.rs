use crate::models::{CanonicalRecord, Cell, Parameter, QualityFlag, Station};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Global count for one flag code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlagCount {
    pub flag: QualityFlag,
    pub description: &'static str,
    pub count: usize,
}

/// Count of one flag for one station and parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedFlagCount {
    pub station: Station,
    pub parameter: Parameter,
    pub flag: QualityFlag,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneralStatistics {
    pub total_records: usize,
    pub stations: usize,
    /// Distinct values of the record date field (minute resolution).
    pub distinct_dates: usize,
    pub distinct_days: usize,
    pub numeric_cells: usize,
    pub first_date: Option<NaiveDateTime>,
    pub last_date: Option<NaiveDateTime>,
}

/// Descriptive statistics of the numeric cells of one station and parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterStatistics {
    pub station: Station,
    pub parameter: Parameter,
    /// All records of the station, numeric or not.
    pub station_records: usize,
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Sample standard deviation; undefined for a single value.
    pub std_dev: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationSummary {
    pub general: GeneralStatistics,
    pub flag_totals: Vec<FlagCount>,
    pub flag_breakdown: Vec<DetailedFlagCount>,
    pub statistics: Vec<ParameterStatistics>,
}

pub struct Summarizer;

impl Summarizer {
    pub fn new() -> Self {
        Self
    }

    pub fn summarize(&self, records: &[CanonicalRecord]) -> ValidationSummary {
        let mut breakdown: BTreeMap<(Station, Parameter, QualityFlag), usize> = BTreeMap::new();
        let mut values: BTreeMap<(Station, Parameter), Vec<f64>> = BTreeMap::new();
        let mut station_records: HashMap<Station, usize> = HashMap::new();
        let mut dates = BTreeSet::new();
        let mut days: BTreeSet<NaiveDate> = BTreeSet::new();
        let mut numeric_cells = 0;

        for record in records {
            *station_records.entry(record.station).or_default() += 1;
            dates.insert(record.date);
            days.insert(record.date.date());

            for (parameter, cell) in record.cells() {
                match cell {
                    Some(Cell::Value(v)) => {
                        numeric_cells += 1;
                        values.entry((record.station, parameter)).or_default().push(v);
                    }
                    Some(Cell::Flag(flag)) => {
                        *breakdown.entry((record.station, parameter, flag)).or_default() += 1;
                    }
                    None => {}
                }
            }
        }

        let mut totals: BTreeMap<QualityFlag, usize> = BTreeMap::new();
        for (&(_, _, flag), &count) in &breakdown {
            *totals.entry(flag).or_default() += count;
        }
        let mut flag_totals: Vec<FlagCount> = totals
            .into_iter()
            .map(|(flag, count)| FlagCount {
                flag,
                description: flag.description(),
                count,
            })
            .collect();
        flag_totals.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.flag.code().cmp(b.flag.code()))
        });

        let flag_breakdown = breakdown
            .into_iter()
            .map(|((station, parameter, flag), count)| DetailedFlagCount {
                station,
                parameter,
                flag,
                count,
            })
            .collect();

        let statistics = values
            .into_iter()
            .map(|((station, parameter), values)| {
                describe(
                    station,
                    parameter,
                    station_records.get(&station).copied().unwrap_or(0),
                    &values,
                )
            })
            .collect();

        let general = GeneralStatistics {
            total_records: records.len(),
            stations: station_records.len(),
            distinct_dates: dates.len(),
            distinct_days: days.len(),
            numeric_cells,
            first_date: dates.first().copied(),
            last_date: dates.last().copied(),
        };

        ValidationSummary {
            general,
            flag_totals,
            flag_breakdown,
            statistics,
        }
    }
}

impl Default for Summarizer {
    fn default() -> Self {
        Self::new()
    }
}

/// `values` is never empty: pairs without numeric cells are never collected.
fn describe(
    station: Station,
    parameter: Parameter,
    station_records: usize,
    values: &[f64],
) -> ParameterStatistics {
    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let std_dev = (count > 1).then(|| {
        let variance =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        variance.sqrt()
    });

    ParameterStatistics {
        station,
        parameter,
        station_records,
        count,
        min,
        max,
        mean,
        std_dev,
    }
}

impl ValidationSummary {
    pub fn total_flags(&self) -> usize {
        self.flag_totals.iter().map(|f| f.count).sum()
    }

    pub fn summary(&self) -> String {
        let date_range = match (self.general.first_date, self.general.last_date) {
            (Some(first), Some(last)) => format!("{} to {}", first, last),
            _ => "No records".to_string(),
        };
        let flags = if self.flag_totals.is_empty() {
            "none".to_string()
        } else {
            self.flag_totals
                .iter()
                .map(|f| format!("{} {}", f.flag, f.count))
                .collect::<Vec<_>>()
                .join(", ")
        };

        format!(
            "Records: {} station-hours\n\
            Stations: {}\n\
            Date Range: {} ({} days)\n\
            Valid Values: {}\n\
            Flags: {} total ({})",
            self.general.total_records,
            self.general.stations,
            date_range,
            self.general.distinct_days,
            self.general.numeric_cells,
            self.total_flags(),
            flags
        )
    }
}
