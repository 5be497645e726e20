use crate::models::{CanonicalRecord, Parameter, QualityFlag, Station};
use crate::utils::constants::{
    CABIN_TEMP_MAX, CABIN_TEMP_MIN, MAX_CONSTANT_RUN, NOX_RATIO_MAX, NOX_RATIO_MIN, PM_RATIO_MAX,
};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Cells touched by each QC rule during one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QcReport {
    pub records_checked: usize,
    pub out_of_range: usize,
    pub detection_limit_clamped: usize,
    pub cabin_temperature: usize,
    pub constant_run: usize,
    pub nox_balance: usize,
    pub particulate_ratio: usize,
}

impl QcReport {
    /// Cells replaced by a flag (clamped values are not counted)
    pub fn total_flagged(&self) -> usize {
        self.out_of_range
            + self.cabin_temperature
            + self.constant_run
            + self.nox_balance
            + self.particulate_ratio
    }

    pub fn summary(&self) -> String {
        format!(
            "=== Quality Control Report ===\n\
            Records Checked: {}\n\
            Out of Range (IR): {}\n\
            Raised to Detection Limit: {}\n\
            Cabin Temperature (IO): {}\n\
            Constant Runs (DS): {}\n\
            NOx Balance (IO): {}\n\
            PM2.5/PM10 Ratio (IO): {}\n\
            Total Flagged: {}",
            self.records_checked,
            self.out_of_range,
            self.detection_limit_clamped,
            self.cabin_temperature,
            self.constant_run,
            self.nox_balance,
            self.particulate_ratio,
            self.total_flagged()
        )
    }
}

/// Flag raised by a temporal rule, applied after all rules have been evaluated
#[derive(Debug, Clone, Copy)]
struct PendingFlag {
    record: usize,
    parameter: Parameter,
    flag: QualityFlag,
    rule: TemporalRule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TemporalRule {
    ConstantRun,
    NoxBalance,
    ParticulateRatio,
}

/// Applies the quality-control rules in their fixed order: range, cabin
/// temperature, then the temporal rules per station.
///
/// A cell that already carries a flag is never rewritten.
pub struct QualityControl {
    max_constant_run: usize,
}

impl QualityControl {
    pub fn new() -> Self {
        Self {
            max_constant_run: MAX_CONSTANT_RUN,
        }
    }

    pub fn run(&self, records: &mut [CanonicalRecord]) -> QcReport {
        let mut report = QcReport {
            records_checked: records.len(),
            ..Default::default()
        };

        for record in records.iter_mut() {
            self.apply_range_rule(record, &mut report);
        }
        for record in records.iter_mut() {
            self.apply_cabin_temperature_rule(record, &mut report);
        }
        self.apply_temporal_rules(records, &mut report);

        info!(
            "QC flagged {} cells (IR {}, cabin {}, constant {}, NOx {}, PM {}); clamped {} to detection limit",
            report.total_flagged(),
            report.out_of_range,
            report.cabin_temperature,
            report.constant_run,
            report.nox_balance,
            report.particulate_ratio,
            report.detection_limit_clamped
        );
        report
    }

    /// Out-of-range values become `IR`; in-range values below the detection
    /// limit are raised to the limit.
    fn apply_range_rule(&self, record: &mut CanonicalRecord, report: &mut QcReport) {
        for parameter in Parameter::ALL {
            let (Some(value), Some(limits)) = (record.value(parameter), parameter.range()) else {
                continue;
            };

            if !limits.contains(value) {
                if record.flag_if_numeric(parameter, QualityFlag::OutOfRange) {
                    report.out_of_range += 1;
                }
            } else if limits.is_below_detection_limit(value) {
                if let Some(limit) = limits.detection_limit {
                    if record.replace_value(parameter, limit) {
                        report.detection_limit_clamped += 1;
                    }
                }
            }
        }
    }

    /// Pollutant readings are invalid while the cabin is outside its
    /// temperature band. The cabin reading itself is kept.
    fn apply_cabin_temperature_rule(&self, record: &mut CanonicalRecord, report: &mut QcReport) {
        let Some(cabin) = record.value(Parameter::InternalTemperature) else {
            return;
        };
        if (CABIN_TEMP_MIN..=CABIN_TEMP_MAX).contains(&cabin) {
            return;
        }

        for parameter in Parameter::POLLUTANTS {
            if record.flag_if_numeric(parameter, QualityFlag::InvalidByOperator) {
                report.cabin_temperature += 1;
            }
        }
    }

    fn apply_temporal_rules(&self, records: &mut [CanonicalRecord], report: &mut QcReport) {
        let mut stations: BTreeMap<Station, Vec<usize>> = BTreeMap::new();
        for (index, record) in records.iter().enumerate() {
            stations.entry(record.station).or_default().push(index);
        }

        for (station, mut indices) in stations {
            indices.sort_by_key(|&i| (records[i].date, records[i].hour));

            // Rules read the station as it stood before any of them ran
            let mut pending = Vec::new();
            for parameter in Parameter::CONSTANT_RUN_CHECKED {
                self.find_constant_runs(records, &indices, parameter, &mut pending);
            }
            self.find_nox_imbalance(records, &indices, &mut pending);
            self.find_particulate_ratio(records, &indices, &mut pending);

            debug!("Station {}: {} temporal flags raised", station, pending.len());

            for flag in pending {
                if !records[flag.record].flag_if_numeric(flag.parameter, flag.flag) {
                    continue;
                }
                match flag.rule {
                    TemporalRule::ConstantRun => report.constant_run += 1,
                    TemporalRule::NoxBalance => report.nox_balance += 1,
                    TemporalRule::ParticulateRatio => report.particulate_ratio += 1,
                }
            }
        }
    }

    /// Runs of identical consecutive readings longer than the limit are
    /// suspicious. Missing or flagged cells end a run.
    fn find_constant_runs(
        &self,
        records: &[CanonicalRecord],
        indices: &[usize],
        parameter: Parameter,
        pending: &mut Vec<PendingFlag>,
    ) {
        let mut run: Vec<usize> = Vec::new();
        let mut run_value: Option<f64> = None;

        let mut close_run = |run: &mut Vec<usize>| {
            if run.len() > self.max_constant_run {
                pending.extend(run.iter().map(|&record| PendingFlag {
                    record,
                    parameter,
                    flag: QualityFlag::Suspicious,
                    rule: TemporalRule::ConstantRun,
                }));
            }
            run.clear();
        };

        for &index in indices {
            match records[index].value(parameter) {
                Some(value) if run_value == Some(value) => run.push(index),
                Some(value) => {
                    close_run(&mut run);
                    run.push(index);
                    run_value = Some(value);
                }
                None => {
                    close_run(&mut run);
                    run_value = None;
                }
            }
        }
        close_run(&mut run);
    }

    /// (NO + NO2) / NOX must stay within its band
    fn find_nox_imbalance(
        &self,
        records: &[CanonicalRecord],
        indices: &[usize],
        pending: &mut Vec<PendingFlag>,
    ) {
        const NOX_GROUP: [Parameter; 3] = [
            Parameter::NitricOxide,
            Parameter::NitrogenDioxide,
            Parameter::NitrogenOxides,
        ];

        for &index in indices {
            let record = &records[index];
            let (Some(no), Some(no2), Some(nox)) = (
                record.value(Parameter::NitricOxide),
                record.value(Parameter::NitrogenDioxide),
                record.value(Parameter::NitrogenOxides),
            ) else {
                continue;
            };
            if nox == 0.0 {
                continue;
            }

            let ratio = (no + no2) / nox;
            if !(NOX_RATIO_MIN..=NOX_RATIO_MAX).contains(&ratio) {
                pending.extend(NOX_GROUP.iter().map(|&parameter| PendingFlag {
                    record: index,
                    parameter,
                    flag: QualityFlag::InvalidByOperator,
                    rule: TemporalRule::NoxBalance,
                }));
            }
        }
    }

    /// PM2.5 cannot meaningfully exceed PM10
    fn find_particulate_ratio(
        &self,
        records: &[CanonicalRecord],
        indices: &[usize],
        pending: &mut Vec<PendingFlag>,
    ) {
        for &index in indices {
            let record = &records[index];
            let (Some(pm25), Some(pm10)) = (
                record.value(Parameter::Pm25),
                record.value(Parameter::Pm10),
            ) else {
                continue;
            };
            if pm10 == 0.0 {
                continue;
            }

            if pm25 / pm10 > PM_RATIO_MAX {
                pending.extend([Parameter::Pm25, Parameter::Pm10].map(|parameter| PendingFlag {
                    record: index,
                    parameter,
                    flag: QualityFlag::InvalidByOperator,
                    rule: TemporalRule::ParticulateRatio,
                }));
            }
        }
    }
}

impl Default for QualityControl {
    fn default() -> Self {
        Self::new()
    }
}
