use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ProcessingError, Result};

/// Quality flag written in place of a numeric reading.
///
/// Flags are terminal: a cell carries either one flag or one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QualityFlag {
    #[serde(rename = "IF")]
    EquipmentFailure,
    #[serde(rename = "IO")]
    InvalidByOperator,
    #[serde(rename = "IR")]
    OutOfRange,
    #[serde(rename = "ND")]
    NoData,
    #[serde(rename = "VE")]
    ExtraordinaryValue,
    #[serde(rename = "SE")]
    NoEquipment,
    #[serde(rename = "NE")]
    StationDidNotExist,
    #[serde(rename = "IC")]
    Calibration,
    #[serde(rename = "VZ")]
    DetectionLimit,
    #[serde(rename = "DS")]
    Suspicious,
}

impl QualityFlag {
    pub const ALL: [QualityFlag; 10] = [
        QualityFlag::EquipmentFailure,
        QualityFlag::InvalidByOperator,
        QualityFlag::OutOfRange,
        QualityFlag::NoData,
        QualityFlag::ExtraordinaryValue,
        QualityFlag::NoEquipment,
        QualityFlag::StationDidNotExist,
        QualityFlag::Calibration,
        QualityFlag::DetectionLimit,
        QualityFlag::Suspicious,
    ];

    pub fn from_code(code: &str) -> Result<Self> {
        match code {
            "IF" => Ok(QualityFlag::EquipmentFailure),
            "IO" => Ok(QualityFlag::InvalidByOperator),
            "IR" => Ok(QualityFlag::OutOfRange),
            "ND" => Ok(QualityFlag::NoData),
            "VE" => Ok(QualityFlag::ExtraordinaryValue),
            "SE" => Ok(QualityFlag::NoEquipment),
            "NE" => Ok(QualityFlag::StationDidNotExist),
            "IC" => Ok(QualityFlag::Calibration),
            "VZ" => Ok(QualityFlag::DetectionLimit),
            "DS" => Ok(QualityFlag::Suspicious),
            _ => Err(ProcessingError::UnknownFlag(code.to_string())),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            QualityFlag::EquipmentFailure => "IF",
            QualityFlag::InvalidByOperator => "IO",
            QualityFlag::OutOfRange => "IR",
            QualityFlag::NoData => "ND",
            QualityFlag::ExtraordinaryValue => "VE",
            QualityFlag::NoEquipment => "SE",
            QualityFlag::StationDidNotExist => "NE",
            QualityFlag::Calibration => "IC",
            QualityFlag::DetectionLimit => "VZ",
            QualityFlag::Suspicious => "DS",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            QualityFlag::EquipmentFailure => "Inválido por falla en el equipo",
            QualityFlag::InvalidByOperator => "Inválido por operador",
            QualityFlag::OutOfRange => "Inválido por rango de operación",
            QualityFlag::NoData => "Sin dato (No Data)",
            QualityFlag::ExtraordinaryValue => "Valor Extraordinario",
            QualityFlag::NoEquipment => "Sin Equipo",
            QualityFlag::StationDidNotExist => "No existía la estación de monitoreo",
            QualityFlag::Calibration => "Inválido por calibración",
            QualityFlag::DetectionLimit => "Válido igualado al límite de detección",
            QualityFlag::Suspicious => "Dato sospechoso",
        }
    }
}

impl fmt::Display for QualityFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for QualityFlag {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self> {
        QualityFlag::from_code(s)
    }
}
