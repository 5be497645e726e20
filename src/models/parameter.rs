use serde::{Deserialize, Serialize};
use std::fmt;

/// Monitored parameter in canonical column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Parameter {
    #[serde(rename = "O3")]
    Ozone,
    #[serde(rename = "NO")]
    NitricOxide,
    #[serde(rename = "NO2")]
    NitrogenDioxide,
    #[serde(rename = "NOX")]
    NitrogenOxides,
    #[serde(rename = "SO2")]
    SulfurDioxide,
    #[serde(rename = "CO")]
    CarbonMonoxide,
    #[serde(rename = "PM10")]
    Pm10,
    #[serde(rename = "PM2.5")]
    Pm25,
    #[serde(rename = "IT")]
    InternalTemperature,
    #[serde(rename = "ET")]
    ExternalTemperature,
    #[serde(rename = "RH")]
    RelativeHumidity,
    #[serde(rename = "WS")]
    WindSpeed,
    #[serde(rename = "WD")]
    WindDirection,
    #[serde(rename = "PP")]
    Precipitation,
    #[serde(rename = "ATM")]
    Pressure,
    #[serde(rename = "RS")]
    SolarRadiation,
    #[serde(rename = "UVI")]
    UvIndex,
}

pub const PARAMETER_COUNT: usize = 17;

/// Validity range with an optional lower detection limit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeLimits {
    pub min: f64,
    pub max: f64,
    pub detection_limit: Option<f64>,
}

impl RangeLimits {
    const fn new(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            detection_limit: None,
        }
    }

    const fn with_detection_limit(min: f64, max: f64, limit: f64) -> Self {
        Self {
            min,
            max,
            detection_limit: Some(limit),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// In range but below the detection limit.
    pub fn is_below_detection_limit(&self, value: f64) -> bool {
        match self.detection_limit {
            Some(limit) => value >= self.min && value < limit,
            None => false,
        }
    }
}

/// ENVISTA parameter labels that differ from the canonical code.
pub const PARAMETER_ALIASES: [(&str, Parameter); 7] = [
    ("TempInt", Parameter::InternalTemperature),
    ("TempExt", Parameter::ExternalTemperature),
    ("Radiación", Parameter::SolarRadiation),
    ("Radidacion", Parameter::SolarRadiation),
    ("IUV", Parameter::UvIndex),
    ("PRECIP", Parameter::Precipitation),
    ("Presion", Parameter::Pressure),
];

impl Parameter {
    pub const ALL: [Parameter; PARAMETER_COUNT] = [
        Parameter::Ozone,
        Parameter::NitricOxide,
        Parameter::NitrogenDioxide,
        Parameter::NitrogenOxides,
        Parameter::SulfurDioxide,
        Parameter::CarbonMonoxide,
        Parameter::Pm10,
        Parameter::Pm25,
        Parameter::InternalTemperature,
        Parameter::ExternalTemperature,
        Parameter::RelativeHumidity,
        Parameter::WindSpeed,
        Parameter::WindDirection,
        Parameter::Precipitation,
        Parameter::Pressure,
        Parameter::SolarRadiation,
        Parameter::UvIndex,
    ];

    /// Pollutants invalidated when the cabin temperature is out of band.
    pub const POLLUTANTS: [Parameter; 8] = [
        Parameter::Ozone,
        Parameter::NitrogenOxides,
        Parameter::NitricOxide,
        Parameter::NitrogenDioxide,
        Parameter::Pm10,
        Parameter::Pm25,
        Parameter::SulfurDioxide,
        Parameter::CarbonMonoxide,
    ];

    /// Parameters checked for constant runs.
    pub const CONSTANT_RUN_CHECKED: [Parameter; 7] = [
        Parameter::CarbonMonoxide,
        Parameter::NitrogenOxides,
        Parameter::NitrogenDioxide,
        Parameter::NitricOxide,
        Parameter::Ozone,
        Parameter::Pm10,
        Parameter::Pm25,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Parameter::ALL.into_iter().find(|p| p.code() == code)
    }

    /// Resolve an ENVISTA parameter label: aliases first, then the label
    /// itself as a canonical code.
    pub fn from_envista_label(label: &str) -> Option<Self> {
        let label = label.trim();
        PARAMETER_ALIASES
            .iter()
            .find(|(alias, _)| *alias == label)
            .map(|(_, parameter)| *parameter)
            .or_else(|| Parameter::from_code(label))
    }

    pub fn code(&self) -> &'static str {
        match self {
            Parameter::Ozone => "O3",
            Parameter::NitricOxide => "NO",
            Parameter::NitrogenDioxide => "NO2",
            Parameter::NitrogenOxides => "NOX",
            Parameter::SulfurDioxide => "SO2",
            Parameter::CarbonMonoxide => "CO",
            Parameter::Pm10 => "PM10",
            Parameter::Pm25 => "PM2.5",
            Parameter::InternalTemperature => "IT",
            Parameter::ExternalTemperature => "ET",
            Parameter::RelativeHumidity => "RH",
            Parameter::WindSpeed => "WS",
            Parameter::WindDirection => "WD",
            Parameter::Precipitation => "PP",
            Parameter::Pressure => "ATM",
            Parameter::SolarRadiation => "RS",
            Parameter::UvIndex => "UVI",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Parameter::Ozone => "Ozone",
            Parameter::NitricOxide => "Nitric oxide",
            Parameter::NitrogenDioxide => "Nitrogen dioxide",
            Parameter::NitrogenOxides => "Nitrogen oxides",
            Parameter::SulfurDioxide => "Sulfur dioxide",
            Parameter::CarbonMonoxide => "Carbon monoxide",
            Parameter::Pm10 => "Particulate matter <10µm",
            Parameter::Pm25 => "Particulate matter <2.5µm",
            Parameter::InternalTemperature => "Cabin temperature",
            Parameter::ExternalTemperature => "Ambient temperature",
            Parameter::RelativeHumidity => "Relative humidity",
            Parameter::WindSpeed => "Wind speed",
            Parameter::WindDirection => "Wind direction",
            Parameter::Precipitation => "Precipitation",
            Parameter::Pressure => "Atmospheric pressure",
            Parameter::SolarRadiation => "Solar radiation",
            Parameter::UvIndex => "UV index",
        }
    }

    /// Decimal places kept in the published dataset.
    pub fn decimals(&self) -> u32 {
        match self {
            Parameter::Ozone
            | Parameter::NitricOxide
            | Parameter::NitrogenDioxide
            | Parameter::NitrogenOxides
            | Parameter::SulfurDioxide => 3,
            Parameter::CarbonMonoxide => 2,
            Parameter::Pm10 | Parameter::Pm25 => 0,
            Parameter::InternalTemperature | Parameter::ExternalTemperature => 2,
            Parameter::RelativeHumidity | Parameter::WindSpeed | Parameter::WindDirection => 1,
            Parameter::Precipitation => 2,
            Parameter::Pressure | Parameter::SolarRadiation => 1,
            Parameter::UvIndex => 2,
        }
    }

    pub fn range(&self) -> Option<RangeLimits> {
        let limits = match self {
            Parameter::Ozone
            | Parameter::SulfurDioxide
            | Parameter::NitrogenDioxide
            | Parameter::NitricOxide => RangeLimits::with_detection_limit(-0.003, 0.500, 0.001),
            Parameter::NitrogenOxides => RangeLimits::with_detection_limit(-0.006, 0.500, 0.006),
            Parameter::CarbonMonoxide => RangeLimits::with_detection_limit(-0.04, 50.0, 0.04),
            Parameter::Pm10 | Parameter::Pm25 => RangeLimits::new(0.0, 1000.0),
            Parameter::ExternalTemperature => RangeLimits::new(-5.0, 50.0),
            Parameter::InternalTemperature => RangeLimits::new(0.0, 50.0),
            Parameter::RelativeHumidity => RangeLimits::new(0.0, 100.0),
            Parameter::WindSpeed => RangeLimits::new(0.0, 50.0),
            Parameter::WindDirection => RangeLimits::new(0.0, 360.0),
            Parameter::Precipitation => RangeLimits::new(0.0, 10.0),
            Parameter::Pressure => RangeLimits::new(500.0, 760.0),
            Parameter::SolarRadiation => RangeLimits::new(0.0, 2000.0),
            Parameter::UvIndex => RangeLimits::new(0.0, 300.0),
        };
        Some(limits)
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
