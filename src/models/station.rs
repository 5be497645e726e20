use serde::{Deserialize, Serialize};
use std::fmt;

/// Monitoring station, identified by its canonical short code.
///
/// Variants are declared in code order so that the derived `Ord` sorts
/// records by station code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Station {
    Agu,
    Atm,
    Cen,
    Cou,
    Ldo,
    Mir,
    Obl,
    Pin,
    San,
    Sfe,
    Smt,
    Tla,
    Val,
}

/// ENVISTA station names and their canonical codes, in registry order.
pub const STATION_REGISTRY: [(&str, Station); 13] = [
    ("Atemajac", Station::Atm),
    ("Counrty", Station::Cou),
    ("Estación Centro", Station::Cen),
    ("Las Aguilas", Station::Agu),
    ("Las Pintas", Station::Pin),
    ("Loma Dorada", Station::Ldo),
    ("Miravalle", Station::Mir),
    ("Oblatos", Station::Obl),
    ("Santa Anita", Station::San),
    ("Santa Fe", Station::Sfe),
    ("Santa Margarita", Station::Smt),
    ("Tlaquepaque", Station::Tla),
    ("Vallarta", Station::Val),
];

impl Station {
    /// Look up a station by its ENVISTA export name.
    pub fn from_envista_name(name: &str) -> Option<Self> {
        let name = name.trim();
        STATION_REGISTRY
            .iter()
            .find(|(registered, _)| *registered == name)
            .map(|(_, station)| *station)
    }

    pub fn from_code(code: &str) -> Option<Self> {
        STATION_REGISTRY
            .iter()
            .map(|(_, station)| *station)
            .find(|station| station.code() == code)
    }

    pub fn code(&self) -> &'static str {
        match self {
            Station::Agu => "AGU",
            Station::Atm => "ATM",
            Station::Cen => "CEN",
            Station::Cou => "COU",
            Station::Ldo => "LDO",
            Station::Mir => "MIR",
            Station::Obl => "OBL",
            Station::Pin => "PIN",
            Station::San => "SAN",
            Station::Sfe => "SFE",
            Station::Smt => "SMT",
            Station::Tla => "TLA",
            Station::Val => "VAL",
        }
    }

    pub fn envista_name(&self) -> &'static str {
        STATION_REGISTRY
            .iter()
            .find(|(_, station)| station == self)
            .map(|(name, _)| *name)
            .unwrap_or_default()
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_lookup() {
        assert_eq!(Station::from_envista_name("Atemajac"), Some(Station::Atm));
        assert_eq!(
            Station::from_envista_name(" Estación Centro "),
            Some(Station::Cen)
        );
        assert_eq!(Station::from_envista_name("atemajac"), None);
        assert_eq!(Station::from_envista_name("Unknown"), None);
    }

    #[test]
    fn test_station_codes_round_trip_through_registry() {
        for (name, station) in STATION_REGISTRY {
            assert_eq!(station.envista_name(), name);
            assert_eq!(Station::from_code(station.code()), Some(station));
        }
    }

    #[test]
    fn test_station_ordering_follows_code() {
        let mut stations: Vec<Station> = STATION_REGISTRY.iter().map(|(_, s)| *s).collect();
        stations.sort();
        let codes: Vec<&str> = stations.iter().map(|s| s.code()).collect();
        let mut sorted_codes = codes.clone();
        sorted_codes.sort();
        assert_eq!(codes, sorted_codes);
    }

    #[test]
    fn test_station_serializes_as_code() {
        assert_eq!(serde_json::to_string(&Station::Sfe).unwrap(), "\"SFE\"");
    }
}
