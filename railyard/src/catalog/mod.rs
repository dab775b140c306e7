//! Station and locomotive catalog.
//!
//! Canonical record structs for the two entities, plus the projection type
//! the listing API serves ([`StationView`]: a station with its locomotives).
//! Records are stored relationally by [`SqliteCatalog`]; the only field the
//! arrival path ever mutates is a locomotive's station reference.

mod store;

pub use store::{CatalogError, SqliteCatalog};

use serde::{Deserialize, Serialize};

/// Locomotive engine type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineType {
    Fuel,
    Electric,
    Steam,
}

impl EngineType {
    /// Storage and wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fuel => "fuel",
            Self::Electric => "electric",
            Self::Steam => "steam",
        }
    }

    /// Parses the storage representation.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "fuel" => Some(Self::Fuel),
            "electric" => Some(Self::Electric),
            "steam" => Some(Self::Steam),
            _ => None,
        }
    }
}

impl std::fmt::Display for EngineType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A railway station.
///
/// Immutable once created as far as the arrival path is concerned. The two
/// durations are simulated transit times in seconds.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Station {
    pub id: i64,
    /// Unique station name.
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
    /// Simulated travel time for an arriving locomotive, in seconds.
    pub arrival_duration: f64,
    /// Simulated travel time for a departing locomotive, in seconds.
    pub departure_duration: f64,
}

/// Payload for creating a station.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewStation {
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
    pub arrival_duration: f64,
    pub departure_duration: f64,
}

/// A locomotive.
///
/// `railwaystation_id` is the sole mutable shared state in the arrival path:
/// non-null only while the locomotive is at that station, written exclusively
/// by the arrival worker.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Locomotive {
    pub id: i64,
    pub name: String,
    pub number: String,
    pub engine_type: EngineType,
    /// Station the locomotive is currently at, if any.
    pub railwaystation_id: Option<i64>,
}

/// Payload for creating a locomotive.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewLocomotive {
    pub name: String,
    pub number: String,
    pub engine_type: EngineType,
}

/// Read projection: a station with the locomotives currently at it.
#[derive(Clone, Debug, Serialize)]
pub struct StationView {
    #[serde(flatten)]
    pub station: Station,
    pub locomotives: Vec<Locomotive>,
}

impl StationView {
    pub fn new(station: Station, locomotives: Vec<Locomotive>) -> Self {
        Self {
            station,
            locomotives,
        }
    }
}
