//! Bikes, components and maintenance records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown {kind} '{value}'")]
pub struct ParseModelError {
    kind: &'static str,
    value: String,
}

/// Kind of bike part tracked by the garage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentType {
    Brakes,
    Chain,
    Cassette,
    Tires,
    Wheels,
    Saddle,
    Handlebar,
    Pedals,
    Suspension,
    Other,
}

impl ComponentType {
    pub const ALL: [ComponentType; 10] = [
        ComponentType::Brakes,
        ComponentType::Chain,
        ComponentType::Cassette,
        ComponentType::Tires,
        ComponentType::Wheels,
        ComponentType::Saddle,
        ComponentType::Handlebar,
        ComponentType::Pedals,
        ComponentType::Suspension,
        ComponentType::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ComponentType::Brakes => "brakes",
            ComponentType::Chain => "chain",
            ComponentType::Cassette => "cassette",
            ComponentType::Tires => "tires",
            ComponentType::Wheels => "wheels",
            ComponentType::Saddle => "saddle",
            ComponentType::Handlebar => "handlebar",
            ComponentType::Pedals => "pedals",
            ComponentType::Suspension => "suspension",
            ComponentType::Other => "other",
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ComponentType {
    type Err = ParseModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        ComponentType::ALL
            .into_iter()
            .find(|kind| kind.label() == needle)
            .ok_or_else(|| ParseModelError {
                kind: "component type",
                value: s.to_string(),
            })
    }
}

const KM_PER_MILE: f64 = 1.609_344;

/// Unit used when presenting distances. Storage is always kilometers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceUnit {
    #[default]
    Kilometers,
    Miles,
}

impl DistanceUnit {
    pub fn from_km(self, km: f64) -> f64 {
        match self {
            DistanceUnit::Kilometers => km,
            DistanceUnit::Miles => km / KM_PER_MILE,
        }
    }

    pub fn to_km(self, value: f64) -> f64 {
        match self {
            DistanceUnit::Kilometers => value,
            DistanceUnit::Miles => value * KM_PER_MILE,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            DistanceUnit::Kilometers => "km",
            DistanceUnit::Miles => "mi",
        }
    }

    /// Format a kilometer value in this unit with one decimal.
    pub fn format(self, km: f64) -> String {
        format!("{:.1} {}", self.from_km(km), self.suffix())
    }
}

impl FromStr for DistanceUnit {
    type Err = ParseModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "km" | "kilometers" => Ok(DistanceUnit::Kilometers),
            "mi" | "miles" => Ok(DistanceUnit::Miles),
            _ => Err(ParseModelError {
                kind: "distance unit",
                value: s.to_string(),
            }),
        }
    }
}

/// User preferences persisted by the settings feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub distance_unit: DistanceUnit,
    /// Distance after which a component is due for service.
    pub service_interval_km: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            distance_unit: DistanceUnit::Kilometers,
            service_interval_km: 1500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    pub id: Uuid,
    /// Unix seconds.
    pub performed_at: u64,
    /// Component distance when serviced.
    pub distance_km: f64,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: Uuid,
    pub kind: ComponentType,
    pub name: String,
    /// Unix seconds.
    pub installed_at: u64,
    pub distance_km: f64,
    pub distance_since_service_km: f64,
    #[serde(default)]
    pub retired: bool,
    #[serde(default)]
    pub history: Vec<MaintenanceRecord>,
}

impl Component {
    pub fn new(id: Uuid, kind: ComponentType, name: impl Into<String>, installed_at: u64) -> Self {
        Self {
            id,
            kind,
            name: name.into(),
            installed_at,
            distance_km: 0.0,
            distance_since_service_km: 0.0,
            retired: false,
            history: Vec::new(),
        }
    }

    pub fn service_due(&self, interval_km: u32) -> bool {
        !self.retired && self.distance_since_service_km >= f64::from(interval_km)
    }

    pub fn last_service(&self) -> Option<&MaintenanceRecord> {
        self.history.last()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bike {
    pub id: Uuid,
    pub name: String,
    /// Unix seconds.
    pub added_at: u64,
    pub odometer_km: f64,
    #[serde(default)]
    pub components: Vec<Component>,
}

impl Bike {
    pub fn new(id: Uuid, name: impl Into<String>, added_at: u64) -> Self {
        Self {
            id,
            name: name.into(),
            added_at,
            odometer_km: 0.0,
            components: Vec::new(),
        }
    }

    pub fn component(&self, id: Uuid) -> Option<&Component> {
        self.components.iter().find(|c| c.id == id)
    }

    /// Add a ride to the odometer and to every installed component.
    pub fn record_ride(&mut self, distance_km: f64) {
        self.odometer_km += distance_km;
        for component in self.components.iter_mut().filter(|c| !c.retired) {
            component.distance_km += distance_km;
            component.distance_since_service_km += distance_km;
        }
    }
}
