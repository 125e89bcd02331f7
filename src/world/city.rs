//! Cities and the map features combat cares about.

use serde::{Deserialize, Serialize};

use super::coords::MapCoords3D;
use super::ids::PlayerId;

/// A city on the overland map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub location: MapCoords3D,
    pub owner: PlayerId,
    pub name: String,
    pub population: u32,
    #[serde(default)]
    pub buildings: Vec<String>,
    #[serde(default)]
    pub rebels: u32,
}

/// Special terrain at a map cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapFeature {
    /// Exists at the same x/y on both planes.
    TowerOfWizardry,
    Node,
    Lair,
}

/// A feature placed at a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureAt {
    pub location: MapCoords3D,
    pub feature: MapFeature,
}

/// What the attacker chose to do with a conquered city.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureCityDecision {
    Capture,
    Raze,
}
