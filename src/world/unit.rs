//! Units and their combat-transient state.
//!
//! A unit's combat fields live in a single `Option<CombatPlacement>` so that
//! entering and leaving combat always sets or clears all of them together.

use serde::{Deserialize, Serialize};

use super::coords::{CombatPosition, MapCoords3D};
use super::ids::{PlayerId, UnitId, UnitTypeId};

/// Lifecycle status of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    NotGenerated,
    Generated,
    Alive,
    Dead,
}

/// Which side of a combat a unit fights on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatSide {
    Attacker,
    Defender,
}

impl CombatSide {
    /// Both sides, attacker first.
    pub const BOTH: [CombatSide; 2] = [CombatSide::Attacker, CombatSide::Defender];

    /// Returns the other side.
    pub const fn opponent(self) -> CombatSide {
        match self {
            CombatSide::Attacker => CombatSide::Defender,
            CombatSide::Defender => CombatSide::Attacker,
        }
    }

    /// Index into per-side arrays.
    pub const fn index(self) -> usize {
        match self {
            CombatSide::Attacker => 0,
            CombatSide::Defender => 1,
        }
    }
}

/// Where and how a unit stands inside a combat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatPlacement {
    pub location: MapCoords3D,
    pub position: CombatPosition,
    pub heading: u8,
    pub side: CombatSide,
    pub summoned: bool,
    /// Remaining movement this combat turn, in half-move units.
    pub double_moves_left: u32,
}

/// A unit in the true-map unit list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub owner: PlayerId,
    pub unit_type: UnitTypeId,
    pub status: UnitStatus,
    pub location: Option<MapCoords3D>,
    #[serde(default)]
    pub combat: Option<CombatPlacement>,
}

impl Unit {
    /// Creates a living unit standing on the overland map.
    pub fn new(id: UnitId, owner: PlayerId, unit_type: UnitTypeId, location: MapCoords3D) -> Self {
        Unit {
            id,
            owner,
            unit_type,
            status: UnitStatus::Alive,
            location: Some(location),
            combat: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.status == UnitStatus::Alive
    }

    /// Returns true if the unit is currently fighting at the given location.
    pub fn is_in_combat_at(&self, location: MapCoords3D) -> bool {
        matches!(self.combat, Some(c) if c.location == location)
    }

    /// Returns the unit's side if it is fighting at the given location.
    pub fn combat_side_at(&self, location: MapCoords3D) -> Option<CombatSide> {
        self.combat.filter(|c| c.location == location).map(|c| c.side)
    }

    /// Kills the unit, dropping any combat state with it.
    pub fn kill(&mut self) {
        self.status = UnitStatus::Dead;
        self.combat = None;
    }
}
