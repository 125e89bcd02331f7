//! Session configuration.
//!
//! Formation anchors, headings, map sizes, combatant limits and casting
//! range penalties are all data. Every field has a default so a scenario
//! file only needs to list what it changes.

use serde::{Deserialize, Serialize};

use crate::world::CombatPosition;

/// How players take their overland turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnSystem {
    #[default]
    OneAtATime,
    Simultaneous,
}

/// Top-level configuration for one session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub turn_system: TurnSystem,
    pub overland: OverlandMapConfig,
    pub combat: CombatConfig,
    pub casting: CastingConfig,
}

/// Overland map dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlandMapConfig {
    pub width: i32,
    pub height: i32,
    pub wrap_x: bool,
    pub max_units_per_cell: usize,
}

impl Default for OverlandMapConfig {
    fn default() -> Self {
        Self {
            width: 60,
            height: 40,
            wrap_x: true,
            max_units_per_cell: 9,
        }
    }
}

/// Battlefield generation and placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub map_width: i32,
    pub map_height: i32,
    /// Cell the attacker's front-row centre unit stands on.
    pub attacker_anchor: CombatPosition,
    /// Cell the defender's front-row centre unit stands on.
    pub defender_anchor: CombatPosition,
    /// Offsets from the anchor, front row centred first. Positive y is one
    /// row further back from the enemy.
    pub formation: Vec<CombatPosition>,
    /// Direction attacker units face (1-8, clockwise from north).
    pub attacker_heading: u8,
    pub defender_heading: u8,
    /// Rows further back are reached by adding this to y.
    pub attacker_row_step: i32,
    pub defender_row_step: i32,
    /// Impassable rocks scattered on a generated battlefield.
    pub obstacle_count: usize,
    pub max_units_per_side: usize,
    pub allow_exceeding_max_units: bool,
    /// Percentage of the building value paid out when a city is razed.
    pub raze_gold_percent: u64,
}

impl Default for CombatConfig {
    fn default() -> Self {
        let mut formation = Vec::new();
        for row in 0..3 {
            for dx in [0, 1, -1] {
                formation.push(CombatPosition::new(dx, row));
            }
        }
        Self {
            map_width: 12,
            map_height: 25,
            attacker_anchor: CombatPosition::new(6, 17),
            defender_anchor: CombatPosition::new(6, 8),
            formation,
            attacker_heading: 1,
            defender_heading: 5,
            attacker_row_step: 1,
            defender_row_step: -1,
            obstacle_count: 6,
            max_units_per_side: 9,
            allow_exceeding_max_units: false,
            raze_gold_percent: 10,
        }
    }
}

/// One distance band of the combat casting range penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeBand {
    pub max_distance: u32,
    /// Cost multiplier times two.
    pub doubled_penalty: u32,
}

/// Spell cost rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CastingConfig {
    /// Doubled penalty when fighting at the caster's own fortress.
    pub at_fortress_penalty: u32,
    /// Bands in increasing distance order.
    pub range_bands: Vec<RangeBand>,
    /// Doubled penalty beyond the last band.
    pub beyond_range_penalty: u32,
    /// Doubled penalty when the combat is on the other plane from the fortress.
    pub other_plane_penalty: u32,
    pub max_cost_reduction_percent: u32,
}

impl Default for CastingConfig {
    fn default() -> Self {
        Self {
            at_fortress_penalty: 1,
            range_bands: vec![
                RangeBand { max_distance: 5, doubled_penalty: 2 },
                RangeBand { max_distance: 10, doubled_penalty: 3 },
                RangeBand { max_distance: 15, doubled_penalty: 4 },
                RangeBand { max_distance: 20, doubled_penalty: 5 },
            ],
            beyond_range_penalty: 6,
            other_plane_penalty: 6,
            max_cost_reduction_percent: 50,
        }
    }
}
