//! Active spell effects: maintained spells and combat area effects.

use serde::{Deserialize, Serialize};

use super::coords::MapCoords3D;
use super::ids::{PlayerId, SpellId, UnitId};

/// What a maintained spell is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpellTarget {
    Global,
    Unit(UnitId),
    City(MapCoords3D),
}

/// A spell that stays in effect after being cast.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaintainedSpell {
    pub caster: PlayerId,
    pub spell: SpellId,
    pub target: SpellTarget,
    /// Skill effect granted, for unit enchantments.
    #[serde(default)]
    pub effect: Option<String>,
    /// Set when the spell was cast inside a combat and ends with it.
    #[serde(default)]
    pub combat_location: Option<MapCoords3D>,
}

/// An effect applying to a whole battlefield or to everywhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatAreaEffect {
    pub effect_id: String,
    /// `None` for global effects.
    #[serde(default)]
    pub location: Option<MapCoords3D>,
    #[serde(default)]
    pub caster: Option<PlayerId>,
    /// Set when created by a spell cast in combat; removed when that combat ends.
    #[serde(default)]
    pub cast_in_combat: bool,
}
