//! Static spell definitions.
//!
//! The ruleset stores a `SpellKind` for every spell; casting code dispatches
//! on it rather than inspecting which optional fields happen to be filled.

use serde::{Deserialize, Serialize};

use super::ids::{SpellId, UnitTypeId};

/// Magic realm a spell belongs to; cost reductions are granted per realm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Realm {
    Life,
    Death,
    Chaos,
    Nature,
    Sorcery,
    Arcane,
}

/// What a spell does once cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpellKind {
    /// Global enchantment maintained by the caster.
    OverlandEnchantment,
    /// Enchantment on a single city.
    CityEnchantment,
    /// Grants a skill effect to one unit.
    UnitEnchantment,
    /// Creates a unit.
    Summoning,
    /// Grants an area effect to the battlefield.
    CombatEnchantment,
}

/// Whose units a targeted spell may be cast on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetAudience {
    #[default]
    Own,
    Enemy,
}

/// A spell as listed in the ruleset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellDefinition {
    pub id: SpellId,
    pub name: String,
    pub realm: Realm,
    pub kind: SpellKind,
    /// `None` if the spell cannot be cast overland.
    #[serde(default)]
    pub overland_cost: Option<u32>,
    /// `None` if the spell cannot be cast in combat.
    #[serde(default)]
    pub combat_cost: Option<u32>,
    #[serde(default)]
    pub targets: TargetAudience,
    /// Area effects a combat enchantment may grant.
    #[serde(default)]
    pub combat_area_effects: Vec<String>,
    /// Skill effects a unit enchantment may grant.
    #[serde(default)]
    pub unit_effects: Vec<String>,
    /// Unit types a summoning spell may create.
    #[serde(default)]
    pub summoned_units: Vec<UnitTypeId>,
}

impl SpellDefinition {
    pub fn castable_overland(&self) -> bool {
        self.overland_cost.is_some() && self.kind != SpellKind::CombatEnchantment
    }

    pub fn castable_in_combat(&self) -> bool {
        self.combat_cost.is_some()
            && matches!(
                self.kind,
                SpellKind::CombatEnchantment | SpellKind::UnitEnchantment | SpellKind::Summoning
            )
    }

    /// Returns true if a combat cast of this spell must name a unit.
    pub fn needs_unit_target(&self) -> bool {
        self.kind == SpellKind::UnitEnchantment
    }

    /// Returns true if a combat cast of this spell must name a battlefield cell.
    pub fn needs_cell_target(&self) -> bool {
        self.kind == SpellKind::Summoning
    }
}
