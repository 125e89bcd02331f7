//! Ruleset database: spell, unit type and building definitions.

use serde::{Deserialize, Serialize};

use super::ids::{SpellId, UnitTypeId};
use super::spell::SpellDefinition;
use crate::error::EngineError;

/// A unit type as listed in the ruleset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitTypeDef {
    pub id: UnitTypeId,
    pub name: String,
    /// Combat movement allowance in whole moves.
    pub movement: u32,
    #[serde(default)]
    pub hero: bool,
    #[serde(default)]
    pub invisible: bool,
}

/// A building as listed in the ruleset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingDef {
    pub id: String,
    pub name: String,
    /// Production cost; razing returns a share of it as gold.
    pub cost: u64,
}

/// All static definitions the engine consults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ruleset {
    #[serde(default)]
    pub spells: Vec<SpellDefinition>,
    #[serde(default)]
    pub unit_types: Vec<UnitTypeDef>,
    #[serde(default)]
    pub buildings: Vec<BuildingDef>,
    /// Skill effects that make a unit invisible to its enemies.
    #[serde(default)]
    pub invisibility_effects: Vec<String>,
}

impl Ruleset {
    /// Looks up a spell definition.
    pub fn spell(&self, id: &SpellId) -> Result<&SpellDefinition, EngineError> {
        self.spells
            .iter()
            .find(|s| &s.id == id)
            .ok_or_else(|| EngineError::UnknownSpell(id.clone()))
    }

    /// Looks up a unit type definition.
    pub fn unit_type(&self, id: &UnitTypeId) -> Result<&UnitTypeDef, EngineError> {
        self.unit_types
            .iter()
            .find(|u| &u.id == id)
            .ok_or_else(|| EngineError::UnknownUnitType(id.clone()))
    }

    /// Production cost of a building; unknown buildings are worth nothing.
    pub fn building_cost(&self, id: &str) -> u64 {
        self.buildings
            .iter()
            .find(|b| b.id == id)
            .map(|b| b.cost)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups() {
        let rs = Ruleset {
            unit_types: vec![UnitTypeDef {
                id: UnitTypeId::from("UN100"),
                name: "Spearmen".to_string(),
                movement: 1,
                hero: false,
                invisible: false,
            }],
            buildings: vec![BuildingDef {
                id: "BL01".to_string(),
                name: "Barracks".to_string(),
                cost: 30,
            }],
            ..Ruleset::default()
        };
        assert_eq!(rs.unit_type(&UnitTypeId::from("UN100")).unwrap().movement, 1);
        assert!(matches!(
            rs.unit_type(&UnitTypeId::from("UN999")),
            Err(EngineError::UnknownUnitType(_))
        ));
        assert!(matches!(rs.spell(&SpellId::from("SP001")), Err(EngineError::UnknownSpell(_))));
        assert_eq!(rs.building_cost("BL01"), 30);
        assert_eq!(rs.building_cost("BL99"), 0);
    }
}
