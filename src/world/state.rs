//! The true-map world state of a session.
//!
//! Holds players, the unit list (the system of record for units), cities,
//! map features, maintained spells and combat area effects.

use serde::{Deserialize, Serialize};

use super::city::{City, FeatureAt, MapFeature};
use super::coords::MapCoords3D;
use super::effects::{CombatAreaEffect, MaintainedSpell, SpellTarget};
use super::ids::{PlayerId, UnitId, UnitTypeId};
use super::player::Player;
use super::ruleset::Ruleset;
use super::unit::{CombatSide, Unit};
use crate::error::EngineError;

/// Complete mutable world state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct World {
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub units: Vec<Unit>,
    #[serde(default)]
    pub cities: Vec<City>,
    #[serde(default)]
    pub features: Vec<FeatureAt>,
    #[serde(default)]
    pub maintained_spells: Vec<MaintainedSpell>,
    #[serde(default)]
    pub combat_area_effects: Vec<CombatAreaEffect>,
}

impl World {
    /// Looks up a player.
    pub fn player(&self, id: PlayerId) -> Result<&Player, EngineError> {
        self.players
            .iter()
            .find(|p| p.id == id)
            .ok_or(EngineError::UnknownPlayer(id))
    }

    /// Looks up a player for mutation.
    pub fn player_mut(&mut self, id: PlayerId) -> Result<&mut Player, EngineError> {
        self.players
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(EngineError::UnknownPlayer(id))
    }

    /// Returns true if the player exists and has a client connection.
    pub fn is_human(&self, id: PlayerId) -> bool {
        self.player(id).map(|p| p.kind.is_human()).unwrap_or(false)
    }

    /// Looks up a unit.
    pub fn unit(&self, id: UnitId) -> Result<&Unit, EngineError> {
        self.units
            .iter()
            .find(|u| u.id == id)
            .ok_or(EngineError::UnknownUnit(id))
    }

    /// Looks up a unit for mutation.
    pub fn unit_mut(&mut self, id: UnitId) -> Result<&mut Unit, EngineError> {
        self.units
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(EngineError::UnknownUnit(id))
    }

    /// Adds a new living unit and returns its id.
    pub fn add_unit(&mut self, owner: PlayerId, unit_type: UnitTypeId, location: MapCoords3D) -> UnitId {
        let next = self.units.iter().map(|u| u.id.0).max().map_or(1, |m| m + 1);
        let id = UnitId(next);
        self.units.push(Unit::new(id, owner, unit_type, location));
        id
    }

    /// Removes a unit from the unit list, along with spells cast on it.
    pub fn remove_unit(&mut self, id: UnitId) -> Option<Unit> {
        let idx = self.units.iter().position(|u| u.id == id)?;
        self.maintained_spells
            .retain(|s| s.target != SpellTarget::Unit(id));
        Some(self.units.remove(idx))
    }

    /// Living units standing at an overland location.
    pub fn living_units_at(&self, location: MapCoords3D) -> impl Iterator<Item = &Unit> {
        self.units
            .iter()
            .filter(move |u| u.is_alive() && u.location == Some(location))
    }

    /// Living units fighting on one side of the combat at a location.
    pub fn combatants(&self, location: MapCoords3D, side: CombatSide) -> impl Iterator<Item = &Unit> {
        self.units
            .iter()
            .filter(move |u| u.is_alive() && u.combat_side_at(location) == Some(side))
    }

    pub fn city_at(&self, location: MapCoords3D) -> Option<&City> {
        self.cities.iter().find(|c| c.location == location)
    }

    pub fn city_at_mut(&mut self, location: MapCoords3D) -> Option<&mut City> {
        self.cities.iter_mut().find(|c| c.location == location)
    }

    /// Destroys the city at a location, returning it.
    pub fn remove_city(&mut self, location: MapCoords3D) -> Option<City> {
        let idx = self.cities.iter().position(|c| c.location == location)?;
        self.maintained_spells
            .retain(|s| s.target != SpellTarget::City(location));
        Some(self.cities.remove(idx))
    }

    /// Sum of population over every city a player owns.
    pub fn total_population(&self, owner: PlayerId) -> u64 {
        self.cities
            .iter()
            .filter(|c| c.owner == owner)
            .map(|c| u64::from(c.population))
            .sum()
    }

    /// Cell whose units defend `location`. A tower exists on both planes but
    /// its garrison is stored on plane 0.
    pub fn garrison_cell(&self, location: MapCoords3D) -> MapCoords3D {
        if self.is_tower(location) {
            location.on_plane(0)
        } else {
            location
        }
    }

    /// Returns true if a tower of wizardry stands at this x/y on either plane.
    pub fn is_tower(&self, location: MapCoords3D) -> bool {
        self.features.iter().any(|f| {
            f.feature == MapFeature::TowerOfWizardry
                && f.location.x == location.x
                && f.location.y == location.y
        })
    }

    /// Skill effects granted to a unit by maintained spells.
    pub fn unit_effects(&self, unit: UnitId) -> impl Iterator<Item = &str> {
        self.maintained_spells
            .iter()
            .filter(move |s| s.target == SpellTarget::Unit(unit))
            .filter_map(|s| s.effect.as_deref())
    }

    /// Returns true if enemies of the unit's owner cannot see it.
    pub fn is_unit_invisible(&self, unit: &Unit, ruleset: &Ruleset) -> bool {
        let by_type = ruleset
            .unit_type(&unit.unit_type)
            .map(|t| t.invisible)
            .unwrap_or(false);
        by_type
            || self
                .unit_effects(unit.id)
                .any(|e| ruleset.invisibility_effects.iter().any(|i| i == e))
    }

    /// Area effects currently active at a location, including global ones.
    pub fn area_effects_at(&self, location: MapCoords3D) -> impl Iterator<Item = &CombatAreaEffect> {
        self.combat_area_effects
            .iter()
            .filter(move |e| e.location.is_none() || e.location == Some(location))
    }
}
