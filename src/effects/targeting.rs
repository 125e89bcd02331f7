//! Which units and cells a spell may be aimed at.

use crate::config::CombatConfig;
use crate::error::{CastRejection, TargetRejection};
use crate::combat::map::CombatMap;
use crate::world::{
    CombatPosition, CombatSide, MapCoords3D, PlayerId, Ruleset, SpellDefinition, TargetAudience,
    UnitId, World,
};

/// Skill effects of a unit enchantment the unit does not have yet.
pub fn untaken_unit_effects<'a>(world: &World, spell: &'a SpellDefinition, unit: UnitId) -> Vec<&'a str> {
    let held: Vec<&str> = world.unit_effects(unit).collect();
    spell
        .unit_effects
        .iter()
        .map(String::as_str)
        .filter(|e| !held.contains(e))
        .collect()
}

/// Area effects of a combat enchantment not already active at a location.
pub fn untaken_area_effects<'a>(world: &World, spell: &'a SpellDefinition, location: MapCoords3D) -> Vec<&'a str> {
    spell
        .combat_area_effects
        .iter()
        .map(String::as_str)
        .filter(|e| !world.area_effects_at(location).any(|a| a.effect_id == *e))
        .collect()
}

/// Checks a unit against a targeted spell.
///
/// With `combat_location` set the unit must be fighting in that combat; an
/// overland target must not be in any combat.
pub fn check_unit_target(
    world: &World,
    ruleset: &Ruleset,
    caster: PlayerId,
    spell: &SpellDefinition,
    unit_id: UnitId,
    combat_location: Option<MapCoords3D>,
) -> Result<(), TargetRejection> {
    let unit = world.unit(unit_id).map_err(|_| TargetRejection::NotAlive)?;
    if !unit.is_alive() {
        return Err(TargetRejection::NotAlive);
    }
    match combat_location {
        Some(location) if !unit.is_in_combat_at(location) => return Err(TargetRejection::NotInCombat),
        None if unit.combat.is_some() => return Err(TargetRejection::NotInCombat),
        _ => {}
    }
    match spell.targets {
        TargetAudience::Own if unit.owner != caster => return Err(TargetRejection::NotOwnUnit),
        TargetAudience::Enemy if unit.owner == caster => return Err(TargetRejection::NotEnemyUnit),
        _ => {}
    }
    if unit.owner != caster && world.is_unit_invisible(unit, ruleset) {
        return Err(TargetRejection::Invisible);
    }
    if untaken_unit_effects(world, spell, unit_id).is_empty() {
        return Err(TargetRejection::AlreadyHasAllEffects);
    }
    Ok(())
}

/// Checks a summoning target cell and returns the cell the summon will
/// actually land on.
///
/// The requested cell must be on the map, passable, and free of any living
/// unit the caster can see. Invisible enemies cannot block the request but
/// still push the summon to the nearest genuinely free cell.
pub fn check_summon_cell(
    world: &World,
    ruleset: &Ruleset,
    config: &CombatConfig,
    map: &CombatMap,
    location: MapCoords3D,
    caster: PlayerId,
    side: CombatSide,
    cell: CombatPosition,
) -> Result<CombatPosition, CastRejection> {
    if !map.in_bounds(cell) {
        return Err(CastRejection::OffBattlefield);
    }
    if !map.is_passable(cell) {
        return Err(CastRejection::CellImpassable);
    }

    let fighting: Vec<_> = world
        .units
        .iter()
        .filter(|u| u.is_alive() && u.is_in_combat_at(location))
        .collect();

    let visibly_occupied = fighting.iter().any(|u| {
        u.combat.is_some_and(|c| c.position == cell)
            && (u.owner == caster || !world.is_unit_invisible(u, ruleset))
    });
    if visibly_occupied {
        return Err(CastRejection::CellOccupied);
    }

    let on_side = fighting
        .iter()
        .filter(|u| u.combat.is_some_and(|c| c.side == side))
        .count();
    if on_side >= config.max_units_per_side && !config.allow_exceeding_max_units {
        return Err(CastRejection::TooManyCombatants);
    }

    let taken: Vec<CombatPosition> = fighting
        .iter()
        .filter_map(|u| u.combat.map(|c| c.position))
        .collect();
    map.nearest_free(cell, |p| taken.contains(&p))
        .ok_or(CastRejection::NoRoomToSummon)
}
