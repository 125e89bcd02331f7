//! Starting a combat.
//!
//! Works out who is defending, generates the battlefield, gives each side
//! its combat casting skill, places both armies and registers the combat.
//! A combat with nobody to fight ends on the spot, so walking into an empty
//! city goes through the same consequences as winning a battle.

use tracing::info;

use crate::error::EngineError;
use crate::messages::ServerMessage;
use crate::services::SessionServices;
use crate::session::Session;
use crate::world::{CombatSide, MapCoords3D, PendingMovement, PlayerId, UnitId, World};

use super::map::CombatMap;
use super::registry::CombatInstance;

/// Finds the defending player and their units.
///
/// Prefers living enemy units standing at the location (the plane 0 cell for
/// a tower); falls back to the
/// explicit list, used for simultaneous-turn counter-attacks where the
/// defenders have not reached the cell yet.
fn resolve_defenders(
    world: &World,
    location: MapCoords3D,
    attacker: PlayerId,
    explicit: Option<&[UnitId]>,
) -> (Option<PlayerId>, Vec<UnitId>) {
    let cell = world.garrison_cell(location);
    let at_location = world
        .living_units_at(cell)
        .find(|u| u.owner != attacker && u.combat.is_none())
        .map(|u| u.owner);

    if let Some(owner) = at_location {
        let units = world
            .living_units_at(cell)
            .filter(|u| u.owner == owner && u.combat.is_none())
            .map(|u| u.id)
            .collect();
        return (Some(owner), units);
    }

    let listed: Vec<_> = explicit
        .unwrap_or(&[])
        .iter()
        .filter_map(|id| world.unit(*id).ok())
        .filter(|u| u.is_alive() && u.owner != attacker && u.combat.is_none())
        .collect();
    match listed.first() {
        Some(first) => {
            let owner = first.owner;
            let units = listed.iter().filter(|u| u.owner == owner).map(|u| u.id).collect();
            (Some(owner), units)
        }
        None => (None, Vec::new()),
    }
}

/// Checks every attacker before anything is mutated. Returns the attacking player.
fn validate_attackers(world: &World, unit_ids: &[UnitId]) -> Result<PlayerId, EngineError> {
    let first = unit_ids.first().ok_or(EngineError::NoAttackingUnits)?;
    let owner = world.unit(*first)?.owner;
    for &id in unit_ids {
        let unit = world.unit(id)?;
        if !unit.is_alive() {
            return Err(EngineError::InvalidCombatant { unit: id, reason: "unit is not alive" });
        }
        if unit.owner != owner {
            return Err(EngineError::InvalidCombatant {
                unit: id,
                reason: "attacking units belong to different players",
            });
        }
        if unit.combat.is_some() {
            return Err(EngineError::UnitAlreadyInCombat(id));
        }
    }
    Ok(owner)
}

impl<S: SessionServices> Session<S> {
    /// Starts a combat at `defending_location`, attacked from `attacking_from`.
    ///
    /// Returns a snapshot of the combat as it was registered. If there was no
    /// defender the combat has already ended by the time this returns.
    pub fn start_combat(
        &mut self,
        defending_location: MapCoords3D,
        attacking_from: MapCoords3D,
        attacking_unit_ids: &[UnitId],
        defending_unit_ids: Option<&[UnitId]>,
        attacker_pending_movement: Option<PendingMovement>,
        defender_pending_movement: Option<PendingMovement>,
    ) -> Result<CombatInstance, EngineError> {
        let attacking_player = validate_attackers(&self.world, attacking_unit_ids)?;
        if self.combats.contains(defending_location) {
            return Err(EngineError::CombatAlreadyInProgress(defending_location));
        }

        let (defending_player, defender_ids) = resolve_defenders(
            &self.world,
            defending_location,
            attacking_player,
            defending_unit_ids,
        );

        let has_city = self.world.city_at(defending_location).is_some();
        let map = CombatMap::generate(&self.config.combat, has_city, self.rng.as_mut());

        let mut combat = CombatInstance::new(
            defending_location,
            attacking_from,
            map,
            attacking_player,
            defending_player,
            attacker_pending_movement,
            defender_pending_movement,
        );

        // Nobody casts during an uncontested walk-in.
        if let Some(defender) = defending_player {
            let attacker_skill = self.world.player(attacking_player)?.modified_casting_skill();
            let defender_skill = self.world.player(defender)?.modified_casting_skill();
            combat.set_casting_skill(CombatSide::Attacker, attacker_skill);
            combat.set_casting_skill(CombatSide::Defender, defender_skill);
        }

        let mut placements = self.place_side(
            &combat.map,
            defending_location,
            CombatSide::Attacker,
            attacking_unit_ids,
        )?;
        if defending_player.is_some() {
            placements.extend(self.place_side(
                &combat.map,
                defending_location,
                CombatSide::Defender,
                &defender_ids,
            )?);
        }
        combat.combatants = attacking_unit_ids.iter().chain(defender_ids.iter()).copied().collect();

        info!(
            location = %defending_location,
            attacker = %attacking_player,
            defender = ?defending_player,
            mode = ?combat.mode,
            attackers = attacking_unit_ids.len(),
            defenders = defender_ids.len(),
            "combat started"
        );

        let snapshot = combat.clone();
        let started = ServerMessage::CombatStarted {
            location: defending_location,
            map: combat.map.clone(),
            placements,
        };
        self.combats.insert(combat)?;

        self.send(attacking_player, started.clone());
        if let Some(defender) = defending_player {
            self.send(defender, started);
        }

        if defending_player.is_none() {
            self.combat_ended(defending_location, attacking_player, None, attacking_player, None)?;
        }

        Ok(snapshot)
    }
}
