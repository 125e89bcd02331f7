//! Ending a combat and applying its consequences.
//!
//! Cleanup (spells scoped to the combat, dead units and summons, combat
//! fields, battlefield area effects, fog of war) always runs and is safe to
//! run twice. When the attacker takes a city and has not yet said whether to
//! capture or raze it, the combat stays registered and a follow-up call with
//! the decision finishes the job.

use tracing::{debug, info};

use crate::error::EngineError;
use crate::messages::ServerMessage;
use crate::services::SessionServices;
use crate::session::Session;
use crate::world::{CaptureCityDecision, CombatSide, MapCoords3D, PlayerId, UnitId};

/// What happened when a combat was ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CombatEndOutcome {
    /// The attacker has been asked to capture or raze; the combat stays open.
    AwaitingCaptureDecision,
    Ended(CombatResult),
}

/// Consequences of a finished combat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombatResult {
    pub winning_player: PlayerId,
    pub capture_city_decision: Option<CaptureCityDecision>,
    pub gold_swiped: Option<u64>,
    pub gold_from_razing: Option<u64>,
    /// Where the attacker's survivors moved to, if they advanced.
    pub advanced_to: Option<MapCoords3D>,
}

/// Gold taken from the loser when their city falls: their treasury in
/// proportion to the city's share of their total population.
pub fn gold_swiped(defender_gold: u64, city_population: u64, defender_total_population: u64) -> u64 {
    if defender_total_population == 0 {
        return 0;
    }
    let swiped = u128::from(defender_gold) * u128::from(city_population)
        / u128::from(defender_total_population);
    u64::try_from(swiped).unwrap_or(u64::MAX).min(defender_gold)
}

/// Gold returned by razing a city's buildings.
pub fn gold_from_razing(total_building_cost: u64, raze_gold_percent: u64) -> u64 {
    total_building_cost * raze_gold_percent / 100
}

/// Where surviving attackers end up. Towers straddle both planes, so taking
/// one from the alternate plane lands on plane 0.
pub fn advance_destination(location: MapCoords3D, attacking_from: MapCoords3D, is_tower: bool) -> MapCoords3D {
    if is_tower && attacking_from.plane != 0 {
        location.on_plane(0)
    } else {
        location
    }
}

impl<S: SessionServices> Session<S> {
    /// Ends the combat at `location`.
    ///
    /// Fails hard if no combat is registered there or the winner is not one
    /// of the two sides.
    pub fn combat_ended(
        &mut self,
        location: MapCoords3D,
        attacking_player: PlayerId,
        defending_player: Option<PlayerId>,
        winning_player: PlayerId,
        capture_city_decision: Option<CaptureCityDecision>,
    ) -> Result<CombatEndOutcome, EngineError> {
        let combat = self.combats.get(location)?;
        if winning_player != attacking_player && Some(winning_player) != defending_player {
            return Err(EngineError::WinnerNotInCombat { winner: winning_player, location });
        }
        let combatants = combat.combatants.clone();
        let summoned = combat.summoned_units.clone();
        let attacker_won = winning_player == attacking_player;

        self.deactivate_combat_spells(location);
        self.purge_combat_units(location, &combatants, &summoned, attacking_player, defending_player)?;
        let survivors = self.clear_combat_fields(location)?;
        self.combats.get_mut(location)?.advancing_units.extend(survivors);
        self.remove_battlefield_effects(location);

        self.refresh_player_views(attacking_player);
        if let Some(defender) = defending_player {
            self.refresh_player_views(defender);
        }

        // Capture or raze, asking the attacker first if they are human.
        let city_owner = self.world.city_at(location).map(|c| c.owner);
        let decision = match city_owner {
            Some(owner) if attacker_won && owner != attacking_player => match capture_city_decision {
                Some(d) => Some(d),
                None if self.world.is_human(attacking_player) => {
                    self.combats.get_mut(location)?.awaiting_capture_decision = true;
                    self.send(
                        attacking_player,
                        ServerMessage::AskForCaptureCityDecision {
                            city_location: location,
                            defending_player,
                        },
                    );
                    info!(%location, attacker = %attacking_player, "waiting for capture or raze decision");
                    return Ok(CombatEndOutcome::AwaitingCaptureDecision);
                }
                None => Some(CaptureCityDecision::Capture),
            },
            _ => None,
        };

        let mut swiped = None;
        let mut razing = None;
        if let (Some(decision), Some(owner)) = (decision, city_owner) {
            let (s, r) = self.take_city(location, attacking_player, owner, decision)?;
            swiped = Some(s);
            razing = r;
        }

        let ended = ServerMessage::CombatEnded {
            location,
            winning_player,
            capture_city_decision: decision,
            gold_swiped: swiped,
            gold_from_razing: razing,
        };
        self.send(attacking_player, ended.clone());
        if let Some(defender) = defending_player {
            self.send(defender, ended);
        }

        let combat = self.combats.remove(location)?;

        let mut advanced_to = None;
        if attacker_won && !combat.is_border_conflict() {
            let dest = advance_destination(location, combat.attacking_from, self.world.is_tower(location));
            self.advance_units(&combat.advancing_units, dest);
            self.services.update_fog_of_war(&self.world, attacking_player);
            advanced_to = Some(dest);
        }

        if self.is_players_turn(attacking_player) {
            self.send(attacking_player, ServerMessage::SelectNextUnitToMoveOverland);
        }

        if let Some(movement) = &combat.attacker_pending_movement {
            self.world.player_mut(attacking_player)?.remove_pending_movement(movement);
        }
        if let (Some(movement), Some(defender)) = (&combat.defender_pending_movement, defending_player) {
            if combat.is_border_conflict() {
                self.world.player_mut(defender)?.remove_pending_movement(movement);
            }
        }

        info!(
            %location,
            winner = %winning_player,
            decision = ?decision,
            gold_swiped = ?swiped,
            gold_from_razing = ?razing,
            advanced_to = ?advanced_to,
            "combat ended"
        );

        Ok(CombatEndOutcome::Ended(CombatResult {
            winning_player,
            capture_city_decision: decision,
            gold_swiped: swiped,
            gold_from_razing: razing,
            advanced_to,
        }))
    }

    /// Removes maintained spells that only last for this combat.
    fn deactivate_combat_spells(&mut self, location: MapCoords3D) {
        let (ended, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.world.maintained_spells)
            .into_iter()
            .partition(|s| s.combat_location == Some(location));
        self.world.maintained_spells = kept;
        for spell in ended {
            self.send_to_observers(location, ServerMessage::MaintainedSpellRemoved { spell });
        }
    }

    /// Removes dead units and combat summons. Independent guardians that
    /// survived are only removed from the attacker's client view: clients
    /// never track lair and node guardians outside combat.
    fn purge_combat_units(
        &mut self,
        location: MapCoords3D,
        combatants: &[UnitId],
        summoned_units: &[UnitId],
        attacking_player: PlayerId,
        defending_player: Option<PlayerId>,
    ) -> Result<(), EngineError> {
        let independent_defender = match defending_player {
            Some(d) => self.world.player(d)?.kind.is_independent(),
            None => false,
        };

        let garrison = self.world.garrison_cell(location);
        let mut purged = 0;
        let mut forgotten = 0;
        for &id in combatants {
            let Ok(unit) = self.world.unit(id) else {
                continue;
            };
            let summoned = unit.combat.is_some_and(|c| c.summoned) || summoned_units.contains(&id);
            let dead = !unit.is_alive();
            let guardian = independent_defender
                && unit.is_alive()
                && Some(unit.owner) == defending_player
                && unit.location == Some(garrison)
                && !self.ruleset.unit_type(&unit.unit_type).map(|t| t.hero).unwrap_or(false);

            if dead || summoned {
                let seen_at = unit.location.unwrap_or(location);
                self.world.remove_unit(id);
                self.send_to_observers(seen_at, ServerMessage::RemoveUnit { unit_id: id });
                purged += 1;
            } else if guardian {
                self.send(attacking_player, ServerMessage::RemoveUnit { unit_id: id });
                forgotten += 1;
            }
        }
        debug!(%location, purged, forgotten, "purged combat units");
        Ok(())
    }

    /// Takes every unit out of the combat at `location`. Returns the
    /// attacker-side survivors.
    fn clear_combat_fields(&mut self, location: MapCoords3D) -> Result<Vec<UnitId>, EngineError> {
        let fighting: Vec<(UnitId, CombatSide)> = self
            .world
            .units
            .iter()
            .filter_map(|u| u.combat_side_at(location).map(|side| (u.id, side)))
            .collect();
        let mut survivors = Vec::new();
        for (id, side) in fighting {
            self.take_unit_out_of_combat(id)?;
            if side == CombatSide::Attacker && self.world.unit(id)?.is_alive() {
                survivors.push(id);
            }
        }
        Ok(survivors)
    }

    /// Removes area effects created by spells cast in this combat.
    fn remove_battlefield_effects(&mut self, location: MapCoords3D) {
        let (ended, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.world.combat_area_effects)
            .into_iter()
            .partition(|e| e.cast_in_combat && e.location == Some(location));
        self.world.combat_area_effects = kept;
        for effect in ended {
            self.send_to_observers(location, ServerMessage::CombatAreaEffectRemoved { effect });
        }
    }

    /// Transfers gold and the city. Returns gold swiped and, when razing,
    /// gold from the buildings.
    fn take_city(
        &mut self,
        location: MapCoords3D,
        attacker: PlayerId,
        owner: PlayerId,
        decision: CaptureCityDecision,
    ) -> Result<(u64, Option<u64>), EngineError> {
        let (population, building_cost) = match self.world.city_at(location) {
            Some(city) => (
                u64::from(city.population),
                city.buildings.iter().map(|b| self.ruleset.building_cost(b)).sum::<u64>(),
            ),
            None => return Ok((0, None)),
        };
        let total_population = self.world.total_population(owner);
        let owner_gold = self.world.player(owner)?.gold;
        let swiped = gold_swiped(owner_gold, population, total_population);

        self.world.player_mut(owner)?.gold -= swiped;
        self.world.player_mut(attacker)?.gold += swiped;

        match decision {
            CaptureCityDecision::Raze => {
                let razed = gold_from_razing(building_cost, self.config.combat.raze_gold_percent);
                self.world.player_mut(attacker)?.gold += razed;
                self.world.remove_city(location);
                self.send_to_observers(location, ServerMessage::CityDestroyed { location });
                Ok((swiped, Some(razed)))
            }
            CaptureCityDecision::Capture => {
                if let Some(city) = self.world.city_at_mut(location) {
                    city.owner = attacker;
                }
                let rebels = self.services.recalculate_rebels(&self.world, location);
                if let Some(city) = self.world.city_at_mut(location) {
                    city.rebels = rebels;
                }
                self.send_to_observers(location, ServerMessage::CityCaptured { location, new_owner: attacker });
                Ok((swiped, None))
            }
        }
    }

    /// Moves the given units, those still alive, onto `dest`.
    fn advance_units(&mut self, units: &[UnitId], dest: MapCoords3D) {
        for unit in self.world.units.iter_mut() {
            if units.contains(&unit.id) && unit.is_alive() {
                unit.location = Some(dest);
            }
        }
    }
}
