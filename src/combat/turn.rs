//! Combat turn bookkeeping: new turns, casualties, and deciding the winner.

use tracing::debug;

use crate::error::EngineError;
use crate::messages::ServerMessage;
use crate::services::SessionServices;
use crate::session::Session;
use crate::world::{CombatSide, MapCoords3D, UnitId};

use super::end::CombatEndOutcome;

impl<S: SessionServices> Session<S> {
    /// Starts the next combat turn: both sides may cast again and every
    /// living combatant gets its full movement back.
    pub fn next_combat_turn(&mut self, location: MapCoords3D) -> Result<u32, EngineError> {
        let combat = self.combats.get_mut(location)?;
        combat.begin_next_turn();
        let turn = combat.combat_turn;

        for unit in self.world.units.iter_mut() {
            if !unit.is_alive() {
                continue;
            }
            let Some(placement) = unit.combat.as_mut().filter(|c| c.location == location) else {
                continue;
            };
            let movement = self.ruleset.unit_type(&unit.unit_type)?.movement;
            placement.double_moves_left = movement * 2;
        }

        debug!(%location, turn, "next combat turn");
        Ok(turn)
    }

    /// Kills a unit fighting in a combat and ends the combat if its side has
    /// nobody left.
    pub fn kill_combat_unit(&mut self, unit_id: UnitId) -> Result<Option<CombatEndOutcome>, EngineError> {
        let unit = self.world.unit(unit_id)?;
        let placement = unit.combat.ok_or(EngineError::InvalidCombatant {
            unit: unit_id,
            reason: "unit is not in combat",
        })?;
        let overland = unit.location.unwrap_or(placement.location);

        self.world.unit_mut(unit_id)?.kill();
        self.send_to_observers(
            overland,
            ServerMessage::SetUnitIntoOrTakeUnitOutOfCombat {
                unit_id,
                placement: None,
                combat_location: None,
            },
        );
        debug!(%unit_id, location = %placement.location, "unit killed in combat");

        self.check_combat_over(placement.location)
    }

    /// Ends the combat if one side has no living combatants. The attacker
    /// wins ties, which only happen when both sides fall together.
    pub fn check_combat_over(&mut self, location: MapCoords3D) -> Result<Option<CombatEndOutcome>, EngineError> {
        let combat = self.combats.get(location)?;
        if combat.awaiting_capture_decision {
            return Ok(None);
        }
        let attacker = combat.attacking_player;
        let defender = combat.defending_player;

        let attackers_left = self.world.combatants(location, CombatSide::Attacker).count();
        let defenders_left = self.world.combatants(location, CombatSide::Defender).count();

        let winner = if defenders_left == 0 {
            attacker
        } else if attackers_left == 0 {
            match defender {
                Some(d) => d,
                None => attacker,
            }
        } else {
            return Ok(None);
        };

        self.combat_ended(location, attacker, defender, winner, None).map(Some)
    }
}
