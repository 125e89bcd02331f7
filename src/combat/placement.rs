//! Putting units into combat and taking them out again.
//!
//! Every change of a unit's combat state is broadcast to each player who
//! can currently see the unit.

use tracing::debug;

use crate::config::CombatConfig;
use crate::error::EngineError;
use crate::messages::{ServerMessage, UnitPlacement};
use crate::services::SessionServices;
use crate::session::Session;
use crate::world::{CombatPlacement, CombatPosition, CombatSide, MapCoords3D, UnitId};

use super::map::CombatMap;

/// Formation cell for the `index`-th unit of a side, if the formation has one.
pub fn formation_position(config: &CombatConfig, side: CombatSide, index: usize) -> Option<CombatPosition> {
    let offset = config.formation.get(index)?;
    let pos = match side {
        CombatSide::Attacker => CombatPosition::new(
            config.attacker_anchor.x + offset.x,
            config.attacker_anchor.y + offset.y * config.attacker_row_step,
        ),
        CombatSide::Defender => CombatPosition::new(
            config.defender_anchor.x + offset.x,
            config.defender_anchor.y + offset.y * config.defender_row_step,
        ),
    };
    Some(pos)
}

/// Direction a side faces at the start of combat.
pub fn heading_for(config: &CombatConfig, side: CombatSide) -> u8 {
    match side {
        CombatSide::Attacker => config.attacker_heading,
        CombatSide::Defender => config.defender_heading,
    }
}

impl<S: SessionServices> Session<S> {
    /// Places one side's units in formation on the battlefield. Units beyond
    /// the formation take the nearest free cell behind the anchor.
    pub(crate) fn place_side(
        &mut self,
        map: &CombatMap,
        location: MapCoords3D,
        side: CombatSide,
        unit_ids: &[UnitId],
    ) -> Result<Vec<UnitPlacement>, EngineError> {
        let heading = heading_for(&self.config.combat, side);
        let mut taken: Vec<CombatPosition> = self
            .world
            .units
            .iter()
            .filter_map(|u| u.combat.filter(|c| c.location == location).map(|c| c.position))
            .collect();
        let mut placements = Vec::with_capacity(unit_ids.len());

        for (index, &unit_id) in unit_ids.iter().enumerate() {
            let preferred = formation_position(&self.config.combat, side, index)
                .filter(|p| map.is_passable(*p) && !taken.contains(p));
            let position = match preferred {
                Some(p) => p,
                None => {
                    let anchor = formation_position(&self.config.combat, side, 0)
                        .unwrap_or(CombatPosition::new(0, 0));
                    map.nearest_free(anchor, |p| taken.contains(&p))
                        .ok_or(EngineError::BattlefieldFull(location))?
                }
            };
            taken.push(position);

            let placement = self.set_unit_into_combat(
                unit_id,
                CombatPlacement {
                    location,
                    position,
                    heading,
                    side,
                    summoned: false,
                    double_moves_left: 0,
                },
            )?;
            placements.push(placement);
        }

        debug!(?side, count = placements.len(), %location, "placed units in combat");
        Ok(placements)
    }

    /// Puts a living unit into combat with a full movement allowance.
    pub(crate) fn set_unit_into_combat(
        &mut self,
        unit_id: UnitId,
        mut placement: CombatPlacement,
    ) -> Result<UnitPlacement, EngineError> {
        let unit = self.world.unit(unit_id)?;
        if !unit.is_alive() {
            return Err(EngineError::InvalidCombatant { unit: unit_id, reason: "unit is not alive" });
        }
        if unit.combat.is_some() {
            return Err(EngineError::UnitAlreadyInCombat(unit_id));
        }
        let movement = self.ruleset.unit_type(&unit.unit_type)?.movement;
        let overland = unit.location.unwrap_or(placement.location);
        placement.double_moves_left = movement * 2;

        self.world.unit_mut(unit_id)?.combat = Some(placement);

        let summary = UnitPlacement {
            unit_id,
            position: placement.position,
            heading: placement.heading,
            side: placement.side,
        };
        self.send_to_observers(
            overland,
            ServerMessage::SetUnitIntoOrTakeUnitOutOfCombat {
                unit_id,
                placement: Some(summary),
                combat_location: Some(placement.location),
            },
        );
        Ok(summary)
    }

    /// Clears every combat field of a unit at once.
    pub(crate) fn take_unit_out_of_combat(&mut self, unit_id: UnitId) -> Result<(), EngineError> {
        let unit = self.world.unit_mut(unit_id)?;
        if unit.combat.take().is_none() {
            return Ok(());
        }
        let overland = unit.location;
        if let Some(loc) = overland {
            self.send_to_observers(
                loc,
                ServerMessage::SetUnitIntoOrTakeUnitOutOfCombat {
                    unit_id,
                    placement: None,
                    combat_location: None,
                },
            );
        }
        Ok(())
    }
}
