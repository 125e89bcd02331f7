//! Casting spells into a combat.
//!
//! Each side may cast once per combat turn. The caster pays the reduced
//! cost from the side's combat skill and the range-scaled cost from their
//! mana reserve. Every check, target checks included, runs before anything
//! is charged.

use tracing::info;

use crate::error::{CastRejection, EngineError};
use crate::effects::{check_summon_cell, check_unit_target, untaken_area_effects};
use crate::services::{CounterOutcome, SessionServices};
use crate::session::Session;
use crate::world::{CombatPosition, MapCoords3D, SpellKind, UnitId};

use super::validate::{check_combat_affordability, check_researched};
use super::{CastOutcome, CastRequest};

/// Where a validated combat spell will land.
enum CombatTarget {
    Battlefield,
    Unit(UnitId),
    Cell(CombatPosition),
}

impl<S: SessionServices> Session<S> {
    pub(crate) fn cast_in_combat(
        &mut self,
        request: &CastRequest,
        location: MapCoords3D,
    ) -> Result<CastOutcome, EngineError> {
        let player_id = request.player;
        let def = self.ruleset.spell(&request.spell)?.clone();
        let caster = self.world.player(player_id)?;

        let checked = check_researched(caster, &def).and_then(|()| {
            if def.castable_in_combat() {
                Ok(())
            } else {
                Err(CastRejection::NotCastableInCombat)
            }
        });
        if let Err(rejection) = checked {
            return Ok(self.reject_cast(player_id, &request.spell, rejection));
        }

        let Ok(combat) = self.combats.get(location) else {
            return Ok(self.reject_cast(player_id, &request.spell, CastRejection::NotInCombat));
        };
        let charge = match check_combat_affordability(
            combat,
            caster,
            &def,
            &self.config.casting,
            &self.config.overland,
        ) {
            Ok(charge) => charge,
            Err(rejection) => return Ok(self.reject_cast(player_id, &request.spell, rejection)),
        };

        let target = match def.kind {
            SpellKind::CombatEnchantment => {
                if request.has_target() {
                    Err(CastRejection::TargetNotAllowed)
                } else if untaken_area_effects(&self.world, &def, location).is_empty() {
                    Err(CastRejection::NoEffectsLeft)
                } else {
                    Ok(CombatTarget::Battlefield)
                }
            }
            SpellKind::UnitEnchantment => match request.target_unit {
                None => Err(CastRejection::MissingTargetUnit),
                Some(unit) => check_unit_target(&self.world, &self.ruleset, player_id, &def, unit, Some(location))
                    .map(|()| CombatTarget::Unit(unit))
                    .map_err(CastRejection::InvalidTarget),
            },
            SpellKind::Summoning => match request.target_cell {
                None => Err(CastRejection::MissingTargetCell),
                Some(_) if def.summoned_units.is_empty() => Err(CastRejection::NoEffectsLeft),
                Some(cell) => check_summon_cell(
                    &self.world,
                    &self.ruleset,
                    &self.config.combat,
                    &combat.map,
                    location,
                    player_id,
                    charge.side,
                    cell,
                )
                .map(CombatTarget::Cell),
            },
            SpellKind::OverlandEnchantment | SpellKind::CityEnchantment => Err(CastRejection::NotCastableInCombat),
        };
        let target = match target {
            Ok(target) => target,
            Err(rejection) => return Ok(self.reject_cast(player_id, &request.spell, rejection)),
        };

        if self.services.process_countering(&mut self.world, player_id, &def, location) == CounterOutcome::Countered {
            info!(player = %player_id, spell = %request.spell, %location, "combat spell countered");
            return Ok(CastOutcome::Countered);
        }

        let combat = self.combats.get_mut(location)?;
        combat.spend_casting_skill(charge.side, charge.skill);
        combat.mark_spell_cast(charge.side);
        let budget = &mut self.world.player_mut(player_id)?.budget;
        budget.mana_reserve = budget.mana_reserve.saturating_sub(charge.mana);

        info!(
            player = %player_id,
            spell = %request.spell,
            %location,
            skill = charge.skill,
            mana = charge.mana,
            "combat spell cast"
        );

        match target {
            CombatTarget::Battlefield => {
                self.apply_combat_enchantment(player_id, &request.spell, location)?;
            }
            CombatTarget::Unit(unit) => {
                self.apply_unit_enchantment(player_id, &request.spell, unit, Some(location))?;
            }
            CombatTarget::Cell(position) => {
                self.summon_into_combat(player_id, &request.spell, location, charge.side, position)?;
            }
        }
        self.send_spell_cast(player_id, &request.spell, Some(location));
        Ok(CastOutcome::CastNow)
    }
}
