//! Applying a spell's effect once it has been paid for.
//!
//! Callers validate and charge first; by the time a function here runs the
//! cast is committed. Random picks go through the session's `RandomSource`.

pub mod targeting;

use tracing::{debug, warn};

use crate::error::EngineError;
use crate::messages::ServerMessage;
use crate::random::choose;
use crate::services::SessionServices;
use crate::session::Session;
use crate::world::{
    CombatAreaEffect, CombatPlacement, CombatPosition, CombatSide, MaintainedSpell, MapCoords3D,
    PlayerId, SpellId, SpellKind, SpellTarget, UnitId,
};

pub use targeting::{check_summon_cell, check_unit_target, untaken_area_effects, untaken_unit_effects};

impl<S: SessionServices> Session<S> {
    /// Adds one random area effect the battlefield does not have yet.
    /// Returns the effect granted, or `None` if every effect was already active.
    pub(crate) fn apply_combat_enchantment(
        &mut self,
        caster: PlayerId,
        spell: &SpellId,
        location: MapCoords3D,
    ) -> Result<Option<String>, EngineError> {
        let def = self.ruleset.spell(spell)?;
        let candidates = untaken_area_effects(&self.world, def, location);
        let Some(effect_id) = choose(self.rng.as_mut(), &candidates).map(|e| e.to_string()) else {
            return Ok(None);
        };

        let effect = CombatAreaEffect {
            effect_id: effect_id.clone(),
            location: Some(location),
            caster: Some(caster),
            cast_in_combat: true,
        };
        self.world.combat_area_effects.push(effect.clone());
        self.send_to_observers(location, ServerMessage::CombatAreaEffectAdded { effect });
        debug!(%caster, %spell, effect = %effect_id, %location, "combat enchantment applied");
        Ok(Some(effect_id))
    }

    /// Grants one random skill effect the unit does not have yet. Spells cast
    /// during a combat remember it and are switched off when it ends.
    pub(crate) fn apply_unit_enchantment(
        &mut self,
        caster: PlayerId,
        spell: &SpellId,
        unit_id: UnitId,
        combat_location: Option<MapCoords3D>,
    ) -> Result<Option<String>, EngineError> {
        let def = self.ruleset.spell(spell)?;
        let candidates = untaken_unit_effects(&self.world, def, unit_id);
        let Some(effect) = choose(self.rng.as_mut(), &candidates).map(|e| e.to_string()) else {
            return Ok(None);
        };

        let maintained = MaintainedSpell {
            caster,
            spell: spell.clone(),
            target: SpellTarget::Unit(unit_id),
            effect: Some(effect.clone()),
            combat_location,
        };
        self.world.maintained_spells.push(maintained.clone());

        let seen_at = self.world.unit(unit_id)?.location;
        if let Some(at) = seen_at.or(combat_location) {
            self.send_to_observers(at, ServerMessage::MaintainedSpellAdded { spell: maintained });
        }
        debug!(%caster, %spell, %unit_id, %effect, "unit enchantment applied");
        Ok(Some(effect))
    }

    /// Summons a random unit type from the spell into a combat at an already
    /// validated cell. The unit is created at the caster's side of the
    /// fight: the cell attacked from for attackers, the combat cell for
    /// defenders.
    pub(crate) fn summon_into_combat(
        &mut self,
        caster: PlayerId,
        spell: &SpellId,
        location: MapCoords3D,
        side: CombatSide,
        position: CombatPosition,
    ) -> Result<Option<UnitId>, EngineError> {
        let def = self.ruleset.spell(spell)?;
        let Some(unit_type) = choose(self.rng.as_mut(), &def.summoned_units).cloned() else {
            return Ok(None);
        };
        let combat = self.combats.get(location)?;
        let staging = match side {
            CombatSide::Attacker => combat.attacking_from,
            CombatSide::Defender => self.world.garrison_cell(location),
        };
        let heading = match side {
            CombatSide::Attacker => self.config.combat.attacker_heading,
            CombatSide::Defender => self.config.combat.defender_heading,
        };

        let unit_id = self.world.add_unit(caster, unit_type, staging);
        let unit = self.world.unit(unit_id)?.clone();
        self.send_to_observers(staging, ServerMessage::UnitAdded { unit });

        self.set_unit_into_combat(
            unit_id,
            CombatPlacement {
                location,
                position,
                heading,
                side,
                summoned: true,
                double_moves_left: 0,
            },
        )?;
        let combat = self.combats.get_mut(location)?;
        combat.combatants.push(unit_id);
        combat.summoned_units.push(unit_id);

        debug!(%caster, %spell, %unit_id, %position, %location, "unit summoned into combat");
        Ok(Some(unit_id))
    }

    /// Resolves an overland spell whose cost has been fully paid.
    ///
    /// Enchantments on a unit or city cannot resolve yet: the caster is asked
    /// for a target and the spell waits in `spells_awaiting_target`.
    pub(crate) fn apply_overland_spell(&mut self, caster: PlayerId, spell: &SpellId) -> Result<(), EngineError> {
        let def = self.ruleset.spell(spell)?;
        let kind = def.kind;
        let summoned = def.summoned_units.clone();

        match kind {
            SpellKind::OverlandEnchantment => {
                if self.has_global_enchantment(caster, spell) {
                    warn!(%caster, %spell, "global enchantment already active, cast wasted");
                    self.send_text(caster, "You already have that enchantment in effect.".to_string());
                    return Ok(());
                }
                let maintained = MaintainedSpell {
                    caster,
                    spell: spell.clone(),
                    target: SpellTarget::Global,
                    effect: None,
                    combat_location: None,
                };
                self.world.maintained_spells.push(maintained.clone());
                let humans: Vec<PlayerId> = self
                    .world
                    .players
                    .iter()
                    .filter(|p| p.kind.is_human())
                    .map(|p| p.id)
                    .collect();
                for player in humans {
                    self.send(player, ServerMessage::MaintainedSpellAdded { spell: maintained.clone() });
                }
            }
            SpellKind::Summoning => {
                let fortress = self.world.player(caster)?.fortress;
                let Some(fortress) = fortress else {
                    self.send_text(caster, "You cannot summon units while banished.".to_string());
                    return Ok(());
                };
                if self.world.living_units_at(fortress).count() >= self.config.overland.max_units_per_cell {
                    self.send_text(caster, "There is no room to summon that unit.".to_string());
                    return Ok(());
                }
                let Some(unit_type) = choose(self.rng.as_mut(), &summoned).cloned() else {
                    return Ok(());
                };
                let unit_id = self.world.add_unit(caster, unit_type, fortress);
                let unit = self.world.unit(unit_id)?.clone();
                self.send_to_observers(fortress, ServerMessage::UnitAdded { unit });
                self.refresh_player_views(caster);
                debug!(%caster, %spell, %unit_id, "unit summoned overland");
            }
            SpellKind::UnitEnchantment | SpellKind::CityEnchantment => {
                self.world.player_mut(caster)?.spells_awaiting_target.push(spell.clone());
                self.send(caster, ServerMessage::AskForSpellTarget { spell: spell.clone() });
                return Ok(());
            }
            SpellKind::CombatEnchantment => {
                warn!(%caster, %spell, "combat-only spell reached overland resolution");
                return Ok(());
            }
        }

        self.send_spell_cast(caster, spell, None);
        Ok(())
    }

    /// Returns true if the caster already maintains this global enchantment.
    pub(crate) fn has_global_enchantment(&self, caster: PlayerId, spell: &SpellId) -> bool {
        self.world
            .maintained_spells
            .iter()
            .any(|s| s.caster == caster && &s.spell == spell && s.target == SpellTarget::Global)
    }

    /// Announces a resolved cast to the caster and, in combat, to the opponent.
    pub(crate) fn send_spell_cast(&mut self, caster: PlayerId, spell: &SpellId, combat_location: Option<MapCoords3D>) {
        let message = ServerMessage::SpellCast {
            caster,
            spell: spell.clone(),
            combat_location,
        };
        let opponent = combat_location
            .and_then(|loc| self.combats.get(loc).ok())
            .and_then(|c| {
                let side = c.side_of(caster)?;
                c.player_on(side.opponent())
            });
        self.send(caster, message.clone());
        if let Some(opponent) = opponent {
            self.send(opponent, message);
        }
    }
}
