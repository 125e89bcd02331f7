//! Overland casting: immediate casts, the multi-turn queue, and targets
//! chosen after a spell finishes.

use tracing::{debug, info};

use crate::error::{CastRejection, EngineError};
use crate::effects::check_unit_target;
use crate::messages::ServerMessage;
use crate::services::SessionServices;
use crate::session::Session;
use crate::world::{MaintainedSpell, PlayerId, SpellId, SpellKind, SpellTarget, TargetAudience};

use super::budget::QueueStep;
use super::cost::reduced_overland_cost;
use super::validate::check_overland_request;
use super::{CastOutcome, CastRequest};

impl<S: SessionServices> Session<S> {
    /// Casts at once if nothing is queued and skill and mana both cover the
    /// cost; otherwise queues the spell without charging anything.
    pub(crate) fn cast_overland(&mut self, request: &CastRequest) -> Result<CastOutcome, EngineError> {
        let def = self.ruleset.spell(&request.spell)?;
        let caster = self.world.player(request.player)?;

        if let Err(rejection) = check_overland_request(&self.world, caster, def, request.has_target()) {
            return Ok(self.reject_cast(request.player, &request.spell, rejection));
        }
        let Some(cost) = reduced_overland_cost(def, caster, &self.config.casting) else {
            return Ok(self.reject_cast(request.player, &request.spell, CastRejection::NotCastableOverland));
        };

        let budget = &caster.budget;
        if budget.queue.is_empty() && budget.can_cast_now(cost) {
            self.world.player_mut(request.player)?.budget.charge(cost);
            info!(player = %request.player, spell = %request.spell, cost, "overland spell cast");
            self.apply_overland_spell(request.player, &request.spell)?;
            return Ok(CastOutcome::CastNow);
        }

        self.world
            .player_mut(request.player)?
            .budget
            .enqueue(request.spell.clone());
        self.send(
            request.player,
            ServerMessage::OverlandCastQueued { spell: request.spell.clone() },
        );
        info!(player = %request.player, spell = %request.spell, cost, "overland spell queued");
        Ok(CastOutcome::Queued)
    }

    /// Puts the player's remaining skill and mana into their casting queue,
    /// in order. Several queued spells can finish in one call. Returns true
    /// if any did.
    ///
    /// Calling this again with no skill left changes nothing.
    pub fn progress_overland_casting(&mut self, player_id: PlayerId) -> Result<bool, EngineError> {
        let mut completed_any = false;
        loop {
            let player = self.world.player(player_id)?;
            if player.budget.skill_remaining_this_turn == 0 {
                break;
            }
            let Some(head) = player.budget.head() else {
                break;
            };
            let def = self.ruleset.spell(head)?;
            let cost = reduced_overland_cost(def, player, &self.config.casting).unwrap_or(0);

            let step = self.world.player_mut(player_id)?.budget.pay_towards_head(cost);
            match step {
                QueueStep::Stalled => break,
                QueueStep::Progressed { spent } => {
                    let mana_spent = self.world.player(player_id)?.budget.mana_spent_on_current;
                    debug!(player = %player_id, spent, mana_spent, cost, "overland casting progressed");
                    self.send(player_id, ServerMessage::UpdateManaSpentOnCastingCurrentSpell { mana_spent });
                    break;
                }
                QueueStep::Completed { spell, spent } => {
                    info!(player = %player_id, %spell, spent, "queued overland spell completed");
                    self.send(player_id, ServerMessage::RemoveQueuedSpell { index: 0 });
                    self.apply_overland_spell(player_id, &spell)?;
                    completed_any = true;
                }
            }
        }
        Ok(completed_any)
    }

    /// Gives a wizard their casting skill for the new turn and spends it on
    /// the queue.
    pub fn start_player_turn(&mut self, player_id: PlayerId) -> Result<bool, EngineError> {
        let player = self.world.player_mut(player_id)?;
        let skill = player.modified_casting_skill();
        player.budget.reset_turn_skill(skill);
        debug!(player = %player_id, skill, "overland casting skill reset");
        self.progress_overland_casting(player_id)
    }

    /// Resolves a finished unit or city enchantment onto the target the
    /// player picked. A rejected target leaves the spell waiting.
    pub fn target_overland_spell(
        &mut self,
        player_id: PlayerId,
        spell: &SpellId,
        target: SpellTarget,
    ) -> Result<CastOutcome, EngineError> {
        let waiting = self
            .world
            .player(player_id)?
            .spells_awaiting_target
            .iter()
            .position(|s| s == spell);
        let Some(index) = waiting else {
            return Ok(self.reject_cast(player_id, spell, CastRejection::NotAwaitingTarget));
        };
        let def = self.ruleset.spell(spell)?;

        let checked = match (def.kind, target) {
            (SpellKind::UnitEnchantment, SpellTarget::Unit(unit)) => {
                check_unit_target(&self.world, &self.ruleset, player_id, def, unit, None)
                    .map_err(CastRejection::InvalidTarget)
            }
            (SpellKind::CityEnchantment, SpellTarget::City(location)) => match self.world.city_at(location) {
                None => Err(CastRejection::TargetNotAllowed),
                Some(city) => {
                    let own = city.owner == player_id;
                    let allowed = match def.targets {
                        TargetAudience::Own => own,
                        TargetAudience::Enemy => !own,
                    };
                    let already = self.world.maintained_spells.iter().any(|s| {
                        s.caster == player_id && &s.spell == spell && s.target == target
                    });
                    if !allowed {
                        Err(CastRejection::TargetNotAllowed)
                    } else if already {
                        Err(CastRejection::AlreadyActive)
                    } else {
                        Ok(())
                    }
                }
            },
            _ => Err(CastRejection::TargetNotAllowed),
        };
        if let Err(rejection) = checked {
            return Ok(self.reject_cast(player_id, spell, rejection));
        }

        self.world
            .player_mut(player_id)?
            .spells_awaiting_target
            .remove(index);

        match target {
            SpellTarget::Unit(unit) => {
                self.apply_unit_enchantment(player_id, spell, unit, None)?;
            }
            SpellTarget::City(location) => {
                let maintained = MaintainedSpell {
                    caster: player_id,
                    spell: spell.clone(),
                    target,
                    effect: None,
                    combat_location: None,
                };
                self.world.maintained_spells.push(maintained.clone());
                self.send_to_observers(location, ServerMessage::MaintainedSpellAdded { spell: maintained });
                self.services.recalculate_production(&self.world, player_id);
            }
            SpellTarget::Global => {}
        }
        self.send_spell_cast(player_id, spell, None);
        info!(player = %player_id, %spell, ?target, "overland spell targeted");
        Ok(CastOutcome::CastNow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::random::ScriptedRandom;
    use crate::services::NoopServices;
    use crate::world::{
        MapCoords3D, Player, PlayerKind, Realm, ResearchStatus, Ruleset, SpellDefinition, World,
    };

    const ME: PlayerId = PlayerId(1);

    fn spell(id: &str, kind: SpellKind, cost: u32) -> SpellDefinition {
        SpellDefinition {
            id: id.into(),
            name: id.to_string(),
            realm: Realm::Sorcery,
            kind,
            overland_cost: Some(cost),
            combat_cost: None,
            targets: TargetAudience::Own,
            combat_area_effects: Vec::new(),
            unit_effects: vec!["US010".to_string()],
            summoned_units: Vec::new(),
        }
    }

    fn session(skill: u32, mana: u32) -> Session {
        let mut me = Player::new(ME, "Merlin", PlayerKind::Human);
        me.fortress = Some(MapCoords3D::new(5, 5, 0));
        me.budget.skill_remaining_this_turn = skill;
        me.budget.mana_reserve = mana;
        for id in ["SP001", "SP002", "SP003"] {
            me.research.insert(id.into(), ResearchStatus::Available);
        }
        let mut world = World::default();
        world.players.push(me);
        let ruleset = Ruleset {
            spells: vec![
                spell("SP001", SpellKind::OverlandEnchantment, 5),
                spell("SP002", SpellKind::UnitEnchantment, 10),
                spell("SP003", SpellKind::OverlandEnchantment, 50),
            ],
            ..Ruleset::default()
        };
        Session::new(
            world,
            ruleset,
            SessionConfig::default(),
            Box::new(ScriptedRandom::default()),
            NoopServices,
        )
    }

    fn budget(s: &Session) -> &crate::casting::CastingBudget {
        &s.world.player(ME).unwrap().budget
    }

    #[test]
    fn affordable_spell_casts_immediately() {
        let mut s = session(10, 100);
        let outcome = s.request_cast_spell(&CastRequest::overland(ME, "SP001")).unwrap();
        assert_eq!(outcome, CastOutcome::CastNow);
        assert_eq!(budget(&s).skill_remaining_this_turn, 5);
        assert_eq!(budget(&s).mana_reserve, 95);
        assert!(s.has_global_enchantment(ME, &"SP001".into()));
    }

    #[test]
    fn expensive_spell_is_queued_without_charge() {
        let mut s = session(10, 100);
        let outcome = s.request_cast_spell(&CastRequest::overland(ME, "SP003")).unwrap();
        assert_eq!(outcome, CastOutcome::Queued);
        assert_eq!(budget(&s).skill_remaining_this_turn, 10);
        assert_eq!(budget(&s).mana_reserve, 100);
        assert_eq!(
            s.outbox.for_player(ME),
            vec![&ServerMessage::OverlandCastQueued { spell: "SP003".into() }]
        );
    }

    #[test]
    fn nothing_jumps_the_queue() {
        let mut s = session(10, 100);
        s.request_cast_spell(&CastRequest::overland(ME, "SP003")).unwrap();
        let outcome = s.request_cast_spell(&CastRequest::overland(ME, "SP001")).unwrap();
        assert_eq!(outcome, CastOutcome::Queued);
        assert_eq!(budget(&s).queue.len(), 2);
    }

    #[test]
    fn queue_completes_several_spells_in_one_call() {
        let mut s = session(14, 100);
        {
            let b = &mut s.world.player_mut(ME).unwrap().budget;
            for _ in 0..4 {
                b.enqueue("SP001".into());
            }
            b.mana_spent_on_current = 2;
        }
        // Only the first copy can become a global enchantment; the rest are wasted.
        assert!(s.progress_overland_casting(ME).unwrap());
        let b = budget(&s);
        assert_eq!(b.queue.len(), 1);
        assert_eq!(b.mana_spent_on_current, 1);
        assert_eq!(b.skill_remaining_this_turn, 0);
        assert_eq!(b.mana_reserve, 100 - 14);

        let removed = s
            .outbox
            .for_player(ME)
            .into_iter()
            .filter(|m| matches!(m, ServerMessage::RemoveQueuedSpell { index: 0 }))
            .count();
        assert_eq!(removed, 3);
    }

    #[test]
    fn progress_without_skill_changes_nothing() {
        let mut s = session(0, 100);
        s.world.player_mut(ME).unwrap().budget.enqueue("SP003".into());
        let before = budget(&s).clone();
        assert!(!s.progress_overland_casting(ME).unwrap());
        assert!(!s.progress_overland_casting(ME).unwrap());
        assert_eq!(budget(&s), &before);
        assert!(s.outbox.is_empty());
    }

    #[test]
    fn turn_start_resets_skill_and_progresses() {
        let mut s = session(0, 100);
        s.world.player_mut(ME).unwrap().casting_skill = 20;
        s.world.player_mut(ME).unwrap().budget.enqueue("SP003".into());
        assert!(!s.start_player_turn(ME).unwrap());
        let b = budget(&s);
        assert_eq!(b.skill_remaining_this_turn, 0);
        assert_eq!(b.mana_spent_on_current, 20);
        assert!(s
            .outbox
            .for_player(ME)
            .contains(&&ServerMessage::UpdateManaSpentOnCastingCurrentSpell { mana_spent: 20 }));
    }

    #[test]
    fn unit_enchantment_waits_for_target() {
        let mut s = session(20, 100);
        let unit = s.world.add_unit(ME, "UN100".into(), MapCoords3D::new(5, 5, 0));
        s.request_cast_spell(&CastRequest::overland(ME, "SP002")).unwrap();
        assert_eq!(s.world.player(ME).unwrap().spells_awaiting_target, vec![SpellId::from("SP002")]);

        let wrong = s
            .target_overland_spell(ME, &"SP002".into(), SpellTarget::City(MapCoords3D::new(5, 5, 0)))
            .unwrap();
        assert_eq!(wrong, CastOutcome::Rejected(CastRejection::TargetNotAllowed));

        let done = s.target_overland_spell(ME, &"SP002".into(), SpellTarget::Unit(unit)).unwrap();
        assert_eq!(done, CastOutcome::CastNow);
        assert_eq!(s.world.unit_effects(unit).collect::<Vec<_>>(), vec!["US010"]);
        assert!(s.world.player(ME).unwrap().spells_awaiting_target.is_empty());

        let again = s.target_overland_spell(ME, &"SP002".into(), SpellTarget::Unit(unit)).unwrap();
        assert_eq!(again, CastOutcome::Rejected(CastRejection::NotAwaitingTarget));
    }
}
