//! Pre-flight checks for cast requests.
//!
//! Everything here is read-only. A request that passes has not been charged
//! yet; a request that fails is dropped with the rejection as its reason.

use crate::combat::registry::CombatInstance;
use crate::config::{CastingConfig, OverlandMapConfig};
use crate::error::CastRejection;
use crate::world::{CombatSide, Player, ResearchStatus, SpellDefinition, SpellKind, SpellTarget, World};

use super::cost::{combat_mana_cost, doubled_range_penalty, reduced_combat_cost};

/// What a combat cast will cost once accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatCharge {
    pub side: CombatSide,
    /// Deducted from the side's combat casting skill.
    pub skill: u32,
    /// Deducted from the caster's mana reserve, range penalty included.
    pub mana: u32,
}

pub fn check_researched(caster: &Player, spell: &SpellDefinition) -> Result<(), CastRejection> {
    if caster.research_status(&spell.id) == ResearchStatus::Available {
        Ok(())
    } else {
        Err(CastRejection::NotResearched)
    }
}

/// Checks an overland request before it is cast or queued.
pub fn check_overland_request(
    world: &World,
    caster: &Player,
    spell: &SpellDefinition,
    has_target: bool,
) -> Result<(), CastRejection> {
    check_researched(caster, spell)?;
    if !spell.castable_overland() {
        return Err(CastRejection::NotCastableOverland);
    }
    // Overland targets are chosen after the spell finishes casting.
    if has_target {
        return Err(CastRejection::TargetNotAllowed);
    }
    match spell.kind {
        SpellKind::OverlandEnchantment => {
            let active = world.maintained_spells.iter().any(|s| {
                s.caster == caster.id && s.spell == spell.id && s.target == SpellTarget::Global
            });
            if active {
                return Err(CastRejection::AlreadyActive);
            }
        }
        SpellKind::Summoning if caster.fortress.is_none() => return Err(CastRejection::Banished),
        _ => {}
    }
    Ok(())
}

/// Checks that the caster may cast in this combat this turn and can pay for
/// it. Checks run in a fixed order so the first failure is reported.
pub fn check_combat_affordability(
    combat: &CombatInstance,
    caster: &Player,
    spell: &SpellDefinition,
    casting: &CastingConfig,
    map: &OverlandMapConfig,
) -> Result<CombatCharge, CastRejection> {
    let side = combat.side_of(caster.id).ok_or(CastRejection::NotInCombat)?;
    if combat.spell_cast_this_turn(side) {
        return Err(CastRejection::AlreadyCastThisCombatTurn);
    }
    let reduced = reduced_combat_cost(spell, caster, casting).ok_or(CastRejection::NotCastableInCombat)?;
    let penalty = doubled_range_penalty(caster, combat.location, casting, map).ok_or(CastRejection::Banished)?;
    if combat.casting_skill_remaining(side) < reduced {
        return Err(CastRejection::InsufficientCombatSkill);
    }
    let mana = combat_mana_cost(reduced, penalty);
    if caster.budget.mana_reserve < mana {
        return Err(CastRejection::InsufficientMana);
    }
    Ok(CombatCharge { side, skill: reduced, mana })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::map::CombatMap;
    use crate::world::{MaintainedSpell, MapCoords3D, PlayerId, PlayerKind, Realm, TargetAudience};

    const COMBAT_AT: MapCoords3D = MapCoords3D { x: 20, y: 10, plane: 0 };

    fn spell(kind: SpellKind) -> SpellDefinition {
        SpellDefinition {
            id: "SP030".into(),
            name: "Prayer".to_string(),
            realm: Realm::Life,
            kind,
            overland_cost: Some(40),
            combat_cost: Some(20),
            targets: TargetAudience::Own,
            combat_area_effects: vec!["CSE001".to_string()],
            unit_effects: Vec::new(),
            summoned_units: Vec::new(),
        }
    }

    fn wizard() -> Player {
        let mut p = Player::new(PlayerId(1), "Merlin", PlayerKind::Human);
        p.research.insert("SP030".into(), ResearchStatus::Available);
        p.fortress = Some(MapCoords3D::new(12, 10, 0));
        p.budget.mana_reserve = 35;
        p
    }

    fn combat() -> CombatInstance {
        let mut c = CombatInstance::new(
            COMBAT_AT,
            MapCoords3D::new(19, 10, 0),
            CombatMap::open(12, 25),
            PlayerId(1),
            Some(PlayerId(2)),
            None,
            None,
        );
        c.set_casting_skill(CombatSide::Attacker, 21);
        c
    }

    fn check(c: &CombatInstance, p: &Player, s: &SpellDefinition) -> Result<CombatCharge, CastRejection> {
        check_combat_affordability(c, p, s, &CastingConfig::default(), &OverlandMapConfig::default())
    }

    #[test]
    fn charge_includes_range_penalty() {
        // Fortress is 8 cells away: doubled penalty 3.
        let charge = check(&combat(), &wizard(), &spell(SpellKind::CombatEnchantment)).unwrap();
        assert_eq!(charge, CombatCharge { side: CombatSide::Attacker, skill: 20, mana: 30 });
    }

    #[test]
    fn second_cast_in_a_turn_is_rejected() {
        let mut c = combat();
        c.mark_spell_cast(CombatSide::Attacker);
        assert_eq!(
            check(&c, &wizard(), &spell(SpellKind::CombatEnchantment)),
            Err(CastRejection::AlreadyCastThisCombatTurn)
        );
    }

    #[test]
    fn rejections_in_order() {
        let s = spell(SpellKind::CombatEnchantment);

        let mut outsider = wizard();
        outsider.id = PlayerId(3);
        assert_eq!(check(&combat(), &outsider, &s), Err(CastRejection::NotInCombat));

        let mut banished = wizard();
        banished.fortress = None;
        assert_eq!(check(&combat(), &banished, &s), Err(CastRejection::Banished));

        let mut weak = combat();
        weak.set_casting_skill(CombatSide::Attacker, 19);
        assert_eq!(check(&weak, &wizard(), &s), Err(CastRejection::InsufficientCombatSkill));

        let mut poor = wizard();
        poor.budget.mana_reserve = 29;
        assert_eq!(check(&combat(), &poor, &s), Err(CastRejection::InsufficientMana));
    }

    #[test]
    fn overland_request_checks() {
        let w = World::default();
        let p = wizard();
        assert_eq!(check_overland_request(&w, &p, &spell(SpellKind::OverlandEnchantment), false), Ok(()));
        assert_eq!(
            check_overland_request(&w, &p, &spell(SpellKind::CombatEnchantment), false),
            Err(CastRejection::NotCastableOverland)
        );
        assert_eq!(
            check_overland_request(&w, &p, &spell(SpellKind::UnitEnchantment), true),
            Err(CastRejection::TargetNotAllowed)
        );

        let mut unresearched = wizard();
        unresearched.research.insert("SP030".into(), ResearchStatus::ResearchableNow);
        assert_eq!(
            check_overland_request(&w, &unresearched, &spell(SpellKind::OverlandEnchantment), false),
            Err(CastRejection::NotResearched)
        );
    }

    #[test]
    fn active_global_enchantment_cannot_be_recast() {
        let mut w = World::default();
        w.maintained_spells.push(MaintainedSpell {
            caster: PlayerId(1),
            spell: "SP030".into(),
            target: SpellTarget::Global,
            effect: None,
            combat_location: None,
        });
        assert_eq!(
            check_overland_request(&w, &wizard(), &spell(SpellKind::OverlandEnchantment), false),
            Err(CastRejection::AlreadyActive)
        );
    }
}
