//! Randomised soak runs.
//!
//! Plays many independent sessions of random combats and casts, checking
//! after every combat that no combat state leaks. Sessions share nothing, so
//! with more than one thread they run concurrently on a rayon pool.

use std::io::Write;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

use crate::casting::{CastOutcome, CastRequest};
use crate::combat::CombatEndOutcome;
use crate::config::SessionConfig;
use crate::error::EngineError;
use crate::random::SeededRandom;
use crate::services::NoopServices;
use crate::session::Session;
use crate::world::{
    CaptureCityDecision, City, CombatPosition, CombatSide, MapCoords3D, Player, PlayerId, PlayerKind,
    Realm, ResearchStatus, Ruleset, SpellDefinition, SpellKind, TargetAudience, UnitTypeDef, UnitTypeId,
    World,
};

/// Configuration for a soak run.
#[derive(Debug, Clone)]
pub struct SoakConfig {
    /// Number of independent sessions.
    pub num_sessions: usize,
    /// Combats fought in each session.
    pub combats_per_session: usize,
    /// Worker threads; 1 runs sessions in order on the caller's thread.
    pub threads: usize,
    /// Base seed (0 = use entropy). Session `i` uses `seed + i`.
    pub seed: u64,
}

impl Default for SoakConfig {
    fn default() -> Self {
        SoakConfig {
            num_sessions: 8,
            combats_per_session: 20,
            threads: 4,
            seed: 0,
        }
    }
}

/// Summary of one soak session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SoakReport {
    pub session_id: usize,
    pub combats: usize,
    pub casts_accepted: usize,
    pub casts_rejected: usize,
    pub casts_queued: usize,
    pub cities_razed: usize,
    /// Invariant violations found; empty on a clean run.
    pub violations: Vec<String>,
}

const WIZARD: PlayerId = PlayerId(1);
const RIVAL: PlayerId = PlayerId(2);
const MONSTERS: PlayerId = PlayerId(3);

fn soak_ruleset() -> Ruleset {
    let unit = |id: &str, movement| UnitTypeDef {
        id: UnitTypeId::from(id),
        name: id.to_string(),
        movement,
        hero: false,
        invisible: false,
    };
    let spell = |id: &str, kind, overland, combat| SpellDefinition {
        id: id.into(),
        name: id.to_string(),
        realm: Realm::Chaos,
        kind,
        overland_cost: overland,
        combat_cost: combat,
        targets: TargetAudience::Own,
        combat_area_effects: vec!["CSE001".to_string(), "CSE002".to_string(), "CSE003".to_string()],
        unit_effects: vec!["US001".to_string(), "US002".to_string()],
        summoned_units: vec![UnitTypeId::from("UN200"), UnitTypeId::from("UN201")],
    };
    Ruleset {
        spells: vec![
            spell("SP001", SpellKind::CombatEnchantment, None, Some(10)),
            spell("SP002", SpellKind::UnitEnchantment, Some(20), Some(8)),
            spell("SP003", SpellKind::Summoning, Some(40), Some(15)),
            spell("SP004", SpellKind::OverlandEnchantment, Some(60), None),
        ],
        unit_types: vec![unit("UN100", 1), unit("UN101", 2), unit("UN200", 49), unit("UN201", 3)],
        ..Ruleset::default()
    }
}

fn wizard(id: PlayerId, kind: PlayerKind, fortress: MapCoords3D) -> Player {
    let mut p = Player::new(id, &format!("wizard {}", id.0), kind);
    p.casting_skill = 30;
    p.fortress = Some(fortress);
    p.gold = 1000;
    p.budget.mana_reserve = 400;
    for spell in ["SP001", "SP002", "SP003", "SP004"] {
        p.research.insert(spell.into(), ResearchStatus::Available);
    }
    p
}

fn soak_session(seed: u64) -> Session {
    let mut world = World::default();
    world.players.push(wizard(WIZARD, PlayerKind::Human, MapCoords3D::new(5, 5, 0)));
    world.players.push(wizard(RIVAL, PlayerKind::Ai, MapCoords3D::new(30, 20, 0)));
    world.players.push(Player::new(MONSTERS, "Monsters", PlayerKind::Monsters));
    Session::new(
        world,
        soak_ruleset(),
        SessionConfig::default(),
        Box::new(SeededRandom::new(seed)),
        NoopServices,
    )
}

/// Plays one session and checks invariants after every combat.
pub fn play_session(config: &SoakConfig, session_id: usize, seed: u64) -> Result<SoakReport, EngineError> {
    let mut rng = if seed != 0 {
        SmallRng::seed_from_u64(seed)
    } else {
        SmallRng::from_entropy()
    };
    let mut session = soak_session(seed);
    let mut report = SoakReport { session_id, ..SoakReport::default() };

    for round in 0..config.combats_per_session {
        let location = MapCoords3D::new(10 + round as i32, 10, 0);
        let from = MapCoords3D::new(9 + round as i32, 10, 0);
        let defender = if rng.gen_bool(0.5) { RIVAL } else { MONSTERS };

        let attackers: Vec<_> = (0..rng.gen_range(1..=4))
            .map(|_| session.world.add_unit(WIZARD, UnitTypeId::from("UN100"), from))
            .collect();
        for _ in 0..rng.gen_range(0..=3) {
            session.world.add_unit(defender, UnitTypeId::from("UN101"), location);
        }
        if defender == RIVAL && rng.gen_bool(0.5) {
            session.world.cities.push(City {
                location,
                owner: RIVAL,
                name: format!("city {round}"),
                population: rng.gen_range(1000..20000),
                buildings: Vec::new(),
                rebels: 0,
            });
        }

        session.start_player_turn(WIZARD)?;
        session.start_combat(location, from, &attackers, None, None, None)?;
        report.combats += 1;

        while session.combats.contains(location) {
            if session.combats.get(location)?.awaiting_capture_decision {
                let decision = if rng.gen_bool(0.5) {
                    CaptureCityDecision::Capture
                } else {
                    report.cities_razed += 1;
                    CaptureCityDecision::Raze
                };
                let defending = session.combats.get(location)?.defending_player;
                session.combat_ended(location, WIZARD, defending, WIZARD, Some(decision))?;
                break;
            }

            let request = match rng.gen_range(0..3) {
                0 => CastRequest::in_combat(WIZARD, "SP001", location),
                1 => CastRequest::in_combat(WIZARD, "SP002", location).at_unit(attackers[0]),
                _ => CastRequest::in_combat(WIZARD, "SP003", location)
                    .at_cell(CombatPosition::new(rng.gen_range(0..12), rng.gen_range(0..25))),
            };
            match session.request_cast_spell(&request)? {
                CastOutcome::CastNow | CastOutcome::Countered => report.casts_accepted += 1,
                CastOutcome::Queued => report.casts_queued += 1,
                CastOutcome::Rejected(_) => report.casts_rejected += 1,
            }

            let side = if rng.gen_bool(0.5) { CombatSide::Attacker } else { CombatSide::Defender };
            let victim = session.world.combatants(location, side).next().map(|u| u.id);
            let outcome = match victim {
                Some(unit) => session.kill_combat_unit(unit)?,
                None => session.check_combat_over(location)?,
            };
            if let Some(CombatEndOutcome::Ended(_)) = outcome {
                break;
            }
            if session.combats.contains(location) {
                session.next_combat_turn(location)?;
            }
        }

        report.violations.extend(check_invariants(&session, round));
        if rng.gen_bool(0.3) {
            report.casts_queued += usize::from(
                session.request_cast_spell(&CastRequest::overland(WIZARD, "SP004"))? == CastOutcome::Queued,
            );
        }
        session.outbox.drain();
    }

    debug!(session_id, combats = report.combats, violations = report.violations.len(), "soak session finished");
    Ok(report)
}

/// Post-combat invariants of a session with no combat in progress.
pub fn check_invariants<S: crate::services::SessionServices>(session: &Session<S>, round: usize) -> Vec<String> {
    let mut violations = Vec::new();
    if !session.combats.is_empty() {
        violations.push(format!("round {round}: {} combats still registered", session.combats.len()));
    }
    for unit in &session.world.units {
        if unit.combat.is_some() {
            violations.push(format!("round {round}: {} kept combat fields", unit.id));
        }
        if !unit.is_alive() {
            violations.push(format!("round {round}: dead {} was not purged", unit.id));
        }
    }
    if session.world.combat_area_effects.iter().any(|e| e.cast_in_combat) {
        violations.push(format!("round {round}: combat area effect outlived its combat"));
    }
    if session.world.maintained_spells.iter().any(|s| s.combat_location.is_some()) {
        violations.push(format!("round {round}: combat spell outlived its combat"));
    }
    for player in &session.world.players {
        let b = &player.budget;
        if b.queue.is_empty() && b.mana_spent_on_current != 0 {
            violations.push(format!("round {round}: {} has mana sunk into an empty queue", player.id));
        }
    }
    violations
}

/// Runs every session, in parallel when `config.threads > 1`.
pub fn run_soak(config: &SoakConfig) -> Result<Vec<Result<SoakReport, EngineError>>, rayon::ThreadPoolBuildError> {
    use rayon::prelude::*;

    let seed_for = |i: usize| if config.seed == 0 { 0 } else { config.seed.wrapping_add(i as u64) };

    if config.threads <= 1 {
        return Ok((0..config.num_sessions)
            .map(|i| play_session(config, i, seed_for(i)))
            .collect());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()?;
    let reports = pool.install(|| {
        (0..config.num_sessions)
            .into_par_iter()
            .map(|i| play_session(config, i, seed_for(i)))
            .collect()
    });
    info!(sessions = config.num_sessions, threads = config.threads, "soak finished");
    Ok(reports)
}

/// Writes reports as JSONL (one JSON object per session).
pub fn write_jsonl<W: Write>(reports: &[SoakReport], out: &mut W) -> std::io::Result<()> {
    for report in reports {
        serde_json::to_writer(&mut *out, report)?;
        writeln!(out)?;
    }
    out.flush()
}
