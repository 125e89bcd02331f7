//! Engine state management for the command loop.
//!
//! Holds the current session, applies parsed commands to it, and writes the
//! resulting messages as JSON lines. Failures are reported on the same
//! stream as `{"error": ...}` lines and never stop the loop.

use std::io::{self, Write};

use serde_json::json;
use tracing::{info, warn};

use crate::combat::CombatEndOutcome;
use crate::casting::CastOutcome;
use crate::protocol::{Command, Scenario};
use crate::random::SeededRandom;
use crate::services::NoopServices;
use crate::session::Session;

/// Holds the mutable state of the engine between commands.
pub struct Engine {
    pub session: Option<Session>,
    seed: u64,
}

impl Engine {
    /// Creates an engine with no session. A seed of 0 draws from entropy.
    pub fn new(seed: u64) -> Self {
        Engine { session: None, seed }
    }

    /// Replaces the current session with a fresh one built from a scenario.
    pub fn load(&mut self, scenario: Scenario) {
        self.session = Some(scenario.into_session(Box::new(SeededRandom::new(self.seed)), NoopServices));
    }

    /// Applies one command and writes every message it produced. Returns
    /// false when the loop should stop.
    pub fn handle<W: Write>(&mut self, command: Command, out: &mut W) -> io::Result<bool> {
        if let Command::Quit = command {
            return Ok(false);
        }
        if let Command::LoadScenario { path } = &command {
            match Scenario::load(path) {
                Ok(scenario) => {
                    info!(%path, "scenario loaded");
                    self.load(scenario);
                    writeln!(out, "{}", json!({ "ok": "load_scenario" }))?;
                }
                Err(e) => write_error(out, &e.to_string())?,
            }
            out.flush()?;
            return Ok(true);
        }

        let Some(session) = self.session.as_mut() else {
            write_error(out, "no scenario loaded")?;
            out.flush()?;
            return Ok(true);
        };

        match apply(session, command) {
            Ok(summary) => {
                for envelope in session.outbox.drain() {
                    writeln!(out, "{}", serde_json::to_string(&envelope)?)?;
                }
                if let Some(summary) = summary {
                    writeln!(out, "{}", json!({ "ok": summary }))?;
                }
            }
            Err(e) => {
                warn!(error = %e, "command failed");
                session.outbox.drain();
                write_error(out, &e.to_string())?;
            }
        }
        out.flush()?;
        Ok(true)
    }
}

fn write_error<W: Write>(out: &mut W, message: &str) -> io::Result<()> {
    writeln!(out, "{}", json!({ "error": message }))
}

/// Runs a session command, returning a short summary of the result.
fn apply(session: &mut Session, command: Command) -> Result<Option<String>, crate::error::EngineError> {
    let summary = match command {
        Command::StartCombat {
            defending_location,
            attacking_from,
            attacking_units,
            defending_units,
            attacker_pending_movement,
            defender_pending_movement,
        } => {
            let combat = session.start_combat(
                defending_location,
                attacking_from,
                &attacking_units,
                defending_units.as_deref(),
                attacker_pending_movement,
                defender_pending_movement,
            )?;
            format!("combat started at {}", combat.location)
        }
        Command::EndCombat {
            location,
            attacking_player,
            defending_player,
            winning_player,
            capture_city_decision,
        } => {
            let outcome = session.combat_ended(
                location,
                attacking_player,
                defending_player,
                winning_player,
                capture_city_decision,
            )?;
            describe_end(&outcome)
        }
        Command::NextCombatTurn { location } => {
            let turn = session.next_combat_turn(location)?;
            format!("combat turn {turn}")
        }
        Command::KillUnit { unit } => match session.kill_combat_unit(unit)? {
            Some(outcome) => describe_end(&outcome),
            None => format!("{unit} killed"),
        },
        Command::CastSpell(request) => describe_cast(&session.request_cast_spell(&request)?),
        Command::TargetSpell { player, spell, target } => {
            describe_cast(&session.target_overland_spell(player, &spell, target)?)
        }
        Command::ProgressCasting { player } => {
            let completed = session.progress_overland_casting(player)?;
            format!("casting progressed, completed: {completed}")
        }
        Command::StartTurn { player } => {
            let completed = session.start_player_turn(player)?;
            format!("turn started, completed: {completed}")
        }
        Command::LoadScenario { .. } | Command::Quit => return Ok(None),
    };
    Ok(Some(summary))
}

fn describe_end(outcome: &CombatEndOutcome) -> String {
    match outcome {
        CombatEndOutcome::AwaitingCaptureDecision => "awaiting capture decision".to_string(),
        CombatEndOutcome::Ended(result) => format!("combat ended, winner {}", result.winning_player),
    }
}

fn describe_cast(outcome: &CastOutcome) -> String {
    match outcome {
        CastOutcome::CastNow => "cast".to_string(),
        CastOutcome::Queued => "queued".to_string(),
        CastOutcome::Countered => "countered".to_string(),
        CastOutcome::Rejected(reason) => format!("rejected: {reason}"),
    }
}
