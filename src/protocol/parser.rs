//! Command parser.
//!
//! Each input line is one JSON object naming a command in its `cmd` field.
//! Parsing never fails the loop: blank lines are skipped and malformed ones
//! are logged and dropped.

use serde::Deserialize;
use tracing::warn;

use crate::casting::CastRequest;
use crate::world::{CaptureCityDecision, MapCoords3D, PendingMovement, PlayerId, SpellId, SpellTarget, UnitId};

/// A parsed client-to-engine command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Replace the session with one loaded from a scenario file.
    LoadScenario { path: String },

    StartCombat {
        defending_location: MapCoords3D,
        attacking_from: MapCoords3D,
        attacking_units: Vec<UnitId>,
        #[serde(default)]
        defending_units: Option<Vec<UnitId>>,
        #[serde(default)]
        attacker_pending_movement: Option<PendingMovement>,
        #[serde(default)]
        defender_pending_movement: Option<PendingMovement>,
    },

    EndCombat {
        location: MapCoords3D,
        attacking_player: PlayerId,
        #[serde(default)]
        defending_player: Option<PlayerId>,
        winning_player: PlayerId,
        #[serde(default)]
        capture_city_decision: Option<CaptureCityDecision>,
    },

    NextCombatTurn { location: MapCoords3D },

    KillUnit { unit: UnitId },

    CastSpell(CastRequest),

    TargetSpell {
        player: PlayerId,
        spell: SpellId,
        target: SpellTarget,
    },

    ProgressCasting { player: PlayerId },

    StartTurn { player: PlayerId },

    Quit,
}

/// Parses a single line of input into a `Command`.
///
/// A bare `quit` line is accepted alongside `{"cmd":"quit"}`. Returns `None`
/// for empty lines and for lines that are not a valid command.
pub fn parse_command(line: &str) -> Option<Command> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed == "quit" {
        return Some(Command::Quit);
    }
    match serde_json::from_str(trimmed) {
        Ok(cmd) => Some(cmd),
        Err(e) => {
            warn!(error = %e, "malformed command");
            None
        }
    }
}
