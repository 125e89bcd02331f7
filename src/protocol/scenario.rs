//! Scenario files.
//!
//! A scenario is one JSON document holding the session configuration, the
//! ruleset and the starting world. Missing sections take their defaults.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::config::SessionConfig;
use crate::random::RandomSource;
use crate::services::SessionServices;
use crate::session::Session;
use crate::world::{PlayerId, Ruleset, World};

/// Errors that can occur when loading a scenario.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("cannot read scenario file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid scenario JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("scenario lists player {0} more than once")]
    DuplicatePlayer(PlayerId),

    #[error("unit {unit} belongs to unknown player {owner}")]
    UnknownOwner { unit: u32, owner: PlayerId },
}

/// Everything needed to start a session.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub config: SessionConfig,
    pub ruleset: Ruleset,
    pub world: World,
    /// Whose turn it is in a one-at-a-time game.
    pub current_player: Option<PlayerId>,
}

impl Scenario {
    /// Parses and checks a scenario document.
    pub fn parse(text: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = serde_json::from_str(text)?;
        scenario.check()?;
        Ok(scenario)
    }

    /// Reads and parses a scenario file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    fn check(&self) -> Result<(), ScenarioError> {
        let players = &self.world.players;
        for (i, p) in players.iter().enumerate() {
            if players[..i].iter().any(|q| q.id == p.id) {
                return Err(ScenarioError::DuplicatePlayer(p.id));
            }
        }
        for unit in &self.world.units {
            if !players.iter().any(|p| p.id == unit.owner) {
                return Err(ScenarioError::UnknownOwner { unit: unit.id.0, owner: unit.owner });
            }
        }
        Ok(())
    }

    /// Builds a session from this scenario.
    pub fn into_session<S: SessionServices>(self, rng: Box<dyn RandomSource>, services: S) -> Session<S> {
        let mut session = Session::new(self.world, self.ruleset, self.config, rng, services);
        session.turn.current_player = self.current_player;
        session
    }
}
