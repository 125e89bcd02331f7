//! The spell-casting economy.
//!
//! A cast request is either overland, where it is cast at once or queued
//! against future turns' skill, or aimed at a combat, where it must be paid
//! for in full immediately. Player mistakes come back as a
//! [`CastOutcome::Rejected`] and a text message; only broken invariants are
//! `Err`.

pub mod budget;
pub mod combat;
pub mod cost;
pub mod overland;
pub mod validate;

use serde::Deserialize;
use tracing::debug;

use crate::error::{CastRejection, EngineError};
use crate::services::SessionServices;
use crate::session::Session;
use crate::world::{CombatPosition, MapCoords3D, PlayerId, SpellId, UnitId};

pub use budget::{CastingBudget, QueueStep};
pub use validate::CombatCharge;

/// A player's request to cast a spell.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CastRequest {
    pub player: PlayerId,
    pub spell: SpellId,
    /// Set when casting into the combat at this location.
    #[serde(default)]
    pub combat_location: Option<MapCoords3D>,
    #[serde(default)]
    pub target_unit: Option<UnitId>,
    #[serde(default)]
    pub target_cell: Option<CombatPosition>,
}

impl CastRequest {
    /// An overland request with no target.
    pub fn overland(player: PlayerId, spell: impl Into<SpellId>) -> Self {
        CastRequest {
            player,
            spell: spell.into(),
            combat_location: None,
            target_unit: None,
            target_cell: None,
        }
    }

    /// A request aimed at the combat at `location`.
    pub fn in_combat(player: PlayerId, spell: impl Into<SpellId>, location: MapCoords3D) -> Self {
        CastRequest {
            combat_location: Some(location),
            ..Self::overland(player, spell)
        }
    }

    pub fn at_unit(mut self, unit: UnitId) -> Self {
        self.target_unit = Some(unit);
        self
    }

    pub fn at_cell(mut self, cell: CombatPosition) -> Self {
        self.target_cell = Some(cell);
        self
    }

    fn has_target(&self) -> bool {
        self.target_unit.is_some() || self.target_cell.is_some()
    }
}

/// What became of a cast request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CastOutcome {
    /// Paid for and resolved, or waiting for an overland target.
    CastNow,
    /// Added to the overland queue; nothing was charged.
    Queued,
    /// Negated by counter-magic; nothing was charged.
    Countered,
    /// Refused; the caster was told why.
    Rejected(CastRejection),
}

impl<S: SessionServices> Session<S> {
    /// Entry point for every cast request.
    pub fn request_cast_spell(&mut self, request: &CastRequest) -> Result<CastOutcome, EngineError> {
        match request.combat_location {
            Some(location) => self.cast_in_combat(request, location),
            None => self.cast_overland(request),
        }
    }

    /// Drops a request, telling the caster why.
    pub(crate) fn reject_cast(&mut self, player: PlayerId, spell: &SpellId, rejection: CastRejection) -> CastOutcome {
        debug!(%player, %spell, reason = %rejection, "cast rejected");
        self.send_text(player, rejection.to_string());
        CastOutcome::Rejected(rejection)
    }
}
