//! Messages sent to player connections.
//!
//! The engine never talks to a socket. It appends messages to an `Outbox`
//! after mutating state; delivery is somebody else's job.

use serde::Serialize;

use crate::combat::map::CombatMap;
use crate::world::{
    CaptureCityDecision, CombatAreaEffect, CombatPosition, CombatSide, MapCoords3D,
    MaintainedSpell, PlayerId, SpellId, Unit, UnitId,
};

/// Where one unit stands when a combat starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnitPlacement {
    pub unit_id: UnitId,
    pub position: CombatPosition,
    pub heading: u8,
    pub side: CombatSide,
}

/// A server-to-client message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    CombatStarted {
        location: MapCoords3D,
        map: CombatMap,
        placements: Vec<UnitPlacement>,
    },
    CombatEnded {
        location: MapCoords3D,
        winning_player: PlayerId,
        capture_city_decision: Option<CaptureCityDecision>,
        gold_swiped: Option<u64>,
        gold_from_razing: Option<u64>,
    },
    AskForCaptureCityDecision {
        city_location: MapCoords3D,
        defending_player: Option<PlayerId>,
    },
    OverlandCastQueued {
        spell: SpellId,
    },
    RemoveQueuedSpell {
        index: usize,
    },
    UpdateManaSpentOnCastingCurrentSpell {
        mana_spent: u32,
    },
    SelectNextUnitToMoveOverland,
    /// `placement` is `None` when the unit leaves combat.
    SetUnitIntoOrTakeUnitOutOfCombat {
        unit_id: UnitId,
        placement: Option<UnitPlacement>,
        combat_location: Option<MapCoords3D>,
    },
    /// Client should forget the unit, whether or not it knew about it.
    RemoveUnit {
        unit_id: UnitId,
    },
    UnitAdded {
        unit: Unit,
    },
    SpellCast {
        caster: PlayerId,
        spell: SpellId,
        combat_location: Option<MapCoords3D>,
    },
    MaintainedSpellAdded {
        spell: MaintainedSpell,
    },
    MaintainedSpellRemoved {
        spell: MaintainedSpell,
    },
    CombatAreaEffectAdded {
        effect: CombatAreaEffect,
    },
    CombatAreaEffectRemoved {
        effect: CombatAreaEffect,
    },
    AskForSpellTarget {
        spell: SpellId,
    },
    CityCaptured {
        location: MapCoords3D,
        new_owner: PlayerId,
    },
    CityDestroyed {
        location: MapCoords3D,
    },
    TextPopup {
        text: String,
    },
}

/// A message addressed to one player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub recipient: PlayerId,
    pub message: ServerMessage,
}

/// Messages produced during a session, in emission order.
#[derive(Debug, Default)]
pub struct Outbox {
    entries: Vec<Envelope>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, recipient: PlayerId, message: ServerMessage) {
        self.entries.push(Envelope { recipient, message });
    }

    /// Takes every queued message, leaving the outbox empty.
    pub fn drain(&mut self) -> Vec<Envelope> {
        std::mem::take(&mut self.entries)
    }

    /// Messages addressed to one player, oldest first.
    pub fn for_player(&self, player: PlayerId) -> Vec<&ServerMessage> {
        self.entries
            .iter()
            .filter(|e| e.recipient == player)
            .map(|e| &e.message)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outbox_filters_and_drains() {
        let mut out = Outbox::new();
        out.push(PlayerId(1), ServerMessage::SelectNextUnitToMoveOverland);
        out.push(PlayerId(2), ServerMessage::RemoveQueuedSpell { index: 0 });
        assert_eq!(out.for_player(PlayerId(1)).len(), 1);
        assert_eq!(out.len(), 2);
        let drained = out.drain();
        assert_eq!(drained.len(), 2);
        assert!(out.is_empty());
    }

    #[test]
    fn messages_serialize_with_type_tag() {
        let json = serde_json::to_string(&ServerMessage::OverlandCastQueued {
            spell: SpellId::from("SP007"),
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"overland_cast_queued","spell":"SP007"}"#);
    }
}
