//! Players and their wizard state.
//!
//! Each player carries the casting budget, spell research, fortress location
//! and simultaneous-turn pending movements that combat and casting read.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::coords::MapCoords3D;
use super::ids::{PlayerId, SpellId, UnitId};
use super::spell::Realm;
use crate::casting::budget::CastingBudget;

/// Who controls a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerKind {
    Human,
    Ai,
    Raiders,
    Monsters,
}

impl PlayerKind {
    /// Returns true if a client connection receives messages for this player.
    pub const fn is_human(self) -> bool {
        matches!(self, PlayerKind::Human)
    }

    /// Returns true for raiders and monsters, the players that are not wizards.
    pub const fn is_independent(self) -> bool {
        matches!(self, PlayerKind::Raiders | PlayerKind::Monsters)
    }
}

/// Research state of one spell for one wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResearchStatus {
    Unavailable,
    NotInSpellBook,
    Researchable,
    ResearchableNow,
    Available,
}

/// A unit stack move queued during a simultaneous-turns game.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PendingMovement {
    pub unit_ids: Vec<UnitId>,
    pub from: MapCoords3D,
    pub to: MapCoords3D,
}

/// A participant in the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub kind: PlayerKind,
    #[serde(default)]
    pub gold: u64,
    /// Base casting skill, before picks are applied.
    #[serde(default)]
    pub casting_skill: u32,
    /// Percentage bonus to casting skill from picks.
    #[serde(default)]
    pub casting_skill_bonus_percent: u32,
    /// Per-realm spell cost reduction from picks, in percent.
    #[serde(default)]
    pub cost_reduction_percent: BTreeMap<Realm, u32>,
    /// `None` when the wizard has been banished.
    #[serde(default)]
    pub fortress: Option<MapCoords3D>,
    #[serde(default)]
    pub research: BTreeMap<SpellId, ResearchStatus>,
    #[serde(default)]
    pub budget: CastingBudget,
    /// Overland spells that finished casting and still need a target.
    #[serde(default)]
    pub spells_awaiting_target: Vec<SpellId>,
    #[serde(default)]
    pub pending_movements: Vec<PendingMovement>,
}

impl Player {
    /// Creates a player with no skill, gold, or spells.
    pub fn new(id: PlayerId, name: &str, kind: PlayerKind) -> Self {
        Player {
            id,
            name: name.to_string(),
            kind,
            gold: 0,
            casting_skill: 0,
            casting_skill_bonus_percent: 0,
            cost_reduction_percent: BTreeMap::new(),
            fortress: None,
            research: BTreeMap::new(),
            budget: CastingBudget::default(),
            spells_awaiting_target: Vec::new(),
            pending_movements: Vec::new(),
        }
    }

    /// Casting skill with picks applied. Raiders and monsters never cast.
    pub fn modified_casting_skill(&self) -> u32 {
        if self.kind.is_independent() {
            return 0;
        }
        let bonus = self.casting_skill * self.casting_skill_bonus_percent / 100;
        self.casting_skill + bonus
    }

    /// Returns the research status of a spell, `Unavailable` if unknown.
    pub fn research_status(&self, spell: &SpellId) -> ResearchStatus {
        self.research
            .get(spell)
            .copied()
            .unwrap_or(ResearchStatus::Unavailable)
    }

    /// Removes a pending movement if present. Returns true if one was removed.
    pub fn remove_pending_movement(&mut self, movement: &PendingMovement) -> bool {
        match self.pending_movements.iter().position(|m| m == movement) {
            Some(idx) => {
                self.pending_movements.remove(idx);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modified_skill_applies_bonus() {
        let mut p = Player::new(PlayerId(1), "Merlin", PlayerKind::Human);
        p.casting_skill = 40;
        p.casting_skill_bonus_percent = 10;
        assert_eq!(p.modified_casting_skill(), 44);
    }

    #[test]
    fn independents_have_no_skill() {
        let mut p = Player::new(PlayerId(9), "Monsters", PlayerKind::Monsters);
        p.casting_skill = 40;
        assert_eq!(p.modified_casting_skill(), 0);
        assert!(p.kind.is_independent());
        assert!(!p.kind.is_human());
    }

    #[test]
    fn unknown_spell_is_unavailable() {
        let p = Player::new(PlayerId(1), "Merlin", PlayerKind::Human);
        assert_eq!(p.research_status(&SpellId::from("SP001")), ResearchStatus::Unavailable);
    }

    #[test]
    fn remove_pending_movement_only_matching() {
        let mut p = Player::new(PlayerId(1), "Merlin", PlayerKind::Ai);
        let mv = PendingMovement {
            unit_ids: vec![UnitId(3)],
            from: MapCoords3D::new(1, 1, 0),
            to: MapCoords3D::new(2, 1, 0),
        };
        p.pending_movements.push(mv.clone());
        let other = PendingMovement { to: MapCoords3D::new(0, 0, 0), ..mv.clone() };
        assert!(!p.remove_pending_movement(&other));
        assert!(p.remove_pending_movement(&mv));
        assert!(p.pending_movements.is_empty());
    }
}
