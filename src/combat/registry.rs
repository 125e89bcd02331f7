//! Active combats, keyed by location.
//!
//! The registry is the only place combat state lives between calls. Units
//! point at a combat through their placement's location; the registry never
//! holds references back into the unit list.

use std::collections::BTreeMap;

use crate::error::EngineError;
use crate::world::{CombatSide, MapCoords3D, PendingMovement, PlayerId, UnitId};

use super::map::CombatMap;

/// How a combat came about, fixed when it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CombatMode {
    /// No pending movement: a turn-by-turn attack or a walk-in.
    Uncontested,
    /// Only the attacker had a pending simultaneous-turn movement.
    RegularAttack,
    /// Both stacks tried to move through each other.
    BorderConflict,
}

impl CombatMode {
    pub fn from_pending(attacker: Option<&PendingMovement>, defender: Option<&PendingMovement>) -> Self {
        match (attacker, defender) {
            (Some(_), Some(_)) => CombatMode::BorderConflict,
            (Some(_), None) => CombatMode::RegularAttack,
            _ => CombatMode::Uncontested,
        }
    }
}

/// State of one combat in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombatInstance {
    pub location: MapCoords3D,
    pub attacking_from: MapCoords3D,
    pub map: CombatMap,
    pub attacking_player: PlayerId,
    pub defending_player: Option<PlayerId>,
    pub mode: CombatMode,
    pub attacker_pending_movement: Option<PendingMovement>,
    pub defender_pending_movement: Option<PendingMovement>,
    /// Every unit that entered this combat, summons included.
    pub combatants: Vec<UnitId>,
    /// Units summoned into this combat; they vanish when it ends.
    pub summoned_units: Vec<UnitId>,
    /// Surviving attackers, collected at combat end, that will advance.
    pub advancing_units: Vec<UnitId>,
    pub combat_turn: u32,
    pub awaiting_capture_decision: bool,
    casting_skill_remaining: [u32; 2],
    spell_cast_this_turn: [bool; 2],
}

impl CombatInstance {
    pub fn new(
        location: MapCoords3D,
        attacking_from: MapCoords3D,
        map: CombatMap,
        attacking_player: PlayerId,
        defending_player: Option<PlayerId>,
        attacker_pending_movement: Option<PendingMovement>,
        defender_pending_movement: Option<PendingMovement>,
    ) -> Self {
        let mode = CombatMode::from_pending(
            attacker_pending_movement.as_ref(),
            defender_pending_movement.as_ref(),
        );
        CombatInstance {
            location,
            attacking_from,
            map,
            attacking_player,
            defending_player,
            mode,
            attacker_pending_movement,
            defender_pending_movement,
            combatants: Vec::new(),
            summoned_units: Vec::new(),
            advancing_units: Vec::new(),
            combat_turn: 1,
            awaiting_capture_decision: false,
            casting_skill_remaining: [0, 0],
            spell_cast_this_turn: [false, false],
        }
    }

    /// Which side a player fights on, if any.
    pub fn side_of(&self, player: PlayerId) -> Option<CombatSide> {
        if player == self.attacking_player {
            Some(CombatSide::Attacker)
        } else if Some(player) == self.defending_player {
            Some(CombatSide::Defender)
        } else {
            None
        }
    }

    pub fn player_on(&self, side: CombatSide) -> Option<PlayerId> {
        match side {
            CombatSide::Attacker => Some(self.attacking_player),
            CombatSide::Defender => self.defending_player,
        }
    }

    pub fn casting_skill_remaining(&self, side: CombatSide) -> u32 {
        self.casting_skill_remaining[side.index()]
    }

    pub fn set_casting_skill(&mut self, side: CombatSide, skill: u32) {
        self.casting_skill_remaining[side.index()] = skill;
    }

    pub fn spend_casting_skill(&mut self, side: CombatSide, amount: u32) {
        let pool = &mut self.casting_skill_remaining[side.index()];
        *pool = pool.saturating_sub(amount);
    }

    pub fn spell_cast_this_turn(&self, side: CombatSide) -> bool {
        self.spell_cast_this_turn[side.index()]
    }

    pub fn mark_spell_cast(&mut self, side: CombatSide) {
        self.spell_cast_this_turn[side.index()] = true;
    }

    /// Starts the next combat turn, letting both sides cast again.
    pub fn begin_next_turn(&mut self) {
        self.combat_turn += 1;
        self.spell_cast_this_turn = [false, false];
    }

    pub fn is_border_conflict(&self) -> bool {
        self.mode == CombatMode::BorderConflict
    }
}

/// Every combat in progress in one session.
#[derive(Debug, Default)]
pub struct CombatRegistry {
    combats: BTreeMap<MapCoords3D, CombatInstance>,
}

impl CombatRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a combat. A location holds at most one combat.
    pub fn insert(&mut self, combat: CombatInstance) -> Result<(), EngineError> {
        if self.combats.contains_key(&combat.location) {
            return Err(EngineError::CombatAlreadyInProgress(combat.location));
        }
        self.combats.insert(combat.location, combat);
        Ok(())
    }

    pub fn get(&self, location: MapCoords3D) -> Result<&CombatInstance, EngineError> {
        self.combats
            .get(&location)
            .ok_or(EngineError::NoCombatAt(location))
    }

    pub fn get_mut(&mut self, location: MapCoords3D) -> Result<&mut CombatInstance, EngineError> {
        self.combats
            .get_mut(&location)
            .ok_or(EngineError::NoCombatAt(location))
    }

    pub fn remove(&mut self, location: MapCoords3D) -> Result<CombatInstance, EngineError> {
        self.combats
            .remove(&location)
            .ok_or(EngineError::NoCombatAt(location))
    }

    pub fn contains(&self, location: MapCoords3D) -> bool {
        self.combats.contains_key(&location)
    }

    pub fn len(&self) -> usize {
        self.combats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combats.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CombatInstance> {
        self.combats.values()
    }
}
