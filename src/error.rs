//! Error types.
//!
//! `EngineError` is a hard failure: the caller broke an invariant and the
//! request is aborted. `CastRejection` is a player mistake: its message is
//! sent back to the player as text and the request is dropped.

use crate::world::{MapCoords3D, PlayerId, SpellId, UnitId, UnitTypeId};

/// Invariant violations and lookups that must never fail for a correct caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("cannot start a combat with no attacking units")]
    NoAttackingUnits,

    #[error("a combat is already in progress at {0}")]
    CombatAlreadyInProgress(MapCoords3D),

    #[error("no combat is in progress at {0}")]
    NoCombatAt(MapCoords3D),

    #[error("{0} is already fighting in a combat")]
    UnitAlreadyInCombat(UnitId),

    #[error("{unit} cannot join combat: {reason}")]
    InvalidCombatant { unit: UnitId, reason: &'static str },

    #[error("{winner} is not a side in the combat at {location}")]
    WinnerNotInCombat { winner: PlayerId, location: MapCoords3D },

    #[error("no free cell on the battlefield at {0}")]
    BattlefieldFull(MapCoords3D),

    #[error("unknown {0}")]
    UnknownPlayer(PlayerId),

    #[error("unknown {0}")]
    UnknownUnit(UnitId),

    #[error("unknown spell '{0}'")]
    UnknownSpell(SpellId),

    #[error("unknown unit type '{0}'")]
    UnknownUnitType(UnitTypeId),
}

/// Why a unit cannot be targeted by a spell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TargetRejection {
    #[error("the unit is not alive")]
    NotAlive,

    #[error("the unit is not in this combat")]
    NotInCombat,

    #[error("the spell can only be cast on your own units")]
    NotOwnUnit,

    #[error("the spell can only be cast on enemy units")]
    NotEnemyUnit,

    #[error("the unit already has every effect this spell can grant")]
    AlreadyHasAllEffects,

    #[error("the unit cannot be seen")]
    Invisible,
}

/// Player-facing reasons a cast request was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CastRejection {
    #[error("You have not researched that spell yet.")]
    NotResearched,

    #[error("That spell cannot be cast overland.")]
    NotCastableOverland,

    #[error("That spell cannot be cast in combat.")]
    NotCastableInCombat,

    #[error("You are not participating in that combat.")]
    NotInCombat,

    #[error("You have already cast a spell this combat turn.")]
    AlreadyCastThisCombatTurn,

    #[error("You cannot cast spells in combat while banished.")]
    Banished,

    #[error("You don't have enough casting skill remaining to cast that spell in combat.")]
    InsufficientCombatSkill,

    #[error("You don't have enough mana remaining to cast that spell in combat at this range.")]
    InsufficientMana,

    #[error("You cannot choose a target for this kind of spell.")]
    TargetNotAllowed,

    #[error("You must choose a unit to cast this spell on.")]
    MissingTargetUnit,

    #[error("You must choose a location to cast this spell at.")]
    MissingTargetCell,

    #[error("This unit is not a valid target for this spell, reason: {0}")]
    InvalidTarget(TargetRejection),

    #[error("There is already a unit at that location.")]
    CellOccupied,

    #[error("That location is outside the battlefield.")]
    OffBattlefield,

    #[error("That location is impassable.")]
    CellImpassable,

    #[error("You already have the maximum number of units in this combat.")]
    TooManyCombatants,

    #[error("Every effect this spell can grant is already active here.")]
    NoEffectsLeft,

    #[error("You already have that enchantment in effect.")]
    AlreadyActive,

    #[error("That spell is not waiting for a target.")]
    NotAwaitingTarget,

    #[error("There is no room to summon that unit.")]
    NoRoomToSummon,
}
