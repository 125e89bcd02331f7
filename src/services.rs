//! Collaborators outside the combat and casting core.
//!
//! Fog of war, production totals, city unrest and counter-magic belong to
//! other subsystems. The engine calls them through `SessionServices`.

use crate::world::{MapCoords3D, PlayerId, SpellDefinition, World};

/// Result of giving the opposing side a chance to counter a spell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterOutcome {
    /// The cast goes ahead.
    Proceeds,
    /// Counter-magic negated the cast.
    Countered,
}

/// Services the engine invokes without owning their internals.
pub trait SessionServices: Send {
    /// Whether a player can currently perceive the given location.
    fn can_see(&self, world: &World, player: PlayerId, location: MapCoords3D) -> bool {
        let _ = (world, player, location);
        true
    }

    /// Recompute and push fog of war for one player.
    fn update_fog_of_war(&mut self, world: &World, player: PlayerId) {
        let _ = (world, player);
    }

    /// Recalculate a player's global production values.
    fn recalculate_production(&mut self, world: &World, player: PlayerId) {
        let _ = (world, player);
    }

    /// Rebel count for a city under its current owner.
    fn recalculate_rebels(&mut self, world: &World, city: MapCoords3D) -> u32 {
        let _ = (world, city);
        0
    }

    /// Gives nodes and the opposing wizard's counter-magic a chance to
    /// negate a combat spell. May charge the opponent for the attempt.
    fn process_countering(
        &mut self,
        world: &mut World,
        caster: PlayerId,
        spell: &SpellDefinition,
        combat_location: MapCoords3D,
    ) -> CounterOutcome {
        let _ = (world, caster, spell, combat_location);
        CounterOutcome::Proceeds
    }
}

/// Services that do nothing; every location is visible and nothing counters.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopServices;

impl SessionServices for NoopServices {}

/// A call made to `RecordingServices`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceCall {
    FogOfWar(PlayerId),
    Production(PlayerId),
    Rebels(MapCoords3D),
    Countering(PlayerId),
}

/// Test double that records calls and returns scripted answers.
#[derive(Debug, Clone)]
pub struct RecordingServices {
    pub calls: Vec<ServiceCall>,
    pub counter_outcome: CounterOutcome,
    pub rebels: u32,
    /// Players that cannot see anything.
    pub blind: Vec<PlayerId>,
}

impl Default for RecordingServices {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            counter_outcome: CounterOutcome::Proceeds,
            rebels: 0,
            blind: Vec::new(),
        }
    }
}

impl SessionServices for RecordingServices {
    fn can_see(&self, _world: &World, player: PlayerId, _location: MapCoords3D) -> bool {
        !self.blind.contains(&player)
    }

    fn update_fog_of_war(&mut self, _world: &World, player: PlayerId) {
        self.calls.push(ServiceCall::FogOfWar(player));
    }

    fn recalculate_production(&mut self, _world: &World, player: PlayerId) {
        self.calls.push(ServiceCall::Production(player));
    }

    fn recalculate_rebels(&mut self, _world: &World, city: MapCoords3D) -> u32 {
        self.calls.push(ServiceCall::Rebels(city));
        self.rebels
    }

    fn process_countering(
        &mut self,
        _world: &mut World,
        caster: PlayerId,
        _spell: &SpellDefinition,
        _combat_location: MapCoords3D,
    ) -> CounterOutcome {
        self.calls.push(ServiceCall::Countering(caster));
        self.counter_outcome
    }
}
