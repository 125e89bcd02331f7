//! Session state and message routing.
//!
//! A `Session` owns everything one game needs between calls: the world, the
//! combat registry, configuration, the injected random source, collaborator
//! services and the outbox. Combat and casting operations are implemented
//! as `impl Session` blocks in their own modules.

use crate::combat::registry::CombatRegistry;
use crate::config::{SessionConfig, TurnSystem};
use crate::messages::{Outbox, ServerMessage};
use crate::random::RandomSource;
use crate::services::{NoopServices, SessionServices};
use crate::world::{MapCoords3D, PlayerId, Ruleset, World};

/// Whose overland turn it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TurnState {
    pub turn_number: u32,
    /// `None` in simultaneous turns, where everyone moves at once.
    pub current_player: Option<PlayerId>,
}

/// One game session. Sessions share nothing and can run on separate threads.
pub struct Session<S: SessionServices = NoopServices> {
    pub world: World,
    pub ruleset: Ruleset,
    pub config: SessionConfig,
    pub combats: CombatRegistry,
    pub turn: TurnState,
    pub outbox: Outbox,
    pub services: S,
    pub(crate) rng: Box<dyn RandomSource>,
}

impl<S: SessionServices> Session<S> {
    pub fn new(
        world: World,
        ruleset: Ruleset,
        config: SessionConfig,
        rng: Box<dyn RandomSource>,
        services: S,
    ) -> Self {
        Session {
            world,
            ruleset,
            config,
            combats: CombatRegistry::new(),
            turn: TurnState::default(),
            outbox: Outbox::new(),
            services,
            rng,
        }
    }

    /// Replaces the random source, for tests that script picks mid-session.
    pub fn set_random(&mut self, rng: Box<dyn RandomSource>) {
        self.rng = rng;
    }

    /// Returns true if it is this player's turn in a one-at-a-time game.
    pub fn is_players_turn(&self, player: PlayerId) -> bool {
        self.config.turn_system == TurnSystem::OneAtATime && self.turn.current_player == Some(player)
    }

    /// Sends a message to a player if they have a client connection.
    pub(crate) fn send(&mut self, player: PlayerId, message: ServerMessage) {
        if self.world.is_human(player) {
            self.outbox.push(player, message);
        }
    }

    /// Sends a player-facing text message.
    pub(crate) fn send_text(&mut self, player: PlayerId, text: String) {
        self.send(player, ServerMessage::TextPopup { text });
    }

    /// Sends a message to every human player who can see the location.
    pub(crate) fn send_to_observers(&mut self, location: MapCoords3D, message: ServerMessage) {
        let recipients: Vec<PlayerId> = self
            .world
            .players
            .iter()
            .filter(|p| p.kind.is_human())
            .map(|p| p.id)
            .filter(|&id| self.services.can_see(&self.world, id, location))
            .collect();
        for id in recipients {
            self.outbox.push(id, message.clone());
        }
    }

    /// Fog of war then production totals for one player.
    pub(crate) fn refresh_player_views(&mut self, player: PlayerId) {
        self.services.update_fog_of_war(&self.world, player);
        self.services.recalculate_production(&self.world, player);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedRandom;
    use crate::services::RecordingServices;
    use crate::world::{Player, PlayerKind};

    fn session() -> Session<RecordingServices> {
        let mut world = World::default();
        world.players.push(Player::new(PlayerId(1), "Merlin", PlayerKind::Human));
        world.players.push(Player::new(PlayerId(2), "Sss'ra", PlayerKind::Ai));
        world.players.push(Player::new(PlayerId(3), "Horus", PlayerKind::Human));
        Session::new(
            world,
            Ruleset::default(),
            SessionConfig::default(),
            Box::new(ScriptedRandom::default()),
            RecordingServices::default(),
        )
    }

    #[test]
    fn send_skips_non_humans() {
        let mut s = session();
        s.send(PlayerId(2), ServerMessage::SelectNextUnitToMoveOverland);
        assert!(s.outbox.is_empty());
        s.send(PlayerId(1), ServerMessage::SelectNextUnitToMoveOverland);
        assert_eq!(s.outbox.len(), 1);
    }

    #[test]
    fn observers_respect_visibility() {
        let mut s = session();
        s.services.blind.push(PlayerId(3));
        s.send_to_observers(MapCoords3D::new(1, 1, 0), ServerMessage::SelectNextUnitToMoveOverland);
        assert_eq!(s.outbox.for_player(PlayerId(1)).len(), 1);
        assert!(s.outbox.for_player(PlayerId(3)).is_empty());
    }

    #[test]
    fn players_turn_only_in_one_at_a_time() {
        let mut s = session();
        s.turn.current_player = Some(PlayerId(1));
        assert!(s.is_players_turn(PlayerId(1)));
        s.config.turn_system = TurnSystem::Simultaneous;
        assert!(!s.is_players_turn(PlayerId(1)));
    }
}
