//! Arcanum engine library.
//!
//! Combat lifecycle and spell-casting economy for one turn-based fantasy
//! strategy game session, plus the command protocol used by the binary.

pub mod casting;
pub mod combat;
pub mod config;
pub mod effects;
pub mod engine;
pub mod error;
pub mod messages;
pub mod protocol;
pub mod random;
pub mod services;
pub mod session;
pub mod soak;
pub mod world;

pub use casting::{CastOutcome, CastRequest};
pub use combat::{CombatEndOutcome, CombatResult};
pub use error::{CastRejection, EngineError, TargetRejection};
pub use session::Session;
