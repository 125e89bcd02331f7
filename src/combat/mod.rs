//! Combat lifecycle.
//!
//! Starting combats, placing units, turn bookkeeping, and ending combats
//! with their capture, raze and advance consequences.

pub mod end;
pub mod map;
pub mod placement;
pub mod registry;
pub mod start;
pub mod turn;

pub use end::{advance_destination, gold_from_razing, gold_swiped, CombatEndOutcome, CombatResult};
pub use map::{CombatMap, CombatTile};
pub use registry::{CombatInstance, CombatMode, CombatRegistry};
