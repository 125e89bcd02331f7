//! World representation and static rules.
//!
//! Contains the players, units, cities, active spell effects and the
//! ruleset definitions that combat and casting operate on.

pub mod city;
pub mod coords;
pub mod effects;
pub mod ids;
pub mod player;
pub mod ruleset;
pub mod spell;
pub mod state;
pub mod unit;

pub use city::{CaptureCityDecision, City, FeatureAt, MapFeature};
pub use coords::{CombatPosition, MapCoords3D};
pub use effects::{CombatAreaEffect, MaintainedSpell, SpellTarget};
pub use ids::{PlayerId, SpellId, UnitId, UnitTypeId};
pub use player::{PendingMovement, Player, PlayerKind, ResearchStatus};
pub use ruleset::{BuildingDef, Ruleset, UnitTypeDef};
pub use spell::{Realm, SpellDefinition, SpellKind, TargetAudience};
pub use state::World;
pub use unit::{CombatPlacement, CombatSide, Unit, UnitStatus};
