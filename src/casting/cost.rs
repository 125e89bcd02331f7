//! Spell cost calculations.
//!
//! Reduced costs come from the caster's per-realm picks. In combat, mana is
//! further scaled by a range penalty measured from the caster's fortress.
//! Penalties are kept doubled so that half-cost and one-and-a-half cost stay
//! integers.

use crate::config::{CastingConfig, OverlandMapConfig};
use crate::world::{MapCoords3D, Player, SpellDefinition};

/// Applies the caster's realm cost reduction to a base cost.
pub fn reduced_cost(base: u32, spell: &SpellDefinition, caster: &Player, config: &CastingConfig) -> u32 {
    let pct = caster
        .cost_reduction_percent
        .get(&spell.realm)
        .copied()
        .unwrap_or(0)
        .min(config.max_cost_reduction_percent);
    base - base * pct / 100
}

/// Reduced overland cost, or `None` if the spell cannot be cast overland.
pub fn reduced_overland_cost(spell: &SpellDefinition, caster: &Player, config: &CastingConfig) -> Option<u32> {
    spell
        .overland_cost
        .map(|base| reduced_cost(base, spell, caster, config))
}

/// Reduced combat cost, or `None` if the spell cannot be cast in combat.
pub fn reduced_combat_cost(spell: &SpellDefinition, caster: &Player, config: &CastingConfig) -> Option<u32> {
    spell
        .combat_cost
        .map(|base| reduced_cost(base, spell, caster, config))
}

/// Straight-line distance between two cells, wrapping horizontally if the
/// map does. Returned squared to stay in integers.
pub fn distance_sq(a: MapCoords3D, b: MapCoords3D, map: &OverlandMapConfig) -> u32 {
    let mut dx = (a.x - b.x).unsigned_abs();
    if map.wrap_x {
        let width = map.width.unsigned_abs();
        dx = dx.min(width.saturating_sub(dx));
    }
    let dy = (a.y - b.y).unsigned_abs();
    dx * dx + dy * dy
}

/// Doubled casting cost multiplier for a combat at `combat_location`.
///
/// Returns `None` when the caster has no fortress to channel through.
pub fn doubled_range_penalty(
    caster: &Player,
    combat_location: MapCoords3D,
    casting: &CastingConfig,
    map: &OverlandMapConfig,
) -> Option<u32> {
    let fortress = caster.fortress?;
    if fortress == combat_location {
        return Some(casting.at_fortress_penalty);
    }
    if fortress.plane != combat_location.plane {
        return Some(casting.other_plane_penalty);
    }
    let d2 = distance_sq(fortress, combat_location, map);
    let penalty = casting
        .range_bands
        .iter()
        .find(|band| d2 <= band.max_distance * band.max_distance)
        .map_or(casting.beyond_range_penalty, |band| band.doubled_penalty);
    Some(penalty)
}

/// Mana charged for a combat cast once the range penalty is applied.
pub fn combat_mana_cost(reduced: u32, doubled_penalty: u32) -> u32 {
    reduced * doubled_penalty / 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{PlayerId, PlayerKind, Realm, SpellId, SpellKind, TargetAudience};

    fn spell(realm: Realm) -> SpellDefinition {
        SpellDefinition {
            id: SpellId::from("SP001"),
            name: "Test".to_string(),
            realm,
            kind: SpellKind::CombatEnchantment,
            overland_cost: None,
            combat_cost: Some(20),
            targets: TargetAudience::Own,
            combat_area_effects: Vec::new(),
            unit_effects: Vec::new(),
            summoned_units: Vec::new(),
        }
    }

    fn wizard(fortress: Option<MapCoords3D>) -> Player {
        let mut p = Player::new(PlayerId(1), "Merlin", PlayerKind::Human);
        p.fortress = fortress;
        p
    }

    #[test]
    fn reduction_is_per_realm_and_capped() {
        let mut p = wizard(None);
        p.cost_reduction_percent.insert(Realm::Life, 25);
        p.cost_reduction_percent.insert(Realm::Chaos, 80);
        let cfg = CastingConfig::default();
        assert_eq!(reduced_cost(20, &spell(Realm::Life), &p, &cfg), 15);
        assert_eq!(reduced_cost(20, &spell(Realm::Chaos), &p, &cfg), 10);
        assert_eq!(reduced_cost(20, &spell(Realm::Death), &p, &cfg), 20);
        assert_eq!(reduced_combat_cost(&spell(Realm::Life), &p, &cfg), Some(15));
        assert_eq!(reduced_overland_cost(&spell(Realm::Life), &p, &cfg), None);
    }

    #[test]
    fn banished_has_no_penalty() {
        let p = wizard(None);
        let pen = doubled_range_penalty(
            &p,
            MapCoords3D::new(1, 1, 0),
            &CastingConfig::default(),
            &OverlandMapConfig::default(),
        );
        assert_eq!(pen, None);
    }

    #[test]
    fn penalty_bands() {
        let home = MapCoords3D::new(10, 10, 0);
        let p = wizard(Some(home));
        let c = CastingConfig::default();
        let m = OverlandMapConfig::default();
        assert_eq!(doubled_range_penalty(&p, home, &c, &m), Some(1));
        assert_eq!(doubled_range_penalty(&p, MapCoords3D::new(13, 14, 0), &c, &m), Some(2));
        assert_eq!(doubled_range_penalty(&p, MapCoords3D::new(18, 10, 0), &c, &m), Some(3));
        assert_eq!(doubled_range_penalty(&p, MapCoords3D::new(10, 35, 0), &c, &m), Some(6));
        assert_eq!(doubled_range_penalty(&p, MapCoords3D::new(10, 10, 1), &c, &m), Some(6));
    }

    #[test]
    fn distance_wraps_horizontally() {
        let m = OverlandMapConfig::default();
        let d = distance_sq(MapCoords3D::new(1, 0, 0), MapCoords3D::new(59, 0, 0), &m);
        assert_eq!(d, 4);
        let flat = OverlandMapConfig { wrap_x: false, ..OverlandMapConfig::default() };
        assert_eq!(distance_sq(MapCoords3D::new(1, 0, 0), MapCoords3D::new(59, 0, 0), &flat), 58 * 58);
    }

    #[test]
    fn mana_cost_scales_by_half_steps() {
        assert_eq!(combat_mana_cost(20, 1), 10);
        assert_eq!(combat_mana_cost(20, 2), 20);
        assert_eq!(combat_mana_cost(20, 3), 30);
        assert_eq!(combat_mana_cost(15, 3), 22);
    }
}
