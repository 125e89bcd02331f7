//! Battlefield generation.
//!
//! A fresh grid is generated for every combat. Formation cells of both
//! sides are kept clear so initial placement never lands on a rock.

use serde::Serialize;

use crate::config::CombatConfig;
use crate::random::RandomSource;
use crate::world::CombatPosition;

/// Terrain of one battlefield cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatTile {
    Grass,
    Rough,
    CityGround,
    /// Impassable.
    Rock,
}

impl CombatTile {
    pub const fn is_passable(self) -> bool {
        !matches!(self, CombatTile::Rock)
    }
}

/// Generated battlefield, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombatMap {
    pub width: i32,
    pub height: i32,
    pub tiles: Vec<CombatTile>,
}

impl CombatMap {
    /// A battlefield of plain grass.
    pub fn open(width: i32, height: i32) -> Self {
        let cells = (width.max(0) * height.max(0)) as usize;
        CombatMap {
            width,
            height,
            tiles: vec![CombatTile::Grass; cells],
        }
    }

    /// Generates a battlefield. Cities get paved ground around the
    /// defender's anchor; rocks are scattered away from both formations.
    pub fn generate(config: &CombatConfig, has_city: bool, rng: &mut dyn RandomSource) -> Self {
        let mut map = CombatMap::open(config.map_width, config.map_height);
        let cells = map.tiles.len();
        if cells == 0 {
            return map;
        }

        let reserved = formation_cells(config);

        if has_city {
            for dy in -2..=2 {
                for dx in -2..=2 {
                    let pos = CombatPosition::new(
                        config.defender_anchor.x + dx,
                        config.defender_anchor.y + dy,
                    );
                    map.set(pos, CombatTile::CityGround);
                }
            }
        }

        for _ in 0..config.obstacle_count {
            let idx = rng.next_index(cells);
            if map.tiles[idx] == CombatTile::Grass {
                map.tiles[idx] = CombatTile::Rough;
            }
        }

        let mut placed = 0;
        let mut attempts = 0;
        while placed < config.obstacle_count && attempts < config.obstacle_count * 8 {
            attempts += 1;
            let idx = rng.next_index(cells);
            let pos = map.position_of(idx);
            if reserved.contains(&pos) || !map.tiles[idx].is_passable() {
                continue;
            }
            if map.tiles[idx] == CombatTile::CityGround {
                continue;
            }
            map.tiles[idx] = CombatTile::Rock;
            placed += 1;
        }

        map
    }

    pub fn in_bounds(&self, pos: CombatPosition) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    /// Tile at a cell, `None` off the grid.
    pub fn tile(&self, pos: CombatPosition) -> Option<CombatTile> {
        if !self.in_bounds(pos) {
            return None;
        }
        self.tiles.get((pos.y * self.width + pos.x) as usize).copied()
    }

    /// Returns true for on-grid cells a unit can stand on.
    pub fn is_passable(&self, pos: CombatPosition) -> bool {
        self.tile(pos).is_some_and(CombatTile::is_passable)
    }

    pub fn set(&mut self, pos: CombatPosition, tile: CombatTile) {
        if self.in_bounds(pos) {
            let idx = (pos.y * self.width + pos.x) as usize;
            self.tiles[idx] = tile;
        }
    }

    fn position_of(&self, idx: usize) -> CombatPosition {
        let idx = idx as i32;
        CombatPosition::new(idx % self.width, idx / self.width)
    }

    /// Closest passable cell to `target` for which `occupied` is false.
    /// Ties break towards lower y, then lower x.
    pub fn nearest_free(
        &self,
        target: CombatPosition,
        occupied: impl Fn(CombatPosition) -> bool,
    ) -> Option<CombatPosition> {
        (0..self.tiles.len())
            .map(|idx| self.position_of(idx))
            .filter(|&pos| self.is_passable(pos) && !occupied(pos))
            .min_by_key(|&pos| (pos.distance_sq(target), pos.y, pos.x))
    }
}

/// Every cell either side's formation can occupy at combat start.
pub fn formation_cells(config: &CombatConfig) -> Vec<CombatPosition> {
    let mut cells = Vec::with_capacity(config.formation.len() * 2);
    for offset in &config.formation {
        cells.push(CombatPosition::new(
            config.attacker_anchor.x + offset.x,
            config.attacker_anchor.y + offset.y * config.attacker_row_step,
        ));
        cells.push(CombatPosition::new(
            config.defender_anchor.x + offset.x,
            config.defender_anchor.y + offset.y * config.defender_row_step,
        ));
    }
    cells
}
