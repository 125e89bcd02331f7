//! Map and battlefield coordinates.
//!
//! Overland locations are three-dimensional (x, y, plane); battlefield cells
//! are plain (x, y) pairs on the combat grid.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A cell on the overland map, including which plane it is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MapCoords3D {
    pub x: i32,
    pub y: i32,
    pub plane: u8,
}

impl MapCoords3D {
    /// Creates overland coordinates.
    pub const fn new(x: i32, y: i32, plane: u8) -> Self {
        Self { x, y, plane }
    }

    /// Returns the same x/y on a different plane.
    pub const fn on_plane(self, plane: u8) -> Self {
        Self { x: self.x, y: self.y, plane }
    }
}

impl fmt::Display for MapCoords3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.plane)
    }
}

/// A cell on the combat grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CombatPosition {
    pub x: i32,
    pub y: i32,
}

impl CombatPosition {
    /// Creates a combat grid position.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Squared euclidean distance to another cell.
    pub fn distance_sq(self, other: CombatPosition) -> i32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

impl fmt::Display for CombatPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn on_plane_keeps_xy() {
        let c = MapCoords3D::new(20, 10, 1);
        assert_eq!(c.on_plane(0), MapCoords3D::new(20, 10, 0));
    }

    #[test]
    fn coords_order_by_x_then_y_then_plane() {
        let a = MapCoords3D::new(1, 5, 1);
        let b = MapCoords3D::new(2, 0, 0);
        assert!(a < b);
    }

    #[test]
    fn combat_distance() {
        let a = CombatPosition::new(3, 4);
        assert_eq!(a.distance_sq(CombatPosition::new(0, 0)), 25);
        assert_eq!(a.distance_sq(a), 0);
    }
}
