// Core types shared across the grid.
//
// Defines the cell handle (`CellId`) and the small vector types used for
// compass directions (`Vec2`) and world positions (`Vec3`). The compass
// plane maps onto world XZ: a direction `(x, y)` moves a cell along world X
// and Z, and world Y is "up".

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

// ---------------------------------------------------------------------------
// Cell handle
// ---------------------------------------------------------------------------

/// Compact identifier for a cell: its index in `CellGrid`'s cell arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(pub u32);

impl CellId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CellId({})", self.0)
    }
}

// ---------------------------------------------------------------------------
// Vectors
// ---------------------------------------------------------------------------

/// A 2D vector on the compass plane. +y is north, +x is east.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn magnitude(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Unit-length copy. The zero vector stays zero.
    pub fn normalized(self) -> Self {
        let m = self.magnitude();
        if m == 0.0 {
            self
        } else {
            Self::new(self.x / m, self.y / m)
        }
    }

    /// Component-wise comparison within `epsilon`.
    pub fn approx_eq(self, other: Self, epsilon: f32) -> bool {
        (self.x - other.x).abs() <= epsilon && (self.y - other.y).abs() <= epsilon
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Vec2 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A world-space position or scale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Offset of one step along compass `direction` for a cell of size
    /// `scale`. Compass x maps to world x, compass y to world z; world y is
    /// untouched.
    pub fn compass_step(direction: Vec2, scale: Vec3) -> Self {
        Self::new(scale.x * direction.x, 0.0, scale.z * direction.y)
    }
}

impl Add for Vec3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_1_SQRT_2;

    #[test]
    fn normalized_diagonal_has_unit_length() {
        let v = Vec2::new(1.0, -1.0).normalized();
        assert!((v.magnitude() - 1.0).abs() < 1e-6);
        assert!(v.approx_eq(Vec2::new(FRAC_1_SQRT_2, -FRAC_1_SQRT_2), 1e-6));
    }

    #[test]
    fn normalized_zero_stays_zero() {
        assert_eq!(Vec2::ZERO.normalized(), Vec2::ZERO);
    }

    #[test]
    fn compass_step_maps_onto_xz() {
        let step = Vec3::compass_step(Vec2::new(1.0, -1.0), Vec3::new(2.0, 5.0, 3.0));
        assert_eq!(step, Vec3::new(2.0, 0.0, -3.0));
    }

    #[test]
    fn cell_id_display() {
        assert_eq!(CellId(4).to_string(), "CellId(4)");
    }
}
