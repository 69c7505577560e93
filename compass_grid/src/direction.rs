// Compass direction encoding.
//
// A direction id is an integer 0..=7 enumerating the eight compass rays
// clockwise from north: 0 = N (0, 1), 1 = NE (1, 1), 2 = E (1, 0), ...,
// 7 = NW (-1, 1). Slot `i` of a neighbor table and slot `(i + 4) % 8` face
// opposite ways.
//
// Two vector forms exist per direction: the raw integer-valued vector (used
// for composing offsets during relation inference) and the unit vector
// (diagonals scaled to length 1, used for matching normalized directions).
//
// Classification back from a vector to an id compares components with an
// epsilon tolerance rather than exact float equality, so offsets built by
// summing several raw vectors never fall through to "invalid" from rounding.
// "Invalid" is `None`; callers that must fail fast use `direction_of`.
//
// Everything here is pure.

use crate::error::GridError;
use crate::types::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_1_SQRT_2, SQRT_2};
use std::fmt;

/// Absolute tolerance for component comparisons during classification.
pub const DIRECTION_EPSILON: f32 = 1e-4;

/// One of the eight compass directions. Always in 0..=7.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Direction(u8);

const RAW_VECTORS: [Vec2; 8] = [
    Vec2::new(0.0, 1.0),   // N
    Vec2::new(1.0, 1.0),   // NE
    Vec2::new(1.0, 0.0),   // E
    Vec2::new(1.0, -1.0),  // SE
    Vec2::new(0.0, -1.0),  // S
    Vec2::new(-1.0, -1.0), // SW
    Vec2::new(-1.0, 0.0),  // W
    Vec2::new(-1.0, 1.0),  // NW
];

const UNIT_VECTORS: [Vec2; 8] = [
    Vec2::new(0.0, 1.0),
    Vec2::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2),
    Vec2::new(1.0, 0.0),
    Vec2::new(FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
    Vec2::new(0.0, -1.0),
    Vec2::new(-FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
    Vec2::new(-1.0, 0.0),
    Vec2::new(-FRAC_1_SQRT_2, FRAC_1_SQRT_2),
];

const NAMES: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

impl Direction {
    pub const NORTH: Self = Self(0);
    pub const NORTH_EAST: Self = Self(1);
    pub const EAST: Self = Self(2);
    pub const SOUTH_EAST: Self = Self(3);
    pub const SOUTH: Self = Self(4);
    pub const SOUTH_WEST: Self = Self(5);
    pub const WEST: Self = Self(6);
    pub const NORTH_WEST: Self = Self(7);

    /// Number of directions (and neighbor slots per cell).
    pub const COUNT: usize = 8;

    /// All directions in slot order, north first, clockwise.
    pub const ALL: [Self; 8] = [
        Self::NORTH,
        Self::NORTH_EAST,
        Self::EAST,
        Self::SOUTH_EAST,
        Self::SOUTH,
        Self::SOUTH_WEST,
        Self::WEST,
        Self::NORTH_WEST,
    ];

    pub fn from_id(id: u8) -> Result<Self, GridError> {
        if (id as usize) < Self::COUNT {
            Ok(Self(id))
        } else {
            Err(GridError::InvalidDirection { id })
        }
    }

    pub fn id(self) -> u8 {
        self.0
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The direction 180° away: `(id + 4) % 8`.
    pub fn opposite(self) -> Self {
        Self((self.0 + 4) % 8)
    }

    /// Raw integer-valued vector, e.g. NE = (1, 1).
    pub fn vector(self) -> Vec2 {
        RAW_VECTORS[self.index()]
    }

    /// Unit-length vector, e.g. NE = (√½, √½).
    pub fn unit_vector(self) -> Vec2 {
        UNIT_VECTORS[self.index()]
    }
}

impl TryFrom<u8> for Direction {
    type Error = GridError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::from_id(id)
    }
}

impl From<Direction> for u8 {
    fn from(d: Direction) -> u8 {
        d.0
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(NAMES[self.index()])
    }
}

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

/// Raw vector for a direction id. Fails for ids outside 0..=7.
pub fn id_to_vector(id: u8) -> Result<Vec2, GridError> {
    Direction::from_id(id).map(Direction::vector)
}

/// Unit vector for a direction id. Fails for ids outside 0..=7.
pub fn id_to_unit_vector(id: u8) -> Result<Vec2, GridError> {
    Direction::from_id(id).map(Direction::unit_vector)
}

/// Classify `v` with the default reach of one cell.
pub fn vector_to_id(v: Vec2) -> Option<Direction> {
    vector_to_id_within(v, 1.0)
}

/// Classify `v` into one of the eight directions.
///
/// Axis-aligned vectors match when their length along the axis is at most
/// `max_magnitude`; diagonal vectors (|x| == |y|) match when their length is
/// at most `√2 · max_magnitude`. Anything else, including the zero vector,
/// is `None`.
pub fn vector_to_id_within(v: Vec2, max_magnitude: f32) -> Option<Direction> {
    let max_linear = max_magnitude.abs() + DIRECTION_EPSILON;
    let max_diagonal = max_magnitude.abs() * SQRT_2 + DIRECTION_EPSILON;

    if near(v.x, 0.0) {
        if v.y > DIRECTION_EPSILON && v.y <= max_linear {
            Some(Direction::NORTH)
        } else if v.y < -DIRECTION_EPSILON && v.y >= -max_linear {
            Some(Direction::SOUTH)
        } else {
            None
        }
    } else if near(v.y, 0.0) {
        if v.x > 0.0 && v.x <= max_linear {
            Some(Direction::EAST)
        } else if v.x < 0.0 && v.x >= -max_linear {
            Some(Direction::WEST)
        } else {
            None
        }
    } else if near(v.x, v.y) && v.magnitude() <= max_diagonal {
        if v.x < 0.0 {
            Some(Direction::SOUTH_WEST)
        } else {
            Some(Direction::NORTH_EAST)
        }
    } else if near(v.x, -v.y) && v.magnitude() <= max_diagonal {
        if v.x > 0.0 {
            Some(Direction::SOUTH_EAST)
        } else {
            Some(Direction::NORTH_WEST)
        }
    } else {
        None
    }
}

/// Classify an already-normalized vector by matching it against the eight
/// unit vectors. Stricter than `vector_to_id`: (1, 1) is not a match, only
/// (√½, √½) is.
pub fn normalized_vector_to_id(v: Vec2) -> Option<Direction> {
    Direction::ALL
        .into_iter()
        .find(|d| v.approx_eq(d.unit_vector(), DIRECTION_EPSILON))
}

/// Like `vector_to_id`, but a vector that matches no direction is a
/// configuration fault.
pub fn direction_of(v: Vec2) -> Result<Direction, GridError> {
    vector_to_id(v).ok_or(GridError::InvalidDirectionVector { x: v.x, y: v.y })
}

fn near(a: f32, b: f32) -> bool {
    (a - b).abs() <= DIRECTION_EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn raw_vectors_round_trip() {
        for id in 0..8u8 {
            let v = id_to_vector(id).unwrap();
            assert_eq!(vector_to_id(v).map(Direction::id), Some(id), "id {id}");
        }
    }

    #[test]
    fn unit_vectors_round_trip() {
        for id in 0..8u8 {
            let v = id_to_unit_vector(id).unwrap();
            assert_eq!(normalized_vector_to_id(v).map(Direction::id), Some(id));
            assert!((v.magnitude() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn opposite_slot_negates_vector() {
        for d in Direction::ALL {
            assert_eq!(d.opposite().vector(), -d.vector());
            assert_eq!(d.opposite().opposite(), d);
        }
        assert_eq!(Direction::NORTH.opposite(), Direction::SOUTH);
        assert_eq!(Direction::NORTH_WEST.opposite(), Direction::SOUTH_EAST);
    }

    #[test]
    fn clockwise_from_north() {
        assert_eq!(Direction::NORTH.vector(), Vec2::new(0.0, 1.0));
        assert_eq!(Direction::NORTH_EAST.vector(), Vec2::new(1.0, 1.0));
        assert_eq!(Direction::EAST.vector(), Vec2::new(1.0, 0.0));
        assert_eq!(Direction::SOUTH_EAST.vector(), Vec2::new(1.0, -1.0));
        assert_eq!(Direction::SOUTH.vector(), Vec2::new(0.0, -1.0));
        assert_eq!(Direction::SOUTH_WEST.vector(), Vec2::new(-1.0, -1.0));
        assert_eq!(Direction::WEST.vector(), Vec2::new(-1.0, 0.0));
        assert_eq!(Direction::NORTH_WEST.vector(), Vec2::new(-1.0, 1.0));
    }

    #[test]
    fn out_of_range_id_is_invalid() {
        assert_eq!(id_to_vector(8), Err(GridError::InvalidDirection { id: 8 }));
        assert_eq!(
            id_to_unit_vector(255),
            Err(GridError::InvalidDirection { id: 255 })
        );
        assert!(Direction::from_id(9).is_err());
    }

    #[test]
    fn misaligned_vector_is_invalid() {
        assert_eq!(vector_to_id(Vec2::new(2.0, 1.0)), None);
        assert_eq!(vector_to_id(Vec2::new(0.5, 0.25)), None);
        assert!(direction_of(Vec2::new(2.0, 1.0)).is_err());
    }

    #[test]
    fn zero_vector_is_invalid() {
        assert_eq!(vector_to_id(Vec2::ZERO), None);
        assert_eq!(normalized_vector_to_id(Vec2::ZERO), None);
    }

    #[test]
    fn magnitude_limit_applies() {
        assert_eq!(vector_to_id(Vec2::new(0.0, 2.0)), None);
        assert_eq!(vector_to_id(Vec2::new(-2.0, -2.0)), None);
        assert_eq!(
            vector_to_id_within(Vec2::new(0.0, 2.0), 2.0),
            Some(Direction::NORTH)
        );
        assert_eq!(
            vector_to_id_within(Vec2::new(-2.0, -2.0), 2.0),
            Some(Direction::SOUTH_WEST)
        );
        // Negative reach is treated as its absolute value.
        assert_eq!(
            vector_to_id_within(Vec2::new(3.0, 0.0), -3.0),
            Some(Direction::EAST)
        );
    }

    #[test]
    fn shorter_than_one_cell_still_matches() {
        assert_eq!(vector_to_id(Vec2::new(0.5, 0.0)), Some(Direction::EAST));
        assert_eq!(
            vector_to_id(Vec2::new(0.5, -0.5)),
            Some(Direction::SOUTH_EAST)
        );
    }

    #[test]
    fn rounding_noise_is_tolerated() {
        let noisy = Vec2::new(0.1 + 0.2 - 0.3, 1.0 + 1e-6);
        assert_eq!(vector_to_id(noisy), Some(Direction::NORTH));

        let diag = Vec2::new(1.0, -1.0).normalized() + Vec2::new(1e-6, 0.0);
        assert_eq!(normalized_vector_to_id(diag), Some(Direction::SOUTH_EAST));
    }

    #[test]
    fn normalized_lookup_rejects_raw_diagonals() {
        assert_eq!(normalized_vector_to_id(Vec2::new(1.0, 1.0)), None);
        assert_eq!(normalized_vector_to_id(Vec2::new(0.0, 0.5)), None);
    }

    #[test]
    fn serde_rejects_out_of_range_ids() {
        let d: Direction = serde_json::from_str("3").unwrap();
        assert_eq!(d, Direction::SOUTH_EAST);
        assert!(serde_json::from_str::<Direction>("8").is_err());
    }

    proptest! {
        #[test]
        fn scaled_directions_classify(id in 0u8..8, t in 0.01f32..=1.0) {
            let d = Direction::from_id(id).unwrap();
            prop_assert_eq!(vector_to_id(d.vector() * t), Some(d));
        }

        #[test]
        fn classified_vectors_point_along_their_ray(x in -3.0f32..3.0, y in -3.0f32..3.0) {
            let v = Vec2::new(x, y);
            prop_assume!(v.magnitude() > 0.1);
            if let Some(d) = vector_to_id(v) {
                prop_assert!(v.normalized().approx_eq(d.unit_vector(), 1e-2));
                prop_assert!(v.magnitude() <= SQRT_2 + 1e-3);
            }
        }
    }
}
