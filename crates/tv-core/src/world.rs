//! Tile-quantized world coordinates.
//!
//! The world is partitioned into square tiles of [`TILE_SIZE`] metres.  A
//! [`WorldLocation`] is a tile index pair plus an `f32` offset inside that
//! tile, which keeps single-precision offsets small no matter how far from
//! the origin the point lies.
//!
//! Offsets are not forced into the tile: intermediate arithmetic may leave a
//! location "off-tile", and [`WorldLocation::normalize`] is an explicit
//! operation.  Whenever two locations may live on different tiles, compare
//! them through [`WorldLocation::normalized_to`] or the distance helpers,
//! never by subtracting raw offsets.
//!
//! Tile deltas are applied in `f64` and only the result is rounded back to
//! `f32`, so `distance_squared(a, b) == distance_squared(b, a)` bit for bit.

use std::f32::consts::PI;
use std::fmt;

/// Edge length of one tile in metres.
pub const TILE_SIZE: f32 = 2048.0;

const HALF_TILE: f32 = TILE_SIZE / 2.0;

/// A point in the world: tile indices plus an in-tile offset in metres.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldLocation {
    pub tile_x: i32,
    pub tile_z: i32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl WorldLocation {
    #[inline]
    pub fn new(tile_x: i32, tile_z: i32, x: f32, y: f32, z: f32) -> Self {
        Self { tile_x, tile_z, x, y, z }
    }

    /// Express the same physical point relative to tile `(tile_x, tile_z)`.
    pub fn normalized_to(self, tile_x: i32, tile_z: i32) -> Self {
        let dx = f64::from(self.tile_x - tile_x) * f64::from(TILE_SIZE);
        let dz = f64::from(self.tile_z - tile_z) * f64::from(TILE_SIZE);
        Self {
            tile_x,
            tile_z,
            x: (f64::from(self.x) + dx) as f32,
            y: self.y,
            z: (f64::from(self.z) + dz) as f32,
        }
    }

    /// Move the offsets into `[-TILE_SIZE/2, TILE_SIZE/2)` by adjusting the
    /// tile indices.
    pub fn normalize(self) -> Self {
        let shift_x = ((self.x + HALF_TILE) / TILE_SIZE).floor() as i32;
        let shift_z = ((self.z + HALF_TILE) / TILE_SIZE).floor() as i32;
        if shift_x == 0 && shift_z == 0 {
            return self;
        }
        self.normalized_to(self.tile_x + shift_x, self.tile_z + shift_z)
    }

    /// `self - other` per axis, in metres, computed in double precision.
    fn delta(self, other: WorldLocation) -> (f64, f64, f64) {
        let tile_dx = f64::from(self.tile_x - other.tile_x) * f64::from(TILE_SIZE);
        let tile_dz = f64::from(self.tile_z - other.tile_z) * f64::from(TILE_SIZE);
        (
            f64::from(self.x) - f64::from(other.x) + tile_dx,
            f64::from(self.y) - f64::from(other.y),
            f64::from(self.z) - f64::from(other.z) + tile_dz,
        )
    }

    /// Squared 3-D Euclidean distance in metres², tile-aware.
    pub fn distance_squared(self, other: WorldLocation) -> f32 {
        let (dx, dy, dz) = self.delta(other);
        (dx * dx + dy * dy + dz * dz) as f32
    }

    /// Squared distance in the horizontal (X/Z) plane, ignoring height.
    pub fn distance_squared_xz(self, other: WorldLocation) -> f32 {
        let (dx, _, dz) = self.delta(other);
        (dx * dx + dz * dz) as f32
    }

    #[inline]
    pub fn distance(self, other: WorldLocation) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// The point halfway between `self` and `other`, expressed on `self`'s tile.
    pub fn midpoint(self, other: WorldLocation) -> Self {
        let other = other.normalized_to(self.tile_x, self.tile_z);
        Self {
            tile_x: self.tile_x,
            tile_z: self.tile_z,
            x: (self.x + other.x) * 0.5,
            y: (self.y + other.y) * 0.5,
            z: (self.z + other.z) * 0.5,
        }
    }

    /// Return a copy moved by `(dx, dz)` metres on the same tile.
    #[inline]
    pub fn offset_by(self, dx: f32, dz: f32) -> Self {
        Self { x: self.x + dx, z: self.z + dz, ..self }
    }
}

impl fmt::Display for WorldLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} {}] ({:.2}, {:.2}, {:.2})",
            self.tile_x, self.tile_z, self.x, self.y, self.z
        )
    }
}

/// Wrap an angle in radians into `(-π, π]`.
pub fn wrap_angle(angle: f32) -> f32 {
    let mut a = angle % (2.0 * PI);
    if a <= -PI {
        a += 2.0 * PI;
    } else if a > PI {
        a -= 2.0 * PI;
    }
    a
}
