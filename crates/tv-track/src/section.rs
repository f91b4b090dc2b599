//! Track section shapes and the geometry along them.
//!
//! # Axis convention
//!
//! A heading `rot_y` (radians) is measured so that moving `d` metres along it
//! changes the position by
//!
//! ```text
//! dx = sin(rot_y) * d
//! dz = cos(rot_y) * d
//! ```
//!
//! i.e. the heading is 90° off and sign-flipped relative to the usual maths
//! convention.  Curved sections sweep a circular arc; a positive `angle`
//! turns the heading up (clockwise seen from above), a negative one down:
//!
//! ```text
//! turn sign s = -1 for angle > 0, +1 otherwise
//! rot(d)      = rot_y - s * d / radius
//! x(d)        = x0 - s * radius * (cos(rot_y) - cos(rot(d)))
//! z(d)        = z0 + s * radius * (sin(rot_y) - sin(rot(d)))
//! ```
//!
//! The X and Z chord terms are evaluated with half-angle identities, which
//! keeps them accurate for the small sweeps of short sections.
//!
//! Distances are never clamped here: callers segment-hop (see
//! [`Traveller`](crate::Traveller)) before asking for a point past a
//! section's end.

use rustc_hash::FxHashMap;

use tv_core::{SectionIndex, WorldLocation, wrap_angle};

// ── TrackSection ──────────────────────────────────────────────────────────────

/// Shape of a catalog section: exactly one of straight or curved.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SectionShape {
    Straight {
        length: f32,
    },
    Curved {
        radius: f32,
        /// Signed sweep in degrees.
        angle: f32,
    },
}

/// A section shape from the section catalog.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackSection {
    pub index: SectionIndex,
    pub width: f32,
    pub shape: SectionShape,
}

impl TrackSection {
    pub fn straight(index: SectionIndex, width: f32, length: f32) -> Self {
        Self { index, width, shape: SectionShape::Straight { length } }
    }

    pub fn curved(index: SectionIndex, width: f32, radius: f32, angle_deg: f32) -> Self {
        Self { index, width, shape: SectionShape::Curved { radius, angle: angle_deg } }
    }

    /// Arc length in metres.
    pub fn length(&self) -> f32 {
        match self.shape {
            SectionShape::Straight { length } => length,
            SectionShape::Curved { radius, angle } => radius * angle.to_radians().abs(),
        }
    }

    /// Total heading change over the whole section, in radians.
    pub fn heading_change(&self) -> f32 {
        match self.shape {
            SectionShape::Straight { .. } => 0.0,
            SectionShape::Curved { angle, .. } => angle.to_radians(),
        }
    }

    /// World location `distance` metres from the start of `start`.
    pub fn point_at(&self, start: &TrackVectorSection, distance: f32) -> WorldLocation {
        let heading = start.rot_y;
        match self.shape {
            SectionShape::Straight { .. } => {
                start.location.offset_by(heading.sin() * distance, heading.cos() * distance)
            }
            SectionShape::Curved { radius, angle } => {
                let sign = turn_sign(angle);
                let turn = -distance / radius;
                // cos(h) - cos(h + s*t) and sin(h) - sin(h + s*t) via half angles.
                let mid = heading + 0.5 * sign * turn;
                let half = -0.5 * sign * turn;
                let cos_diff = -2.0 * mid.sin() * half.sin();
                let sin_diff = 2.0 * mid.cos() * half.sin();
                let delta_x = sign * radius * cos_diff;
                let delta_z = sign * radius * sin_diff;
                start.location.offset_by(-delta_x, delta_z)
            }
        }
    }

    /// Tangent heading `distance` metres from the start of `start`.
    pub fn heading_at(&self, start: &TrackVectorSection, distance: f32) -> f32 {
        match self.shape {
            SectionShape::Straight { .. } => start.rot_y,
            SectionShape::Curved { radius, angle } => {
                start.rot_y - turn_sign(angle) * distance / radius
            }
        }
    }

    /// Project `point` onto this section placed at `start`.
    pub fn project(&self, start: &TrackVectorSection, point: WorldLocation) -> Projection {
        let origin = start.location;
        let p = point.normalized_to(origin.tile_x, origin.tile_z);
        let dx = p.x - origin.x;
        let dz = p.z - origin.z;
        let heading = start.rot_y;

        match self.shape {
            SectionShape::Straight { .. } => Projection {
                along:  dx * heading.sin() + dz * heading.cos(),
                offset: dx * heading.cos() - dz * heading.sin(),
            },
            SectionShape::Curved { radius, angle } => {
                if radius <= f32::EPSILON {
                    return Projection { along: 0.0, offset: (dx * dx + dz * dz).sqrt() };
                }
                let sign = turn_sign(angle);
                // Centre of the arc, relative to the section start.
                let vx = dx + sign * radius * heading.cos();
                let vz = dz - sign * radius * heading.sin();
                let rot = (-sign * vz).atan2(sign * vx);
                Projection {
                    along:  sign * wrap_angle(heading - rot) * radius,
                    offset: (vx * vx + vz * vz).sqrt() - radius,
                }
            }
        }
    }

    /// Squared horizontal distance from `point` to the nearest point of the
    /// section.
    pub fn distance_squared_to(&self, start: &TrackVectorSection, point: WorldLocation) -> f32 {
        let along = self.project(start, point).along.clamp(0.0, self.length());
        self.point_at(start, along).distance_squared_xz(point)
    }
}

/// Turn sign of a curve: negative angle turns with `+1`, positive with `-1`.
#[inline]
fn turn_sign(angle_deg: f32) -> f32 {
    if angle_deg > 0.0 { -1.0 } else { 1.0 }
}

/// Foot point of a location on a section.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Projection {
    /// Distance from the section start along the centre line (may be negative
    /// or exceed the section length).
    pub along: f32,
    /// Signed distance from the centre line (for curves: positive outside).
    pub offset: f32,
}

// ── TrackVectorSection ────────────────────────────────────────────────────────

/// One catalog section placed in the world: where it starts and which way
/// it heads at its start.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackVectorSection {
    pub section:  SectionIndex,
    pub location: WorldLocation,
    /// Tangent heading at the start point, radians.
    pub rot_y:    f32,
}

impl TrackVectorSection {
    pub fn new(section: SectionIndex, location: WorldLocation, rot_y: f32) -> Self {
        Self { section, location, rot_y }
    }
}

// ── SectionCatalog ────────────────────────────────────────────────────────────

/// All section shapes of a route, keyed by [`SectionIndex`].
///
/// A missing key is the "no geometry" signal: every lookup returns `Option`
/// and callers skip the element.
#[derive(Clone, Debug, Default)]
pub struct SectionCatalog {
    sections: FxHashMap<SectionIndex, TrackSection>,
}

impl SectionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a section shape, returning the replaced one.
    pub fn insert(&mut self, section: TrackSection) -> Option<TrackSection> {
        self.sections.insert(section.index, section)
    }

    #[inline]
    pub fn get(&self, index: SectionIndex) -> Option<&TrackSection> {
        self.sections.get(&index)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Shape of a placed section.
    #[inline]
    pub fn resolve(&self, placed: &TrackVectorSection) -> Option<&TrackSection> {
        self.get(placed.section)
    }

    pub fn length_of(&self, placed: &TrackVectorSection) -> Option<f32> {
        self.resolve(placed).map(TrackSection::length)
    }

    pub fn point_on(&self, placed: &TrackVectorSection, distance: f32) -> Option<WorldLocation> {
        self.resolve(placed).map(|s| s.point_at(placed, distance))
    }
}

impl FromIterator<TrackSection> for SectionCatalog {
    fn from_iter<I: IntoIterator<Item = TrackSection>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for section in iter {
            catalog.insert(section);
        }
        catalog
    }
}
