//! Nearest-feature trackers.
//!
//! A tracker keeps the single candidate closest to a query point seen since
//! the last [`Closest::reset`].  One draw pass feeds every visible element
//! through [`Closest::check_distance`]; afterwards the engine compares
//! trackers with [`Closest::is_closer_than`] to decide what to highlight.
//!
//! Distances are squared and measured in the XZ plane only: the cursor has
//! no meaningful height.
//!
//! | Alias              | Candidate        | Granularity                   |
//! |--------------------|------------------|-------------------------------|
//! | `ClosestTrack`     | [`SectionRef`]   | one section of a vector node  |
//! | `ClosestPointNode` | [`PointNodeRef`] | one junction or end node      |
//! | `ClosestItem`      | [`ItemRef`]      | one item                      |

use std::fmt;

use log::trace;

use tv_core::{ItemIndex, NodeIndex, WorldLocation};
use tv_track::{PointNodeKind, TrackSection, TrackVectorSection};

// ── Candidates ────────────────────────────────────────────────────────────────

/// Which of the two networks of a route an element belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NetworkKind {
    Rail,
    Road,
}

impl fmt::Display for NetworkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NetworkKind::Rail => "rail",
            NetworkKind::Road => "road",
        })
    }
}

/// One section instance inside a vector node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SectionRef {
    pub network: NetworkKind,
    pub node:    NodeIndex,
    /// Position in the node's section chain.
    pub section: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PointNodeRef {
    pub network: NetworkKind,
    pub node:    NodeIndex,
    pub kind:    PointNodeKind,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ItemRef {
    pub network: NetworkKind,
    pub item:    ItemIndex,
}

// ── Closest ───────────────────────────────────────────────────────────────────

/// Closest-candidate accumulator for one feature class.
#[derive(Clone, Debug, PartialEq)]
pub struct Closest<C> {
    best:             Option<C>,
    distance_squared: f32,
}

pub type ClosestTrack = Closest<SectionRef>;
pub type ClosestPointNode = Closest<PointNodeRef>;
pub type ClosestItem = Closest<ItemRef>;

impl<C> Default for Closest<C> {
    fn default() -> Self {
        Self { best: None, distance_squared: f32::INFINITY }
    }
}

impl<C: Copy + fmt::Debug> Closest<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A tracker that already holds `candidate` at distance zero.  Used for
    /// search overrides: nothing found by a regular pass can beat it.
    pub fn preloaded(candidate: C) -> Self {
        Self { best: Some(candidate), distance_squared: 0.0 }
    }

    /// Forget the held candidate.  Call before the first check of a pass.
    pub fn reset(&mut self) {
        self.best = None;
        self.distance_squared = f32::INFINITY;
    }

    /// Offer `candidate` located at `location`.  Returns `true` when it
    /// replaced the held candidate, which only happens when it is strictly
    /// closer to `query`.
    pub fn check_distance(&mut self, location: WorldLocation, query: WorldLocation, candidate: C) -> bool {
        self.offer(location.distance_squared_xz(query), candidate)
    }

    /// Offer `candidate` with an already computed squared distance.
    pub fn offer(&mut self, distance_squared: f32, candidate: C) -> bool {
        // NaN compares false and is never accepted.
        if distance_squared < self.distance_squared {
            trace!("closest: {candidate:?} at d²={distance_squared}");
            self.best = Some(candidate);
            self.distance_squared = distance_squared;
            true
        } else {
            false
        }
    }

    /// `true` when this tracker's best is strictly closer than `other`'s.
    /// An empty tracker is never closer than anything.
    #[inline]
    pub fn is_closer_than<D>(&self, other: &Closest<D>) -> bool {
        self.distance_squared < other.distance_squared
    }

    #[inline]
    pub fn best(&self) -> Option<C> {
        self.best
    }

    /// Squared distance of the held candidate; `f32::INFINITY` when empty.
    #[inline]
    pub fn distance_squared(&self) -> f32 {
        self.distance_squared
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.best.is_none()
    }
}

impl Closest<SectionRef> {
    /// Offer a section, measuring to the nearest point of its geometry
    /// rather than to its start.
    pub fn check_section(
        &mut self,
        shape: &TrackSection,
        placed: &TrackVectorSection,
        query: WorldLocation,
        candidate: SectionRef,
    ) -> bool {
        self.offer(shape.distance_squared_to(placed, query), candidate)
    }
}

// ── Trackers ──────────────────────────────────────────────────────────────────

/// The four trackers filled by one frame pass.
#[derive(Clone, Debug, Default)]
pub struct Trackers {
    pub rail_track: ClosestTrack,
    pub road_track: ClosestTrack,
    /// Rail junctions and end nodes.
    pub point_node: ClosestPointNode,
    /// Rail and road items.
    pub item:       ClosestItem,
}

impl Trackers {
    pub fn reset(&mut self) {
        self.rail_track.reset();
        self.road_track.reset();
        self.point_node.reset();
        self.item.reset();
    }

    pub fn track(&self, network: NetworkKind) -> &ClosestTrack {
        match network {
            NetworkKind::Rail => &self.rail_track,
            NetworkKind::Road => &self.road_track,
        }
    }
}
