//! A positional cursor that moves along the network graph.
//!
//! # State
//!
//! A [`Traveller`] is always on exactly one node.  On a vector node it sits
//! `offset` metres into one of the node's sections; on a junction or end
//! node it sits at that node's point and cannot move any further.  Its
//! [`TravellerDirection`] says which way along the node's section chain it
//! faces.
//!
//! # Moving
//!
//! [`Traveller::move_by`] hops from section to section inside a vector node
//! and crosses to the neighbour through pin 1 (past the last section) or
//! pin 0 (before the first).  Arriving on a junction or end node ends the
//! move.  A dangling pin or a section without catalog geometry halts the
//! traveller where it is; the distance it could not cover is returned.
//!
//! # Headings
//!
//! [`Traveller::track_heading`] is the tangent along the chain of the
//! current node; [`Traveller::rot_y`] is the heading the traveller faces,
//! i.e. the tangent turned by π when facing backward.  Both keep their last
//! value after arriving on a point node.

use std::f32::consts::PI;

use log::trace;

use tv_core::{ItemIndex, LocateTolerance, NodeIndex, TvError, WorldLocation, wrap_angle};

use crate::network::{TrackDb, TrackNodeKind};
use crate::section::SectionCatalog;
use crate::{TrackError, TrackResult};

// ── TravellerDirection ────────────────────────────────────────────────────────

/// Which way along a vector node's section chain the traveller faces.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TravellerDirection {
    Forward,
    Backward,
}

impl TravellerDirection {
    #[inline]
    pub fn reversed(self) -> Self {
        match self {
            TravellerDirection::Forward => TravellerDirection::Backward,
            TravellerDirection::Backward => TravellerDirection::Forward,
        }
    }

    /// Facing of a signal from its stored direction flag.
    #[inline]
    pub fn from_signal_flag(flag: u8) -> Self {
        if flag == 0 { TravellerDirection::Forward } else { TravellerDirection::Backward }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum Position {
    Section { index: usize, offset: f32 },
    Point,
}

// ── Traveller ─────────────────────────────────────────────────────────────────

/// A cursor on the network.  Borrows the immutable database and catalog.
#[derive(Clone, Debug)]
pub struct Traveller<'a> {
    db:        &'a TrackDb,
    catalog:   &'a SectionCatalog,
    node:      NodeIndex,
    position:  Position,
    direction: TravellerDirection,
    location:  WorldLocation,
    tangent:   f32,
}

impl<'a> Traveller<'a> {
    /// Place a traveller at the start (facing forward) or end (facing
    /// backward) of vector node `node`.
    pub fn new(
        db: &'a TrackDb,
        catalog: &'a SectionCatalog,
        node: NodeIndex,
        direction: TravellerDirection,
    ) -> TrackResult<Self> {
        let sections = vector_sections(db, node)?;
        let position = match direction {
            TravellerDirection::Forward => Position::Section { index: 0, offset: 0.0 },
            TravellerDirection::Backward => {
                let index = sections.len() - 1;
                let placed = &sections[index];
                let length = catalog
                    .length_of(placed)
                    .ok_or(TvError::SectionNotFound(placed.section))?;
                Position::Section { index, offset: length }
            }
        };
        let mut traveller = Self::unplaced(db, catalog, node, direction, position);
        traveller.refresh()?;
        Ok(traveller)
    }

    /// Place a traveller on vector node `node` at the point closest to
    /// `target`, using the default [`LocateTolerance`].
    pub fn at_location(
        db: &'a TrackDb,
        catalog: &'a SectionCatalog,
        node: NodeIndex,
        target: WorldLocation,
        direction: TravellerDirection,
    ) -> TrackResult<Self> {
        Self::at_location_with(db, catalog, node, target, direction, LocateTolerance::default())
    }

    /// As [`at_location`](Self::at_location) with explicit tolerances.
    ///
    /// Every section of the chain is tested in order; a section accepts the
    /// target when its projection falls within the section (plus
    /// `tolerance.margin` either side) and no further than
    /// `tolerance.max_centerline_offset` from the centre line.  The accepting
    /// section with the smallest offset wins.
    pub fn at_location_with(
        db: &'a TrackDb,
        catalog: &'a SectionCatalog,
        node: NodeIndex,
        target: WorldLocation,
        direction: TravellerDirection,
        tolerance: LocateTolerance,
    ) -> TrackResult<Self> {
        let sections = vector_sections(db, node)?;

        let mut best: Option<(usize, f32, f32)> = None; // (section, along, |offset|)
        let mut missing = None;
        for (index, placed) in sections.iter().enumerate() {
            let Some(shape) = catalog.resolve(placed) else {
                missing.get_or_insert(placed.section);
                continue;
            };
            let length = shape.length();
            let projection = shape.project(placed, target);
            let off = projection.offset.abs();
            let within = projection.along >= -tolerance.margin
                && projection.along <= length + tolerance.margin
                && off <= tolerance.max_centerline_offset;
            if within && best.is_none_or(|(_, _, best_off)| off < best_off) {
                best = Some((index, projection.along.clamp(0.0, length), off));
            }
        }

        let Some((index, offset, _)) = best else {
            return Err(match missing {
                Some(section) => TvError::SectionNotFound(section).into(),
                None => TrackError::CannotLocate { node, location: target },
            });
        };
        let position = Position::Section { index, offset };
        let mut traveller = Self::unplaced(db, catalog, node, direction, position);
        traveller.refresh()?;
        Ok(traveller)
    }

    /// Place a traveller at item `item`, which is believed to lie on vector
    /// node `node`.
    pub fn at_item(
        db: &'a TrackDb,
        catalog: &'a SectionCatalog,
        node: NodeIndex,
        item: ItemIndex,
        direction: TravellerDirection,
    ) -> TrackResult<Self> {
        let location = db.try_item(item)?.location;
        Self::at_location(db, catalog, node, location, direction)
    }

    fn unplaced(
        db: &'a TrackDb,
        catalog: &'a SectionCatalog,
        node: NodeIndex,
        direction: TravellerDirection,
        position: Position,
    ) -> Self {
        Self {
            db,
            catalog,
            node,
            position,
            direction,
            location: WorldLocation::default(),
            tangent: 0.0,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn node(&self) -> NodeIndex {
        self.node
    }

    #[inline]
    pub fn direction(&self) -> TravellerDirection {
        self.direction
    }

    #[inline]
    pub fn location(&self) -> WorldLocation {
        self.location
    }

    /// Index of the current section in the node's chain; `None` on a point node.
    pub fn section_index(&self) -> Option<usize> {
        match self.position {
            Position::Section { index, .. } => Some(index),
            Position::Point => None,
        }
    }

    /// Distance from the start of the current section; `None` on a point node.
    pub fn offset(&self) -> Option<f32> {
        match self.position {
            Position::Section { offset, .. } => Some(offset),
            Position::Point => None,
        }
    }

    #[inline]
    pub fn is_on_point_node(&self) -> bool {
        self.position == Position::Point
    }

    /// Tangent heading along the current node's section chain, radians.
    #[inline]
    pub fn track_heading(&self) -> f32 {
        self.tangent
    }

    /// Heading the traveller faces, radians in `(-π, π]`.
    pub fn rot_y(&self) -> f32 {
        match self.direction {
            TravellerDirection::Forward => wrap_angle(self.tangent),
            TravellerDirection::Backward => wrap_angle(self.tangent + PI),
        }
    }

    /// Turn around in place.
    pub fn reverse(&mut self) {
        self.direction = self.direction.reversed();
    }

    // ── Movement ──────────────────────────────────────────────────────────

    /// Move `distance` metres in the facing direction (negative: against it).
    ///
    /// Returns the part of `distance` that could not be travelled, with the
    /// sign of `distance`.  It is `0.0` unless the traveller reached a
    /// junction, an end node, a dangling pin, or a section without geometry.
    /// A non-finite `distance` is not travelled at all and comes back as is.
    pub fn move_by(&mut self, distance: f32) -> f32 {
        if distance == 0.0 || !distance.is_finite() {
            return distance;
        }
        let before = (self.node, self.position, self.direction, self.location, self.tangent);
        let db = self.db;
        let catalog = self.catalog;
        let mut chain_forward = (distance > 0.0) == (self.direction == TravellerDirection::Forward);
        let mut remaining = distance.abs();

        while let Position::Section { index, offset } = self.position {
            let sections = db.sections_of(self.node);
            let Some(length) = sections.get(index).and_then(|s| catalog.length_of(s)) else {
                break;
            };

            if chain_forward {
                let room = length - offset;
                if remaining <= room {
                    self.position = Position::Section { index, offset: offset + remaining };
                    remaining = 0.0;
                    break;
                }
                if index + 1 < sections.len() {
                    if catalog.length_of(&sections[index + 1]).is_none() {
                        self.position = Position::Section { index, offset: length };
                        remaining -= room;
                        break;
                    }
                    self.position = Position::Section { index: index + 1, offset: 0.0 };
                    remaining -= room;
                } else {
                    self.position = Position::Section { index, offset: length };
                    remaining -= room;
                    if !self.cross(1, &mut chain_forward) {
                        break;
                    }
                }
            } else {
                if remaining <= offset {
                    self.position = Position::Section { index, offset: offset - remaining };
                    remaining = 0.0;
                    break;
                }
                remaining -= offset;
                if index > 0 {
                    let Some(previous) = catalog.length_of(&sections[index - 1]) else {
                        self.position = Position::Section { index, offset: 0.0 };
                        break;
                    };
                    self.position = Position::Section { index: index - 1, offset: previous };
                } else {
                    self.position = Position::Section { index, offset: 0.0 };
                    if !self.cross(0, &mut chain_forward) {
                        break;
                    }
                }
            }
        }

        if let Err(e) = self.refresh() {
            trace!("traveller move on {} undone: {e}", self.node);
            (self.node, self.position, self.direction, self.location, self.tangent) = before;
            return distance;
        }
        remaining.copysign(distance)
    }

    /// Step through pin `pin` of the current vector node.  Returns `false`
    /// (and stays put) when the pin leads nowhere usable.
    fn cross(&mut self, pin: usize, chain_forward: &mut bool) -> bool {
        let db = self.db;
        let Some(next) = db.neighbor_at(self.node, pin) else {
            trace!("traveller halted at dangling pin {pin} of {}", self.node);
            return false;
        };
        let (Some(current), Some(next_node)) = (db.node(self.node), db.node(next)) else {
            return false;
        };
        let via = current.pins.get(pin).copied();

        match &next_node.kind {
            TrackNodeKind::Junction | TrackNodeKind::End => {
                // Capture the heading at the boundary before leaving the chain.
                if self.refresh().is_err() {
                    return false;
                }
                self.node = next;
                self.position = Position::Point;
                self.location = next_node.uid;
                true
            }
            TrackNodeKind::Vector(vector) => {
                if vector.sections.is_empty() {
                    return false;
                }
                let links_back = |i: usize| next_node.pins.get(i).is_some_and(|p| p.link == self.node);
                let enter_at_start = match (links_back(0), links_back(1)) {
                    (true, false) => true,
                    (false, true) => false,
                    _ => via.is_none_or(|p| p.direction == 1),
                };

                let entry = if enter_at_start { 0 } else { vector.sections.len() - 1 };
                let Some(length) = vector.sections.get(entry).and_then(|s| self.catalog.length_of(s)) else {
                    trace!("traveller halted: {next} has no geometry where {} joins it", self.node);
                    return false;
                };
                let offset = if enter_at_start { 0.0 } else { length };
                let position = Position::Section { index: entry, offset };

                if enter_at_start != *chain_forward {
                    self.direction = self.direction.reversed();
                }
                *chain_forward = enter_at_start;
                trace!("traveller crossed from {} to {next}", self.node);
                self.node = next;
                self.position = position;
                true
            }
        }
    }

    /// Recompute location and tangent from the current position.
    fn refresh(&mut self) -> TrackResult<()> {
        match self.position {
            Position::Section { index, offset } => {
                let sections = self.db.sections_of(self.node);
                let placed = sections
                    .get(index)
                    .ok_or(TrackError::NotAVectorNode(self.node))?;
                let shape = self
                    .catalog
                    .resolve(placed)
                    .ok_or(TvError::SectionNotFound(placed.section))?;
                self.location = shape.point_at(placed, offset);
                self.tangent = shape.heading_at(placed, offset);
            }
            Position::Point => {
                if let Some(node) = self.db.node(self.node) {
                    self.location = node.uid;
                }
            }
        }
        Ok(())
    }
}

/// The non-empty section chain of vector node `node`.
fn vector_sections(db: &TrackDb, node: NodeIndex) -> TrackResult<&[crate::TrackVectorSection]> {
    let vector = db
        .try_node(node)?
        .as_vector()
        .ok_or(TrackError::NotAVectorNode(node))?;
    if vector.sections.is_empty() {
        return Err(TrackError::EmptyVectorNode(node));
    }
    Ok(&vector.sections)
}
