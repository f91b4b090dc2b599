//! Headings of signals and end nodes, computed once per network.

use log::{debug, warn};
use rustc_hash::FxHashMap;

use tv_core::{ItemId, LocateTolerance, NodeIndex};
use tv_track::{ItemKind, SectionCatalog, TrackDb, TrackNodeKind, Traveller, TravellerDirection};

/// Read-only heading lookups for one network.
///
/// Built when a route is opened and never invalidated: the network is
/// immutable.  Anything that could not be computed reads back as `0.0`.
#[derive(Clone, Debug, Default)]
pub struct OrientationCache {
    signals:   FxHashMap<ItemId, f32>,
    end_nodes: FxHashMap<NodeIndex, f32>,
}

impl OrientationCache {
    /// Compute every heading of `db`.  Signals are snapped onto their track
    /// with `tolerance`.
    pub fn build(db: &TrackDb, catalog: &SectionCatalog, tolerance: LocateTolerance) -> Self {
        let mut cache = Self::default();
        cache.find_signal_orientations(db, catalog, tolerance);
        cache.find_end_node_orientations(db, catalog);
        debug!(
            "orientation cache: {} signals, {} end nodes",
            cache.signals.len(),
            cache.end_nodes.len()
        );
        cache
    }

    /// Facing heading of the signal with id `id`.
    pub fn signal_angle(&self, id: ItemId) -> f32 {
        self.signals.get(&id).copied().unwrap_or(0.0)
    }

    /// Heading of the track leading into end node `node`.
    pub fn end_node_angle(&self, node: NodeIndex) -> f32 {
        self.end_nodes.get(&node).copied().unwrap_or(0.0)
    }

    pub fn signal_count(&self) -> usize {
        self.signals.len()
    }

    pub fn end_node_count(&self) -> usize {
        self.end_nodes.len()
    }

    /// Place a traveller on each signal and keep its facing heading.
    fn find_signal_orientations(&mut self, db: &TrackDb, catalog: &SectionCatalog, tolerance: LocateTolerance) {
        for (node, vector) in db.vector_nodes() {
            for &item_index in &vector.item_refs {
                let Some(item) = db.item(item_index) else { continue };
                let ItemKind::Signal { direction } = item.kind else { continue };

                let facing = TravellerDirection::from_signal_flag(direction);
                let placed = Traveller::at_location_with(db, catalog, node.index, item.location, facing, tolerance);
                let angle = match placed {
                    Ok(traveller) => traveller.rot_y(),
                    Err(e) => {
                        warn!("signal {} on {}: {e}; using heading 0", item.id, node.index);
                        0.0
                    }
                };
                self.signals.insert(item.id, angle);
            }
        }
    }

    /// Take the heading from the section of the neighbouring vector node
    /// that touches each end node.
    fn find_end_node_orientations(&mut self, db: &TrackDb, catalog: &SectionCatalog) {
        for node in db.nodes() {
            if !matches!(node.kind, TrackNodeKind::End) {
                continue;
            }
            let angle = end_node_heading(db, catalog, node.index);
            if angle.is_none() {
                warn!("end node {}: no usable neighbouring section; using heading 0", node.index);
            }
            self.end_nodes.insert(node.index, angle.unwrap_or(0.0));
        }
    }
}

fn end_node_heading(db: &TrackDb, catalog: &SectionCatalog, end: NodeIndex) -> Option<f32> {
    let neighbour = db.neighbor_at(end, 0)?;
    let vector_node = db.node(neighbour)?;
    let sections = &vector_node.as_vector()?.sections;

    let starts_here = vector_node.pins.first().is_some_and(|p| p.link == end);
    if starts_here {
        sections.first().map(|s| s.rot_y)
    } else {
        let last = sections.last()?;
        catalog.resolve(last).map(|shape| last.rot_y + shape.heading_change())
    }
}
