//! The `HighlightEngine` struct: per-session highlight state.

use log::{debug, trace};

use tv_core::{ItemIndex, NodeIndex, ViewerConfig, WorldLocation};
use tv_track::{SectionCatalog, TrackDb};

use crate::closest::{
    ClosestItem, ClosestPointNode, ClosestTrack, ItemRef, NetworkKind, PointNodeRef, SectionRef,
    Trackers,
};
use crate::orientation::OrientationCache;
use crate::pass::{DrawSink, FramePass, FrameStats};

// ── Results ───────────────────────────────────────────────────────────────────

/// The point-like element to highlight next to the track.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HighlightedFeature {
    Item(ItemRef),
    PointNode(PointNodeRef),
}

/// What the last frame says should be drawn highlighted.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Highlights {
    /// The section closest to the cursor; its whole node is highlighted.
    pub track:       Option<SectionRef>,
    /// The same section, when single sections are hot-lit.
    pub hot_section: Option<SectionRef>,
    pub feature:     Option<HighlightedFeature>,
}

/// Elements a user searched for.  Each slot, when filled, replaces the
/// corresponding frame tracker until cleared.
#[derive(Clone, Debug, Default)]
struct SearchOverride {
    track:      Option<ClosestTrack>,
    point_node: Option<ClosestPointNode>,
    item:       Option<ClosestItem>,
}

impl SearchOverride {
    fn is_active(&self) -> bool {
        self.track.is_some() || self.point_node.is_some() || self.item.is_some()
    }
}

// ── HighlightEngine ───────────────────────────────────────────────────────────

/// Owns both networks of a route together with everything derived from them
/// for drawing and highlighting.
///
/// Per frame:
///
/// 1. [`frame`](Self::frame) draws every visible element into a
///    [`DrawSink`] and refills the nearest-feature trackers.
/// 2. [`highlights`](Self::highlights) combines the trackers (and any
///    search override) into the set of elements to draw highlighted.
///
/// Create via [`HighlightEngineBuilder`][crate::HighlightEngineBuilder].
pub struct HighlightEngine {
    rail:    TrackDb,
    road:    TrackDb,
    catalog: SectionCatalog,
    config:  ViewerConfig,

    rail_orientation: OrientationCache,
    road_orientation: OrientationCache,

    trackers: Trackers,
    search:   SearchOverride,
}

impl HighlightEngine {
    pub(crate) fn assemble(rail: TrackDb, road: TrackDb, catalog: SectionCatalog, config: ViewerConfig) -> Self {
        let rail_orientation = OrientationCache::build(&rail, &catalog, config.locate);
        let road_orientation = OrientationCache::build(&road, &catalog, config.locate);
        Self {
            rail,
            road,
            catalog,
            config,
            rail_orientation,
            road_orientation,
            trackers: Trackers::default(),
            search: SearchOverride::default(),
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn network(&self, network: NetworkKind) -> &TrackDb {
        match network {
            NetworkKind::Rail => &self.rail,
            NetworkKind::Road => &self.road,
        }
    }

    pub fn catalog(&self) -> &SectionCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Mutable access for settings toggles; takes effect on the next frame.
    pub fn config_mut(&mut self) -> &mut ViewerConfig {
        &mut self.config
    }

    pub fn orientation(&self, network: NetworkKind) -> &OrientationCache {
        match network {
            NetworkKind::Rail => &self.rail_orientation,
            NetworkKind::Road => &self.road_orientation,
        }
    }

    /// Trackers as filled by the last frame, without search overrides.
    pub fn trackers(&self) -> &Trackers {
        &self.trackers
    }

    // ── Frame ─────────────────────────────────────────────────────────────

    /// Draw one frame into `sink` with the cursor at `query`.
    pub fn frame<S: DrawSink + ?Sized>(&mut self, query: WorldLocation, sink: &mut S) -> FrameStats {
        let pass = FramePass {
            rail:             &self.rail,
            road:             &self.road,
            catalog:          &self.catalog,
            settings:         &self.config.draw,
            rail_orientation: &self.rail_orientation,
            road_orientation: &self.road_orientation,
            force_items:      self.items_forced_visible(),
        };
        pass.run(query, &mut self.trackers, sink)
    }

    /// What to draw highlighted after the last frame.
    ///
    /// With `do_all == false` (an overview inset) only the rail track is
    /// reported.
    pub fn highlights(&self, do_all: bool) -> Highlights {
        let rail = &self.trackers.rail_track;
        let road = &self.trackers.road_track;

        let track = match &self.search.track {
            Some(searched) if do_all || is_rail(searched) => searched.best(),
            _ if do_all && self.config.draw.draw_roads && road.is_closer_than(rail) => road.best(),
            _ => rail.best(),
        };
        let hot_section = track.filter(|_| self.config.draw.show_vector_sections);

        let feature = if do_all {
            let point = self.search.point_node.as_ref().unwrap_or(&self.trackers.point_node);
            let item = self.search.item.as_ref().unwrap_or(&self.trackers.item);
            match (item.best(), point.best()) {
                (Some(i), _) if item.is_closer_than(point) => Some(HighlightedFeature::Item(i)),
                (_, Some(p)) => Some(HighlightedFeature::PointNode(p)),
                _ => None,
            }
        } else {
            None
        };

        Highlights { track, hot_section, feature }
    }

    // ── Search override ───────────────────────────────────────────────────

    /// Highlight node `node` of `network` regardless of the cursor and return
    /// a location to recenter the view on.  `None` (and no override) when the
    /// node does not exist.
    pub fn highlight_node(&mut self, network: NetworkKind, node: NodeIndex) -> Option<WorldLocation> {
        let db = self.network(network);
        let track_node = db.node(node)?;
        let location = db.node_location(node)?;

        if let Some(kind) = track_node.point_kind() {
            self.search.point_node = Some(ClosestPointNode::preloaded(PointNodeRef { network, node, kind }));
        } else {
            self.search.track = Some(ClosestTrack::preloaded(SectionRef { network, node, section: 0 }));
        }
        trace!("search override: {network} node {node}");
        Some(location)
    }

    /// Highlight item `item` of `network` regardless of the cursor and return
    /// its location.  While any item is searched, every item class is drawn.
    pub fn highlight_item(&mut self, network: NetworkKind, item: ItemIndex) -> Option<WorldLocation> {
        let location = self.network(network).item(item)?.location;
        self.search.item = Some(ClosestItem::preloaded(ItemRef { network, item }));
        trace!("search override: {network} item {item}");
        Some(location)
    }

    /// Return to nearest-to-cursor highlighting.
    pub fn clear_highlight_overrides(&mut self) {
        if self.search.is_active() {
            trace!("search override cleared");
        }
        self.search = SearchOverride::default();
    }

    pub fn is_highlight_overridden(&self) -> bool {
        self.search.is_active()
    }

    /// Whether every item class is currently forced visible.
    pub fn items_forced_visible(&self) -> bool {
        self.search.item.is_some()
    }

    // ── Status queries ────────────────────────────────────────────────────

    /// Closest rail and road sections to `query`, computed from scratch.
    ///
    /// Frame state is left alone.  With the `parallel` feature the two scans
    /// run concurrently.
    pub fn closest_tracks(&self, query: WorldLocation) -> (ClosestTrack, ClosestTrack) {
        let catalog = &self.catalog;

        #[cfg(not(feature = "parallel"))]
        {
            (
                scan_tracks(NetworkKind::Rail, &self.rail, catalog, query),
                scan_tracks(NetworkKind::Road, &self.road, catalog, query),
            )
        }

        #[cfg(feature = "parallel")]
        {
            let (rail, road) = (&self.rail, &self.road);
            rayon::join(
                || scan_tracks(NetworkKind::Rail, rail, catalog, query),
                || scan_tracks(NetworkKind::Road, road, catalog, query),
            )
        }
    }

    /// Log a one-line summary of the loaded networks.
    pub(crate) fn log_summary(&self) {
        for network in [NetworkKind::Rail, NetworkKind::Road] {
            let db = self.network(network);
            let orientation = self.orientation(network);
            match db.extreme_tiles() {
                Some(b) => debug!(
                    "{network}: {} node slots, {} items, tiles x {}..={} z {}..={}, {} signals, {} end nodes oriented",
                    db.node_slots(),
                    db.item_count(),
                    b.min_tile_x,
                    b.max_tile_x,
                    b.min_tile_z,
                    b.max_tile_z,
                    orientation.signal_count(),
                    orientation.end_node_count(),
                ),
                None => debug!("{network}: no sections"),
            }
        }
    }
}

fn is_rail(tracker: &ClosestTrack) -> bool {
    tracker.best().is_some_and(|s| s.network == NetworkKind::Rail)
}

/// Linear scan of every section of `db`.
fn scan_tracks(network: NetworkKind, db: &TrackDb, catalog: &SectionCatalog, query: WorldLocation) -> ClosestTrack {
    let mut closest = ClosestTrack::new();
    for (node, vector) in db.vector_nodes() {
        for (section, placed) in vector.sections.iter().enumerate() {
            if let Some(shape) = catalog.resolve(placed) {
                closest.check_section(shape, placed, query, SectionRef { network, node: node.index, section });
            }
        }
    }
    closest
}
