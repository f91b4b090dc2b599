//! One draw pass over both networks.
//!
//! # Order
//!
//! ```text
//! ① rail sections          → sink.on_section, rail track tracker
//! ② road sections          → sink.on_section, road track tracker   (draw_roads)
//! ③ rail junctions / ends  → sink.on_junction / on_end_node, point tracker
//! ④ rail items             → sink.on_item, item tracker
//! ⑤ road items             → sink.on_item, item tracker            (car spawners or road crossings shown)
//! ```
//!
//! Trackers are reset first, so a pass never sees candidates of the
//! previous frame.  Elements whose geometry is missing or that the sink
//! reports as invisible are skipped; nothing aborts the pass.

use tv_core::{DrawSettings, WorldLocation};
use tv_track::{
    ItemKind, PointNodeKind, SectionCatalog, TrItem, TrackDb, TrackNode, TrackSection,
    TrackVectorSection,
};

use crate::closest::{ItemRef, NetworkKind, PointNodeRef, SectionRef, Trackers};
use crate::orientation::OrientationCache;

// ── DrawSink ──────────────────────────────────────────────────────────────────

/// Callbacks invoked by [`FramePass::run`] for every element that is drawn.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they render.
pub trait DrawSink {
    /// Whether `location` is inside the visible area.  Invisible elements are
    /// neither drawn nor considered for highlighting.
    fn is_visible(&self, _location: WorldLocation) -> bool {
        true
    }

    fn on_section(
        &mut self,
        _section: SectionRef,
        _placed:  &TrackVectorSection,
        _shape:   &TrackSection,
    ) {}

    fn on_junction(&mut self, _node: &TrackNode) {}

    /// `angle` is the cached heading of the track leading into the node.
    fn on_end_node(&mut self, _node: &TrackNode, _angle: f32) {}

    /// `angle` is the cached facing heading for signals, `0.0` otherwise.
    fn on_item(&mut self, _item: ItemRef, _data: &TrItem, _angle: f32) {}
}

/// A [`DrawSink`] that draws nothing and sees everything.  Use when only the
/// trackers are of interest.
pub struct NoopSink;

impl DrawSink for NoopSink {}

/// Counts of elements handed to the sink during one pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub sections:    usize,
    pub point_nodes: usize,
    pub items:       usize,
}

// ── Item visibility ───────────────────────────────────────────────────────────

/// Whether an item of `kind` is drawn under `settings`.
///
/// `forced` (an active item search) shows every class except the ones that
/// are never drawn at all.
pub fn item_visible(kind: &ItemKind, settings: &DrawSettings, forced: bool) -> bool {
    match kind {
        ItemKind::Empty | ItemKind::Crossover => false,
        _ if forced => true,
        ItemKind::Signal { .. } => settings.show_signals,
        ItemKind::SpeedPost { is_limit, is_milepost, .. } => {
            (*is_limit && settings.show_speed_limits) || (*is_milepost && settings.show_mileposts)
        }
        ItemKind::Platform => settings.show_platform_markers,
        ItemKind::Siding => settings.show_siding_markers,
        ItemKind::SoundRegion => settings.show_sound_regions,
        ItemKind::LevelCrossing => settings.show_crossings,
        ItemKind::RoadLevelCrossing => settings.show_road_crossings,
        ItemKind::Hazard => settings.show_hazards,
        ItemKind::Pickup => settings.show_pickups,
        ItemKind::CarSpawner => settings.show_car_spawners,
    }
}

// ── FramePass ─────────────────────────────────────────────────────────────────

/// Borrowed view of everything a draw pass reads.
pub struct FramePass<'a> {
    pub rail:             &'a TrackDb,
    pub road:             &'a TrackDb,
    pub catalog:          &'a SectionCatalog,
    pub settings:         &'a DrawSettings,
    pub rail_orientation: &'a OrientationCache,
    pub road_orientation: &'a OrientationCache,
    /// Show every item class (an item search is active).
    pub force_items:      bool,
}

impl FramePass<'_> {
    /// Draw everything visible into `sink` and refill `trackers` with the
    /// elements closest to `query`.
    pub fn run<S: DrawSink + ?Sized>(
        &self,
        query:    WorldLocation,
        trackers: &mut Trackers,
        sink:     &mut S,
    ) -> FrameStats {
        trackers.reset();
        let mut stats = FrameStats::default();

        stats.sections += self.sections(NetworkKind::Rail, query, trackers, sink);
        if self.settings.draw_roads {
            stats.sections += self.sections(NetworkKind::Road, query, trackers, sink);
        }

        stats.point_nodes += self.point_nodes(query, trackers, sink);

        stats.items += self.items(NetworkKind::Rail, query, trackers, sink);
        if self.force_items || self.settings.show_car_spawners || self.settings.show_road_crossings {
            stats.items += self.items(NetworkKind::Road, query, trackers, sink);
        }
        stats
    }

    fn network(&self, network: NetworkKind) -> (&TrackDb, &OrientationCache) {
        match network {
            NetworkKind::Rail => (self.rail, self.rail_orientation),
            NetworkKind::Road => (self.road, self.road_orientation),
        }
    }

    fn sections<S: DrawSink + ?Sized>(
        &self,
        network:  NetworkKind,
        query:    WorldLocation,
        trackers: &mut Trackers,
        sink:     &mut S,
    ) -> usize {
        let (db, _) = self.network(network);
        let tracker = match network {
            NetworkKind::Rail => &mut trackers.rail_track,
            NetworkKind::Road => &mut trackers.road_track,
        };

        let mut drawn = 0;
        for (node, vector) in db.vector_nodes() {
            for (section, placed) in vector.sections.iter().enumerate() {
                let Some(shape) = self.catalog.resolve(placed) else { continue };
                if !sink.is_visible(placed.location) {
                    continue;
                }
                let candidate = SectionRef { network, node: node.index, section };
                sink.on_section(candidate, placed, shape);
                tracker.check_section(shape, placed, query, candidate);
                drawn += 1;
            }
        }
        drawn
    }

    fn point_nodes<S: DrawSink + ?Sized>(
        &self,
        query:    WorldLocation,
        trackers: &mut Trackers,
        sink:     &mut S,
    ) -> usize {
        let mut drawn = 0;
        for node in self.rail.nodes() {
            let Some(kind) = node.point_kind() else { continue };
            let shown = match kind {
                PointNodeKind::Junction => self.settings.show_junction_nodes,
                PointNodeKind::EndNode => self.settings.show_end_nodes,
            };
            if !shown || !sink.is_visible(node.uid) {
                continue;
            }
            match kind {
                PointNodeKind::Junction => sink.on_junction(node),
                PointNodeKind::EndNode => {
                    sink.on_end_node(node, self.rail_orientation.end_node_angle(node.index));
                }
            }
            let candidate = PointNodeRef { network: NetworkKind::Rail, node: node.index, kind };
            trackers.point_node.check_distance(node.uid, query, candidate);
            drawn += 1;
        }
        drawn
    }

    fn items<S: DrawSink + ?Sized>(
        &self,
        network:  NetworkKind,
        query:    WorldLocation,
        trackers: &mut Trackers,
        sink:     &mut S,
    ) -> usize {
        let (db, orientation) = self.network(network);
        let mut drawn = 0;
        for (item, data) in db.indexed_items() {
            if !item_visible(&data.kind, self.settings, self.force_items) || !sink.is_visible(data.location) {
                continue;
            }
            let angle = if data.is_signal() { orientation.signal_angle(data.id) } else { 0.0 };
            let candidate = ItemRef { network, item };
            sink.on_item(candidate, data, angle);
            trackers.item.check_distance(data.location, query, candidate);
            drawn += 1;
        }
        drawn
    }
}
