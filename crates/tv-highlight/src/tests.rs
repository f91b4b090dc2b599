//! Unit tests for tv-highlight.

use tv_core::{ItemId, ItemIndex, NodeIndex, SectionIndex, WorldLocation};
use tv_track::{
    ItemKind, SectionCatalog, TrItem, TrackDb, TrackDbBuilder, TrackSection, TrackVectorSection,
    VectorEnd,
};

use crate::{
    DrawSink, HighlightEngine, HighlightEngineBuilder, ItemRef, NetworkKind, SectionRef,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

const STRAIGHT_100: SectionIndex = SectionIndex(1);
const CURVE_R200_A30: SectionIndex = SectionIndex(2);

fn at(x: f32, z: f32) -> WorldLocation {
    WorldLocation::new(0, 0, x, 0.0, z)
}

fn approx(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

fn catalog() -> SectionCatalog {
    [
        TrackSection::straight(STRAIGHT_100, 1.5, 100.0),
        TrackSection::curved(CURVE_R200_A30, 1.5, 200.0, 30.0),
    ]
    .into_iter()
    .collect()
}

/// Handles into the networks built by [`networks`].
///
/// ```text
/// rail:  w(end) ─v1─ j(junction) ─v2─ e(end)       along x = 0, z 0 → 200
/// road:  rw(end) ─road_line─ re(end)               along x = 30, z 0 → 100
/// ```
#[allow(dead_code)]
struct Route {
    w:           NodeIndex,
    j:           NodeIndex,
    e:           NodeIndex,
    v1:          NodeIndex,
    v2:          NodeIndex,
    road_line:   NodeIndex,
    signal_fwd:  ItemIndex,
    signal_back: ItemIndex,
    platform:    ItemIndex,
    limit:       ItemIndex,
    empty:       ItemIndex,
    spawner:     ItemIndex,
}

fn networks() -> (TrackDb, TrackDb, Route) {
    let mut rail = TrackDbBuilder::new();
    let w = rail.add_end_node(at(0.0, 0.0));
    let j = rail.add_junction(at(0.0, 100.0));
    let e = rail.add_end_node(at(0.0, 200.0));
    let v1 = rail.add_vector_node(vec![TrackVectorSection::new(STRAIGHT_100, at(0.0, 0.0), 0.0)]);
    let v2 = rail.add_vector_node(vec![TrackVectorSection::new(STRAIGHT_100, at(0.0, 100.0), 0.0)]);
    rail.connect(v1, VectorEnd::Start, w);
    rail.connect(v1, VectorEnd::End, j);
    rail.connect(v2, VectorEnd::Start, j);
    rail.connect(v2, VectorEnd::End, e);

    let signal_fwd = rail.add_item(TrItem::new(ItemId(10), at(0.0, 30.0), ItemKind::Signal { direction: 0 }));
    let signal_back = rail.add_item(TrItem::new(ItemId(11), at(0.0, 60.0), ItemKind::Signal { direction: 1 }));
    let platform = rail.add_item(TrItem::new(ItemId(12), at(2.0, 150.0), ItemKind::Platform).with_name("Central"));
    let limit = rail.add_item(TrItem::new(
        ItemId(13),
        at(0.0, 120.0),
        ItemKind::SpeedPost { value: 60.0, is_limit: true, is_milepost: false },
    ));
    let empty = rail.add_item(TrItem::new(ItemId(14), at(0.0, 5.0), ItemKind::Empty));
    rail.attach_item(v1, signal_fwd);
    rail.attach_item(v1, signal_back);
    rail.attach_item(v2, platform);
    rail.attach_item(v2, limit);

    let mut road = TrackDbBuilder::new();
    let rw = road.add_end_node(at(30.0, 0.0));
    let re = road.add_end_node(at(30.0, 100.0));
    let road_line = road.add_vector_node(vec![TrackVectorSection::new(STRAIGHT_100, at(30.0, 0.0), 0.0)]);
    road.connect(road_line, VectorEnd::Start, rw);
    road.connect(road_line, VectorEnd::End, re);
    let spawner = road.add_item(TrItem::new(ItemId(0), at(30.0, 50.0), ItemKind::CarSpawner));
    road.attach_item(road_line, spawner);

    let route = Route {
        w, j, e, v1, v2, road_line, signal_fwd, signal_back, platform, limit, empty, spawner,
    };
    (rail.build(), road.build(), route)
}

fn engine() -> (HighlightEngine, Route) {
    let (rail, road, route) = networks();
    let engine = HighlightEngineBuilder::new(rail, catalog()).road(road).build().unwrap();
    (engine, route)
}

/// Records everything drawn; optionally hides anything at `x >= max_x`.
#[derive(Default)]
struct Recorder {
    max_x:     Option<f32>,
    sections:  Vec<SectionRef>,
    junctions: Vec<NodeIndex>,
    end_nodes: Vec<(NodeIndex, f32)>,
    items:     Vec<(ItemRef, f32)>,
}

impl DrawSink for Recorder {
    fn is_visible(&self, location: WorldLocation) -> bool {
        self.max_x.is_none_or(|m| location.x < m)
    }

    fn on_section(&mut self, section: SectionRef, _: &TrackVectorSection, _: &TrackSection) {
        self.sections.push(section);
    }

    fn on_junction(&mut self, node: &tv_track::TrackNode) {
        self.junctions.push(node.index);
    }

    fn on_end_node(&mut self, node: &tv_track::TrackNode, angle: f32) {
        self.end_nodes.push((node.index, angle));
    }

    fn on_item(&mut self, item: ItemRef, _: &TrItem, angle: f32) {
        self.items.push((item, angle));
    }
}

// ── Closest trackers ──────────────────────────────────────────────────────────

#[cfg(test)]
mod closest {
    use super::*;
    use crate::{Closest, ClosestItem, ClosestTrack};

    fn item(i: u32) -> ItemRef {
        ItemRef { network: NetworkKind::Rail, item: ItemIndex(i) }
    }

    #[test]
    fn empty_tracker() {
        let t = ClosestItem::new();
        assert!(t.is_empty());
        assert_eq!(t.best(), None);
        assert_eq!(t.distance_squared(), f32::INFINITY);
        assert!(!t.is_closer_than(&ClosestItem::new()));
    }

    #[test]
    fn keeps_smallest_in_any_order() {
        let candidates = [(10.0, item(0)), (3.0, item(1)), (7.0, item(2))];
        let orders = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
        for order in orders {
            let mut t = ClosestItem::new();
            for i in order {
                let (d, c) = candidates[i];
                t.offer(d, c);
            }
            assert_eq!(t.best(), Some(item(1)), "order {order:?}");
            assert_eq!(t.distance_squared(), 3.0);
        }
    }

    #[test]
    fn check_distance_uses_xz_only() {
        let mut t = ClosestItem::new();
        let query = at(0.0, 0.0);
        assert!(t.check_distance(WorldLocation::new(0, 0, 3.0, 500.0, 4.0), query, item(0)));
        assert_eq!(t.distance_squared(), 25.0);
        // Same point on a neighbouring tile's coordinates.
        assert!(!t.check_distance(WorldLocation::new(1, 0, 3.0 - 2048.0, 0.0, 4.0), query, item(1)));
        assert_eq!(t.best(), Some(item(0)));
    }

    #[test]
    fn reset_then_single_check_keeps_it() {
        let mut t = ClosestItem::new();
        t.offer(0.5, item(9));
        t.reset();
        assert!(t.offer(1_000.0, item(4)));
        assert_eq!(t.best(), Some(item(4)));
    }

    #[test]
    fn ties_never_replace() {
        let mut t = ClosestItem::new();
        assert!(t.offer(4.0, item(1)));
        assert!(!t.offer(4.0, item(1)));
        assert!(!t.offer(4.0, item(2)));
        assert_eq!(t.best(), Some(item(1)));
    }

    #[test]
    fn nan_is_ignored() {
        let mut t = ClosestItem::new();
        assert!(!t.offer(f32::NAN, item(1)));
        assert!(t.is_empty());
    }

    #[test]
    fn preloaded_cannot_be_beaten() {
        let mut t = Closest::preloaded(item(3));
        assert_eq!(t.distance_squared(), 0.0);
        assert!(!t.offer(0.0, item(4)));
        assert!(t.is_closer_than(&ClosestItem::new()));
        let mut other = ClosestItem::new();
        other.offer(0.0, item(5));
        assert!(!t.is_closer_than(&other));
    }

    #[test]
    fn section_distance_is_to_geometry() {
        let shape = TrackSection::straight(STRAIGHT_100, 1.5, 100.0);
        let placed = TrackVectorSection::new(STRAIGHT_100, at(0.0, 0.0), 0.0);
        let candidate = SectionRef { network: NetworkKind::Rail, node: NodeIndex(0), section: 0 };
        let mut t = ClosestTrack::new();
        assert!(t.check_section(&shape, &placed, at(3.0, 50.0), candidate));
        assert!(approx(t.distance_squared(), 9.0, 1e-3));
    }
}

// ── Orientation caches ────────────────────────────────────────────────────────

#[cfg(test)]
mod orientation {
    use std::f32::consts::{FRAC_PI_6, PI};

    use tv_core::{LocateTolerance, ViewerConfig};

    use super::*;
    use crate::OrientationCache;

    #[test]
    fn signals_face_their_flag() {
        let (rail, _, _) = networks();
        let cache = OrientationCache::build(&rail, &catalog(), LocateTolerance::default());
        assert_eq!(cache.signal_count(), 2);
        assert!(approx(cache.signal_angle(ItemId(10)), 0.0, 1e-5));
        assert!(approx(cache.signal_angle(ItemId(11)).abs(), PI, 1e-5));
        // Not a signal, and unknown ids.
        assert_eq!(cache.signal_angle(ItemId(12)), 0.0);
        assert_eq!(cache.signal_angle(ItemId(999)), 0.0);
    }

    #[test]
    fn end_nodes_take_touching_section_heading() {
        let catalog = catalog();
        let mut b = TrackDbBuilder::new();
        let head = b.add_end_node(at(0.0, 0.0));
        let tail = b.add_end_node(at(0.0, 0.0)); // position is irrelevant here
        let straight = b.add_vector_node(vec![TrackVectorSection::new(STRAIGHT_100, at(0.0, 0.0), 1.2)]);
        let curve = b.add_vector_node(vec![TrackVectorSection::new(CURVE_R200_A30, at(50.0, 0.0), 0.0)]);
        b.connect(straight, VectorEnd::Start, head);
        b.connect(curve, VectorEnd::End, tail);
        let cache = OrientationCache::build(&b.build(), &catalog, LocateTolerance::default());

        assert_eq!(cache.end_node_count(), 2);
        assert!(approx(cache.end_node_angle(head), 1.2, 1e-6));
        assert!(approx(cache.end_node_angle(tail), FRAC_PI_6, 1e-5));
        assert_eq!(cache.end_node_angle(straight), 0.0);
    }

    #[test]
    fn unresolvable_geometry_defaults_to_zero() {
        let mut b = TrackDbBuilder::new();
        let lonely = b.add_end_node(at(0.0, 0.0));
        let end = b.add_end_node(at(0.0, 100.0));
        let line = b.add_vector_node(vec![TrackVectorSection::new(SectionIndex(77), at(0.0, 0.0), 0.7)]);
        b.connect(line, VectorEnd::End, end);
        let sig = b.add_item(TrItem::new(ItemId(1), at(0.0, 10.0), ItemKind::Signal { direction: 0 }));
        b.attach_item(line, sig);
        let cache = OrientationCache::build(&b.build(), &catalog(), LocateTolerance::default());

        assert_eq!(cache.signal_count(), 1);
        assert_eq!(cache.signal_angle(ItemId(1)), 0.0);
        assert_eq!(cache.end_node_angle(end), 0.0);
        assert_eq!(cache.end_node_angle(lonely), 0.0);
    }

    #[test]
    fn signal_placement_follows_configured_tolerance() {
        // The signal stands 4 m beside a straight heading 0.5 rad.
        let heading = 0.5_f32;
        let mut b = TrackDbBuilder::new();
        let line = b.add_vector_node(vec![TrackVectorSection::new(STRAIGHT_100, at(0.0, 0.0), heading)]);
        let beside = at(0.0, 0.0).offset_by(
            heading.sin() * 40.0 + heading.cos() * 4.0,
            heading.cos() * 40.0 - heading.sin() * 4.0,
        );
        let sig = b.add_item(TrItem::new(ItemId(3), beside, ItemKind::Signal { direction: 0 }));
        b.attach_item(line, sig);
        let rail = b.build();

        let strict = OrientationCache::build(&rail, &catalog(), LocateTolerance::default());
        assert_eq!(strict.signal_angle(ItemId(3)), 0.0);

        let mut config = ViewerConfig::default();
        config.locate.max_centerline_offset = 10.0;
        let engine = HighlightEngineBuilder::new(rail, catalog()).config(config).build().unwrap();
        let angle = engine.orientation(NetworkKind::Rail).signal_angle(ItemId(3));
        assert!(approx(angle, heading, 1e-4), "{angle}");
    }
}

// ── Frame pass ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod pass {
    use std::f32::consts::PI;

    use tv_core::DrawSettings;

    use super::*;
    use crate::{FrameStats, NoopSink, item_visible};

    #[test]
    fn default_settings_frame() {
        let (mut engine, route) = engine();
        let mut sink = Recorder::default();
        let stats = engine.frame(at(0.0, 0.0), &mut sink);

        assert_eq!(stats, FrameStats { sections: 3, point_nodes: 3, items: 3 });
        assert_eq!(sink.junctions, vec![route.j]);
        assert_eq!(sink.end_nodes.len(), 2);
        let drawn: Vec<ItemIndex> = sink.items.iter().map(|(i, _)| i.item).collect();
        assert_eq!(drawn, vec![route.signal_fwd, route.signal_back, route.platform]);
        let back_angle = sink.items[1].1;
        assert!(approx(back_angle.abs(), PI, 1e-5));
    }

    #[test]
    fn hidden_roads_are_not_drawn_or_tracked() {
        let (mut engine, _) = engine();
        engine.config_mut().draw.draw_roads = false;
        let mut sink = Recorder::default();
        engine.frame(at(30.0, 50.0), &mut sink);
        assert!(sink.sections.iter().all(|s| s.network == NetworkKind::Rail));
        assert!(engine.trackers().road_track.is_empty());
        assert!(!engine.trackers().rail_track.is_empty());
    }

    #[test]
    fn road_items_need_their_classes() {
        let (mut engine, route) = engine();
        engine.config_mut().draw.show_car_spawners = true;
        let mut sink = Recorder::default();
        engine.frame(at(30.0, 50.0), &mut sink);
        assert!(sink.items.iter().any(|(i, _)| i.network == NetworkKind::Road && i.item == route.spawner));
        assert_eq!(engine.trackers().item.best(), Some(ItemRef { network: NetworkKind::Road, item: route.spawner }));
    }

    #[test]
    fn invisible_elements_are_skipped() {
        let (mut engine, _) = engine();
        let mut sink = Recorder { max_x: Some(10.0), ..Recorder::default() };
        engine.frame(at(30.0, 50.0), &mut sink);
        assert!(sink.sections.iter().all(|s| s.network == NetworkKind::Rail));
        assert!(engine.trackers().road_track.is_empty());
    }

    #[test]
    fn trackers_are_reset_each_frame() {
        let (mut engine, route) = engine();
        engine.frame(at(0.0, 10.0), &mut NoopSink);
        assert_eq!(engine.trackers().rail_track.best().map(|s| s.node), Some(route.v1));
        engine.frame(at(0.0, 190.0), &mut NoopSink);
        assert_eq!(engine.trackers().rail_track.best().map(|s| s.node), Some(route.v2));
    }

    #[test]
    fn item_visibility_rules() {
        let none = DrawSettings {
            show_signals: false,
            show_platform_markers: false,
            show_siding_markers: false,
            show_crossings: false,
            ..DrawSettings::default()
        };
        let all = DrawSettings::all();
        let limit = ItemKind::SpeedPost { value: 80.0, is_limit: true, is_milepost: false };
        let milepost = ItemKind::SpeedPost { value: 12.5, is_limit: false, is_milepost: true };

        assert!(!item_visible(&ItemKind::Empty, &all, true));
        assert!(!item_visible(&ItemKind::Crossover, &all, true));
        assert!(!item_visible(&ItemKind::Hazard, &none, false));
        assert!(item_visible(&ItemKind::Hazard, &none, true));
        assert!(item_visible(&ItemKind::Signal { direction: 0 }, &DrawSettings::default(), false));

        let limits_only = DrawSettings { show_speed_limits: true, ..none.clone() };
        assert!(item_visible(&limit, &limits_only, false));
        assert!(!item_visible(&milepost, &limits_only, false));
        let mileposts_only = DrawSettings { show_mileposts: true, ..none };
        assert!(item_visible(&milepost, &mileposts_only, false));
        assert!(!item_visible(&limit, &mileposts_only, false));
    }
}

// ── Highlight engine ──────────────────────────────────────────────────────────

#[cfg(test)]
mod engine {
    use tv_core::ViewerConfig;

    use super::*;
    use crate::{HighlightError, HighlightedFeature, NoopSink, PointNodeRef};

    fn frame(engine: &mut HighlightEngine, x: f32, z: f32) {
        engine.frame(at(x, z), &mut NoopSink);
    }

    #[test]
    fn closest_rail_and_item() {
        let (mut engine, route) = engine();
        frame(&mut engine, 1.0, 150.0);
        let h = engine.highlights(true);
        assert_eq!(h.track, Some(SectionRef { network: NetworkKind::Rail, node: route.v2, section: 0 }));
        assert_eq!(h.hot_section, None);
        assert_eq!(
            h.feature,
            Some(HighlightedFeature::Item(ItemRef { network: NetworkKind::Rail, item: route.platform }))
        );
    }

    #[test]
    fn road_wins_when_closer() {
        let (mut engine, route) = engine();
        frame(&mut engine, 29.0, 50.0);
        let h = engine.highlights(true);
        assert_eq!(h.track.map(|s| (s.network, s.node)), Some((NetworkKind::Road, route.road_line)));
        // The inset only ever shows rail.
        let inset = engine.highlights(false);
        assert_eq!(inset.track.map(|s| (s.network, s.node)), Some((NetworkKind::Rail, route.v1)));
        assert_eq!(inset.feature, None);
    }

    #[test]
    fn hot_section_follows_setting() {
        let (mut engine, _) = engine();
        engine.config_mut().draw.show_vector_sections = true;
        frame(&mut engine, 1.0, 150.0);
        let h = engine.highlights(true);
        assert!(h.hot_section.is_some());
        assert_eq!(h.hot_section, h.track);
    }

    #[test]
    fn junction_when_no_item_is_closer() {
        let (mut engine, route) = engine();
        frame(&mut engine, 0.0, 99.0);
        assert_eq!(
            engine.highlights(true).feature,
            Some(HighlightedFeature::PointNode(PointNodeRef {
                network: NetworkKind::Rail,
                node:    route.j,
                kind:    tv_track::PointNodeKind::Junction,
            }))
        );
    }

    #[test]
    fn searched_vector_node_overrides_cursor() {
        let (mut engine, route) = engine();
        let centre = engine.highlight_node(NetworkKind::Rail, route.v1).unwrap();
        assert!(approx(centre.z, 50.0, 1e-4));
        assert!(engine.is_highlight_overridden());
        assert!(!engine.items_forced_visible());

        frame(&mut engine, 29.0, 190.0);
        let h = engine.highlights(true);
        assert_eq!(h.track, Some(SectionRef { network: NetworkKind::Rail, node: route.v1, section: 0 }));
        // Frame trackers stay untouched by the override.
        assert_eq!(engine.trackers().rail_track.best().map(|s| s.node), Some(route.v2));
    }

    #[test]
    fn searched_junction_beats_exact_item_hit() {
        let (mut engine, route) = engine();
        assert_eq!(engine.highlight_node(NetworkKind::Rail, route.j), Some(at(0.0, 100.0)));
        frame(&mut engine, 2.0, 150.0);
        assert!(matches!(
            engine.highlights(true).feature,
            Some(HighlightedFeature::PointNode(p)) if p.node == route.j
        ));
    }

    #[test]
    fn searched_item_forces_all_items_visible() {
        let (mut engine, route) = engine();
        assert_eq!(engine.highlight_item(NetworkKind::Rail, route.limit), Some(at(0.0, 120.0)));
        assert!(engine.items_forced_visible());

        let mut sink = Recorder::default();
        let stats = engine.frame(at(5.0, 60.0), &mut sink);
        // Speed limit and the road car spawner now drawn; the empty item never is.
        assert_eq!(stats.items, 5);
        assert!(!sink.items.iter().any(|(i, _)| i.network == NetworkKind::Rail && i.item == route.empty));
        assert_eq!(
            engine.highlights(true).feature,
            Some(HighlightedFeature::Item(ItemRef { network: NetworkKind::Rail, item: route.limit }))
        );

        engine.clear_highlight_overrides();
        assert!(!engine.is_highlight_overridden());
        assert_eq!(engine.frame(at(0.0, 0.0), &mut NoopSink).items, 3);
        assert!(matches!(
            engine.highlights(true).feature,
            Some(HighlightedFeature::PointNode(p)) if p.node == route.w
        ));
    }

    #[test]
    fn unresolvable_search_is_none() {
        let (mut engine, _) = engine();
        assert_eq!(engine.highlight_node(NetworkKind::Rail, NodeIndex(99)), None);
        assert_eq!(engine.highlight_node(NetworkKind::Road, NodeIndex::INVALID), None);
        assert_eq!(engine.highlight_item(NetworkKind::Road, ItemIndex(5)), None);
        assert!(!engine.is_highlight_overridden());
    }

    #[test]
    fn closest_tracks_matches_frame() {
        let (mut engine, route) = engine();
        let (rail, road) = engine.closest_tracks(at(1.0, 150.0));
        assert_eq!(rail.best().map(|s| s.node), Some(route.v2));
        assert!(approx(rail.distance_squared(), 1.0, 1e-3));
        assert_eq!(road.best().map(|s| s.node), Some(route.road_line));
        assert!(approx(road.distance_squared(), 29.0 * 29.0 + 50.0 * 50.0, 1e-1));

        frame(&mut engine, 1.0, 150.0);
        assert_eq!(engine.trackers().rail_track.best(), rail.best());
    }

    #[test]
    fn without_road_network() {
        let (rail, _, route) = networks();
        let mut engine = HighlightEngineBuilder::new(rail, catalog()).build().unwrap();
        frame(&mut engine, 29.0, 50.0);
        assert!(engine.network(NetworkKind::Road).is_empty());
        assert_eq!(engine.highlights(true).track.map(|s| s.node), Some(route.v1));
    }

    #[test]
    fn builder_rejects_bad_config() {
        let (rail, _, _) = networks();
        let mut config = ViewerConfig::default();
        config.locate.margin = -1.0;
        let err = HighlightEngineBuilder::new(rail, catalog()).config(config).build().err();
        assert!(matches!(err, Some(HighlightError::Config(_))));
    }
}
