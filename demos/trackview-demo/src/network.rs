//! Synthetic harbour-branch route.
//!
//! A rail main line runs north across the border between tiles (0,0) and
//! (0,1).  At the tile border a junction splits off a curved goods branch.
//! A road crosses the main line on tile (0,0) at a level crossing.
//!
//! ```text
//!                          e (end)
//!                          │ main2        ┌ goods (end)
//!  tile (0,1)              │          ╱ branch
//!  ─────────────────────── j (junction) ─────────────
//!  tile (0,0)              │ main1
//!   rw ═════ road ════════ ╪ ═══════════ re
//!                          │
//!                          w (end)
//! ```

use tv_core::{ItemId, ItemIndex, NodeIndex, SectionIndex, WorldLocation};
use tv_track::{
    ItemKind, SectionCatalog, TrItem, TrackDb, TrackDbBuilder, TrackSection, TrackVectorSection,
    VectorEnd,
};

const STRAIGHT_100: SectionIndex = SectionIndex(1);
const CURVE_R300_A20: SectionIndex = SectionIndex(2);
const STRAIGHT_50: SectionIndex = SectionIndex(3);

/// Handles the demo refers to by name.
pub struct Landmarks {
    pub west_end: NodeIndex,
    pub junction: NodeIndex,
    pub main1:    NodeIndex,
    pub branch:   NodeIndex,
    pub siding:   ItemIndex,
}

pub fn build_catalog() -> SectionCatalog {
    [
        TrackSection::straight(STRAIGHT_100, 1.5, 100.0),
        TrackSection::curved(CURVE_R300_A20, 1.5, 300.0, 20.0),
        TrackSection::straight(STRAIGHT_50, 1.5, 50.0),
    ]
    .into_iter()
    .collect()
}

fn on_tile(tile_z: i32, x: f32, z: f32) -> WorldLocation {
    WorldLocation::new(0, tile_z, x, 0.0, z)
}

/// Build the rail and road networks.
///
/// Returns `(rail, road, landmarks)`; both networks share [`build_catalog`].
pub fn build_networks(catalog: &SectionCatalog) -> (TrackDb, TrackDb, Landmarks) {
    let mut rail = TrackDbBuilder::with_capacity(8, 8);

    // z = 1100 on tile 0 is z = -948 on tile 1.
    let west_end = rail.add_end_node(on_tile(0, 0.0, 900.0));
    let junction = rail.add_junction(on_tile(1, 0.0, -948.0));
    let east_end = rail.add_end_node(on_tile(1, 0.0, -748.0));

    let main1 = rail.add_vector_node(vec![
        TrackVectorSection::new(STRAIGHT_100, on_tile(0, 0.0, 900.0), 0.0),
        TrackVectorSection::new(STRAIGHT_100, on_tile(0, 0.0, 1000.0), 0.0),
    ]);
    let main2 = rail.add_vector_node(vec![
        TrackVectorSection::new(STRAIGHT_100, on_tile(1, 0.0, -948.0), 0.0),
        TrackVectorSection::new(STRAIGHT_100, on_tile(1, 0.0, -848.0), 0.0),
    ]);

    // Branch: the curve's end is where the straight tail starts.
    let curve_start = TrackVectorSection::new(CURVE_R300_A20, on_tile(1, 0.0, -948.0), 0.0);
    let (tail_start, tail_heading) = match catalog.get(CURVE_R300_A20) {
        Some(curve) => (
            curve.point_at(&curve_start, curve.length()),
            curve.heading_at(&curve_start, curve.length()),
        ),
        None => (curve_start.location, 0.0),
    };
    let tail = TrackVectorSection::new(STRAIGHT_50, tail_start, tail_heading);
    let goods_end_location = catalog.point_on(&tail, 50.0).unwrap_or(tail_start);
    let goods_end = rail.add_end_node(goods_end_location);
    let branch = rail.add_vector_node(vec![curve_start, tail]);

    rail.connect(main1, VectorEnd::Start, west_end);
    rail.connect(main1, VectorEnd::End, junction);
    rail.connect(main2, VectorEnd::Start, junction);
    rail.connect(main2, VectorEnd::End, east_end);
    rail.connect(branch, VectorEnd::Start, junction);
    rail.connect(branch, VectorEnd::End, goods_end);

    let limit = rail.add_item(TrItem::new(
        ItemId(1),
        on_tile(0, 0.0, 950.0),
        ItemKind::SpeedPost { value: 80.0, is_limit: true, is_milepost: false },
    ));
    let crossing = rail.add_item(TrItem::new(ItemId(2), on_tile(0, 0.0, 1000.0), ItemKind::LevelCrossing));
    let home = rail.add_item(
        TrItem::new(ItemId(3), on_tile(0, 0.0, 1050.0), ItemKind::Signal { direction: 0 }).with_name("Home"),
    );
    let starter = rail.add_item(
        TrItem::new(ItemId(4), on_tile(1, 0.0, -900.0), ItemKind::Signal { direction: 1 }).with_name("Starter"),
    );
    let platform = rail.add_item(
        TrItem::new(ItemId(5), on_tile(1, 2.5, -800.0), ItemKind::Platform).with_name("Harbour"),
    );
    let siding_location = catalog.point_on(&tail, 25.0).unwrap_or(tail_start);
    let siding = rail.add_item(TrItem::new(ItemId(6), siding_location, ItemKind::Siding).with_name("Goods yard"));
    rail.add_item(TrItem::new(ItemId(7), on_tile(0, 0.0, 920.0), ItemKind::Empty));

    for item in [limit, crossing, home] {
        rail.attach_item(main1, item);
    }
    rail.attach_item(main2, starter);
    rail.attach_item(main2, platform);
    rail.attach_item(branch, siding);

    let mut road = TrackDbBuilder::new();
    let road_west = road.add_end_node(on_tile(0, -100.0, 1000.0));
    let road_east = road.add_end_node(on_tile(0, 100.0, 1000.0));
    let heading_east = std::f32::consts::FRAC_PI_2;
    let street = road.add_vector_node(vec![
        TrackVectorSection::new(STRAIGHT_100, on_tile(0, -100.0, 1000.0), heading_east),
        TrackVectorSection::new(STRAIGHT_100, on_tile(0, 0.0, 1000.0), heading_east),
    ]);
    road.connect(street, VectorEnd::Start, road_west);
    road.connect(street, VectorEnd::End, road_east);
    let road_crossing = road.add_item(TrItem::new(ItemId(0), on_tile(0, 0.0, 1000.0), ItemKind::RoadLevelCrossing));
    let spawner = road.add_item(TrItem::new(ItemId(1), on_tile(0, -80.0, 1000.0), ItemKind::CarSpawner));
    road.attach_item(street, road_crossing);
    road.attach_item(street, spawner);

    let landmarks = Landmarks { west_end, junction, main1, branch, siding };
    (rail.build(), road.build(), landmarks)
}
