//! trackview-demo — exercise the trackview geometry and highlight engine on
//! a small synthetic route.
//!
//! Usage: `trackview-demo [LOG_SPEC]`, where `LOG_SPEC` is a flexi_logger
//! specification such as `debug` or `info,tv_highlight=trace`.

mod network;

use anyhow::Result;
use flexi_logger::{LogSpecBuilder, LogSpecification, Logger, LoggerHandle};
use log::{LevelFilter, info};

use tv_core::{TILE_SIZE, ViewerConfig, WorldLocation};
use tv_highlight::{
    DrawSink, HighlightEngine, HighlightEngineBuilder, HighlightedFeature, ItemRef, NetworkKind,
    SectionRef,
};
use tv_track::{TrItem, TrackNode, TrackSection, TrackVectorSection, Traveller, TravellerDirection};

use network::{Landmarks, build_catalog, build_networks};

// ── Constants ─────────────────────────────────────────────────────────────────

const VIEW_HALF_EXTENT: f32 = 400.0;
const WALK_STEP:        f32 = 50.0;

// ── Logging ───────────────────────────────────────────────────────────────────

fn start_logger(spec: Option<&str>) -> Result<LoggerHandle> {
    let spec = match spec {
        Some(s) => LogSpecification::parse(s)?,
        None => {
            let mut builder = LogSpecBuilder::new();
            let _ = builder.default(LevelFilter::Info);
            builder.finalize()
        }
    };
    Ok(Logger::with(spec).log_to_stderr().start()?)
}

// ── Draw sink ─────────────────────────────────────────────────────────────────

/// Square view around a centre point that only counts what it would draw.
struct Viewport {
    centre:    WorldLocation,
    sections:  usize,
    junctions: usize,
    end_nodes: usize,
    items:     usize,
}

impl Viewport {
    fn new(centre: WorldLocation) -> Self {
        Self { centre, sections: 0, junctions: 0, end_nodes: 0, items: 0 }
    }
}

impl DrawSink for Viewport {
    fn is_visible(&self, location: WorldLocation) -> bool {
        let local = location.normalized_to(self.centre.tile_x, self.centre.tile_z);
        (local.x - self.centre.x).abs() <= VIEW_HALF_EXTENT
            && (local.z - self.centre.z).abs() <= VIEW_HALF_EXTENT
    }

    fn on_section(&mut self, _: SectionRef, _: &TrackVectorSection, _: &TrackSection) {
        self.sections += 1;
    }

    fn on_junction(&mut self, _: &TrackNode) {
        self.junctions += 1;
    }

    fn on_end_node(&mut self, _: &TrackNode, _: f32) {
        self.end_nodes += 1;
    }

    fn on_item(&mut self, _: ItemRef, _: &TrItem, _: f32) {
        self.items += 1;
    }
}

// ── Reporting ─────────────────────────────────────────────────────────────────

fn describe_feature(engine: &HighlightEngine, feature: Option<HighlightedFeature>) -> String {
    match feature {
        None => "-".to_string(),
        Some(HighlightedFeature::PointNode(p)) => format!("{} {}", p.kind.name(), p.node),
        Some(HighlightedFeature::Item(ItemRef { network, item })) => {
            match engine.network(network).item(item) {
                Some(data) => format!(
                    "{network} {} {}",
                    data.kind.name(),
                    data.name.as_deref().unwrap_or("(unnamed)")
                ),
                None => format!("{network} {item}"),
            }
        }
    }
}

fn describe_track(track: Option<SectionRef>) -> String {
    match track {
        Some(s) => format!("{} {} section {}", s.network, s.node, s.section),
        None => "-".to_string(),
    }
}

fn show_frame(engine: &mut HighlightEngine, label: &str, cursor: WorldLocation) {
    let mut view = Viewport::new(cursor);
    engine.frame(cursor, &mut view);
    let highlights = engine.highlights(true);
    println!(
        "{label:<22} {:>4} {:>4} {:>4} {:>4}   {:<32} {}",
        view.sections,
        view.junctions,
        view.end_nodes,
        view.items,
        describe_track(highlights.track),
        describe_feature(engine, highlights.feature),
    );
}

/// Walk a traveller from the west end of the main line until it stops.
fn walk_main_line(engine: &HighlightEngine, landmarks: &Landmarks) -> Result<()> {
    let rail = engine.network(NetworkKind::Rail);
    let mut traveller = Traveller::new(rail, engine.catalog(), landmarks.main1, TravellerDirection::Forward)?;
    println!("{:<8} {:<12} {:<40} {:>8}", "Step", "Node", "Location", "Heading");
    println!("{}", "-".repeat(72));
    for step in 0.. {
        println!(
            "{step:<8} {:<12} {:<40} {:>8.3}",
            traveller.node().to_string(),
            traveller.location().to_string(),
            traveller.rot_y().to_degrees(),
        );
        let left = traveller.move_by(WALK_STEP);
        if left > 0.0 {
            println!("stopped at {} with {left:.1} m left", traveller.node());
            break;
        }
    }
    Ok(())
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let spec = std::env::args().nth(1);
    let _logger = start_logger(spec.as_deref())?;

    println!("=== trackview-demo ===");

    // 1. Networks.
    let catalog = build_catalog();
    let (rail, road, landmarks) = build_networks(&catalog);
    if let Some(b) = rail.extreme_tiles() {
        println!(
            "Rail: {} node slots, {} items, tiles x {}..={} z {}..={} (tile size {TILE_SIZE} m)",
            rail.node_slots(),
            rail.item_count(),
            b.min_tile_x,
            b.max_tile_x,
            b.min_tile_z,
            b.max_tile_z,
        );
    }
    println!("Road: {} node slots, {} items", road.node_slots(), road.item_count());
    for (name, location) in rail.siding_locations() {
        println!("  siding   {name:<12} {location}");
    }
    for (name, location) in rail.platform_locations() {
        println!("  platform {name:<12} {location}");
    }
    println!();

    // 2. Engine.
    let mut config = ViewerConfig::default();
    config.draw.show_vector_sections = true;
    config.draw.show_speed_limits = true;
    config.draw.show_road_crossings = true;
    let mut engine = HighlightEngineBuilder::new(rail, catalog).road(road).config(config).build()?;
    info!("engine ready");

    let rail_orientation = engine.orientation(NetworkKind::Rail);
    println!(
        "Orientation: {} signals, {} end nodes; west end faces {:.1}°",
        rail_orientation.signal_count(),
        rail_orientation.end_node_count(),
        rail_orientation.end_node_angle(landmarks.west_end).to_degrees(),
    );
    println!();

    // 3. Traveller.
    walk_main_line(&engine, &landmarks)?;
    println!();

    // 4. Cursor frames.
    println!(
        "{:<22} {:>4} {:>4} {:>4} {:>4}   {:<32} {}",
        "Cursor", "sec", "jn", "end", "item", "Track", "Feature"
    );
    println!("{}", "-".repeat(96));
    let cursors = [
        ("near west end", WorldLocation::new(0, 0, 3.0, 0.0, 905.0)),
        ("level crossing", WorldLocation::new(0, 0, 1.0, 0.0, 1001.0)),
        ("on the street", WorldLocation::new(0, 0, -60.0, 0.0, 1002.0)),
        ("junction", WorldLocation::new(0, 1, 0.5, 0.0, -947.0)),
        ("goods branch", WorldLocation::new(0, 1, 25.0, 0.0, -820.0)),
        ("beside the platform", WorldLocation::new(0, 1, 4.0, 0.0, -801.0)),
    ];
    for (label, cursor) in cursors {
        show_frame(&mut engine, label, cursor);
    }
    println!();

    // 5. Search override.
    let far_away = WorldLocation::new(0, 0, 0.0, 0.0, 905.0);
    if let Some(centre) = engine.highlight_item(NetworkKind::Rail, landmarks.siding) {
        println!("Search: siding -> recenter on {centre}");
        show_frame(&mut engine, "searched siding", far_away);
    }
    if let Some(centre) = engine.highlight_node(NetworkKind::Rail, landmarks.branch) {
        println!("Search: branch -> recenter on {centre}");
        show_frame(&mut engine, "searched branch", far_away);
    }
    engine.clear_highlight_overrides();
    show_frame(&mut engine, "override cleared", far_away);
    println!();

    // 6. Status query.
    let probe = WorldLocation::new(0, 0, -20.0, 0.0, 1010.0);
    let (rail_track, road_track) = engine.closest_tracks(probe);
    println!(
        "Status at {probe}: rail {} at {:.1} m, road {} at {:.1} m",
        describe_track(rail_track.best()),
        rail_track.distance_squared().sqrt(),
        describe_track(road_track.best()),
        road_track.distance_squared().sqrt(),
    );
    if let Some(location) = engine.network(NetworkKind::Rail).node_location(landmarks.junction) {
        println!("Junction {} sits at {}", landmarks.junction, location.normalize());
    }

    Ok(())
}
