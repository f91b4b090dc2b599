//! `tv-highlight` — nearest-feature highlighting for the track viewer.
//!
//! # Per-frame flow
//!
//! ```text
//! engine.frame(cursor, sink):
//!   ① reset the four trackers
//!   ② draw rail/road sections, junctions, end nodes and items into `sink`,
//!      offering each one to its tracker
//! engine.highlights(do_all):
//!   ③ closest track: road if roads are drawn and closer, else rail
//!   ④ closest item if closer than the closest junction/end node, else that node
//!      (search overrides replace the matching tracker until cleared)
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                    |
//! |------------|-----------------------------------------------------------|
//! | `parallel` | `closest_tracks` scans rail and road on Rayon's pool.     |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use tv_highlight::{HighlightEngineBuilder, NetworkKind, NoopSink};
//!
//! let mut engine = HighlightEngineBuilder::new(rail, catalog).road(road).build()?;
//! engine.frame(cursor, &mut NoopSink);
//! println!("{:?}", engine.highlights(true));
//!
//! let centre = engine.highlight_item(NetworkKind::Rail, item);
//! // ...
//! engine.clear_highlight_overrides();
//! ```

pub mod builder;
pub mod closest;
pub mod engine;
pub mod error;
pub mod orientation;
pub mod pass;

#[cfg(test)]
mod tests;

pub use builder::HighlightEngineBuilder;
pub use closest::{
    Closest, ClosestItem, ClosestPointNode, ClosestTrack, ItemRef, NetworkKind, PointNodeRef,
    SectionRef, Trackers,
};
pub use engine::{HighlightEngine, HighlightedFeature, Highlights};
pub use error::{HighlightError, HighlightResult};
pub use orientation::OrientationCache;
pub use pass::{DrawSink, FramePass, FrameStats, NoopSink, item_visible};
