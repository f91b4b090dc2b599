//! `tv-core` — foundational types for the `trackview` network geometry engine.
//!
//! This crate is a dependency of every other `tv-*` crate.  It has no `tv-*`
//! dependencies and a single mandatory external one (`thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module     | Contents                                                  |
//! |------------|-----------------------------------------------------------|
//! | [`ids`]    | `NodeIndex`, `ItemIndex`, `ItemId`, `SectionIndex`        |
//! | [`world`]  | `WorldLocation`, `TILE_SIZE`, angle helpers               |
//! | [`config`] | `ViewerConfig`, `LocateTolerance`, `DrawSettings`         |
//! | [`error`]  | `TvError`, `TvResult`                                     |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod ids;
pub mod world;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{DrawSettings, LocateTolerance, ViewerConfig};
pub use error::{TvError, TvResult};
pub use ids::{ItemId, ItemIndex, NodeIndex, SectionIndex};
pub use world::{TILE_SIZE, WorldLocation, wrap_angle};
