//! `tv-track` — section geometry, network graph, and traversal.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`section`]   | `TrackSection`, `TrackVectorSection`, `SectionCatalog`    |
//! | [`network`]   | `TrackDb` (node arena + item table), `TrackDbBuilder`     |
//! | [`item`]      | `TrItem`, `ItemKind`                                      |
//! | [`traveller`] | `Traveller`, `TravellerDirection`                         |
//! | [`error`]     | `TrackError`, `TrackResult<T>`                            |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public data types.      |

pub mod error;
pub mod item;
pub mod network;
pub mod section;
pub mod traveller;


pub use error::{TrackError, TrackResult};
pub use item::{ItemKind, TrItem};
pub use network::{
    Pin, PointNodeKind, TileBounds, TrackDb, TrackDbBuilder, TrackNode, TrackNodeKind, VectorEnd,
    VectorNode,
};
pub use section::{Projection, SectionCatalog, SectionShape, TrackSection, TrackVectorSection};
pub use traveller::{Traveller, TravellerDirection};
