//! Framework error type.
//!
//! Sub-crates define their own error enums and wrap `TvError` as one variant
//! where a core lookup failure can surface.

use thiserror::Error;

use crate::{ItemIndex, NodeIndex, SectionIndex};

/// The top-level error type for `tv-core` and a common base for sub-crates.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TvError {
    #[error("node {0} not found")]
    NodeNotFound(NodeIndex),

    #[error("item {0} not found")]
    ItemNotFound(ItemIndex),

    #[error("section {0} not present in the section catalog")]
    SectionNotFound(SectionIndex),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for all `tv-*` crates.
pub type TvResult<T> = Result<T, TvError>;
