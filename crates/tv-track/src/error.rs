//! Track-subsystem error type.

use thiserror::Error;

use tv_core::{NodeIndex, TvError, WorldLocation};

/// Errors produced when a [`Traveller`](crate::Traveller) cannot be placed.
///
/// Geometry lookups themselves never fail with an error; they return `None`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TrackError {
    #[error(transparent)]
    Core(#[from] TvError),

    #[error("node {0} is not a vector node")]
    NotAVectorNode(NodeIndex),

    #[error("vector node {0} has no sections")]
    EmptyVectorNode(NodeIndex),

    #[error("cannot resolve {location} onto node {node}")]
    CannotLocate { node: NodeIndex, location: WorldLocation },
}

pub type TrackResult<T> = Result<T, TrackError>;
