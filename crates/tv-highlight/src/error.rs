use thiserror::Error;

use tv_core::TvError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum HighlightError {
    #[error("highlight engine configuration error: {0}")]
    Config(#[from] TvError),
}

pub type HighlightResult<T> = Result<T, HighlightError>;
