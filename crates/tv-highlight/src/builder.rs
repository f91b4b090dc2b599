//! Fluent builder for constructing a [`HighlightEngine`].

use tv_core::ViewerConfig;
use tv_track::{SectionCatalog, TrackDb};

use crate::{HighlightEngine, HighlightResult};

/// Fluent builder for [`HighlightEngine`].
///
/// # Required inputs
///
/// - the rail [`TrackDb`]
/// - the [`SectionCatalog`] shared by rail and road
///
/// # Optional inputs (have defaults)
///
/// | Method        | Default                  |
/// |---------------|--------------------------|
/// | `.road(db)`   | `TrackDb::empty()`       |
/// | `.config(c)`  | `ViewerConfig::default()`|
///
/// # Example
///
/// ```rust,ignore
/// let mut engine = HighlightEngineBuilder::new(rail, catalog)
///     .road(road)
///     .config(config)
///     .build()?;
/// engine.frame(cursor, &mut NoopSink);
/// let highlights = engine.highlights(true);
/// ```
pub struct HighlightEngineBuilder {
    rail:    TrackDb,
    catalog: SectionCatalog,
    road:    Option<TrackDb>,
    config:  Option<ViewerConfig>,
}

impl HighlightEngineBuilder {
    pub fn new(rail: TrackDb, catalog: SectionCatalog) -> Self {
        Self { rail, catalog, road: None, config: None }
    }

    /// Supply the road network.  Without one, road drawing and road
    /// highlighting find nothing.
    pub fn road(mut self, road: TrackDb) -> Self {
        self.road = Some(road);
        self
    }

    pub fn config(mut self, config: ViewerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Validate the configuration, precompute signal and end-node headings
    /// for both networks, and return a ready engine.
    pub fn build(self) -> HighlightResult<HighlightEngine> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let road = self.road.unwrap_or_else(TrackDb::empty);
        let engine = HighlightEngine::assemble(self.rail, road, self.catalog, config);
        engine.log_summary();
        Ok(engine)
    }
}
