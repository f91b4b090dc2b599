//! Viewer configuration.
//!
//! Typically loaded from a settings file by the application crate and passed
//! to the highlight engine when a route is opened.  Everything has a
//! `Default` matching the stock viewer behaviour.

use crate::{TvError, TvResult};

// ── LocateTolerance ───────────────────────────────────────────────────────────

/// How forgiving Traveller placement is when snapping a point onto a node's
/// section chain.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocateTolerance {
    /// Largest accepted distance between the target and the section centre
    /// line, in metres.
    pub max_centerline_offset: f32,

    /// How far before the start or past the end of a section the target may
    /// project and still belong to it, in metres.
    pub margin: f32,
}

impl Default for LocateTolerance {
    fn default() -> Self {
        Self { max_centerline_offset: 2.5, margin: 0.5 }
    }
}

// ── DrawSettings ──────────────────────────────────────────────────────────────

/// Which feature classes take part in a draw pass.  Hidden features are
/// neither drawn nor considered for highlighting.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DrawSettings {
    pub draw_roads:            bool,
    pub show_junction_nodes:   bool,
    pub show_end_nodes:        bool,
    /// Hot-light the single closest vector section inside the highlighted node.
    pub show_vector_sections:  bool,

    pub show_signals:          bool,
    pub show_speed_limits:     bool,
    pub show_mileposts:        bool,
    pub show_platform_markers: bool,
    pub show_siding_markers:   bool,
    pub show_crossings:        bool,
    pub show_road_crossings:   bool,
    pub show_hazards:          bool,
    pub show_pickups:          bool,
    pub show_car_spawners:     bool,
    pub show_sound_regions:    bool,
}

impl Default for DrawSettings {
    fn default() -> Self {
        Self {
            draw_roads:            true,
            show_junction_nodes:   true,
            show_end_nodes:        true,
            show_vector_sections:  false,
            show_signals:          true,
            show_speed_limits:     false,
            show_mileposts:        false,
            show_platform_markers: true,
            show_siding_markers:   true,
            show_crossings:        true,
            show_road_crossings:   false,
            show_hazards:          false,
            show_pickups:          false,
            show_car_spawners:     false,
            show_sound_regions:    false,
        }
    }
}

impl DrawSettings {
    /// Everything switched on.  Handy for tests and for "show all" menus.
    pub fn all() -> Self {
        Self {
            draw_roads:            true,
            show_junction_nodes:   true,
            show_end_nodes:        true,
            show_vector_sections:  true,
            show_signals:          true,
            show_speed_limits:     true,
            show_mileposts:        true,
            show_platform_markers: true,
            show_siding_markers:   true,
            show_crossings:        true,
            show_road_crossings:   true,
            show_hazards:          true,
            show_pickups:          true,
            show_car_spawners:     true,
            show_sound_regions:    true,
        }
    }
}

// ── ViewerConfig ──────────────────────────────────────────────────────────────

/// Top-level configuration of one viewer session.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewerConfig {
    pub locate: LocateTolerance,
    pub draw:   DrawSettings,
}

impl ViewerConfig {
    /// Reject tolerances that would make Traveller placement meaningless.
    pub fn validate(&self) -> TvResult<()> {
        let LocateTolerance { max_centerline_offset, margin } = self.locate;
        if !max_centerline_offset.is_finite() || max_centerline_offset < 0.0 {
            return Err(TvError::Config(format!(
                "max_centerline_offset must be a non-negative number, got {max_centerline_offset}"
            )));
        }
        if !margin.is_finite() || margin < 0.0 {
            return Err(TvError::Config(format!(
                "locate margin must be a non-negative number, got {margin}"
            )));
        }
        Ok(())
    }
}
