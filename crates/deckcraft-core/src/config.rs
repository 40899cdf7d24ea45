//! Editor configuration.

use crate::error::DeckResult;
use crate::graphics::GraphicStyle;
use serde::{Deserialize, Serialize};

/// Lowest zoom accepted, whatever the configuration asks for. Keeps the
/// zoom-scaled hit tolerance finite.
pub const MIN_ZOOM_FLOOR: f64 = 1e-3;

/// Tunable constants for the editing core.
///
/// Missing fields fall back to their defaults when loaded from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Handle hit radius in slide units at zoom 1.0.
    pub handle_tolerance: f64,
    /// Distance from the top edge to the rotator handle.
    pub rotator_offset: f64,
    /// Rotation snap step in degrees (Shift while rotating).
    pub rotation_snap_degrees: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Slide drawing surface size.
    pub slide_width: f64,
    pub slide_height: f64,
    /// Size given to a textbox created by a click without drag.
    pub textbox_width: f64,
    pub textbox_height: f64,
    pub font_size: f64,
    /// Style applied to newly drawn graphics.
    pub default_style: GraphicStyle,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            handle_tolerance: 8.0,
            rotator_offset: 25.0,
            rotation_snap_degrees: 15.0,
            min_zoom: 0.1,
            max_zoom: 10.0,
            slide_width: 1600.0,
            slide_height: 900.0,
            textbox_width: 240.0,
            textbox_height: 48.0,
            font_size: 24.0,
            default_style: GraphicStyle::default(),
        }
    }
}

impl EditorConfig {
    /// Parse a configuration from JSON. The zoom range is normalized with
    /// [`zoom_range`](Self::zoom_range).
    pub fn from_json(json: &str) -> DeckResult<Self> {
        let mut config: Self = serde_json::from_str(json)?;
        (config.min_zoom, config.max_zoom) = config.zoom_range();
        Ok(config)
    }

    /// The usable `(min, max)` zoom range: `min` is at least
    /// [`MIN_ZOOM_FLOOR`] and `max` is never below `min`.
    pub fn zoom_range(&self) -> (f64, f64) {
        let min = if self.min_zoom.is_finite() {
            self.min_zoom.max(MIN_ZOOM_FLOOR)
        } else {
            MIN_ZOOM_FLOOR
        };
        let max = if self.max_zoom.is_nan() { min } else { self.max_zoom.max(min) };
        (min, max)
    }

    /// Clamp a zoom level into the configured range.
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        let (min, max) = self.zoom_range();
        zoom.clamp(min, max)
    }
}
