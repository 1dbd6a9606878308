//! Engine constants and default policy values.
//!
//! Zoom bounds and hit thresholds are defaults, not contracts: the zoom
//! values seed [`crate::ZoomPolicy`] and can be overridden per session.

/// Zoom level defaults.
pub mod zoom {
    /// Minimum zoom level
    pub const MIN: f32 = 0.2;
    /// Maximum zoom level
    pub const MAX: f32 = 2.0;
    /// Step factor for zoom in/out commands
    pub const STEP: f32 = 1.2;
    /// Wheel tick factor when zooming in (scroll up)
    pub const WHEEL_IN: f32 = 1.1;
    /// Wheel tick factor when zooming out (scroll down)
    pub const WHEEL_OUT: f32 = 0.9;
}

/// Hit-testing thresholds (unscaled container pixels at zoom 1.0).
///
/// Effective radii are divided by the current zoom so the visual hitbox
/// stays the same size at any magnification.
pub mod hit {
    /// Radius around a vertex handle; also the polygon-close distance
    pub const VERTEX_RADIUS: f32 = 10.0;
    /// Distance from an arrow segment that still counts as a hit
    pub const SEGMENT_RADIUS: f32 = 5.0;
}

/// Drawing geometry defaults.
pub mod draw {
    /// Arrowhead barb length for interactive previews
    pub const ARROW_HEAD_SIZE: f32 = 10.0;
}

/// History defaults.
pub mod history {
    /// Maximum retained snapshots before the oldest entries are dropped
    pub const MAX_ENTRIES: usize = 100;
}

/// Export rendering and metadata defaults.
pub mod export {
    /// Structured document format version
    pub const VERSION: &str = "1.0.0";
    /// Stroke color for flattened annotations (RGBA)
    pub const STROKE_RGBA: [u8; 4] = [0, 255, 0, 255];
    /// Polygon fill color for flattened annotations (RGBA)
    pub const FILL_RGBA: [u8; 4] = [0, 255, 0, 51];
    /// Stroke width in natural-image pixels
    pub const STROKE_WIDTH: f32 = 2.0;
    /// Arrowhead barb length in natural-image pixels
    pub const ARROW_HEAD_LENGTH: f32 = 15.0;
}
