//! Zoom level management and screen-to-image coordinate conversion.
//!
//! Annotations are stored in the unscaled container space (the image box at
//! zoom 1.0). [`Viewport::to_image_space`] is the only place the zoom factor
//! touches incoming coordinates; storing post-zoom positions would make
//! every annotation drift when the zoom changes.

use crate::constants::zoom;
use crate::geometry::Point;

/// Zoom bounds and step factors.
///
/// The defaults mirror the stock interaction feel; embedders with different
/// magnification needs can swap them per session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomPolicy {
    /// Lowest allowed zoom level.
    pub min: f32,
    /// Highest allowed zoom level.
    pub max: f32,
    /// Multiplicative step for zoom in/out commands.
    pub step: f32,
    /// Factor applied per wheel tick towards the image.
    pub wheel_in: f32,
    /// Factor applied per wheel tick away from the image.
    pub wheel_out: f32,
}

impl Default for ZoomPolicy {
    fn default() -> Self {
        Self {
            min: zoom::MIN,
            max: zoom::MAX,
            step: zoom::STEP,
            wheel_in: zoom::WHEEL_IN,
            wheel_out: zoom::WHEEL_OUT,
        }
    }
}

impl ZoomPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the allowed zoom range.
    pub fn with_bounds(mut self, min: f32, max: f32) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Set the step factor for zoom commands.
    pub fn with_step(mut self, step: f32) -> Self {
        self.step = step;
        self
    }

    /// Set the per-tick wheel factors.
    pub fn with_wheel_factors(mut self, wheel_in: f32, wheel_out: f32) -> Self {
        self.wheel_in = wheel_in;
        self.wheel_out = wheel_out;
        self
    }
}

/// Current zoom level plus the policy bounding it.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    zoom: f32,
    policy: ZoomPolicy,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::with_policy(ZoomPolicy::default())
    }

    pub fn with_policy(policy: ZoomPolicy) -> Self {
        Self { zoom: 1.0, policy }
    }

    /// Current zoom level.
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn policy(&self) -> &ZoomPolicy {
        &self.policy
    }

    /// Multiply the zoom by the step factor, clamped to the maximum.
    /// Returns whether the level changed.
    pub fn zoom_in(&mut self) -> bool {
        self.set_zoom(self.zoom * self.policy.step)
    }

    /// Divide the zoom by the step factor, clamped to the minimum.
    /// Returns whether the level changed.
    pub fn zoom_out(&mut self) -> bool {
        self.set_zoom(self.zoom / self.policy.step)
    }

    /// Reset the zoom to 1.0. Returns whether the level changed.
    pub fn reset(&mut self) -> bool {
        self.set_zoom(1.0)
    }

    /// Apply one wheel tick. Inactive unless the designated modifier is
    /// held, so plain scrolling never zooms. Negative deltas (scroll up)
    /// zoom in.
    pub fn wheel_zoom(&mut self, delta: f32, modifier_held: bool) -> bool {
        if !modifier_held {
            return false;
        }
        let factor = if delta < 0.0 {
            self.policy.wheel_in
        } else {
            self.policy.wheel_out
        };
        self.set_zoom(self.zoom * factor)
    }

    /// Whether the zoom is pinned at the upper bound.
    pub fn is_max_zoom(&self) -> bool {
        self.zoom >= self.policy.max
    }

    /// Whether the zoom is pinned at the lower bound.
    pub fn is_min_zoom(&self) -> bool {
        self.zoom <= self.policy.min
    }

    /// Convert a raw screen-space position into the unscaled container
    /// space: subtract the container origin, then divide by the zoom.
    pub fn to_image_space(&self, raw: Point, container_origin: Point) -> Point {
        Point::new(
            (raw.x - container_origin.x) / self.zoom,
            (raw.y - container_origin.y) / self.zoom,
        )
    }

    fn set_zoom(&mut self, level: f32) -> bool {
        let clamped = level.clamp(self.policy.min, self.policy.max);
        if clamped == self.zoom {
            return false;
        }
        log::trace!("Zoom {:.3} -> {:.3}", self.zoom, clamped);
        self.zoom = clamped;
        true
    }
}
