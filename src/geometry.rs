//! Geometric predicates and coordinate transforms.
//!
//! Everything here is a pure function over [`Point`]. Hit thresholds are
//! zoom-compensated: dividing by the zoom level keeps the visual hitbox a
//! constant size on screen regardless of magnification.

use serde::{Deserialize, Serialize};

/// Squared length below which a segment is treated as a single point.
const DEGENERATE_SEGMENT_EPSILON: f32 = 0.0001;

/// A 2D point. Coordinates live in the unscaled container space unless a
/// transform states otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point.
    pub fn distance_to(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f32 {
    a.distance_to(&b)
}

/// Check whether two points are within `threshold / zoom` of each other.
pub fn is_near_point(a: Point, b: Point, threshold: f32, zoom: f32) -> bool {
    distance(a, b) <= threshold / zoom
}

/// Even-odd (ray casting) point-in-polygon test.
///
/// Casts a horizontal ray from the point and counts edge crossings; an odd
/// count means inside. Horizontal edges fail the straddle check before the
/// division, so no edge divides by zero.
pub fn point_in_polygon(point: Point, vertices: &[Point]) -> bool {
    if vertices.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let vi = vertices[i];
        let vj = vertices[j];

        if ((vi.y > point.y) != (vj.y > point.y))
            && (point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x)
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Check whether a point lies within `threshold / zoom` of the segment `ab`.
///
/// Projects the point onto the line through `a` and `b`, clamps the
/// projection parameter to `[0, 1]`, and measures the distance to that
/// closest point. A degenerate segment degrades to a point-distance test.
pub fn point_near_segment(point: Point, a: Point, b: Point, threshold: f32, zoom: f32) -> bool {
    let len_sq = (b.x - a.x).powi(2) + (b.y - a.y).powi(2);
    if len_sq < DEGENERATE_SEGMENT_EPSILON {
        return is_near_point(point, a, threshold, zoom);
    }

    let t = ((point.x - a.x) * (b.x - a.x) + (point.y - a.y) * (b.y - a.y)) / len_sq;
    let t = t.clamp(0.0, 1.0);

    let closest = Point::new(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y));
    distance(point, closest) <= threshold / zoom
}

/// Compute arrowhead geometry for the segment from `start` to `end`.
///
/// Returns `[tip, left_barb, right_barb]`: the tip is `end`, and each barb
/// sits `size` units from the tip at ±π/6 off the reversed line direction.
pub fn arrow_head(start: Point, end: Point, size: f32) -> [Point; 3] {
    let angle = (end.y - start.y).atan2(end.x - start.x);
    let barb = |offset: f32| {
        Point::new(
            end.x - size * (angle + offset).cos(),
            end.y - size * (angle + offset).sin(),
        )
    };
    [
        end,
        barb(-std::f32::consts::FRAC_PI_6),
        barb(std::f32::consts::FRAC_PI_6),
    ]
}

/// Linearly rescale a point from one coordinate space to another.
///
/// Maps unscaled-container coordinates to natural-image coordinates (or
/// back, by swapping the dimension pairs).
pub fn scale_point(point: Point, target_w: f32, target_h: f32, source_w: f32, source_h: f32) -> Point {
    Point::new(
        point.x / source_w * target_w,
        point.y / source_h * target_h,
    )
}
