//! Annotation data types and identifiers.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use web_time::{SystemTime, UNIX_EPOCH};

use crate::constants::hit;
use crate::geometry::{self, Point};

/// Minimum number of vertices for a valid polygon.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Number of points in an arrow: `[tail, head]`.
pub const ARROW_POINT_COUNT: usize = 2;

const BASE36_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 9;

/// Milliseconds since the Unix epoch.
pub(crate) fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36_ALPHABET[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

/// Opaque unique identifier for an annotation.
///
/// Assigned once at creation and never reused: the creation timestamp in
/// base 36 followed by a random base-36 suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationId(String);

impl AnnotationId {
    /// Generate a fresh process-unique identifier.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let mut id = to_base36(epoch_millis());
        for _ in 0..ID_SUFFIX_LEN {
            id.push(BASE36_ALPHABET[rng.random_range(0..BASE36_ALPHABET.len())] as char);
        }
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for AnnotationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for AnnotationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The shape family of an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    /// Closed polygon; the last vertex implicitly connects to the first.
    Polygon,
    /// Directed segment from tail to head, drawn with an arrowhead.
    Arrow,
}

impl AnnotationKind {
    /// Get the display name for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            AnnotationKind::Polygon => "Polygon",
            AnnotationKind::Arrow => "Arrow",
        }
    }

    /// Get all annotation kinds.
    pub fn all() -> &'static [AnnotationKind] {
        &[AnnotationKind::Polygon, AnnotationKind::Arrow]
    }
}

/// Interaction modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Select, drag, and edit existing annotations.
    #[default]
    Select,
    /// Click vertices to draw a polygon.
    Polygon,
    /// Click tail then head to draw an arrow.
    Arrow,
}

impl Mode {
    /// Get the display name for this mode.
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Select => "Select",
            Mode::Polygon => "Polygon",
            Mode::Arrow => "Arrow",
        }
    }

    /// Get all available modes.
    pub fn all() -> &'static [Mode] {
        &[Mode::Select, Mode::Polygon, Mode::Arrow]
    }

    /// Check if this mode draws new shapes (not Select).
    pub fn is_drawing_mode(&self) -> bool {
        !matches!(self, Mode::Select)
    }
}

/// A committed annotation in unscaled container coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Unique identifier.
    pub id: AnnotationId,
    /// The shape family.
    #[serde(rename = "type")]
    pub kind: AnnotationKind,
    /// Ordered vertices; drawing order for polygons, `[tail, head]` for
    /// arrows.
    pub points: Vec<Point>,
}

impl Annotation {
    /// Create a polygon annotation. Returns `None` for fewer than three
    /// vertices.
    pub fn polygon(points: Vec<Point>) -> Option<Self> {
        if points.len() < MIN_POLYGON_VERTICES {
            return None;
        }
        Some(Self {
            id: AnnotationId::generate(),
            kind: AnnotationKind::Polygon,
            points,
        })
    }

    /// Create an arrow annotation from tail to head.
    pub fn arrow(tail: Point, head: Point) -> Self {
        Self {
            id: AnnotationId::generate(),
            kind: AnnotationKind::Arrow,
            points: vec![tail, head],
        }
    }

    /// Find the first vertex within the zoom-compensated handle radius.
    pub fn hit_test_vertex(&self, point: Point, zoom: f32) -> Option<usize> {
        self.points
            .iter()
            .position(|v| geometry::is_near_point(point, *v, hit::VERTEX_RADIUS, zoom))
    }

    /// Check whether a point hits the annotation body: the interior for
    /// polygons, the zoom-compensated segment corridor for arrows.
    pub fn hit_test_body(&self, point: Point, zoom: f32) -> bool {
        match self.kind {
            AnnotationKind::Polygon => geometry::point_in_polygon(point, &self.points),
            AnnotationKind::Arrow => {
                let &[tail, head] = self.points.as_slice() else {
                    return false;
                };
                geometry::point_near_segment(point, tail, head, hit::SEGMENT_RADIUS, zoom)
            }
        }
    }

    /// Translate every vertex by `(dx, dy)`.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        for point in &mut self.points {
            point.x += dx;
            point.y += dy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Annotation {
        Annotation::polygon(vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(50.0, 100.0),
        ])
        .expect("triangle is a valid polygon")
    }

    #[test]
    fn test_id_generation_unique() {
        let a = AnnotationId::generate();
        let b = AnnotationId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_id_generation_charset() {
        let id = AnnotationId::generate();
        assert!(!id.as_str().is_empty());
        assert!(id
            .as_str()
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()));
    }

    #[test]
    fn test_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(36 * 36 + 1), "101");
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let json = serde_json::to_string(&AnnotationKind::Polygon).expect("serialize kind");
        assert_eq!(json, "\"polygon\"");
        let json = serde_json::to_string(&AnnotationKind::Arrow).expect("serialize kind");
        assert_eq!(json, "\"arrow\"");
    }

    #[test]
    fn test_polygon_requires_three_vertices() {
        assert!(Annotation::polygon(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]).is_none());
        assert!(triangle().points.len() >= MIN_POLYGON_VERTICES);
    }

    #[test]
    fn test_arrow_point_count() {
        let arrow = Annotation::arrow(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        assert_eq!(arrow.kind, AnnotationKind::Arrow);
        assert_eq!(arrow.points.len(), ARROW_POINT_COUNT);
    }

    #[test]
    fn test_hit_test_vertex_zoom_compensated() {
        let polygon = triangle();

        // 8px from the first vertex: hit at zoom 1, miss at zoom 2
        let near = Point::new(8.0, 0.0);
        assert_eq!(polygon.hit_test_vertex(near, 1.0), Some(0));
        assert_eq!(polygon.hit_test_vertex(near, 2.0), None);
    }

    #[test]
    fn test_hit_test_body() {
        let polygon = triangle();
        assert!(polygon.hit_test_body(Point::new(50.0, 30.0), 1.0));
        assert!(!polygon.hit_test_body(Point::new(200.0, 30.0), 1.0));

        let arrow = Annotation::arrow(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        assert!(arrow.hit_test_body(Point::new(50.0, 3.0), 1.0));
        assert!(!arrow.hit_test_body(Point::new(50.0, 9.0), 1.0));
    }

    #[test]
    fn test_translate() {
        let mut arrow = Annotation::arrow(Point::new(0.0, 0.0), Point::new(10.0, 5.0));
        arrow.translate(3.0, -2.0);
        assert_eq!(arrow.points[0], Point::new(3.0, -2.0));
        assert_eq!(arrow.points[1], Point::new(13.0, 3.0));
    }

    #[test]
    fn test_annotation_serde_field_names() {
        let arrow = Annotation::arrow(Point::new(1.0, 2.0), Point::new(3.0, 4.0));
        let value = serde_json::to_value(&arrow).expect("serialize annotation");

        assert!(value.get("id").is_some());
        assert_eq!(value.get("type").and_then(|v| v.as_str()), Some("arrow"));
        assert_eq!(
            value
                .get("points")
                .and_then(|v| v.as_array())
                .map(|a| a.len()),
            Some(2)
        );
    }
}
