//! Structured JSON export of annotation sets.
//!
//! The document carries every point twice: in natural-image pixels and
//! normalized to `[0, 1]`, so consumers can overlay annotations on any
//! rendition of the image without knowing the editing container size.
//! Missing preconditions (no image bound, zero container) degrade to a
//! document with an empty annotation list, never an error.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::error::ExportError;
use crate::constants::export::VERSION;
use crate::geometry::{Point, scale_point};
use crate::model::{Annotation, AnnotationId, AnnotationKind, epoch_millis};

/// One exported vertex, in both coordinate systems.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPoint {
    /// Position in natural-image pixels.
    pub pixel_coordinates: Point,
    /// Position normalized to `[0, 1]` of the natural dimensions.
    pub normalized_coordinates: Point,
}

/// One exported annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportAnnotation {
    pub id: AnnotationId,
    #[serde(rename = "type")]
    pub kind: AnnotationKind,
    pub points: Vec<ExportPoint>,
}

/// Provenance block attached to every document this crate writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    /// Epoch milliseconds of the export.
    pub timestamp: u64,
    /// Document schema version.
    pub version: String,
    /// RFC 3339 timestamp of the export.
    pub export_date: String,
}

/// Root of the structured export format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    /// Natural width of the annotated image.
    pub image_width: u32,
    /// Natural height of the annotated image.
    pub image_height: u32,
    pub annotations: Vec<ExportAnnotation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ExportMetadata>,
}

fn metadata_now() -> ExportMetadata {
    ExportMetadata {
        timestamp: epoch_millis(),
        version: VERSION.to_string(),
        export_date: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

/// Build an export document from annotations drawn against a container.
///
/// `natural` is the image's natural pixel dimensions, `container` the
/// unscaled size of the surface the points were drawn in. When either is
/// missing or zero the annotation list is left empty; the dimensions and
/// metadata are still filled in.
pub fn build_document(
    annotations: &[Annotation],
    natural: Option<(u32, u32)>,
    container: Option<(f32, f32)>,
) -> ExportDocument {
    let (image_width, image_height) = natural.unwrap_or((0, 0));

    let scale = match (natural, container) {
        (Some((nw, nh)), Some((cw, ch))) if nw > 0 && nh > 0 && cw > 0.0 && ch > 0.0 => {
            Some((nw as f32, nh as f32, cw, ch))
        }
        _ => None,
    };
    let Some((natural_w, natural_h, container_w, container_h)) = scale else {
        log::debug!("📤 Structured export degraded to empty: no image or container bound");
        return ExportDocument {
            image_width,
            image_height,
            annotations: Vec::new(),
            metadata: Some(metadata_now()),
        };
    };

    let exported = annotations
        .iter()
        .map(|annotation| {
            let points = annotation
                .points
                .iter()
                .map(|point| {
                    let pixel =
                        scale_point(*point, natural_w, natural_h, container_w, container_h);
                    let normalized = Point::new(
                        (pixel.x / natural_w).clamp(0.0, 1.0),
                        (pixel.y / natural_h).clamp(0.0, 1.0),
                    );
                    ExportPoint {
                        pixel_coordinates: pixel,
                        normalized_coordinates: normalized,
                    }
                })
                .collect();
            ExportAnnotation {
                id: annotation.id.clone(),
                kind: annotation.kind,
                points,
            }
        })
        .collect();

    ExportDocument {
        image_width,
        image_height,
        annotations: exported,
        metadata: Some(metadata_now()),
    }
}

/// Serialize a document as pretty-printed JSON.
pub fn to_json(document: &ExportDocument) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(document)?)
}

/// Parse a document from JSON.
pub fn from_json(json: &str) -> Result<ExportDocument, ExportError> {
    Ok(serde_json::from_str(json)?)
}

/// Parse a semantic version string into (major, minor, patch).
pub fn parse_version(version: &str) -> Option<(u32, u32, u32)> {
    let parts: Vec<&str> = version.split('.').collect();
    if parts.len() != 3 {
        return None;
    }
    let major = parts[0].parse().ok()?;
    let minor = parts[1].parse().ok()?;
    let patch = parts[2].parse().ok()?;
    Some((major, minor, patch))
}

/// Check if a document version is compatible with this crate.
///
/// For version 0.x.x (unstable), only exact minor version matches are
/// compatible. For 1.x.x+, any document with the same major version is.
pub fn is_compatible_version(document_version: &str) -> bool {
    let Some((current_major, current_minor, _)) = parse_version(VERSION) else {
        return false;
    };
    let Some((doc_major, doc_minor, _)) = parse_version(document_version) else {
        return false;
    };

    if current_major == 0 {
        doc_major == 0 && doc_minor == current_minor
    } else {
        doc_major == current_major
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn triangle() -> Annotation {
        Annotation::polygon(vec![
            Point::new(0.0, 0.0),
            Point::new(200.0, 0.0),
            Point::new(100.0, 150.0),
        ])
        .expect("triangle is valid")
    }

    #[test]
    fn test_pixel_coordinates_are_scaled_to_natural() {
        let document = build_document(&[triangle()], Some((800, 600)), Some((400.0, 300.0)));

        let points = &document.annotations[0].points;
        assert!(approx_eq(points[1].pixel_coordinates.x, 400.0));
        assert!(approx_eq(points[1].pixel_coordinates.y, 0.0));
        assert!(approx_eq(points[2].pixel_coordinates.x, 200.0));
        assert!(approx_eq(points[2].pixel_coordinates.y, 300.0));
    }

    #[test]
    fn test_normalized_coordinates_divide_by_natural() {
        let document = build_document(&[triangle()], Some((800, 600)), Some((400.0, 300.0)));

        let points = &document.annotations[0].points;
        assert!(approx_eq(points[1].normalized_coordinates.x, 0.5));
        assert!(approx_eq(points[2].normalized_coordinates.x, 0.25));
        assert!(approx_eq(points[2].normalized_coordinates.y, 0.5));
    }

    #[test]
    fn test_normalized_coordinates_are_clamped() {
        let outside = Annotation::arrow(Point::new(-50.0, 0.0), Point::new(500.0, 100.0));
        let document = build_document(&[outside], Some((800, 600)), Some((400.0, 300.0)));

        let points = &document.annotations[0].points;
        assert!(approx_eq(points[0].normalized_coordinates.x, 0.0));
        assert!(approx_eq(points[1].normalized_coordinates.x, 1.0));
    }

    #[test]
    fn test_missing_container_degrades_to_empty() {
        let document = build_document(&[triangle()], Some((800, 600)), None);

        assert!(document.annotations.is_empty());
        assert_eq!(document.image_width, 800);
        assert_eq!(document.image_height, 600);
        assert!(document.metadata.is_some());
    }

    #[test]
    fn test_zero_container_degrades_to_empty() {
        let document = build_document(&[triangle()], Some((800, 600)), Some((0.0, 300.0)));
        assert!(document.annotations.is_empty());
    }

    #[test]
    fn test_missing_image_degrades_to_zero_dimensions() {
        let document = build_document(&[triangle()], None, Some((400.0, 300.0)));

        assert!(document.annotations.is_empty());
        assert_eq!(document.image_width, 0);
        assert_eq!(document.image_height, 0);
    }

    #[test]
    fn test_json_field_names() {
        let document = build_document(&[triangle()], Some((800, 600)), Some((400.0, 300.0)));
        let json = to_json(&document).expect("serializes");

        assert!(json.contains("\"imageWidth\": 800"));
        assert!(json.contains("\"imageHeight\": 600"));
        assert!(json.contains("\"pixelCoordinates\""));
        assert!(json.contains("\"normalizedCoordinates\""));
        assert!(json.contains("\"type\": \"polygon\""));
        assert!(json.contains("\"exportDate\""));
        assert!(json.contains("\"version\": \"1.0.0\""));
    }

    #[test]
    fn test_json_round_trip() {
        let document = build_document(&[triangle()], Some((800, 600)), Some((400.0, 300.0)));
        let json = to_json(&document).expect("serializes");
        let parsed = from_json(&json).expect("parses");

        assert_eq!(parsed, document);
    }

    #[test]
    fn test_export_date_is_rfc3339() {
        let document = build_document(&[], Some((800, 600)), Some((400.0, 300.0)));
        let metadata = document.metadata.expect("metadata present");

        assert!(chrono::DateTime::parse_from_rfc3339(&metadata.export_date).is_ok());
    }

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("1.2.3"), Some((1, 2, 3)));
        assert_eq!(parse_version("10.0.0"), Some((10, 0, 0)));
        assert_eq!(parse_version("1.2"), None);
        assert_eq!(parse_version("1.2.x"), None);
        assert_eq!(parse_version(""), None);
    }

    #[test]
    fn test_version_compatibility() {
        assert!(is_compatible_version("1.0.0"));
        assert!(is_compatible_version("1.9.4"));
        assert!(!is_compatible_version("2.0.0"));
        assert!(!is_compatible_version("0.9.0"));
        assert!(!is_compatible_version("garbage"));
    }
}
