//! Rasterized export: annotations flattened onto the source image.
//!
//! Shapes are drawn at the image's natural resolution, so points must be
//! resolved from container coordinates first. Polygons get a translucent
//! fill plus an opaque stroke; arrows get a stroked shaft and two stroked
//! head barbs.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbaImage};
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Stroke, Transform};

use super::error::ExportError;
use super::structured::ExportDocument;
use crate::constants::export::{
    ARROW_HEAD_LENGTH, FILL_RGBA, STROKE_RGBA, STROKE_WIDTH,
};
use crate::geometry::{Point, arrow_head, scale_point};
use crate::model::{Annotation, AnnotationKind, ARROW_POINT_COUNT, MIN_POLYGON_VERTICES};

/// An annotation with its points already resolved to natural-image pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedShape {
    pub kind: AnnotationKind,
    pub points: Vec<Point>,
}

/// Scale annotations from container coordinates to natural-image pixels.
pub fn resolve_shapes(
    annotations: &[Annotation],
    natural: (u32, u32),
    container: (f32, f32),
) -> Vec<ResolvedShape> {
    let (natural_w, natural_h) = (natural.0 as f32, natural.1 as f32);
    annotations
        .iter()
        .map(|annotation| ResolvedShape {
            kind: annotation.kind,
            points: annotation
                .points
                .iter()
                .map(|point| scale_point(*point, natural_w, natural_h, container.0, container.1))
                .collect(),
        })
        .collect()
}

/// Read shapes back out of a structured export document. Pixel coordinates
/// are already in natural-image pixels there.
pub fn shapes_from_document(document: &ExportDocument) -> Vec<ResolvedShape> {
    document
        .annotations
        .iter()
        .map(|annotation| ResolvedShape {
            kind: annotation.kind,
            points: annotation
                .points
                .iter()
                .map(|point| point.pixel_coordinates)
                .collect(),
        })
        .collect()
}

/// Draw shapes over the base image at its natural resolution.
///
/// `natural` must match the base image's dimensions; shapes resolved
/// against one resolution cannot be placed on another.
pub fn render_overlay(
    base: &DynamicImage,
    natural: (u32, u32),
    shapes: &[ResolvedShape],
) -> Result<DynamicImage, ExportError> {
    if (base.width(), base.height()) != natural {
        return Err(ExportError::invalid_image(format!(
            "base image is {}x{}, annotations were resolved for {}x{}",
            base.width(),
            base.height(),
            natural.0,
            natural.1
        )));
    }

    let mut pixmap = Pixmap::new(base.width(), base.height())
        .ok_or_else(|| ExportError::invalid_image("cannot allocate pixmap"))?;
    copy_image_to_pixmap(base, &mut pixmap)?;

    for shape in shapes {
        draw_shape(&mut pixmap, shape)?;
    }

    let output = RgbaImage::from_raw(base.width(), base.height(), pixmap.data().to_vec())
        .ok_or_else(|| ExportError::invalid_image("cannot construct output image"))?;
    Ok(DynamicImage::ImageRgba8(output))
}

/// Encode an image as PNG bytes.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, ExportError> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

/// Render and encode in one step.
pub fn render_overlay_png(
    base: &DynamicImage,
    natural: (u32, u32),
    shapes: &[ResolvedShape],
) -> Result<Vec<u8>, ExportError> {
    let rendered = render_overlay(base, natural, shapes)?;
    encode_png(&rendered)
}

fn copy_image_to_pixmap(image: &DynamicImage, pixmap: &mut Pixmap) -> Result<(), ExportError> {
    let rgba = image.to_rgba8();
    let data = pixmap.data_mut();
    if data.len() != rgba.len() {
        return Err(ExportError::invalid_image(
            "source image and pixmap size mismatch",
        ));
    }
    data.copy_from_slice(rgba.as_raw());
    Ok(())
}

fn make_paint(rgba: [u8; 4]) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(rgba[0], rgba[1], rgba[2], rgba[3]);
    paint.anti_alias = true;
    paint
}

fn draw_shape(pixmap: &mut Pixmap, shape: &ResolvedShape) -> Result<(), ExportError> {
    let stroke_paint = make_paint(STROKE_RGBA);
    let stroke = Stroke {
        width: STROKE_WIDTH,
        ..Default::default()
    };

    match shape.kind {
        AnnotationKind::Polygon => {
            // Under-defined polygons are skipped, not errors
            if shape.points.len() < MIN_POLYGON_VERTICES {
                return Ok(());
            }
            let mut pb = PathBuilder::new();
            pb.move_to(shape.points[0].x, shape.points[0].y);
            for point in &shape.points[1..] {
                pb.line_to(point.x, point.y);
            }
            pb.close();
            let path = pb
                .finish()
                .ok_or_else(|| ExportError::invalid_image("cannot build polygon path"))?;

            let fill_paint = make_paint(FILL_RGBA);
            pixmap.fill_path(&path, &fill_paint, FillRule::Winding, Transform::identity(), None);
            pixmap.stroke_path(&path, &stroke_paint, &stroke, Transform::identity(), None);
        }
        AnnotationKind::Arrow => {
            if shape.points.len() != ARROW_POINT_COUNT {
                return Ok(());
            }
            let (tail, head) = (shape.points[0], shape.points[1]);

            let mut pb = PathBuilder::new();
            pb.move_to(tail.x, tail.y);
            pb.line_to(head.x, head.y);

            let [tip, left, right] = arrow_head(tail, head, ARROW_HEAD_LENGTH);
            pb.move_to(tip.x, tip.y);
            pb.line_to(left.x, left.y);
            pb.move_to(tip.x, tip.y);
            pb.line_to(right.x, right.y);

            let path = pb
                .finish()
                .ok_or_else(|| ExportError::invalid_image("cannot build arrow path"))?;
            pixmap.stroke_path(&path, &stroke_paint, &stroke, Transform::identity(), None);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn white_base(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([255, 255, 255, 255]),
        ))
    }

    fn square_shape() -> ResolvedShape {
        ResolvedShape {
            kind: AnnotationKind::Polygon,
            points: vec![
                Point::new(40.0, 40.0),
                Point::new(160.0, 40.0),
                Point::new(160.0, 160.0),
                Point::new(40.0, 160.0),
            ],
        }
    }

    #[test]
    fn test_render_keeps_image_size() {
        let base = white_base(320, 200);
        let shapes = [square_shape()];

        let rendered = render_overlay(&base, (320, 200), &shapes).expect("render succeeds");
        assert_eq!(rendered.width(), 320);
        assert_eq!(rendered.height(), 200);
    }

    #[test]
    fn test_dimension_mismatch_is_rejected() {
        let base = white_base(320, 200);

        let result = render_overlay(&base, (800, 600), &[]);
        assert!(matches!(result, Err(ExportError::InvalidImage { .. })));
    }

    #[test]
    fn test_polygon_fill_tints_interior() {
        let base = white_base(200, 200);
        let rendered =
            render_overlay(&base, (200, 200), &[square_shape()]).expect("render succeeds");

        // Center of the square: translucent green fill over white
        let pixel = rendered.to_rgba8().get_pixel(100, 100).0;
        assert!(pixel[1] > 250, "green channel should stay saturated: {pixel:?}");
        assert!(
            pixel[0] < 220 && pixel[0] > 190,
            "red channel should be tinted down: {pixel:?}"
        );
        assert_eq!(pixel[0], pixel[2], "fill tint is pure green: {pixel:?}");

        // Far corner is untouched
        assert_eq!(rendered.to_rgba8().get_pixel(5, 5).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_arrow_shaft_is_stroked() {
        let base = white_base(200, 200);
        let shapes = [ResolvedShape {
            kind: AnnotationKind::Arrow,
            points: vec![Point::new(50.0, 100.0), Point::new(150.0, 100.0)],
        }];

        let rendered = render_overlay(&base, (200, 200), &shapes).expect("render succeeds");
        let pixel = rendered.to_rgba8().get_pixel(100, 100).0;
        assert!(pixel[1] > 250, "shaft should be green: {pixel:?}");
        assert!(pixel[0] < 50, "shaft should not be white: {pixel:?}");
    }

    #[test]
    fn test_under_defined_shapes_are_skipped() {
        let base = white_base(100, 100);
        let shapes = [
            ResolvedShape {
                kind: AnnotationKind::Polygon,
                points: vec![Point::new(10.0, 10.0), Point::new(90.0, 90.0)],
            },
            ResolvedShape {
                kind: AnnotationKind::Arrow,
                points: vec![Point::new(50.0, 50.0)],
            },
        ];

        let rendered = render_overlay(&base, (100, 100), &shapes).expect("render succeeds");
        assert_eq!(
            rendered.to_rgba8().get_pixel(50, 50).0,
            [255, 255, 255, 255]
        );
    }

    #[test]
    fn test_encode_png_round_trips() {
        let base = white_base(64, 48);
        let bytes = render_overlay_png(&base, (64, 48), &[square_shape()])
            .expect("render and encode succeed");

        let decoded = image::load_from_memory(&bytes).expect("valid PNG");
        assert_eq!(decoded.width(), 64);
        assert_eq!(decoded.height(), 48);
    }

    #[test]
    fn test_resolve_shapes_scales_to_natural() {
        let annotation = Annotation::arrow(Point::new(100.0, 50.0), Point::new(200.0, 100.0));
        let shapes = resolve_shapes(&[annotation], (800, 600), (400.0, 300.0));

        assert_eq!(shapes[0].points[0], Point::new(200.0, 100.0));
        assert_eq!(shapes[0].points[1], Point::new(400.0, 200.0));
    }

    #[test]
    fn test_shapes_from_document_use_pixel_coordinates() {
        let annotation = Annotation::arrow(Point::new(100.0, 50.0), Point::new(200.0, 100.0));
        let document = super::super::structured::build_document(
            &[annotation],
            Some((800, 600)),
            Some((400.0, 300.0)),
        );

        let shapes = shapes_from_document(&document);
        assert_eq!(shapes[0].kind, AnnotationKind::Arrow);
        assert_eq!(shapes[0].points[0], Point::new(200.0, 100.0));
    }
}
