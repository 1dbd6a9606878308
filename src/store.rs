//! Committed annotations, the in-progress point buffer, and selection.
//!
//! The store is the single owner of annotation state. Mutating operations
//! report whether they changed anything so the caller can decide about
//! history snapshots; invalid mutations (bad id, out-of-range index,
//! point-delete on an arrow or a 3-vertex polygon) are silent no-ops.
//! Selection is cleared or shifted atomically with every delete, so a stale
//! index can never survive a mutation.

use crate::geometry::Point;
use crate::model::{Annotation, AnnotationId, AnnotationKind, MIN_POLYGON_VERTICES};

/// Current selection: an annotation and optionally one of its vertices.
///
/// The vertex index is only ever set together with an annotation and always
/// indexes into that annotation's points.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    annotation: Option<AnnotationId>,
    point: Option<usize>,
}

impl Selection {
    /// The selected annotation id, if any.
    pub fn annotation(&self) -> Option<&AnnotationId> {
        self.annotation.as_ref()
    }

    /// The selected vertex index, if any.
    pub fn point_index(&self) -> Option<usize> {
        self.point
    }

    pub fn is_empty(&self) -> bool {
        self.annotation.is_none()
    }

    fn set(&mut self, annotation: AnnotationId, point: Option<usize>) {
        self.annotation = Some(annotation);
        self.point = point;
    }

    fn clear(&mut self) {
        self.annotation = None;
        self.point = None;
    }
}

/// Result of a pointer hit test, in priority order: vertex handles of any
/// annotation win over annotation bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hit {
    /// A vertex handle was hit.
    Vertex { id: AnnotationId, index: usize },
    /// A polygon interior or arrow segment was hit.
    Body { id: AnnotationId },
}

/// Annotation collection for the bound image.
#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    annotations: Vec<Annotation>,
    temp_points: Vec<Point>,
    selection: Selection,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn temp_points(&self) -> &[Point] {
        &self.temp_points
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Get an annotation by id.
    pub fn get(&self, id: &AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| &a.id == id)
    }

    fn get_mut(&mut self, id: &AnnotationId) -> Option<&mut Annotation> {
        self.annotations.iter_mut().find(|a| &a.id == id)
    }

    /// The currently selected annotation, if any.
    pub fn selected_annotation(&self) -> Option<&Annotation> {
        self.selection.annotation().and_then(|id| self.get(id))
    }

    // ========================================================================
    // Creation
    // ========================================================================

    /// Commit a polygon from the given vertices. Fewer than three vertices
    /// is rejected.
    pub fn create_polygon(&mut self, points: Vec<Point>) -> Option<&Annotation> {
        let annotation = Annotation::polygon(points)?;
        log::debug!(
            "✅ Created polygon {} with {} points",
            annotation.id,
            annotation.points.len()
        );
        self.annotations.push(annotation);
        self.annotations.last()
    }

    /// Commit an arrow from tail to head.
    pub fn create_arrow(&mut self, tail: Point, head: Point) -> &Annotation {
        let annotation = Annotation::arrow(tail, head);
        log::debug!("✅ Created arrow {}", annotation.id);
        self.annotations.push(annotation);
        // Just pushed, so the vector is non-empty
        &self.annotations[self.annotations.len() - 1]
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Translate every vertex of an annotation by `(dx, dy)`.
    pub fn move_annotation(&mut self, id: &AnnotationId, dx: f32, dy: f32) -> bool {
        match self.get_mut(id) {
            Some(annotation) => {
                annotation.translate(dx, dy);
                true
            }
            None => false,
        }
    }

    /// Translate a single vertex by `(dx, dy)`. No-op when the id or index
    /// does not resolve.
    pub fn move_point(&mut self, id: &AnnotationId, index: usize, dx: f32, dy: f32) -> bool {
        match self.get_mut(id).and_then(|a| a.points.get_mut(index)) {
            Some(point) => {
                point.x += dx;
                point.y += dy;
                true
            }
            None => false,
        }
    }

    /// Remove an annotation. Clears the selection when it referenced the
    /// removed id.
    pub fn delete_annotation(&mut self, id: &AnnotationId) -> bool {
        let Some(position) = self.annotations.iter().position(|a| &a.id == id) else {
            return false;
        };
        self.annotations.remove(position);
        if self.selection.annotation() == Some(id) {
            self.selection.clear();
        }
        log::debug!("🗑️ Deleted annotation {}", id);
        true
    }

    /// Remove a single polygon vertex.
    ///
    /// Only permitted on polygons with more than [`MIN_POLYGON_VERTICES`]
    /// points; anything else is a silent no-op. A selected point index on
    /// the same annotation is cleared (if it was the removed vertex) or
    /// shifted down (if it sat behind it) in the same step.
    pub fn delete_point(&mut self, id: &AnnotationId, index: usize) -> bool {
        if !self.can_delete_point(id) {
            log::debug!("❌ Rejected point delete on {}", id);
            return false;
        }
        let Some(annotation) = self.get_mut(id) else {
            return false;
        };
        if index >= annotation.points.len() {
            return false;
        }
        annotation.points.remove(index);

        if self.selection.annotation() == Some(id) {
            match self.selection.point {
                Some(selected) if selected == index => self.selection.point = None,
                Some(selected) if selected > index => {
                    self.selection.point = Some(selected - 1);
                }
                _ => {}
            }
        }
        log::debug!("🗑️ Deleted point {} of {}", index, id);
        true
    }

    // ========================================================================
    // Capability predicates
    // ========================================================================

    /// Whether a vertex of this annotation may be deleted: polygons only,
    /// and never below the 3-point minimum.
    pub fn can_delete_point(&self, id: &AnnotationId) -> bool {
        match self.get(id) {
            Some(annotation) => {
                annotation.kind == AnnotationKind::Polygon
                    && annotation.points.len() > MIN_POLYGON_VERTICES
            }
            None => false,
        }
    }

    /// Whether the currently selected vertex may be deleted.
    pub fn can_delete_selected_point(&self) -> bool {
        match (self.selection.annotation(), self.selection.point_index()) {
            (Some(id), Some(_)) => self.can_delete_point(id),
            _ => false,
        }
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Select an annotation, optionally with one of its vertices. An
    /// unknown id is a no-op; an out-of-range index degrades to selecting
    /// the annotation alone. Returns whether the selection changed.
    pub fn select(&mut self, id: &AnnotationId, point: Option<usize>) -> bool {
        let Some(annotation) = self.get(id) else {
            log::debug!("❌ Ignored select of unknown annotation {}", id);
            return false;
        };
        let point = point.filter(|index| *index < annotation.points.len());

        let previous = self.selection.clone();
        self.selection.set(id.clone(), point);
        self.selection != previous
    }

    /// Clear the selection. Returns whether it was non-empty.
    pub fn clear_selection(&mut self) -> bool {
        if self.selection.is_empty() && self.selection.point_index().is_none() {
            return false;
        }
        self.selection.clear();
        true
    }

    // ========================================================================
    // Hit testing
    // ========================================================================

    /// Hit-test in priority order: first vertex handle of any annotation
    /// (draw order), then the first annotation body. Thresholds are
    /// zoom-compensated.
    pub fn hit_test(&self, point: Point, zoom: f32) -> Option<Hit> {
        for annotation in &self.annotations {
            if let Some(index) = annotation.hit_test_vertex(point, zoom) {
                return Some(Hit::Vertex {
                    id: annotation.id.clone(),
                    index,
                });
            }
        }

        for annotation in &self.annotations {
            if annotation.hit_test_body(point, zoom) {
                return Some(Hit::Body {
                    id: annotation.id.clone(),
                });
            }
        }

        None
    }

    // ========================================================================
    // Temp points
    // ========================================================================

    /// Append a vertex to the in-progress buffer.
    pub fn push_temp(&mut self, point: Point) {
        self.temp_points.push(point);
    }

    /// Drop the in-progress buffer. Returns whether it was non-empty.
    pub fn clear_temp(&mut self) -> bool {
        if self.temp_points.is_empty() {
            return false;
        }
        self.temp_points.clear();
        true
    }

    /// Take the in-progress buffer, leaving it empty.
    pub fn take_temp(&mut self) -> Vec<Point> {
        std::mem::take(&mut self.temp_points)
    }

    // ========================================================================
    // Bulk state
    // ========================================================================

    /// Remove every annotation, the temp buffer, and the selection.
    /// Returns whether anything was dropped.
    pub fn clear_all(&mut self) -> bool {
        let had_state = !self.annotations.is_empty()
            || !self.temp_points.is_empty()
            || !self.selection.is_empty();
        self.annotations.clear();
        self.temp_points.clear();
        self.selection.clear();
        had_state
    }

    /// Replace annotations and selection wholesale (history restore, image
    /// load). A selection that does not resolve against the new annotations
    /// is dropped rather than kept stale.
    pub(crate) fn restore(&mut self, annotations: Vec<Annotation>, selection: Selection) {
        self.annotations = annotations;
        self.selection = selection;

        let valid = match self.selection.annotation() {
            Some(id) => match self.get(id) {
                Some(annotation) => self
                    .selection
                    .point_index()
                    .is_none_or(|index| index < annotation.points.len()),
                None => false,
            },
            None => self.selection.point_index().is_none(),
        };
        if !valid {
            self.selection.clear();
        }
    }
}
