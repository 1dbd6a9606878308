//! Data model for the annotation engine.

mod annotation;

pub(crate) use annotation::epoch_millis;
pub use annotation::{
    Annotation, AnnotationId, AnnotationKind, Mode, ARROW_POINT_COUNT, MIN_POLYGON_VERTICES,
};
