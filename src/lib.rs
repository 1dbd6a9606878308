//! Polymark - Annotation Geometry Engine
//!
//! A headless interaction engine for polygon and arrow image annotation.
//! Pointer, key, and command events go in through [`Editor::handle`]; a
//! [`Delta`] comes back describing what changed. The engine covers
//! zoom-aware hit-testing, selection and dragging, point-level editing,
//! linear undo/redo, per-image persistence, and structured JSON or
//! rasterized PNG export.

pub mod constants;
pub mod format;
pub mod geometry;

mod editor;
mod event;
mod history;
mod keybindings;
mod model;
mod storage;
mod store;
mod viewport;

pub use editor::{Editor, ImageInfo};
pub use event::{Command, ContainerBox, Delta, Event, Key, Modifiers, PointerEvent};
pub use geometry::Point;
pub use history::History;
pub use keybindings::{chord_to_string, key_to_string, Chord, KeyBindings};
pub use model::{
    Annotation, AnnotationId, AnnotationKind, Mode, ARROW_POINT_COUNT, MIN_POLYGON_VERTICES,
};
pub use storage::{
    image_key, load_annotations, remove_annotations, save_annotations, AnnotationArchive,
    MemoryArchive, StoredRecord, KEY_PREFIX,
};
pub use store::{AnnotationStore, Hit, Selection};
pub use viewport::{Viewport, ZoomPolicy};
