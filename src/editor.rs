//! The annotation editor: events in, state deltas out.
//!
//! [`Editor`] owns every piece of interaction state for one bound image:
//! the annotation store, the in-progress point buffer, the selection, the
//! zoom viewport, the undo timeline, and the persistence wiring. All input
//! flows through [`Editor::handle`], which returns a [`Delta`] describing
//! what changed so hosts can re-render selectively.
//!
//! The editor is single-threaded and run-to-completion: `handle` mutates
//! synchronously and nothing is deferred except archive writes, which are
//! gated through the auto-save manager.

use image::DynamicImage;

use crate::constants;
use crate::event::{Command, Delta, Event, PointerEvent};
use crate::format::{AutoSaveManager, ExportDocument, ExportError, raster, structured};
use crate::geometry::{self, Point};
use crate::history::History;
use crate::keybindings::KeyBindings;
use crate::model::{Annotation, MIN_POLYGON_VERTICES, Mode};
use crate::storage::{self, AnnotationArchive};
use crate::store::{AnnotationStore, Hit, Selection};
use crate::viewport::{Viewport, ZoomPolicy};

/// Identity and dimensions of the currently bound image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    key: String,
    file_name: String,
    natural_width: u32,
    natural_height: u32,
}

impl ImageInfo {
    /// The archive key annotations for this image are stored under.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn natural_width(&self) -> u32 {
        self.natural_width
    }

    pub fn natural_height(&self) -> u32 {
        self.natural_height
    }

    pub fn natural_size(&self) -> (u32, u32) {
        (self.natural_width, self.natural_height)
    }
}

/// Drag tracking for select mode.
///
/// The anchor advances with every applied move, so each step applies an
/// incremental delta rather than an offset from the gesture start.
#[derive(Debug, Clone, Copy, PartialEq)]
enum DragState {
    Idle,
    Dragging { anchor: Point },
}

/// One undo/redo entry: the full annotation list plus the selection.
#[derive(Debug, Clone, PartialEq)]
struct Snapshot {
    annotations: Vec<Annotation>,
    selection: Selection,
}

/// Annotation interaction engine.
pub struct Editor {
    mode: Mode,
    store: AnnotationStore,
    viewport: Viewport,
    history: History<Snapshot>,
    drag: DragState,
    image: Option<ImageInfo>,
    /// Unscaled size of the annotation surface, for export scaling.
    container: Option<(f32, f32)>,
    /// Raw-space origin of the surface, cached from the last pointer down.
    container_origin: Point,
    bindings: KeyBindings,
    archive: Option<Box<dyn AnnotationArchive>>,
    auto_save: AutoSaveManager,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    pub fn new() -> Self {
        let mut editor = Self {
            mode: Mode::Select,
            store: AnnotationStore::new(),
            viewport: Viewport::new(),
            history: History::new(),
            drag: DragState::Idle,
            image: None,
            container: None,
            container_origin: Point::new(0.0, 0.0),
            bindings: KeyBindings::new(),
            archive: None,
            auto_save: AutoSaveManager::new(),
        };
        // Seed the timeline so the first edit can be undone back to empty
        editor.record_history();
        editor
    }

    /// Use a custom zoom policy instead of the defaults.
    pub fn with_zoom_policy(mut self, policy: ZoomPolicy) -> Self {
        self.viewport = Viewport::with_policy(policy);
        self
    }

    /// Use custom key bindings instead of the defaults.
    pub fn with_bindings(mut self, bindings: KeyBindings) -> Self {
        self.bindings = bindings;
        self
    }

    /// Attach a persistence backend. Without one, annotation sets live only
    /// for the editor's lifetime.
    pub fn with_archive(mut self, archive: impl AnnotationArchive + 'static) -> Self {
        self.archive = Some(Box::new(archive));
        self
    }

    /// Use a custom auto-save schedule instead of the defaults.
    pub fn with_auto_save(mut self, auto_save: AutoSaveManager) -> Self {
        self.auto_save = auto_save;
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn annotations(&self) -> &[Annotation] {
        self.store.annotations()
    }

    pub fn temp_points(&self) -> &[Point] {
        self.store.temp_points()
    }

    pub fn selection(&self) -> &Selection {
        self.store.selection()
    }

    pub fn selected_annotation(&self) -> Option<&Annotation> {
        self.store.selected_annotation()
    }

    pub fn zoom(&self) -> f32 {
        self.viewport.zoom()
    }

    pub fn is_max_zoom(&self) -> bool {
        self.viewport.is_max_zoom()
    }

    pub fn is_min_zoom(&self) -> bool {
        self.viewport.is_min_zoom()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    pub fn image(&self) -> Option<&ImageInfo> {
        self.image.as_ref()
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn bindings_mut(&mut self) -> &mut KeyBindings {
        &mut self.bindings
    }

    // ========================================================================
    // Event dispatch
    // ========================================================================

    /// Feed one event through the editor and report what changed.
    pub fn handle(&mut self, event: Event) -> Delta {
        let image_bind = matches!(event, Event::ImageLoaded { .. });

        let mut delta = match event {
            Event::Pointer(pointer) => self.handle_pointer(pointer),
            Event::Wheel {
                delta,
                modifier_held,
            } => Delta {
                zoom: self.viewport.wheel_zoom(delta, modifier_held),
                ..Delta::NONE
            },
            Event::Key { key, modifiers } => match self.bindings.command_for(key, modifiers) {
                Some(command) => self.apply(command),
                None => Delta::NONE,
            },
            Event::Command(command) => self.apply(command),
            Event::ImageLoaded {
                file_name,
                natural_width,
                natural_height,
                container_width,
                container_height,
            } => self.load_image(
                file_name,
                natural_width,
                natural_height,
                container_width,
                container_height,
            ),
            Event::ContainerResized { width, height } => {
                self.container = Some((width, height));
                Delta::NONE
            }
        };

        // Binding an image restores persisted state; that is not an edit
        if delta.annotations && !image_bind {
            self.auto_save.mark_dirty();
        }

        // One history entry per committed change. Drag gestures suppress
        // this and record once on release instead.
        if (delta.annotations || delta.selection)
            && !self.is_dragging()
            && self.record_history()
        {
            delta.history = true;
        }

        delta
    }

    fn apply(&mut self, command: Command) -> Delta {
        match command {
            Command::SetMode(mode) => self.set_mode(mode),
            Command::DeleteSelection => self.delete_selection(),
            Command::Cancel => self.cancel(),
            Command::CompleteShape => self.complete_shape(),
            Command::Undo => self.undo(),
            Command::Redo => self.redo(),
            Command::ZoomIn => Delta {
                zoom: self.viewport.zoom_in(),
                ..Delta::NONE
            },
            Command::ZoomOut => Delta {
                zoom: self.viewport.zoom_out(),
                ..Delta::NONE
            },
            Command::ZoomReset => Delta {
                zoom: self.viewport.reset(),
                ..Delta::NONE
            },
            Command::ClearAll => self.clear_all(),
        }
    }

    // ========================================================================
    // Pointer handling
    // ========================================================================

    fn handle_pointer(&mut self, event: PointerEvent) -> Delta {
        match event {
            PointerEvent::Down {
                position,
                container,
            } => {
                self.container_origin = container.origin;
                let point = self.viewport.to_image_space(position, container.origin);
                match self.mode {
                    Mode::Select => self.select_pointer_down(point),
                    Mode::Polygon => self.polygon_pointer_down(point),
                    Mode::Arrow => self.arrow_pointer_down(point),
                }
            }
            PointerEvent::Move { position } => self.pointer_drag_move(position),
            PointerEvent::Up | PointerEvent::Leave => self.end_drag(),
        }
    }

    fn select_pointer_down(&mut self, point: Point) -> Delta {
        match self.store.hit_test(point, self.viewport.zoom()) {
            Some(Hit::Vertex { id, index }) => {
                log::debug!("🔍 Hit vertex {} of {}", index, id);
                let changed = self.store.select(&id, Some(index));
                self.drag = DragState::Dragging { anchor: point };
                Delta {
                    selection: changed,
                    ..Delta::NONE
                }
            }
            Some(Hit::Body { id }) => {
                log::debug!("🔍 Hit body of {}", id);
                let changed = self.store.select(&id, None);
                self.drag = DragState::Dragging { anchor: point };
                Delta {
                    selection: changed,
                    ..Delta::NONE
                }
            }
            None => Delta {
                selection: self.store.clear_selection(),
                ..Delta::NONE
            },
        }
    }

    fn polygon_pointer_down(&mut self, point: Point) -> Delta {
        let temp = self.store.temp_points();
        let closes = temp.len() >= 2
            && geometry::is_near_point(
                point,
                temp[0],
                constants::hit::VERTEX_RADIUS,
                self.viewport.zoom(),
            );

        if closes {
            // The closing click is not part of the shape
            let points = self.store.take_temp();
            let created = self.store.create_polygon(points).is_some();
            if !created {
                log::debug!("❌ Discarded in-progress polygon with too few vertices");
            }
            return Delta {
                temp_points: true,
                annotations: created,
                ..Delta::NONE
            };
        }

        self.store.push_temp(point);
        Delta {
            temp_points: true,
            ..Delta::NONE
        }
    }

    fn arrow_pointer_down(&mut self, point: Point) -> Delta {
        let Some(tail) = self.store.temp_points().first().copied() else {
            self.store.push_temp(point);
            return Delta {
                temp_points: true,
                ..Delta::NONE
            };
        };

        self.store.clear_temp();
        self.store.create_arrow(tail, point);
        Delta {
            temp_points: true,
            annotations: true,
            ..Delta::NONE
        }
    }

    fn pointer_drag_move(&mut self, position: Point) -> Delta {
        if self.mode != Mode::Select {
            return Delta::NONE;
        }
        let DragState::Dragging { anchor } = self.drag else {
            return Delta::NONE;
        };
        let Some(id) = self.store.selection().annotation().cloned() else {
            return Delta::NONE;
        };

        let current = self.viewport.to_image_space(position, self.container_origin);
        let (dx, dy) = (current.x - anchor.x, current.y - anchor.y);

        let moved = match self.store.selection().point_index() {
            Some(index) => self.store.move_point(&id, index, dx, dy),
            None => self.store.move_annotation(&id, dx, dy),
        };
        if moved {
            self.drag = DragState::Dragging { anchor: current };
        }
        Delta {
            annotations: moved,
            ..Delta::NONE
        }
    }

    fn end_drag(&mut self) -> Delta {
        if !self.is_dragging() {
            return Delta::NONE;
        }
        self.drag = DragState::Idle;
        // The whole gesture lands as a single timeline entry
        Delta {
            history: self.record_history(),
            ..Delta::NONE
        }
    }

    // ========================================================================
    // Commands
    // ========================================================================

    fn set_mode(&mut self, mode: Mode) -> Delta {
        if self.mode == mode {
            return Delta::NONE;
        }
        log::debug!("🔄 Mode -> {}", mode.name());
        self.mode = mode;
        self.drag = DragState::Idle;
        Delta {
            mode: true,
            selection: self.store.clear_selection(),
            temp_points: self.store.clear_temp(),
            ..Delta::NONE
        }
    }

    /// Delete the selected vertex when that is permitted, otherwise the
    /// selected annotation.
    fn delete_selection(&mut self) -> Delta {
        let Some(id) = self.store.selection().annotation().cloned() else {
            return Delta::NONE;
        };

        let changed = match self.store.selection().point_index() {
            Some(index) if self.store.can_delete_point(&id) => self.store.delete_point(&id, index),
            _ => self.store.delete_annotation(&id),
        };
        Delta {
            annotations: changed,
            selection: changed,
            ..Delta::NONE
        }
    }

    fn cancel(&mut self) -> Delta {
        self.drag = DragState::Idle;
        Delta {
            temp_points: self.store.clear_temp(),
            selection: self.store.clear_selection(),
            ..Delta::NONE
        }
    }

    fn complete_shape(&mut self) -> Delta {
        if self.mode != Mode::Polygon || self.store.temp_points().len() < MIN_POLYGON_VERTICES {
            return Delta::NONE;
        }
        let points = self.store.take_temp();
        let created = self.store.create_polygon(points).is_some();
        Delta {
            temp_points: true,
            annotations: created,
            ..Delta::NONE
        }
    }

    fn undo(&mut self) -> Delta {
        let Some(snapshot) = self.history.undo().cloned() else {
            return Delta::NONE;
        };
        self.restore(snapshot)
    }

    fn redo(&mut self) -> Delta {
        let Some(snapshot) = self.history.redo().cloned() else {
            return Delta::NONE;
        };
        self.restore(snapshot)
    }

    fn restore(&mut self, snapshot: Snapshot) -> Delta {
        self.store.restore(snapshot.annotations, snapshot.selection);
        self.drag = DragState::Idle;
        Delta {
            annotations: true,
            selection: true,
            history: true,
            ..Delta::NONE
        }
    }

    fn clear_all(&mut self) -> Delta {
        let changed = self.store.clear_all();
        if changed {
            log::debug!("🗑️ Cleared all annotations");
        }
        if let (Some(image), Some(archive)) = (&self.image, &mut self.archive) {
            storage::remove_annotations(archive.as_mut(), &image.key);
        }
        Delta {
            annotations: changed,
            temp_points: changed,
            selection: changed,
            ..Delta::NONE
        }
    }

    // ========================================================================
    // Image binding and persistence
    // ========================================================================

    fn load_image(
        &mut self,
        file_name: String,
        natural_width: u32,
        natural_height: u32,
        container_width: f32,
        container_height: f32,
    ) -> Delta {
        // Flush pending edits under the outgoing image's key first
        self.persist_now();

        let key = storage::image_key(&file_name, natural_width, natural_height);
        log::debug!(
            "🔄 Binding image {} ({}x{}), key {}",
            file_name,
            natural_width,
            natural_height,
            key
        );

        let annotations = match &self.archive {
            Some(archive) => storage::load_annotations(
                archive.as_ref(),
                &key,
                natural_width,
                natural_height,
            )
            .unwrap_or_default(),
            None => Vec::new(),
        };

        self.image = Some(ImageInfo {
            key,
            file_name,
            natural_width,
            natural_height,
        });
        self.container = Some((container_width, container_height));
        self.store.restore(annotations, Selection::default());
        self.store.clear_temp();
        self.drag = DragState::Idle;
        self.viewport.reset();
        self.history.reset();
        self.record_history();
        self.auto_save.reset();

        Delta {
            annotations: true,
            temp_points: true,
            selection: true,
            zoom: true,
            mode: false,
            history: true,
        }
    }

    /// Write the current annotation set to the archive immediately. Empty
    /// sets are not written. Returns whether a record was written.
    pub fn persist_now(&mut self) -> bool {
        let Some(image) = &self.image else {
            return false;
        };
        let Some(archive) = &mut self.archive else {
            return false;
        };
        storage::save_annotations(
            archive.as_mut(),
            &image.key,
            self.store.annotations(),
            image.natural_width,
            image.natural_height,
        )
    }

    /// Persist if the auto-save gate says it is time. Hosts call this from
    /// a timer tick. Returns whether a save cycle ran.
    pub fn maybe_auto_save(&mut self) -> bool {
        if !self.auto_save.should_save() {
            return false;
        }
        self.persist_now();
        self.auto_save.mark_saved();
        true
    }

    // ========================================================================
    // Export
    // ========================================================================

    /// Build the structured export document for the current state.
    pub fn export_structured(&self) -> ExportDocument {
        let natural = self.image.as_ref().map(ImageInfo::natural_size);
        structured::build_document(self.store.annotations(), natural, self.container)
    }

    /// Structured export as pretty-printed JSON.
    pub fn export_structured_json(&self) -> Result<String, ExportError> {
        structured::to_json(&self.export_structured())
    }

    /// Flatten annotations onto `base` and encode as PNG. Returns empty
    /// bytes when no image or container is bound.
    pub fn export_raster(&self, base: &DynamicImage) -> Result<Vec<u8>, ExportError> {
        let (Some(image), Some(container)) = (&self.image, self.container) else {
            log::debug!("📤 Raster export degraded to empty: no image or container bound");
            return Ok(Vec::new());
        };
        if image.natural_width == 0
            || image.natural_height == 0
            || container.0 <= 0.0
            || container.1 <= 0.0
        {
            return Ok(Vec::new());
        }

        let natural = image.natural_size();
        let shapes = raster::resolve_shapes(self.store.annotations(), natural, container);
        raster::render_overlay_png(base, natural, &shapes)
    }

    fn record_history(&mut self) -> bool {
        self.history.record(Snapshot {
            annotations: self.store.annotations().to_vec(),
            selection: self.store.selection().clone(),
        })
    }
}
