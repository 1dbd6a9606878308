//! Input events fed to the editor, and the change summary it reports back.
//!
//! Events are the only way state enters the editor: pointer gestures carry
//! raw container coordinates (conversion to image space happens inside),
//! key presses carry modifier state, and commands name editor operations
//! directly for callers that have their own input handling.

use crate::geometry::Point;
use crate::model::Mode;

// ============================================================================
// Pointer input
// ============================================================================

/// Bounding box of the annotation surface in raw pointer coordinates.
///
/// `origin` is the surface's top-left corner in the same coordinate space
/// the pointer positions arrive in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerBox {
    pub origin: Point,
    pub width: f32,
    pub height: f32,
}

impl ContainerBox {
    pub fn new(origin: Point, width: f32, height: f32) -> Self {
        Self {
            origin,
            width,
            height,
        }
    }
}

/// A pointer gesture step, in raw coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Button pressed. Carries the container box so positions can be
    /// converted into image space.
    Down {
        position: Point,
        container: ContainerBox,
    },
    /// Pointer moved while tracked.
    Move { position: Point },
    /// Button released.
    Up,
    /// Pointer left the surface. Treated like a release.
    Leave,
}

// ============================================================================
// Keyboard input
// ============================================================================

/// Physical key identity, layout-independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    Key0,
    Key1,
    Key2,
    Key3,
    Key4,
    Key5,
    Key6,
    Key7,
    Key8,
    Key9,
    Escape,
    Enter,
    Delete,
    Backspace,
    Space,
    Tab,
    Minus,
    Equal,
    Plus,
}

/// Modifier keys held during a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::default()
        }
    }

    pub fn ctrl_shift() -> Self {
        Self {
            ctrl: true,
            shift: true,
            ..Self::default()
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

/// Editor operations addressable without going through key bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Switch the interaction mode.
    SetMode(Mode),
    /// Delete the selected vertex if one is deletable, else the selected
    /// annotation.
    DeleteSelection,
    /// Abandon the in-progress shape and clear the selection.
    Cancel,
    /// Close the in-progress polygon if it has enough vertices.
    CompleteShape,
    Undo,
    Redo,
    ZoomIn,
    ZoomOut,
    ZoomReset,
    /// Remove every annotation and the stored record for the image.
    ClearAll,
}

// ============================================================================
// Event and Delta
// ============================================================================

/// Everything the editor reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Pointer(PointerEvent),
    /// Scroll wheel. Zoom only applies while the zoom modifier is held.
    Wheel { delta: f32, modifier_held: bool },
    Key { key: Key, modifiers: Modifiers },
    Command(Command),
    /// A new image was bound to the editor. Annotations for the previous
    /// image are persisted first, then state is rebuilt for this one.
    ImageLoaded {
        file_name: String,
        natural_width: u32,
        natural_height: u32,
        container_width: f32,
        container_height: f32,
    },
    /// The annotation surface was resized without changing images.
    ContainerResized { width: f32, height: f32 },
}

/// Which parts of editor state an event changed.
///
/// Callers re-render only what is flagged. Deltas merge with `|=` style
/// accumulation via [`Delta::merge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Delta {
    pub annotations: bool,
    pub temp_points: bool,
    pub selection: bool,
    pub zoom: bool,
    pub mode: bool,
    pub history: bool,
}

impl Delta {
    pub const NONE: Self = Self {
        annotations: false,
        temp_points: false,
        selection: false,
        zoom: false,
        mode: false,
        history: false,
    };

    /// Whether any flag is set.
    pub fn any(&self) -> bool {
        self.annotations
            || self.temp_points
            || self.selection
            || self.zoom
            || self.mode
            || self.history
    }

    /// Fold another delta into this one.
    pub fn merge(&mut self, other: Self) {
        self.annotations |= other.annotations;
        self.temp_points |= other.temp_points;
        self.selection |= other.selection;
        self.zoom |= other.zoom;
        self.mode |= other.mode;
        self.history |= other.history;
    }
}
