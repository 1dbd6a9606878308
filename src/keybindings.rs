//! Customizable keyboard shortcuts for editor commands.
//!
//! Every editor command reachable from the keyboard is bound to a chord
//! (key plus exact modifier set). Bindings are plain public fields so hosts
//! can rebind them; [`KeyBindings::conflict`] helps a settings surface warn
//! about double assignments.

use crate::event::{Command, Key, Modifiers};
use crate::model::Mode;

/// A key plus the exact modifiers that must be held with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chord {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl Chord {
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::none(),
        }
    }

    pub fn ctrl(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::ctrl(),
        }
    }

    pub fn ctrl_shift(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::ctrl_shift(),
        }
    }

    /// Whether this chord matches the pressed key and held modifiers.
    /// Modifiers compare exactly, so Ctrl+Z does not fire on Ctrl+Shift+Z.
    pub fn matches(&self, key: Key, modifiers: Modifiers) -> bool {
        self.key == key && self.modifiers == modifiers
    }
}

/// Keyboard shortcut configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    pub undo: Chord,
    pub redo: Chord,
    /// Second redo binding, kept for the common Ctrl+Y habit.
    pub redo_alt: Chord,
    pub delete_selection: Chord,
    /// Second delete binding for keyboards without a Delete key.
    pub delete_selection_alt: Chord,
    pub cancel: Chord,
    pub complete_shape: Chord,
    pub zoom_in: Chord,
    /// Second zoom-in binding for the shifted plus key.
    pub zoom_in_alt: Chord,
    pub zoom_out: Chord,
    pub zoom_reset: Chord,
    pub mode_select: Chord,
    pub mode_polygon: Chord,
    pub mode_arrow: Chord,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            undo: Chord::ctrl(Key::Z),
            redo: Chord::ctrl_shift(Key::Z),
            redo_alt: Chord::ctrl(Key::Y),
            delete_selection: Chord::plain(Key::Delete),
            delete_selection_alt: Chord::plain(Key::Backspace),
            cancel: Chord::plain(Key::Escape),
            complete_shape: Chord::plain(Key::Enter),
            zoom_in: Chord::plain(Key::Equal),
            zoom_in_alt: Chord::plain(Key::Plus),
            zoom_out: Chord::plain(Key::Minus),
            zoom_reset: Chord::plain(Key::Key0),

            // Default mode hotkeys: S for Select, P for Polygon, A for Arrow
            mode_select: Chord::plain(Key::S),
            mode_polygon: Chord::plain(Key::P),
            mode_arrow: Chord::plain(Key::A),
        }
    }
}

impl KeyBindings {
    /// Create new keybindings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every binding as (name, chord, command), in lookup order.
    pub fn bindings(&self) -> [(&'static str, Chord, Command); 14] {
        [
            ("Undo", self.undo, Command::Undo),
            ("Redo", self.redo, Command::Redo),
            ("Redo (alternate)", self.redo_alt, Command::Redo),
            (
                "Delete selection",
                self.delete_selection,
                Command::DeleteSelection,
            ),
            (
                "Delete selection (alternate)",
                self.delete_selection_alt,
                Command::DeleteSelection,
            ),
            ("Cancel", self.cancel, Command::Cancel),
            ("Complete shape", self.complete_shape, Command::CompleteShape),
            ("Zoom in", self.zoom_in, Command::ZoomIn),
            ("Zoom in (alternate)", self.zoom_in_alt, Command::ZoomIn),
            ("Zoom out", self.zoom_out, Command::ZoomOut),
            ("Reset zoom", self.zoom_reset, Command::ZoomReset),
            (
                "Select mode",
                self.mode_select,
                Command::SetMode(Mode::Select),
            ),
            (
                "Polygon mode",
                self.mode_polygon,
                Command::SetMode(Mode::Polygon),
            ),
            ("Arrow mode", self.mode_arrow, Command::SetMode(Mode::Arrow)),
        ]
    }

    /// Get the command bound to a key press, if any.
    pub fn command_for(&self, key: Key, modifiers: Modifiers) -> Option<Command> {
        self.bindings()
            .into_iter()
            .find(|(_, chord, _)| chord.matches(key, modifiers))
            .map(|(_, _, command)| command)
    }

    /// Check if a chord is already used by another binding.
    /// Returns the name of the binding holding it, if any.
    pub fn conflict(&self, chord: Chord, exclude: Option<&str>) -> Option<&'static str> {
        self.bindings()
            .into_iter()
            .find(|(name, bound, _)| *bound == chord && Some(*name) != exclude)
            .map(|(name, _, _)| name)
    }
}

/// Convert a key to a display string.
pub fn key_to_string(key: Key) -> &'static str {
    match key {
        Key::A => "A",
        Key::B => "B",
        Key::C => "C",
        Key::D => "D",
        Key::E => "E",
        Key::F => "F",
        Key::G => "G",
        Key::H => "H",
        Key::I => "I",
        Key::J => "J",
        Key::K => "K",
        Key::L => "L",
        Key::M => "M",
        Key::N => "N",
        Key::O => "O",
        Key::P => "P",
        Key::Q => "Q",
        Key::R => "R",
        Key::S => "S",
        Key::T => "T",
        Key::U => "U",
        Key::V => "V",
        Key::W => "W",
        Key::X => "X",
        Key::Y => "Y",
        Key::Z => "Z",
        Key::Key0 => "0",
        Key::Key1 => "1",
        Key::Key2 => "2",
        Key::Key3 => "3",
        Key::Key4 => "4",
        Key::Key5 => "5",
        Key::Key6 => "6",
        Key::Key7 => "7",
        Key::Key8 => "8",
        Key::Key9 => "9",
        Key::Escape => "Esc",
        Key::Enter => "Enter",
        Key::Delete => "Del",
        Key::Backspace => "Backspace",
        Key::Space => "Space",
        Key::Tab => "Tab",
        Key::Minus => "-",
        Key::Equal => "=",
        Key::Plus => "+",
    }
}

/// Convert a chord to a display string like `Ctrl+Shift+Z`.
pub fn chord_to_string(chord: Chord) -> String {
    let mut parts = Vec::new();
    if chord.modifiers.ctrl {
        parts.push("Ctrl");
    }
    if chord.modifiers.shift {
        parts.push("Shift");
    }
    if chord.modifiers.alt {
        parts.push("Alt");
    }
    parts.push(key_to_string(chord.key));
    parts.join("+")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_chords_resolve() {
        let bindings = KeyBindings::new();

        assert_eq!(
            bindings.command_for(Key::Z, Modifiers::ctrl()),
            Some(Command::Undo)
        );
        assert_eq!(
            bindings.command_for(Key::Z, Modifiers::ctrl_shift()),
            Some(Command::Redo)
        );
        assert_eq!(
            bindings.command_for(Key::Y, Modifiers::ctrl()),
            Some(Command::Redo)
        );
        assert_eq!(
            bindings.command_for(Key::Escape, Modifiers::none()),
            Some(Command::Cancel)
        );
        assert_eq!(
            bindings.command_for(Key::P, Modifiers::none()),
            Some(Command::SetMode(Mode::Polygon))
        );
    }

    #[test]
    fn test_modifiers_must_match_exactly() {
        let bindings = KeyBindings::new();

        assert_eq!(bindings.command_for(Key::Z, Modifiers::none()), None);
        assert_eq!(
            bindings.command_for(
                Key::Delete,
                Modifiers {
                    ctrl: true,
                    ..Modifiers::none()
                }
            ),
            None
        );
    }

    #[test]
    fn test_rebinding_changes_lookup() {
        let mut bindings = KeyBindings::new();
        bindings.mode_arrow = Chord::plain(Key::W);

        assert_eq!(bindings.command_for(Key::A, Modifiers::none()), None);
        assert_eq!(
            bindings.command_for(Key::W, Modifiers::none()),
            Some(Command::SetMode(Mode::Arrow))
        );
    }

    #[test]
    fn test_conflict_detection() {
        let bindings = KeyBindings::new();

        assert_eq!(
            bindings.conflict(Chord::plain(Key::S), None),
            Some("Select mode")
        );
        assert_eq!(
            bindings.conflict(Chord::plain(Key::S), Some("Select mode")),
            None
        );
        assert_eq!(bindings.conflict(Chord::plain(Key::Q), None), None);
    }

    #[test]
    fn test_chord_display() {
        assert_eq!(chord_to_string(Chord::ctrl(Key::Z)), "Ctrl+Z");
        assert_eq!(chord_to_string(Chord::ctrl_shift(Key::Z)), "Ctrl+Shift+Z");
        assert_eq!(chord_to_string(Chord::plain(Key::Escape)), "Esc");
    }
}
