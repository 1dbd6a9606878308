//! Linear undo/redo over whole-state snapshots.
//!
//! Entries form a single timeline with a cursor at the current state.
//! Recording while the cursor sits mid-timeline truncates everything after
//! it, so redo is only available until the next new edit.

use crate::constants::history::MAX_ENTRIES;

/// Snapshot timeline with a cursor.
///
/// `T` is the full snapshot type; recording an entry equal to the current
/// one is a no-op, which keeps restores from polluting the timeline.
#[derive(Debug, Clone)]
pub struct History<T: Clone + PartialEq> {
    entries: Vec<T>,
    cursor: usize,
    max_entries: usize,
}

impl<T: Clone + PartialEq> Default for History<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + PartialEq> History<T> {
    pub fn new() -> Self {
        Self::with_limit(MAX_ENTRIES)
    }

    /// A history that keeps at most `max_entries` snapshots, dropping the
    /// oldest first. A limit of zero is treated as one.
    pub fn with_limit(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            max_entries: max_entries.max(1),
        }
    }

    /// The snapshot at the cursor.
    pub fn current(&self) -> Option<&T> {
        self.entries.get(self.cursor)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty() && self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Record a snapshot as the new current state.
    ///
    /// Drops any redo tail first. Returns false without touching the
    /// timeline when the snapshot equals the current entry.
    pub fn record(&mut self, snapshot: T) -> bool {
        if self.current() == Some(&snapshot) {
            return false;
        }

        self.entries.truncate(self.cursor + 1);
        self.entries.push(snapshot);
        self.cursor = self.entries.len() - 1;

        if self.entries.len() > self.max_entries {
            self.entries.remove(0);
            self.cursor -= 1;
        }

        log::trace!("Recorded history entry {}/{}", self.cursor + 1, self.entries.len());
        true
    }

    /// Step the cursor back and return the snapshot there.
    pub fn undo(&mut self) -> Option<&T> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        log::debug!("⏪ Undo to entry {}/{}", self.cursor + 1, self.entries.len());
        self.entries.get(self.cursor)
    }

    /// Step the cursor forward and return the snapshot there.
    pub fn redo(&mut self) -> Option<&T> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        log::debug!("⏩ Redo to entry {}/{}", self.cursor + 1, self.entries.len());
        self.entries.get(self.cursor)
    }

    /// Drop the whole timeline.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history() {
        let history: History<i32> = History::new();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.current(), None);
    }

    #[test]
    fn test_record_and_undo() {
        let mut history = History::new();
        assert!(history.record(1));
        assert!(history.record(2));
        assert!(history.record(3));

        assert!(history.can_undo());
        assert_eq!(history.undo(), Some(&2));
        assert_eq!(history.undo(), Some(&1));
        assert_eq!(history.undo(), None);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_redo_walks_forward() {
        let mut history = History::new();
        history.record(1);
        history.record(2);
        history.record(3);

        history.undo();
        history.undo();
        assert_eq!(history.redo(), Some(&2));
        assert_eq!(history.redo(), Some(&3));
        assert_eq!(history.redo(), None);
    }

    #[test]
    fn test_record_truncates_redo_tail() {
        let mut history = History::new();
        history.record(1);
        history.record(2);
        history.record(3);

        history.undo();
        assert!(history.can_redo());

        history.record(9);
        assert!(!history.can_redo());
        assert_eq!(history.current(), Some(&9));
        assert_eq!(history.len(), 3);

        // The abandoned branch is gone
        assert_eq!(history.undo(), Some(&2));
        assert_eq!(history.redo(), Some(&9));
    }

    #[test]
    fn test_record_dedups_current() {
        let mut history = History::new();
        assert!(history.record(1));
        assert!(!history.record(1));
        assert_eq!(history.len(), 1);

        history.record(2);
        history.undo();
        // Restoring the state we are already on records nothing
        assert!(!history.record(1));
        assert!(history.can_redo());
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut history = History::with_limit(3);
        history.record(1);
        history.record(2);
        history.record(3);
        history.record(4);

        assert_eq!(history.len(), 3);
        assert_eq!(history.current(), Some(&4));

        assert_eq!(history.undo(), Some(&3));
        assert_eq!(history.undo(), Some(&2));
        assert_eq!(history.undo(), None);
    }

    #[test]
    fn test_zero_limit_keeps_one() {
        let mut history = History::with_limit(0);
        history.record(1);
        history.record(2);
        assert_eq!(history.len(), 1);
        assert_eq!(history.current(), Some(&2));
    }

    #[test]
    fn test_reset() {
        let mut history = History::new();
        history.record(1);
        history.record(2);
        history.reset();

        assert!(history.is_empty());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.current(), None);
    }
}
