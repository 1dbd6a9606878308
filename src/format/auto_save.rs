//! Auto-save gate with debouncing.
//!
//! Decides when the editor should persist the current annotation set,
//! batching rapid edits and bounding how often the archive is written.

use std::time::Duration;
use web_time::Instant;

/// Manages auto-save timing with debouncing.
///
/// Two mechanisms prevent excessive writes:
/// 1. **Debounce delay**: after an edit, wait this long before saving so a
///    burst of edits lands as one record.
/// 2. **Minimum interval**: enforce a floor between saves even while edits
///    keep arriving.
#[derive(Debug)]
pub struct AutoSaveManager {
    save_interval: Duration,
    debounce_delay: Duration,
    /// When the most recent unsaved edit happened. `None` means clean.
    pending_since: Option<Instant>,
    last_save: Option<Instant>,
    enabled: bool,
}

impl AutoSaveManager {
    /// Default minimum interval between saves (30 seconds).
    pub const DEFAULT_SAVE_INTERVAL: Duration = Duration::from_secs(30);

    /// Default debounce delay (2 seconds).
    pub const DEFAULT_DEBOUNCE_DELAY: Duration = Duration::from_secs(2);

    pub fn new() -> Self {
        Self {
            save_interval: Self::DEFAULT_SAVE_INTERVAL,
            debounce_delay: Self::DEFAULT_DEBOUNCE_DELAY,
            pending_since: None,
            last_save: None,
            enabled: true,
        }
    }

    /// A gate that never fires. Edits are still tracked, so enabling later
    /// picks up pending work.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new()
        }
    }

    /// Set the minimum interval between saves.
    pub fn with_save_interval(mut self, interval: Duration) -> Self {
        self.save_interval = interval;
        self
    }

    /// Set the debounce delay.
    pub fn with_debounce_delay(mut self, delay: Duration) -> Self {
        self.debounce_delay = delay;
        self
    }

    /// Note an edit that will need persisting. Restarts the debounce window.
    pub fn mark_dirty(&mut self) {
        self.pending_since = Some(Instant::now());
        log::trace!("Auto-save: edit pending");
    }

    /// Whether any edits are waiting to be persisted.
    pub fn is_dirty(&self) -> bool {
        self.pending_since.is_some()
    }

    /// Whether a save should run now: enabled, edits pending, the debounce
    /// window elapsed, and the interval floor since the last save respected.
    pub fn should_save(&self) -> bool {
        if !self.enabled {
            return false;
        }
        let Some(pending_since) = self.pending_since else {
            return false;
        };

        let debounced = pending_since.elapsed() >= self.debounce_delay;
        let spaced = self
            .last_save
            .is_none_or(|at| at.elapsed() >= self.save_interval);
        debounced && spaced
    }

    /// Note that a save completed, clearing pending edits.
    pub fn mark_saved(&mut self) {
        self.pending_since = None;
        self.last_save = Some(Instant::now());
        log::trace!("Auto-save: saved");
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        log::debug!("Auto-save: enabled = {}", enabled);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Drop all timing state. Used when a different image is bound.
    pub fn reset(&mut self) {
        self.pending_since = None;
        self.last_save = None;
    }
}

impl Default for AutoSaveManager {
    fn default() -> Self {
        Self::new()
    }
}
