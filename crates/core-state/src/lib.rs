//! Editor state: text buffer, selection, undo history and persistence flags.
//!
//! `EditorState` is the single owner of the live document. Every content
//! mutation goes through `set_content` (or `apply_input` for text the host
//! already changed natively) so the change hook runs exactly once per real
//! change:
//! - the history's pending-commit flag is cleared, so the next milestone
//!   boundary snapshots the new state;
//! - `saved` and `loaded_from_store` reset, re-arming save and load.
//!
//! History snapshots are taken lazily: callers decide when a boundary is
//! crossed and call `push_history`; `undo` commits any in-flight edit first so
//! it stays reachable through `redo`.

use core_text::{Buffer, Selection};
use tracing::{debug, trace};

pub mod undo;
pub use undo::{HistoryEntry, HistoryLog};

/// Gates idempotent save/load: both reset on every content change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditorFlags {
    pub saved: bool,
    pub loaded_from_store: bool,
}

/// Top-level editor state container.
#[derive(Debug, Clone, Default)]
pub struct EditorState {
    buffer: Buffer,
    selection: Selection,
    history: HistoryLog,
    pub flags: EditorFlags,
}

impl EditorState {
    /// Empty document with the caret at 0 and a single history entry.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Move the caret/selection without touching content. Offsets are clamped.
    pub fn set_selection(&mut self, selection: Selection) {
        let len = self.buffer.len_chars();
        self.selection = Selection::new(selection.start, selection.end).clamp_to(len);
    }

    /// Replace the content and selection. No-op (returns false) when the new
    /// content equals the current buffer; otherwise runs the change hook.
    ///
    /// `end` defaults to `start`. Offsets are clamped to the new content and an
    /// end before the start collapses onto the start.
    pub fn set_content(&mut self, buffer: Buffer, start: usize, end: Option<usize>) -> bool {
        if buffer == self.buffer {
            trace!(target: "state.content", chars = buffer.len_chars(), "set_content_unchanged");
            return false;
        }
        let len = buffer.len_chars();
        self.buffer = buffer;
        self.selection = Selection {
            start,
            end: end.unwrap_or(start),
        }
        .clamp_to(len);
        self.content_changed();
        true
    }

    /// String convenience for `set_content`.
    pub fn set_text(&mut self, text: &str, start: usize, end: Option<usize>) -> bool {
        if self.buffer.eq_text(text) {
            return false;
        }
        self.set_content(Buffer::from_text(text), start, end)
    }

    /// Adopt content the host already changed through native text input.
    /// The selection is always taken; the change hook only runs when the text
    /// actually differs.
    pub fn apply_input(&mut self, text: &str, selection: Selection) -> bool {
        let changed = !self.buffer.eq_text(text);
        if changed {
            self.buffer = Buffer::from_text(text);
            self.content_changed();
        }
        self.set_selection(selection);
        changed
    }

    fn content_changed(&mut self) {
        self.history.mark_dirty();
        self.flags = EditorFlags::default();
        trace!(target: "state.content", chars = self.buffer.len_chars(), start = self.selection.start, end = self.selection.end, "content_changed");
    }

    /// Snapshot the live state if it is uncommitted and differs from the
    /// entry at the history cursor.
    pub fn push_history(&mut self) -> bool {
        self.history.push(&self.buffer, self.selection)
    }

    /// Commit any in-flight edit, then restore the previous entry.
    /// Returns true when the history cursor moved.
    pub fn undo(&mut self) -> bool {
        self.push_history();
        let Some(entry) = self.history.step_back() else {
            return false;
        };
        let HistoryEntry { buffer, selection } = entry;
        self.set_content(buffer, selection.start, Some(selection.end));
        self.history.mark_committed();
        debug!(target: "state.undo", index = self.history.index(), len = self.history.len(), "undo");
        true
    }

    /// Restore the next entry if one exists. Returns true when the history
    /// cursor moved.
    ///
    /// An uncommitted edit made after an undo is snapshotted first, which
    /// truncates the forward entries; the redo then has nothing to restore and
    /// the edit is kept.
    pub fn redo(&mut self) -> bool {
        self.push_history();
        let Some(entry) = self.history.step_forward() else {
            return false;
        };
        let HistoryEntry { buffer, selection } = entry;
        self.set_content(buffer, selection.start, Some(selection.end));
        debug!(target: "state.undo", index = self.history.index(), len = self.history.len(), "redo");
        true
    }

    pub fn mark_saved(&mut self) {
        self.flags.saved = true;
    }

    pub fn mark_loaded(&mut self) {
        self.flags.loaded_from_store = true;
    }
}
