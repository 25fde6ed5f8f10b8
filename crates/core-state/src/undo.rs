use core_text::{Buffer, Selection};
use tracing::trace;

/// A snapshot of buffer + selection. Offsets are valid for `buffer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub buffer: Buffer,
    pub selection: Selection,
}

impl HistoryEntry {
    pub fn new(buffer: Buffer, selection: Selection) -> Self {
        Self { buffer, selection }
    }
}

/// Linear undo log with a cursor.
///
/// Invariants:
/// * `entries` is never empty and `entries[0]` is the initial state.
/// * `0 <= index < entries.len()`.
/// * Pushing after an undo truncates everything past `index` first (redo
///   branch discarded).
///
/// `pending_commit` is true while the live buffer is already captured by a
/// snapshot. Content changes clear it; a push or an undo sets it.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
    index: usize,
    pending_commit: bool,
    snapshots_skipped: u64,
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryLog {
    pub fn new() -> Self {
        Self {
            entries: vec![HistoryEntry::new(Buffer::new(), Selection::caret(0))],
            index: 0,
            pending_commit: true,
            snapshots_skipped: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.index]
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    pub fn is_committed(&self) -> bool {
        self.pending_commit
    }

    /// Number of push requests that found nothing new to record.
    pub fn snapshots_skipped(&self) -> u64 {
        self.snapshots_skipped
    }

    /// The live buffer diverged from the last snapshot.
    pub fn mark_dirty(&mut self) {
        self.pending_commit = false;
    }

    /// The live buffer matches a snapshot and must not be captured again.
    pub fn mark_committed(&mut self) {
        self.pending_commit = true;
    }

    /// Record the live state if it is uncommitted and differs from the entry
    /// at the cursor. Returns true when an entry was appended; calling twice
    /// without an intervening change is a no-op the second time.
    pub fn push(&mut self, buffer: &Buffer, selection: Selection) -> bool {
        if self.pending_commit || self.entries[self.index].buffer == *buffer {
            self.snapshots_skipped += 1;
            trace!(target: "state.undo", index = self.index, len = self.entries.len(), committed = self.pending_commit, "snapshot_skip");
            return false;
        }
        let discarded = self.entries.len() - (self.index + 1);
        self.entries.truncate(self.index + 1);
        self.entries.push(HistoryEntry::new(buffer.clone(), selection));
        self.index += 1;
        self.pending_commit = true;
        trace!(target: "state.undo", index = self.index, len = self.entries.len(), discarded, chars = buffer.len_chars(), "push_snapshot");
        true
    }

    /// Move the cursor one entry back, returning the entry to restore.
    pub fn step_back(&mut self) -> Option<HistoryEntry> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        trace!(target: "state.undo", index = self.index, len = self.entries.len(), "undo_step");
        Some(self.entries[self.index].clone())
    }

    /// Move the cursor one entry forward, returning the entry to restore.
    pub fn step_forward(&mut self) -> Option<HistoryEntry> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        trace!(target: "state.undo", index = self.index, len = self.entries.len(), "redo_step");
        Some(self.entries[self.index].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buf(s: &str) -> Buffer {
        Buffer::from_text(s)
    }

    #[test]
    fn starts_with_single_empty_entry() {
        let log = HistoryLog::new();
        assert_eq!(log.len(), 1);
        assert_eq!(log.index(), 0);
        assert!(log.current().buffer.is_empty());
        assert_eq!(log.current().selection, Selection::caret(0));
        assert!(log.is_committed());
    }

    #[test]
    fn push_requires_uncommitted_change() {
        let mut log = HistoryLog::new();
        assert!(!log.push(&buf("a"), Selection::caret(1)), "committed state");
        log.mark_dirty();
        assert!(!log.push(&buf(""), Selection::caret(0)), "same as current");
        assert!(log.push(&buf("a"), Selection::caret(1)));
        assert!(!log.push(&buf("a"), Selection::caret(1)));
        assert_eq!(log.len(), 2);
        assert_eq!(log.snapshots_skipped(), 3);
    }

    #[test]
    fn push_after_step_back_discards_redo_branch() {
        let mut log = HistoryLog::new();
        for text in ["a", "ab", "abc"] {
            log.mark_dirty();
            log.push(&buf(text), Selection::caret(text.len()));
        }
        assert_eq!(log.len(), 4);
        log.step_back();
        log.step_back();
        assert!(log.can_redo());
        log.mark_dirty();
        assert!(log.push(&buf("x"), Selection::caret(1)));
        assert_eq!(log.len(), 3);
        assert!(!log.can_redo());
        assert!(log.current().buffer.eq_text("x"));
    }

    #[test]
    fn step_bounds() {
        let mut log = HistoryLog::new();
        assert!(log.step_back().is_none());
        assert!(log.step_forward().is_none());
        log.mark_dirty();
        log.push(&buf("a"), Selection::caret(1));
        assert!(log.step_forward().is_none());
        let back = log.step_back().unwrap();
        assert!(back.buffer.is_empty());
        let fwd = log.step_forward().unwrap();
        assert!(fwd.buffer.eq_text("a"));
    }
}
