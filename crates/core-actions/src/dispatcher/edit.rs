//! Tab / Shift+Tab / Enter edits.

use crate::EditingSurface;
use core_storage::{FileExporter, PersistenceStore};
use core_text::{indent, insert_tab, newline_with_indent, unindent};
use tracing::trace;

impl<S: PersistenceStore, E: FileExporter> EditingSurface<S, E> {
    /// Tab: a caret gets a literal tab, a range gets indented.
    pub(crate) fn tab(&mut self) {
        let sel = self.state.selection();
        let edit = if sel.is_caret() {
            trace!(target: "actions.edit", op = "insert_tab", pos = sel.start);
            insert_tab(self.state.buffer(), sel.start)
        } else {
            trace!(target: "actions.edit", op = "indent", start = sel.start, end = sel.end);
            indent(self.state.buffer(), sel)
        };
        self.apply_edit(edit);
    }

    pub(crate) fn unindent_selection(&mut self) {
        let sel = self.state.selection();
        trace!(target: "actions.edit", op = "unindent", start = sel.start, end = sel.end);
        let edit = unindent(self.state.buffer(), sel);
        self.apply_edit(edit);
    }

    pub(crate) fn newline(&mut self) {
        let sel = self.state.selection();
        trace!(target: "actions.edit", op = "newline", start = sel.start, end = sel.end);
        let edit = newline_with_indent(self.state.buffer(), sel);
        self.apply_edit(edit);
    }
}
