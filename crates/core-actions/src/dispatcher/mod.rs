//! Key interpretation for the editing surface.
//!
//! Order of evaluation for a key press:
//! 1. A chord (Alt/Ctrl held) that resolves to a command runs the command.
//!    Unmapped chords pass through untouched and are not remembered.
//! 2. A milestone key that differs from the previous key pushes a history
//!    snapshot before anything else happens. The previous key is updated on
//!    every non-chord press.
//! 3. Tab, Shift+Tab and Enter run their structural edit (`edit`); every
//!    other key is left to the host.

use crate::{EditingSurface, KeyDisposition};
use core_events::{KEYPRESS_TOTAL, KeyCode, KeyEvent, KeyModifiers};
use core_storage::{FileExporter, PersistenceStore};
use std::sync::atomic::Ordering;
use tracing::{debug, trace};

mod command;
mod edit;

impl<S: PersistenceStore, E: FileExporter> EditingSurface<S, E> {
    /// Single entry point for raw key input.
    pub fn handle_key_down(&mut self, key: KeyEvent) -> KeyDisposition {
        KEYPRESS_TOTAL.fetch_add(1, Ordering::Relaxed);

        if key.is_chord() {
            return match core_keymap::resolve_key(&key) {
                Some(cmd) => {
                    self.execute(cmd);
                    KeyDisposition::Consumed
                }
                None => {
                    trace!(target: "actions.key", "chord_unmapped");
                    KeyDisposition::PassThrough
                }
            };
        }

        if key.code.is_milestone() && self.last_key != Some(key.code) {
            let pushed = self.state.push_history();
            debug!(target: "actions.key", key = ?key.code, pushed, "milestone_boundary");
        }
        self.last_key = Some(key.code);

        let shift = key.mods.contains(KeyModifiers::SHIFT);
        match key.code {
            KeyCode::Tab if shift => self.unindent_selection(),
            KeyCode::Tab => self.tab(),
            KeyCode::Enter => self.newline(),
            _ => return KeyDisposition::PassThrough,
        }
        KeyDisposition::Consumed
    }
}
