//! Command execution for resolved chords.

use crate::EditingSurface;
use core_keymap::Command;
use core_storage::{FileExporter, PersistenceStore};
use tracing::info;

impl<S: PersistenceStore, E: FileExporter> EditingSurface<S, E> {
    /// Run a command as if its chord had been pressed.
    pub fn execute(&mut self, cmd: Command) {
        info!(target: "actions.command", command = cmd.as_str(), "execute");
        match cmd {
            Command::Undo => {
                self.undo();
            }
            Command::Redo => {
                self.redo();
            }
            Command::Save => self.save(),
            Command::Load => self.load(),
            Command::Download => self.download(),
        }
    }
}
