//! core-keymap: chord to command mapping.
//!
//! Pure and deterministic: the input is a canonical chord string
//! (`[Alt+][Ctrl+][Shift+]<key>`, see `core_events::KeyEvent::chord`) and the
//! output is at most one `Command`. There is no state and no layering; an
//! unmapped chord yields `None` and the caller lets the key through.

use std::fmt;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Undo,
    Redo,
    Save,
    Load,
    Download,
}

impl Command {
    pub fn as_str(self) -> &'static str {
        match self {
            Command::Undo => "undo",
            Command::Redo => "redo",
            Command::Save => "save",
            Command::Load => "load",
            Command::Download => "download",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Built-in bindings, in lookup order.
pub const BINDINGS: &[(&str, Command)] = &[
    ("Ctrl+z", Command::Undo),
    ("Ctrl+Shift+z", Command::Redo),
    ("Ctrl+y", Command::Redo),
    ("Ctrl+s", Command::Save),
    ("Ctrl+r", Command::Load),
    ("Ctrl+d", Command::Download),
];

/// Resolve a canonical chord string.
pub fn resolve(chord: &str) -> Option<Command> {
    let hit = BINDINGS
        .iter()
        .find(|(binding, _)| *binding == chord)
        .map(|(_, cmd)| *cmd);
    trace!(target: "input.keymap", chord, command = hit.map(Command::as_str), "resolve");
    hit
}

/// Resolve a key event; non-chord keys (no Alt/Ctrl) never map to a command.
#[cfg(feature = "events")]
pub fn resolve_key(key: &core_events::KeyEvent) -> Option<Command> {
    key.chord().as_deref().and_then(resolve)
}
