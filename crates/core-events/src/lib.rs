//! Core event types for tabpad.
//!
//! Keys arrive as a `KeyEvent` (logical key + modifier set). Two derived views
//! drive the editing surface: the canonical chord string used for command
//! lookup, and the milestone classification used for undo checkpoints.

use std::fmt;
use std::sync::atomic::AtomicU64;

// The host loop uses a bounded mpsc channel; the input task parks on a full
// channel rather than dropping keys.
pub const EVENT_CHANNEL_CAP: usize = 1024;

pub static CHANNEL_SEND_FAILURES: AtomicU64 = AtomicU64::new(0);
pub static KEYPRESS_TOTAL: AtomicU64 = AtomicU64::new(0);

/// Top-level event enum consumed by the host event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Input(InputEvent),
    /// Display update emitted by the notification queue.
    Toast(ToastFrame),
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    /// Terminal resize (columns, rows).
    Resize(u16, u16),
}

/// Visual state of the notification box.
#[derive(Debug, Clone, PartialEq)]
pub enum ToastFrame {
    Show(String),
    /// Intermediate fade frame: opacity in `[0, 1]` and downward drift in rows.
    Fade { opacity: f32, offset: u16 },
    Hide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

/// Normalized logical keys. Space is `Char(' ')`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Tab,
    Backspace,
    Delete,
    Esc,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct KeyModifiers: u8 {
        const CTRL = 0b0000_0001;
        const ALT  = 0b0000_0010;
        const SHIFT= 0b0000_0100;
    }
}

impl KeyCode {
    /// Key name as it appears in chord strings (`"Tab"`, `"z"`, `" "`).
    pub fn name(&self) -> String {
        match self {
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Enter => "Enter".into(),
            KeyCode::Tab => "Tab".into(),
            KeyCode::Backspace => "Backspace".into(),
            KeyCode::Delete => "Delete".into(),
            KeyCode::Esc => "Escape".into(),
            KeyCode::Up => "ArrowUp".into(),
            KeyCode::Down => "ArrowDown".into(),
            KeyCode::Left => "ArrowLeft".into(),
            KeyCode::Right => "ArrowRight".into(),
            KeyCode::Home => "Home".into(),
            KeyCode::End => "End".into(),
        }
    }

    /// Keys whose press, when different from the previous key, forces an
    /// undo checkpoint before the edit they trigger.
    pub fn is_milestone(&self) -> bool {
        matches!(
            self,
            KeyCode::Char(' ')
                | KeyCode::Tab
                | KeyCode::Enter
                | KeyCode::Backspace
                | KeyCode::Delete
        )
    }
}

impl KeyEvent {
    pub fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    pub fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::empty())
    }

    pub fn is_chord(&self) -> bool {
        self.mods.intersects(KeyModifiers::ALT | KeyModifiers::CTRL)
    }

    /// Canonical chord string `[Alt+][Ctrl+][Shift+]<key>`, only when Alt or
    /// Ctrl is held. ASCII letters are lowercased so hosts that report shifted
    /// capitals resolve to the same chord.
    pub fn chord(&self) -> Option<String> {
        if !self.is_chord() {
            return None;
        }
        let mut out = String::new();
        if self.mods.contains(KeyModifiers::ALT) {
            out.push_str("Alt+");
        }
        if self.mods.contains(KeyModifiers::CTRL) {
            out.push_str("Ctrl+");
        }
        if self.mods.contains(KeyModifiers::SHIFT) {
            out.push_str("Shift+");
        }
        match self.code {
            KeyCode::Char(c) => out.push(c.to_ascii_lowercase()),
            other => out.push_str(&other.name()),
        }
        Some(out)
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.chord() {
            Some(chord) => f.write_str(&chord),
            None if self.mods.contains(KeyModifiers::SHIFT) => {
                write!(f, "Shift+{}", self.code.name())
            }
            None => f.write_str(&self.code.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, mods: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, mods)
    }

    #[test]
    fn chord_order_is_alt_ctrl_shift() {
        let k = key(
            KeyCode::Char('z'),
            KeyModifiers::SHIFT | KeyModifiers::CTRL | KeyModifiers::ALT,
        );
        assert_eq!(k.chord().as_deref(), Some("Alt+Ctrl+Shift+z"));
    }

    #[test]
    fn shift_alone_is_not_a_chord() {
        let k = key(KeyCode::Tab, KeyModifiers::SHIFT);
        assert!(k.chord().is_none());
        assert_eq!(k.to_string(), "Shift+Tab");
    }

    #[test]
    fn shifted_capital_normalizes() {
        let k = key(KeyCode::Char('Z'), KeyModifiers::CTRL | KeyModifiers::SHIFT);
        assert_eq!(k.chord().as_deref(), Some("Ctrl+Shift+z"));
    }

    #[test]
    fn named_keys_in_chords() {
        let k = key(KeyCode::Enter, KeyModifiers::CTRL);
        assert_eq!(k.chord().as_deref(), Some("Ctrl+Enter"));
    }

    #[test]
    fn milestone_keys() {
        for code in [
            KeyCode::Char(' '),
            KeyCode::Tab,
            KeyCode::Enter,
            KeyCode::Backspace,
            KeyCode::Delete,
        ] {
            assert!(code.is_milestone(), "{code:?}");
        }
        for code in [KeyCode::Char('a'), KeyCode::Left, KeyCode::Esc] {
            assert!(!code.is_milestone(), "{code:?}");
        }
    }
}
