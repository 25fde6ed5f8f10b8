use core_events::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::event::{
    KeyCode as CKeyCode, KeyEvent as CKeyEvent, KeyEventKind as CKeyEventKind,
    KeyModifiers as CKeyModifiers,
};

/// Map a crossterm key event into the editor key model.
///
/// Returns `None` for releases and for keys the editor has no use for
/// (function keys, media keys, lone modifiers).
pub(crate) fn map_key_event(event: &CKeyEvent) -> Option<KeyEvent> {
    if !matches!(event.kind, CKeyEventKind::Press | CKeyEventKind::Repeat) {
        return None;
    }
    let mut mods = map_mods(event.modifiers);
    let code = match event.code {
        CKeyCode::Char(c) => KeyCode::Char(c),
        CKeyCode::Enter => KeyCode::Enter,
        CKeyCode::Tab => KeyCode::Tab,
        // Terminals report Shift+Tab as a distinct key.
        CKeyCode::BackTab => {
            mods |= KeyModifiers::SHIFT;
            KeyCode::Tab
        }
        CKeyCode::Backspace => KeyCode::Backspace,
        CKeyCode::Delete => KeyCode::Delete,
        CKeyCode::Esc => KeyCode::Esc,
        CKeyCode::Up => KeyCode::Up,
        CKeyCode::Down => KeyCode::Down,
        CKeyCode::Left => KeyCode::Left,
        CKeyCode::Right => KeyCode::Right,
        CKeyCode::Home => KeyCode::Home,
        CKeyCode::End => KeyCode::End,
        _ => return None,
    };
    Some(KeyEvent::new(code, mods))
}

pub(crate) fn map_mods(m: CKeyModifiers) -> KeyModifiers {
    let mut out = KeyModifiers::empty();
    if m.contains(CKeyModifiers::CONTROL) {
        out |= KeyModifiers::CTRL;
    }
    if m.contains(CKeyModifiers::ALT) {
        out |= KeyModifiers::ALT;
    }
    if m.contains(CKeyModifiers::SHIFT) {
        out |= KeyModifiers::SHIFT;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: CKeyCode, mods: CKeyModifiers) -> CKeyEvent {
        CKeyEvent::new(code, mods)
    }

    #[test]
    fn maps_ctrl_chords() {
        let ev = map_key_event(&press(CKeyCode::Char('z'), CKeyModifiers::CONTROL)).unwrap();
        assert_eq!(ev, KeyEvent::new(KeyCode::Char('z'), KeyModifiers::CTRL));
        assert_eq!(ev.chord().as_deref(), Some("Ctrl+z"));
    }

    #[test]
    fn backtab_becomes_shift_tab() {
        let ev = map_key_event(&press(CKeyCode::BackTab, CKeyModifiers::SHIFT)).unwrap();
        assert_eq!(ev, KeyEvent::new(KeyCode::Tab, KeyModifiers::SHIFT));
        let ev = map_key_event(&press(CKeyCode::BackTab, CKeyModifiers::NONE)).unwrap();
        assert!(ev.mods.contains(KeyModifiers::SHIFT));
        assert!(!ev.is_chord());
    }

    #[test]
    fn releases_and_unused_keys_are_dropped() {
        let release = CKeyEvent::new_with_kind_and_state(
            CKeyCode::Char('a'),
            CKeyModifiers::NONE,
            CKeyEventKind::Release,
            KeyEventState::NONE,
        );
        assert_eq!(map_key_event(&release), None);
        assert_eq!(map_key_event(&press(CKeyCode::F(5), CKeyModifiers::NONE)), None);
        assert_eq!(map_key_event(&press(CKeyCode::PageUp, CKeyModifiers::NONE)), None);
    }

    #[test]
    fn modifier_bits_translate() {
        let m = map_mods(CKeyModifiers::CONTROL | CKeyModifiers::ALT | CKeyModifiers::SHIFT);
        assert_eq!(m, KeyModifiers::CTRL | KeyModifiers::ALT | KeyModifiers::SHIFT);
        assert_eq!(map_mods(CKeyModifiers::NONE), KeyModifiers::empty());
    }
}
