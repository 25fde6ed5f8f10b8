//! Text-input behaviour for keys the editing surface leaves to the host.
//!
//! A browser textarea inserts characters, deletes by grapheme and moves the
//! caret on its own; the terminal has no such widget, so this module computes
//! the same result and the runtime reports it back through
//! `EditingSurface::input_changed` / `set_selection`.

use core_events::{KeyCode, KeyEvent, KeyModifiers};
use core_text::{Buffer, Selection};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeOutcome {
    /// Content changed; new text and selection.
    Edited { text: String, selection: Selection },
    /// Only the caret / selection moved.
    Moved(Selection),
    Quit,
    Ignored,
}

pub fn apply(buffer: &Buffer, sel: Selection, key: KeyEvent) -> NativeOutcome {
    if key.is_chord() {
        return match key.code {
            KeyCode::Char('q') if key.mods.contains(KeyModifiers::CTRL) => NativeOutcome::Quit,
            _ => NativeOutcome::Ignored,
        };
    }
    match key.code {
        KeyCode::Esc => NativeOutcome::Quit,
        KeyCode::Char(c) => replace(buffer, sel.start, sel.end, &c.to_string()),
        KeyCode::Backspace => {
            if !sel.is_caret() {
                replace(buffer, sel.start, sel.end, "")
            } else if sel.start == 0 {
                NativeOutcome::Ignored
            } else {
                replace(buffer, buffer.prev_grapheme_start(sel.start), sel.start, "")
            }
        }
        KeyCode::Delete => {
            if !sel.is_caret() {
                replace(buffer, sel.start, sel.end, "")
            } else if sel.start >= buffer.len_chars() {
                NativeOutcome::Ignored
            } else {
                replace(buffer, sel.start, buffer.next_grapheme_end(sel.start), "")
            }
        }
        KeyCode::Left if sel.is_caret() => moved(buffer.prev_grapheme_start(sel.start)),
        KeyCode::Left => moved(sel.start),
        KeyCode::Right if sel.is_caret() => moved(buffer.next_grapheme_end(sel.end)),
        KeyCode::Right => moved(sel.end),
        KeyCode::Home => moved(buffer.line_info(sel.start).start),
        KeyCode::End => moved(buffer.line_info(sel.end).end),
        KeyCode::Up => vertical(buffer, sel.start, -1),
        KeyCode::Down => vertical(buffer, sel.end, 1),
        KeyCode::Enter | KeyCode::Tab => NativeOutcome::Ignored,
    }
}

fn replace(buffer: &Buffer, start: usize, end: usize, text: &str) -> NativeOutcome {
    let mut out = buffer.clone();
    out.replace(start, end, text);
    let caret = start + text.chars().count();
    NativeOutcome::Edited {
        text: out.to_string(),
        selection: Selection::caret(caret),
    }
}

fn moved(pos: usize) -> NativeOutcome {
    NativeOutcome::Moved(Selection::caret(pos))
}

/// Move one line up or down keeping the char column where the target line
/// is long enough. Past the first/last line the caret goes to the buffer
/// start/end.
fn vertical(buffer: &Buffer, pos: usize, dir: isize) -> NativeOutcome {
    let info = buffer.line_info(pos);
    let col = info.column(pos);
    let target = info.index as isize + dir;
    if target < 0 {
        return moved(0);
    }
    let target = target as usize;
    if target >= buffer.line_count() {
        return moved(buffer.len_chars());
    }
    let start = buffer.line_start(target);
    moved(start + col.min(buffer.line_len(target)))
}
