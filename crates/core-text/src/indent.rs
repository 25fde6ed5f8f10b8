//! Structural edits driven by the Tab and Enter keys.
//!
//! Each function is pure: it takes the current buffer and selection and
//! returns the replacement content plus the selection to install, leaving the
//! caller to decide how the mutation is committed (history, change hooks).
//!
//! Indent and Unindent act on the closed range of lines touched by the
//! selection endpoints. Their selection remapping keeps a caret that sits
//! inside a line's leading tab run from being pushed past the tab that was
//! added or removed. The thresholds are asymmetric (`<` when growing, `<=`
//! when shrinking); unindent therefore pulls a caret one column left even on a
//! line that had no tab to remove.

use crate::{Buffer, Selection};

/// Result of a structural edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub buffer: Buffer,
    pub selection: Selection,
}

/// Insert one tab at a caret.
pub fn insert_tab(buffer: &Buffer, caret: usize) -> Edit {
    let caret = caret.min(buffer.len_chars());
    let mut out = buffer.clone();
    out.insert_char(caret, '\t');
    Edit {
        buffer: out,
        selection: Selection::caret(caret + 1),
    }
}

/// Prepend one tab to every line in the selected range, blank lines included.
pub fn indent(buffer: &Buffer, sel: Selection) -> Edit {
    let sel = sel.clamp_to(buffer.len_chars());
    let first = buffer.line_info(sel.start);
    let last = buffer.line_info(sel.end);

    let mut out = buffer.clone();
    for line in (first.index..=last.index).rev() {
        let at = out.line_start(line);
        out.insert_char(at, '\t');
    }

    let delta = out.len_chars() as isize - buffer.len_chars() as isize;
    let start = sel.start as isize;
    let end = sel.end as isize;

    let new_start = if first.padding_tabs < first.column(sel.start) {
        start + 1
    } else {
        start
    };
    let new_end = if last.padding_tabs < last.column(sel.end) {
        end + delta
    } else {
        end + delta - 1
    };

    finish(out, new_start, new_end)
}

/// Remove one leading tab from each line in the selected range that has one.
/// Lines without a leading tab are left untouched; the length delta reflects
/// only the tabs actually removed.
pub fn unindent(buffer: &Buffer, sel: Selection) -> Edit {
    let sel = sel.clamp_to(buffer.len_chars());
    let first = buffer.line_info(sel.start);
    let last = buffer.line_info(sel.end);

    let mut out = buffer.clone();
    for line in (first.index..=last.index).rev() {
        let at = out.line_start(line);
        if out.char_at(at) == Some('\t') {
            out.replace(at, at + 1, "");
        }
    }

    let delta = out.len_chars() as isize - buffer.len_chars() as isize;
    let start = sel.start as isize;
    let end = sel.end as isize;

    let new_end = if last.padding_tabs <= last.column(sel.end) {
        end + delta
    } else {
        end + delta + 1
    };
    let new_start = if first.padding_tabs <= first.column(sel.start) {
        start - 1
    } else {
        start
    };

    finish(out, new_start, new_end)
}

/// Break the line at the caret, carrying over the current line's leading tabs.
///
/// When the line holds only whitespace the replacement starts at the line
/// start instead of the caret, so a blank indented line is re-indented rather
/// than left behind with trailing tabs. The caret lands at
/// `start + padding_tabs + 1`, clamped to the new content.
pub fn newline_with_indent(buffer: &Buffer, sel: Selection) -> Edit {
    let sel = sel.clamp_to(buffer.len_chars());
    let info = buffer.line_info(sel.start);
    let blank = buffer.slice(info.start, info.end).trim().is_empty();
    let cut = if blank { info.start } else { sel.start };

    let mut inserted = String::with_capacity(info.padding_tabs + 1);
    inserted.push('\n');
    inserted.extend(std::iter::repeat_n('\t', info.padding_tabs));

    let mut out = buffer.clone();
    out.replace(cut, sel.end, &inserted);

    let caret = (sel.start + info.padding_tabs + 1) as isize;
    finish(out, caret, caret)
}

fn finish(buffer: Buffer, start: isize, end: isize) -> Edit {
    let selection = Selection::clamped(start, end, buffer.len_chars());
    Edit { buffer, selection }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn buf(s: &str) -> Buffer {
        Buffer::from_text(s)
    }

    #[test]
    fn tab_at_caret() {
        let e = insert_tab(&buf("ab"), 1);
        assert_eq!(e.buffer.to_string(), "a\tb");
        assert_eq!(e.selection, Selection::caret(2));
    }

    #[test]
    fn indent_every_line_including_blank() {
        let e = indent(&buf("a\n\nb\nc"), Selection::new(0, 4));
        assert_eq!(e.buffer.to_string(), "\ta\n\t\n\tb\nc");
    }

    #[test]
    fn indent_shifts_selection_past_content() {
        // "a\nb", select from after 'a' to after 'b'
        let e = indent(&buf("a\nb"), Selection::new(1, 3));
        assert_eq!(e.buffer.to_string(), "\ta\n\tb");
        assert_eq!(e.selection, Selection::new(2, 5));
    }

    #[test]
    fn indent_caret_at_line_start_does_not_jump() {
        let e = indent(&buf("a\nb"), Selection::new(0, 2));
        assert_eq!(e.buffer.to_string(), "\ta\n\tb");
        // start stays at 0, end (col 0 of line 2) gets delta - 1
        assert_eq!(e.selection, Selection::new(0, 3));
    }

    #[test]
    fn indent_caret_inside_existing_tabs() {
        // caret sits between the two leading tabs on both ends
        let e = indent(&buf("\t\tx\n\t\ty"), Selection::new(1, 5));
        assert_eq!(e.buffer.to_string(), "\t\t\tx\n\t\t\ty");
        assert_eq!(e.selection, Selection::new(1, 6));
    }

    #[test]
    fn unindent_removes_one_tab_where_present() {
        let e = unindent(&buf("\t\ta\nb\n\tc"), Selection::new(0, 8));
        assert_eq!(e.buffer.to_string(), "\ta\nb\nc");
    }

    #[test]
    fn unindent_selection_remap() {
        // "\ta\n\tb" select from after 'a' to after 'b'
        let e = unindent(&buf("\ta\n\tb"), Selection::new(2, 5));
        assert_eq!(e.buffer.to_string(), "a\nb");
        assert_eq!(e.selection, Selection::new(1, 3));
    }

    #[test]
    fn unindent_line_without_tabs_keeps_text() {
        let e = unindent(&buf("abc"), Selection::caret(2));
        assert_eq!(e.buffer.to_string(), "abc");
        // zero padding satisfies the `<=` threshold for both ends
        assert_eq!(e.selection, Selection::new(1, 2));
    }

    #[test]
    fn unindent_caret_at_buffer_start_clamps() {
        let e = unindent(&buf("abc"), Selection::caret(0));
        assert_eq!(e.selection, Selection::caret(0));
    }

    #[test]
    fn indent_then_unindent_restores_text() {
        for (text, sel) in [
            ("a\nb", Selection::new(0, 3)),
            ("\tfoo\n\n\t\tbar\nbaz", Selection::new(2, 12)),
            ("one line", Selection::new(3, 5)),
            ("x\n", Selection::new(0, 2)),
        ] {
            let original = buf(text);
            let grown = indent(&original, sel);
            let shrunk = unindent(&grown.buffer, grown.selection);
            assert_eq!(shrunk.buffer.to_string(), text, "round trip for {text:?}");
        }
    }

    #[test]
    fn newline_keeps_indentation() {
        let e = newline_with_indent(&buf("\t\tfoo"), Selection::caret(5));
        assert_eq!(e.buffer.to_string(), "\t\tfoo\n\t\t");
        assert_eq!(e.selection, Selection::caret(8));
    }

    #[test]
    fn newline_replaces_selection() {
        let e = newline_with_indent(&buf("\tab cd"), Selection::new(3, 5));
        assert_eq!(e.buffer.to_string(), "\tab\n\td");
        assert_eq!(e.selection, Selection::caret(5));
    }

    #[test]
    fn newline_on_blank_line_reindents_from_line_start() {
        let e = newline_with_indent(&buf("x\n\t\t\ny"), Selection::caret(4));
        assert_eq!(e.buffer.to_string(), "x\n\n\t\t\ny");
        assert_eq!(e.selection, Selection::caret(7));
    }

    #[test]
    fn newline_caret_clamped_to_content() {
        let e = newline_with_indent(&buf("\t\t"), Selection::caret(2));
        assert_eq!(e.buffer.to_string(), "\n\t\t");
        assert_eq!(e.selection, Selection::caret(3));
    }

    #[test]
    fn newline_in_empty_buffer() {
        let e = newline_with_indent(&buf(""), Selection::caret(0));
        assert_eq!(e.buffer.to_string(), "\n");
        assert_eq!(e.selection, Selection::caret(1));
    }
}
