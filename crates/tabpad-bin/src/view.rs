//! Screen composition and drawing.
//!
//! `compose` is pure: it turns the document, viewport and toast state into a
//! `Frame` of already tab-expanded rows. `draw` only queues crossterm
//! commands for a frame.

use anyhow::Result;
use core_events::ToastFrame;
use core_text::{Buffer, Selection, display_col, expand_tabs};
use crossterm::{
    cursor::{MoveTo, Show},
    queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use std::io::Write;

/// Rows reserved below the text: status line and toast line.
pub const CHROME_ROWS: u16 = 2;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ToastView {
    pub message: Option<String>,
    pub opacity: f32,
    pub offset: u16,
}

impl ToastView {
    pub fn apply(&mut self, frame: ToastFrame) {
        match frame {
            ToastFrame::Show(message) => {
                self.message = Some(message);
                self.opacity = 1.0;
                self.offset = 0;
            }
            ToastFrame::Fade { opacity, offset } => {
                self.opacity = opacity;
                self.offset = offset;
            }
            ToastFrame::Hide => *self = Self::default(),
        }
    }

    fn color(&self) -> Color {
        if self.opacity > 0.66 {
            Color::White
        } else if self.opacity > 0.33 {
            Color::Grey
        } else {
            Color::DarkGrey
        }
    }
}

/// First visible line, adjusted so the caret line stays on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub top: usize,
}

impl Viewport {
    pub fn follow(&mut self, caret_line: usize, text_rows: usize) {
        let rows = text_rows.max(1);
        if caret_line < self.top {
            self.top = caret_line;
        } else if caret_line >= self.top + rows {
            self.top = caret_line + 1 - rows;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub text: String,
    /// Highlighted display-column range `[from, to)`.
    pub highlight: Option<(usize, usize)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub rows: Vec<Row>,
    pub status: String,
    pub toast: ToastView,
    /// Cursor as (column, row) in screen coordinates.
    pub cursor: (u16, u16),
}

pub struct Layout {
    pub width: u16,
    pub height: u16,
    pub tab_width: usize,
}

impl Layout {
    pub fn text_rows(&self) -> usize {
        usize::from(self.height.saturating_sub(CHROME_ROWS))
    }
}

pub fn compose(
    buffer: &Buffer,
    sel: Selection,
    viewport: Viewport,
    status: &str,
    toast: &ToastView,
    layout: &Layout,
) -> Frame {
    let tab = layout.tab_width;
    let mut rows = Vec::with_capacity(layout.text_rows());
    for idx in viewport.top..viewport.top + layout.text_rows() {
        let Some(line) = buffer.line(idx) else {
            break;
        };
        let line_start = buffer.line_start(idx);
        let line_end = line_start + line.chars().count();
        let highlight = if !sel.is_caret() && sel.start <= line_end && sel.end >= line_start {
            let from = sel.start.max(line_start) - line_start;
            let to = sel.end.min(line_end) - line_start;
            let prefix = |n: usize| line.chars().take(n).collect::<String>();
            let from = display_col(&prefix(from), tab);
            // A selected newline shows as one highlighted cell.
            let to = display_col(&prefix(to), tab) + usize::from(sel.end > line_end);
            (from < to).then_some((from, to))
        } else {
            None
        };
        rows.push(Row {
            text: expand_tabs(&line, tab),
            highlight,
        });
    }

    let caret = if sel.is_caret() { sel.start } else { sel.end };
    let info = buffer.line_info(caret);
    let col = display_col(&buffer.slice(info.start, caret), tab);
    let row = info.index.saturating_sub(viewport.top);
    let cursor = (
        col.min(usize::from(layout.width.saturating_sub(1))) as u16,
        row.min(layout.text_rows().saturating_sub(1)) as u16,
    );

    Frame {
        rows,
        status: status.to_string(),
        toast: toast.clone(),
        cursor,
    }
}

fn clip(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

pub fn draw(out: &mut impl Write, frame: &Frame, layout: &Layout) -> Result<()> {
    let width = usize::from(layout.width);
    for screen_row in 0..layout.text_rows() {
        queue!(out, MoveTo(0, screen_row as u16), Clear(ClearType::CurrentLine))?;
        let Some(row) = frame.rows.get(screen_row) else {
            continue;
        };
        match row.highlight {
            Some((from, to)) => {
                let chars: Vec<char> = row.text.chars().collect();
                let split = |a: usize, b: usize| -> String {
                    chars[a.min(chars.len())..b.min(chars.len())].iter().collect()
                };
                let selected = split(from, to);
                let pad = to.saturating_sub(chars.len().max(from));
                queue!(
                    out,
                    Print(clip(&split(0, from), width)),
                    SetAttribute(Attribute::Reverse),
                    Print(selected),
                    Print(" ".repeat(pad)),
                    SetAttribute(Attribute::NoReverse),
                    Print(split(to, chars.len())),
                )?;
            }
            None => queue!(out, Print(clip(&row.text, width)))?,
        }
    }

    let status_row = layout.height.saturating_sub(CHROME_ROWS);
    queue!(
        out,
        MoveTo(0, status_row),
        Clear(ClearType::CurrentLine),
        SetAttribute(Attribute::Reverse),
        Print(format!("{:<width$}", clip(&frame.status, width))),
        SetAttribute(Attribute::Reset),
        MoveTo(0, status_row + 1),
        Clear(ClearType::CurrentLine),
    )?;
    if let Some(message) = &frame.toast.message {
        // Multi-line messages are flattened onto the single toast row.
        let flat = message.replace('\n', " ");
        queue!(
            out,
            SetForegroundColor(frame.toast.color()),
            Print(clip(&flat, width)),
            ResetColor,
        )?;
    }
    queue!(out, MoveTo(frame.cursor.0, frame.cursor.1), Show)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn layout(height: u16) -> Layout {
        Layout {
            width: 40,
            height,
            tab_width: 4,
        }
    }

    #[test]
    fn rows_expand_tabs_and_cursor_uses_display_columns() {
        let b = Buffer::from_text("a\n\tbc");
        let f = compose(
            &b,
            Selection::caret(4),
            Viewport::default(),
            "s",
            &ToastView::default(),
            &layout(10),
        );
        assert_eq!(f.rows[1].text, "    bc");
        assert_eq!(f.cursor, (5, 1));
        assert_eq!(f.rows.len(), 2);
    }

    #[test]
    fn selection_highlight_spans_lines() {
        let b = Buffer::from_text("abc\ndef");
        let f = compose(
            &b,
            Selection::new(1, 5),
            Viewport::default(),
            "",
            &ToastView::default(),
            &layout(10),
        );
        assert_eq!(f.rows[0].highlight, Some((1, 4)));
        assert_eq!(f.rows[1].highlight, Some((0, 1)));
        assert_eq!(f.cursor, (1, 1));
    }

    #[test]
    fn viewport_follows_caret() {
        let mut vp = Viewport::default();
        vp.follow(10, 4);
        assert_eq!(vp.top, 7);
        vp.follow(8, 4);
        assert_eq!(vp.top, 7);
        vp.follow(2, 4);
        assert_eq!(vp.top, 2);
    }

    #[test]
    fn toast_view_tracks_frames() {
        let mut t = ToastView::default();
        t.apply(ToastFrame::Show("File saved.".into()));
        assert_eq!(t.message.as_deref(), Some("File saved."));
        assert_eq!(t.color(), Color::White);
        t.apply(ToastFrame::Fade { opacity: 0.2, offset: 16 });
        assert_eq!(t.color(), Color::DarkGrey);
        t.apply(ToastFrame::Hide);
        assert_eq!(t, ToastView::default());
    }

    #[test]
    fn draw_writes_status_and_toast() {
        let b = Buffer::from_text("hello");
        let mut toast = ToastView::default();
        toast.apply(ToastFrame::Show("Failed to save file:\nboom".into()));
        let f = compose(&b, Selection::caret(0), Viewport::default(), "hello", &toast, &layout(5));
        let mut out = Vec::new();
        draw(&mut out, &f, &layout(5)).unwrap();
        let s = String::from_utf8_lossy(&out);
        assert!(s.contains("hello"));
        assert!(s.contains("Failed to save file: boom"));
    }
}
