//! Rope-backed text buffer abstraction.
//!
//! Offsets throughout this crate are char indices (Unicode scalar values), not
//! bytes, so any offset a host hands over addresses a valid position once it has
//! been clamped to the buffer length. Lines are delimited by `\n` only; the rope
//! is built without the unicode/CR line-break features so the line model here
//! matches what a plain textarea considers a line.

use ropey::Rope;
use std::fmt;
use unicode_segmentation::UnicodeSegmentation;

pub mod indent;
pub mod width;

pub use indent::{Edit, indent, insert_tab, newline_with_indent, unindent};
pub use width::{display_col, expand_tabs};

/// A text buffer backed by a `ropey::Rope`.
///
/// Cloning is cheap (the rope shares its nodes), which is what makes whole
/// buffer history snapshots affordable.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Buffer {
    rope: Rope,
}

/// Caret or range selection expressed as char offsets, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    /// Construct a selection normalizing ordering so that start <= end.
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn caret(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    pub fn is_caret(&self) -> bool {
        self.start == self.end
    }

    /// Clamp signed offsets into `[0, len]`. An end that lands before the start
    /// collapses onto the start, mirroring how a text input treats an inverted
    /// selection assignment.
    pub fn clamped(start: isize, end: isize, len: usize) -> Self {
        let clamp = |v: isize| -> usize { v.clamp(0, len as isize) as usize };
        let start = clamp(start);
        let end = clamp(end).max(start);
        Self { start, end }
    }

    /// Clamp an already unsigned selection to a buffer length.
    pub fn clamp_to(self, len: usize) -> Self {
        let start = self.start.min(len);
        let end = self.end.min(len).max(start);
        Self { start, end }
    }
}

/// Boundaries of the line containing a position.
///
/// `start` is the first char of the line, `end` the position of its terminating
/// newline (or the buffer end), and `padding_tabs` the run of tab characters
/// the line begins with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineInfo {
    pub index: usize,
    pub start: usize,
    pub end: usize,
    pub padding_tabs: usize,
}

impl LineInfo {
    /// Column of `pos` relative to the line start.
    pub fn column(&self, pos: usize) -> usize {
        pos.saturating_sub(self.start)
    }
}

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a buffer from an in-memory string slice.
    pub fn from_text(content: &str) -> Self {
        Self {
            rope: Rope::from_str(content),
        }
    }

    /// Total number of chars in the buffer.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Total number of lines in the buffer. An empty buffer has one line, and a
    /// trailing newline opens a final empty line.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Return the requested line without its trailing newline.
    pub fn line(&self, idx: usize) -> Option<String> {
        if idx >= self.rope.len_lines() {
            return None;
        }
        let mut s = self.rope.line(idx).to_string();
        if s.ends_with('\n') {
            s.pop();
        }
        Some(s)
    }

    /// Text of the first line (empty for an empty buffer).
    pub fn first_line(&self) -> String {
        self.line(0).unwrap_or_default()
    }

    pub fn char_at(&self, pos: usize) -> Option<char> {
        self.rope.get_char(pos)
    }

    /// Copy out the chars in `[start, end)`, clamped to the buffer.
    pub fn slice(&self, start: usize, end: usize) -> String {
        let len = self.rope.len_chars();
        let end = end.min(len);
        let start = start.min(end);
        self.rope.slice(start..end).to_string()
    }

    /// Compare the buffer content against a string without materializing it.
    pub fn eq_text(&self, text: &str) -> bool {
        self.rope == text
    }

    /// Replace `[start, end)` with `text`. Offsets are clamped to the buffer.
    pub fn replace(&mut self, start: usize, end: usize, text: &str) {
        let len = self.rope.len_chars();
        let end = end.min(len);
        let start = start.min(end);
        if start < end {
            self.rope.remove(start..end);
        }
        if !text.is_empty() {
            self.rope.insert(start, text);
        }
    }

    pub fn insert_char(&mut self, pos: usize, ch: char) {
        let pos = pos.min(self.rope.len_chars());
        self.rope.insert_char(pos, ch);
    }

    /// Line index containing `pos` (clamped to the buffer end).
    pub fn line_of(&self, pos: usize) -> usize {
        self.rope.char_to_line(pos.min(self.rope.len_chars()))
    }

    /// First char offset of line `idx` (clamped to the last line).
    pub fn line_start(&self, idx: usize) -> usize {
        let idx = idx.min(self.rope.len_lines().saturating_sub(1));
        self.rope.line_to_char(idx)
    }

    /// Char length of line `idx`, excluding its newline.
    pub fn line_len(&self, idx: usize) -> usize {
        if idx >= self.rope.len_lines() {
            return 0;
        }
        let line = self.rope.line(idx);
        let n = line.len_chars();
        if n > 0 && line.char(n - 1) == '\n' {
            n - 1
        } else {
            n
        }
    }

    /// Scan the line containing `pos`: its start, end and leading tab run.
    pub fn line_info(&self, pos: usize) -> LineInfo {
        let index = self.line_of(pos);
        let start = self.rope.line_to_char(index);
        let end = start + self.line_len(index);
        let padding_tabs = self
            .rope
            .line(index)
            .chars()
            .take_while(|c| *c == '\t')
            .count();
        LineInfo {
            index,
            start,
            end,
            padding_tabs,
        }
    }

    /// Start of the grapheme cluster ending at `pos`. At a line start this is
    /// the preceding newline.
    pub fn prev_grapheme_start(&self, pos: usize) -> usize {
        let pos = pos.min(self.rope.len_chars());
        let info = self.line_info(pos);
        let col = info.column(pos);
        if col == 0 {
            return pos.saturating_sub(1);
        }
        let prefix = self.slice(info.start, pos);
        let width = prefix
            .graphemes(true)
            .next_back()
            .map(|g| g.chars().count())
            .unwrap_or(1);
        pos - width
    }

    /// End of the grapheme cluster starting at `pos`. At a line end this steps
    /// over the newline.
    pub fn next_grapheme_end(&self, pos: usize) -> usize {
        let len = self.rope.len_chars();
        let pos = pos.min(len);
        let info = self.line_info(pos);
        if pos >= info.end {
            return (pos + 1).min(len);
        }
        let rest = self.slice(pos, info.end);
        let width = rest
            .graphemes(true)
            .next()
            .map(|g| g.chars().count())
            .unwrap_or(1);
        pos + width
    }
}

impl From<&str> for Buffer {
    fn from(content: &str) -> Self {
        Self::from_text(content)
    }
}

impl fmt::Display for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.rope.chunks() {
            f.write_str(chunk)?;
        }
        Ok(())
    }
}

// Content is deliberately left out; buffers reach logs through `Debug` fields.
impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("chars", &self.rope.len_chars())
            .field("lines", &self.rope.len_lines())
            .finish()
    }
}
