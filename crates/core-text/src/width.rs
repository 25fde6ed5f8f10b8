//! Display width of line prefixes for terminal hosts.
//!
//! Tabs advance to the next multiple of `tab_width`; every other grapheme
//! cluster takes its `unicode_width` column count, with zero-width clusters
//! widened to one so a caret never collapses onto its neighbour.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Terminal column reached after rendering `prefix`.
pub fn display_col(prefix: &str, tab_width: usize) -> usize {
    let tab_width = tab_width.max(1);
    let mut col = 0usize;
    for g in prefix.graphemes(true) {
        if g == "\t" {
            col += tab_width - (col % tab_width);
        } else {
            col += UnicodeWidthStr::width(g).max(1);
        }
    }
    col
}

/// Render a line with tabs expanded to spaces.
pub fn expand_tabs(line: &str, tab_width: usize) -> String {
    let tab_width = tab_width.max(1);
    let mut out = String::with_capacity(line.len());
    let mut col = 0usize;
    for g in line.graphemes(true) {
        if g == "\t" {
            let pad = tab_width - (col % tab_width);
            out.extend(std::iter::repeat_n(' ', pad));
            col += pad;
        } else {
            out.push_str(g);
            col += UnicodeWidthStr::width(g).max(1);
        }
    }
    out
}
