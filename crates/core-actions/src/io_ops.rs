//! Save, load and download.
//!
//! Save and load are idempotent while the document is unchanged: the
//! `saved` / `loaded_from_store` flags short-circuit them and any content
//! change re-arms both. Failures surface as notifications and leave state as
//! it was.

use crate::{EditingSurface, derive_title};
use core_storage::{FileExporter, KEY_END, KEY_START, KEY_TEXT, PersistenceResult, PersistenceStore};
use tracing::{debug, info, warn};

const ILLEGAL_FILENAME_CHARS: &[char] = &['/', '*', ':', '?', '"', '<', '>', '|'];

pub const MSG_SAVED: &str = "File saved.";
pub const MSG_LOADED: &str = "File loaded.";
pub const MSG_NOT_FOUND: &str = "File not found.";

/// File name used by download: the document title with characters illegal
/// in file names replaced by spaces, trimmed, and `.txt` appended when the
/// name has no dot in it. Names made only of dots (or nothing) become
/// `Untitled.txt`.
pub fn derive_filename(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| if ILLEGAL_FILENAME_CHARS.contains(&c) { ' ' } else { c })
        .collect();
    let mut name = cleaned.trim().to_string();
    if name.chars().all(|c| c == '.') {
        name = crate::UNTITLED.to_string();
    }
    if !name.contains('.') {
        name.push_str(".txt");
    }
    name
}

/// Offsets as stored: unparsable or missing start is 0, missing or
/// unparsable end falls back to start.
fn parse_offsets(start: Option<&str>, end: Option<&str>) -> (usize, usize) {
    let start = start.and_then(|s| s.trim().parse().ok()).unwrap_or(0);
    let end = end.and_then(|s| s.trim().parse().ok()).unwrap_or(start);
    (start, end)
}

impl<S: PersistenceStore, E: FileExporter> EditingSurface<S, E> {
    pub fn save(&mut self) {
        if self.state.flags.saved {
            debug!(target: "actions.io", "save_skipped_unchanged");
            return;
        }
        match self.write_store() {
            Ok(()) => {
                self.state.mark_saved();
                self.content_saved();
                info!(target: "actions.io", chars = self.state.buffer().len_chars(), "saved");
                self.notify(MSG_SAVED);
            }
            Err(e) => {
                warn!(target: "actions.io", error = %e, "save_failed");
                self.notify(&format!("Failed to save file:\n{e}"));
            }
        }
    }

    fn write_store(&mut self) -> PersistenceResult<()> {
        let sel = self.state.selection();
        let text = self.state.text();
        self.store.refresh_session(self.options.session_ttl)?;
        self.store.set(KEY_TEXT, &text)?;
        self.store.set(KEY_START, &sel.start.to_string())?;
        self.store.set(KEY_END, &sel.end.to_string())?;
        Ok(())
    }

    pub fn load(&mut self) {
        if self.state.flags.loaded_from_store {
            debug!(target: "actions.io", "load_skipped_unchanged");
            return;
        }
        if !self.store.has_valid_session() {
            debug!(target: "actions.io", "load_no_session");
            self.notify(MSG_NOT_FOUND);
            return;
        }
        let stored = self.store.get(KEY_TEXT).and_then(|text| {
            let Some(text) = text else {
                return Ok(None);
            };
            let start = self.store.get(KEY_START)?;
            let end = self.store.get(KEY_END)?;
            Ok(Some((text, parse_offsets(start.as_deref(), end.as_deref()))))
        });
        match stored {
            Ok(Some((text, (start, end)))) => {
                self.set_editor_content(&text, start, Some(end));
                self.state.mark_loaded();
                info!(target: "actions.io", chars = self.state.buffer().len_chars(), "loaded");
                self.notify(MSG_LOADED);
            }
            Ok(None) => {
                debug!(target: "actions.io", "load_no_text");
                self.notify(MSG_NOT_FOUND);
            }
            Err(e) => {
                warn!(target: "actions.io", error = %e, "load_failed");
                self.notify(&format!("Failed to load file:\n{e}"));
            }
        }
    }

    /// Export the whole buffer under a name derived from its title.
    pub fn download(&mut self) {
        let filename = derive_filename(&derive_title(self.state.buffer()));
        let text = self.state.text();
        match self.exporter.export_text(&filename, &text) {
            Ok(()) => {
                info!(target: "actions.io", chars = self.state.buffer().len_chars(), "downloaded");
            }
            Err(e) => {
                warn!(target: "actions.io", error = %e, "download_failed");
                self.notify(&format!("Failed to download file:\n{e}"));
            }
        }
    }
}
