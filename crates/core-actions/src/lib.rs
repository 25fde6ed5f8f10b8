//! The editing surface: key interpretation, structural edits, history
//! commands and save/load/download, layered over `EditorState`.
//!
//! The surface owns the document state and its collaborators:
//! * a `PersistenceStore` and a `FileExporter` (injected, generic so callers
//!   keep typed access to them),
//! * a `NotificationService` for user-facing messages,
//! * any number of `ContentObserver`s tracking title and dirty state.
//!
//! All mutation is synchronous. Nothing here fails outward: persistence
//! errors become notifications and every other operation is total.

use chrono::TimeDelta;
use core_config::Config;
use core_events::KeyCode;
use core_notify::{DEFAULT_DURATION, NotificationService};
use core_state::EditorState;
use core_storage::{FileExporter, PersistenceStore, default_session_ttl};
use core_text::{Buffer, Selection};
use std::time::Duration;
use tracing::trace;

mod dispatcher;
mod io_ops;

pub use io_ops::{MSG_LOADED, MSG_NOT_FOUND, MSG_SAVED, derive_filename};

/// Title shown for a document whose first line is blank.
pub const UNTITLED: &str = "Untitled";

/// Whether the host should suppress its own handling of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    Consumed,
    PassThrough,
}

impl KeyDisposition {
    pub fn is_consumed(self) -> bool {
        matches!(self, KeyDisposition::Consumed)
    }
}

/// Title / dirty-state listener (window title, tab icon, status line).
pub trait ContentObserver {
    /// Content changed; the document is now dirty.
    fn content_changed(&self, title: &str);
    /// Content was persisted; the document is clean.
    fn content_saved(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceOptions {
    pub session_ttl: TimeDelta,
    pub toast_duration: Duration,
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            session_ttl: default_session_ttl(),
            toast_duration: DEFAULT_DURATION,
        }
    }
}

impl SurfaceOptions {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            session_ttl: TimeDelta::days(cfg.session_ttl_days()),
            toast_duration: cfg.file.notify.duration(),
        }
    }
}

/// Trimmed first line of the document, or `"Untitled"`.
pub fn derive_title(buffer: &Buffer) -> String {
    let first = buffer.first_line();
    let title = first.trim();
    if title.is_empty() {
        UNTITLED.to_string()
    } else {
        title.to_string()
    }
}

pub struct EditingSurface<S, E> {
    pub(crate) state: EditorState,
    pub(crate) last_key: Option<KeyCode>,
    pub(crate) store: S,
    pub(crate) exporter: E,
    pub(crate) notifier: Box<dyn NotificationService>,
    pub(crate) observers: Vec<Box<dyn ContentObserver>>,
    pub(crate) options: SurfaceOptions,
}

impl<S: PersistenceStore, E: FileExporter> EditingSurface<S, E> {
    pub fn new(store: S, exporter: E, notifier: Box<dyn NotificationService>) -> Self {
        Self::with_options(store, exporter, notifier, SurfaceOptions::default())
    }

    pub fn with_options(
        store: S,
        exporter: E,
        notifier: Box<dyn NotificationService>,
        options: SurfaceOptions,
    ) -> Self {
        Self {
            state: EditorState::new(),
            last_key: None,
            store,
            exporter,
            notifier,
            observers: Vec::new(),
            options,
        }
    }

    pub fn add_observer(&mut self, observer: Box<dyn ContentObserver>) {
        self.observers.push(observer);
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn buffer(&self) -> &Buffer {
        self.state.buffer()
    }

    pub fn text(&self) -> String {
        self.state.text()
    }

    pub fn selection(&self) -> Selection {
        self.state.selection()
    }

    pub fn last_key(&self) -> Option<KeyCode> {
        self.last_key
    }

    pub fn title(&self) -> String {
        derive_title(self.state.buffer())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn exporter(&self) -> &E {
        &self.exporter
    }

    /// The host changed the text natively (an unhandled key). Adopts the new
    /// value and selection; observers hear about it only if the text differs.
    pub fn input_changed(&mut self, text: &str, start: usize, end: usize) {
        if self.state.apply_input(text, Selection::new(start, end)) {
            self.content_changed();
        }
    }

    /// Replace the whole content. No-op when `text` equals the current buffer.
    pub fn set_editor_content(&mut self, text: &str, start: usize, end: Option<usize>) -> bool {
        let changed = self.state.set_text(text, start, end);
        if changed {
            self.content_changed();
        }
        changed
    }

    /// Move the caret or selection without editing.
    pub fn set_selection(&mut self, start: usize, end: usize) {
        self.state.set_selection(Selection::new(start, end));
    }

    pub fn push_history(&mut self) -> bool {
        self.state.push_history()
    }

    pub fn undo(&mut self) -> bool {
        let moved = self.state.undo();
        if moved {
            self.content_changed();
        }
        moved
    }

    pub fn redo(&mut self) -> bool {
        let moved = self.state.redo();
        if moved {
            self.content_changed();
        }
        moved
    }

    pub(crate) fn apply_edit(&mut self, edit: core_text::Edit) {
        let core_text::Edit { buffer, selection } = edit;
        if self
            .state
            .set_content(buffer, selection.start, Some(selection.end))
        {
            self.content_changed();
        } else {
            self.state.set_selection(selection);
        }
    }

    pub(crate) fn notify(&self, message: &str) {
        self.notifier.show(message, self.options.toast_duration);
    }

    fn content_changed(&self) {
        let title = self.title();
        trace!(target: "actions.content", observers = self.observers.len(), "content_changed");
        for obs in &self.observers {
            obs.content_changed(&title);
        }
    }

    pub(crate) fn content_saved(&self) {
        for obs in &self.observers {
            obs.content_saved();
        }
    }
}
