#![allow(dead_code)] // Shared across integration tests; each test binary uses a subset of helpers.

use core_actions::{ContentObserver, EditingSurface, KeyDisposition};
use core_events::{KeyCode, KeyEvent, KeyModifiers};
use core_notify::NotificationService;
use core_storage::{MemoryExporter, MemoryStore};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub type Surface = EditingSurface<MemoryStore, MemoryExporter>;

/// Notification sink recording every message in order.
#[derive(Clone, Default)]
pub struct Notes {
    messages: Arc<Mutex<Vec<String>>>,
}

impl Notes {
    pub fn all(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.messages.lock().unwrap().last().cloned()
    }
}

impl NotificationService for Notes {
    fn show(&self, message: &str, _duration: Duration) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleEvent {
    Dirty(String),
    Clean,
}

#[derive(Clone, Default)]
pub struct Titles {
    events: Arc<Mutex<Vec<TitleEvent>>>,
}

impl Titles {
    pub fn all(&self) -> Vec<TitleEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl ContentObserver for Titles {
    fn content_changed(&self, title: &str) {
        self.events
            .lock()
            .unwrap()
            .push(TitleEvent::Dirty(title.to_string()));
    }

    fn content_saved(&self) {
        self.events.lock().unwrap().push(TitleEvent::Clean);
    }
}

pub struct Harness {
    pub surface: Surface,
    pub notes: Notes,
    pub titles: Titles,
}

pub fn harness() -> Harness {
    harness_with_store(MemoryStore::new())
}

pub fn harness_with_store(store: MemoryStore) -> Harness {
    let notes = Notes::default();
    let titles = Titles::default();
    let mut surface = EditingSurface::new(store, MemoryExporter::new(), Box::new(notes.clone()));
    surface.add_observer(Box::new(titles.clone()));
    Harness {
        surface,
        notes,
        titles,
    }
}

pub fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::plain(code)
}

pub fn ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CTRL)
}

pub fn ctrl_shift(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CTRL | KeyModifiers::SHIFT)
}

pub fn shift_tab() -> KeyEvent {
    KeyEvent::new(KeyCode::Tab, KeyModifiers::SHIFT)
}

/// Emulate a textarea: the key goes to the surface first and, when it is not
/// consumed, printable chars replace the selection and Backspace/Delete
/// remove the selection or one grapheme, as the terminal host does.
pub fn type_key(s: &mut Surface, ev: KeyEvent) -> KeyDisposition {
    let disposition = s.handle_key_down(ev);
    if disposition == KeyDisposition::Consumed || ev.is_chord() {
        return disposition;
    }
    let sel = s.selection();
    let (from, to, insert) = match ev.code {
        KeyCode::Char(c) => (sel.start, sel.end, Some(c)),
        KeyCode::Backspace if sel.is_caret() => {
            (s.buffer().prev_grapheme_start(sel.start), sel.end, None)
        }
        KeyCode::Delete if sel.is_caret() => {
            (sel.start, s.buffer().next_grapheme_end(sel.start), None)
        }
        KeyCode::Backspace | KeyCode::Delete => (sel.start, sel.end, None),
        _ => return disposition,
    };
    let mut text: Vec<char> = s.text().chars().collect();
    text.splice(from..to, insert);
    let text: String = text.into_iter().collect();
    let caret = from + usize::from(insert.is_some());
    s.input_changed(&text, caret, caret);
    disposition
}

pub fn type_str(s: &mut Surface, text: &str) {
    for c in text.chars() {
        type_key(s, key(KeyCode::Char(c)));
    }
}
