//! Document title and dirty flag as seen by the terminal chrome.

use core_actions::{ContentObserver, UNTITLED};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocStatus {
    pub title: String,
    pub dirty: bool,
}

impl Default for DocStatus {
    fn default() -> Self {
        Self {
            title: UNTITLED.to_string(),
            dirty: false,
        }
    }
}

/// Shared handle: one clone is registered on the surface, the runtime keeps
/// the other to read from.
#[derive(Debug, Clone, Default)]
pub struct StatusTracker {
    inner: Rc<RefCell<DocStatus>>,
}

impl StatusTracker {
    pub fn snapshot(&self) -> DocStatus {
        self.inner.borrow().clone()
    }

    /// Status line text: title, dirty marker and caret position.
    pub fn line(&self, line: usize, col: usize) -> String {
        let status = self.inner.borrow();
        let marker = if status.dirty { " [+]" } else { "" };
        format!(
            "{}{marker}  Ln {}, Col {}  ^S save  ^R load  ^D download  ^Q quit",
            status.title,
            line + 1,
            col + 1
        )
    }
}

impl ContentObserver for StatusTracker {
    fn content_changed(&self, title: &str) {
        let mut status = self.inner.borrow_mut();
        status.title = title.to_string();
        status.dirty = true;
    }

    fn content_saved(&self) {
        self.inner.borrow_mut().dirty = false;
    }
}
