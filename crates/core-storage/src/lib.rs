//! Persistence and export ports consumed by the editing surface.
//!
//! Two capabilities are injected into the surface rather than reached through
//! globals:
//! * `PersistenceStore`: string key/value storage plus a session marker with
//!   a rolling expiry. Stored text is only trusted while the marker is valid.
//! * `FileExporter`: hands the whole buffer to the host under a file name.
//!
//! Both may fail; failures are `PersistenceError` values the surface reports
//! to the user and never propagates further.

use chrono::TimeDelta;
use thiserror::Error;

mod export;
mod file_store;
mod memory;

pub use export::{DirectoryExporter, MemoryExporter};
pub use file_store::FileStore;
pub use memory::MemoryStore;

/// Storage keys written by save and read by load.
pub const KEY_TEXT: &str = "text";
pub const KEY_START: &str = "start";
pub const KEY_END: &str = "end";

/// Default lifetime of the session marker.
pub const SESSION_TTL_DAYS: i64 = 7;

pub fn default_session_ttl() -> TimeDelta {
    TimeDelta::days(SESSION_TTL_DAYS)
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage quota exceeded ({limit} bytes)")]
    QuotaExceeded { limit: usize },
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage document malformed: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Key/value storage with a session marker.
pub trait PersistenceStore {
    fn get(&self, key: &str) -> PersistenceResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> PersistenceResult<()>;
    /// (Re)write the session marker so it expires `ttl` from now.
    fn refresh_session(&mut self, ttl: TimeDelta) -> PersistenceResult<()>;
    /// True while an unexpired session marker exists.
    fn has_valid_session(&self) -> bool;
}

/// Client-side download of text content.
pub trait FileExporter {
    fn export_text(&mut self, filename: &str, content: &str) -> PersistenceResult<()>;
}
