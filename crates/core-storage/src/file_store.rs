use crate::{PersistenceResult, PersistenceStore};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const DOCUMENT_NAME: &str = "store.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    entries: BTreeMap<String, String>,
    #[serde(default)]
    session_expires: Option<DateTime<Utc>>,
}

/// Durable store: one JSON document inside a directory, rewritten on every
/// mutation (write to a temp file, then rename over the old one).
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    doc: StoreDocument,
}

impl FileStore {
    /// Open (or create) the store under `dir`. A malformed document is an
    /// error rather than silently discarded content.
    pub fn open(dir: impl AsRef<Path>) -> PersistenceResult<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(DOCUMENT_NAME);
        let doc = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            StoreDocument::default()
        };
        info!(target: "storage", path = %path.display(), entries = doc.entries.len(), "file_store_open");
        Ok(Self { path, doc })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> PersistenceResult<()> {
        let json = serde_json::to_string_pretty(&self.doc)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json.as_bytes())?;
        fs::rename(&tmp, &self.path)?;
        debug!(target: "storage", size_bytes = json.len(), "file_store_flush");
        Ok(())
    }
}

impl PersistenceStore for FileStore {
    fn get(&self, key: &str) -> PersistenceResult<Option<String>> {
        Ok(self.doc.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> PersistenceResult<()> {
        let previous = self.doc.entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.flush() {
            // keep memory consistent with disk
            match previous {
                Some(v) => self.doc.entries.insert(key.to_string(), v),
                None => self.doc.entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn refresh_session(&mut self, ttl: TimeDelta) -> PersistenceResult<()> {
        let previous = self.doc.session_expires.replace(Utc::now() + ttl);
        if let Err(e) = self.flush() {
            self.doc.session_expires = previous;
            return Err(e);
        }
        Ok(())
    }

    fn has_valid_session(&self) -> bool {
        self.doc.session_expires.is_some_and(|t| Utc::now() < t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = FileStore::open(dir.path()).unwrap();
            store.set("text", "hello\n\tworld").unwrap();
            store.refresh_session(TimeDelta::days(7)).unwrap();
        }
        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.get("text").unwrap().as_deref(), Some("hello\n\tworld"));
        assert!(store.has_valid_session());
    }

    #[test]
    fn no_session_until_refreshed() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        store.set("text", "x").unwrap();
        assert!(!store.has_valid_session());
    }

    #[test]
    fn expired_marker_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        store.refresh_session(TimeDelta::seconds(-5)).unwrap();
        assert!(!store.has_valid_session());
    }

    #[test]
    fn malformed_document_errors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DOCUMENT_NAME), "{ not json").unwrap();
        let err = FileStore::open(dir.path()).unwrap_err();
        assert!(matches!(err, crate::PersistenceError::Serialize(_)));
    }
}
