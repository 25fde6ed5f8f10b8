use crate::{PersistenceError, PersistenceResult, PersistenceStore};
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use tracing::debug;

/// In-memory store with failure injection, used by tests and embedders
/// without durable storage.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    session_expires: Option<DateTime<Utc>>,
    available: bool,
    quota: Option<usize>,
    writes: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            session_expires: None,
            available: true,
            quota: None,
            writes: 0,
        }
    }

    /// Limit the total byte size of stored values.
    pub fn with_quota(mut self, limit: usize) -> Self {
        self.quota = Some(limit);
        self
    }

    /// Toggle availability; an unavailable store fails every write.
    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    /// Successful `set` calls so far.
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn session_expires(&self) -> Option<DateTime<Utc>> {
        self.session_expires
    }

    /// Move the session marker into the past.
    pub fn expire_session(&mut self) {
        if self.session_expires.is_some() {
            self.session_expires = Some(Utc::now() - TimeDelta::seconds(1));
        }
    }

    fn check_available(&self) -> PersistenceResult<()> {
        if self.available {
            Ok(())
        } else {
            Err(PersistenceError::Unavailable("memory store disabled".into()))
        }
    }
}

impl PersistenceStore for MemoryStore {
    fn get(&self, key: &str) -> PersistenceResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> PersistenceResult<()> {
        self.check_available()?;
        if let Some(limit) = self.quota {
            let others: usize = self
                .entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            if others + value.len() > limit {
                debug!(target: "storage", key, size_bytes = value.len(), limit, "quota_exceeded");
                return Err(PersistenceError::QuotaExceeded { limit });
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }

    fn refresh_session(&mut self, ttl: TimeDelta) -> PersistenceResult<()> {
        self.check_available()?;
        self.session_expires = Some(Utc::now() + ttl);
        Ok(())
    }

    fn has_valid_session(&self) -> bool {
        self.session_expires.is_some_and(|t| Utc::now() < t)
    }
}
