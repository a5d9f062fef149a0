//! Best-effort persistence of submitted user messages.
//!
//! The store is allowed to be missing, full, or hold garbage. None of that is
//! ever surfaced to callers: reads degrade to an empty list and failed writes
//! leave the in-memory state authoritative.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use thiserror::Error;
use tracing::warn;

use super::recent::RecencyList;

/// Key/value persistence consumed by the engine. Implementations must not
/// panic; anything that goes wrong is reported as `None` / `Err`.
pub trait KeyValueStore {
    fn load(&self, key: &str) -> Result<Option<String>, CacheError>;
    fn save(&mut self, key: &str, value: &str) -> Result<(), CacheError>;
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("cached value under {key} is not a JSON string list: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode user messages: {0}")]
    Encode(#[source] serde_json::Error),
}

/// In-process store for headless use and tests. Clones share the same
/// entries, so a test can keep a handle after giving one to the engine.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        store.entries.borrow_mut().insert(key.to_string(), value.to_string());
        store
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.get(key))
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), CacheError> {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Persisted, most-recent-first list of user submissions.
pub struct UserMessageCache {
    key: String,
    messages: RecencyList,
    store: Box<dyn KeyValueStore>,
}

impl UserMessageCache {
    /// Read and normalise the cached list, then write the normalised form
    /// back. Any failure yields an empty list.
    pub fn open(store: Box<dyn KeyValueStore>, key: &str, capacity: usize) -> Self {
        let messages = match decode(store.as_ref(), key) {
            Ok(list) => RecencyList::from_ordered(capacity, list),
            Err(err) => {
                warn!(%err, "user message cache unreadable, starting empty");
                RecencyList::new(capacity)
            }
        };
        let mut cache = Self { key: key.to_string(), messages, store };
        cache.persist();
        cache
    }

    /// Prepend `text` (dedup, bounded) and persist.
    pub fn remember(&mut self, text: &str) {
        self.messages.push_front(text);
        self.persist();
    }

    pub fn messages(&self) -> &RecencyList {
        &self.messages
    }

    fn persist(&mut self) {
        let result = serde_json::to_string(&self.messages.to_vec())
            .map_err(CacheError::Encode)
            .and_then(|raw| self.store.save(&self.key, &raw));
        if let Err(err) = result {
            warn!(%err, key = %self.key, "could not persist user messages");
        }
    }
}

fn decode(store: &dyn KeyValueStore, key: &str) -> Result<Vec<String>, CacheError> {
    match store.load(key)? {
        None => Ok(Vec::new()),
        Some(raw) => serde_json::from_str::<Vec<String>>(&raw).map_err(|source| {
            CacheError::Decode { key: key.to_string(), source }
        }),
    }
}
