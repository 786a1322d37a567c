pub(crate) mod bookmarks;
pub(crate) mod history;
pub(crate) mod prefs;
pub(crate) mod writer;

#[cfg(test)]
use std::collections::HashMap;
#[cfg(test)]
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use self::bookmarks::BookmarkStore;
use self::history::HistoryStore;
use self::prefs::Preferences;
use self::writer::SnapshotSink;

pub(crate) const KEY_THEME: &str = "anishelf.theme";
pub(crate) const KEY_BOOKMARKS: &str = "anishelf.bookmarks";
pub(crate) const KEY_WATCH_HISTORY: &str = "anishelf.watch_history";
pub(crate) const KEY_REMINDER_SEEN: &str = "anishelf.reminder_seen";

#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("storage writer is no longer running")]
    WriterClosed,
}

pub(crate) type StoreResult<T> = std::result::Result<T, StoreError>;

/// Durable string key-value storage. Values are JSON documents.
pub(crate) trait KeyValueStore: Send {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> StoreResult<()>;
}

/// Every piece of client state, loaded once at start and handed to the surfaces.
pub(crate) struct Shelf {
    pub(crate) history: HistoryStore,
    pub(crate) bookmarks: BookmarkStore,
    pub(crate) prefs: Preferences,
}

impl Shelf {
    pub(crate) fn load(kv: &dyn KeyValueStore, sink: SnapshotSink) -> Self {
        Self {
            history: HistoryStore::load(kv, sink.clone()),
            bookmarks: BookmarkStore::load(kv, sink.clone()),
            prefs: Preferences::load(kv, sink),
        }
    }
}

/// Reads and parses `key`. Missing keys, read failures and bad JSON all yield `None`.
pub(crate) fn load_json<T: DeserializeOwned>(kv: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match kv.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!(key, "no stored value");
            return None;
        }
        Err(err) => {
            warn!(key, error = %err, "failed to read stored value");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(key, error = %err, "ignoring unparseable stored value");
            None
        }
    }
}

/// Reads a JSON array stored under `key` element by element.
///
/// Elements that do not fit `T` are logged and skipped so one bad entry does
/// not cost the rest of the list. Anything that is not a JSON array yields an
/// empty list.
pub(crate) fn load_json_list<T: DeserializeOwned>(kv: &dyn KeyValueStore, key: &str) -> Vec<T> {
    let Some(elements) = load_json::<Vec<Value>>(kv, key) else {
        return Vec::new();
    };

    let total = elements.len();
    let items: Vec<T> = elements
        .into_iter()
        .enumerate()
        .filter_map(|(idx, element)| match serde_json::from_value(element) {
            Ok(item) => Some(item),
            Err(err) => {
                warn!(key, index = idx, error = %err, "skipping unreadable stored entry");
                None
            }
        })
        .collect();
    if items.len() != total {
        warn!(key, kept = items.len(), total, "dropped unreadable stored entries");
    }
    items
}

#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

#[cfg(test)]
impl MemoryStore {
    pub(crate) fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::default();
        store.insert(key, value);
        store
    }

    pub(crate) fn insert(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), value.to_string());
    }

    pub(crate) fn raw(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.raw(key))
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.insert(key, value);
        Ok(())
    }
}
