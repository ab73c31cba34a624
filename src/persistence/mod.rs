//! Persistence of the session collection.
//!
//! The whole collection is stored as one JSON document under a fixed key of
//! a [`KeyValueStore`]. Reads fail soft: anything missing or unreadable is
//! treated as an empty history. Writes always overwrite the previous document
//! and a failed write is logged and dropped, since losing history never
//! stops a conversation.
//!
//! # Stores
//!
//! - [`MemoryStore`]: process-local map, shared between clones
//! - [`FileStore`]: JSON file on disk holding a key → value object

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use tracing::{debug, warn};

use crate::error::StorageError;
use crate::session::Session;

/// Key under which the session collection is stored.
pub const HISTORY_KEY: &str = "curaai_chat_history";

/// Synchronous string key/value store.
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Reads and writes the session collection as a single blob.
#[derive(Debug)]
pub struct HistoryStorage {
    store: Box<dyn KeyValueStore>,
    key: String,
}

impl HistoryStorage {
    /// Store history under [`HISTORY_KEY`].
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self::with_key(store, HISTORY_KEY)
    }

    /// Store history under a custom key.
    pub fn with_key(store: impl KeyValueStore + 'static, key: impl Into<String>) -> Self {
        Self {
            store: Box::new(store),
            key: key.into(),
        }
    }

    /// History that lives only as long as the process.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Load the stored collection, or an empty one if nothing usable is stored.
    #[must_use]
    pub fn load(&self) -> Vec<Session> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(name: "history.load_failed", key = %self.key, error = %e, "Could not read chat history");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Session>>(&raw) {
            Ok(sessions) => {
                debug!(name: "history.loaded", count = sessions.len(), "Chat history loaded");
                sessions
            }
            Err(e) => {
                warn!(name: "history.parse_failed", key = %self.key, error = %e, "Stored chat history is unreadable, starting empty");
                Vec::new()
            }
        }
    }

    /// Overwrite the stored collection with `sessions`.
    pub fn save(&self, sessions: &[Session]) {
        if let Err(e) = self.try_save(sessions) {
            warn!(name: "history.save_failed", key = %self.key, error = %e, "Could not persist chat history");
        }
    }

    fn try_save(&self, sessions: &[Session]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(sessions)?;
        self.store.set(&self.key, &raw)
    }
}
