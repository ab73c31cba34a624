//! Session and conversation thread management.
//!
//! This module owns session identity and the ordered, persisted collection of
//! conversations. Sessions are identified by UUID and contain the full
//! message history.
//!
//! # Architecture
//!
//! - [`Session`]: a single conversation thread
//! - [`SessionStore`]: the owned collection plus active-session tracking,
//!   written through to [`HistoryStorage`](crate::persistence::HistoryStorage)
//!
//! # Example
//!
//! ```rust
//! use cura_chat::persistence::HistoryStorage;
//! use cura_chat::session::{Sender, SessionStore};
//!
//! let mut store = SessionStore::open(HistoryStorage::in_memory());
//! let id = store.create_session();
//! store.append_message(&id, Sender::User, "Hello!");
//!
//! let session = store.get_session(&id).unwrap();
//! assert_eq!(session.message_count(), 1);
//! ```

mod thread;

pub use thread::{
    DEFAULT_TITLE, Message, Sender, Session, SessionId, SessionStore, SessionSummary,
    TITLE_MAX_CHARS, derive_title,
};
