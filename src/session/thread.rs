//! Conversation sessions and the session store.

use std::fmt;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::persistence::HistoryStorage;

/// Title of a session until its first exchange completes.
pub const DEFAULT_TITLE: &str = "New Chat";

/// Maximum number of characters kept from the first message in a derived title.
pub const TITLE_MAX_CHARS: usize = 50;

const TITLE_CONTINUATION: &str = "...";

/// Opaque, immutable session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    /// The person typing.
    #[serde(rename = "user")]
    User,
    /// The reply service.
    #[serde(rename = "ai", alias = "assistant")]
    Assistant,
}

/// A single message of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who wrote the message.
    pub sender: Sender,
    /// Message text as typed or received.
    pub text: String,
}

impl Message {
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Assistant,
            text: text.into(),
        }
    }
}

/// One conversation thread.
///
/// Sessions are only mutated through [`SessionStore`]; everything else sees
/// them by shared reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    id: SessionId,
    title: String,
    #[serde(rename = "timestamp")]
    created_at: DateTime<Utc>,
    messages: Vec<Message>,
}

impl Session {
    fn new(id: SessionId) -> Self {
        Self {
            id,
            title: DEFAULT_TITLE.to_string(),
            created_at: Utc::now(),
            messages: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Messages in conversation order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Whether the title is still [`DEFAULT_TITLE`].
    #[must_use]
    pub fn has_default_title(&self) -> bool {
        self.title == DEFAULT_TITLE
    }

    /// Text of the most recent user message.
    #[must_use]
    pub fn last_user_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.sender == Sender::User)
            .map(|m| m.text.as_str())
    }

    /// True when the conversation ends with a user message that never got a reply.
    #[must_use]
    pub fn awaits_reply(&self) -> bool {
        self.messages
            .last()
            .is_some_and(|m| m.sender == Sender::User)
    }

    /// Append a message, deriving the title from the first message once the
    /// session holds two, whoever sent the second one.
    ///
    /// Returns `true` if the title changed.
    fn push(&mut self, message: Message) -> bool {
        self.messages.push(message);

        if self.messages.len() == 2 && self.has_default_title() {
            self.title = derive_title(&self.messages[0].text);
            return true;
        }
        false
    }
}

/// Title for a session whose first message is `text`.
///
/// Keeps the first [`TITLE_MAX_CHARS`] characters and adds `...` only when
/// something was cut off.
#[must_use]
pub fn derive_title(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(TITLE_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}{TITLE_CONTINUATION}")
    } else {
        head
    }
}

/// Row of the session list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub id: SessionId,
    pub title: String,
    /// Creation time in local time, e.g. `2026-10-14 at 09:30`.
    pub created: String,
    pub active: bool,
}

/// Ordered collection of sessions, newest first, with at most one active.
///
/// Every mutation is written through to the injected [`HistoryStorage`]
/// before the method returns.
#[derive(Debug)]
pub struct SessionStore {
    sessions: Vec<Session>,
    active: Option<SessionId>,
    storage: HistoryStorage,
}

impl SessionStore {
    /// Open the store with whatever history `storage` holds. No session is active.
    #[must_use]
    pub fn open(storage: HistoryStorage) -> Self {
        let sessions = storage.load();
        Self {
            sessions,
            active: None,
            storage,
        }
    }

    /// Create a session at the front of the collection and make it active.
    pub fn create_session(&mut self) -> SessionId {
        let id = SessionId::generate();
        self.sessions.insert(0, Session::new(id.clone()));
        self.active = Some(id.clone());
        self.persist();

        info!(name: "session.created", session_id = %id, "Session created");
        id
    }

    /// Append a message to the active session.
    ///
    /// Does nothing when `id` is not the active session: recording history
    /// is best-effort and never interrupts an exchange.
    pub fn append_message(&mut self, id: &SessionId, sender: Sender, text: impl Into<String>) {
        if self.active.as_ref() != Some(id) {
            debug!(name: "session.append_skipped", session_id = %id, "Append to inactive session ignored");
            return;
        }
        let Some(session) = self.sessions.iter_mut().find(|s| &s.id == id) else {
            debug!(name: "session.append_skipped", session_id = %id, "Append to unknown session ignored");
            return;
        };

        let message = Message {
            sender,
            text: text.into(),
        };
        if session.push(message) {
            info!(name: "session.titled", session_id = %id, title = %session.title, "Session title derived");
        }
        self.persist();
    }

    /// Remove a session from memory and storage.
    ///
    /// Deleting the active session leaves no session active. Returns whether
    /// anything was removed.
    pub fn delete_session(&mut self, id: &SessionId) -> bool {
        let before = self.sessions.len();
        self.sessions.retain(|s| &s.id != id);
        if self.sessions.len() == before {
            return false;
        }

        if self.active.as_ref() == Some(id) {
            self.active = None;
        }
        self.persist();

        info!(name: "session.deleted", session_id = %id, "Session deleted");
        true
    }

    /// Make an existing session active. Unknown ids change nothing.
    pub fn select_session(&mut self, id: &SessionId) -> bool {
        if self.get_session(id).is_none() {
            return false;
        }
        self.active = Some(id.clone());
        true
    }

    /// Summaries for the session list, in collection order.
    #[must_use]
    pub fn list_sessions(&self) -> Vec<SessionSummary> {
        self.sessions
            .iter()
            .map(|s| SessionSummary {
                id: s.id.clone(),
                title: s.title.clone(),
                created: s
                    .created_at
                    .with_timezone(&Local)
                    .format("%Y-%m-%d at %H:%M")
                    .to_string(),
                active: self.active.as_ref() == Some(&s.id),
            })
            .collect()
    }

    #[must_use]
    pub fn get_session(&self, id: &SessionId) -> Option<&Session> {
        self.sessions.iter().find(|s| &s.id == id)
    }

    #[must_use]
    pub fn active_id(&self) -> Option<&SessionId> {
        self.active.as_ref()
    }

    #[must_use]
    pub fn active_session(&self) -> Option<&Session> {
        self.active.as_ref().and_then(|id| self.get_session(id))
    }

    /// All sessions, newest first.
    #[must_use]
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn persist(&self) {
        self.storage.save(&self.sessions);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    fn store() -> (SessionStore, MemoryStore) {
        let backing = MemoryStore::new();
        (
            SessionStore::open(HistoryStorage::new(backing.clone())),
            backing,
        )
    }

    fn persisted(backing: &MemoryStore) -> Vec<Session> {
        HistoryStorage::new(backing.clone()).load()
    }

    #[test]
    fn test_create_inserts_at_front_and_activates() {
        let (mut store, backing) = store();

        let first = store.create_session();
        let second = store.create_session();

        assert_ne!(first, second);
        assert_eq!(store.sessions()[0].id(), &second);
        assert_eq!(store.sessions()[1].id(), &first);
        assert_eq!(store.active_id(), Some(&second));
        assert_eq!(store.sessions()[0].title(), DEFAULT_TITLE);
        assert_eq!(persisted(&backing).len(), 2);
    }

    #[test]
    fn test_append_to_inactive_or_unknown_is_noop() {
        let (mut store, backing) = store();
        let first = store.create_session();
        let _second = store.create_session();

        store.append_message(&first, Sender::User, "ignored");
        store.append_message(&SessionId::from("nope"), Sender::User, "ignored");

        assert_eq!(store.get_session(&first).unwrap().message_count(), 0);
        assert!(persisted(&backing).iter().all(|s| s.message_count() == 0));
    }

    #[test]
    fn test_title_derived_on_second_message() {
        let (mut store, backing) = store();
        let id = store.create_session();

        store.append_message(&id, Sender::User, "I have a headache");
        assert_eq!(store.get_session(&id).unwrap().title(), DEFAULT_TITLE);

        store.append_message(&id, Sender::Assistant, "Possible Cause: tension");
        assert_eq!(store.get_session(&id).unwrap().title(), "I have a headache");
        assert_eq!(persisted(&backing)[0].title(), "I have a headache");

        store.append_message(&id, Sender::User, "It got worse overnight");
        store.append_message(&id, Sender::Assistant, "See a doctor.");
        assert_eq!(store.get_session(&id).unwrap().title(), "I have a headache");
    }

    #[test]
    fn test_title_derived_from_two_unanswered_messages() {
        let (mut store, _) = store();
        let id = store.create_session();

        store.append_message(&id, Sender::User, "first question");
        store.append_message(&id, Sender::User, "second question");

        let session = store.get_session(&id).unwrap();
        assert_eq!(session.title(), "first question");
        assert!(session.awaits_reply());
        assert!(session.messages().iter().all(|m| m.sender == Sender::User));
    }

    #[test]
    fn test_derive_title_truncation() {
        let exact = "a".repeat(TITLE_MAX_CHARS);
        assert_eq!(derive_title(&exact), exact);

        let long = "b".repeat(TITLE_MAX_CHARS + 1);
        assert_eq!(derive_title(&long), format!("{}...", "b".repeat(TITLE_MAX_CHARS)));

        // Counted in characters, not bytes.
        let accented = "é".repeat(TITLE_MAX_CHARS + 5);
        let title = derive_title(&accented);
        assert_eq!(title.chars().count(), TITLE_MAX_CHARS + 3);
        assert!(title.ends_with("..."));
    }

    #[test]
    fn test_delete_active_clears_active() {
        let (mut store, backing) = store();
        let older = store.create_session();
        let active = store.create_session();

        assert!(store.delete_session(&active));
        assert!(store.active_id().is_none());
        assert!(store.active_session().is_none());
        assert_eq!(store.len(), 1);
        assert_eq!(persisted(&backing)[0].id(), &older);

        assert!(!store.delete_session(&active));
    }

    #[test]
    fn test_delete_inactive_keeps_active() {
        let (mut store, _) = store();
        let older = store.create_session();
        let active = store.create_session();

        assert!(store.delete_session(&older));
        assert_eq!(store.active_id(), Some(&active));
    }

    #[test]
    fn test_select_and_list() {
        let (mut store, backing) = store();
        let first = store.create_session();
        let _second = store.create_session();

        assert!(store.select_session(&first));
        assert!(!store.select_session(&SessionId::from("missing")));
        assert_eq!(store.active_id(), Some(&first));

        let summaries = store.list_sessions();
        assert_eq!(summaries.len(), 2);
        assert!(!summaries[0].active);
        assert!(summaries[1].active);
        assert_eq!(summaries[1].id, first);
        assert!(summaries[1].created.contains(" at "));

        let reopened = SessionStore::open(HistoryStorage::new(backing));
        assert_eq!(reopened.len(), 2);
        assert!(reopened.active_id().is_none());
    }

    #[test]
    fn test_awaits_reply_and_last_user_message() {
        let (mut store, _) = store();
        let id = store.create_session();
        assert!(!store.get_session(&id).unwrap().awaits_reply());

        store.append_message(&id, Sender::User, "I have a fever");
        let session = store.get_session(&id).unwrap();
        assert!(session.awaits_reply());
        assert_eq!(session.last_user_message(), Some("I have a fever"));

        store.append_message(&id, Sender::Assistant, "Rest and fluids.");
        let session = store.get_session(&id).unwrap();
        assert!(!session.awaits_reply());
        assert_eq!(session.last_user_message(), Some("I have a fever"));
    }

    #[test]
    fn test_sender_wire_names() {
        let json = serde_json::to_string(&Message::assistant("hi")).unwrap();
        assert_eq!(json, r#"{"sender":"ai","text":"hi"}"#);

        let parsed: Message = serde_json::from_str(r#"{"sender":"assistant","text":"x"}"#).unwrap();
        assert_eq!(parsed.sender, Sender::Assistant);
    }
}
