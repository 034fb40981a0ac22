#[cfg(test)]
#[path = "session_store_test.rs"]
mod tests;

use std::collections::HashSet;

use anyhow::Result;
use chrono::Utc;

use super::IdGenerator;
use crate::domain::models::Message;
use crate::domain::models::Session;
use crate::domain::models::StorageBox;

/// Storage key holding the whole session collection.
pub const STORAGE_KEY: &str = "chatHistory";

/// Owns the saved sessions, newest first, and the pointer to the session
/// currently being shown. Every change is written back to storage as a
/// full copy of the collection.
pub struct SessionStore {
    storage: StorageBox,
    sessions: Vec<Session>,
    current_id: Option<String>,
    ids: IdGenerator,
}

impl SessionStore {
    pub fn new(storage: StorageBox) -> SessionStore {
        return SessionStore {
            storage,
            sessions: vec![],
            current_id: None,
            ids: IdGenerator::new(),
        };
    }

    /// Loads the persisted collection and points at the newest session.
    pub fn open(storage: StorageBox) -> SessionStore {
        let mut store = SessionStore::new(storage);
        store.sessions = store.load();
        store.current_id = store.sessions.first().map(|e| return e.id.to_string());

        tracing::debug!(
            storage = store.storage.name().to_string(),
            sessions = store.sessions.len(),
            "Opened session store"
        );

        return store;
    }

    /// Reads the persisted collection. Missing, unreadable or malformed data
    /// yields an empty collection. Only the first session of a repeated id is
    /// kept.
    pub fn load(&self) -> Vec<Session> {
        let payload = match self.storage.get(STORAGE_KEY) {
            Ok(Some(payload)) => payload,
            Ok(None) => return vec![],
            Err(err) => {
                tracing::warn!(error = ?err, "Failed to read chat history");
                return vec![];
            }
        };

        let sessions: Vec<Session> = match serde_json::from_str(&payload) {
            Ok(sessions) => sessions,
            Err(err) => {
                tracing::warn!(error = ?err, "Ignoring malformed chat history");
                return vec![];
            }
        };

        let mut seen = HashSet::new();
        let sessions = sessions
            .into_iter()
            .filter(|session| {
                if seen.insert(session.id.to_string()) {
                    return true;
                }
                tracing::warn!(id = session.id, "Dropping session with a duplicate id");
                return false;
            })
            .collect::<Vec<Session>>();

        for session in sessions.iter() {
            self.ids.observe(&session.id);
            for message in session.messages.iter() {
                self.ids.observe(&message.id);
            }
        }

        return sessions;
    }

    /// Persists `sessions` as the entire collection, replacing what was
    /// stored before. The current pointer is dropped if its session is gone.
    pub fn save(&mut self, sessions: Vec<Session>) -> Result<()> {
        let payload = serde_json::to_string(&sessions)?;
        self.storage.set(STORAGE_KEY, &payload)?;

        if let Some(current_id) = &self.current_id {
            if !sessions.iter().any(|e| return &e.id == current_id) {
                self.current_id = None;
            }
        }
        self.sessions = sessions;

        return Ok(());
    }

    pub fn sessions(&self) -> &[Session] {
        return &self.sessions;
    }

    pub fn get(&self, id: &str) -> Option<&Session> {
        return self.sessions.iter().find(|e| return e.id == id);
    }

    pub fn current_id(&self) -> Option<&str> {
        return self.current_id.as_deref();
    }

    pub fn current(&self) -> Option<&Session> {
        return self.current_id.as_ref().and_then(|id| return self.get(id));
    }

    pub fn next_id(&self) -> String {
        return self.ids.next_id();
    }

    /// Starts a new session at the head of the collection and makes it the
    /// current one.
    pub fn create_session(
        &mut self,
        first_message_text: &str,
        messages: Vec<Message>,
    ) -> Result<Session> {
        let session = Session::new(&self.next_id(), first_message_text, messages, Utc::now());

        let mut sessions = Vec::with_capacity(self.sessions.len() + 1);
        sessions.push(session.clone());
        sessions.extend(self.sessions.iter().cloned());
        self.save(sessions)?;
        self.current_id = Some(session.id.to_string());

        tracing::debug!(id = session.id, title = session.title, "Created session");

        return Ok(session);
    }

    /// Replaces the messages of session `id`. Unknown ids leave the collection
    /// untouched.
    pub fn update_session(&mut self, id: &str, messages: Vec<Message>) -> Result<&[Session]> {
        if self.get(id).is_none() {
            tracing::debug!(id, "Skipping update of unknown session");
            return Ok(&self.sessions);
        }

        let now = Utc::now();
        let sessions = self
            .sessions
            .iter()
            .map(|session| {
                let mut session = session.clone();
                if session.id == id {
                    session.replace_messages(messages.clone(), now);
                }
                return session;
            })
            .collect::<Vec<Session>>();
        self.save(sessions)?;

        tracing::debug!(id, "Updated session");

        return Ok(&self.sessions);
    }

    /// Removes session `id`. When it was the current session, the newest
    /// remaining session becomes current.
    pub fn delete_session(&mut self, id: &str) -> Result<&[Session]> {
        if self.get(id).is_none() {
            tracing::debug!(id, "Skipping delete of unknown session");
            return Ok(&self.sessions);
        }

        let was_current = self.current_id() == Some(id);
        let sessions = self
            .sessions
            .iter()
            .filter(|e| return e.id != id)
            .cloned()
            .collect::<Vec<Session>>();
        self.save(sessions)?;

        if was_current {
            self.current_id = self.sessions.first().map(|e| return e.id.to_string());
        }

        tracing::debug!(id, current = ?self.current_id, "Deleted session");

        return Ok(&self.sessions);
    }

    /// Points at session `id` if it exists.
    pub fn select_session(&mut self, id: &str) -> Option<&Session> {
        if self.get(id).is_none() {
            return None;
        }

        self.current_id = Some(id.to_string());
        return self.current();
    }

    /// Leaves the current session so the next message starts a new one.
    pub fn clear_current(&mut self) {
        self.current_id = None;
    }

    /// Drops every session, including the persisted copy.
    pub fn clear(&mut self) -> Result<()> {
        self.storage.remove(STORAGE_KEY)?;
        self.sessions = vec![];
        self.current_id = None;

        return Ok(());
    }
}
