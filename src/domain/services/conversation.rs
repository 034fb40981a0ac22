#[cfg(test)]
#[path = "conversation_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::anyhow;
use anyhow::Result;
use chrono::Utc;
use tokio::sync::mpsc;
use tokio::time;

use super::SessionStore;
use crate::domain::models::Attachment;
use crate::domain::models::BackendBox;
use crate::domain::models::BackendPrompt;
use crate::domain::models::Event;
use crate::domain::models::Message;
use crate::domain::models::Sender;
use crate::domain::models::Session;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConversationState {
    Idle,
    AwaitingResponse,
}

#[derive(Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// Nothing to send: blank text and no attachments.
    Ignored,
    /// The backend answered and the session history was saved.
    Replied {
        messages: Vec<Message>,
        sessions: Vec<Session>,
    },
    /// The backend failed. The user message is kept in memory but the
    /// session history is not written.
    Failed { error: String },
}

/// The messages of the active session, plus the plumbing to get a reply for
/// each new user message and record both in the session store.
pub struct Conversation {
    backend: BackendBox,
    store: SessionStore,
    messages: Vec<Message>,
    state: ConversationState,
    response_timeout: Option<Duration>,
    events: Option<mpsc::UnboundedSender<Event>>,
}

impl Conversation {
    pub fn new(backend: BackendBox, store: SessionStore) -> Conversation {
        let messages = store
            .current()
            .map(|session| return session.messages.clone())
            .unwrap_or_default();

        return Conversation {
            backend,
            store,
            messages,
            state: ConversationState::Idle,
            response_timeout: None,
            events: None,
        };
    }

    pub fn with_events(mut self, tx: mpsc::UnboundedSender<Event>) -> Conversation {
        self.events = Some(tx);
        return self;
    }

    pub fn with_response_timeout(mut self, timeout: Option<Duration>) -> Conversation {
        self.response_timeout = timeout;
        return self;
    }

    pub fn messages(&self) -> &[Message] {
        return &self.messages;
    }

    pub fn state(&self) -> ConversationState {
        return self.state;
    }

    pub fn store(&self) -> &SessionStore {
        return &self.store;
    }

    /// Sends `text` and waits for the reply.
    ///
    /// `send` borrows the conversation mutably for the whole exchange, so a
    /// second message cannot be sent until the first one is answered. If the
    /// returned future is dropped before it completes, the reply is lost and
    /// the session history is left as it was.
    pub async fn send(&mut self, text: &str, attachments: &[Attachment]) -> Result<SendOutcome> {
        if text.trim().is_empty() && attachments.is_empty() {
            return Ok(SendOutcome::Ignored);
        }

        let content = Message::user_content(text, attachments);
        let user_message = Message::new(&self.store.next_id(), Sender::User, &content, Utc::now());
        self.push_message(user_message);

        self.state = ConversationState::AwaitingResponse;
        self.emit(Event::ResponsePending());

        let res = self.request_completion(text).await;
        self.state = ConversationState::Idle;

        let reply = match res {
            Ok(reply) => reply,
            Err(err) => {
                tracing::error!(error = ?err, "Failed to get a response");
                let error = err.to_string();
                self.emit(Event::ResponseFailed(error.to_string()));
                return Ok(SendOutcome::Failed { error });
            }
        };

        let assistant_message =
            Message::new(&self.store.next_id(), Sender::Assistant, &reply, Utc::now());
        self.push_message(assistant_message);

        self.sync_store(text, &content)?;
        self.emit(Event::SessionsChanged());

        return Ok(SendOutcome::Replied {
            messages: self.messages.to_vec(),
            sessions: self.store.sessions().to_vec(),
        });
    }

    /// Clears the message list. The next message starts a new session.
    pub fn new_chat(&mut self) {
        self.store.clear_current();
        self.messages = vec![];
    }

    /// Switches to session `id`. Returns false when no such session exists.
    pub fn open_session(&mut self, id: &str) -> bool {
        match self.store.select_session(id) {
            Some(session) => {
                self.messages = session.messages.clone();
                return true;
            }
            None => return false,
        }
    }

    /// Deletes session `id`. Deleting the open session moves the
    /// conversation to whichever session the store now points at. Unknown
    /// ids change nothing.
    pub fn delete_session(&mut self, id: &str) -> Result<()> {
        if self.store.get(id).is_none() {
            return Ok(());
        }

        let was_current = self.store.current_id() == Some(id);
        self.store.delete_session(id)?;

        if was_current {
            self.messages = self
                .store
                .current()
                .map(|session| return session.messages.clone())
                .unwrap_or_default();
        }
        self.emit(Event::SessionsChanged());

        return Ok(());
    }

    async fn request_completion(&self, text: &str) -> Result<String> {
        let completion = self.backend.get_completion(BackendPrompt::new(text));
        let timeout = match self.response_timeout {
            Some(timeout) => timeout,
            None => return completion.await,
        };

        match time::timeout(timeout, completion).await {
            Ok(res) => return res,
            Err(_) => {
                return Err(anyhow!(
                    "{} backend did not respond within {}ms",
                    self.backend.name(),
                    timeout.as_millis()
                ))
            }
        }
    }

    fn sync_store(&mut self, text: &str, content: &str) -> Result<()> {
        let messages = self.messages.to_vec();
        if let Some(id) = self.store.current_id().map(|e| return e.to_string()) {
            self.store.update_session(&id, messages)?;
            return Ok(());
        }

        let title_source = if text.trim().is_empty() { content } else { text };
        self.store.create_session(title_source, messages)?;

        return Ok(());
    }

    fn push_message(&mut self, message: Message) {
        self.messages.push(message.clone());
        self.emit(Event::MessageAppended(message));
    }

    fn emit(&self, event: Event) {
        if let Some(tx) = &self.events {
            if tx.send(event).is_err() {
                tracing::debug!("Event receiver dropped");
            }
        }
    }
}
