#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::Message;

/// Longest title kept verbatim, counted in characters.
pub const TITLE_MAX_CHARS: usize = 30;

/// One saved conversation. Field names are camelCase on disk so histories
/// written by the browser build load as-is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        id: &str,
        first_message_text: &str,
        messages: Vec<Message>,
        now: DateTime<Utc>,
    ) -> Session {
        return Session {
            id: id.to_string(),
            title: Session::derive_title(first_message_text),
            messages,
            created_at: now,
            updated_at: now,
        };
    }

    pub fn derive_title(text: &str) -> String {
        if text.chars().count() <= TITLE_MAX_CHARS {
            return text.to_string();
        }

        let head = text.chars().take(TITLE_MAX_CHARS).collect::<String>();
        return format!("{head}...");
    }

    /// Replaces the messages and moves `updated_at` forward. The new value is
    /// always strictly later than the previous one, even when the clock has
    /// not advanced.
    pub fn replace_messages(&mut self, messages: Vec<Message>, now: DateTime<Utc>) {
        self.messages = messages;
        if now > self.updated_at {
            self.updated_at = now;
        } else {
            self.updated_at += Duration::nanoseconds(1);
        }
    }
}
