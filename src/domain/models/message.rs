#[cfg(test)]
#[path = "message_test.rs"]
mod tests;

use chrono::DateTime;
use chrono::Utc;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::Attachment;
use super::Sender;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(id: &str, sender: Sender, content: &str, timestamp: DateTime<Utc>) -> Message {
        return Message {
            id: id.to_string(),
            content: content.to_string(),
            sender,
            timestamp,
        };
    }

    /// Builds the text of a user message. Attachment names are appended as a
    /// trailing line so they stay visible in the history.
    pub fn user_content(text: &str, attachments: &[Attachment]) -> String {
        let summary = Attachment::summary_line(attachments);
        match summary {
            Some(line) if text.trim().is_empty() => return line,
            Some(line) => return format!("{text}\n{line}"),
            None => return text.to_string(),
        }
    }

    pub fn is_from_user(&self) -> bool {
        return self.sender == Sender::User;
    }
}
