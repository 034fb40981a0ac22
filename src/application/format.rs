#[cfg(test)]
#[path = "format_test.rs"]
mod tests;

use chrono::DateTime;
use chrono::Local;
use chrono::Utc;

use crate::domain::models::Message;
use crate::domain::models::Session;

/// How long ago a session was touched, as shown in the session list.
pub fn relative_date(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (now - date).num_days().max(0);

    if days == 0 {
        return "Today".to_string();
    }
    if days == 1 {
        return "Yesterday".to_string();
    }
    if days < 7 {
        return format!("{days} days ago");
    }

    return date.format("%Y-%m-%d").to_string();
}

pub fn format_session(session: &Session, now: DateTime<Utc>) -> String {
    let count = session.messages.len();
    let noun = if count == 1 { "message" } else { "messages" };

    let mut title = session.title.lines().next().unwrap_or_default().to_string();
    if title.is_empty() {
        title = "(untitled)".to_string();
    }

    return format!(
        "- (ID: {}) {title}, {count} {noun}, {}",
        session.id,
        relative_date(session.updated_at, now)
    );
}

pub fn format_message(message: &Message) -> String {
    let time = message.timestamp.with_timezone(&Local).format("%H:%M");
    return format!(
        "[{time}] {}: {}",
        message.sender.display_name(),
        message.content
    );
}
