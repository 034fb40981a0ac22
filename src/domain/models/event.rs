use super::Message;

/// Notifications emitted by a conversation while it works, for whoever is
/// drawing the chat.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    MessageAppended(Message),
    ResponsePending(),
    ResponseFailed(String),
    SessionsChanged(),
}
