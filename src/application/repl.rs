use std::io::Write;
use std::path;

use anyhow::anyhow;
use anyhow::bail;
use anyhow::Result;
use chrono::Utc;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use yansi::Paint;

use super::cli::open_store;
use super::format::format_message;
use super::format::format_session;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Attachment;
use crate::domain::models::BackendName;
use crate::domain::models::Event;
use crate::domain::models::SlashCommand;
use crate::domain::services::Conversation;
use crate::domain::services::SendOutcome;
use crate::infrastructure::backends::BackendManager;

pub fn help_text() -> String {
    let text = r#"
COMMANDS:
- /new (/n) - Start a new chat. The session is saved once the first reply arrives.
- /list (/l) - Lists all saved sessions, newest first.
- /open (/o) [SESSION_ID] - Switches to a saved session.
- /delete (/d) [SESSION_ID] - Deletes a saved session.
- /attach (/a) [PATH] - Attaches a local file to the next message. Only the file name is recorded.
- /quit /exit (/q) - Exit Parlor.
- /help (/h) - Provides this help menu.
        "#;

    return text.trim().to_string();
}

fn print_prompt() -> Result<()> {
    print!("{} ", Paint::cyan(">").bold());
    std::io::stdout().flush()?;
    return Ok(());
}

fn print_error(text: &str) {
    println!("{}", Paint::red(text));
}

fn render_event(event: &Event) {
    match event {
        Event::MessageAppended(message) => {
            // The user's own line is already on screen.
            if !message.is_from_user() {
                println!("{}", format_message(message));
            }
        }
        Event::ResponsePending() => {
            println!("{}", Paint::new("Thinking...").dimmed());
        }
        Event::ResponseFailed(err) => {
            print_error(&format!("No reply this time: {err}"));
        }
        Event::SessionsChanged() => {}
    }
}

fn drain_events(rx: &mut mpsc::UnboundedReceiver<Event>) {
    while let Ok(event) = rx.try_recv() {
        render_event(&event);
    }
}

fn render_history(conversation: &Conversation) {
    if conversation.messages().is_empty() {
        println!(
            "{}",
            Paint::new("How can I help you today? Start a conversation by typing a message below.")
                .bold()
        );
        return;
    }

    if let Some(session) = conversation.store().current() {
        println!("{}", Paint::new(&session.title).underline());
    }
    for message in conversation.messages() {
        println!("{}", format_message(message));
    }
}

fn render_sessions(conversation: &Conversation) {
    let sessions = conversation.store().sessions();
    if sessions.is_empty() {
        println!("No chat history yet");
        return;
    }

    let now = Utc::now();
    let current_id = conversation.store().current_id();
    for session in sessions {
        let line = format_session(session, now);
        if current_id == Some(session.id.as_str()) {
            println!("{}", Paint::new(line).bold());
        } else {
            println!("{line}");
        }
    }
}

/// Handles a slash command. Returns false when the chat should end.
fn handle_slash_command(
    command: &SlashCommand,
    conversation: &mut Conversation,
    attachments: &mut Vec<Attachment>,
) -> Result<bool> {
    if command.is_quit() {
        return Ok(false);
    }

    if command.is_help() {
        println!("{}", help_text());
    } else if command.is_new_chat() {
        conversation.new_chat();
        attachments.clear();
        render_history(conversation);
    } else if command.is_list() {
        render_sessions(conversation);
    } else if command.is_open() {
        let id = command.rest();
        if id.is_empty() {
            print_error("You must specify a session id with `/open`. Run `/list` to see them.");
        } else if conversation.open_session(&id) {
            render_history(conversation);
        } else {
            print_error(&format!("No session found for id {id}"));
        }
    } else if command.is_delete() {
        let id = command.rest();
        if id.is_empty() {
            print_error("You must specify a session id with `/delete`. Run `/list` to see them.");
        } else if conversation.store().get(&id).is_none() {
            print_error(&format!("No session found for id {id}"));
        } else {
            conversation.delete_session(&id)?;
            println!("Deleted session {id}");
        }
    } else if command.is_attach() {
        match Attachment::from_path(&path::PathBuf::from(command.rest())) {
            Ok(attachment) => {
                println!("Attached {}", attachment.name);
                attachments.push(attachment);
            }
            Err(err) => print_error(&format!("Could not attach file: {err}")),
        }
    }

    return Ok(true);
}

pub async fn start() -> Result<()> {
    let backend_name = Config::get(ConfigKey::Backend);
    let backend = BackendManager::get(
        BackendName::parse(backend_name.to_string())
            .ok_or_else(|| return anyhow!(format!("Unknown backend {backend_name}")))?,
    )?;

    if let Err(err) = backend.health_check().await {
        tracing::warn!(error = ?err, backend = backend_name, "Backend health check failed");
        print_error(&format!(
            "Backend {backend_name} failed its health check, replies may not arrive.\n\nError: {err}"
        ));
    }

    let mut store = open_store()?;
    let session_id = Config::get(ConfigKey::SessionID);
    if !session_id.is_empty() && store.select_session(&session_id).is_none() {
        bail!(format!("No session found for id {session_id}"));
    }

    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let mut conversation = Conversation::new(backend, store)
        .with_events(tx)
        .with_response_timeout(Config::response_timeout());

    render_history(&conversation);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut attachments: Vec<Attachment> = vec![];

    loop {
        print_prompt()?;
        let line = match lines.next_line().await? {
            Some(line) => line,
            None => break,
        };

        if let Some(command) = SlashCommand::parse(&line) {
            if !handle_slash_command(&command, &mut conversation, &mut attachments)? {
                break;
            }
            continue;
        }

        let outcome = {
            let send = conversation.send(&line, &attachments);
            tokio::pin!(send);

            loop {
                tokio::select! {
                    res = &mut send => break res,
                    Some(event) = rx.recv() => render_event(&event),
                }
            }
        };
        drain_events(&mut rx);

        match outcome {
            Ok(SendOutcome::Ignored) => {}
            Ok(SendOutcome::Replied { .. }) | Ok(SendOutcome::Failed { .. }) => {
                attachments.clear();
            }
            Err(err) => {
                tracing::error!(error = ?err, "Failed to save chat history");
                print_error(&format!("Failed to save chat history: {err}"));
            }
        }
    }

    return Ok(());
}
