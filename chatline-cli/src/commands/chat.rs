//! Chat Command
//!
//! Live chat with one peer. Lines typed on stdin are sent; inbound events
//! are printed as they arrive.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;

use chatline_core::network::WebSocketTransport;
use chatline_core::{
    ChannelHandler, Connection, ConnectionEvent, Conversation, EventDispatcher, NetworkError,
    ServerEnvelope, Session,
};

use crate::commands::conversations::open_session;
use crate::config::CliConfig;
use crate::display;

/// A line typed by the user.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Send(&'a str),
    Reply { message_id: &'a str, text: &'a str },
    React { message_id: &'a str, reaction: &'a str },
    Unreact(&'a str),
    MarkSeen,
    More,
    Help,
    Quit,
    Unknown(&'a str),
}

fn parse_input(line: &str) -> Input<'_> {
    let line = line.trim();
    let Some(command) = line.strip_prefix('/') else {
        return Input::Send(line);
    };

    let mut parts = command.splitn(3, ' ');
    let name = parts.next().unwrap_or_default();
    let first = parts.next().unwrap_or_default();
    let rest = parts.next().unwrap_or_default();

    match (name, first, rest) {
        ("quit" | "q", _, _) => Input::Quit,
        ("seen", _, _) => Input::MarkSeen,
        ("more", _, _) => Input::More,
        ("help", _, _) => Input::Help,
        ("reply", id, text) if !id.is_empty() && !text.is_empty() => Input::Reply {
            message_id: id,
            text,
        },
        ("react", id, reaction) if !id.is_empty() && !reaction.is_empty() => Input::React {
            message_id: id,
            reaction,
        },
        ("unreact", id, _) if !id.is_empty() => Input::Unreact(id),
        _ => Input::Unknown(line),
    }
}

fn print_help() {
    println!("  {}", style("Commands:").bold());
    println!("    /reply <id> <text>   reply to a message");
    println!("    /react <id> <emoji>  react to a message");
    println!("    /unreact <id>        remove your reaction");
    println!("    /seen                mark everything as read");
    println!("    /more                load older messages");
    println!("    /quit                leave the chat");
}

/// Runs an interactive chat with `peer_id`.
pub async fn run(peer_id: &str, config: &CliConfig) -> Result<()> {
    let session = open_session(config)?;
    let (handler, mut events) = ChannelHandler::channel();

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}")?);
    spinner.set_message(format!("Connecting to {}...", config.client.ws_url));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let connection = session.connect(
        WebSocketTransport::new(),
        EventDispatcher::with_handler(Arc::new(handler)),
    );
    let connected = wait_connected(&mut events).await;
    spinner.finish_and_clear();
    if let Err(err) = connected {
        connection.disconnect();
        return Err(err.into());
    }

    let mut conversation = session.open_conversation(&connection, peer_id).await?;
    println!();
    for message in conversation.messages() {
        display::display_message(message, peer_id);
    }
    conversation.mark_all_seen();
    println!();
    display::info(&format!(
        "Chatting with {}. Type /help for commands.",
        style(peer_id).bold()
    ));

    let result = chat_loop(&session, &connection, &mut conversation, &mut events).await;
    connection.disconnect();
    result
}

/// Waits for the first successful handshake.
async fn wait_connected(
    events: &mut UnboundedReceiver<ConnectionEvent>,
) -> Result<(), NetworkError> {
    while let Some(event) = events.recv().await {
        match event {
            ConnectionEvent::Connected => return Ok(()),
            ConnectionEvent::Disconnected {
                error: Some(NetworkError::AuthenticationFailed(reason)),
            } => return Err(NetworkError::AuthenticationFailed(reason)),
            ConnectionEvent::Disconnected { error: Some(err) } => {
                tracing::debug!("Connect attempt failed: {}", err);
            }
            _ => {}
        }
    }
    Err(NetworkError::ConnectionClosed)
}

async fn chat_loop(
    session: &Session,
    connection: &Connection,
    conversation: &mut Conversation,
    events: &mut UnboundedReceiver<ConnectionEvent>,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    return Ok(());
                };
                if !handle_input(session, conversation, &line).await? {
                    return Ok(());
                }
            }
            event = events.recv() => {
                let Some(event) = event else {
                    return Ok(());
                };
                if !handle_event(connection, conversation, event) {
                    anyhow::bail!("Session ended by the server");
                }
            }
        }
    }
}

/// Returns false when the user asked to quit.
async fn handle_input(
    session: &Session,
    conversation: &mut Conversation,
    line: &str,
) -> Result<bool> {
    match parse_input(line) {
        Input::Send(text) => {
            if conversation.send_message(text, None).is_some() {
                if let Some(message) = conversation.messages().last() {
                    display::display_message(message, conversation.peer_id());
                }
            }
        }
        Input::Reply { message_id, text } => {
            if conversation.message(message_id).is_none() {
                display::warning(&format!("No message {}", message_id));
            } else if conversation.send_message(text, Some(message_id)).is_some() {
                if let Some(message) = conversation.messages().last() {
                    display::display_message(message, conversation.peer_id());
                }
            }
        }
        Input::React {
            message_id,
            reaction,
        } => {
            if !conversation.add_reaction(message_id, reaction) {
                display::warning("Can only react to delivered messages");
            }
        }
        Input::Unreact(message_id) => {
            if !conversation.remove_reaction(message_id) {
                display::warning("No reaction to remove");
            }
        }
        Input::MarkSeen => {
            let marked = conversation.mark_all_seen();
            display::info(&format!("Marked {} message(s) as read", marked));
        }
        Input::More => {
            let older = session
                .fetch_history(conversation.peer_id(), conversation.oldest_timestamp())
                .await?;
            let added = conversation.prepend_history(older);
            for message in conversation.messages().iter().take(added) {
                display::display_message(message, conversation.peer_id());
            }
            display::info(&format!("Loaded {} older message(s)", added));
        }
        Input::Help => print_help(),
        Input::Quit => return Ok(false),
        Input::Unknown(line) => display::warning(&format!("Unknown command: {}", line)),
    }
    Ok(true)
}

/// Returns false once the connection can no longer recover.
fn handle_event(
    connection: &Connection,
    conversation: &mut Conversation,
    event: ConnectionEvent,
) -> bool {
    match event {
        ConnectionEvent::Connected => display::success("Connected"),
        ConnectionEvent::Disconnected { error: None } => return false,
        ConnectionEvent::Disconnected { error: Some(err) } => {
            if matches!(err, NetworkError::AuthenticationFailed(_)) {
                display::error(&err.to_string());
                return false;
            }
            if connection.has_pending_reconnect() {
                display::warning(&format!("{}; reconnecting...", err));
            } else {
                display::error(&err.to_string());
            }
        }
        ConnectionEvent::Message(envelope) => show_envelope(conversation, &envelope),
    }
    true
}

fn show_envelope(conversation: &mut Conversation, envelope: &ServerEnvelope) {
    if !conversation.apply(envelope) {
        if let ServerEnvelope::Error(payload) = envelope {
            display::warning(&format!("Server error: {}", payload.error));
        }
        return;
    }

    let peer_id = conversation.peer_id().to_string();
    match envelope {
        ServerEnvelope::Chat(payload) => {
            if let Some(message) = conversation.message(&payload.message_id) {
                display::display_message(message, &peer_id);
            }
            conversation.mark_seen(&payload.message_id);
        }
        ServerEnvelope::MessageDelivered(payload) => {
            tracing::debug!("{} delivered as {}", payload.client_id, payload.message_id);
        }
        ServerEnvelope::MessageSeen(payload) => {
            println!("  {}", style(format!("✓✓ seen {}", payload.message_id)).dim());
        }
        ServerEnvelope::AddReaction(payload) => println!(
            "  {}",
            style(format!(
                "{} reacted {} to {}",
                payload.user_id, payload.reaction, payload.message_id
            ))
            .dim()
        ),
        ServerEnvelope::RemoveReaction(payload) => println!(
            "  {}",
            style(format!(
                "{} removed a reaction from {}",
                payload.user_id, payload.message_id
            ))
            .dim()
        ),
        ServerEnvelope::UserTyping(payload) if payload.is_typing => {
            println!("  {}", style(format!("{} is typing...", peer_id)).dim().italic());
        }
        ServerEnvelope::UserOnline(_) => display::info(&format!("{} is online", peer_id)),
        ServerEnvelope::UserOffline(payload) => display::info(&format!(
            "{} went offline at {}",
            peer_id,
            display::clock_time(payload.last_seen)
        )),
        _ => {}
    }
}
