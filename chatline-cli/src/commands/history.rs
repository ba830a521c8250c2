//! History Command

use anyhow::Result;

use crate::commands::conversations::open_session;
use crate::config::CliConfig;
use crate::display;
use chatline_core::ConversationMessage;

/// Prints one page of history with `peer_id`.
pub async fn show(peer_id: &str, before: Option<i64>, config: &CliConfig) -> Result<()> {
    let session = open_session(config)?;
    let mut items = session.fetch_history(peer_id, before).await?;

    if items.is_empty() {
        display::info(&format!("No messages with {}", peer_id));
        return Ok(());
    }

    items.sort_by_key(|item| item.created_at);
    let oldest = items[0].created_at;
    for item in items {
        let message = ConversationMessage::from_history(item, session.user_id());
        display::display_message(&message, peer_id);
    }

    println!();
    display::info(&format!(
        "Older messages: chatline history {} --before {}",
        peer_id, oldest
    ));
    Ok(())
}
