//! Conversations Command
//!
//! Lists conversations, newest first.

use anyhow::Result;
use console::style;

use chatline_core::Session;

use crate::config::CliConfig;
use crate::display;

/// Opens a session from the saved credentials.
pub fn open_session(config: &CliConfig) -> Result<Session> {
    let credentials = config.load_credentials()?;
    Ok(Session::resume(config.client.clone(), credentials)?)
}

/// Lists all conversations.
pub async fn list(config: &CliConfig) -> Result<()> {
    let session = open_session(config)?;
    let directory = session.load_directory().await?;

    if directory.is_empty() {
        display::info("No conversations yet. Start one with: chatline chat <user>");
        return Ok(());
    }

    println!();
    println!(
        "  {} ({} unread)",
        style("Conversations").bold(),
        directory.total_unread()
    );
    println!();
    for (i, summary) in directory.summaries().iter().enumerate() {
        display::display_summary(summary, i + 1);
    }
    println!();
    Ok(())
}
