//! Display Helpers
//!
//! Terminal output formatting and styling.

use console::style;
use chatline_core::{ConversationMessage, ConversationSummary, DeliveryState, Direction, SeenState};

/// Prints a success message.
pub fn success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Prints an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", style("✗").red().bold(), msg);
}

/// Prints a warning message.
pub fn warning(msg: &str) {
    println!("{} {}", style("⚠").yellow().bold(), msg);
}

/// Prints an info message.
pub fn info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Formats epoch milliseconds as a UTC wall-clock time.
pub fn clock_time(epoch_millis: i64) -> String {
    let secs_of_day = (epoch_millis / 1000).rem_euclid(86_400);
    format!("{:02}:{:02}", secs_of_day / 3600, (secs_of_day % 3600) / 60)
}

/// Displays one conversation list entry.
pub fn display_summary(summary: &ConversationSummary, index: usize) {
    let online = if summary.is_online {
        style("●").green()
    } else {
        style("○").dim()
    };
    let unread = if summary.unread_count > 0 {
        style(format!("({} unread)", summary.unread_count)).yellow().bold()
    } else {
        style(String::new()).dim()
    };

    println!(
        "  {}. {} {}  {}  {}",
        index,
        online,
        style(&summary.peer_id).bold(),
        unread,
        style(clock_time(summary.last_timestamp)).dim()
    );
    if !summary.last_message.is_empty() {
        println!("       {}", style(&summary.last_message).dim());
    }
}

/// Displays one message of a conversation.
pub fn display_message(message: &ConversationMessage, peer_id: &str) {
    let time = style(clock_time(message.timestamp)).dim();
    let author = match message.direction {
        Direction::Mine => style("me".to_string()).cyan().bold(),
        Direction::Theirs => style(peer_id.to_string()).magenta().bold(),
    };
    let status = match (message.direction, message.delivery, message.seen) {
        (Direction::Theirs, _, _) => "",
        (Direction::Mine, DeliveryState::Pending, _) => "…",
        (Direction::Mine, DeliveryState::Delivered, SeenState::Unseen) => "✓",
        (Direction::Mine, DeliveryState::Delivered, SeenState::Seen) => "✓✓",
    };

    let mut line = format!("{} {}: {} {}", time, author, message.text, style(status).dim());
    if let Some(reply) = &message.replying_to {
        line.push_str(&format!(" {}", style(format!("↩ {}", reply)).dim()));
    }
    if !message.reactions.is_empty() {
        let reactions: Vec<String> = message
            .reactions
            .iter()
            .map(|(user, reaction)| format!("{} {}", reaction, user))
            .collect();
        line.push_str(&format!("  [{}]", reactions.join(", ")));
    }
    println!("{}", line);
    println!("      {}", style(&message.id).dim());
}
