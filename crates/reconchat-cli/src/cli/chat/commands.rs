//! Slash command parsing for the chat loop.
//!
//! Commands start with `/`. Anything else is a message for the assistant.

use console::style;

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Generate and download the session report.
    Report,
    /// Clear the conversation history on the backend.
    Reset,
    /// Reprint the local session.
    History,
    /// Show busy flags and the last failure.
    Status,
    /// Clear the terminal screen.
    Clear,
    /// Exit the chat session.
    Exit,
    /// Unknown command.
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let cmd = trimmed
        .split_whitespace()
        .next()
        .unwrap_or(trimmed)
        .to_lowercase();

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(ChatCommand::Help),
        "/report" | "/pdf" => Some(ChatCommand::Report),
        "/reset" | "/clear-history" => Some(ChatCommand::Reset),
        "/history" => Some(ChatCommand::History),
        "/status" => Some(ChatCommand::Status),
        "/clear" | "/cls" => Some(ChatCommand::Clear),
        "/exit" | "/quit" | "/q" => Some(ChatCommand::Exit),
        other => Some(ChatCommand::Unknown(other.to_string())),
    }
}

/// Help text listing all available commands.
pub fn help_text() -> String {
    let rows = [
        ("/help", "Show this help message"),
        ("/report", "Generate the PDF report and save it locally"),
        ("/reset", "Clear the conversation history on the server"),
        ("/history", "Show the conversation so far"),
        ("/status", "Show requests in flight and the last error"),
        ("/cls", "Clear the screen"),
        ("/exit", "End the chat session"),
    ];

    let mut text = format!("\n  {}\n\n", style("Available commands:").bold());
    for (name, description) in rows {
        text.push_str(&format!("  {:<10} {}\n", style(name).cyan(), description));
    }
    text.push_str(&format!(
        "\n  {}\n",
        style("Replies and reports arrive in the background; keep typing.").dim()
    ));
    text
}
