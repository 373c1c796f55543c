//! `reconchat send`: one message, one reply.

use console::style;

use reconchat_types::message::{Message, MessageRole};
use reconchat_types::operation::{Dispatch, Operation};

use crate::state::AppState;

use super::chat::renderer::ChatRenderer;
use super::{ensure_completed, spinner};

/// Send `text` and print the assistant's reply.
///
/// Whitespace-only input is skipped without contacting the backend.
pub async fn send_message(state: &AppState, text: &str, json: bool) -> anyhow::Result<()> {
    let coordinator = &state.coordinator;

    let spinner = spinner("thinking...", json);
    let dispatch = coordinator.send_message(text).await;
    spinner.finish_and_clear();
    ensure_completed(Operation::SendMessage, dispatch, &coordinator.state())?;

    let reply = match dispatch {
        Dispatch::Completed => last_reply(&coordinator.session().messages()),
        _ => None,
    };

    if json {
        println!(
            "{}",
            serde_json::json!({
                "dispatch": dispatch,
                "reply": reply.as_ref().map(|m| m.content.as_str()),
            })
        );
        return Ok(());
    }

    match reply {
        Some(message) => {
            println!();
            println!("{}", ChatRenderer::new().render_message(&message));
            println!();
        }
        None => println!("  {}", style("Nothing to send.").dim()),
    }
    Ok(())
}

fn last_reply(messages: &[Message]) -> Option<Message> {
    messages
        .iter()
        .rev()
        .find(|m| m.role == MessageRole::Assistant)
        .cloned()
}
