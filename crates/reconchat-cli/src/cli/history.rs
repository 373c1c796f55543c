//! `reconchat history` and `reconchat clear`.

use console::style;
use dialoguer::Confirm;

use reconchat_types::operation::{Dispatch, Operation};

use crate::state::AppState;

use super::chat::renderer::ChatRenderer;
use super::{ensure_completed, spinner};

/// Fetch the persisted conversation and print it.
pub async fn show_history(state: &AppState, json: bool) -> anyhow::Result<()> {
    let coordinator = &state.coordinator;

    let spinner = spinner("Fetching history...", json);
    let dispatch = coordinator.load_history().await;
    spinner.finish_and_clear();
    ensure_completed(Operation::FetchHistory, dispatch, &coordinator.state())?;

    let messages = coordinator.session().messages();

    if json {
        println!("{}", serde_json::to_string_pretty(&messages)?);
        return Ok(());
    }

    if messages.is_empty() {
        println!();
        println!("  {}", style("No messages yet.").dim());
        println!();
        return Ok(());
    }

    let renderer = ChatRenderer::new();
    println!();
    for message in &messages {
        println!("{}", renderer.render_message(message));
        println!();
    }
    println!(
        "  {}",
        style(format!("{} messages from {}", messages.len(), state.config.base_url)).dim()
    );
    println!();
    Ok(())
}

/// Clear the backend conversation, asking first unless `force` or `json`.
pub async fn clear_history(state: &AppState, force: bool, json: bool) -> anyhow::Result<()> {
    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Clear the conversation history on {}?",
                style(&state.config.base_url).red().bold()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let coordinator = &state.coordinator;

    let spinner = spinner("Clearing history...", json);
    let dispatch = coordinator.clear_history().await;
    spinner.finish_and_clear();
    ensure_completed(Operation::ClearHistory, dispatch, &coordinator.state())?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "cleared": dispatch == Dispatch::Completed })
        );
    } else {
        println!();
        println!(
            "  {} Conversation history cleared.",
            style("*").green().bold()
        );
        println!();
    }
    Ok(())
}
