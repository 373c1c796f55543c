//! `reconchat report`: generate the session report and save it.

use std::path::PathBuf;

use console::style;
use tokio::sync::broadcast;

use reconchat_types::event::ClientEvent;
use reconchat_types::operation::Operation;

use crate::state::AppState;

use super::{ensure_completed, spinner};

/// Ask the backend for the report and write it into the download directory.
pub async fn generate_report(state: &AppState, json: bool) -> anyhow::Result<()> {
    let coordinator = &state.coordinator;
    // Subscribe first so the ArtifactSaved event is not missed.
    let mut events = coordinator.subscribe();

    let spinner = spinner("Generating report...", json);
    let dispatch = coordinator.generate_report().await;
    spinner.finish_and_clear();
    ensure_completed(Operation::GenerateReport, dispatch, &coordinator.state())?;

    let path = saved_path(&mut events);

    if json {
        println!(
            "{}",
            serde_json::json!({
                "dispatch": dispatch,
                "path": path.as_ref().map(|p| p.display().to_string()),
            })
        );
        return Ok(());
    }

    println!();
    match path {
        Some(path) => println!(
            "  {} Report saved to {}",
            style("*").green().bold(),
            style(path.display()).cyan()
        ),
        None => println!(
            "  {} Report saved in {}",
            style("*").green().bold(),
            style(state.download_dir.display()).cyan()
        ),
    }
    println!();
    Ok(())
}

/// Drain already-published events looking for the saved artifact path.
fn saved_path(events: &mut broadcast::Receiver<ClientEvent>) -> Option<PathBuf> {
    let mut found = None;
    loop {
        match events.try_recv() {
            Ok(ClientEvent::ArtifactSaved { path }) => found = Some(path),
            Ok(_) | Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
    found
}
