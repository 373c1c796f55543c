//! Main chat loop orchestration.
//!
//! Loads the history, prints the banner, then reads lines until the user
//! exits. Every backend call is spawned so the prompt never blocks; results
//! come back through the coordinator's event stream and are printed by a
//! dedicated render task.

use std::future::Future;
use std::io::Write;
use std::sync::Arc;

use console::style;
use rustyline_async::SharedWriter;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use reconchat_types::event::{ClientEvent, OperationOutcome};
use reconchat_types::message::{Message, MessageRole};
use reconchat_types::operation::{Dispatch, Operation};

use crate::cli::spinner;
use crate::state::AppState;

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::renderer::ChatRenderer;

/// Run the interactive chat loop against the configured backend.
pub async fn run_chat_loop(state: &AppState) -> anyhow::Result<()> {
    let coordinator = Arc::clone(&state.coordinator);
    let renderer = ChatRenderer::new();

    let loading = spinner("Loading history...", false);
    let dispatch = coordinator.load_history().await;
    loading.finish_and_clear();
    if dispatch == Dispatch::Failed {
        let detail = coordinator
            .state()
            .last_error
            .map(|failure| failure.message)
            .unwrap_or_default();
        eprintln!(
            "\n  {} Could not load history: {}",
            style("!").yellow().bold(),
            style(detail).dim()
        );
    }

    let history = coordinator.session().messages();
    print_welcome_banner(&state.config.base_url, &state.download_dir, history.len());
    for message in &history {
        println!("{}", renderer.render_message(message));
        println!();
    }

    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut chat_input, writer) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    let render_task = tokio::spawn(render_events(coordinator.subscribe(), writer.clone()));
    // Foreground output also goes through the writer so the prompt is redrawn.
    let mut out = writer.clone();
    let mut tasks: JoinSet<()> = JoinSet::new();

    loop {
        while let Some(finished) = tasks.try_join_next() {
            if let Err(e) = finished {
                warn!(error = %e, "background request task failed");
            }
        }

        match chat_input.read_line().await {
            InputEvent::Eof => break,
            InputEvent::Interrupted => {
                let _ = writeln!(out, "  {}", style("Press Ctrl+D to exit, or keep chatting.").dim());
                continue;
            }
            InputEvent::Line(text) => {
                if text.is_empty() {
                    continue;
                }

                if let Some(cmd) = commands::parse(&text) {
                    match cmd {
                        ChatCommand::Help => {
                            let _ = writeln!(out, "{}", commands::help_text());
                        }
                        ChatCommand::Report => {
                            let c = Arc::clone(&coordinator);
                            spawn_request(&mut tasks, writer.clone(), Operation::GenerateReport, async move {
                                c.generate_report().await
                            });
                        }
                        ChatCommand::Reset => {
                            let c = Arc::clone(&coordinator);
                            spawn_request(&mut tasks, writer.clone(), Operation::ClearHistory, async move {
                                c.clear_history().await
                            });
                        }
                        ChatCommand::History => {
                            let text = history_text(&coordinator.session().messages(), &renderer);
                            let _ = writeln!(out, "{text}");
                        }
                        ChatCommand::Status => {
                            let _ = writeln!(out, "\n{}\n", renderer.render_state(&coordinator.state()));
                        }
                        ChatCommand::Clear => chat_input.clear(),
                        ChatCommand::Exit => break,
                        ChatCommand::Unknown(name) => {
                            let _ = writeln!(
                                out,
                                "\n  {} Unknown command: {}. Type /help for available commands.\n",
                                style("?").yellow().bold(),
                                style(name).dim()
                            );
                        }
                    }
                    continue;
                }

                let c = Arc::clone(&coordinator);
                spawn_request(&mut tasks, writer.clone(), Operation::SendMessage, async move {
                    c.send_message(&text).await
                });
            }
        }
    }

    chat_input.flush();

    if !tasks.is_empty() {
        println!(
            "\n  {}",
            style(format!(
                "Waiting for {} request(s) to finish (Ctrl+C to abandon)...",
                tasks.len()
            ))
            .dim()
        );
        tokio::select! {
            _ = drain(&mut tasks) => {}
            _ = tokio::signal::ctrl_c() => {
                debug!(pending = tasks.len(), "abandoning in-flight requests");
                tasks.abort_all();
            }
        }
    }

    render_task.abort();
    println!("\n  {}", style("Session ended.").dim());
    Ok(())
}

/// Run one coordinator call in the background, noting when it was refused.
fn spawn_request<F>(tasks: &mut JoinSet<()>, mut out: SharedWriter, operation: Operation, request: F)
where
    F: Future<Output = Dispatch> + Send + 'static,
{
    tasks.spawn(async move {
        if request.await == Dispatch::Busy {
            let _ = writeln!(out, "{}", busy_notice(operation));
        }
    });
}

async fn drain(tasks: &mut JoinSet<()>) {
    while let Some(finished) = tasks.join_next().await {
        if let Err(e) = finished {
            warn!(error = %e, "background request task failed");
        }
    }
}

/// The local session as printed by `/history`.
fn history_text(messages: &[Message], renderer: &ChatRenderer) -> String {
    if messages.is_empty() {
        return format!("\n  {}\n", style("No messages yet.").dim());
    }
    let mut text = String::new();
    for message in messages {
        text.push('\n');
        text.push_str(&renderer.render_message(message));
        text.push('\n');
    }
    text
}

/// Print coordinator events above the prompt until the bus closes.
async fn render_events(mut events: broadcast::Receiver<ClientEvent>, mut out: SharedWriter) {
    loop {
        match events.recv().await {
            Ok(event) => {
                if let Some(text) = describe(&event) {
                    let _ = writeln!(out, "{text}\n");
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "chat renderer fell behind the event stream");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

/// Terminal text for an event, or `None` when it needs no output.
///
/// User messages are not echoed: the prompt already shows what was typed.
fn describe(event: &ClientEvent) -> Option<String> {
    match event {
        ClientEvent::MessageAppended { message } if message.role == MessageRole::Assistant => {
            Some(format!("\n{}", ChatRenderer::new().render_message(message)))
        }
        ClientEvent::OperationStarted {
            operation: Operation::GenerateReport,
        } => Some(format!("  {}", style("Generating report...").dim())),
        ClientEvent::ArtifactSaved { path } => Some(format!(
            "  {} Report saved to {}",
            style("*").green().bold(),
            style(path.display()).cyan()
        )),
        ClientEvent::HistoryCleared => Some(format!(
            "  {} Conversation history cleared.",
            style("*").green().bold()
        )),
        ClientEvent::OperationFinished {
            outcome: OperationOutcome::Failed { error },
            ..
        } => Some(format!("  {} {}", style("!").red().bold(), style(error).dim())),
        _ => None,
    }
}

fn busy_notice(operation: Operation) -> String {
    let what = match operation {
        Operation::SendMessage => "Still waiting for the previous reply; message not sent.",
        Operation::GenerateReport => "A report is already being generated.",
        Operation::ClearHistory => "History is already being cleared.",
        Operation::FetchHistory => "History is already loading.",
    };
    format!("  {} {}", style("!").yellow().bold(), style(what).dim())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn assistant_messages_are_rendered() {
        let event = ClientEvent::MessageAppended {
            message: Message::assistant("3 hosts up"),
        };
        let text = describe(&event).unwrap();
        assert!(text.contains("3 hosts up"));
    }

    #[test]
    fn user_messages_are_not_echoed() {
        let event = ClientEvent::MessageAppended {
            message: Message::user("scan it"),
        };
        assert!(describe(&event).is_none());
    }

    #[test]
    fn saved_report_shows_path() {
        let event = ClientEvent::ArtifactSaved {
            path: PathBuf::from("/tmp/report (1).pdf"),
        };
        assert!(describe(&event).unwrap().contains("report (1).pdf"));
    }

    #[test]
    fn failures_are_shown_dimly() {
        let event = ClientEvent::OperationFinished {
            operation: Operation::SendMessage,
            outcome: OperationOutcome::Failed {
                error: "send_message failed: HTTP 503".to_string(),
            },
        };
        assert!(describe(&event).unwrap().contains("HTTP 503"));
    }

    #[test]
    fn routine_events_are_silent() {
        assert!(describe(&ClientEvent::HistoryLoaded { count: 4 }).is_none());
        assert!(describe(&ClientEvent::OperationStarted {
            operation: Operation::SendMessage
        })
        .is_none());
        assert!(describe(&ClientEvent::OperationFinished {
            operation: Operation::SendMessage,
            outcome: OperationOutcome::Succeeded,
        })
        .is_none());
    }

    #[test]
    fn history_text_lists_messages_in_order() {
        let renderer = ChatRenderer::new();
        let text = history_text(
            &[Message::user("scan 10.0.0.1"), Message::assistant("22/tcp open")],
            &renderer,
        );
        let user_at = text.find("scan 10.0.0.1").unwrap();
        let reply_at = text.find("22/tcp open").unwrap();
        assert!(user_at < reply_at);
    }

    #[test]
    fn history_text_for_empty_session() {
        let text = history_text(&[], &ChatRenderer::new());
        assert!(text.contains("No messages yet."));
    }

    #[test]
    fn busy_notices_name_the_category() {
        assert!(busy_notice(Operation::GenerateReport).contains("report"));
        assert!(busy_notice(Operation::SendMessage).contains("not sent"));
    }
}
