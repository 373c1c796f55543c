//! CLI command definitions for the `reconchat` binary.
//!
//! Uses clap derive macros for argument parsing. With no subcommand the
//! interactive chat starts.

pub mod chat;
pub mod history;
pub mod message;
pub mod report;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use indicatif::{ProgressBar, ProgressStyle};

use reconchat_types::operation::{Dispatch, Operation, OperationState};

/// Chat with your network reconnaissance assistant.
#[derive(Parser)]
#[command(name = "reconchat", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Backend base address (overrides `base_url` from config.toml).
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans to stdout via OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Start an interactive chat session (default).
    Chat,

    /// Print the persisted conversation history.
    History,

    /// Send a single message and print the reply.
    Send {
        /// Message text; multiple words are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Generate the session report and save it locally.
    Report {
        /// Directory to save into (overrides `download_dir` from config.toml).
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },

    /// Clear the conversation history on the backend.
    Clear {
        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Steady-tick spinner used while a one-shot request is in flight.
pub(crate) fn spinner(message: impl Into<String>, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Turn a dispatch result into the process outcome of a one-shot command.
///
/// `Skipped` and `Completed` succeed; `Busy` and `Failed` become errors so
/// the binary exits non-zero.
pub(crate) fn ensure_completed(
    operation: Operation,
    dispatch: Dispatch,
    state: &OperationState,
) -> anyhow::Result<()> {
    match dispatch {
        Dispatch::Skipped | Dispatch::Completed => Ok(()),
        Dispatch::Busy => anyhow::bail!("{operation} is already in progress"),
        Dispatch::Failed => {
            let detail = state
                .last_error
                .as_ref()
                .filter(|failure| failure.operation == operation)
                .map(|failure| failure.message.clone())
                .unwrap_or_else(|| format!("{operation} failed"));
            anyhow::bail!(detail)
        }
    }
}
