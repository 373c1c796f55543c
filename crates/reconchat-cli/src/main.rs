//! reconchat entry point.
//!
//! Binary name: `reconchat`
//!
//! Parses CLI arguments, loads configuration, then dispatches to a one-shot
//! command or the interactive chat loop.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use reconchat_observe::tracing_setup::{init_tracing, shutdown_tracing, verbosity_filter};
use state::{AppState, Overrides};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(verbosity_filter(cli.verbose, cli.quiet), cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let command = cli.command.unwrap_or(Commands::Chat);

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "reconchat", &mut std::io::stdout());
        return Ok(());
    }

    let download_dir = match &command {
        Commands::Report { output_dir } => output_dir.clone(),
        _ => None,
    };
    let state = AppState::init(Overrides {
        base_url: cli.base_url,
        download_dir,
    })
    .await?;

    match command {
        Commands::Chat => cli::chat::loop_runner::run_chat_loop(&state).await?,
        Commands::History => cli::history::show_history(&state, cli.json).await?,
        Commands::Send { text } => cli::message::send_message(&state, &text.join(" "), cli.json).await?,
        Commands::Report { .. } => cli::report::generate_report(&state, cli.json).await?,
        Commands::Clear { force } => cli::history::clear_history(&state, force, cli.json).await?,
        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}
