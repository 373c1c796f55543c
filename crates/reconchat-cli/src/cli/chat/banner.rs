//! Welcome banner shown when the chat starts.

use std::path::Path;

use console::style;

/// Print the backend address, where reports land, and the loaded history size.
pub fn print_welcome_banner(base_url: &str, download_dir: &Path, history_len: usize) {
    println!();
    println!("  {} {}", style("*").cyan(), style("reconchat").cyan().bold());
    println!("  {}", style("Network reconnaissance assistant").dim());
    println!();
    println!("  {}  {}", style("Backend:").bold(), style(base_url).dim());
    println!(
        "  {}  {}",
        style("Reports:").bold(),
        style(download_dir.display()).dim()
    );
    println!(
        "  {}  {}",
        style("History:").bold(),
        style(format!("{history_len} messages")).dim()
    );
    println!();
    println!(
        "  {}",
        style("Type /help for commands, Ctrl+D to exit").dim()
    );
    println!("  {}", style("---").dim());
    println!();
}
