//! Terminal rendering of messages and busy state.
//!
//! Assistant replies are markdown (scan tables, code blocks, bullet lists)
//! and go through `termimad`; user messages are printed as typed.

use console::style;
use termimad::MadSkin;

use reconchat_types::message::{Message, MessageRole};
use reconchat_types::operation::OperationState;

/// Label printed above assistant replies.
const ASSISTANT_LABEL: &str = "Analyst";

/// Terminal markdown renderer.
pub struct ChatRenderer {
    skin: MadSkin,
}

impl ChatRenderer {
    pub fn new() -> Self {
        let mut skin = MadSkin::default_dark();
        skin.inline_code
            .set_fg(termimad::crossterm::style::Color::Yellow);
        Self { skin }
    }

    /// Render one session entry, indented to match the rest of the UI.
    pub fn render_message(&self, message: &Message) -> String {
        match message.role {
            MessageRole::User => {
                format!("  {} {}", style("You >").green().bold(), message.content)
            }
            MessageRole::Assistant => format!(
                "  {}\n{}",
                style(ASSISTANT_LABEL).cyan().bold(),
                self.render_markdown(&message.content)
            ),
        }
    }

    /// Render markdown with a two-space gutter.
    pub fn render_markdown(&self, markdown: &str) -> String {
        let rendered = self.skin.term_text(markdown).to_string();
        rendered
            .lines()
            .map(|line| format!("  {line}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// A summary line, one line per busy flag, and the last recorded failure if any.
    pub fn render_state(&self, state: &OperationState) -> String {
        let flag = |busy: bool| {
            if busy {
                format!("{}", style("in flight").yellow())
            } else {
                format!("{}", style("idle").dim())
            }
        };

        let summary = if state.is_busy() {
            style("requests in flight").yellow().bold()
        } else {
            style("all idle").dim()
        };

        let mut lines = vec![
            format!("  {summary}"),
            format!("  {:<10} {}", "message", flag(state.sending)),
            format!("  {:<10} {}", "report", flag(state.report_generating)),
            format!("  {:<10} {}", "clear", flag(state.clearing)),
        ];
        if let Some(failure) = &state.last_error {
            lines.push(format!(
                "  {:<10} {} {}",
                "last error",
                style(failure.operation).red(),
                style(&failure.message).dim()
            ));
        }
        lines.join("\n")
    }
}

impl Default for ChatRenderer {
    fn default() -> Self {
        Self::new()
    }
}
