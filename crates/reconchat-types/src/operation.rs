//! Operation categories, busy-flag snapshots and dispatch results.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A backend operation the client can issue.
///
/// The snake_case name is what appears in errors and log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    FetchHistory,
    SendMessage,
    GenerateReport,
    ClearHistory,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::FetchHistory => "fetch_history",
            Operation::SendMessage => "send_message",
            Operation::GenerateReport => "generate_report",
            Operation::ClearHistory => "clear_history",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The most recent failure recorded by the coordinator.
///
/// Informational only: the coordinator never acts on it, it exists so a
/// front end can surface failures if it wants to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationFailure {
    pub operation: Operation,
    pub message: String,
}

/// Snapshot of the coordinator's busy flags.
///
/// Each flag gates one category; categories never block each other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationState {
    pub sending: bool,
    pub report_generating: bool,
    pub clearing: bool,
    pub last_error: Option<OperationFailure>,
}

impl OperationState {
    /// True when any category has a request in flight.
    pub fn is_busy(&self) -> bool {
        self.sending || self.report_generating || self.clearing
    }
}

/// What happened to a coordinator invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dispatch {
    /// Input was empty after trimming; nothing was issued.
    Skipped,
    /// The category's busy flag was already set; nothing was issued.
    Busy,
    /// The request was issued and succeeded.
    Completed,
    /// The request was issued and failed. The failure was logged and recorded.
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_names() {
        assert_eq!(Operation::FetchHistory.to_string(), "fetch_history");
        assert_eq!(Operation::SendMessage.to_string(), "send_message");
        assert_eq!(Operation::GenerateReport.to_string(), "generate_report");
        assert_eq!(Operation::ClearHistory.to_string(), "clear_history");
    }

    #[test]
    fn test_operation_serde_matches_display() {
        let json = serde_json::to_string(&Operation::GenerateReport).unwrap();
        assert_eq!(json, "\"generate_report\"");
    }

    #[test]
    fn test_default_state_is_idle() {
        let state = OperationState::default();
        assert!(!state.is_busy());
        assert!(state.last_error.is_none());
    }

    #[test]
    fn test_is_busy_any_flag() {
        let state = OperationState {
            clearing: true,
            ..Default::default()
        };
        assert!(state.is_busy());
    }
}
