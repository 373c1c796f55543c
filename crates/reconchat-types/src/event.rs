//! Change notifications published by the session store and coordinator.
//!
//! `ClientEvent` is Clone + Send + Sync so it can travel over a tokio
//! broadcast channel to any number of front ends.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::message::Message;
use crate::operation::Operation;

/// How a gated operation ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OperationOutcome {
    Succeeded,
    Failed { error: String },
}

/// Events emitted whenever observable client state changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// The session was replaced wholesale from backend history.
    HistoryLoaded { count: usize },

    /// A message was added to the end of the session.
    MessageAppended { message: Message },

    /// The session was reset to empty.
    HistoryCleared,

    /// A busy flag was raised.
    OperationStarted { operation: Operation },

    /// A busy flag was released.
    OperationFinished {
        operation: Operation,
        outcome: OperationOutcome,
    },

    /// A report artifact was written to disk.
    ArtifactSaved { path: PathBuf },
}
