//! Client configuration types.
//!
//! `ClientConfig` is the top-level `config.toml`. It is read once at
//! startup and injected into the components that need it; nothing reads
//! configuration from the environment at request time.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level configuration for the reconchat client.
///
/// All fields have sensible defaults, so an empty file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base address of the assistant backend, without a trailing path.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Fixed filename suggested for downloaded reports.
    #[serde(default = "default_report_filename")]
    pub report_filename: String,

    /// Where reports are saved. Falls back to the platform download directory.
    #[serde(default)]
    pub download_dir: Option<PathBuf>,

    /// Capacity of the client event channel.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8001".to_string()
}

fn default_report_filename() -> String {
    "report.pdf".to_string()
}

fn default_event_capacity() -> usize {
    256
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            report_filename: default_report_filename(),
            download_dir: None,
            event_capacity: default_event_capacity(),
        }
    }
}
