//! Local delivery of downloaded artifacts.
//!
//! Implements the `ArtifactSink` trait from `reconchat-core` by writing into
//! a download directory on the local filesystem.

pub mod local;

use std::path::PathBuf;

use reconchat_types::config::ClientConfig;

pub use local::LocalArtifactDownloader;

/// Resolve where reports are saved.
///
/// Priority:
/// 1. `download_dir` from `config.toml`
/// 2. Platform download directory (e.g., `~/Downloads`)
/// 3. The current directory
pub fn resolve_download_dir(config: &ClientConfig) -> PathBuf {
    if let Some(dir) = &config.download_dir {
        return dir.clone();
    }
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}
