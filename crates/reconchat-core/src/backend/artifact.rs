//! ArtifactSink trait definition.

use std::future::Future;
use std::path::PathBuf;

use reconchat_types::artifact::Artifact;
use reconchat_types::error::DownloadError;

/// Destination for downloaded artifacts.
///
/// `save` must release any temporary resource it acquires before it
/// returns, on success and on failure.
pub trait ArtifactSink: Send + Sync {
    /// Persist `artifact` under (a variant of) `filename` and return where it landed.
    fn save(
        &self,
        artifact: &Artifact,
        filename: &str,
    ) -> impl Future<Output = Result<PathBuf, DownloadError>> + Send;
}
