//! LocalArtifactDownloader -- saves artifacts into a download directory.
//!
//! Each save goes through a temporary `.part` file created next to the
//! destination and is then persisted under the final name without
//! clobbering anything. The temporary file lives only for the duration of
//! the call: if any step fails it is removed when dropped.
//!
//! Name collisions are resolved the way browsers do it:
//! ```text
//! report.pdf
//! report (1).pdf
//! report (2).pdf
//! ```

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use reconchat_core::backend::ArtifactSink;
use reconchat_types::artifact::Artifact;
use reconchat_types::error::DownloadError;

/// How many numbered variants to try before giving up on a name.
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Filesystem-backed [`ArtifactSink`].
#[derive(Debug, Clone)]
pub struct LocalArtifactDownloader {
    dir: PathBuf,
}

impl LocalArtifactDownloader {
    /// Save artifacts under `dir`, creating it on first use.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ArtifactSink for LocalArtifactDownloader {
    async fn save(&self, artifact: &Artifact, filename: &str) -> Result<PathBuf, DownloadError> {
        let name = sanitize_filename(filename)?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| DownloadError::Directory {
                path: self.dir.clone(),
                source,
            })?;

        let dir = self.dir.clone();
        let bytes = artifact.bytes.clone();
        let path = tokio::task::spawn_blocking(move || write_unique(&dir, &name, &bytes))
            .await
            .map_err(|e| DownloadError::Io(std::io::Error::other(e)))??;

        tracing::debug!(path = %path.display(), bytes = artifact.len(), "artifact written");
        Ok(path)
    }
}

/// Reduce `filename` to its final path component.
fn sanitize_filename(filename: &str) -> Result<String, DownloadError> {
    Path::new(filename.trim())
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .ok_or_else(|| DownloadError::InvalidFilename(filename.to_string()))
}

/// `report.pdf` -> `report (n).pdf`; names without an extension get a bare suffix.
fn numbered_name(name: &str, n: u32) -> String {
    if n == 0 {
        return name.to_string();
    }
    let path = Path::new(name);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(name);
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem} ({n}).{ext}"),
        None => format!("{stem} ({n})"),
    }
}

/// Write `bytes` to a temp file in `dir` and persist it under the first free name.
fn write_unique(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf, DownloadError> {
    let mut temp = tempfile::Builder::new()
        .prefix(".reconchat-")
        .suffix(".part")
        .tempfile_in(dir)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;

    for n in 0..MAX_NAME_ATTEMPTS {
        let target = dir.join(numbered_name(name, n));
        match temp.persist_noclobber(&target) {
            Ok(_) => return Ok(target),
            Err(err) if err.error.kind() == ErrorKind::AlreadyExists => temp = err.file,
            Err(err) => return Err(err.error.into()),
        }
    }

    Err(DownloadError::Io(std::io::Error::new(
        ErrorKind::AlreadyExists,
        format!("no free filename for '{name}' in {}", dir.display()),
    )))
}
