//! Shared application state for CLI commands.
//!
//! Configuration is resolved exactly once here and injected into the HTTP
//! client and the downloader; nothing downstream reads the environment.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::bail;

use reconchat_core::coordinator::RequestCoordinator;
use reconchat_core::event::EventBus;
use reconchat_infra::config::{load_client_config, resolve_config_dir};
use reconchat_infra::download::{LocalArtifactDownloader, resolve_download_dir};
use reconchat_infra::http::HttpApiClient;
use reconchat_types::config::ClientConfig;

/// The coordinator wired to the real backend and filesystem.
pub type Coordinator = RequestCoordinator<HttpApiClient, LocalArtifactDownloader>;

/// Start-time overrides taken from CLI flags.
#[derive(Debug, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub download_dir: Option<PathBuf>,
}

/// Everything a command needs.
pub struct AppState {
    pub config: ClientConfig,
    pub download_dir: PathBuf,
    pub coordinator: Arc<Coordinator>,
}

impl AppState {
    /// Load `config.toml`, apply overrides, and build the coordinator.
    pub async fn init(overrides: Overrides) -> anyhow::Result<Self> {
        let config_dir = resolve_config_dir();
        let mut config = load_client_config(&config_dir).await;

        if let Some(base_url) = overrides.base_url {
            config.base_url = base_url;
        }
        if let Some(dir) = overrides.download_dir {
            config.download_dir = Some(dir);
        }
        validate_base_url(&config.base_url)?;

        let download_dir = resolve_download_dir(&config);
        tracing::debug!(
            base_url = %config.base_url,
            download_dir = %download_dir.display(),
            "client configured"
        );

        let coordinator = RequestCoordinator::new(
            HttpApiClient::new(config.base_url.clone()),
            LocalArtifactDownloader::new(download_dir.clone()),
            EventBus::new(config.event_capacity),
        )
        .with_report_filename(config.report_filename.clone());

        Ok(Self {
            config,
            download_dir,
            coordinator: Arc::new(coordinator),
        })
    }
}

fn validate_base_url(base_url: &str) -> anyhow::Result<()> {
    let rest = base_url
        .strip_prefix("http://")
        .or_else(|| base_url.strip_prefix("https://"));
    match rest {
        Some(host) if !host.trim_matches('/').is_empty() => Ok(()),
        _ => bail!("invalid base_url '{base_url}': expected http://host[:port] or https://host[:port]"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https() {
        assert!(validate_base_url("http://127.0.0.1:8001").is_ok());
        assert!(validate_base_url("https://recon.example.com/").is_ok());
    }

    #[test]
    fn rejects_missing_scheme_or_host() {
        assert!(validate_base_url("127.0.0.1:8001").is_err());
        assert!(validate_base_url("http://").is_err());
        assert!(validate_base_url("ftp://host").is_err());
    }
}
