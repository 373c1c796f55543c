//! Infrastructure layer for reconchat.
//!
//! Implements the port traits defined in `reconchat-core`: the reqwest-backed
//! `HttpApiClient` and the filesystem-backed `LocalArtifactDownloader`. Also
//! loads `config.toml` at startup.

pub mod config;
pub mod download;
pub mod http;
