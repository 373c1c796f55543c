//! Port traits for the outside world.
//!
//! `ChatBackend` is the remote assistant service; `ArtifactSink` is wherever
//! downloaded reports end up. Implementations live in reconchat-infra.

pub mod api;
pub mod artifact;

pub use api::ChatBackend;
pub use artifact::ArtifactSink;
