//! Session state and request-lifecycle coordination for reconchat.
//!
//! This crate defines the "ports" (`ChatBackend`, `ArtifactSink`) that the
//! infrastructure layer implements, plus the in-memory `SessionStore` and the
//! `RequestCoordinator` that drives them. It depends only on
//! `reconchat-types` -- never on `reconchat-infra` or any network/IO crate.

pub mod backend;
pub mod coordinator;
pub mod event;
pub mod session;
