//! Shared domain types for reconchat.
//!
//! Messages, operation state, artifacts, client events, configuration and
//! the error types shared by the core, infrastructure and CLI crates.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod artifact;
pub mod config;
pub mod error;
pub mod event;
pub mod message;
pub mod operation;
