//! User-triggered operations with per-category busy gating.
//!
//! Entry point: [`RequestCoordinator`].

pub mod busy;
pub mod service;

pub use service::RequestCoordinator;
