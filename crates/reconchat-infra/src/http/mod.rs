//! REST adapter for the assistant backend.

pub mod client;
pub mod types;

pub use client::HttpApiClient;
