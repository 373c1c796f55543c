//! The in-memory mirror of the conversation log.

pub mod store;

pub use store::SessionStore;
