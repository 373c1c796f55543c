//! ChatBackend trait definition.
//!
//! One method per backend operation. Uses native async fn in traits
//! (RPITIT) with `Send` futures so the coordinator can be driven from
//! spawned tasks.

use std::future::Future;

use reconchat_types::artifact::Artifact;
use reconchat_types::error::TransportError;
use reconchat_types::message::Message;

/// The remote assistant service.
///
/// Every failure, whatever its cause, is a [`TransportError`] naming the
/// operation. Implementations must not retry.
///
/// Implementations live in reconchat-infra (e.g., `HttpApiClient`).
pub trait ChatBackend: Send + Sync {
    /// Fetch the persisted conversation, oldest first.
    fn fetch_history(&self) -> impl Future<Output = Result<Vec<Message>, TransportError>> + Send;

    /// Send one user message and receive the assistant's reply text.
    fn send_message(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<String, TransportError>> + Send;

    /// Ask the backend to render a report of the session.
    fn generate_report(&self) -> impl Future<Output = Result<Artifact, TransportError>> + Send;

    /// Delete the persisted conversation.
    fn clear_history(&self) -> impl Future<Output = Result<(), TransportError>> + Send;
}
