//! Wire shapes for the backend's JSON endpoints.

use reconchat_types::message::Message;
use serde::{Deserialize, Serialize};

/// Body returned by `GET /api/history`.
#[derive(Debug, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// Body sent to `POST /api/chat`.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
}

/// Body returned by `POST /api/chat`.
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}
