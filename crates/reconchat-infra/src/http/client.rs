//! HttpApiClient -- concrete [`ChatBackend`] over the backend's REST API.
//!
//! One request per operation against a base address injected at
//! construction. Any transport failure, non-success status, or
//! undecodable body becomes a [`TransportError`] naming the operation.
//! No retries, and no timeout beyond whatever reqwest applies by default.

use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response};

use reconchat_core::backend::ChatBackend;
use reconchat_types::artifact::{Artifact, PDF_CONTENT_TYPE};
use reconchat_types::error::TransportError;
use reconchat_types::message::Message;
use reconchat_types::operation::Operation;

use super::types::{ChatRequest, ChatResponse, HistoryResponse};

/// REST client for the assistant backend.
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApiClient {
    /// Create a client for the backend at `base_url` (e.g. `http://127.0.0.1:8001`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Use a preconfigured reqwest client (proxies, custom TLS).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the full API URL for a given path.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send `request` and turn anything but a 2xx into a [`TransportError`].
    async fn execute(
        &self,
        operation: Operation,
        request: RequestBuilder,
    ) -> Result<Response, TransportError> {
        tracing::debug!(%operation, "sending backend request");
        let response = request
            .send()
            .await
            .map_err(|e| TransportError::new(operation, format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(%operation, status = status.as_u16(), "backend returned error status");
            return Err(TransportError::with_status(
                operation,
                status.as_u16(),
                format!("HTTP {status}: {body}"),
            ));
        }
        Ok(response)
    }
}

impl ChatBackend for HttpApiClient {
    async fn fetch_history(&self) -> Result<Vec<Message>, TransportError> {
        let operation = Operation::FetchHistory;
        let response = self
            .execute(operation, self.client.get(self.url("/api/history")))
            .await?;

        let body: HistoryResponse = response
            .json()
            .await
            .map_err(|e| TransportError::new(operation, format!("invalid response body: {e}")))?;
        Ok(body.messages)
    }

    async fn send_message(&self, text: &str) -> Result<String, TransportError> {
        let operation = Operation::SendMessage;
        let request = self
            .client
            .post(self.url("/api/chat"))
            .json(&ChatRequest { message: text });
        let response = self.execute(operation, request).await?;

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| TransportError::new(operation, format!("invalid response body: {e}")))?;
        Ok(body.reply)
    }

    async fn generate_report(&self) -> Result<Artifact, TransportError> {
        let operation = Operation::GenerateReport;
        let response = self
            .execute(operation, self.client.post(self.url("/api/report")))
            .await?;

        let headers = response.headers();
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| PDF_CONTENT_TYPE.to_string());
        let server_filename = headers
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_disposition);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::new(operation, format!("failed to read body: {e}")))?;

        Ok(Artifact {
            content_type,
            server_filename,
            bytes: bytes.to_vec(),
        })
    }

    async fn clear_history(&self) -> Result<(), TransportError> {
        // The acknowledgement body has no defined shape; it is not read.
        self.execute(
            Operation::ClearHistory,
            self.client.delete(self.url("/api/history/clear")),
        )
        .await
        .map(|_| ())
    }
}

/// Extract the plain `filename=` parameter of a `Content-Disposition` value.
fn filename_from_disposition(value: &str) -> Option<String> {
    value
        .split(';')
        .map(str::trim)
        .find_map(|param| {
            let (key, raw) = param.split_once('=')?;
            if !key.trim().eq_ignore_ascii_case("filename") {
                return None;
            }
            let name = raw.trim().trim_matches('"');
            (!name.is_empty()).then(|| name.to_string())
        })
}
