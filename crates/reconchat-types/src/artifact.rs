//! Binary artifacts fetched from the backend (the generated report).

use std::fmt;

/// MIME type the backend uses for generated reports.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// A binary payload returned by the backend.
#[derive(Clone, PartialEq, Eq)]
pub struct Artifact {
    /// MIME type from the response, `application/pdf` when absent.
    pub content_type: String,
    /// Filename the server suggested via `Content-Disposition`, if any.
    pub server_filename: Option<String>,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn pdf(bytes: Vec<u8>) -> Self {
        Self {
            content_type: PDF_CONTENT_TYPE.to_string(),
            server_filename: None,
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Payloads can be megabytes; print the size instead of the bytes.
impl fmt::Debug for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artifact")
            .field("content_type", &self.content_type)
            .field("server_filename", &self.server_filename)
            .field("len", &self.bytes.len())
            .finish()
    }
}
