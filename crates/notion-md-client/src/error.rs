//! Error types for the Notion client.

use notion_md_renderer::{SourceError, SourceErrorKind};

/// Backend name reported in source errors.
pub(crate) const BACKEND: &str = "Notion";

/// Error from Notion API operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] ureq::Error),

    /// HTTP response error (server returned error status).
    #[error("HTTP error: {status} - {message}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// API error message, or the raw body when it is not an API error.
        message: String,
    },

    /// Response body is not the expected JSON document.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A block's type-specific payload could not be decoded.
    #[error("invalid `{kind}` payload for block {block_id}: {source}")]
    Payload {
        block_id: String,
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    /// Semantic category of this error.
    pub fn kind(&self) -> SourceErrorKind {
        match self {
            Self::HttpResponse { status, .. } => status_kind(*status),
            Self::HttpRequest(
                ureq::Error::Timeout(_)
                | ureq::Error::ConnectionFailed
                | ureq::Error::HostNotFound
                | ureq::Error::Io(_),
            ) => SourceErrorKind::Unavailable,
            Self::HttpRequest(_) => SourceErrorKind::Other,
            Self::Json(_) | Self::Payload { .. } => SourceErrorKind::InvalidResponse,
        }
    }

    /// Convert into the renderer's error type for a request about `block_id`.
    pub(crate) fn into_source_error(self, block_id: &str) -> SourceError {
        SourceError::new(self.kind())
            .with_backend(BACKEND)
            .with_block(block_id)
            .with_source(self)
    }
}

/// Map an HTTP error status to a source error category.
fn status_kind(status: u16) -> SourceErrorKind {
    match status {
        404 => SourceErrorKind::NotFound,
        401 | 403 => SourceErrorKind::Unauthorized,
        429 => SourceErrorKind::RateLimited,
        500..=599 => SourceErrorKind::Unavailable,
        _ => SourceErrorKind::Other,
    }
}
