//! Content API collaborator trait and error types.
//!
//! The engine never talks HTTP itself. Everything it needs from the content
//! API goes through [`BlockSource`]: block metadata by id, and one page of a
//! block's children at a time.

use std::sync::Arc;

use crate::model::Block;

/// One page of a block's children.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChildrenPage {
    /// Children in API order.
    pub blocks: Vec<Block>,
    /// Cursor for the next page; `None` when pagination is complete.
    pub next_cursor: Option<String>,
}

/// Semantic error categories for source failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum SourceErrorKind {
    /// Block does not exist or is not shared with the integration.
    NotFound,
    /// Credentials rejected.
    Unauthorized,
    /// Too many requests.
    RateLimited,
    /// Backend temporarily unavailable or timed out.
    Unavailable,
    /// Response could not be decoded.
    InvalidResponse,
    /// Other/unknown error category.
    Other,
}

/// Failure reported by a [`BlockSource`].
#[derive(Debug)]
pub struct SourceError {
    /// Semantic error category.
    pub kind: SourceErrorKind,
    /// Block the request was about (if applicable).
    pub block_id: Option<String>,
    /// Backend identifier (e.g., "Notion", "Mock").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl SourceError {
    /// Create a new source error.
    #[must_use]
    pub fn new(kind: SourceErrorKind) -> Self {
        Self {
            kind,
            block_id: None,
            backend: None,
            source: None,
        }
    }

    /// Attach the block id the request was about.
    #[must_use]
    pub fn with_block(mut self, block_id: impl Into<String>) -> Self {
        self.block_id = Some(block_id.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Downcast the source error to a concrete type.
    #[must_use]
    pub fn downcast_source<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.source.as_ref()?.downcast_ref()
    }

    /// Create a not found error for a block.
    #[must_use]
    pub fn not_found(block_id: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::NotFound).with_block(block_id)
    }
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (block: id)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            SourceErrorKind::NotFound => "Not found",
            SourceErrorKind::Unauthorized => "Unauthorized",
            SourceErrorKind::RateLimited => "Rate limited",
            SourceErrorKind::Unavailable => "Unavailable",
            SourceErrorKind::InvalidResponse => "Invalid response",
            SourceErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(block_id) = &self.block_id {
            write!(f, " (block: {block_id})")?;
        }

        Ok(())
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Read access to a block-based content API.
///
/// Implementations handle authentication, transport and timeouts. A missing
/// `next_cursor` is the normal end of pagination, never an error.
pub trait BlockSource: Send + Sync {
    /// Fetch a single block's metadata.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the block cannot be retrieved.
    fn retrieve_block(&self, block_id: &str) -> Result<Block, SourceError>;

    /// Fetch one page of a block's children.
    ///
    /// # Arguments
    ///
    /// * `block_id` - Parent block (or page) id
    /// * `cursor` - `None` for the first page, then the previous page's `next_cursor`
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the page cannot be retrieved.
    fn list_children(
        &self,
        block_id: &str,
        cursor: Option<&str>,
    ) -> Result<ChildrenPage, SourceError>;
}

impl<T: BlockSource + ?Sized> BlockSource for &T {
    fn retrieve_block(&self, block_id: &str) -> Result<Block, SourceError> {
        (**self).retrieve_block(block_id)
    }

    fn list_children(
        &self,
        block_id: &str,
        cursor: Option<&str>,
    ) -> Result<ChildrenPage, SourceError> {
        (**self).list_children(block_id, cursor)
    }
}

impl<T: BlockSource + ?Sized> BlockSource for Arc<T> {
    fn retrieve_block(&self, block_id: &str) -> Result<Block, SourceError> {
        (**self).retrieve_block(block_id)
    }

    fn list_children(
        &self,
        block_id: &str,
        cursor: Option<&str>,
    ) -> Result<ChildrenPage, SourceError> {
        (**self).list_children(block_id, cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_full() {
        let err = SourceError::new(SourceErrorKind::RateLimited)
            .with_backend("Notion")
            .with_block("abc")
            .with_source(std::io::Error::other("slow down"));
        assert_eq!(err.to_string(), "[Notion] Rate limited: slow down (block: abc)");
    }

    #[test]
    fn test_display_minimal() {
        let err = SourceError::new(SourceErrorKind::Other);
        assert_eq!(err.to_string(), "Error");
    }

    #[test]
    fn test_downcast_source() {
        let err = SourceError::new(SourceErrorKind::Unavailable)
            .with_source(std::io::Error::new(std::io::ErrorKind::TimedOut, "timeout"));
        let io = err.downcast_source::<std::io::Error>().unwrap();
        assert_eq!(io.kind(), std::io::ErrorKind::TimedOut);
    }

    #[test]
    fn test_not_found_sets_block() {
        let err = SourceError::not_found("missing");
        assert_eq!(err.kind, SourceErrorKind::NotFound);
        assert_eq!(err.block_id.as_deref(), Some("missing"));
    }
}
