//! Conversion errors and non-fatal warnings.

use std::fmt;

use crate::source::SourceError;

/// Where in the block tree a fatal error happened.
///
/// Depth is counted from the conversion root (the page or block passed to
/// the converter is depth 0).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    /// Block whose children (or metadata) could not be fetched.
    pub block_id: String,
    /// Nesting depth of that block.
    pub depth: usize,
    /// Parent chain from the root down to the block's parent.
    pub ancestors: Vec<String>,
}

impl Location {
    /// Location of the conversion root.
    #[must_use]
    pub fn root(block_id: impl Into<String>) -> Self {
        Self {
            block_id: block_id.into(),
            depth: 0,
            ancestors: Vec::new(),
        }
    }

    /// Location of a child block one level below this one.
    pub(crate) fn child(&self, block_id: impl Into<String>) -> Self {
        let mut ancestors = self.ancestors.clone();
        ancestors.push(self.block_id.clone());
        Self {
            block_id: block_id.into(),
            depth: self.depth + 1,
            ancestors,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block {} at depth {}", self.block_id, self.depth)?;
        if !self.ancestors.is_empty() {
            write!(f, " (via {})", self.ancestors.join(" > "))?;
        }
        Ok(())
    }
}

/// Structural inconsistency in a paginated children listing.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PaginationIssue {
    /// The same cursor came back twice, pagination would never end.
    #[error("cursor {cursor:?} returned twice")]
    RepeatedCursor { cursor: String },
    /// More pages than the configured bound.
    #[error("more than {limit} pages")]
    PageLimit { limit: usize },
}

/// Fatal conversion error.
///
/// Fetch and pagination failures abort the conversion; nothing rendered so
/// far is returned.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConvertError {
    /// Empty or unparsable block identifier.
    #[error("invalid block id: {0:?}")]
    InvalidId(String),

    /// The source failed to return a page of children or block metadata.
    #[error("failed to fetch {location}: {source}")]
    Fetch {
        location: Location,
        #[source]
        source: SourceError,
    },

    /// Children pagination did not terminate consistently.
    #[error("inconsistent pagination for {location}: {issue}")]
    Pagination {
        location: Location,
        issue: PaginationIssue,
    },

    /// Cancellation was requested before the conversion completed.
    #[error("conversion cancelled")]
    Cancelled,

    /// The fetch worker pool could not be started.
    #[error("failed to start fetch workers: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// Kind of non-fatal conversion issue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WarningKind {
    /// Block type with no rendering rule; rendered as nothing.
    UnsupportedBlockType { kind: String },
    /// Spans with neither text nor an equivalent; rendered as nothing.
    MalformedRichText { spans: usize },
}

/// Non-fatal issue collected during rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Warning {
    pub block_id: String,
    pub kind: WarningKind,
}

impl Warning {
    #[must_use]
    pub fn unsupported(block_id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            block_id: block_id.into(),
            kind: WarningKind::UnsupportedBlockType { kind: kind.into() },
        }
    }

    #[must_use]
    pub fn malformed(block_id: impl Into<String>, spans: usize) -> Self {
        Self {
            block_id: block_id.into(),
            kind: WarningKind::MalformedRichText { spans },
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            WarningKind::UnsupportedBlockType { kind } => {
                write!(f, "unsupported block type `{kind}` (block {})", self.block_id)
            }
            WarningKind::MalformedRichText { spans } => write!(
                f,
                "{spans} malformed rich text span(s) dropped (block {})",
                self.block_id
            ),
        }
    }
}
