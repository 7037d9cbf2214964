//! Mock block source for testing.
//!
//! Provides [`MockBlockSource`] for driving conversions without network access.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::model::Block;
use crate::source::{BlockSource, ChildrenPage, SourceError, SourceErrorKind};

type FetchHook = Arc<dyn Fn() + Send + Sync>;

/// In-memory block source.
///
/// Children are stored as explicit pages per parent id. Use the builder
/// methods to configure the mock with test data.
///
/// # Example
///
/// ```ignore
/// use notion_md_renderer::{Block, BlockKind, MockBlockSource, RichText};
///
/// let source = MockBlockSource::new().with_children(
///     "page",
///     vec![Block::new("p1", BlockKind::Paragraph { text: vec![RichText::plain("Hi")] })],
/// );
/// ```
#[derive(Default)]
pub struct MockBlockSource {
    blocks: RwLock<HashMap<String, Block>>,
    pages: RwLock<HashMap<String, Vec<ChildrenPage>>>,
    failures: RwLock<HashMap<String, SourceErrorKind>>,
    hooks: RwLock<HashMap<String, FetchHook>>,
    calls: RwLock<HashMap<String, usize>>,
}

impl fmt::Debug for MockBlockSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockBlockSource")
            .field("blocks", &self.blocks)
            .field("pages", &self.pages)
            .field("failures", &self.failures)
            .finish_non_exhaustive()
    }
}

impl MockBlockSource {
    /// Create a new empty mock source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register block metadata returned by `retrieve_block`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_block(self, block: Block) -> Self {
        self.blocks.write().unwrap().insert(block.id.clone(), block);
        self
    }

    /// Set the children of `parent` as a single page.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_children(self, parent: impl Into<String>, blocks: Vec<Block>) -> Self {
        self.with_pages(parent, vec![blocks])
    }

    /// Set the children of `parent` split into pages.
    ///
    /// Cursors are generated as `{parent}-cursor-{n}`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_pages(self, parent: impl Into<String>, pages: Vec<Vec<Block>>) -> Self {
        let parent = parent.into();
        let count = pages.len();
        let pages = pages
            .into_iter()
            .enumerate()
            .map(|(index, blocks)| ChildrenPage {
                blocks,
                next_cursor: (index + 1 < count).then(|| format!("{parent}-cursor-{}", index + 1)),
            })
            .collect();
        self.with_raw_pages(parent, pages)
    }

    /// Set the children pages of `parent` verbatim, cursors included.
    ///
    /// A cursor resolves to the page following the first page that returned
    /// it, so inconsistent sequences (repeated cursors) can be modelled.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_raw_pages(self, parent: impl Into<String>, pages: Vec<ChildrenPage>) -> Self {
        self.pages.write().unwrap().insert(parent.into(), pages);
        self
    }

    /// Make every request about `block_id` fail with `kind`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_failure(self, block_id: impl Into<String>, kind: SourceErrorKind) -> Self {
        self.failures.write().unwrap().insert(block_id.into(), kind);
        self
    }

    /// Run `hook` whenever children of `block_id` are listed.
    ///
    /// The hook runs after the call is counted and before the page is
    /// returned.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn on_fetch(self, block_id: impl Into<String>, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.hooks
            .write()
            .unwrap()
            .insert(block_id.into(), Arc::new(hook));
        self
    }

    /// Number of `list_children` calls issued for `block_id`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn list_calls(&self, block_id: &str) -> usize {
        self.calls.read().unwrap().get(block_id).copied().unwrap_or(0)
    }

    /// Total number of `list_children` calls.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn total_list_calls(&self) -> usize {
        self.calls.read().unwrap().values().sum()
    }

    fn failure(&self, block_id: &str) -> Option<SourceError> {
        let kind = *self.failures.read().unwrap().get(block_id)?;
        Some(SourceError::new(kind).with_backend("Mock").with_block(block_id))
    }
}

impl BlockSource for MockBlockSource {
    fn retrieve_block(&self, block_id: &str) -> Result<Block, SourceError> {
        if let Some(err) = self.failure(block_id) {
            return Err(err);
        }
        self.blocks
            .read()
            .unwrap()
            .get(block_id)
            .cloned()
            .ok_or_else(|| SourceError::not_found(block_id).with_backend("Mock"))
    }

    fn list_children(
        &self,
        block_id: &str,
        cursor: Option<&str>,
    ) -> Result<ChildrenPage, SourceError> {
        *self
            .calls
            .write()
            .unwrap()
            .entry(block_id.to_owned())
            .or_default() += 1;

        let hook = self.hooks.read().unwrap().get(block_id).cloned();
        if let Some(hook) = hook {
            hook();
        }

        if let Some(err) = self.failure(block_id) {
            return Err(err);
        }

        let pages = self.pages.read().unwrap();
        let Some(pages) = pages.get(block_id) else {
            return Ok(ChildrenPage::default());
        };
        let index = match cursor {
            None => 0,
            Some(cursor) => pages
                .iter()
                .position(|page| page.next_cursor.as_deref() == Some(cursor))
                .map(|position| position + 1)
                .ok_or_else(|| {
                    SourceError::new(SourceErrorKind::InvalidResponse)
                        .with_backend("Mock")
                        .with_block(block_id)
                })?,
        };
        Ok(pages.get(index).cloned().unwrap_or_default())
    }
}
