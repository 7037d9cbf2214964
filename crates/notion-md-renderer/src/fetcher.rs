//! Block tree fetching.
//!
//! Resolves a block's complete child tree before any rendering happens.
//! Each children listing is exhausted page by page; sibling subtrees may be
//! fetched in parallel on the current rayon pool, and results are always
//! collected back in API order.

use std::collections::HashSet;

use rayon::prelude::*;
use tracing::debug;

use crate::cancel::CancellationToken;
use crate::error::{ConvertError, Location, PaginationIssue};
use crate::model::{Block, BlockNode};
use crate::source::BlockSource;

/// Fetches block trees from a [`BlockSource`].
pub(crate) struct TreeFetcher<'a, S: ?Sized> {
    source: &'a S,
    cancel: &'a CancellationToken,
    max_pages: usize,
    parallel: bool,
}

impl<'a, S: BlockSource + ?Sized> TreeFetcher<'a, S> {
    pub(crate) fn new(source: &'a S, cancel: &'a CancellationToken, max_pages: usize) -> Self {
        Self {
            source,
            cancel,
            max_pages,
            parallel: false,
        }
    }

    /// Fan out across sibling subtrees. Must be called from inside a rayon
    /// pool to bound the parallelism.
    #[must_use]
    pub(crate) fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Fetch the full tree below `location.block_id`, reading children from
    /// `children_of`.
    pub(crate) fn fetch_tree(
        &self,
        children_of: &str,
        location: &Location,
    ) -> Result<Vec<BlockNode>, ConvertError> {
        let blocks = self.fetch_children(children_of, location)?;
        self.build_nodes(blocks, location)
    }

    /// Fetch `block`'s subtree, or a leaf when its children are not traversed.
    pub(crate) fn build_node(
        &self,
        block: Block,
        location: &Location,
    ) -> Result<BlockNode, ConvertError> {
        let Some(children_of) = block.children_source().map(str::to_owned) else {
            return Ok(BlockNode::leaf(block));
        };
        let children = self.fetch_tree(&children_of, location)?;
        Ok(BlockNode { block, children })
    }

    /// All children listed under `block_id`, in API order.
    ///
    /// Pagination ends when the source returns no cursor. A cursor seen
    /// twice or more than `max_pages` pages fail instead of looping.
    pub(crate) fn fetch_children(
        &self,
        block_id: &str,
        location: &Location,
    ) -> Result<Vec<Block>, ConvertError> {
        let mut blocks = Vec::new();
        let mut seen = HashSet::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0;

        loop {
            self.cancel.check()?;
            let page = self
                .source
                .list_children(block_id, cursor.as_deref())
                .map_err(|source| ConvertError::Fetch {
                    location: location.clone(),
                    source,
                })?;
            pages += 1;
            debug!(
                block_id,
                page = pages,
                blocks = page.blocks.len(),
                "Fetched children page"
            );
            blocks.extend(page.blocks);

            let Some(next) = page.next_cursor.filter(|c| !c.is_empty()) else {
                return Ok(blocks);
            };
            if pages >= self.max_pages {
                return Err(ConvertError::Pagination {
                    location: location.clone(),
                    issue: PaginationIssue::PageLimit {
                        limit: self.max_pages,
                    },
                });
            }
            if !seen.insert(next.clone()) {
                return Err(ConvertError::Pagination {
                    location: location.clone(),
                    issue: PaginationIssue::RepeatedCursor { cursor: next },
                });
            }
            cursor = Some(next);
        }
    }

    fn build_nodes(
        &self,
        blocks: Vec<Block>,
        parent: &Location,
    ) -> Result<Vec<BlockNode>, ConvertError> {
        let branching = blocks
            .iter()
            .filter(|block| block.children_source().is_some())
            .count();

        if self.parallel && branching > 1 {
            blocks
                .into_par_iter()
                .map(|block| {
                    let location = parent.child(&block.id);
                    self.build_node(block, &location)
                })
                .collect()
        } else {
            blocks
                .into_iter()
                .map(|block| {
                    let location = parent.child(&block.id);
                    self.build_node(block, &location)
                })
                .collect()
        }
    }
}
