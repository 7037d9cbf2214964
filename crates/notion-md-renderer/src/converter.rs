//! Conversion entry points.
//!
//! A conversion runs in two phases. The whole block tree is fetched first
//! (sequentially, or fanned out over a bounded worker pool), then rendered
//! synchronously. Cancellation and fetch failures discard everything; a
//! caller either gets the complete document or an error.

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, info};

use crate::assembler::DocumentAssembler;
use crate::cancel::CancellationToken;
use crate::error::{ConvertError, Location, Warning};
use crate::fetcher::TreeFetcher;
use crate::model::{Block, BlockKind, BlockNode, HeadingLevel, RichText};
use crate::source::BlockSource;

/// Default number of concurrent children fetches.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Default bound on children pages per block.
pub const DEFAULT_MAX_PAGES: usize = 1000;

/// Conversion tuning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Maximum concurrent fetches. `1` fetches strictly sequentially.
    pub concurrency: usize,
    /// Maximum children pages fetched for a single block.
    pub max_pages: usize,
    /// Start page documents with the page title as a level 1 heading.
    pub include_title: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            max_pages: DEFAULT_MAX_PAGES,
            include_title: false,
        }
    }
}

/// Result of a successful conversion.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Conversion {
    /// Complete Markdown document.
    pub markdown: String,
    /// Non-fatal issues met while rendering, in document order.
    pub warnings: Vec<Warning>,
}

impl Conversion {
    /// Document lines, for streaming output.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.markdown.lines()
    }
}

/// Converts block trees from a [`BlockSource`] into Markdown.
///
/// Each call owns its own rendering state, so one converter can serve
/// concurrent conversions.
pub struct Converter<S> {
    source: S,
    options: ConvertOptions,
    pool: Option<ThreadPool>,
}

impl<S: BlockSource> Converter<S> {
    /// Create a converter.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::WorkerPool`] if fetch workers cannot be started.
    pub fn new(source: S, options: ConvertOptions) -> Result<Self, ConvertError> {
        let options = ConvertOptions {
            concurrency: options.concurrency.max(1),
            max_pages: options.max_pages.max(1),
            ..options
        };
        let pool = if options.concurrency > 1 {
            Some(
                ThreadPoolBuilder::new()
                    .num_threads(options.concurrency)
                    .thread_name(|index| format!("notion-md-fetch-{index}"))
                    .build()?,
            )
        } else {
            None
        };
        Ok(Self {
            source,
            options,
            pool,
        })
    }

    /// Effective options after clamping.
    pub fn options(&self) -> ConvertOptions {
        self.options
    }

    /// Borrow the underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Convert the content of a page (its children) to Markdown.
    ///
    /// With [`ConvertOptions::include_title`] the page block is retrieved
    /// first and its title becomes a leading `#` heading.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::InvalidId`] for an empty id,
    /// [`ConvertError::Fetch`] or [`ConvertError::Pagination`] when the tree
    /// cannot be fetched, and [`ConvertError::Cancelled`] if `cancel` fires
    /// before the conversion completes.
    pub fn convert_page(
        &self,
        page_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Conversion, ConvertError> {
        let page_id = validate_id(page_id)?;
        info!(page_id, "Converting page");

        let root = Location::root(page_id);
        let title = if self.options.include_title {
            cancel.check()?;
            self.page_title(page_id, &root)?
        } else {
            None
        };
        let mut nodes = self.fetch(cancel, |fetcher| fetcher.fetch_tree(page_id, &root))?;
        cancel.check()?;
        if let Some(title) = title {
            let heading = Block::new(
                page_id,
                BlockKind::Heading {
                    level: HeadingLevel::H1,
                    text: vec![RichText::plain(title)],
                },
            );
            nodes.insert(0, BlockNode::leaf(heading));
        }
        Ok(render(&nodes))
    }

    /// Convert a single block, including its own content and its subtree.
    ///
    /// # Errors
    ///
    /// Same as [`Converter::convert_page`]; a failure to retrieve the block
    /// itself is reported as a fetch error at depth 0.
    pub fn convert_block(
        &self,
        block_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Conversion, ConvertError> {
        let block_id = validate_id(block_id)?;
        info!(block_id, "Converting block");
        cancel.check()?;

        let root = Location::root(block_id);
        let block = self
            .source
            .retrieve_block(block_id)
            .map_err(|source| ConvertError::Fetch {
                location: root.clone(),
                source,
            })?;
        let node = self.fetch(cancel, |fetcher| fetcher.build_node(block, &root))?;
        cancel.check()?;
        Ok(render(std::slice::from_ref(&node)))
    }

    /// Title of a page, read from its `child_page` block.
    fn page_title(&self, page_id: &str, root: &Location) -> Result<Option<String>, ConvertError> {
        let block = self
            .source
            .retrieve_block(page_id)
            .map_err(|source| ConvertError::Fetch {
                location: root.clone(),
                source,
            })?;
        Ok(match block.kind {
            BlockKind::ChildPage { title } if !title.trim().is_empty() => Some(title),
            _ => None,
        })
    }

    fn fetch<T, F>(&self, cancel: &CancellationToken, op: F) -> Result<T, ConvertError>
    where
        T: Send,
        F: FnOnce(&TreeFetcher<'_, S>) -> Result<T, ConvertError> + Send,
    {
        let fetcher = TreeFetcher::new(&self.source, cancel, self.options.max_pages);
        match &self.pool {
            Some(pool) => pool.install(|| op(&fetcher.parallel(true))),
            None => op(&fetcher),
        }
    }
}

fn validate_id(id: &str) -> Result<&str, ConvertError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(ConvertError::InvalidId(id.to_owned()));
    }
    Ok(trimmed)
}

fn render(nodes: &[BlockNode]) -> Conversion {
    let (markdown, warnings) = DocumentAssembler::new().assemble(nodes);
    debug!(
        bytes = markdown.len(),
        warnings = warnings.len(),
        "Rendered document"
    );
    Conversion { markdown, warnings }
}
