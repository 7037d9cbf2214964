//! Block tree to Markdown rendering engine.
//!
//! This crate converts a block-based content document (a Notion page and its
//! nested blocks) into a single Markdown string. It never talks HTTP itself:
//! the content API is reached through the [`BlockSource`] trait.
//!
//! # Architecture
//!
//! A conversion runs in two phases:
//! - **Fetch**: the tree fetcher exhausts each children listing page by page
//!   and resolves the whole tree, optionally fanning out over sibling
//!   subtrees on a bounded worker pool.
//! - **Render**: the assembler walks the tree in document order, renders each
//!   block through an exhaustive per-type dispatch and joins the fragments
//!   with the blank-line and indentation rules. Rich text spans become
//!   inline Markdown independently of each other.
//!
//! Unsupported block types and malformed spans are non-fatal and come back
//! as [`Warning`]s next to the document. Fetch failures, inconsistent
//! pagination and cancellation abort the conversion with a [`ConvertError`].
//!
//! # Example
//!
//! ```ignore
//! use notion_md_renderer::{CancellationToken, ConvertOptions, Converter};
//!
//! let converter = Converter::new(client, ConvertOptions::default())?;
//! let conversion = converter.convert_page(page_id, &CancellationToken::new())?;
//! print!("{}", conversion.markdown);
//! ```

mod assembler;
mod cancel;
mod context;
mod converter;
mod error;
mod fetcher;
mod id;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod model;
mod registry;
mod rich_text;
mod source;

pub use cancel::CancellationToken;
pub use context::{ConversionContext, TableMode};
pub use converter::{
    Conversion, ConvertOptions, Converter, DEFAULT_CONCURRENCY, DEFAULT_MAX_PAGES,
};
pub use error::{ConvertError, Location, PaginationIssue, Warning, WarningKind};
pub use id::BlockId;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockBlockSource;
pub use model::{
    Annotations, Block, BlockKind, BlockNode, HeadingLevel, Media, RichText, SpanContent,
    plain_text,
};
pub use registry::{ChildLayout, Fragment, INDENT, RunKind, render_block};
pub use rich_text::{InlineText, escape_markdown, render_rich_text, render_span};
pub use source::{BlockSource, ChildrenPage, SourceError, SourceErrorKind};
