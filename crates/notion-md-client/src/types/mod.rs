//! Notion API wire types.

mod block;
mod rich_text;

pub use block::{ChildrenResponse, WireBlock};
pub use rich_text::{WireAnnotations, WireEquation, WireLink, WireRichText, WireText};
