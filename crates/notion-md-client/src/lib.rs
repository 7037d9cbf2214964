//! Notion REST API client for notion-md.
//!
//! Provides [`NotionClient`], a blocking HTTP client implementing the
//! renderer's [`BlockSource`](notion_md_renderer::BlockSource) trait, and
//! the wire types it decodes API responses into.
//!
//! # Example
//!
//! ```ignore
//! use notion_md_client::NotionClient;
//! use notion_md_config::Config;
//!
//! let config = Config::load(None, None)?;
//! let client = NotionClient::from_config(&config.notion, config.require_token()?, 100);
//! let block = client.retrieve_block("1f2e3d4c-5b6a-4978-8695-a4b3c2d1e0f9")?;
//! ```

mod client;
mod error;
pub mod types;

pub use client::NotionClient;
pub use error::ClientError;
