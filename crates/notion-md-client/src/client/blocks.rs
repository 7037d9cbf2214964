//! Block operations for Notion API.

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use notion_md_renderer::{Block, BlockSource, ChildrenPage, SourceError};

use super::NotionClient;
use crate::error::ClientError;
use crate::types::{ChildrenResponse, WireBlock};

/// Error object returned by the API on failure.
#[derive(Deserialize)]
struct ApiError {
    message: String,
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, NON_ALPHANUMERIC).to_string()
}

impl NotionClient {
    /// Retrieve a single block.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure, error status or malformed body.
    pub fn get_block(&self, block_id: &str) -> Result<Block, ClientError> {
        let url = format!("{}/blocks/{}", self.base_url, encode(block_id));
        debug!(block_id, "Retrieving block");
        let block: WireBlock = self.get_json(&url)?;
        block.into_block()
    }

    /// Retrieve one page of a block's children.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure, error status or malformed body.
    pub fn get_children(
        &self,
        block_id: &str,
        cursor: Option<&str>,
    ) -> Result<ChildrenPage, ClientError> {
        let mut url = format!(
            "{}/blocks/{}/children?page_size={}",
            self.base_url,
            encode(block_id),
            self.page_size
        );
        if let Some(cursor) = cursor {
            url.push_str("&start_cursor=");
            url.push_str(&encode(cursor));
        }

        debug!(block_id, cursor, "Listing children");
        let response: ChildrenResponse = self.get_json(&url)?;
        let page = response.into_page()?;
        debug!(
            block_id,
            count = page.blocks.len(),
            has_more = page.next_cursor.is_some(),
            "Listed children"
        );
        Ok(page)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ClientError> {
        let response = self
            .agent
            .get(url)
            .header("Authorization", &format!("Bearer {}", self.token))
            .header("Notion-Version", &self.version)
            .header("Accept", "application/json")
            .call()?;

        let status = response.status().as_u16();
        let mut body_reader = response.into_body();

        if status >= 400 {
            let error_body = body_reader
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            let message = serde_json::from_str::<ApiError>(&error_body)
                .map_or(error_body, |error| error.message);
            return Err(ClientError::HttpResponse { status, message });
        }

        let body = body_reader.read_to_string()?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl BlockSource for NotionClient {
    fn retrieve_block(&self, block_id: &str) -> Result<Block, SourceError> {
        self.get_block(block_id)
            .map_err(|e| e.into_source_error(block_id))
    }

    fn list_children(
        &self,
        block_id: &str,
        cursor: Option<&str>,
    ) -> Result<ChildrenPage, SourceError> {
        self.get_children(block_id, cursor)
            .map_err(|e| e.into_source_error(block_id))
    }
}
