//! Notion REST API client.
//!
//! Provides a sync HTTP client for the block endpoints of the Notion API
//! with bearer token authentication.

mod blocks;

use ureq::Agent;

use notion_md_config::NotionConfig;

/// Notion REST API client.
pub struct NotionClient {
    agent: Agent,
    base_url: String,
    token: String,
    version: String,
    page_size: u32,
}

impl NotionClient {
    /// Create client from config values.
    ///
    /// # Arguments
    /// * `config` - API endpoint, version and timeout
    /// * `token` - Integration token
    /// * `page_size` - Children requested per page (1-100)
    #[must_use]
    pub fn from_config(config: &NotionConfig, token: &str, page_size: u32) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(config.timeout()))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            token: token.to_owned(),
            version: config.version.clone(),
            page_size: page_size.clamp(1, 100),
        }
    }

    /// Get the API base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl std::fmt::Debug for NotionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotionClient")
            .field("base_url", &self.base_url)
            .field("version", &self.version)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static_assertions::assert_impl_all!(NotionClient: Send, Sync);

    fn config(base_url: &str) -> NotionConfig {
        NotionConfig {
            base_url: base_url.to_owned(),
            ..NotionConfig::default()
        }
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = NotionClient::from_config(&config("https://api.notion.com/v1/"), "t", 100);
        assert_eq!(client.base_url(), "https://api.notion.com/v1");
    }

    #[test]
    fn test_page_size_clamped() {
        let client = NotionClient::from_config(&config("https://api.notion.com/v1"), "t", 500);
        assert_eq!(client.page_size, 100);
        let client = NotionClient::from_config(&config("https://api.notion.com/v1"), "t", 0);
        assert_eq!(client.page_size, 1);
    }

    #[test]
    fn test_debug_hides_token() {
        let client = NotionClient::from_config(&config("https://api.notion.com/v1"), "secret", 10);
        assert!(!format!("{client:?}").contains("secret"));
    }
}
