//! Block wire types.
//!
//! A block object carries its type-specific payload under a key named after
//! its `type`. The payload is kept as raw JSON until the type is known and
//! then decoded into one of the small payload structs below.

use notion_md_renderer::{Block, BlockKind, ChildrenPage, HeadingLevel, Media};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::rich_text::{WireRichText, rich_text};
use crate::error::ClientError;

/// Block object as returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct WireBlock {
    /// Block ID.
    pub id: String,
    /// Type discriminant, also the key of the payload.
    #[serde(rename = "type")]
    pub kind: String,
    /// Whether the block has children.
    #[serde(default)]
    pub has_children: bool,
    /// Every other field, payload included.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// One page of a children listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ChildrenResponse {
    /// Child blocks in document order.
    pub results: Vec<WireBlock>,
    /// Cursor for the next page.
    #[serde(default)]
    pub next_cursor: Option<String>,
    /// Whether more pages follow.
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Deserialize)]
struct TextPayload {
    #[serde(default)]
    rich_text: Vec<WireRichText>,
}

#[derive(Deserialize)]
struct ToDoPayload {
    #[serde(default)]
    rich_text: Vec<WireRichText>,
    #[serde(default)]
    checked: bool,
}

#[derive(Deserialize)]
struct CalloutPayload {
    #[serde(default)]
    rich_text: Vec<WireRichText>,
    #[serde(default)]
    icon: Option<WireIcon>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireIcon {
    Emoji {
        emoji: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct CodePayload {
    #[serde(default)]
    rich_text: Vec<WireRichText>,
    #[serde(default)]
    language: String,
}

#[derive(Deserialize)]
struct EquationPayload {
    #[serde(default)]
    expression: String,
}

#[derive(Deserialize)]
struct TablePayload {
    #[serde(default)]
    has_column_header: bool,
}

#[derive(Deserialize)]
struct TableRowPayload {
    #[serde(default)]
    cells: Vec<Vec<WireRichText>>,
}

/// Hosted (`file`) or `external` media.
#[derive(Deserialize)]
struct MediaPayload {
    #[serde(default)]
    caption: Vec<WireRichText>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    external: Option<WireUrl>,
    #[serde(default)]
    file: Option<WireUrl>,
}

#[derive(Deserialize)]
struct WireUrl {
    url: String,
}

#[derive(Deserialize)]
struct LinkPayload {
    #[serde(default)]
    url: String,
    #[serde(default)]
    caption: Vec<WireRichText>,
}

#[derive(Deserialize)]
struct SyncedPayload {
    #[serde(default)]
    synced_from: Option<WireSyncedFrom>,
}

#[derive(Deserialize)]
struct WireSyncedFrom {
    block_id: String,
}

#[derive(Deserialize)]
struct ChildPagePayload {
    #[serde(default)]
    title: String,
}

impl MediaPayload {
    fn into_media(self) -> Media {
        let url = self
            .external
            .or(self.file)
            .map(|source| source.url)
            .unwrap_or_default();
        Media {
            url,
            caption: rich_text(self.caption),
            name: self.name.filter(|name| !name.is_empty()),
        }
    }
}

impl WireBlock {
    /// Convert into the renderer's block model.
    ///
    /// Unknown types become [`BlockKind::Unsupported`].
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Payload`] if a known type's payload is malformed.
    pub fn into_block(mut self) -> Result<Block, ClientError> {
        let payload = self
            .fields
            .remove(&self.kind)
            .filter(|value| !value.is_null())
            .unwrap_or_else(|| Value::Object(Map::new()));
        let decoder = PayloadDecoder {
            block_id: &self.id,
            kind: &self.kind,
            payload,
        };

        let kind = match self.kind.as_str() {
            "paragraph" => BlockKind::Paragraph {
                text: decoder.decode::<TextPayload>()?.rich_text(),
            },
            "heading_1" => decoder.heading(HeadingLevel::H1)?,
            "heading_2" => decoder.heading(HeadingLevel::H2)?,
            "heading_3" => decoder.heading(HeadingLevel::H3)?,
            "bulleted_list_item" => BlockKind::BulletedListItem {
                text: decoder.decode::<TextPayload>()?.rich_text(),
            },
            "numbered_list_item" => BlockKind::NumberedListItem {
                text: decoder.decode::<TextPayload>()?.rich_text(),
            },
            "to_do" => {
                let payload: ToDoPayload = decoder.decode()?;
                BlockKind::ToDo {
                    text: rich_text(payload.rich_text),
                    checked: payload.checked,
                }
            }
            "toggle" => BlockKind::Toggle {
                text: decoder.decode::<TextPayload>()?.rich_text(),
            },
            "quote" => BlockKind::Quote {
                text: decoder.decode::<TextPayload>()?.rich_text(),
            },
            "callout" => {
                let payload: CalloutPayload = decoder.decode()?;
                let icon = match payload.icon {
                    Some(WireIcon::Emoji { emoji }) => Some(emoji),
                    Some(WireIcon::Other) | None => None,
                };
                BlockKind::Callout {
                    text: rich_text(payload.rich_text),
                    icon,
                }
            }
            "code" => {
                let payload: CodePayload = decoder.decode()?;
                BlockKind::Code {
                    language: payload.language,
                    text: rich_text(payload.rich_text),
                }
            }
            "equation" => BlockKind::Equation {
                expression: decoder.decode::<EquationPayload>()?.expression,
            },
            "table" => BlockKind::Table {
                has_column_header: decoder.decode::<TablePayload>()?.has_column_header,
            },
            "table_row" => BlockKind::TableRow {
                cells: decoder
                    .decode::<TableRowPayload>()?
                    .cells
                    .into_iter()
                    .map(rich_text)
                    .collect(),
            },
            "image" => BlockKind::Image(decoder.decode::<MediaPayload>()?.into_media()),
            "video" => BlockKind::Video(decoder.decode::<MediaPayload>()?.into_media()),
            "file" => BlockKind::File(decoder.decode::<MediaPayload>()?.into_media()),
            "pdf" => BlockKind::Pdf(decoder.decode::<MediaPayload>()?.into_media()),
            "bookmark" => {
                let payload: LinkPayload = decoder.decode()?;
                BlockKind::Bookmark {
                    url: payload.url,
                    caption: rich_text(payload.caption),
                }
            }
            "embed" => {
                let payload: LinkPayload = decoder.decode()?;
                BlockKind::Embed {
                    url: payload.url,
                    caption: rich_text(payload.caption),
                }
            }
            "link_preview" => BlockKind::LinkPreview {
                url: decoder.decode::<LinkPayload>()?.url,
            },
            "divider" => BlockKind::Divider,
            "synced_block" => BlockKind::SyncedBlock {
                synced_from: decoder
                    .decode::<SyncedPayload>()?
                    .synced_from
                    .map(|from| from.block_id),
            },
            "column_list" => BlockKind::ColumnList,
            "column" => BlockKind::Column,
            "child_page" => BlockKind::ChildPage {
                title: decoder.decode::<ChildPagePayload>()?.title,
            },
            other => BlockKind::Unsupported {
                kind: other.to_owned(),
            },
        };

        Ok(Block {
            id: self.id,
            has_children: self.has_children,
            kind,
        })
    }
}

impl ChildrenResponse {
    /// Convert into a page of renderer blocks.
    ///
    /// The cursor is only kept while `has_more` is set.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Payload`] if any block payload is malformed.
    pub fn into_page(self) -> Result<ChildrenPage, ClientError> {
        let blocks = self
            .results
            .into_iter()
            .map(WireBlock::into_block)
            .collect::<Result<Vec<_>, _>>()?;
        let next_cursor = self.next_cursor.filter(|_| self.has_more);
        Ok(ChildrenPage {
            blocks,
            next_cursor,
        })
    }
}

impl TextPayload {
    fn rich_text(self) -> Vec<notion_md_renderer::RichText> {
        rich_text(self.rich_text)
    }
}

/// Decodes the payload of one block, attributing failures to it.
struct PayloadDecoder<'a> {
    block_id: &'a str,
    kind: &'a str,
    payload: Value,
}

impl PayloadDecoder<'_> {
    fn decode<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        T::deserialize(&self.payload).map_err(|source| ClientError::Payload {
            block_id: self.block_id.to_owned(),
            kind: self.kind.to_owned(),
            source,
        })
    }

    fn heading(&self, level: HeadingLevel) -> Result<BlockKind, ClientError> {
        Ok(BlockKind::Heading {
            level,
            text: self.decode::<TextPayload>()?.rich_text(),
        })
    }
}

#[cfg(test)]
mod tests {
    use notion_md_renderer::{RichText, SpanContent};
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(json: &str) -> Block {
        serde_json::from_str::<WireBlock>(json)
            .unwrap()
            .into_block()
            .unwrap()
    }

    fn plain(spans: &[RichText]) -> String {
        notion_md_renderer::plain_text(spans)
    }

    #[test]
    fn test_paragraph() {
        let block = parse(
            r#"{
                "object": "block",
                "id": "b1",
                "parent": {"type": "page_id", "page_id": "p"},
                "created_time": "2024-01-01T00:00:00.000Z",
                "has_children": false,
                "archived": false,
                "type": "paragraph",
                "paragraph": {
                    "rich_text": [{"type": "text", "text": {"content": "Hello"}, "plain_text": "Hello"}],
                    "color": "default"
                }
            }"#,
        );
        assert_eq!(block.id, "b1");
        assert!(!block.has_children);
        match block.kind {
            BlockKind::Paragraph { text } => assert_eq!(plain(&text), "Hello"),
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn test_heading_levels() {
        for (kind, level) in [
            ("heading_1", HeadingLevel::H1),
            ("heading_2", HeadingLevel::H2),
            ("heading_3", HeadingLevel::H3),
        ] {
            let json = format!(
                r#"{{"id": "h", "type": "{kind}", "has_children": true,
                    "{kind}": {{"rich_text": [], "is_toggleable": true}}}}"#
            );
            let block = parse(&json);
            assert!(block.has_children);
            assert_eq!(
                block.kind,
                BlockKind::Heading {
                    level,
                    text: vec![]
                }
            );
        }
    }

    #[test]
    fn test_to_do() {
        let block = parse(
            r#"{"id": "t", "type": "to_do",
                "to_do": {"rich_text": [{"type": "text", "text": {"content": "Ship"}}], "checked": true}}"#,
        );
        match block.kind {
            BlockKind::ToDo { text, checked } => {
                assert_eq!(plain(&text), "Ship");
                assert!(checked);
            }
            other => panic!("expected to_do, got {other:?}"),
        }
    }

    #[test]
    fn test_callout_emoji_icon() {
        let block = parse(
            r#"{"id": "c", "type": "callout",
                "callout": {"rich_text": [], "icon": {"type": "emoji", "emoji": "💡"}}}"#,
        );
        assert_eq!(
            block.kind,
            BlockKind::Callout {
                text: vec![],
                icon: Some("💡".to_owned())
            }
        );
    }

    #[test]
    fn test_callout_file_icon_dropped() {
        let block = parse(
            r#"{"id": "c", "type": "callout",
                "callout": {"rich_text": [], "icon": {"type": "external", "external": {"url": "https://x"}}}}"#,
        );
        assert_eq!(
            block.kind,
            BlockKind::Callout {
                text: vec![],
                icon: None
            }
        );
    }

    #[test]
    fn test_code() {
        let block = parse(
            r#"{"id": "c", "type": "code",
                "code": {"rich_text": [{"type": "text", "text": {"content": "fn main() {}"}}],
                         "language": "rust", "caption": []}}"#,
        );
        match block.kind {
            BlockKind::Code { language, text } => {
                assert_eq!(language, "rust");
                assert_eq!(plain(&text), "fn main() {}");
            }
            other => panic!("expected code, got {other:?}"),
        }
    }

    #[test]
    fn test_table_and_rows() {
        let table = parse(
            r#"{"id": "t", "type": "table", "has_children": true,
                "table": {"table_width": 2, "has_column_header": true, "has_row_header": false}}"#,
        );
        assert_eq!(
            table.kind,
            BlockKind::Table {
                has_column_header: true
            }
        );

        let row = parse(
            r#"{"id": "r", "type": "table_row",
                "table_row": {"cells": [[{"type": "text", "text": {"content": "a"}}], []]}}"#,
        );
        match row.kind {
            BlockKind::TableRow { cells } => {
                assert_eq!(cells.len(), 2);
                assert_eq!(plain(&cells[0]), "a");
                assert!(cells[1].is_empty());
            }
            other => panic!("expected table_row, got {other:?}"),
        }
    }

    #[test]
    fn test_external_image() {
        let block = parse(
            r#"{"id": "i", "type": "image",
                "image": {"type": "external", "external": {"url": "https://example.com/a.png"},
                          "caption": [{"type": "text", "text": {"content": "Chart"}}]}}"#,
        );
        match block.kind {
            BlockKind::Image(media) => {
                assert_eq!(media.url, "https://example.com/a.png");
                assert_eq!(plain(&media.caption), "Chart");
            }
            other => panic!("expected image, got {other:?}"),
        }
    }

    #[test]
    fn test_hosted_file_with_name() {
        let block = parse(
            r#"{"id": "f", "type": "file",
                "file": {"type": "file", "caption": [], "name": "report.pdf",
                         "file": {"url": "https://files.example.com/r.pdf", "expiry_time": "2024-01-01T00:00:00.000Z"}}}"#,
        );
        assert_eq!(
            block.kind,
            BlockKind::File(Media {
                url: "https://files.example.com/r.pdf".to_owned(),
                caption: vec![],
                name: Some("report.pdf".to_owned()),
            })
        );
    }

    #[test]
    fn test_bookmark() {
        let block = parse(
            r#"{"id": "b", "type": "bookmark", "bookmark": {"caption": [], "url": "https://example.com"}}"#,
        );
        assert_eq!(
            block.kind,
            BlockKind::Bookmark {
                url: "https://example.com".to_owned(),
                caption: vec![]
            }
        );
    }

    #[test]
    fn test_synced_copy_and_original() {
        let copy = parse(
            r#"{"id": "s", "type": "synced_block", "has_children": true,
                "synced_block": {"synced_from": {"type": "block_id", "block_id": "orig"}}}"#,
        );
        assert_eq!(
            copy.kind,
            BlockKind::SyncedBlock {
                synced_from: Some("orig".to_owned())
            }
        );
        assert_eq!(copy.children_source(), Some("orig"));

        let original = parse(
            r#"{"id": "o", "type": "synced_block", "has_children": true,
                "synced_block": {"synced_from": null}}"#,
        );
        assert_eq!(original.kind, BlockKind::SyncedBlock { synced_from: None });
    }

    #[test]
    fn test_divider_and_columns() {
        assert_eq!(
            parse(r#"{"id": "d", "type": "divider", "divider": {}}"#).kind,
            BlockKind::Divider
        );
        assert_eq!(
            parse(r#"{"id": "c", "type": "column_list", "column_list": {}}"#).kind,
            BlockKind::ColumnList
        );
        assert_eq!(
            parse(r#"{"id": "c", "type": "column", "column": {}}"#).kind,
            BlockKind::Column
        );
    }

    #[test]
    fn test_child_page() {
        let block = parse(
            r#"{"id": "cp", "type": "child_page", "has_children": true, "child_page": {"title": "Notes"}}"#,
        );
        assert_eq!(
            block.kind,
            BlockKind::ChildPage {
                title: "Notes".to_owned()
            }
        );
        assert_eq!(block.children_source(), None);
    }

    #[test]
    fn test_unknown_type_unsupported() {
        let block = parse(
            r#"{"id": "u", "type": "table_of_contents", "table_of_contents": {"color": "gray"}}"#,
        );
        assert_eq!(
            block.kind,
            BlockKind::Unsupported {
                kind: "table_of_contents".to_owned()
            }
        );
    }

    #[test]
    fn test_missing_payload_uses_defaults() {
        let block = parse(r#"{"id": "p", "type": "paragraph"}"#);
        assert_eq!(block.kind, BlockKind::Paragraph { text: vec![] });
    }

    #[test]
    fn test_malformed_payload_is_error() {
        let wire: WireBlock = serde_json::from_str(
            r#"{"id": "p", "type": "paragraph", "paragraph": {"rich_text": "oops"}}"#,
        )
        .unwrap();
        let err = wire.into_block().unwrap_err();
        match err {
            ClientError::Payload { block_id, kind, .. } => {
                assert_eq!(block_id, "p");
                assert_eq!(kind, "paragraph");
            }
            other => panic!("expected payload error, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_span_survives_decoding() {
        let block = parse(
            r#"{"id": "p", "type": "paragraph",
                "paragraph": {"rich_text": [{"type": "mention", "mention": {"type": "date"}}]}}"#,
        );
        match block.kind {
            BlockKind::Paragraph { text } => assert_eq!(text[0].content, SpanContent::Malformed),
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn test_children_response() {
        let response: ChildrenResponse = serde_json::from_str(
            r#"{"object": "list", "results": [{"id": "a", "type": "divider", "divider": {}}],
                "next_cursor": "cur", "has_more": true, "type": "block", "block": {}}"#,
        )
        .unwrap();
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.next_cursor.as_deref(), Some("cur"));
        assert!(response.has_more);

        let page = response.into_page().unwrap();
        assert_eq!(page.blocks[0].kind, BlockKind::Divider);
        assert_eq!(page.next_cursor.as_deref(), Some("cur"));
    }

    #[test]
    fn test_children_cursor_dropped_without_has_more() {
        let response: ChildrenResponse = serde_json::from_str(
            r#"{"results": [], "next_cursor": "stale", "has_more": false}"#,
        )
        .unwrap();
        let page = response.into_page().unwrap();
        assert!(page.blocks.is_empty());
        assert_eq!(page.next_cursor, None);
    }
}
