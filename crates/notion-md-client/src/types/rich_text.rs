//! Rich text wire types.

use notion_md_renderer::{Annotations, RichText, SpanContent};
use serde::Deserialize;

/// Rich text span as returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct WireRichText {
    /// Span type: `text`, `mention` or `equation`.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Unformatted text (all span types).
    #[serde(default)]
    pub plain_text: Option<String>,
    /// Link target, if any.
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub annotations: WireAnnotations,
    /// Payload of `text` spans.
    #[serde(default)]
    pub text: Option<WireText>,
    /// Payload of `equation` spans.
    #[serde(default)]
    pub equation: Option<WireEquation>,
}

/// Span annotations.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WireAnnotations {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub code: bool,
    pub color: String,
}

/// Payload of a `text` span.
#[derive(Debug, Clone, Deserialize)]
pub struct WireText {
    pub content: String,
    #[serde(default)]
    pub link: Option<WireLink>,
}

/// Link object.
#[derive(Debug, Clone, Deserialize)]
pub struct WireLink {
    pub url: String,
}

/// Payload of an `equation` span.
#[derive(Debug, Clone, Deserialize)]
pub struct WireEquation {
    pub expression: String,
}

impl From<WireAnnotations> for Annotations {
    fn from(wire: WireAnnotations) -> Self {
        let color = (!wire.color.is_empty() && wire.color != "default").then_some(wire.color);
        Self {
            bold: wire.bold,
            italic: wire.italic,
            strikethrough: wire.strikethrough,
            underline: wire.underline,
            code: wire.code,
            color,
        }
    }
}

impl From<WireRichText> for RichText {
    fn from(wire: WireRichText) -> Self {
        let link = wire
            .text
            .as_ref()
            .and_then(|text| text.link.as_ref())
            .map(|link| link.url.clone());

        let content = match wire.kind.as_deref() {
            Some("equation") => wire
                .equation
                .map(|equation| equation.expression)
                .or(wire.plain_text)
                .map(SpanContent::Equation),
            Some("mention") => wire.plain_text.map(SpanContent::Mention),
            _ => wire
                .text
                .map(|text| text.content)
                .or(wire.plain_text)
                .map(SpanContent::Text),
        };

        Self {
            content: content.unwrap_or(SpanContent::Malformed),
            annotations: wire.annotations.into(),
            href: wire.href.or(link),
        }
    }
}

/// Convert a span list.
pub(crate) fn rich_text(spans: Vec<WireRichText>) -> Vec<RichText> {
    spans.into_iter().map(RichText::from).collect()
}
