//! Rich text spans to inline Markdown.
//!
//! Each span is wrapped independently and the results are concatenated, so
//! neighbouring spans with different annotations never interfere. Wrapping
//! goes from the inside out: code, italic, bold, strikethrough, link.
//! Colors and underline have no Markdown form and are dropped.

use std::borrow::Cow;

use crate::model::{RichText, SpanContent};

/// Characters escaped in span text.
const METACHARACTERS: [char; 6] = ['\\', '*', '_', '`', '[', ']'];

/// Inline Markdown for a span sequence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InlineText {
    pub markdown: String,
    /// Number of spans dropped because they carried nothing renderable.
    pub malformed_spans: usize,
}

/// Render a span sequence to inline Markdown.
pub fn render_rich_text(spans: &[RichText]) -> InlineText {
    let mut inline = InlineText::default();
    for span in spans {
        if span.content == SpanContent::Malformed {
            inline.malformed_spans += 1;
            continue;
        }
        inline.markdown.push_str(&render_span(span));
    }
    inline
}

/// Render a single span.
pub fn render_span(span: &RichText) -> String {
    let text = match &span.content {
        SpanContent::Text(text) | SpanContent::Mention(text) => text.as_str(),
        SpanContent::Equation(expression) => {
            let math = format!("${}$", expression.trim());
            return match &span.href {
                Some(url) => link(&math, url),
                None => math,
            };
        }
        SpanContent::Malformed => return String::new(),
    };

    if text.is_empty() {
        // A bare link with no display text renders as the URL itself.
        return span.href.clone().unwrap_or_default();
    }

    // Emphasis markers must hug non-whitespace, so edge whitespace stays outside.
    let core = text.trim();
    if core.is_empty() {
        return match &span.href {
            Some(url) => link(text, url),
            None => text.to_owned(),
        };
    }
    let leading = &text[..text.len() - text.trim_start().len()];
    let trailing = &text[text.trim_end().len()..];

    let annotations = &span.annotations;
    let mut out = if annotations.code {
        code_span(core)
    } else {
        escape_markdown(core).into_owned()
    };
    if annotations.italic {
        out = format!("_{out}_");
    }
    if annotations.bold {
        out = format!("**{out}**");
    }
    if annotations.strikethrough {
        out = format!("~~{out}~~");
    }
    if let Some(url) = &span.href {
        out = link(&out, url);
    }

    format!("{leading}{out}{trailing}")
}

/// Escape Markdown metacharacters in literal text.
pub fn escape_markdown(text: &str) -> Cow<'_, str> {
    if !text.contains(METACHARACTERS) {
        return Cow::Borrowed(text);
    }
    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        if METACHARACTERS.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    Cow::Owned(escaped)
}

/// Longest run of consecutive backticks in `text`.
pub(crate) fn longest_backtick_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in text.chars() {
        if c == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

/// Inline code span, fenced with enough backticks to hold the content.
fn code_span(text: &str) -> String {
    let fence = "`".repeat(longest_backtick_run(text) + 1);
    if text.starts_with('`') || text.ends_with('`') {
        format!("{fence} {text} {fence}")
    } else {
        format!("{fence}{text}{fence}")
    }
}

fn link(text: &str, url: &str) -> String {
    if url.contains([' ', '(', ')']) {
        format!("[{text}](<{url}>)")
    } else {
        format!("[{text}]({url})")
    }
}
