//! Per-discriminant rendering rules.
//!
//! [`render_block`] is the dispatch table: one exhaustive match arm per
//! [`BlockKind`]. It renders a block's own content only. Children are
//! composed by the assembler according to the returned [`Fragment`] hints.

use tracing::warn;

use crate::context::{ConversionContext, TableMode};
use crate::error::Warning;
use crate::model::{Block, BlockKind, Media, RichText, plain_text};
use crate::rich_text::{escape_markdown, longest_backtick_run, render_rich_text};

/// How a block's children are placed under its own fragment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChildLayout {
    /// Indented by one unit.
    Nested,
    /// Prefixed with `> ` to stay inside the quote.
    Quoted,
    /// Rendered at the parent's indentation.
    Flat,
}

/// Sibling run kind. Consecutive fragments of the same kind are joined
/// without a blank line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunKind {
    Bulleted,
    Numbered,
    ToDo,
    TableRow,
}

impl RunKind {
    /// Whether this run is a Markdown list.
    pub fn is_list(self) -> bool {
        matches!(self, Self::Bulleted | Self::Numbered | Self::ToDo)
    }
}

/// Rendered own content of a block plus structural hints.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fragment {
    /// Block-level Markdown, possibly multi-line, without trailing newline.
    pub markdown: String,
    pub layout: ChildLayout,
    /// Indentation width for [`ChildLayout::Nested`] children.
    pub indent: usize,
    pub run: Option<RunKind>,
}

impl Fragment {
    fn block(markdown: String) -> Self {
        Self {
            markdown,
            layout: ChildLayout::Nested,
            indent: INDENT.len(),
            run: None,
        }
    }

    /// List item whose continuation lines and children align with the
    /// content column, `width` columns after the line start.
    fn list_item(marker: &str, width: usize, text: &str, run: RunKind) -> Self {
        let pad = " ".repeat(width);
        let mut lines = text.lines();
        let mut markdown = format!("{marker}{}", lines.next().unwrap_or_default());
        for line in lines {
            markdown.push('\n');
            if !line.is_empty() {
                markdown.push_str(&pad);
                markdown.push_str(line);
            }
        }
        Self {
            markdown: markdown.trim_end().to_owned(),
            layout: ChildLayout::Nested,
            indent: width,
            run: Some(run),
        }
    }

    fn container() -> Self {
        Self {
            markdown: String::new(),
            layout: ChildLayout::Flat,
            indent: 0,
            run: None,
        }
    }

    #[must_use]
    fn with_layout(mut self, layout: ChildLayout) -> Self {
        self.layout = layout;
        self
    }
}

/// Indentation unit for nested children.
pub const INDENT: &str = "  ";

/// Base URL for links to child pages.
const PAGE_URL_BASE: &str = "https://www.notion.so/";

/// Render the own content of `block`.
///
/// Unsupported types and malformed spans push to `warnings` and render as
/// nothing instead of failing.
pub fn render_block(block: &Block, ctx: &ConversionContext, warnings: &mut Vec<Warning>) -> Fragment {
    let mut inline = |spans: &[RichText]| {
        let rendered = render_rich_text(spans);
        if rendered.malformed_spans > 0 {
            warn!(block_id = %block.id, spans = rendered.malformed_spans, "Malformed rich text");
            warnings.push(Warning::malformed(&block.id, rendered.malformed_spans));
        }
        rendered.markdown
    };

    match &block.kind {
        BlockKind::Paragraph { text } | BlockKind::Toggle { text } => Fragment::block(inline(text)),
        BlockKind::Heading { level, text } => {
            let title = single_line(&inline(text));
            let markdown = if title.is_empty() {
                String::new()
            } else {
                format!("{} {title}", level.marker())
            };
            Fragment::block(markdown).with_layout(ChildLayout::Flat)
        }
        BlockKind::BulletedListItem { text } => {
            Fragment::list_item("- ", INDENT.len(), &inline(text), RunKind::Bulleted)
        }
        BlockKind::NumberedListItem { text } => {
            let marker = format!("{}. ", ctx.list_number().max(1));
            Fragment::list_item(&marker, marker.len(), &inline(text), RunKind::Numbered)
        }
        BlockKind::ToDo { text, checked } => {
            let marker = if *checked { "- [x] " } else { "- [ ] " };
            Fragment::list_item(marker, INDENT.len(), &inline(text), RunKind::ToDo)
        }
        BlockKind::Quote { text } => {
            Fragment::block(quote(&inline(text))).with_layout(ChildLayout::Quoted)
        }
        BlockKind::Callout { text, icon } => {
            let body = inline(text);
            let body = match icon {
                Some(icon) if !body.is_empty() => format!("{icon} {body}"),
                Some(icon) => icon.clone(),
                None => body,
            };
            Fragment::block(quote(&body)).with_layout(ChildLayout::Quoted)
        }
        BlockKind::Code { language, text } => Fragment::block(code_block(language, &plain_text(text))),
        BlockKind::Equation { expression } => {
            Fragment::block(format!("$$\n{}\n$$", expression.trim()))
        }
        BlockKind::Table { .. } => Fragment::container(),
        BlockKind::TableRow { cells } => {
            let table = ctx.table().unwrap_or(TableMode {
                has_column_header: false,
                columns: cells.len(),
                widest_row: cells.len(),
                rows_seen: 2,
            });
            let cells: Vec<String> = cells.iter().map(|cell| table_cell(&inline(cell))).collect();
            Fragment {
                markdown: table_row(cells, table),
                layout: ChildLayout::Flat,
                indent: 0,
                run: Some(RunKind::TableRow),
            }
        }
        BlockKind::Image(media) => Fragment::block(image(media)),
        BlockKind::Video(media) | BlockKind::File(media) | BlockKind::Pdf(media) => {
            let caption = plain_text(&media.caption);
            let label = if caption.trim().is_empty() {
                media.name.as_deref().unwrap_or(&media.url)
            } else {
                caption.trim()
            };
            Fragment::block(link_line(label, &media.url))
        }
        BlockKind::Bookmark { url, caption } | BlockKind::Embed { url, caption } => {
            Fragment::block(link_line(plain_text(caption).trim(), url))
        }
        BlockKind::LinkPreview { url } => Fragment::block(link_line("", url)),
        BlockKind::Divider => Fragment::block("---".to_owned()),
        BlockKind::SyncedBlock { .. } | BlockKind::ColumnList | BlockKind::Column => {
            Fragment::container()
        }
        BlockKind::ChildPage { title } => {
            let url = format!("{PAGE_URL_BASE}{}", block.id.replace('-', ""));
            let title = if title.trim().is_empty() { "Untitled" } else { title.trim() };
            Fragment::block(link_line(title, &url))
        }
        BlockKind::Unsupported { kind } => {
            warn!(block_id = %block.id, kind = %kind, "Unsupported block type");
            warnings.push(Warning::unsupported(&block.id, kind));
            Fragment::container()
        }
    }
}

/// Prefix every line with a quote marker.
fn quote(text: &str) -> String {
    if text.is_empty() {
        return ">".to_owned();
    }
    text.lines()
        .map(|line| {
            if line.is_empty() {
                ">".to_owned()
            } else {
                format!("> {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn single_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fenced code block. Content is verbatim; the fence grows past any
/// backtick run inside it.
fn code_block(language: &str, content: &str) -> String {
    let fence = "`".repeat(longest_backtick_run(content).max(2) + 1);
    let language = match language.trim() {
        "plain text" => "",
        other => other,
    };
    let language = language.replace(' ', "-");
    format!("{fence}{language}\n{}\n{fence}", content.trim_end_matches('\n'))
}

fn image(media: &Media) -> String {
    if media.url.is_empty() {
        return String::new();
    }
    let alt = plain_text(&media.caption);
    format!("![{}]({})", escape_markdown(single_line(&alt).as_str()), media.url)
}

/// A line consisting of one link; autolinks the URL when there is no label.
fn link_line(label: &str, url: &str) -> String {
    if url.is_empty() {
        return escape_markdown(label).into_owned();
    }
    if label.is_empty() || label == url {
        format!("<{url}>")
    } else {
        format!("[{}]({url})", escape_markdown(label))
    }
}

/// Inline content made safe for a single table cell.
fn table_cell(markdown: &str) -> String {
    single_line(markdown).replace('|', "\\|")
}

/// One table row, padded or truncated to the table's column count. The first
/// row also carries the header separator.
fn table_row(mut cells: Vec<String>, table: TableMode) -> String {
    if table.columns == 0 {
        return String::new();
    }
    cells.resize(table.columns, String::new());
    let row = format_row(&cells);
    if !table.is_first_row() {
        return row;
    }
    let separator = format_row(&vec!["---".to_owned(); table.columns]);
    if table.has_column_header {
        format!("{row}\n{separator}")
    } else {
        let header = format_row(&vec![String::new(); table.columns]);
        format!("{header}\n{separator}\n{row}")
    }
}

fn format_row(cells: &[String]) -> String {
    format!("| {} |", cells.join(" | "))
}
