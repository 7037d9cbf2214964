//! Document assembly.
//!
//! Walks a fully fetched block tree in document order, renders each block
//! through the registry and joins the fragments with the separation and
//! indentation rules. Rendering is pure: no I/O happens here.

use crate::context::ConversionContext;
use crate::error::Warning;
use crate::model::{BlockKind, BlockNode};
use crate::registry::{ChildLayout, RunKind, render_block};

/// Rendered block with its subtree.
struct Chunk {
    markdown: String,
    run: Option<RunKind>,
    /// A sibling rendering to nothing came right before this one.
    after_gap: bool,
}

/// Ends a list so the next item of the same kind opens a new one.
const LIST_BREAK: &str = "\n\n<!-- -->\n\n";

/// Sibling list joined into one string, remembering how it starts.
struct Joined {
    markdown: String,
    first_run: Option<RunKind>,
}

/// Assembles Markdown documents from block trees.
#[derive(Debug, Default)]
pub(crate) struct DocumentAssembler {
    warnings: Vec<Warning>,
}

impl DocumentAssembler {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Render top-level nodes into a document.
    ///
    /// A non-empty document ends with exactly one newline; an empty one is
    /// the empty string.
    pub(crate) fn assemble(mut self, nodes: &[BlockNode]) -> (String, Vec<Warning>) {
        let joined = self.render_siblings(nodes, &ConversionContext::new());
        let mut markdown = joined.markdown;
        if !markdown.is_empty() {
            markdown.push('\n');
        }
        (markdown, self.warnings)
    }

    fn render_siblings(&mut self, nodes: &[BlockNode], parent: &ConversionContext) -> Joined {
        let mut ctx = parent.clone();
        let mut chunks: Vec<Chunk> = Vec::with_capacity(nodes.len());
        let mut gap = false;
        for node in nodes {
            ctx = ctx.advance(&node.block);
            match self.render_node(node, &ctx) {
                Some(mut chunk) => {
                    chunk.after_gap = gap;
                    gap = false;
                    chunks.push(chunk);
                }
                None => gap = true,
            }
        }

        let mut markdown = String::new();
        let mut previous: Option<Option<RunKind>> = None;
        for chunk in &chunks {
            match previous {
                None => {}
                Some(Some(run))
                    if chunk.run == Some(run) && chunk.after_gap && run.is_list() =>
                {
                    markdown.push_str(LIST_BREAK);
                }
                Some(Some(run)) if chunk.run == Some(run) => markdown.push('\n'),
                Some(_) => markdown.push_str("\n\n"),
            }
            markdown.push_str(&chunk.markdown);
            previous = Some(chunk.run);
        }

        Joined {
            markdown,
            first_run: chunks.first().and_then(|chunk| chunk.run),
        }
    }

    fn render_node(&mut self, node: &BlockNode, ctx: &ConversionContext) -> Option<Chunk> {
        let fragment = render_block(&node.block, ctx, &mut self.warnings);
        let children = if node.children.is_empty() {
            None
        } else {
            let child_ctx = ctx
                .descend(&node.block)
                .with_widest_row(widest_row(&node.children));
            let joined = self.render_siblings(&node.children, &child_ctx);
            (!joined.markdown.is_empty()).then_some(joined)
        };

        let markdown = match children {
            None => fragment.markdown,
            Some(children) => {
                let body = match fragment.layout {
                    ChildLayout::Nested => indent(&children.markdown, fragment.indent),
                    ChildLayout::Quoted => quote_lines(&children.markdown),
                    ChildLayout::Flat => children.markdown,
                };
                if fragment.markdown.is_empty() {
                    body
                } else {
                    let tight = fragment.run.is_some_and(RunKind::is_list)
                        && children.first_run.is_some_and(RunKind::is_list);
                    let separator = match fragment.layout {
                        _ if tight => "\n",
                        ChildLayout::Quoted => "\n>\n",
                        ChildLayout::Nested | ChildLayout::Flat => "\n\n",
                    };
                    format!("{}{separator}{body}", fragment.markdown)
                }
            }
        };

        (!markdown.is_empty()).then_some(Chunk {
            markdown,
            run: fragment.run,
            after_gap: false,
        })
    }
}

/// Cell count of the widest table row among `nodes`.
fn widest_row(nodes: &[BlockNode]) -> usize {
    nodes
        .iter()
        .filter_map(|node| match &node.block.kind {
            BlockKind::TableRow { cells } => Some(cells.len()),
            _ => None,
        })
        .max()
        .unwrap_or(0)
}

/// Indent every non-empty line by `width` spaces.
fn indent(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.split('\n')
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Continue a blockquote over every line. Nested quotes collapse to `>>`.
fn quote_lines(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            if line.is_empty() {
                ">".to_owned()
            } else if line.starts_with('>') {
                format!(">{line}")
            } else {
                format!("> {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use pulldown_cmark::{Event, Parser, Tag};

    use super::*;
    use crate::error::WarningKind;
    use crate::model::{Block, HeadingLevel, RichText};

    fn text(s: &str) -> Vec<RichText> {
        vec![RichText::plain(s)]
    }

    fn leaf(kind: BlockKind) -> BlockNode {
        BlockNode::leaf(Block::new("b", kind))
    }

    fn with(kind: BlockKind, children: Vec<BlockNode>) -> BlockNode {
        BlockNode {
            block: Block::new("b", kind).with_children(),
            children,
        }
    }

    fn para(s: &str) -> BlockNode {
        leaf(BlockKind::Paragraph { text: text(s) })
    }

    fn bullet(s: &str) -> BlockNode {
        leaf(BlockKind::BulletedListItem { text: text(s) })
    }

    fn numbered(s: &str) -> BlockNode {
        leaf(BlockKind::NumberedListItem { text: text(s) })
    }

    fn render(nodes: &[BlockNode]) -> String {
        DocumentAssembler::new().assemble(nodes).0
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(render(&[]), "");
    }

    #[test]
    fn test_blocks_separated_by_blank_line() {
        let doc = render(&[
            leaf(BlockKind::Heading {
                level: HeadingLevel::H1,
                text: text("Title"),
            }),
            para("Body"),
            leaf(BlockKind::Divider),
        ]);
        assert_eq!(doc, "# Title\n\nBody\n\n---\n");
    }

    #[test]
    fn test_consecutive_list_items_tight() {
        let doc = render(&[bullet("a"), bullet("b"), para("p"), numbered("x"), numbered("y")]);
        assert_eq!(doc, "- a\n- b\n\np\n\n1. x\n2. y\n");
    }

    #[test]
    fn test_different_list_kinds_separated() {
        let doc = render(&[bullet("a"), numbered("x")]);
        assert_eq!(doc, "- a\n\n1. x\n");
    }

    #[test]
    fn test_numbering_restarts_after_interruption() {
        let doc = render(&[numbered("a"), numbered("b"), para("p"), numbered("c")]);
        assert_eq!(doc, "1. a\n2. b\n\np\n\n1. c\n");
    }

    /// Start numbers of the ordered lists in `doc`.
    fn ordered_list_starts(doc: &str) -> Vec<u64> {
        Parser::new(doc)
            .filter_map(|event| match event {
                Event::Start(Tag::List(Some(start))) => Some(start),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_empty_paragraph_between_numbered_items_splits_list() {
        let doc = render(&[numbered("a"), para(""), numbered("b")]);
        assert_eq!(doc, "1. a\n\n<!-- -->\n\n1. b\n");
        assert_eq!(ordered_list_starts(&doc), vec![1, 1]);
    }

    #[test]
    fn test_unsupported_block_between_numbered_items_splits_list() {
        let doc = render(&[
            numbered("a"),
            numbered("b"),
            leaf(BlockKind::Unsupported {
                kind: "breadcrumb".to_owned(),
            }),
            numbered("c"),
        ]);
        assert_eq!(doc, "1. a\n2. b\n\n<!-- -->\n\n1. c\n");
        assert_eq!(ordered_list_starts(&doc), vec![1, 1]);
    }

    #[test]
    fn test_gap_between_paragraphs_keeps_plain_separator() {
        let doc = render(&[para("a"), para(""), para("b"), bullet("x"), bullet("y")]);
        assert_eq!(doc, "a\n\nb\n\n- x\n- y\n");
    }

    #[test]
    fn test_nested_list_indented() {
        let doc = render(&[
            bullet("A"),
            with(
                BlockKind::BulletedListItem { text: text("B") },
                vec![numbered("one"), numbered("two")],
            ),
            bullet("C"),
        ]);
        assert_eq!(doc, "- A\n- B\n  1. one\n  2. two\n- C\n");
    }

    #[test]
    fn test_children_of_numbered_item_align_with_content() {
        let doc = render(&[with(
            BlockKind::NumberedListItem { text: text("step") },
            vec![bullet("detail")],
        )]);
        assert_eq!(doc, "1. step\n   - detail\n");
    }

    #[test]
    fn test_paragraph_under_list_item_separated() {
        let doc = render(&[with(
            BlockKind::BulletedListItem { text: text("item") },
            vec![para("detail")],
        )]);
        assert_eq!(doc, "- item\n\n  detail\n");
    }

    #[test]
    fn test_toggle_children_indented() {
        let doc = render(&[with(
            BlockKind::Toggle {
                text: text("Summary"),
            },
            vec![para("one"), para("two")],
        )]);
        assert_eq!(doc, "Summary\n\n  one\n\n  two\n");
    }

    #[test]
    fn test_quote_children_stay_quoted() {
        let doc = render(&[with(
            BlockKind::Quote { text: text("Quote") },
            vec![para("inside"), bullet("point")],
        )]);
        assert_eq!(doc, "> Quote\n>\n> inside\n>\n> - point\n");
    }

    #[test]
    fn test_nested_quotes() {
        let doc = render(&[with(
            BlockKind::Quote { text: text("outer") },
            vec![leaf(BlockKind::Quote { text: text("inner") })],
        )]);
        assert_eq!(doc, "> outer\n>\n>> inner\n");
    }

    #[test]
    fn test_columns_flattened() {
        let doc = render(&[with(
            BlockKind::ColumnList,
            vec![
                with(BlockKind::Column, vec![para("left")]),
                with(BlockKind::Column, vec![para("right")]),
            ],
        )]);
        assert_eq!(doc, "left\n\nright\n");
    }

    #[test]
    fn test_heading_children_not_indented() {
        let doc = render(&[with(
            BlockKind::Heading {
                level: HeadingLevel::H2,
                text: text("Section"),
            },
            vec![para("content")],
        )]);
        assert_eq!(doc, "## Section\n\ncontent\n");
    }

    #[test]
    fn test_table_rows_tight() {
        let row = |cells: &[&str]| {
            leaf(BlockKind::TableRow {
                cells: cells.iter().map(|c| text(c)).collect(),
            })
        };
        let doc = render(&[
            para("Before"),
            with(
                BlockKind::Table {
                    has_column_header: true,
                },
                vec![row(&["H1", "H2"]), row(&["a", "b"]), row(&["c"])],
            ),
            para("After"),
        ]);
        assert_eq!(
            doc,
            "Before\n\n| H1 | H2 |\n| --- | --- |\n| a | b |\n| c |  |\n\nAfter\n"
        );
    }

    #[test]
    fn test_table_with_empty_first_row_uses_widest_row() {
        let row = |cells: &[&str]| {
            leaf(BlockKind::TableRow {
                cells: cells.iter().map(|c| text(c)).collect(),
            })
        };
        let doc = render(&[with(
            BlockKind::Table {
                has_column_header: true,
            },
            vec![row(&[]), row(&["a", "b"])],
        )]);
        assert_eq!(doc, "|  |  |\n| --- | --- |\n| a | b |\n");
    }

    #[test]
    fn test_empty_paragraphs_skipped() {
        let doc = render(&[para("a"), para(""), para("b")]);
        assert_eq!(doc, "a\n\nb\n");
    }

    #[test]
    fn test_empty_container_skipped() {
        let doc = render(&[para("a"), leaf(BlockKind::ColumnList), para("b")]);
        assert_eq!(doc, "a\n\nb\n");
    }

    #[test]
    fn test_unsupported_block_collected_as_warning() {
        let (doc, warnings) = DocumentAssembler::new().assemble(&[
            para("a"),
            leaf(BlockKind::Unsupported {
                kind: "ai_block".to_owned(),
            }),
            para("b"),
        ]);
        assert_eq!(doc, "a\n\nb\n");
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0].kind,
            WarningKind::UnsupportedBlockType {
                kind: "ai_block".to_owned()
            }
        );
    }

    #[test]
    fn test_code_block_under_list_item_indented() {
        let doc = render(&[with(
            BlockKind::BulletedListItem { text: text("step") },
            vec![leaf(BlockKind::Code {
                language: "sh".to_owned(),
                text: text("echo hi\n\necho bye"),
            })],
        )]);
        assert_eq!(doc, "- step\n\n  ```sh\n  echo hi\n\n  echo bye\n  ```\n");
    }
}
