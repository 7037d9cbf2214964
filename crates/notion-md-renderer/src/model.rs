//! Document model for block trees.
//!
//! Blocks are produced fresh from each fetch response and never mutated
//! afterwards. Each [`BlockKind`] variant carries only the payload its
//! rendering rule consumes; API fields with no Markdown meaning are not
//! modelled at all.

/// One node of the content tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    /// Block identifier as returned by the content API.
    pub id: String,
    /// Whether the API reports children for this block.
    pub has_children: bool,
    /// Type discriminant and payload.
    pub kind: BlockKind,
}

impl Block {
    /// Create a block without children.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: BlockKind) -> Self {
        Self {
            id: id.into(),
            has_children: false,
            kind,
        }
    }

    /// Mark the block as having children.
    #[must_use]
    pub fn with_children(mut self) -> Self {
        self.has_children = true;
        self
    }

    /// Id to list children from, or `None` when children are not traversed.
    ///
    /// Blocks with `has_children == false` are never fetched. Child pages are
    /// separate documents and are only linked. A synced copy reads its
    /// children from the original block it mirrors.
    pub fn children_source(&self) -> Option<&str> {
        if !self.has_children {
            return None;
        }
        match &self.kind {
            BlockKind::ChildPage { .. } => None,
            BlockKind::SyncedBlock {
                synced_from: Some(original),
            } => Some(original.as_str()),
            _ => Some(self.id.as_str()),
        }
    }
}

/// Heading depth. The content API only knows three levels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    /// ATX heading marker for this level.
    pub fn marker(self) -> &'static str {
        match self {
            Self::H1 => "#",
            Self::H2 => "##",
            Self::H3 => "###",
        }
    }
}

/// Linked media payload shared by image, video, file and PDF blocks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Media {
    /// External URL or signed file URL.
    pub url: String,
    /// Caption spans (may be empty).
    pub caption: Vec<RichText>,
    /// Original file name, when the API provides one.
    pub name: Option<String>,
}

/// Block type discriminant with its type-specific payload.
///
/// The set is closed: new API block types arrive as [`BlockKind::Unsupported`]
/// and adding a variant forces every rendering rule to account for it.
#[derive(Clone, Debug, PartialEq)]
pub enum BlockKind {
    Paragraph {
        text: Vec<RichText>,
    },
    Heading {
        level: HeadingLevel,
        text: Vec<RichText>,
    },
    BulletedListItem {
        text: Vec<RichText>,
    },
    NumberedListItem {
        text: Vec<RichText>,
    },
    ToDo {
        text: Vec<RichText>,
        checked: bool,
    },
    Toggle {
        text: Vec<RichText>,
    },
    Quote {
        text: Vec<RichText>,
    },
    Callout {
        text: Vec<RichText>,
        /// Emoji icon; file icons have no inline representation.
        icon: Option<String>,
    },
    Code {
        language: String,
        text: Vec<RichText>,
    },
    Equation {
        expression: String,
    },
    Table {
        has_column_header: bool,
    },
    TableRow {
        cells: Vec<Vec<RichText>>,
    },
    Image(Media),
    Video(Media),
    File(Media),
    Pdf(Media),
    Bookmark {
        url: String,
        caption: Vec<RichText>,
    },
    Embed {
        url: String,
        caption: Vec<RichText>,
    },
    LinkPreview {
        url: String,
    },
    Divider,
    SyncedBlock {
        /// Original block id for a synced copy, `None` for the original.
        synced_from: Option<String>,
    },
    ColumnList,
    Column,
    ChildPage {
        title: String,
    },
    Unsupported {
        /// Discriminant as reported by the API.
        kind: String,
    },
}

impl BlockKind {
    /// API discriminant name.
    pub fn name(&self) -> &str {
        match self {
            Self::Paragraph { .. } => "paragraph",
            Self::Heading {
                level: HeadingLevel::H1,
                ..
            } => "heading_1",
            Self::Heading {
                level: HeadingLevel::H2,
                ..
            } => "heading_2",
            Self::Heading {
                level: HeadingLevel::H3,
                ..
            } => "heading_3",
            Self::BulletedListItem { .. } => "bulleted_list_item",
            Self::NumberedListItem { .. } => "numbered_list_item",
            Self::ToDo { .. } => "to_do",
            Self::Toggle { .. } => "toggle",
            Self::Quote { .. } => "quote",
            Self::Callout { .. } => "callout",
            Self::Code { .. } => "code",
            Self::Equation { .. } => "equation",
            Self::Table { .. } => "table",
            Self::TableRow { .. } => "table_row",
            Self::Image(_) => "image",
            Self::Video(_) => "video",
            Self::File(_) => "file",
            Self::Pdf(_) => "pdf",
            Self::Bookmark { .. } => "bookmark",
            Self::Embed { .. } => "embed",
            Self::LinkPreview { .. } => "link_preview",
            Self::Divider => "divider",
            Self::SyncedBlock { .. } => "synced_block",
            Self::ColumnList => "column_list",
            Self::Column => "column",
            Self::ChildPage { .. } => "child_page",
            Self::Unsupported { kind } => kind,
        }
    }
}

/// Inline annotation set of a rich text span.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Annotations {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    /// No Markdown equivalent; dropped on render.
    pub underline: bool,
    pub code: bool,
    /// Non-default color; dropped on render.
    pub color: Option<String>,
}

/// What a rich text span carries.
#[derive(Clone, Debug, PartialEq)]
pub enum SpanContent {
    /// Literal text.
    Text(String),
    /// Mention of a page, user or date, rendered from its display text.
    Mention(String),
    /// Inline `TeX` expression.
    Equation(String),
    /// Neither text nor a resolvable equivalent.
    Malformed,
}

/// A run of text with a uniform annotation set and optional link.
#[derive(Clone, Debug, PartialEq)]
pub struct RichText {
    pub content: SpanContent,
    pub annotations: Annotations,
    pub href: Option<String>,
}

impl RichText {
    /// Unannotated text span.
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            content: SpanContent::Text(text.into()),
            annotations: Annotations::default(),
            href: None,
        }
    }

    /// Inline equation span.
    #[must_use]
    pub fn equation(expression: impl Into<String>) -> Self {
        Self {
            content: SpanContent::Equation(expression.into()),
            annotations: Annotations::default(),
            href: None,
        }
    }

    #[must_use]
    pub fn bold(mut self) -> Self {
        self.annotations.bold = true;
        self
    }

    #[must_use]
    pub fn italic(mut self) -> Self {
        self.annotations.italic = true;
        self
    }

    #[must_use]
    pub fn strikethrough(mut self) -> Self {
        self.annotations.strikethrough = true;
        self
    }

    #[must_use]
    pub fn code(mut self) -> Self {
        self.annotations.code = true;
        self
    }

    #[must_use]
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.annotations.color = Some(color.into());
        self
    }

    #[must_use]
    pub fn link(mut self, url: impl Into<String>) -> Self {
        self.href = Some(url.into());
        self
    }

    /// Unformatted text of the span (empty for malformed spans).
    pub fn plain_text(&self) -> &str {
        match &self.content {
            SpanContent::Text(text) | SpanContent::Mention(text) | SpanContent::Equation(text) => {
                text
            }
            SpanContent::Malformed => "",
        }
    }
}

/// Concatenate the unformatted text of a span sequence.
pub fn plain_text(spans: &[RichText]) -> String {
    spans.iter().map(RichText::plain_text).collect()
}

/// A block with its children resolved, in API order.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockNode {
    pub block: Block,
    pub children: Vec<BlockNode>,
}

impl BlockNode {
    /// Node without resolved children.
    #[must_use]
    pub fn leaf(block: Block) -> Self {
        Self {
            block,
            children: Vec::new(),
        }
    }
}
