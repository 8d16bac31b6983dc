//! The abstract syntax tree produced by parsing.
//!
//! The node model is a closed pair of enums: [`Block`] for block-level
//! structure and [`Inline`] for resolved inline content. Inline nodes can
//! never contain block nodes, and every consumer matches exhaustively, so
//! adding a kind is a compile-enforced change everywhere.
//!
//! Nodes are built once per parse and never mutated. Leaf blocks start out
//! holding [`InlineContent::Raw`] text after block parsing; the inline
//! resolution phase replaces each node with a new one carrying
//! [`InlineContent::Resolved`] children.

/// Source position of a block node (1-based line and column).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: u32,
    pub column: u32,
    pub offset: usize,
}

/// Literal text of a leaf block before inline resolution, or its resolved
/// inline children afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineContent {
    Raw(String),
    Resolved(Vec<Inline>),
}

impl InlineContent {
    pub fn raw(&self) -> Option<&str> {
        match self {
            InlineContent::Raw(text) => Some(text),
            InlineContent::Resolved(_) => None,
        }
    }

    /// Resolved children; empty for still-raw content.
    pub fn inlines(&self) -> &[Inline] {
        match self {
            InlineContent::Raw(_) => &[],
            InlineContent::Resolved(children) => children,
        }
    }
}

/// List flavor, carrying the marker byte (`-`, `*`, `+` for bullets, the
/// `.` or `)` delimiter for ordered lists).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Bullet(u8),
    Ordered(u8),
}

impl ListKind {
    pub fn is_ordered(&self) -> bool {
        matches!(self, ListKind::Ordered(_))
    }
}

/// Column alignment of a table, fixed by the delimiter row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableAlignment {
    #[default]
    None,
    Left,
    Center,
    Right,
}

/// A GFM pipe table. Row widths always equal `alignments.len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableData {
    pub alignments: Vec<TableAlignment>,
    pub header: Vec<InlineContent>,
    pub rows: Vec<Vec<InlineContent>>,
}

/// A block-level node. `Document` is the unique root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Document {
        children: Vec<Block>,
        span: Option<Span>,
    },
    Paragraph {
        content: InlineContent,
        span: Option<Span>,
    },
    Heading {
        /// Always in `1..=6`.
        level: u8,
        /// `true` for setext headings, `false` for ATX.
        setext: bool,
        content: InlineContent,
        span: Option<Span>,
    },
    BlockQuote {
        children: Vec<Block>,
        span: Option<Span>,
    },
    List {
        kind: ListKind,
        start: u32,
        /// Computed once all items are known, never re-derived.
        tight: bool,
        children: Vec<Block>,
        span: Option<Span>,
    },
    ListItem {
        /// `Some(_)` makes this a task-list item.
        checked: Option<bool>,
        children: Vec<Block>,
        span: Option<Span>,
    },
    CodeBlock {
        language: Option<String>,
        /// Stored opaquely, never inline-parsed.
        literal: String,
        fenced: bool,
        span: Option<Span>,
    },
    HtmlBlock {
        literal: String,
        span: Option<Span>,
    },
    ThematicBreak {
        span: Option<Span>,
    },
    Table {
        data: Box<TableData>,
        span: Option<Span>,
    },
}

impl Block {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Block::Document { .. } => "document",
            Block::Paragraph { .. } => "paragraph",
            Block::Heading { .. } => "heading",
            Block::BlockQuote { .. } => "block-quote",
            Block::List { .. } => "list",
            Block::ListItem { .. } => "list-item",
            Block::CodeBlock { .. } => "code-block",
            Block::HtmlBlock { .. } => "html-block",
            Block::ThematicBreak { .. } => "thematic-break",
            Block::Table { .. } => "table",
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Block::Document { span, .. }
            | Block::Paragraph { span, .. }
            | Block::Heading { span, .. }
            | Block::BlockQuote { span, .. }
            | Block::List { span, .. }
            | Block::ListItem { span, .. }
            | Block::CodeBlock { span, .. }
            | Block::HtmlBlock { span, .. }
            | Block::ThematicBreak { span }
            | Block::Table { span, .. } => *span,
        }
    }

    /// Child blocks of container nodes; empty for leaves.
    pub fn children(&self) -> &[Block] {
        match self {
            Block::Document { children, .. }
            | Block::BlockQuote { children, .. }
            | Block::List { children, .. }
            | Block::ListItem { children, .. } => children,
            _ => &[],
        }
    }
}

/// An inline node inside a resolved leaf block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    CodeSpan(String),
    /// Raw inline HTML, passed through or escaped at render time.
    Html(String),
    Emphasis(Vec<Inline>),
    Strong(Vec<Inline>),
    Strikethrough(Vec<Inline>),
    Link {
        destination: String,
        title: Option<String>,
        children: Vec<Inline>,
    },
    Image {
        destination: String,
        title: Option<String>,
        children: Vec<Inline>,
    },
    Autolink {
        url: String,
        email: bool,
    },
    HardBreak,
    SoftBreak,
}

impl Inline {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Inline::Text(_) => "text",
            Inline::CodeSpan(_) => "code-span",
            Inline::Html(_) => "html-inline",
            Inline::Emphasis(_) => "emphasis",
            Inline::Strong(_) => "strong",
            Inline::Strikethrough(_) => "strikethrough",
            Inline::Link { .. } => "link",
            Inline::Image { .. } => "image",
            Inline::Autolink { .. } => "autolink",
            Inline::HardBreak => "hard-break",
            Inline::SoftBreak => "soft-break",
        }
    }
}

/// The immutable result of a successful parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Block,
}

impl Document {
    pub(crate) fn new(root: Block) -> Self {
        debug_assert!(matches!(root, Block::Document { .. }));
        Document { root }
    }

    pub fn root(&self) -> &Block {
        &self.root
    }

    pub fn children(&self) -> &[Block] {
        self.root.children()
    }
}
