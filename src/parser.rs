//! Document parsing: block phase, then inline phase.
//!
//! The block parser produces a tree whose leaves hold raw text, together
//! with every link-reference definition found anywhere in the document.
//! The inline phase then rebuilds the tree with the raw text resolved, so
//! a reference may be used before the paragraph that defines it.

pub(crate) mod block_parser;
pub(crate) mod inline_parser;

use log::debug;

use crate::ast::{Block, Document, InlineContent, Span, TableData};
use crate::config::ParserConfig;
use crate::error::ParseError;

use block_parser::BlockParser;
use inline_parser::InlineParser;

pub(crate) fn parse_document(input: &str, config: &ParserConfig) -> Result<Document, ParseError> {
    let (skeleton, refs) = BlockParser::new(input, config).parse()?;
    debug!("block phase complete, {} reference definitions", refs.len());

    let mut inline = InlineParser::new(&refs, config);
    let root = resolve_block(skeleton, &mut inline, config.track_source_locations);

    if config.strict {
        if let Some(first) = inline.into_unresolved().first() {
            return Err(ParseError::Malformed {
                line: first.line,
                reason: format!("unresolved link reference [{}]", first.label),
            });
        }
    }
    Ok(Document::new(root))
}

fn line_of(span: &Option<Span>) -> usize {
    span.map(|s| s.line as usize).unwrap_or(0)
}

fn resolve_content(
    content: InlineContent,
    line: usize,
    inline: &mut InlineParser<'_>,
) -> InlineContent {
    match content {
        InlineContent::Raw(raw) => InlineContent::Resolved(inline.parse(&raw, line)),
        resolved => resolved,
    }
}

/// Rebuild a block with raw leaf text resolved into inline nodes, dropping
/// spans unless they were asked for.
fn resolve_block(block: Block, inline: &mut InlineParser<'_>, keep_spans: bool) -> Block {
    let keep = |span: Option<Span>| if keep_spans { span } else { None };
    let resolve_children = |children: Vec<Block>, inline: &mut InlineParser<'_>| {
        children
            .into_iter()
            .map(|child| resolve_block(child, inline, keep_spans))
            .collect()
    };

    match block {
        Block::Document { children, span } => Block::Document {
            children: resolve_children(children, inline),
            span: keep(span),
        },
        Block::Paragraph { content, span } => Block::Paragraph {
            content: resolve_content(content, line_of(&span), inline),
            span: keep(span),
        },
        Block::Heading {
            level,
            setext,
            content,
            span,
        } => Block::Heading {
            level,
            setext,
            content: resolve_content(content, line_of(&span), inline),
            span: keep(span),
        },
        Block::BlockQuote { children, span } => Block::BlockQuote {
            children: resolve_children(children, inline),
            span: keep(span),
        },
        Block::List {
            kind,
            start,
            tight,
            children,
            span,
        } => Block::List {
            kind,
            start,
            tight,
            children: resolve_children(children, inline),
            span: keep(span),
        },
        Block::ListItem {
            checked,
            children,
            span,
        } => Block::ListItem {
            checked,
            children: resolve_children(children, inline),
            span: keep(span),
        },
        Block::Table { data, span } => {
            let line = line_of(&span);
            let TableData {
                alignments,
                header,
                rows,
            } = *data;
            let data = TableData {
                alignments,
                header: header
                    .into_iter()
                    .map(|cell| resolve_content(cell, line, inline))
                    .collect(),
                rows: rows
                    .into_iter()
                    .map(|row| {
                        row.into_iter()
                            .map(|cell| resolve_content(cell, line, inline))
                            .collect()
                    })
                    .collect(),
            };
            Block::Table {
                data: Box::new(data),
                span: keep(span),
            }
        }
        Block::CodeBlock {
            language,
            literal,
            fenced,
            span,
        } => Block::CodeBlock {
            language,
            literal,
            fenced,
            span: keep(span),
        },
        Block::HtmlBlock { literal, span } => Block::HtmlBlock {
            literal,
            span: keep(span),
        },
        Block::ThematicBreak { span } => Block::ThematicBreak { span: keep(span) },
    }
}
