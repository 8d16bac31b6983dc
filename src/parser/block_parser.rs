//! Block-structure parsing.
//!
//! The parser consumes the token stream line by line and maintains an
//! explicit stack of open blocks, document at the bottom. Each line is
//! processed in three phases, following the CommonMark parsing strategy:
//!
//! 1. match the line against every open container from the outside in,
//!    consuming block-quote markers and list-item indentation;
//! 2. let the innermost open leaf consume the line (code content, HTML
//!    content, table row, paragraph continuation — including lazy
//!    continuation when an outer container failed to match);
//! 3. close whatever did not match, then try the block-opening rules on the
//!    remainder in precedence order.
//!
//! Quote, heading, fence, and list rules dispatch on the tokenizer's
//! line-start marker chain; HTML blocks and thematic breaks, which have no
//! marker token, are detected from the text. Pipe tables are the one
//! two-line ambiguity: a line holding `|` is a table header only if the
//! following line is a matching delimiter row, so the parser peeks one
//! line ahead under a stream checkpoint and restores it when the lookahead
//! fails.
//!
//! Inline content is not touched here: leaf blocks keep their raw text and
//! are resolved in a second phase once every link-reference definition is
//! known.
//!
//! Three protection mechanisms bound the work done for adversarial input:
//! a container-depth ceiling checked on every open, a monotonic
//! stream-advancement check per line, and an optional wall-clock deadline
//! checked at the top of the line loop.

mod html_blocks;
mod leaves;
pub(crate) mod reference_definitions;
mod tables;

use std::time::Instant;

use log::{debug, trace};

use crate::ast::{Block, InlineContent, ListKind, Span, TableAlignment, TableData};
use crate::config::ParserConfig;
use crate::error::ParseError;
use crate::tokenizer::{LineMarker, LineTokens, TaskMarker, TokenKind, TokenStream};

use html_blocks::{HtmlBlockEnd, block_end_matched, detect_html_block};
use leaves::{
    ListMarkerInfo, can_interrupt_paragraph, is_closing_fence, is_thematic_break,
    parse_atx_heading, parse_fence_start, parse_list_marker, parse_setext_underline,
};
use reference_definitions::{ReferenceRegistry, parse_reference_definition};
use tables::{parse_table_row, parse_table_separator, split_cells};

/// Cursor over one line, tracking both byte position and column with
/// tab stops of four. A tab consumed halfway leaves `partial` phantom
/// spaces in front of the remaining text.
struct Cursor<'a> {
    raw: &'a str,
    byte: usize,
    col: usize,
    partial: usize,
    line_no: u32,
    offset: usize,
    task: Option<TaskMarker>,
    markers: Vec<LineMarker>,
    next_marker: usize,
}

impl<'a> Cursor<'a> {
    fn new(line: LineTokens<'a>) -> Self {
        Cursor {
            raw: line.raw,
            byte: 0,
            col: 0,
            partial: 0,
            line_no: line.line,
            offset: line.offset,
            task: line.task_marker,
            markers: line.markers,
            next_marker: 0,
        }
    }

    /// The marker token the tokenizer classified at the cursor's next
    /// non-space position, if any. The cursor only moves forward, so
    /// markers behind it are skipped once and never revisited.
    fn marker_at_nonspace(&mut self) -> Option<TokenKind> {
        let (_, byte) = self.nonspace();
        while self.next_marker < self.markers.len() && self.markers[self.next_marker].offset < byte
        {
            self.next_marker += 1;
        }
        self.markers
            .get(self.next_marker)
            .filter(|marker| marker.offset == byte)
            .map(|marker| marker.kind)
    }

    fn rest(&self) -> &'a str {
        &self.raw[self.byte..]
    }

    /// Column and byte index of the next non-space position.
    fn nonspace(&self) -> (usize, usize) {
        let mut col = self.col + self.partial;
        let bytes = self.raw.as_bytes();
        let mut i = self.byte;
        while i < bytes.len() {
            match bytes[i] {
                b' ' => col += 1,
                b'\t' => col += 4 - col % 4,
                _ => break,
            }
            i += 1;
        }
        (col, i)
    }

    fn indent(&self) -> usize {
        self.nonspace().0 - self.col
    }

    fn is_rest_blank(&self) -> bool {
        self.nonspace().1 >= self.raw.len()
    }

    fn advance_to_nonspace(&mut self) {
        let (col, byte) = self.nonspace();
        self.col = col;
        self.byte = byte;
        self.partial = 0;
    }

    /// Consume `n` columns of leading whitespace, splitting a tab if needed.
    fn advance_columns(&mut self, mut n: usize) {
        while n > 0 {
            if self.partial > 0 {
                let take = self.partial.min(n);
                self.partial -= take;
                self.col += take;
                n -= take;
                continue;
            }
            match self.raw.as_bytes().get(self.byte) {
                Some(b' ') => {
                    self.byte += 1;
                    self.col += 1;
                    n -= 1;
                }
                Some(b'\t') => {
                    let width = 4 - self.col % 4;
                    self.byte += 1;
                    if width > n {
                        self.partial = width - n;
                        self.col += n;
                        n = 0;
                    } else {
                        self.col += width;
                        n -= width;
                    }
                }
                _ => break,
            }
        }
    }

    /// Consume marker bytes (ASCII, no tabs).
    fn advance_bytes(&mut self, n: usize) {
        self.byte += n;
        self.col += n;
    }

    /// One space or tab column following a block-quote marker.
    fn consume_marker_padding(&mut self) {
        match self.raw.as_bytes().get(self.byte) {
            Some(b' ') => self.advance_bytes(1),
            Some(b'\t') => self.advance_columns(1),
            _ => {}
        }
    }

    /// Remaining text with any phantom spaces from a split tab restored.
    fn content_string(&self) -> String {
        if self.partial == 0 {
            self.rest().to_string()
        } else {
            let mut s = " ".repeat(self.partial);
            s.push_str(self.rest());
            s
        }
    }

    fn span(&self) -> Span {
        Span {
            line: self.line_no,
            column: self.col as u32 + 1,
            offset: self.offset + self.byte,
        }
    }
}

#[derive(Debug)]
enum OpenKind {
    Document,
    BlockQuote,
    ListItem {
        /// Absolute column where item content starts.
        content_col: usize,
        kind: ListKind,
        start: u32,
        checked: Option<bool>,
        started_blank: bool,
        opened_line: u32,
        blank_pending: bool,
        internal_blank: bool,
    },
    Paragraph,
    FencedCode {
        fence_char: u8,
        fence_len: usize,
        fence_indent: usize,
        info: String,
        terminated: bool,
    },
    IndentedCode,
    HtmlBlock {
        end: HtmlBlockEnd,
    },
    Table {
        alignments: Vec<TableAlignment>,
        header: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}

struct OpenBlock {
    kind: OpenKind,
    content: String,
    children: Vec<Block>,
    span: Span,
    /// Bookkeeping for a list being assembled in `children`: did the most
    /// recently merged item end with a blank line?
    last_item_ended_blank: bool,
}

impl OpenBlock {
    fn new(kind: OpenKind, span: Span) -> Self {
        OpenBlock {
            kind,
            content: String::new(),
            children: Vec::new(),
            span,
            last_item_ended_blank: false,
        }
    }
}

pub(crate) struct BlockParser<'a> {
    stream: TokenStream<'a>,
    open: Vec<OpenBlock>,
    refs: ReferenceRegistry,
    config: &'a ParserConfig,
    container_depth: usize,
    started_at: Instant,
    strict_violation: Option<ParseError>,
}

impl<'a> BlockParser<'a> {
    pub fn new(source: &'a str, config: &'a ParserConfig) -> Self {
        let root = OpenBlock::new(
            OpenKind::Document,
            Span {
                line: 1,
                column: 1,
                offset: 0,
            },
        );
        BlockParser {
            stream: TokenStream::new(source),
            open: vec![root],
            refs: ReferenceRegistry::default(),
            config,
            container_depth: 0,
            started_at: Instant::now(),
            strict_violation: None,
        }
    }

    /// Build the block skeleton. Leaf blocks come back with raw text, to be
    /// resolved once the returned reference registry is complete.
    pub fn parse(mut self) -> Result<(Block, ReferenceRegistry), ParseError> {
        let budget = self.config.time_budget();
        loop {
            if let Some(budget) = budget {
                let elapsed = self.started_at.elapsed();
                if elapsed > budget {
                    return Err(ParseError::Timeout {
                        elapsed_ms: elapsed.as_millis() as u64,
                        line: self.stream.peek(0).line as usize,
                    });
                }
            }
            let before = self.stream.position();
            let Some(line) = self.stream.next_line() else {
                break;
            };
            let line_no = line.line;
            self.process_line(line)?;
            if self.stream.position() <= before {
                return Err(ParseError::Stalled {
                    line: line_no as usize,
                });
            }
        }

        while self.open.len() > 1 {
            self.close_tip()?;
        }
        if let Some(err) = self.strict_violation.take() {
            return Err(err);
        }

        let mut root = match self.open.pop() {
            Some(root) => root,
            None => return Err(ParseError::Stalled { line: 0 }),
        };
        let span = Some(root.span);
        let children = std::mem::take(&mut root.children);
        Ok((Block::Document { children, span }, self.refs))
    }

    fn process_line(&mut self, line: LineTokens<'a>) -> Result<(), ParseError> {
        let mut cur = Cursor::new(line);
        trace!("line {}: {:?}", cur.line_no, cur.raw);

        let matched = self.match_continuations(&mut cur);
        let line_blank = cur.is_rest_blank();

        let consumed = self.continue_leaf(&mut cur, matched)?;
        if !consumed {
            while self.open.len() > matched {
                self.close_tip()?;
            }
            if !cur.is_rest_blank() {
                self.open_new_blocks(&mut cur)?;
            }
        }

        self.note_blank(line_blank);
        Ok(())
    }

    /// Phase 1: consume the prefixes of open containers that the line
    /// continues. Returns the index of the first frame left unmatched
    /// (`open.len()` when everything matched).
    fn match_continuations(&self, cur: &mut Cursor<'_>) -> usize {
        let mut matched = 1;
        while matched < self.open.len() {
            match self.open[matched].kind {
                OpenKind::BlockQuote => {
                    if !cur.is_rest_blank()
                        && cur.indent() <= 3
                        && cur.marker_at_nonspace() == Some(TokenKind::QuoteMarker)
                    {
                        cur.advance_to_nonspace();
                        cur.advance_bytes(1);
                        cur.consume_marker_padding();
                        matched += 1;
                    } else {
                        break;
                    }
                }
                OpenKind::ListItem {
                    content_col,
                    started_blank,
                    opened_line,
                    ..
                } => {
                    if cur.is_rest_blank() {
                        // An item that began with a bare marker holds at
                        // most one blank line before content.
                        if started_blank && cur.line_no == opened_line + 1 {
                            break;
                        }
                        matched += 1;
                    } else if cur.nonspace().0 >= content_col {
                        cur.advance_columns(content_col - cur.col);
                        matched += 1;
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        matched
    }

    /// Phase 2: offer the line to the innermost open leaf. Returns `true`
    /// when the line was fully consumed.
    fn continue_leaf(&mut self, cur: &mut Cursor<'_>, matched: usize) -> Result<bool, ParseError> {
        let leaf_idx = self.open.len() - 1;
        let containers_matched = matched == leaf_idx;

        match &self.open[leaf_idx].kind {
            OpenKind::FencedCode {
                fence_char,
                fence_len,
                fence_indent,
                ..
            } if containers_matched => {
                let (fence_char, fence_len, fence_indent) = (*fence_char, *fence_len, *fence_indent);
                if !cur.is_rest_blank() && cur.indent() <= 3 {
                    let (_, ns) = cur.nonspace();
                    if is_closing_fence(&cur.raw[ns..], fence_char, fence_len) {
                        if let OpenKind::FencedCode { terminated, .. } =
                            &mut self.open[leaf_idx].kind
                        {
                            *terminated = true;
                        }
                        self.close_tip()?;
                        return Ok(true);
                    }
                }
                let strip = cur.indent().min(fence_indent);
                cur.advance_columns(strip);
                let text = cur.content_string();
                let tip = &mut self.open[leaf_idx];
                tip.content.push_str(&text);
                tip.content.push('\n');
                Ok(true)
            }

            OpenKind::IndentedCode if containers_matched => {
                if cur.is_rest_blank() {
                    cur.advance_columns(cur.indent().min(4));
                    let text = cur.content_string();
                    let tip = &mut self.open[leaf_idx];
                    tip.content.push_str(text.trim_end());
                    tip.content.push('\n');
                    return Ok(true);
                }
                if cur.indent() >= 4 {
                    cur.advance_columns(4);
                    let text = cur.content_string();
                    let tip = &mut self.open[leaf_idx];
                    tip.content.push_str(&text);
                    tip.content.push('\n');
                    return Ok(true);
                }
                self.close_tip()?;
                Ok(false)
            }

            OpenKind::HtmlBlock { end } if containers_matched => {
                let end = *end;
                if cur.is_rest_blank() {
                    if end == HtmlBlockEnd::BlankLine {
                        self.close_tip()?;
                        return Ok(false);
                    }
                    self.open[leaf_idx].content.push('\n');
                    return Ok(true);
                }
                let text = cur.content_string();
                let tip = &mut self.open[leaf_idx];
                tip.content.push_str(&text);
                tip.content.push('\n');
                if block_end_matched(end, &text) {
                    self.close_tip()?;
                }
                Ok(true)
            }

            OpenKind::Table { alignments, .. } if containers_matched => {
                let num_cols = alignments.len();
                if cur.is_rest_blank() {
                    self.close_tip()?;
                    return Ok(false);
                }
                let indented = cur.indent() >= 4;
                let marker = cur.marker_at_nonspace();
                cur.advance_to_nonspace();
                let rest = cur.rest();
                if !indented && self.starts_new_block(marker, rest) {
                    self.close_tip()?;
                    return Ok(false);
                }
                let row = parse_table_row(rest, num_cols);
                if let OpenKind::Table { rows, .. } = &mut self.open[leaf_idx].kind {
                    rows.push(row);
                }
                Ok(true)
            }

            OpenKind::Paragraph if containers_matched => self.continue_paragraph(cur, leaf_idx),

            OpenKind::Paragraph => {
                // Lazy continuation: the containers did not all match, but
                // the line does not open anything new either.
                if cur.is_rest_blank() {
                    return Ok(false);
                }
                let marker = cur.marker_at_nonspace();
                let (ns_col, ns_byte) = cur.nonspace();
                let rest = &cur.raw[ns_byte..];
                let lazy = ns_col - cur.col >= 4 || !self.starts_new_block(marker, rest);
                if lazy {
                    trace!("lazy continuation at line {}", cur.line_no);
                    cur.advance_to_nonspace();
                    // Trailing spaces stay: they may encode a hard break.
                    let text = cur.rest().to_string();
                    let tip = &mut self.open[leaf_idx];
                    tip.content.push('\n');
                    tip.content.push_str(&text);
                    return Ok(true);
                }
                Ok(false)
            }

            _ => Ok(false),
        }
    }

    fn continue_paragraph(
        &mut self,
        cur: &mut Cursor<'_>,
        leaf_idx: usize,
    ) -> Result<bool, ParseError> {
        if cur.is_rest_blank() {
            self.close_tip()?;
            return Ok(false);
        }

        if cur.indent() <= 3 {
            let marker = cur.marker_at_nonspace();
            let (_, ns) = cur.nonspace();
            let rest = &cur.raw[ns..];

            if let Some(level) = parse_setext_underline(rest) {
                let content = std::mem::take(&mut self.open[leaf_idx].content);
                let remainder = self.peel_reference_definitions(&content);
                if remainder.trim().is_empty() {
                    // Nothing left to head: drop the empty paragraph and let
                    // the underline line open whatever it opens.
                    self.open.pop();
                    cur.advance_to_nonspace();
                    self.open_new_blocks(cur)?;
                    return Ok(true);
                }
                debug!("setext heading (level {level}) at line {}", cur.line_no);
                let frame = match self.open.pop() {
                    Some(frame) => frame,
                    None => return Ok(true),
                };
                let span = Some(frame.span);
                self.push_leaf(Block::Heading {
                    level,
                    setext: true,
                    content: InlineContent::Raw(remainder.trim().to_string()),
                    span,
                });
                return Ok(true);
            }

            if self.starts_new_block(marker, rest) {
                self.close_tip()?;
                return Ok(false);
            }
        }

        cur.advance_to_nonspace();
        let text = cur.rest().to_string();
        let tip = &mut self.open[leaf_idx];
        tip.content.push('\n');
        tip.content.push_str(&text);
        Ok(true)
    }

    /// Would a line whose text at the next non-space position is `rest`,
    /// classified as `marker` by the tokenizer, open a block that is
    /// allowed to interrupt a paragraph?
    fn starts_new_block(&self, marker: Option<TokenKind>, rest: &str) -> bool {
        match marker {
            Some(TokenKind::QuoteMarker) | Some(TokenKind::HeadingMarker) => return true,
            Some(TokenKind::FenceMarker) if parse_fence_start(rest).is_some() => return true,
            Some(TokenKind::ListMarker) => {
                if let Some(info) = parse_list_marker(rest) {
                    if can_interrupt_paragraph(&info) {
                        return true;
                    }
                    // A marker of the same kind continues an open list even
                    // when it could not interrupt a paragraph on its own.
                    let continues_open_list = self.open.iter().any(|frame| {
                        matches!(&frame.kind, OpenKind::ListItem { kind, .. } if *kind == info.kind)
                    });
                    if continues_open_list {
                        return true;
                    }
                }
            }
            _ => {}
        }
        is_thematic_break(rest) || detect_html_block(rest, true).is_some()
    }

    /// Phase 3: open new blocks at the cursor, in precedence order.
    fn open_new_blocks(&mut self, cur: &mut Cursor<'_>) -> Result<(), ParseError> {
        loop {
            if cur.is_rest_blank() {
                return Ok(());
            }
            let indent = cur.indent();

            if indent >= 4 {
                cur.advance_columns(4);
                let mut frame = OpenBlock::new(OpenKind::IndentedCode, cur.span());
                frame.content.push_str(&cur.content_string());
                frame.content.push('\n');
                debug!("open indented code at line {}", cur.line_no);
                self.open.push(frame);
                return Ok(());
            }

            let marker = cur.marker_at_nonspace();
            cur.advance_to_nonspace();
            let rest = cur.rest();

            if marker == Some(TokenKind::FenceMarker) {
                if let Some((fence_char, fence_len, info)) = parse_fence_start(rest) {
                    debug!("open fenced code at line {}", cur.line_no);
                    self.open.push(OpenBlock::new(
                        OpenKind::FencedCode {
                            fence_char,
                            fence_len,
                            fence_indent: indent,
                            info: info.to_string(),
                            terminated: false,
                        },
                        cur.span(),
                    ));
                    return Ok(());
                }
            }

            if marker == Some(TokenKind::HeadingMarker) {
                if let Some((level, text)) = parse_atx_heading(rest) {
                    debug!("ATX heading (level {level}) at line {}", cur.line_no);
                    let span = Some(cur.span());
                    self.push_leaf(Block::Heading {
                        level,
                        setext: false,
                        content: InlineContent::Raw(text.to_string()),
                        span,
                    });
                    return Ok(());
                }
            }

            if let Some(end) = detect_html_block(rest, false) {
                debug!("open HTML block at line {}", cur.line_no);
                let mut frame = OpenBlock::new(OpenKind::HtmlBlock { end }, cur.span());
                frame.content.push_str(rest);
                frame.content.push('\n');
                let ends_immediately = block_end_matched(end, rest);
                self.open.push(frame);
                if ends_immediately {
                    self.close_tip()?;
                }
                return Ok(());
            }

            if is_thematic_break(rest) {
                debug!("thematic break at line {}", cur.line_no);
                let span = Some(cur.span());
                self.push_leaf(Block::ThematicBreak { span });
                return Ok(());
            }

            if marker == Some(TokenKind::QuoteMarker) {
                self.check_depth(cur)?;
                debug!("open block quote at line {}", cur.line_no);
                self.open
                    .push(OpenBlock::new(OpenKind::BlockQuote, cur.span()));
                self.container_depth += 1;
                cur.advance_bytes(1);
                cur.consume_marker_padding();
                continue;
            }

            if marker == Some(TokenKind::ListMarker) {
                if let Some(info) = parse_list_marker(rest) {
                    self.check_depth(cur)?;
                    self.open_list_item(cur, info);
                    continue;
                }
            }

            if self.config.tables_enabled() && rest.contains('|') {
                if let Some((alignments, header)) = self.try_open_table(rest, cur.line_no) {
                    self.open.push(OpenBlock::new(
                        OpenKind::Table {
                            alignments,
                            header,
                            rows: Vec::new(),
                        },
                        cur.span(),
                    ));
                    return Ok(());
                }
            }

            let mut frame = OpenBlock::new(OpenKind::Paragraph, cur.span());
            frame.content.push_str(rest);
            self.open.push(frame);
            return Ok(());
        }
    }

    /// Whether `header_line` opens a pipe table: peek at the next source
    /// line and keep it consumed when it is a delimiter row matching the
    /// header's column count under the same open containers, restoring the
    /// stream otherwise.
    fn try_open_table(
        &mut self,
        header_line: &str,
        line_no: u32,
    ) -> Option<(Vec<TableAlignment>, Vec<String>)> {
        let header = split_cells(header_line);
        let checkpoint = self.stream.save();
        let line = self.stream.next_line()?;
        let mut cur = Cursor::new(line);
        let matched = self.match_continuations(&mut cur);
        if matched == self.open.len() && !cur.is_rest_blank() && cur.indent() <= 3 {
            cur.advance_to_nonspace();
            if let Some(alignments) = parse_table_separator(cur.rest()) {
                if alignments.len() == header.len() {
                    debug!("open table ({} columns) at line {line_no}", alignments.len());
                    return Some((alignments, header));
                }
            }
        }
        self.stream.restore(checkpoint);
        None
    }

    fn open_list_item(&mut self, cur: &mut Cursor<'_>, marker: ListMarkerInfo) {
        let marker_col = cur.col;
        let span = cur.span();
        cur.advance_bytes(marker.marker_len);

        let spaces_after = if cur.is_rest_blank() {
            1
        } else {
            let width = cur.indent();
            if width >= 5 {
                // Five or more spaces put the content in an indented code
                // block; the item itself gets one column of padding.
                cur.advance_columns(1);
                1
            } else {
                cur.advance_columns(width);
                width
            }
        };
        let content_col = marker_col + marker.marker_len + spaces_after;

        let mut checked = None;
        if self.config.task_lists_enabled() {
            if let Some(task) = cur.task {
                if task.offset == cur.byte {
                    checked = Some(task.checked);
                    cur.advance_bytes(3);
                    cur.consume_marker_padding();
                }
            }
        }

        debug!(
            "open list item ({:?}, content col {content_col}) at line {}",
            marker.kind, cur.line_no
        );
        self.open.push(OpenBlock::new(
            OpenKind::ListItem {
                content_col,
                kind: marker.kind,
                start: marker.start,
                checked,
                started_blank: marker.is_empty_item,
                opened_line: cur.line_no,
                blank_pending: false,
                internal_blank: false,
            },
            span,
        ));
        self.container_depth += 1;
    }

    fn check_depth(&self, cur: &Cursor<'_>) -> Result<(), ParseError> {
        if self.container_depth + 1 > self.config.max_nesting_depth {
            return Err(ParseError::NestingTooDeep {
                depth: self.container_depth + 1,
                limit: self.config.max_nesting_depth,
                line: cur.line_no as usize,
            });
        }
        Ok(())
    }

    /// Blank-line bookkeeping for list tightness, applied to the containers
    /// still open once the line has been fully handled.
    fn note_blank(&mut self, line_blank: bool) {
        for frame in &mut self.open {
            if let OpenKind::ListItem {
                blank_pending,
                internal_blank,
                ..
            } = &mut frame.kind
            {
                if line_blank {
                    *blank_pending = true;
                } else if *blank_pending {
                    *internal_blank = true;
                    *blank_pending = false;
                }
            }
        }
    }

    fn push_leaf(&mut self, block: Block) {
        if let Some(tip) = self.open.last_mut() {
            tip.last_item_ended_blank = false;
            tip.children.push(block);
        }
    }

    fn peel_reference_definitions(&mut self, text: &str) -> String {
        let mut rest = text;
        while rest.starts_with('[') {
            match parse_reference_definition(rest) {
                Some((label, destination, title, used)) => {
                    debug!("reference definition [{label}]");
                    self.refs.insert(&label, destination, title);
                    rest = &rest[used..];
                }
                None => break,
            }
        }
        rest.to_string()
    }

    /// Finalize the innermost open block and attach it to its parent.
    fn close_tip(&mut self) -> Result<(), ParseError> {
        let Some(frame) = self.open.pop() else {
            return Ok(());
        };
        let span = Some(frame.span);
        let start_line = frame.span.line as usize;

        match frame.kind {
            OpenKind::Document => {
                // The root is closed in parse() itself.
                self.open.push(frame);
                Ok(())
            }

            OpenKind::Paragraph => {
                let remainder = self.peel_reference_definitions(&frame.content);
                let text = remainder.trim();
                if !text.is_empty() {
                    self.push_leaf(Block::Paragraph {
                        content: InlineContent::Raw(text.to_string()),
                        span,
                    });
                }
                Ok(())
            }

            OpenKind::BlockQuote => {
                self.container_depth -= 1;
                self.push_leaf(Block::BlockQuote {
                    children: frame.children,
                    span,
                });
                Ok(())
            }

            OpenKind::FencedCode {
                info, terminated, ..
            } => {
                if !terminated && self.config.strict && self.strict_violation.is_none() {
                    self.strict_violation = Some(ParseError::Malformed {
                        line: start_line,
                        reason: "unterminated fenced code block".to_string(),
                    });
                }
                let language = info
                    .split_whitespace()
                    .next()
                    .filter(|lang| !lang.is_empty())
                    .map(|lang| {
                        crate::parser::inline_parser::entities::resolve_entities_and_escapes(lang)
                    });
                self.push_leaf(Block::CodeBlock {
                    language,
                    literal: frame.content,
                    fenced: true,
                    span,
                });
                Ok(())
            }

            OpenKind::IndentedCode => {
                self.push_leaf(Block::CodeBlock {
                    language: None,
                    literal: trim_trailing_blank_lines(frame.content),
                    fenced: false,
                    span,
                });
                Ok(())
            }

            OpenKind::HtmlBlock { .. } => {
                self.push_leaf(Block::HtmlBlock {
                    literal: frame.content.trim_end_matches('\n').to_string(),
                    span,
                });
                Ok(())
            }

            OpenKind::Table {
                alignments,
                header,
                rows,
            } => {
                let data = TableData {
                    alignments,
                    header: header.into_iter().map(InlineContent::Raw).collect(),
                    rows: rows
                        .into_iter()
                        .map(|row| row.into_iter().map(InlineContent::Raw).collect())
                        .collect(),
                };
                self.push_leaf(Block::Table {
                    data: Box::new(data),
                    span,
                });
                Ok(())
            }

            OpenKind::ListItem {
                kind,
                start,
                checked,
                blank_pending,
                internal_blank,
                ..
            } => {
                self.container_depth -= 1;
                let item = Block::ListItem {
                    checked,
                    children: frame.children,
                    span,
                };
                let Some(parent) = self.open.last_mut() else {
                    return Ok(());
                };
                match parent.children.last_mut() {
                    Some(Block::List {
                        kind: list_kind,
                        tight,
                        children,
                        ..
                    }) if *list_kind == kind => {
                        if parent.last_item_ended_blank || internal_blank {
                            *tight = false;
                        }
                        children.push(item);
                    }
                    _ => {
                        parent.children.push(Block::List {
                            kind,
                            start,
                            tight: !internal_blank,
                            children: vec![item],
                            span,
                        });
                    }
                }
                parent.last_item_ended_blank = blank_pending;
                Ok(())
            }
        }
    }
}

/// Drop whitespace-only trailing lines, keeping the newline after the last
/// line with content.
fn trim_trailing_blank_lines(mut s: String) -> String {
    let end = s
        .rfind(|c: char| c != ' ' && c != '\t' && c != '\n')
        .map(|p| match s[p..].find('\n') {
            Some(off) => p + off + 1,
            None => s.len(),
        })
        .unwrap_or(0);
    s.truncate(end);
    s
}
