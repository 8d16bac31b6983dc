//! Single-pass, line-oriented tokenizer.
//!
//! The tokenizer makes one forward pass over the source and classifies each
//! line into tokens: leading whitespace, a chain of line-start markers
//! (ATX hashes, `>`, list markers, fence runs), then generic runs of
//! whitespace, repeated punctuation, and text. Whitespace is kept as
//! distinct tokens because the block grammar depends on exact indentation.
//!
//! Container markers stack: a block quote or list marker is followed by
//! whatever marker its content opens with, so `> - ```rust` yields a quote
//! marker, a list marker, and a fence marker. The block parser dispatches
//! its opening rules on this classification; the tokens after the marker
//! chain exist so that tokens always cover the whole input, and reach the
//! parser as the line's raw text.
//!
//! Tokens are immutable, non-overlapping, and cover the entire input:
//! the byte lengths of all tokens (the end-of-input token is empty) sum to
//! the input length.
//!
//! Task-list checkboxes are a dedicated rule: `[x]`, `[X]`, or `[ ]` becomes
//! a [`TokenKind::TaskListMarker`] only when it sits at a list item's
//! content start (list marker, then one whitespace token no wider than four
//! columns) and is followed by a space or tab. Everything else lexes as
//! ordinary punctuation and text.

use crate::is_ascii_punctuation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Text,
    Whitespace,
    /// `#` run opening an ATX heading.
    HeadingMarker,
    /// A single `>` at the start of a line.
    QuoteMarker,
    /// Bullet (`-`, `*`, `+`) or ordered (`1.`, `1)`) list marker.
    ListMarker,
    /// `[x]`, `[X]`, or `[ ]` at a list item's content start.
    TaskListMarker,
    /// A run of three or more backticks or tildes at the start of a line.
    FenceMarker,
    /// A maximal run of one repeated ASCII punctuation byte.
    PunctuationRun,
    /// A line containing only whitespace (the token holds that whitespace).
    BlankLine,
    Newline,
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// 1-based source line.
    pub line: u32,
    /// 1-based byte column within the line.
    pub column: u32,
    /// Byte offset into the source.
    pub offset: usize,
}

impl<'a> Token<'a> {
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Tokenize the whole source. Expects `\n` line endings (the facade
/// normalizes CRLF before parsing).
pub fn tokenize(source: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::with_capacity(source.len() / 4 + 4);
    let bytes = source.as_bytes();
    let mut line_start = 0usize;
    let mut line_no = 1u32;

    while line_start < bytes.len() {
        let line_end = bytes[line_start..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|p| line_start + p)
            .unwrap_or(bytes.len());
        tokenize_line(source, line_start, line_end, line_no, &mut tokens);
        if line_end < bytes.len() {
            tokens.push(Token {
                kind: TokenKind::Newline,
                text: &source[line_end..line_end + 1],
                line: line_no,
                column: (line_end - line_start + 1) as u32,
                offset: line_end,
            });
        }
        line_start = line_end + 1;
        line_no += 1;
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        text: "",
        line: line_no,
        column: 1,
        offset: source.len(),
    });
    tokens
}

fn tokenize_line<'a>(
    source: &'a str,
    start: usize,
    end: usize,
    line_no: u32,
    tokens: &mut Vec<Token<'a>>,
) {
    let bytes = source.as_bytes();
    let raw = &bytes[start..end];

    if raw.iter().all(|&b| b == b' ' || b == b'\t') {
        tokens.push(Token {
            kind: TokenKind::BlankLine,
            text: &source[start..end],
            line: line_no,
            column: 1,
            offset: start,
        });
        return;
    }

    let token = |kind, from: usize, to: usize| Token {
        kind,
        text: &source[from..to],
        line: line_no,
        column: (from - start + 1) as u32,
        offset: from,
    };

    let mut i = start;

    // Leading indentation.
    let ns = next_nonspace(bytes, i, end);
    if ns > i {
        tokens.push(token(TokenKind::Whitespace, i, ns));
        i = ns;
    }

    // Line-start markers. Container markers (quote, list) stack in front
    // of whatever marker their content opens with; heading and fence
    // markers end the chain because the rest of the line is theirs.
    loop {
        let Some(marker_end) = scan_line_marker(bytes, i, end, tokens, &token) else {
            break;
        };
        i = marker_end;
        match tokens.last().map(|t| t.kind) {
            Some(TokenKind::QuoteMarker) => {}
            Some(TokenKind::ListMarker) => {
                // Task-list rule: one whitespace token no wider than four
                // columns, then a checkbox followed by a space or tab.
                let ws_end = next_nonspace(bytes, i, end);
                let gap = ws_end - i;
                if gap >= 1 && gap <= 4 && is_task_checkbox(bytes, ws_end, end) {
                    tokens.push(token(TokenKind::Whitespace, i, ws_end));
                    tokens.push(token(TokenKind::TaskListMarker, ws_end, ws_end + 3));
                    i = ws_end + 3;
                }
            }
            _ => break,
        }
        let ws_end = next_nonspace(bytes, i, end);
        if ws_end > i {
            tokens.push(token(TokenKind::Whitespace, i, ws_end));
            i = ws_end;
        }
        if i >= end {
            break;
        }
    }

    // Generic runs for the rest of the line.
    while i < end {
        let b = bytes[i];
        let run_start = i;
        if b == b' ' || b == b'\t' {
            i = next_nonspace(bytes, i, end);
            tokens.push(token(TokenKind::Whitespace, run_start, i));
        } else if is_ascii_punctuation(b) {
            while i < end && bytes[i] == b {
                i += 1;
            }
            tokens.push(token(TokenKind::PunctuationRun, run_start, i));
        } else {
            while i < end && bytes[i] != b' ' && bytes[i] != b'\t' && !is_ascii_punctuation(bytes[i])
            {
                i += 1;
            }
            tokens.push(token(TokenKind::Text, run_start, i));
        }
    }
}

fn next_nonspace(bytes: &[u8], mut i: usize, end: usize) -> usize {
    while i < end && (bytes[i] == b' ' || bytes[i] == b'\t') {
        i += 1;
    }
    i
}

fn is_space_or_eol(bytes: &[u8], i: usize, end: usize) -> bool {
    i >= end || bytes[i] == b' ' || bytes[i] == b'\t'
}

fn is_task_checkbox(bytes: &[u8], i: usize, end: usize) -> bool {
    i + 3 <= end
        && bytes[i] == b'['
        && matches!(bytes[i + 1], b'x' | b'X' | b' ')
        && bytes[i + 2] == b']'
        && i + 3 < end
        && (bytes[i + 3] == b' ' || bytes[i + 3] == b'\t')
}

/// Classify a marker at the first non-space position of a line. Pushes the
/// marker token and returns the position after it, or returns `None` and
/// pushes nothing.
fn scan_line_marker<'a>(
    bytes: &[u8],
    i: usize,
    end: usize,
    tokens: &mut Vec<Token<'a>>,
    token: &impl Fn(TokenKind, usize, usize) -> Token<'a>,
) -> Option<usize> {
    let b = bytes[i];
    match b {
        b'#' => {
            let mut j = i;
            while j < end && bytes[j] == b'#' && j - i < 7 {
                j += 1;
            }
            if j - i <= 6 && is_space_or_eol(bytes, j, end) {
                tokens.push(token(TokenKind::HeadingMarker, i, j));
                return Some(j);
            }
            None
        }
        b'>' => {
            tokens.push(token(TokenKind::QuoteMarker, i, i + 1));
            Some(i + 1)
        }
        b'`' | b'~' => {
            let mut j = i;
            while j < end && bytes[j] == b {
                j += 1;
            }
            if j - i >= 3 {
                tokens.push(token(TokenKind::FenceMarker, i, j));
                return Some(j);
            }
            None
        }
        b'-' | b'*' | b'+' => {
            if is_space_or_eol(bytes, i + 1, end) {
                tokens.push(token(TokenKind::ListMarker, i, i + 1));
                return Some(i + 1);
            }
            None
        }
        b'0'..=b'9' => {
            let mut j = i;
            while j < end && bytes[j].is_ascii_digit() && j - i < 9 {
                j += 1;
            }
            if j < end
                && (bytes[j] == b'.' || bytes[j] == b')')
                && is_space_or_eol(bytes, j + 1, end)
            {
                tokens.push(token(TokenKind::ListMarker, i, j + 1));
                return Some(j + 1);
            }
            None
        }
        _ => None,
    }
}

/// Task-list marker found on a line, relative to the line's raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskMarker {
    /// Byte offset of `[` within the line.
    pub offset: usize,
    pub checked: bool,
}

/// A line-start marker token, positioned relative to its line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineMarker {
    pub kind: TokenKind,
    /// Byte offset of the marker within the line.
    pub offset: usize,
}

/// One source line as consumed by the block parser.
#[derive(Debug, Clone)]
pub struct LineTokens<'a> {
    /// Line content without the trailing newline.
    pub raw: &'a str,
    /// 1-based line number.
    pub line: u32,
    /// Byte offset of the line start in the source.
    pub offset: usize,
    pub blank: bool,
    pub task_marker: Option<TaskMarker>,
    /// The line-start marker chain, in source order.
    pub markers: Vec<LineMarker>,
}

/// Cursor over the token array. Exactly one authoritative position exists
/// per parse; ambiguous grammar is handled by `save`/`restore`.
#[derive(Debug)]
pub struct TokenStream<'a> {
    source: &'a str,
    tokens: Vec<Token<'a>>,
    pos: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

impl<'a> TokenStream<'a> {
    pub fn new(source: &'a str) -> Self {
        TokenStream {
            source,
            tokens: tokenize(source),
            pos: 0,
        }
    }

    /// Token at `offset` positions past the cursor, clamped to end-of-input.
    pub fn peek(&self, offset: usize) -> &Token<'a> {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    pub fn advance(&mut self) -> &Token<'a> {
        let token = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_eof(&self) -> bool {
        self.tokens[self.pos].kind == TokenKind::Eof
    }

    pub fn save(&self) -> Checkpoint {
        Checkpoint(self.pos)
    }

    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.0;
    }

    /// Consume and return the current line, advancing past its newline.
    /// Returns `None` at end of input.
    pub fn next_line(&mut self) -> Option<LineTokens<'a>> {
        if self.is_eof() {
            return None;
        }
        let first = self.tokens[self.pos];
        let line_no = first.line;
        let line_start = first.offset - (first.column as usize - 1);
        let mut blank = false;
        let mut task_marker = None;
        let mut markers = Vec::new();
        let mut line_end = self.source.len();

        loop {
            let token = self.tokens[self.pos];
            match token.kind {
                TokenKind::Newline => {
                    line_end = token.offset;
                    self.pos += 1;
                    break;
                }
                TokenKind::Eof => break,
                TokenKind::BlankLine => blank = true,
                TokenKind::TaskListMarker => {
                    task_marker = Some(TaskMarker {
                        offset: token.offset - line_start,
                        checked: !token.text.as_bytes()[1].eq_ignore_ascii_case(&b' '),
                    });
                }
                TokenKind::QuoteMarker
                | TokenKind::ListMarker
                | TokenKind::HeadingMarker
                | TokenKind::FenceMarker => {
                    markers.push(LineMarker {
                        kind: token.kind,
                        offset: token.offset - line_start,
                    });
                }
                _ => {}
            }
            self.pos += 1;
        }

        Some(LineTokens {
            raw: &self.source[line_start..line_end],
            line: line_no,
            offset: line_start,
            blank,
            task_marker,
            markers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).iter().map(|t| t.kind).collect()
    }

    #[test]
    fn tokens_cover_entire_input() {
        let inputs = [
            "# Heading\n\ntext *em* `code`\n",
            "- [x] done\n- [ ] todo",
            "> quote\n>> nested\n",
            "   \n\t\n``` rust\ncode\n```",
        ];
        for input in inputs {
            let total: usize = tokenize(input).iter().map(|t| t.len()).sum();
            assert_eq!(total, input.len(), "input {input:?}");
        }
    }

    #[test]
    fn heading_marker_requires_space_and_level() {
        assert_eq!(
            kinds("# a"),
            vec![
                TokenKind::HeadingMarker,
                TokenKind::Whitespace,
                TokenKind::Text,
                TokenKind::Eof
            ]
        );
        // Seven hashes is not a heading.
        assert_eq!(
            kinds("####### a"),
            vec![
                TokenKind::PunctuationRun,
                TokenKind::Whitespace,
                TokenKind::Text,
                TokenKind::Eof
            ]
        );
        // No space after the hashes.
        assert!(!kinds("#a").contains(&TokenKind::HeadingMarker));
    }

    #[test]
    fn list_markers() {
        assert_eq!(kinds("- a")[0], TokenKind::ListMarker);
        assert_eq!(kinds("1. a")[0], TokenKind::ListMarker);
        assert_eq!(kinds("12) a")[0], TokenKind::ListMarker);
        // Ten digits is too many.
        assert!(!kinds("1234567890. a").contains(&TokenKind::ListMarker));
        // No following space.
        assert!(!kinds("-a").contains(&TokenKind::ListMarker));
    }

    #[test]
    fn task_marker_needs_list_context() {
        assert!(kinds("- [x] done").contains(&TokenKind::TaskListMarker));
        assert!(kinds("- [ ] todo").contains(&TokenKind::TaskListMarker));
        assert!(kinds("1. [X] shout").contains(&TokenKind::TaskListMarker));
        // Not at a list item's content start.
        assert!(!kinds("[x] loose").contains(&TokenKind::TaskListMarker));
        // No trailing space after the bracket.
        assert!(!kinds("- [x]").contains(&TokenKind::TaskListMarker));
        // Too far from the marker.
        assert!(!kinds("-      [x] far").contains(&TokenKind::TaskListMarker));
        // Quoted items still carry their checkbox.
        assert!(kinds("> - [x] quoted").contains(&TokenKind::TaskListMarker));
        // So do items of a nested list.
        assert!(kinds("- - [x] nested").contains(&TokenKind::TaskListMarker));
    }

    #[test]
    fn markers_stack_through_containers() {
        assert_eq!(
            kinds("> - ```rust"),
            vec![
                TokenKind::QuoteMarker,
                TokenKind::Whitespace,
                TokenKind::ListMarker,
                TokenKind::Whitespace,
                TokenKind::FenceMarker,
                TokenKind::Text,
                TokenKind::Eof,
            ]
        );
        // Heading content is not scanned for further markers.
        assert_eq!(
            kinds("# - not a list"),
            vec![
                TokenKind::HeadingMarker,
                TokenKind::Whitespace,
                TokenKind::PunctuationRun,
                TokenKind::Whitespace,
                TokenKind::Text,
                TokenKind::Whitespace,
                TokenKind::Text,
                TokenKind::Whitespace,
                TokenKind::Text,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn next_line_records_the_marker_chain() {
        let mut stream = TokenStream::new("> # h\n");
        let line = stream.next_line().unwrap();
        assert_eq!(
            line.markers,
            vec![
                LineMarker {
                    kind: TokenKind::QuoteMarker,
                    offset: 0,
                },
                LineMarker {
                    kind: TokenKind::HeadingMarker,
                    offset: 2,
                },
            ]
        );
    }

    #[test]
    fn blank_lines_keep_their_whitespace() {
        let tokens = tokenize("a\n  \t\nb");
        assert_eq!(tokens[2].kind, TokenKind::BlankLine);
        assert_eq!(tokens[2].text, "  \t");
    }

    #[test]
    fn fence_markers() {
        assert_eq!(kinds("```rust")[0], TokenKind::FenceMarker);
        assert_eq!(kinds("~~~")[0], TokenKind::FenceMarker);
        assert!(!kinds("``x").contains(&TokenKind::FenceMarker));
    }

    #[test]
    fn save_restore_round_trip() {
        let mut stream = TokenStream::new("a b c");
        let checkpoint = stream.save();
        stream.advance();
        stream.advance();
        assert_ne!(stream.position(), 0);
        stream.restore(checkpoint);
        assert_eq!(stream.position(), 0);
        assert_eq!(stream.peek(0).text, "a");
    }

    #[test]
    fn next_line_yields_raw_and_flags() {
        let mut stream = TokenStream::new("- [x] done\n\nplain\n");
        let line = stream.next_line().unwrap();
        assert_eq!(line.raw, "- [x] done");
        assert_eq!(line.line, 1);
        let marker = line.task_marker.unwrap();
        assert_eq!(marker.offset, 2);
        assert!(marker.checked);

        let line = stream.next_line().unwrap();
        assert!(line.blank);

        let line = stream.next_line().unwrap();
        assert_eq!(line.raw, "plain");
        assert!(stream.next_line().is_none());
    }

    #[test]
    fn next_line_always_advances() {
        let mut stream = TokenStream::new("x\ny");
        let mut last = stream.position();
        while stream.next_line().is_some() {
            assert!(stream.position() > last);
            last = stream.position();
        }
    }
}
