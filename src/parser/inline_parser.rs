//! Inline parsing: the second phase, run over the raw text of each leaf
//! block once every link-reference definition is known.
//!
//! A single left-to-right scan resolves code spans, escapes, entities,
//! line breaks, raw HTML, and angle autolinks immediately; emphasis
//! delimiters and link brackets are pushed as pending items and resolved
//! by the delimiter-stack algorithm (on `]` for the bracketed range, and
//! once more at the end of input). With GFM extensions on, a final pass
//! turns bare URLs and addresses in the produced text into links.

mod autolinks;
mod emphasis;
pub(crate) mod entities;
mod html_inline;
mod links;

use log::trace;

use crate::ast::Inline;
use crate::config::ParserConfig;
use crate::parser::block_parser::reference_definitions::ReferenceRegistry;

/// A reference label that never resolved, reported in strict mode.
#[derive(Debug)]
pub(crate) struct UnresolvedReference {
    pub label: String,
    pub line: usize,
}

/// Work items produced by the scan, consumed by emphasis and link
/// resolution.
pub(super) enum Item {
    Text(String),
    Node(Inline),
    Delim {
        ch: u8,
        count: usize,
        can_open: bool,
        can_close: bool,
    },
    BracketOpen {
        image: bool,
        active: bool,
        /// Byte offset just past the `[` in the raw text, for label lookup.
        raw_pos: usize,
    },
}

pub(crate) struct InlineParser<'a> {
    refs: &'a ReferenceRegistry,
    config: &'a ParserConfig,
    unresolved: Vec<UnresolvedReference>,
}

impl<'a> InlineParser<'a> {
    pub fn new(refs: &'a ReferenceRegistry, config: &'a ParserConfig) -> Self {
        InlineParser {
            refs,
            config,
            unresolved: Vec::new(),
        }
    }

    pub fn into_unresolved(self) -> Vec<UnresolvedReference> {
        self.unresolved
    }

    /// Parse one leaf block's raw text. `line` is the block's first source
    /// line, used for strict-mode diagnostics.
    pub fn parse(&mut self, raw: &str, line: usize) -> Vec<Inline> {
        let mut items = self.scan(raw, line);
        emphasis::process_emphasis(&mut items, 0);
        let mut inlines = emphasis::flatten(items);
        trim_final_break(&mut inlines);
        if self.config.autolinks_enabled() {
            autolinks::linkify(&mut inlines);
        }
        inlines
    }

    fn scan(&mut self, raw: &str, line: usize) -> Vec<Item> {
        let bytes = raw.as_bytes();
        let mut items: Vec<Item> = Vec::new();
        let mut i = 0;

        while i < bytes.len() {
            match bytes[i] {
                b'\\' => {
                    if bytes.get(i + 1) == Some(&b'\n') {
                        flush_line_end(&mut items, false);
                        items.push(Item::Node(Inline::HardBreak));
                        i += 2;
                    } else if let Some(&next) = bytes.get(i + 1) {
                        if crate::is_ascii_punctuation(next) {
                            push_text(&mut items, &raw[i + 1..i + 2]);
                            i += 2;
                        } else {
                            push_text(&mut items, "\\");
                            i += 1;
                        }
                    } else {
                        push_text(&mut items, "\\");
                        i += 1;
                    }
                }

                b'\n' => {
                    let hard = flush_line_end(&mut items, true);
                    items.push(Item::Node(if hard {
                        Inline::HardBreak
                    } else {
                        Inline::SoftBreak
                    }));
                    i += 1;
                }

                b'`' => {
                    let run = run_length(bytes, i, b'`');
                    match find_code_span_end(bytes, i + run, run) {
                        Some(end) => {
                            let content = code_span_content(&raw[i + run..end]);
                            items.push(Item::Node(Inline::CodeSpan(content)));
                            i = end + run;
                        }
                        None => {
                            push_text(&mut items, &raw[i..i + run]);
                            i += run;
                        }
                    }
                }

                b'&' => {
                    if let Some((replacement, used)) = entities::parse_entity(raw, i) {
                        push_text(&mut items, &replacement);
                        i += used;
                    } else {
                        push_text(&mut items, "&");
                        i += 1;
                    }
                }

                b'<' => {
                    if let Some((node, used)) = autolinks::parse_angle_autolink(raw, i) {
                        items.push(Item::Node(node));
                        i += used;
                    } else if let Some(used) = html_inline::parse_inline_html(raw, i) {
                        items.push(Item::Node(Inline::Html(raw[i..i + used].to_string())));
                        i += used;
                    } else {
                        push_text(&mut items, "<");
                        i += 1;
                    }
                }

                b'[' => {
                    items.push(Item::BracketOpen {
                        image: false,
                        active: true,
                        raw_pos: i + 1,
                    });
                    i += 1;
                }

                b'!' if bytes.get(i + 1) == Some(&b'[') => {
                    items.push(Item::BracketOpen {
                        image: true,
                        active: true,
                        raw_pos: i + 2,
                    });
                    i += 2;
                }

                b']' => {
                    i = self.close_bracket(&mut items, raw, i, line);
                }

                ch @ (b'*' | b'_' | b'~') => {
                    let run = run_length(bytes, i, ch);
                    if ch == b'~' && (!self.config.strikethrough_enabled() || run != 2) {
                        push_text(&mut items, &raw[i..i + run]);
                        i += run;
                        continue;
                    }
                    let (can_open, can_close) = flanking(raw, i, run, ch);
                    if can_open || can_close {
                        items.push(Item::Delim {
                            ch,
                            count: run,
                            can_open,
                            can_close,
                        });
                    } else {
                        push_text(&mut items, &raw[i..i + run]);
                    }
                    i += run;
                }

                _ => {
                    let len = crate::utf8_char_len(bytes[i]);
                    push_text(&mut items, &raw[i..i + len]);
                    i += len;
                }
            }
        }

        items
    }

    /// Handle `]`: try to form a link or image with the most recent opener,
    /// falling back to literal text. Returns the byte index to resume at.
    fn close_bracket(
        &mut self,
        items: &mut Vec<Item>,
        raw: &str,
        close_pos: usize,
        line: usize,
    ) -> usize {
        let after = close_pos + 1;
        let Some(op_idx) = items
            .iter()
            .rposition(|item| matches!(item, Item::BracketOpen { .. }))
        else {
            push_text(items, "]");
            return after;
        };
        let (image, active, raw_pos) = match items[op_idx] {
            Item::BracketOpen {
                image,
                active,
                raw_pos,
            } => (image, active, raw_pos),
            _ => return after,
        };

        if !active {
            items[op_idx] = Item::Text(if image { "![".into() } else { "[".into() });
            push_text(items, "]");
            return after;
        }

        let bytes = raw.as_bytes();
        let mut resolved: Option<(String, Option<String>, usize)> = None;

        if bytes.get(after) == Some(&b'(') {
            resolved = links::parse_inline_suffix(raw, after);
        }

        if resolved.is_none() {
            // Reference forms. An explicit label that fails to resolve does
            // not fall back to the shortcut form.
            let mut tried_explicit = false;
            if bytes.get(after) == Some(&b'[') {
                if let Some((label, end)) = links::parse_label(raw, after) {
                    tried_explicit = true;
                    let lookup = if label.trim().is_empty() {
                        &raw[raw_pos..close_pos]
                    } else {
                        &label
                    };
                    match self.refs.get(lookup) {
                        Some(def) => {
                            resolved = Some((def.destination.clone(), def.title.clone(), end));
                        }
                        None => self.note_unresolved(lookup, line),
                    }
                }
            }
            if resolved.is_none() && !tried_explicit {
                let label = &raw[raw_pos..close_pos];
                if !label.trim().is_empty() && !label.contains('[') {
                    if let Some(def) = self.refs.get(label) {
                        resolved = Some((def.destination.clone(), def.title.clone(), after));
                    }
                }
            }
        }

        let Some((destination, title, end)) = resolved else {
            items[op_idx] = Item::Text(if image { "![".into() } else { "[".into() });
            push_text(items, "]");
            return after;
        };

        trace!("link resolved to {destination:?}");
        emphasis::process_emphasis(items, op_idx + 1);
        let children = emphasis::flatten(items.drain(op_idx + 1..).collect());
        let node = if image {
            Inline::Image {
                destination,
                title,
                children,
            }
        } else {
            Inline::Link {
                destination,
                title,
                children,
            }
        };
        items[op_idx] = Item::Node(node);

        if !image {
            // Links cannot nest: earlier link openers go inactive.
            for item in &mut items[..op_idx] {
                if let Item::BracketOpen {
                    image: false,
                    active,
                    ..
                } = item
                {
                    *active = false;
                }
            }
        }
        end
    }

    fn note_unresolved(&mut self, label: &str, line: usize) {
        if self.config.strict {
            self.unresolved.push(UnresolvedReference {
                label: label.to_string(),
                line,
            });
        }
    }
}

fn push_text(items: &mut Vec<Item>, text: &str) {
    if let Some(Item::Text(last)) = items.last_mut() {
        last.push_str(text);
    } else {
        items.push(Item::Text(text.to_string()));
    }
}

/// Trim the spaces preceding a line ending; with `check_hard`, report
/// whether two or more encoded a hard break.
fn flush_line_end(items: &mut Vec<Item>, check_hard: bool) -> bool {
    if let Some(Item::Text(last)) = items.last_mut() {
        let trimmed = last.trim_end_matches(' ');
        let removed = last.len() - trimmed.len();
        last.truncate(trimmed.len());
        let empty = last.is_empty();
        if empty {
            items.pop();
        }
        return check_hard && removed >= 2;
    }
    false
}

/// Final trailing spaces and breaks carry no meaning.
fn trim_final_break(inlines: &mut Vec<Inline>) {
    loop {
        match inlines.last_mut() {
            Some(Inline::Text(text)) => {
                let trimmed = text.trim_end_matches(' ').len();
                text.truncate(trimmed);
                if !text.is_empty() {
                    return;
                }
                inlines.pop();
            }
            Some(Inline::SoftBreak | Inline::HardBreak) => {
                inlines.pop();
            }
            _ => return,
        }
    }
}

fn run_length(bytes: &[u8], start: usize, ch: u8) -> usize {
    let mut i = start;
    while i < bytes.len() && bytes[i] == ch {
        i += 1;
    }
    i - start
}

/// Find the start of the next backtick run of exactly `len` backticks.
fn find_code_span_end(bytes: &[u8], mut i: usize, len: usize) -> Option<usize> {
    while i < bytes.len() {
        if bytes[i] == b'`' {
            let run = run_length(bytes, i, b'`');
            if run == len {
                return Some(i);
            }
            i += run;
        } else {
            i += 1;
        }
    }
    None
}

/// Code-span normalization: newlines become spaces; one space is stripped
/// from each end when both are present and the content is not all spaces.
fn code_span_content(raw: &str) -> String {
    let content: String = raw
        .chars()
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect();
    if content.len() >= 2
        && content.starts_with(' ')
        && content.ends_with(' ')
        && !content.bytes().all(|b| b == b' ')
    {
        content[1..content.len() - 1].to_string()
    } else {
        content
    }
}

fn char_is_punct(c: char) -> bool {
    if c.is_ascii() {
        c.is_ascii_punctuation()
    } else {
        !c.is_alphanumeric() && !c.is_whitespace()
    }
}

/// Left/right flanking classification for a delimiter run, with the
/// stricter intraword rules for `_`.
fn flanking(raw: &str, start: usize, len: usize, ch: u8) -> (bool, bool) {
    let before = raw[..start].chars().next_back().unwrap_or(' ');
    let after = raw[start + len..].chars().next().unwrap_or(' ');

    let before_ws = before.is_whitespace();
    let after_ws = after.is_whitespace();
    let before_punct = char_is_punct(before);
    let after_punct = char_is_punct(after);

    let left = !after_ws && (!after_punct || before_ws || before_punct);
    let right = !before_ws && (!before_punct || after_ws || after_punct);

    if ch == b'_' {
        (
            left && (!right || before_punct),
            right && (!left || after_punct),
        )
    } else {
        (left, right)
    }
}
