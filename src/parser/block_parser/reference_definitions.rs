//! Link-reference definitions: `[label]: destination "title"`.
//!
//! Definitions are peeled off the start of a paragraph's raw text when the
//! paragraph closes and recorded in the [`ReferenceRegistry`]. Labels are
//! matched case-insensitively with interior whitespace collapsed; the first
//! definition for a label wins.

use std::collections::HashMap;

use crate::is_ascii_punctuation;
use crate::parser::inline_parser::entities::resolve_entities_and_escapes;
use crate::utf8_char_len;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReferenceDefinition {
    pub destination: String,
    pub title: Option<String>,
}

#[derive(Debug, Default)]
pub(crate) struct ReferenceRegistry {
    definitions: HashMap<String, ReferenceDefinition>,
}

/// Case-fold a label and collapse runs of whitespace, per the CommonMark
/// matching rules.
pub(crate) fn normalize_label(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut pending_space = false;
    for ch in label.trim().chars() {
        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        for lower in ch.to_lowercase() {
            out.push(lower);
        }
    }
    out
}

impl ReferenceRegistry {
    /// Record a definition unless the label is already taken.
    pub fn insert(&mut self, label: &str, destination: String, title: Option<String>) {
        let key = normalize_label(label);
        if key.is_empty() {
            return;
        }
        self.definitions
            .entry(key)
            .or_insert(ReferenceDefinition { destination, title });
    }

    pub fn get(&self, label: &str) -> Option<&ReferenceDefinition> {
        self.definitions.get(&normalize_label(label))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }
}

/// Try to parse one reference definition at the start of `input` (which may
/// span lines). Returns `(label, destination, title, bytes_consumed)`.
pub(super) fn parse_reference_definition(
    input: &str,
) -> Option<(String, String, Option<String>, usize)> {
    let bytes = input.as_bytes();
    if bytes.first() != Some(&b'[') {
        return None;
    }

    let mut i = 1;
    let label_start = i;
    let mut closed = false;
    while i < bytes.len() {
        match bytes[i] {
            b']' => {
                closed = true;
                break;
            }
            b'[' => return None,
            b'\\' if i + 1 < bytes.len() => i += 1 + utf8_char_len(bytes[i + 1]),
            b => i += utf8_char_len(b),
        }
    }
    if !closed {
        return None;
    }
    let label = &input[label_start..i];
    i += 1;
    if label.trim().is_empty() || label.len() > 999 {
        return None;
    }

    if bytes.get(i) != Some(&b':') {
        return None;
    }
    i += 1;
    i = skip_spaces_one_newline(bytes, i);

    let (destination, after_dest) = parse_destination(input, i)?;
    i = after_dest;

    // Optional title, separated by whitespace (possibly one newline). If a
    // candidate title turns out malformed, the definition is still valid
    // when the destination ends its line.
    let title_start = skip_spaces_one_newline(bytes, i);
    if title_start > i && title_start < bytes.len() {
        if let Some((title, after_title)) = parse_title(input, title_start) {
            let line_end = skip_spaces(bytes, after_title);
            if line_end >= bytes.len() || bytes[line_end] == b'\n' {
                let consumed = (line_end + 1).min(bytes.len());
                return Some((label.to_string(), destination, Some(title), consumed));
            }
        }
    }

    let line_end = skip_spaces(bytes, i);
    if line_end < bytes.len() && bytes[line_end] != b'\n' {
        return None;
    }
    let consumed = (line_end + 1).min(bytes.len());
    Some((label.to_string(), destination, None, consumed))
}

fn skip_spaces(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t') {
        i += 1;
    }
    i
}

fn skip_spaces_one_newline(bytes: &[u8], i: usize) -> usize {
    let mut i = skip_spaces(bytes, i);
    if bytes.get(i) == Some(&b'\n') {
        i = skip_spaces(bytes, i + 1);
    }
    i
}

/// `<angle bracketed>` or a bare destination with balanced parentheses.
/// Escapes and entities are resolved in the result.
pub(crate) fn parse_destination(input: &str, start: usize) -> Option<(String, usize)> {
    let bytes = input.as_bytes();
    if start >= bytes.len() {
        return None;
    }

    if bytes[start] == b'<' {
        let mut i = start + 1;
        while i < bytes.len() {
            match bytes[i] {
                b'>' => {
                    let dest = resolve_entities_and_escapes(&input[start + 1..i]);
                    return Some((dest, i + 1));
                }
                b'<' | b'\n' => return None,
                b'\\' if i + 1 < bytes.len() => i += 1 + utf8_char_len(bytes[i + 1]),
                b => i += utf8_char_len(b),
            }
        }
        return None;
    }

    let mut i = start;
    let mut depth = 0i32;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b' ' || b == b'\t' || b == b'\n' || b < 0x20 {
            break;
        }
        match b {
            b'(' => {
                depth += 1;
                if depth > 32 {
                    return None;
                }
                i += 1;
            }
            b')' => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
                i += 1;
            }
            b'\\' if i + 1 < bytes.len() && is_ascii_punctuation(bytes[i + 1]) => i += 2,
            b => i += utf8_char_len(b),
        }
    }
    if depth != 0 || i == start {
        return None;
    }
    Some((resolve_entities_and_escapes(&input[start..i]), i))
}

/// A title in double quotes, single quotes, or parentheses.
pub(crate) fn parse_title(input: &str, start: usize) -> Option<(String, usize)> {
    let bytes = input.as_bytes();
    let open = *bytes.get(start)?;
    let close = match open {
        b'"' => b'"',
        b'\'' => b'\'',
        b'(' => b')',
        _ => return None,
    };
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b if b == close => {
                let title = resolve_entities_and_escapes(&input[start + 1..i]);
                return Some((title, i + 1));
            }
            b'(' if open == b'(' => return None,
            b'\\' if i + 1 < bytes.len() && is_ascii_punctuation(bytes[i + 1]) => i += 2,
            b => i += utf8_char_len(b),
        }
    }
    None
}
