//! Grammar pieces for the trailing part of links: `(destination "title")`
//! suffixes and `[label]` references. The destination and title parsers are
//! shared with link-reference definitions.

use crate::parser::block_parser::reference_definitions::{parse_destination, parse_title};
use crate::utf8_char_len;

fn skip_ws(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && matches!(bytes[i], b' ' | b'\t' | b'\n') {
        i += 1;
    }
    i
}

/// Parse `(dest "title")` starting at the `(`. Returns the destination,
/// optional title, and the byte index just past the closing paren.
pub(super) fn parse_inline_suffix(
    raw: &str,
    start: usize,
) -> Option<(String, Option<String>, usize)> {
    let bytes = raw.as_bytes();
    if bytes.get(start) != Some(&b'(') {
        return None;
    }
    let mut i = skip_ws(bytes, start + 1);

    let destination = if bytes.get(i) == Some(&b')') {
        String::new()
    } else {
        let (dest, after) = parse_destination(raw, i)?;
        i = after;
        dest
    };

    let mut title = None;
    let after_ws = skip_ws(bytes, i);
    if after_ws > i {
        // A title needs separating whitespace.
        if let Some((parsed, after_title)) = parse_title(raw, after_ws) {
            title = Some(parsed);
            i = skip_ws(bytes, after_title);
        } else {
            i = after_ws;
        }
    }

    if bytes.get(i) == Some(&b')') {
        Some((destination, title, i + 1))
    } else {
        None
    }
}

/// Parse `[label]` starting at the `[`. The label may be empty (collapsed
/// references); nesting invalidates it.
pub(super) fn parse_label(raw: &str, start: usize) -> Option<(String, usize)> {
    let bytes = raw.as_bytes();
    if bytes.get(start) != Some(&b'[') {
        return None;
    }
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b']' => {
                let label = &raw[start + 1..i];
                if label.len() > 999 {
                    return None;
                }
                return Some((label.to_string(), i + 1));
            }
            b'[' => return None,
            b'\\' if i + 1 < bytes.len() => i += 1 + utf8_char_len(bytes[i + 1]),
            b => i += utf8_char_len(b),
        }
    }
    None
}
