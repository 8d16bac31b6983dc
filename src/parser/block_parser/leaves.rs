//! Leaf-block predicates used by the block opening ladder.

use crate::ast::ListKind;

pub(super) fn is_thematic_break(line: &str) -> bool {
    let mut marker: u8 = 0;
    let mut count = 0u32;
    for &b in line.as_bytes() {
        match b {
            b' ' | b'\t' => continue,
            b'*' | b'-' | b'_' => {
                if marker == 0 {
                    marker = b;
                } else if b != marker {
                    return false;
                }
                count += 1;
            }
            _ => return false,
        }
    }
    count >= 3
}

/// `# heading` with up to six hashes followed by a space, tab, or end of
/// line. Returns the level and the content with closing hashes stripped.
pub(super) fn parse_atx_heading(line: &str) -> Option<(u8, &str)> {
    let bytes = line.as_bytes();
    if bytes.is_empty() || bytes[0] != b'#' {
        return None;
    }
    let mut level = 0u8;
    let mut i = 0;
    while i < bytes.len() && bytes[i] == b'#' && level < 7 {
        level += 1;
        i += 1;
    }
    if level > 6 {
        return None;
    }
    if i < bytes.len() && bytes[i] != b' ' && bytes[i] != b'\t' {
        return None;
    }
    let content = if i >= bytes.len() {
        ""
    } else {
        strip_closing_hashes(line[i..].trim())
    };
    Some((level, content))
}

fn strip_closing_hashes(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut end = bytes.len();
    while end > 0 && bytes[end - 1] == b'#' {
        end -= 1;
    }
    if end == bytes.len() {
        return s;
    }
    if end == 0 {
        return "";
    }
    if bytes[end - 1] == b' ' || bytes[end - 1] == b'\t' {
        s[..end].trim_end()
    } else {
        s
    }
}

/// Setext underline: all `=` (level 1) or all `-` (level 2).
pub(super) fn parse_setext_underline(line: &str) -> Option<u8> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    let ch = trimmed.as_bytes()[0];
    if ch != b'=' && ch != b'-' {
        return None;
    }
    if !trimmed.bytes().all(|b| b == ch) {
        return None;
    }
    Some(if ch == b'=' { 1 } else { 2 })
}

/// Opening code fence: at least three backticks or tildes. Returns the
/// fence byte, its length, and the raw info string.
pub(super) fn parse_fence_start(line: &str) -> Option<(u8, usize, &str)> {
    let bytes = line.as_bytes();
    let ch = *bytes.first()?;
    if ch != b'`' && ch != b'~' {
        return None;
    }
    let mut i = 0;
    while i < bytes.len() && bytes[i] == ch {
        i += 1;
    }
    if i < 3 {
        return None;
    }
    let info = line[i..].trim();
    // A backtick fence cannot carry backticks in its info string.
    if ch == b'`' && info.contains('`') {
        return None;
    }
    Some((ch, i, info))
}

/// Closing fence: same byte, at least the opening length, nothing but
/// trailing whitespace after it. The caller has already limited indent.
pub(super) fn is_closing_fence(line: &str, fence_char: u8, fence_len: usize) -> bool {
    let bytes = line.as_bytes();
    let mut i = 0;
    while i < bytes.len() && bytes[i] == fence_char {
        i += 1;
    }
    if i < fence_len {
        return false;
    }
    bytes[i..].iter().all(|&b| b == b' ' || b == b'\t')
}

#[derive(Debug, Clone, Copy)]
pub(super) struct ListMarkerInfo {
    pub kind: ListKind,
    /// Bytes of the marker itself (`-` = 1, `12.` = 3).
    pub marker_len: usize,
    pub start: u32,
    /// Nothing but whitespace follows the marker.
    pub is_empty_item: bool,
}

pub(super) fn parse_list_marker(line: &str) -> Option<ListMarkerInfo> {
    let bytes = line.as_bytes();
    let b0 = *bytes.first()?;

    let rest_is_blank = |from: usize| bytes[from..].iter().all(|&b| b == b' ' || b == b'\t');

    if matches!(b0, b'-' | b'*' | b'+') {
        if bytes.len() == 1 || bytes[1] == b' ' || bytes[1] == b'\t' {
            return Some(ListMarkerInfo {
                kind: ListKind::Bullet(b0),
                marker_len: 1,
                start: 0,
                is_empty_item: rest_is_blank(1),
            });
        }
        return None;
    }

    if b0.is_ascii_digit() {
        let mut i = 1;
        while i < bytes.len() && i < 9 && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i < bytes.len() && (bytes[i] == b'.' || bytes[i] == b')') {
            let delim = bytes[i];
            if i + 1 >= bytes.len() || bytes[i + 1] == b' ' || bytes[i + 1] == b'\t' {
                let start = line[..i].parse::<u32>().ok()?;
                return Some(ListMarkerInfo {
                    kind: ListKind::Ordered(delim),
                    marker_len: i + 1,
                    start,
                    is_empty_item: rest_is_blank(i + 1),
                });
            }
        }
    }

    None
}

/// Whether a list marker may interrupt an open paragraph: the item must be
/// non-empty, and an ordered item must start at 1.
pub(super) fn can_interrupt_paragraph(marker: &ListMarkerInfo) -> bool {
    if marker.is_empty_item {
        return false;
    }
    match marker.kind {
        ListKind::Bullet(_) => true,
        ListKind::Ordered(_) => marker.start == 1,
    }
}
