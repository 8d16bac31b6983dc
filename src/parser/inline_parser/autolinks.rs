//! Autolinks: the CommonMark `<scheme:...>` and `<address>` forms, and the
//! GFM extension that links bare URLs and addresses in plain text.

use std::sync::LazyLock;

use regex::Regex;

use crate::ast::Inline;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .unwrap()
});

static BARE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:https?://|www\.)[^\s<]+").unwrap());

static BARE_EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9_-]+)+").unwrap()
});

/// `<scheme:destination>` or `<address@domain>` at byte `start`.
pub(super) fn parse_angle_autolink(raw: &str, start: usize) -> Option<(Inline, usize)> {
    let bytes = raw.as_bytes();
    if bytes.get(start) != Some(&b'<') {
        return None;
    }
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'>' => break,
            b'<' | b' ' | b'\t' | b'\n' => return None,
            _ => i += 1,
        }
    }
    if i >= bytes.len() {
        return None;
    }
    let inner = &raw[start + 1..i];
    let used = i + 1 - start;

    if is_uri(inner) {
        return Some((
            Inline::Autolink {
                url: inner.to_string(),
                email: false,
            },
            used,
        ));
    }
    if EMAIL_RE.is_match(inner) {
        return Some((
            Inline::Autolink {
                url: inner.to_string(),
                email: true,
            },
            used,
        ));
    }
    None
}

/// A scheme of 2 to 32 letters, digits, `+`, `.`, or `-`, starting with a
/// letter, followed by a colon.
fn is_uri(s: &str) -> bool {
    let bytes = s.as_bytes();
    let Some(colon) = bytes.iter().position(|&b| b == b':') else {
        return false;
    };
    if !(2..=32).contains(&colon) {
        return false;
    }
    if !bytes[0].is_ascii_alphabetic() {
        return false;
    }
    bytes[1..colon]
        .iter()
        .all(|&b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'.' | b'-'))
}

/// GFM extension pass: turn bare URLs and addresses inside already-parsed
/// text into autolinks. Link and image children are left alone.
pub(super) fn linkify(inlines: &mut Vec<Inline>) {
    let mut out = Vec::with_capacity(inlines.len());
    for inline in inlines.drain(..) {
        match inline {
            Inline::Text(text) => split_text(&text, &mut out),
            Inline::Emphasis(mut children) => {
                linkify(&mut children);
                out.push(Inline::Emphasis(children));
            }
            Inline::Strong(mut children) => {
                linkify(&mut children);
                out.push(Inline::Strong(children));
            }
            Inline::Strikethrough(mut children) => {
                linkify(&mut children);
                out.push(Inline::Strikethrough(children));
            }
            other => out.push(other),
        }
    }
    *inlines = out;
}

/// A character that may precede an extended autolink.
fn valid_boundary(text: &str, start: usize) -> bool {
    match text[..start].chars().next_back() {
        None => true,
        Some(c) => c.is_whitespace() || matches!(c, '*' | '_' | '~' | '('),
    }
}

/// Drop trailing punctuation and unbalanced closing parens from a URL
/// match, per the extended autolink rules.
fn trim_url(candidate: &str) -> &str {
    let mut url = candidate.trim_end_matches(['?', '!', '.', ',', ':', ';', '*', '_', '~', '\'', '"']);
    loop {
        if !url.ends_with(')') {
            break;
        }
        let opens = url.matches('(').count();
        let closes = url.matches(')').count();
        if closes <= opens {
            break;
        }
        url = url[..url.len() - 1]
            .trim_end_matches(['?', '!', '.', ',', ':', ';', '*', '_', '~', '\'', '"']);
    }
    url
}

fn split_text(text: &str, out: &mut Vec<Inline>) {
    let mut matches: Vec<(usize, usize)> = Vec::new();

    for found in BARE_URL_RE.find_iter(text) {
        if !valid_boundary(text, found.start()) {
            continue;
        }
        let trimmed = trim_url(found.as_str());
        // The scheme or www. prefix alone is not a link.
        let without_prefix = trimmed
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_start_matches("www.");
        if !without_prefix.is_empty() {
            matches.push((found.start(), found.start() + trimmed.len()));
        }
    }

    for found in BARE_EMAIL_RE.find_iter(text) {
        if !valid_boundary(text, found.start()) {
            continue;
        }
        let last = found.as_str().as_bytes()[found.as_str().len() - 1];
        if last == b'-' || last == b'_' {
            continue;
        }
        matches.push((found.start(), found.end()));
    }

    matches.sort();
    matches.dedup_by(|next, prev| next.0 < prev.1);

    let mut pos = 0;
    for (start, end) in matches {
        if start < pos {
            continue;
        }
        if start > pos {
            out.push(Inline::Text(text[pos..start].to_string()));
        }
        let link_text = &text[start..end];
        out.push(Inline::Autolink {
            url: link_text.to_string(),
            email: link_text.contains('@') && !link_text.contains("//"),
        });
        pos = end;
    }
    if pos < text.len() {
        out.push(Inline::Text(text[pos..].to_string()));
    }
}
