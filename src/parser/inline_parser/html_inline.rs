//! Raw inline HTML: a single tag, comment, processing instruction,
//! declaration, or CDATA section, passed through verbatim.

/// Try to match an inline HTML construct at the `<` at byte `start`.
/// Returns the number of bytes it spans.
pub(super) fn parse_inline_html(raw: &str, start: usize) -> Option<usize> {
    let bytes = &raw.as_bytes()[start..];
    if bytes.first() != Some(&b'<') {
        return None;
    }

    let len = if bytes.starts_with(b"<!--") {
        find_terminator(bytes, 4, b"-->")
    } else if bytes.starts_with(b"<![CDATA[") {
        find_terminator(bytes, 9, b"]]>")
    } else if bytes.starts_with(b"<?") {
        find_terminator(bytes, 2, b"?>")
    } else if bytes.len() > 2 && bytes[1] == b'!' && bytes[2].is_ascii_alphabetic() {
        find_terminator(bytes, 2, b">")
    } else if bytes.get(1) == Some(&b'/') {
        closing_tag(bytes)
    } else {
        opening_tag(bytes)
    };
    len
}

fn find_terminator(bytes: &[u8], from: usize, end: &[u8]) -> Option<usize> {
    let mut i = from;
    while i + end.len() <= bytes.len() {
        if &bytes[i..i + end.len()] == end {
            return Some(i + end.len());
        }
        i += 1;
    }
    None
}

fn is_ws(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n')
}

fn skip_ws(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && is_ws(bytes[i]) {
        i += 1;
    }
    i
}

fn tag_name_end(bytes: &[u8], start: usize) -> Option<usize> {
    if start >= bytes.len() || !bytes[start].is_ascii_alphabetic() {
        return None;
    }
    let mut i = start + 1;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-') {
        i += 1;
    }
    Some(i)
}

fn closing_tag(bytes: &[u8]) -> Option<usize> {
    let mut i = tag_name_end(bytes, 2)?;
    i = skip_ws(bytes, i);
    (bytes.get(i) == Some(&b'>')).then_some(i + 1)
}

/// `<name (ws attr(=value)?)* ws? /?>`
fn opening_tag(bytes: &[u8]) -> Option<usize> {
    let mut i = tag_name_end(bytes, 1)?;
    loop {
        let before = i;
        i = skip_ws(bytes, i);
        match bytes.get(i) {
            None => return None,
            Some(b'>') => return Some(i + 1),
            Some(b'/') => {
                return (bytes.get(i + 1) == Some(&b'>')).then_some(i + 2);
            }
            Some(&b) => {
                if i == before || (!b.is_ascii_alphabetic() && b != b'_' && b != b':') {
                    return None;
                }
            }
        }
        while i < bytes.len()
            && (bytes[i].is_ascii_alphanumeric() || matches!(bytes[i], b'_' | b':' | b'.' | b'-'))
        {
            i += 1;
        }
        let after_name = skip_ws(bytes, i);
        if bytes.get(after_name) != Some(&b'=') {
            continue;
        }
        i = skip_ws(bytes, after_name + 1);
        match bytes.get(i) {
            None => return None,
            Some(&q @ (b'"' | b'\'')) => {
                i += 1;
                while i < bytes.len() && bytes[i] != q {
                    i += 1;
                }
                if i >= bytes.len() {
                    return None;
                }
                i += 1;
            }
            Some(_) => {
                let start = i;
                while i < bytes.len()
                    && !is_ws(bytes[i])
                    && !matches!(bytes[i], b'"' | b'\'' | b'=' | b'<' | b'>' | b'`')
                {
                    i += 1;
                }
                if i == start {
                    return None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn html_len(s: &str) -> Option<usize> {
        parse_inline_html(s, 0)
    }

    #[test]
    fn simple_tags() {
        assert_eq!(html_len("<em>"), Some(4));
        assert_eq!(html_len("</em>"), Some(5));
        assert_eq!(html_len("<br/>"), Some(5));
        assert_eq!(html_len("<a href=\"x\">"), Some(12));
        assert_eq!(html_len("<a href=unquoted>"), Some(17));
        assert_eq!(html_len("<3>"), None);
        assert_eq!(html_len("<a href=\"unclosed>"), None);
    }

    #[test]
    fn attributes_may_span_lines() {
        assert_eq!(html_len("<a\n  href=\"x\">"), Some(14));
    }

    #[test]
    fn comments_and_friends() {
        assert_eq!(html_len("<!-- c -->"), Some(10));
        assert_eq!(html_len("<!-- open"), None);
        assert_eq!(html_len("<?pi?>"), Some(6));
        assert_eq!(html_len("<!DOCTYPE html>"), Some(15));
        assert_eq!(html_len("<![CDATA[x]]>"), Some(13));
    }
}
