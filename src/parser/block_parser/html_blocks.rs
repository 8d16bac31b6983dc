//! HTML block detection: the seven CommonMark start conditions and their
//! matching end conditions.

/// End condition an open HTML block waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum HtmlBlockEnd {
    /// Line containing the given closing tag (types 1).
    EndTag(&'static str),
    /// Line containing `-->` (type 2).
    Comment,
    /// Line containing `?>` (type 3).
    ProcessingInstruction,
    /// Line containing `>` (type 4).
    Declaration,
    /// Line containing `]]>` (type 5).
    Cdata,
    /// The next blank line (types 6 and 7).
    BlankLine,
}

const TYPE6_TAGS: &[&str] = &[
    "address", "article", "aside", "base", "basefont", "blockquote", "body", "caption", "center",
    "col", "colgroup", "dd", "details", "dialog", "dir", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "frame", "frameset", "h1", "h2", "h3", "h4", "h5",
    "h6", "head", "header", "hr", "html", "iframe", "legend", "li", "link", "main", "menu",
    "menuitem", "nav", "noframes", "ol", "optgroup", "option", "p", "param", "search", "section",
    "summary", "table", "tbody", "td", "template", "tfoot", "th", "thead", "title", "tr", "track",
    "ul",
];

fn opens_with_tag(bytes: &[u8], tag: &str) -> bool {
    let tag = tag.as_bytes();
    if bytes.len() < 1 + tag.len() || bytes[0] != b'<' {
        return false;
    }
    if !bytes[1..1 + tag.len()].eq_ignore_ascii_case(tag) {
        return false;
    }
    matches!(
        bytes.get(1 + tag.len()),
        None | Some(b' ' | b'\t' | b'>' | b'\n')
    )
}

/// Classify the start of an HTML block at a line's first non-space byte.
/// Type 7 never interrupts a paragraph.
pub(super) fn detect_html_block(line: &str, in_paragraph: bool) -> Option<HtmlBlockEnd> {
    let bytes = line.as_bytes();
    if bytes.first() != Some(&b'<') {
        return None;
    }

    for tag in ["pre", "script", "style", "textarea"] {
        if opens_with_tag(bytes, tag) {
            return Some(match tag {
                "pre" => HtmlBlockEnd::EndTag("</pre>"),
                "script" => HtmlBlockEnd::EndTag("</script>"),
                "style" => HtmlBlockEnd::EndTag("</style>"),
                _ => HtmlBlockEnd::EndTag("</textarea>"),
            });
        }
    }

    if bytes.starts_with(b"<!--") {
        return Some(HtmlBlockEnd::Comment);
    }
    if bytes.starts_with(b"<?") {
        return Some(HtmlBlockEnd::ProcessingInstruction);
    }
    if bytes.starts_with(b"<![CDATA[") {
        return Some(HtmlBlockEnd::Cdata);
    }
    if bytes.len() > 2 && bytes[1] == b'!' && bytes[2].is_ascii_alphabetic() {
        return Some(HtmlBlockEnd::Declaration);
    }

    if matches_type6(bytes) {
        return Some(HtmlBlockEnd::BlankLine);
    }
    if !in_paragraph && is_complete_tag_line(bytes) {
        return Some(HtmlBlockEnd::BlankLine);
    }

    None
}

/// Type 6: a known block-level tag name, open or close, followed by
/// space, tab, `>`, `/`, or end of line.
fn matches_type6(bytes: &[u8]) -> bool {
    if bytes.len() < 2 || bytes[0] != b'<' {
        return false;
    }
    let start = if bytes[1] == b'/' { 2 } else { 1 };
    let mut end = start;
    while end < bytes.len() && bytes[end].is_ascii_alphanumeric() {
        end += 1;
    }
    if end == start || end - start > 10 {
        return false;
    }
    if let Some(&next) = bytes.get(end) {
        if !matches!(next, b' ' | b'\t' | b'>' | b'/' | b'\n') {
            return false;
        }
    }
    let name: Vec<u8> = bytes[start..end].iter().map(u8::to_ascii_lowercase).collect();
    TYPE6_TAGS.binary_search_by(|t| t.as_bytes().cmp(&name)).is_ok()
}

/// Type 7: a single complete open or close tag with nothing but whitespace
/// after it.
fn is_complete_tag_line(bytes: &[u8]) -> bool {
    if bytes.len() < 3 || bytes[0] != b'<' {
        return false;
    }
    let is_close = bytes[1] == b'/';
    let mut i = if is_close { 2 } else { 1 };

    if i >= bytes.len() || !bytes[i].is_ascii_alphabetic() {
        return false;
    }
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-') {
        i += 1;
    }

    let skip_ws = |i: &mut usize| {
        let before = *i;
        while *i < bytes.len() && (bytes[*i] == b' ' || bytes[*i] == b'\t') {
            *i += 1;
        }
        *i > before
    };

    if is_close {
        skip_ws(&mut i);
        if bytes.get(i) != Some(&b'>') {
            return false;
        }
        i += 1;
    } else {
        loop {
            let had_ws = skip_ws(&mut i);
            match bytes.get(i) {
                None => return false,
                Some(b'>') => {
                    i += 1;
                    break;
                }
                Some(b'/') => {
                    if bytes.get(i + 1) != Some(&b'>') {
                        return false;
                    }
                    i += 2;
                    break;
                }
                Some(&b) => {
                    // Attribute name needs separating whitespace.
                    if !had_ws || (!b.is_ascii_alphabetic() && b != b'_' && b != b':') {
                        return false;
                    }
                }
            }
            while i < bytes.len()
                && (bytes[i].is_ascii_alphanumeric() || matches!(bytes[i], b'_' | b':' | b'.' | b'-'))
            {
                i += 1;
            }
            skip_ws(&mut i);
            if bytes.get(i) == Some(&b'=') {
                i += 1;
                skip_ws(&mut i);
                match bytes.get(i) {
                    None => return false,
                    Some(&q @ (b'"' | b'\'')) => {
                        i += 1;
                        while i < bytes.len() && bytes[i] != q {
                            i += 1;
                        }
                        if i >= bytes.len() {
                            return false;
                        }
                        i += 1;
                    }
                    Some(_) => {
                        while i < bytes.len()
                            && !matches!(bytes[i], b' ' | b'\t' | b'"' | b'\'' | b'=' | b'<' | b'>' | b'`')
                        {
                            i += 1;
                        }
                    }
                }
            }
        }
    }

    bytes[i..].iter().all(|&b| b == b' ' || b == b'\t')
}

/// Does this line satisfy the block's end condition? `BlankLine` blocks are
/// ended by the block parser itself when it sees the blank.
pub(super) fn block_end_matched(end: HtmlBlockEnd, line: &str) -> bool {
    fn contains_ci(haystack: &str, needle: &str) -> bool {
        let h = haystack.as_bytes();
        let n = needle.as_bytes();
        h.len() >= n.len()
            && (0..=h.len() - n.len()).any(|i| h[i..i + n.len()].eq_ignore_ascii_case(n))
    }

    match end {
        HtmlBlockEnd::EndTag(tag) => contains_ci(line, tag),
        HtmlBlockEnd::Comment => line.contains("-->"),
        HtmlBlockEnd::ProcessingInstruction => line.contains("?>"),
        HtmlBlockEnd::Declaration => line.contains('>'),
        HtmlBlockEnd::Cdata => line.contains("]]>"),
        HtmlBlockEnd::BlankLine => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type1_script_and_pre() {
        assert_eq!(
            detect_html_block("<script src=\"x\">", true),
            Some(HtmlBlockEnd::EndTag("</script>"))
        );
        assert_eq!(
            detect_html_block("<PRE>", true),
            Some(HtmlBlockEnd::EndTag("</pre>"))
        );
        assert!(block_end_matched(HtmlBlockEnd::EndTag("</pre>"), "x</PRE>y"));
    }

    #[test]
    fn types_2_through_5() {
        assert_eq!(detect_html_block("<!-- c", false), Some(HtmlBlockEnd::Comment));
        assert_eq!(
            detect_html_block("<?php", false),
            Some(HtmlBlockEnd::ProcessingInstruction)
        );
        assert_eq!(
            detect_html_block("<!DOCTYPE html>", false),
            Some(HtmlBlockEnd::Declaration)
        );
        assert_eq!(detect_html_block("<![CDATA[x", false), Some(HtmlBlockEnd::Cdata));
    }

    #[test]
    fn type6_block_tags() {
        assert_eq!(detect_html_block("<div>", true), Some(HtmlBlockEnd::BlankLine));
        assert_eq!(detect_html_block("</table>", true), Some(HtmlBlockEnd::BlankLine));
        assert_eq!(detect_html_block("<DIV CLASS=\"x\">", true), Some(HtmlBlockEnd::BlankLine));
        assert_eq!(detect_html_block("<span>", true), None);
    }

    #[test]
    fn type7_cannot_interrupt_paragraph() {
        assert_eq!(detect_html_block("<span>", false), Some(HtmlBlockEnd::BlankLine));
        assert_eq!(detect_html_block("<span>", true), None);
        // Trailing content disqualifies type 7.
        assert_eq!(detect_html_block("<span>text", false), None);
        assert_eq!(
            detect_html_block("<x-tag attr='v' />", false),
            Some(HtmlBlockEnd::BlankLine)
        );
    }
}
