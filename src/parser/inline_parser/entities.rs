//! HTML entity and backslash-escape resolution.
//!
//! Named references cover the entities that actually occur in Markdown
//! documents; the table is sorted for binary search. Numeric references
//! accept up to seven decimal or six hex digits, with U+0000 and invalid
//! scalar values replaced by U+FFFD.

/// Sorted `(name, replacement)` pairs, without the `&` and `;`.
const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("AElig", "\u{c6}"),
    ("AMP", "&"),
    ("Aacute", "\u{c1}"),
    ("Acirc", "\u{c2}"),
    ("Agrave", "\u{c0}"),
    ("Aring", "\u{c5}"),
    ("Atilde", "\u{c3}"),
    ("Auml", "\u{c4}"),
    ("COPY", "\u{a9}"),
    ("Ccedil", "\u{c7}"),
    ("Dagger", "\u{2021}"),
    ("ETH", "\u{d0}"),
    ("Eacute", "\u{c9}"),
    ("Ecirc", "\u{ca}"),
    ("Egrave", "\u{c8}"),
    ("Euml", "\u{cb}"),
    ("GT", ">"),
    ("Iacute", "\u{cd}"),
    ("Icirc", "\u{ce}"),
    ("Igrave", "\u{cc}"),
    ("Iuml", "\u{cf}"),
    ("LT", "<"),
    ("Ntilde", "\u{d1}"),
    ("OElig", "\u{152}"),
    ("Oacute", "\u{d3}"),
    ("Ocirc", "\u{d4}"),
    ("Ograve", "\u{d2}"),
    ("Oslash", "\u{d8}"),
    ("Otilde", "\u{d5}"),
    ("Ouml", "\u{d6}"),
    ("QUOT", "\""),
    ("REG", "\u{ae}"),
    ("Scaron", "\u{160}"),
    ("THORN", "\u{de}"),
    ("Uacute", "\u{da}"),
    ("Ucirc", "\u{db}"),
    ("Ugrave", "\u{d9}"),
    ("Uuml", "\u{dc}"),
    ("Yacute", "\u{dd}"),
    ("aacute", "\u{e1}"),
    ("acirc", "\u{e2}"),
    ("acute", "\u{b4}"),
    ("aelig", "\u{e6}"),
    ("agrave", "\u{e0}"),
    ("alpha", "\u{3b1}"),
    ("amp", "&"),
    ("aring", "\u{e5}"),
    ("asymp", "\u{2248}"),
    ("atilde", "\u{e3}"),
    ("auml", "\u{e4}"),
    ("bdquo", "\u{201e}"),
    ("beta", "\u{3b2}"),
    ("brvbar", "\u{a6}"),
    ("bull", "\u{2022}"),
    ("ccedil", "\u{e7}"),
    ("cedil", "\u{b8}"),
    ("cent", "\u{a2}"),
    ("copy", "\u{a9}"),
    ("curren", "\u{a4}"),
    ("dagger", "\u{2020}"),
    ("darr", "\u{2193}"),
    ("deg", "\u{b0}"),
    ("delta", "\u{3b4}"),
    ("divide", "\u{f7}"),
    ("eacute", "\u{e9}"),
    ("ecirc", "\u{ea}"),
    ("egrave", "\u{e8}"),
    ("emsp", "\u{2003}"),
    ("ensp", "\u{2002}"),
    ("epsilon", "\u{3b5}"),
    ("eth", "\u{f0}"),
    ("euml", "\u{eb}"),
    ("euro", "\u{20ac}"),
    ("frac12", "\u{bd}"),
    ("frac14", "\u{bc}"),
    ("frac34", "\u{be}"),
    ("ge", "\u{2265}"),
    ("gt", ">"),
    ("harr", "\u{2194}"),
    ("hellip", "\u{2026}"),
    ("iacute", "\u{ed}"),
    ("icirc", "\u{ee}"),
    ("iexcl", "\u{a1}"),
    ("igrave", "\u{ec}"),
    ("infin", "\u{221e}"),
    ("iquest", "\u{bf}"),
    ("iuml", "\u{ef}"),
    ("laquo", "\u{ab}"),
    ("larr", "\u{2190}"),
    ("ldquo", "\u{201c}"),
    ("le", "\u{2264}"),
    ("lsquo", "\u{2018}"),
    ("lt", "<"),
    ("mdash", "\u{2014}"),
    ("micro", "\u{b5}"),
    ("middot", "\u{b7}"),
    ("nbsp", "\u{a0}"),
    ("ndash", "\u{2013}"),
    ("ne", "\u{2260}"),
    ("ntilde", "\u{f1}"),
    ("oacute", "\u{f3}"),
    ("ocirc", "\u{f4}"),
    ("oelig", "\u{153}"),
    ("ograve", "\u{f2}"),
    ("oslash", "\u{f8}"),
    ("otilde", "\u{f5}"),
    ("ouml", "\u{f6}"),
    ("para", "\u{b6}"),
    ("plusmn", "\u{b1}"),
    ("pound", "\u{a3}"),
    ("quot", "\""),
    ("raquo", "\u{bb}"),
    ("rarr", "\u{2192}"),
    ("rdquo", "\u{201d}"),
    ("reg", "\u{ae}"),
    ("rsquo", "\u{2019}"),
    ("scaron", "\u{161}"),
    ("sect", "\u{a7}"),
    ("shy", "\u{ad}"),
    ("sup1", "\u{b9}"),
    ("sup2", "\u{b2}"),
    ("sup3", "\u{b3}"),
    ("szlig", "\u{df}"),
    ("thorn", "\u{fe}"),
    ("tilde", "\u{2dc}"),
    ("times", "\u{d7}"),
    ("trade", "\u{2122}"),
    ("uacute", "\u{fa}"),
    ("uarr", "\u{2191}"),
    ("ucirc", "\u{fb}"),
    ("ugrave", "\u{f9}"),
    ("uuml", "\u{fc}"),
    ("yacute", "\u{fd}"),
    ("yen", "\u{a5}"),
    ("yuml", "\u{ff}"),
];

fn lookup(name: &str) -> Option<&'static str> {
    NAMED_ENTITIES
        .binary_search_by(|(n, _)| (*n).cmp(name))
        .ok()
        .map(|i| NAMED_ENTITIES[i].1)
}

/// Parse an entity or character reference starting at the `&` at byte
/// `start`. Returns the replacement text and the number of bytes consumed.
pub(crate) fn parse_entity(input: &str, start: usize) -> Option<(String, usize)> {
    let bytes = input.as_bytes();
    if bytes.get(start) != Some(&b'&') {
        return None;
    }

    if bytes.get(start + 1) == Some(&b'#') {
        let hex = matches!(bytes.get(start + 2), Some(b'x' | b'X'));
        let digits_start = start + if hex { 3 } else { 2 };
        let max_digits = if hex { 6 } else { 7 };
        let mut i = digits_start;
        let mut value: u32 = 0;
        while i < bytes.len() && i - digits_start < max_digits {
            let d = match (bytes[i], hex) {
                (b @ b'0'..=b'9', _) => (b - b'0') as u32,
                (b @ b'a'..=b'f', true) => (b - b'a' + 10) as u32,
                (b @ b'A'..=b'F', true) => (b - b'A' + 10) as u32,
                _ => break,
            };
            value = value * if hex { 16 } else { 10 } + d;
            i += 1;
        }
        if i == digits_start || bytes.get(i) != Some(&b';') {
            return None;
        }
        let ch = match char::from_u32(value) {
            Some(c) if value != 0 => c,
            _ => '\u{fffd}',
        };
        return Some((ch.to_string(), i + 1 - start));
    }

    let mut i = start + 1;
    while i < bytes.len() && bytes[i].is_ascii_alphanumeric() && i - start <= 32 {
        i += 1;
    }
    if i == start + 1 || bytes.get(i) != Some(&b';') {
        return None;
    }
    lookup(&input[start + 1..i]).map(|replacement| (replacement.to_string(), i + 1 - start))
}

/// Resolve backslash escapes and entity references in a span of raw text.
/// Used for destinations, titles, and code-fence info strings.
pub(crate) fn resolve_entities_and_escapes(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if i + 1 < bytes.len() && crate::is_ascii_punctuation(bytes[i + 1]) => {
                out.push(bytes[i + 1] as char);
                i += 2;
            }
            b'&' => {
                if let Some((replacement, used)) = parse_entity(input, i) {
                    out.push_str(&replacement);
                    i += used;
                } else {
                    out.push('&');
                    i += 1;
                }
            }
            _ => {
                let len = crate::utf8_char_len(bytes[i]);
                out.push_str(&input[i..i + len]);
                i += len;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted() {
        for pair in NAMED_ENTITIES.windows(2) {
            assert!(pair[0].0 < pair[1].0, "{} vs {}", pair[0].0, pair[1].0);
        }
    }

    #[test]
    fn named_references() {
        assert_eq!(parse_entity("&amp;", 0), Some(("&".to_string(), 5)));
        assert_eq!(parse_entity("&AMP;", 0), Some(("&".to_string(), 5)));
        assert_eq!(parse_entity("&nbsp;x", 0), Some(("\u{a0}".to_string(), 6)));
        assert_eq!(parse_entity("&nosuch;", 0), None);
        assert_eq!(parse_entity("&amp", 0), None);
    }

    #[test]
    fn numeric_references() {
        assert_eq!(parse_entity("&#35;", 0), Some(("#".to_string(), 5)));
        assert_eq!(parse_entity("&#x22;", 0), Some(("\"".to_string(), 6)));
        assert_eq!(parse_entity("&#X22;", 0), Some(("\"".to_string(), 6)));
        // Null and invalid scalars become the replacement character.
        assert_eq!(parse_entity("&#0;", 0), Some(("\u{fffd}".to_string(), 4)));
        assert_eq!(
            parse_entity("&#xD800;", 0),
            Some(("\u{fffd}".to_string(), 8))
        );
        assert_eq!(parse_entity("&#;", 0), None);
        assert_eq!(parse_entity("&#12345678;", 0), None);
    }

    #[test]
    fn escapes_and_entities_resolve_together() {
        assert_eq!(resolve_entities_and_escapes(r"a\*b"), "a*b");
        assert_eq!(resolve_entities_and_escapes(r"a\qb"), r"a\qb");
        assert_eq!(resolve_entities_and_escapes("x &amp; y"), "x & y");
        assert_eq!(resolve_entities_and_escapes("no &entity here"), "no &entity here");
    }
}
