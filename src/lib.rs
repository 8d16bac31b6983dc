//! Markdown parsing to a typed syntax tree, with rendering kept separate.
//!
//! The parser implements CommonMark block and inline structure plus the
//! GitHub extensions (tables, task lists, strikethrough, autolinks), which
//! are on by default and can be disabled wholesale or per extension through
//! [`ParserConfig`]. Parsing runs in two phases: block structure first,
//! collecting link-reference definitions from the whole document, then
//! inline resolution, so references may be defined after their use.
//!
//! Malformed constructs never fail a parse in the default lenient mode;
//! they fall back to literal text the way Markdown always has. Errors are
//! reserved for resource protection (nesting depth, wall-clock budget,
//! stalled progress) and, in strict mode, for constructs worth flagging.
//!
//! ```
//! use vellum::{HtmlRenderer, ParserConfig, Renderer};
//!
//! let doc = vellum::parse_to_document("# Title\n\nSome *text*.\n", &ParserConfig::default())?;
//! let html = HtmlRenderer::new().render(&doc)?;
//! assert!(html.contains("<h1>Title</h1>"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod ast;
pub mod config;
pub mod error;
mod parser;
pub mod render;
pub mod tokenizer;

pub use ast::{Block, Document, Inline, InlineContent, ListKind, Span, TableAlignment, TableData};
pub use config::{Extensions, ParserConfig};
pub use error::{ParseError, RenderError};
pub use render::{HtmlRenderer, Renderer};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Parse a Markdown document into its syntax tree.
///
/// Line endings are normalized to `\n` first; column and offset positions
/// reported with `track_source_locations` refer to the normalized text.
pub fn parse_to_document(input: &str, config: &ParserConfig) -> Result<Document, ParseError> {
    #[cfg(debug_assertions)]
    {
        init_logger();
    }

    let normalized = input.replace("\r\n", "\n");
    parser::parse_document(&normalized, config)
}

pub(crate) fn is_ascii_punctuation(b: u8) -> bool {
    matches!(b,
        b'!'..=b'/' | b':'..=b'@' | b'['..=b'`' | b'{'..=b'~')
}

/// Length in bytes of the UTF-8 character starting with this byte.
pub(crate) fn utf8_char_len(b: u8) -> usize {
    match b {
        0x00..=0x7f => 1,
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        _ => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_small_document() {
        let doc = parse_to_document("# h\n\ntext\n", &ParserConfig::default()).unwrap();
        assert_eq!(doc.children().len(), 2);
    }

    #[test]
    fn empty_input_is_an_empty_document() {
        let doc = parse_to_document("", &ParserConfig::default()).unwrap();
        assert!(doc.children().is_empty());
    }

    #[test]
    fn crlf_input_parses_like_lf() {
        let unix = parse_to_document("a\n\nb\n", &ParserConfig::default()).unwrap();
        let dos = parse_to_document("a\r\n\r\nb\r\n", &ParserConfig::default()).unwrap();
        assert_eq!(unix, dos);
    }

    #[test]
    fn punctuation_classifier_matches_ascii() {
        for b in 0u8..=127 {
            assert_eq!(is_ascii_punctuation(b), (b as char).is_ascii_punctuation());
        }
    }
}
