//! Rendering: the [`Renderer`] contract and the reference HTML renderer.
//!
//! Rendering is a pure function of the document and the renderer's
//! configuration, so rendering the same tree twice gives identical output.

use crate::ast::{Block, Document, Inline, InlineContent, ListKind, TableAlignment};
use crate::error::RenderError;

/// An output backend for parsed documents.
///
/// `render` walks the whole document. `render_block` and `render_inline`
/// handle one node each and default to declining it, so a partial
/// renderer only overrides the kinds it supports and everything else
/// surfaces as [`RenderError::UnsupportedNode`].
pub trait Renderer {
    type Output;

    fn render(&mut self, document: &Document) -> Result<Self::Output, RenderError>;

    fn render_block(&mut self, block: &Block, out: &mut Self::Output) -> Result<(), RenderError> {
        let _ = out;
        Err(RenderError::UnsupportedNode {
            kind: block.kind_name(),
        })
    }

    fn render_inline(
        &mut self,
        inline: &Inline,
        out: &mut Self::Output,
    ) -> Result<(), RenderError> {
        let _ = out;
        Err(RenderError::UnsupportedNode {
            kind: inline.kind_name(),
        })
    }
}

/// The reference HTML renderer.
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer {
    base_url: Option<String>,
    escape_raw_html: bool,
    /// Extra attributes per node kind, in insertion order.
    attributes: Vec<(&'static str, String, String)>,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative link and image destinations against this base.
    pub fn base_url(mut self, base: impl Into<String>) -> Self {
        self.base_url = Some(base.into());
        self
    }

    /// Escape raw HTML blocks and inline HTML instead of passing them
    /// through.
    pub fn escape_raw_html(mut self, escape: bool) -> Self {
        self.escape_raw_html = escape;
        self
    }

    /// Inject an attribute on every element produced for the given node
    /// kind (as named by [`Block::kind_name`] or [`Inline::kind_name`]).
    pub fn attribute(
        mut self,
        kind: &'static str,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.attributes.push((kind, name.into(), value.into()));
        self
    }

    fn push_attrs(&self, out: &mut String, kind: &'static str) {
        for (target, name, value) in &self.attributes {
            if *target == kind {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_html_into(out, value);
                out.push('"');
            }
        }
    }

    /// `<tag injected-attrs` with the tag left open for more attributes.
    fn open_tag(&self, out: &mut String, tag: &str, kind: &'static str) {
        out.push('<');
        out.push_str(tag);
        self.push_attrs(out, kind);
    }

    fn resolve_destination(&self, out: &mut String, destination: &str) {
        if let Some(base) = &self.base_url {
            if !has_scheme(destination) && !destination.starts_with("//") {
                let mut joined = String::with_capacity(base.len() + destination.len());
                joined.push_str(base.trim_end_matches('/'));
                if !destination.starts_with('/') {
                    joined.push('/');
                }
                joined.push_str(destination);
                escape_href_into(out, &joined);
                return;
            }
        }
        escape_href_into(out, destination);
    }

    fn write_blocks(&self, blocks: &[Block], out: &mut String, tight: bool) -> Result<(), RenderError> {
        for block in blocks {
            self.write_block(block, out, tight)?;
        }
        Ok(())
    }

    fn write_block(&self, block: &Block, out: &mut String, tight: bool) -> Result<(), RenderError> {
        match block {
            Block::Document { children, .. } => self.write_blocks(children, out, false),

            Block::Paragraph { content, .. } => {
                if tight {
                    self.write_content(content, out)?;
                    Ok(())
                } else {
                    self.open_tag(out, "p", block.kind_name());
                    out.push('>');
                    self.write_content(content, out)?;
                    out.push_str("</p>\n");
                    Ok(())
                }
            }

            Block::Heading { level, content, .. } => {
                let tag = format!("h{level}");
                self.open_tag(out, &tag, block.kind_name());
                out.push('>');
                self.write_content(content, out)?;
                out.push_str("</");
                out.push_str(&tag);
                out.push_str(">\n");
                Ok(())
            }

            Block::BlockQuote { children, .. } => {
                self.open_tag(out, "blockquote", block.kind_name());
                out.push_str(">\n");
                self.write_blocks(children, out, false)?;
                out.push_str("</blockquote>\n");
                Ok(())
            }

            Block::List {
                kind,
                start,
                tight,
                children,
                ..
            } => {
                let tag = if kind.is_ordered() { "ol" } else { "ul" };
                self.open_tag(out, tag, block.kind_name());
                if let ListKind::Ordered(_) = kind {
                    if *start != 1 {
                        out.push_str(&format!(" start=\"{start}\""));
                    }
                }
                out.push_str(">\n");
                self.write_blocks(children, out, *tight)?;
                out.push_str("</");
                out.push_str(tag);
                out.push_str(">\n");
                Ok(())
            }

            Block::ListItem {
                checked, children, ..
            } => {
                self.open_tag(out, "li", block.kind_name());
                out.push('>');
                // Task items always render compactly, checkbox first.
                let tight = tight || checked.is_some();
                if let Some(checked) = checked {
                    out.push_str("<input type=\"checkbox\" disabled=\"\"");
                    if *checked {
                        out.push_str(" checked=\"\"");
                    }
                    out.push_str(" /> ");
                }
                if !tight {
                    out.push('\n');
                }
                for child in children {
                    if tight && !matches!(child, Block::Paragraph { .. }) && !out.ends_with('\n') {
                        out.push('\n');
                    }
                    self.write_block(child, out, tight)?;
                }
                out.push_str("</li>\n");
                Ok(())
            }

            Block::CodeBlock {
                language, literal, ..
            } => {
                self.open_tag(out, "pre", block.kind_name());
                out.push_str("><code");
                if let Some(language) = language {
                    out.push_str(" class=\"language-");
                    escape_html_into(out, language);
                    out.push('"');
                }
                out.push('>');
                escape_html_into(out, literal);
                out.push_str("</code></pre>\n");
                Ok(())
            }

            Block::HtmlBlock { literal, .. } => {
                if self.escape_raw_html {
                    escape_html_into(out, literal);
                } else {
                    out.push_str(literal);
                }
                out.push('\n');
                Ok(())
            }

            Block::ThematicBreak { .. } => {
                self.open_tag(out, "hr", block.kind_name());
                out.push_str(" />\n");
                Ok(())
            }

            Block::Table { data, .. } => {
                self.open_tag(out, "table", block.kind_name());
                out.push_str(">\n<thead>\n<tr>\n");
                for (cell, alignment) in data.header.iter().zip(&data.alignments) {
                    out.push_str("<th");
                    push_alignment(out, *alignment);
                    out.push('>');
                    self.write_content(cell, out)?;
                    out.push_str("</th>\n");
                }
                out.push_str("</tr>\n</thead>\n");
                if !data.rows.is_empty() {
                    out.push_str("<tbody>\n");
                    for row in &data.rows {
                        out.push_str("<tr>\n");
                        for (cell, alignment) in row.iter().zip(&data.alignments) {
                            out.push_str("<td");
                            push_alignment(out, *alignment);
                            out.push('>');
                            self.write_content(cell, out)?;
                            out.push_str("</td>\n");
                        }
                        out.push_str("</tr>\n");
                    }
                    out.push_str("</tbody>\n");
                }
                out.push_str("</table>\n");
                Ok(())
            }
        }
    }

    fn write_content(&self, content: &InlineContent, out: &mut String) -> Result<(), RenderError> {
        self.write_inlines(content.inlines(), out)
    }

    fn write_inlines(&self, inlines: &[Inline], out: &mut String) -> Result<(), RenderError> {
        for inline in inlines {
            self.write_inline(inline, out)?;
        }
        Ok(())
    }

    fn write_inline(&self, inline: &Inline, out: &mut String) -> Result<(), RenderError> {
        match inline {
            Inline::Text(text) => {
                escape_html_into(out, text);
                Ok(())
            }

            Inline::CodeSpan(code) => {
                self.open_tag(out, "code", inline.kind_name());
                out.push('>');
                escape_html_into(out, code);
                out.push_str("</code>");
                Ok(())
            }

            Inline::Html(html) => {
                if self.escape_raw_html {
                    escape_html_into(out, html);
                } else {
                    out.push_str(html);
                }
                Ok(())
            }

            Inline::Emphasis(children) => {
                self.open_tag(out, "em", inline.kind_name());
                out.push('>');
                self.write_inlines(children, out)?;
                out.push_str("</em>");
                Ok(())
            }

            Inline::Strong(children) => {
                self.open_tag(out, "strong", inline.kind_name());
                out.push('>');
                self.write_inlines(children, out)?;
                out.push_str("</strong>");
                Ok(())
            }

            Inline::Strikethrough(children) => {
                self.open_tag(out, "del", inline.kind_name());
                out.push('>');
                self.write_inlines(children, out)?;
                out.push_str("</del>");
                Ok(())
            }

            Inline::Link {
                destination,
                title,
                children,
            } => {
                self.open_tag(out, "a", inline.kind_name());
                out.push_str(" href=\"");
                self.resolve_destination(out, destination);
                out.push('"');
                if let Some(title) = title {
                    out.push_str(" title=\"");
                    escape_html_into(out, title);
                    out.push('"');
                }
                out.push('>');
                self.write_inlines(children, out)?;
                out.push_str("</a>");
                Ok(())
            }

            Inline::Image {
                destination,
                title,
                children,
            } => {
                self.open_tag(out, "img", inline.kind_name());
                out.push_str(" src=\"");
                self.resolve_destination(out, destination);
                out.push_str("\" alt=\"");
                let mut alt = String::new();
                plain_text_into(children, &mut alt);
                escape_html_into(out, &alt);
                out.push('"');
                if let Some(title) = title {
                    out.push_str(" title=\"");
                    escape_html_into(out, title);
                    out.push('"');
                }
                out.push_str(" />");
                Ok(())
            }

            Inline::Autolink { url, email } => {
                self.open_tag(out, "a", inline.kind_name());
                out.push_str(" href=\"");
                if *email {
                    out.push_str("mailto:");
                    escape_href_into(out, url);
                } else if url.starts_with("www.") {
                    out.push_str("http://");
                    escape_href_into(out, url);
                } else {
                    escape_href_into(out, url);
                }
                out.push_str("\">");
                escape_html_into(out, url);
                out.push_str("</a>");
                Ok(())
            }

            Inline::HardBreak => {
                out.push_str("<br />\n");
                Ok(())
            }

            Inline::SoftBreak => {
                out.push('\n');
                Ok(())
            }
        }
    }
}

impl Renderer for HtmlRenderer {
    type Output = String;

    fn render(&mut self, document: &Document) -> Result<String, RenderError> {
        let mut out = String::new();
        self.write_block(document.root(), &mut out, false)?;
        Ok(out)
    }

    fn render_block(&mut self, block: &Block, out: &mut String) -> Result<(), RenderError> {
        self.write_block(block, out, false)
    }

    fn render_inline(&mut self, inline: &Inline, out: &mut String) -> Result<(), RenderError> {
        self.write_inline(inline, out)
    }
}

fn push_alignment(out: &mut String, alignment: TableAlignment) {
    match alignment {
        TableAlignment::None => {}
        TableAlignment::Left => out.push_str(" align=\"left\""),
        TableAlignment::Center => out.push_str(" align=\"center\""),
        TableAlignment::Right => out.push_str(" align=\"right\""),
    }
}

/// The text an image's description collapses to in its `alt` attribute.
fn plain_text_into(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text(text) | Inline::CodeSpan(text) => out.push_str(text),
            Inline::Emphasis(children)
            | Inline::Strong(children)
            | Inline::Strikethrough(children) => plain_text_into(children, out),
            Inline::Link { children, .. } | Inline::Image { children, .. } => {
                plain_text_into(children, out)
            }
            Inline::Autolink { url, .. } => out.push_str(url),
            Inline::SoftBreak | Inline::HardBreak => out.push(' '),
            Inline::Html(_) => {}
        }
    }
}

fn has_scheme(url: &str) -> bool {
    let bytes = url.as_bytes();
    let Some(colon) = bytes.iter().position(|&b| b == b':') else {
        return false;
    };
    colon > 0
        && bytes[0].is_ascii_alphabetic()
        && bytes[..colon]
            .iter()
            .all(|&b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'.' | b'-'))
}

pub(crate) fn escape_html_into(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

/// Bytes safe to leave as-is inside an `href` value.
fn href_safe(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'-' | b'_' | b'.' | b'~' | b'/' | b'?' | b'#' | b'@' | b'!' | b'$' | b'(' | b')'
                | b'*' | b'+' | b',' | b';' | b':' | b'=' | b'%' | b'[' | b']'
        )
}

pub(crate) fn escape_href_into(out: &mut String, url: &str) {
    for &b in url.as_bytes() {
        match b {
            b'&' => out.push_str("&amp;"),
            b'\'' => out.push_str("%27"),
            b'"' => out.push_str("%22"),
            _ if href_safe(b) => out.push(b as char),
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::parse_to_document;

    fn html(input: &str) -> String {
        let doc = parse_to_document(input, &ParserConfig::default()).unwrap();
        HtmlRenderer::new().render(&doc).unwrap()
    }

    #[test]
    fn paragraphs_and_emphasis() {
        assert_eq!(html("*a* **b**\n"), "<p><em>a</em> <strong>b</strong></p>\n");
    }

    #[test]
    fn headings() {
        assert_eq!(html("## two\n"), "<h2>two</h2>\n");
        assert_eq!(html("one\n===\n"), "<h1>one</h1>\n");
    }

    #[test]
    fn text_is_escaped() {
        assert_eq!(html("a < b & c\n"), "<p>a &lt; b &amp; c</p>\n");
    }

    #[test]
    fn code_blocks() {
        assert_eq!(
            html("```rust\nlet x = 1 < 2;\n```\n"),
            "<pre><code class=\"language-rust\">let x = 1 &lt; 2;\n</code></pre>\n"
        );
        assert_eq!(html("    tab\n"), "<pre><code>tab\n</code></pre>\n");
    }

    #[test]
    fn tight_list_omits_paragraph_tags() {
        assert_eq!(
            html("- a\n- b\n"),
            "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n"
        );
    }

    #[test]
    fn loose_list_keeps_paragraph_tags() {
        assert_eq!(
            html("- a\n\n- b\n"),
            "<ul>\n<li>\n<p>a</p>\n</li>\n<li>\n<p>b</p>\n</li>\n</ul>\n"
        );
    }

    #[test]
    fn ordered_list_start() {
        assert_eq!(
            html("3. a\n4. b\n"),
            "<ol start=\"3\">\n<li>a</li>\n<li>b</li>\n</ol>\n"
        );
    }

    #[test]
    fn nested_list_in_tight_item() {
        assert_eq!(
            html("- a\n  - b\n"),
            "<ul>\n<li>a\n<ul>\n<li>b</li>\n</ul>\n</li>\n</ul>\n"
        );
    }

    #[test]
    fn task_list_checkboxes() {
        assert_eq!(
            html("- [x] done\n- [ ] todo\n"),
            "<ul>\n<li><input type=\"checkbox\" disabled=\"\" checked=\"\" /> done</li>\n<li><input type=\"checkbox\" disabled=\"\" /> todo</li>\n</ul>\n"
        );
    }

    #[test]
    fn block_quote() {
        assert_eq!(
            html("> quoted\n"),
            "<blockquote>\n<p>quoted</p>\n</blockquote>\n"
        );
    }

    #[test]
    fn links_and_images() {
        assert_eq!(
            html("[t](/u \"ttl\")\n"),
            "<p><a href=\"/u\" title=\"ttl\">t</a></p>\n"
        );
        assert_eq!(
            html("![*alt*](/img.png)\n"),
            "<p><img src=\"/img.png\" alt=\"alt\" /></p>\n"
        );
    }

    #[test]
    fn href_is_percent_escaped() {
        assert_eq!(
            html("[x](/a b)\n"),
            "<p>[x](/a b)</p>\n",
            "unbracketed destination cannot contain spaces"
        );
        assert_eq!(
            html("[x](</a b>)\n"),
            "<p><a href=\"/a%20b\">x</a></p>\n"
        );
    }

    #[test]
    fn base_url_resolves_relative_destinations() {
        let doc = parse_to_document("[a](page)\n[b](/abs)\n[c](https://x.y/)\n", &ParserConfig::default()).unwrap();
        let out = HtmlRenderer::new()
            .base_url("https://docs.example/v1")
            .render(&doc)
            .unwrap();
        assert!(out.contains("href=\"https://docs.example/v1/page\""));
        assert!(out.contains("href=\"https://docs.example/v1/abs\""));
        assert!(out.contains("href=\"https://x.y/\""));
    }

    #[test]
    fn raw_html_toggle() {
        assert_eq!(html("<div>\nx\n</div>\n"), "<div>\nx\n</div>\n");
        let doc = parse_to_document("a <b>c</b>\n", &ParserConfig::default()).unwrap();
        let out = HtmlRenderer::new().escape_raw_html(true).render(&doc).unwrap();
        assert_eq!(out, "<p>a &lt;b&gt;c&lt;/b&gt;</p>\n");
    }

    #[test]
    fn attribute_injection() {
        let doc = parse_to_document("text\n", &ParserConfig::default()).unwrap();
        let out = HtmlRenderer::new()
            .attribute("paragraph", "class", "md")
            .render(&doc)
            .unwrap();
        assert_eq!(out, "<p class=\"md\">text</p>\n");
    }

    #[test]
    fn tables_render_alignment() {
        assert_eq!(
            html("| A | B |\n|---|:-:|\n| 1 | 2 |\n"),
            "<table>\n<thead>\n<tr>\n<th>A</th>\n<th align=\"center\">B</th>\n</tr>\n</thead>\n<tbody>\n<tr>\n<td>1</td>\n<td align=\"center\">2</td>\n</tr>\n</tbody>\n</table>\n"
        );
    }

    #[test]
    fn autolinks_render() {
        assert_eq!(
            html("<https://x.y/?a=b&c>\n"),
            "<p><a href=\"https://x.y/?a=b&amp;c\">https://x.y/?a=b&amp;c</a></p>\n"
        );
        assert_eq!(
            html("mail me@example.org\n"),
            "<p>mail <a href=\"mailto:me@example.org\">me@example.org</a></p>\n"
        );
    }

    #[test]
    fn default_node_rendering_declines_everything() {
        struct Unstarted;

        impl Renderer for Unstarted {
            type Output = String;

            fn render(&mut self, document: &Document) -> Result<String, RenderError> {
                let mut out = String::new();
                for block in document.children() {
                    self.render_block(block, &mut out)?;
                }
                Ok(out)
            }
        }

        let doc = parse_to_document("text\n", &ParserConfig::default()).unwrap();
        let err = Unstarted.render(&doc).unwrap_err();
        assert!(matches!(
            err,
            RenderError::UnsupportedNode { kind: "paragraph" }
        ));
    }

    #[test]
    fn partial_renderer_reports_the_first_unsupported_kind() {
        // Handles paragraphs and leaves every inline to the default.
        struct ParagraphsOnly;

        impl Renderer for ParagraphsOnly {
            type Output = String;

            fn render(&mut self, document: &Document) -> Result<String, RenderError> {
                let mut out = String::new();
                for block in document.children() {
                    self.render_block(block, &mut out)?;
                }
                Ok(out)
            }

            fn render_block(&mut self, block: &Block, out: &mut String) -> Result<(), RenderError> {
                let Block::Paragraph { content, .. } = block else {
                    return Err(RenderError::UnsupportedNode {
                        kind: block.kind_name(),
                    });
                };
                for inline in content.inlines() {
                    self.render_inline(inline, out)?;
                }
                Ok(())
            }
        }

        let doc = parse_to_document("# heading\n", &ParserConfig::default()).unwrap();
        assert!(matches!(
            ParagraphsOnly.render(&doc).unwrap_err(),
            RenderError::UnsupportedNode { kind: "heading" }
        ));

        let doc = parse_to_document("some *emphasis*\n", &ParserConfig::default()).unwrap();
        assert!(matches!(
            ParagraphsOnly.render(&doc).unwrap_err(),
            RenderError::UnsupportedNode { kind: "text" }
        ));
    }

    #[test]
    fn html_renderer_handles_single_nodes() {
        let doc = parse_to_document("*em* text\n", &ParserConfig::default()).unwrap();
        let mut renderer = HtmlRenderer::new();
        let mut out = String::new();
        renderer.render_block(&doc.children()[0], &mut out).unwrap();
        assert_eq!(out, "<p><em>em</em> text</p>\n");
    }

    #[test]
    fn rendering_is_deterministic() {
        let doc = parse_to_document("# h\n\n- [x] a\n- b\n\n> q\n", &ParserConfig::default()).unwrap();
        let mut renderer = HtmlRenderer::new();
        let first = renderer.render(&doc).unwrap();
        let second = renderer.render(&doc).unwrap();
        assert_eq!(first, second);
    }
}
