//! End-to-end HTML output.

use similar_asserts::assert_eq;
use vellum::{HtmlRenderer, ParserConfig, Renderer, parse_to_document};

fn html(input: &str) -> String {
    let doc = parse_to_document(input, &ParserConfig::default()).unwrap();
    HtmlRenderer::new().render(&doc).unwrap()
}

#[test]
fn small_document() {
    let input = "\
# Notes

Some *text* with a [link](/here).

- first
- second
";
    let expected = "\
<h1>Notes</h1>
<p>Some <em>text</em> with a <a href=\"/here\">link</a>.</p>
<ul>
<li>first</li>
<li>second</li>
</ul>
";
    assert_eq!(html(input), expected);
}

#[test]
fn quoted_list_with_code() {
    let input = "\
> tip:
>
> - run `make`
";
    let expected = "\
<blockquote>
<p>tip:</p>
<ul>
<li>run <code>make</code></li>
</ul>
</blockquote>
";
    assert_eq!(html(input), expected);
}

#[test]
fn loose_versus_tight_output() {
    assert_eq!(
        html("- a\n- b\n"),
        "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n"
    );
    assert_eq!(
        html("- a\n\n- b\n"),
        "<ul>\n<li>\n<p>a</p>\n</li>\n<li>\n<p>b</p>\n</li>\n</ul>\n"
    );
}

#[test]
fn table_output_with_alignment() {
    let input = "| L | C |\n|:--|:-:|\n| 1 | 2 |\n";
    let expected = "\
<table>
<thead>
<tr>
<th align=\"left\">L</th>
<th align=\"center\">C</th>
</tr>
</thead>
<tbody>
<tr>
<td align=\"left\">1</td>
<td align=\"center\">2</td>
</tr>
</tbody>
</table>
";
    assert_eq!(html(input), expected);
}

#[test]
fn task_items_render_checkboxes() {
    assert_eq!(
        html("- [x] ship\n- [ ] docs\n"),
        "<ul>\n<li><input type=\"checkbox\" disabled=\"\" checked=\"\" /> ship</li>\n\
         <li><input type=\"checkbox\" disabled=\"\" /> docs</li>\n</ul>\n"
    );
}

#[test]
fn strikethrough_and_autolink_output() {
    assert_eq!(
        html("~~old~~ see www.example.org\n"),
        "<p><del>old</del> see <a href=\"http://www.example.org\">www.example.org</a></p>\n"
    );
}

#[test]
fn raw_html_escaping_toggle() {
    let doc = parse_to_document("<div class=\"x\">\nkeep\n</div>\n", &ParserConfig::default()).unwrap();
    assert_eq!(
        HtmlRenderer::new().render(&doc).unwrap(),
        "<div class=\"x\">\nkeep\n</div>\n"
    );
    assert_eq!(
        HtmlRenderer::new().escape_raw_html(true).render(&doc).unwrap(),
        "&lt;div class=&quot;x&quot;&gt;\nkeep\n&lt;/div&gt;\n"
    );
}

#[test]
fn base_url_only_touches_relative_links() {
    let doc = parse_to_document(
        "[rel](guide.md) ![i](img/a.png) [abs](https://other.example/)\n",
        &ParserConfig::default(),
    )
    .unwrap();
    let out = HtmlRenderer::new()
        .base_url("https://docs.example/book/")
        .render(&doc)
        .unwrap();
    assert_eq!(
        out,
        "<p><a href=\"https://docs.example/book/guide.md\">rel</a> \
         <img src=\"https://docs.example/book/img/a.png\" alt=\"i\" /> \
         <a href=\"https://other.example/\">abs</a></p>\n"
    );
}

#[test]
fn attribute_injection_hits_every_matching_node() {
    let doc = parse_to_document("a\n\nb\n", &ParserConfig::default()).unwrap();
    let out = HtmlRenderer::new()
        .attribute("paragraph", "class", "prose")
        .attribute("paragraph", "data-md", "1")
        .render(&doc)
        .unwrap();
    assert_eq!(
        out,
        "<p class=\"prose\" data-md=\"1\">a</p>\n<p class=\"prose\" data-md=\"1\">b</p>\n"
    );
}

#[test]
fn double_render_is_identical() {
    let input = "# t\n\n| a |\n|---|\n\n- [ ] x\n\n```r\ncode\n```\n";
    let doc = parse_to_document(input, &ParserConfig::default()).unwrap();
    let mut renderer = HtmlRenderer::new();
    assert_eq!(renderer.render(&doc).unwrap(), renderer.render(&doc).unwrap());
}
