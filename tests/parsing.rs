//! Block-structure behavior through the public API.

use vellum::{Block, InlineContent, ListKind, ParserConfig, parse_to_document};

fn blocks(input: &str) -> Vec<Block> {
    parse_to_document(input, &ParserConfig::default())
        .unwrap()
        .children()
        .to_vec()
}

fn inline_text(content: &InlineContent) -> String {
    content
        .inlines()
        .iter()
        .map(|inline| match inline {
            vellum::Inline::Text(t) => t.clone(),
            vellum::Inline::SoftBreak => "\n".to_string(),
            other => format!("{other:?}"),
        })
        .collect()
}

#[test]
fn document_structure_survives_mixed_blocks() {
    let blocks = blocks("# Title\n\nIntro paragraph.\n\n> A quote\n> spanning lines.\n\n---\n");
    assert_eq!(blocks.len(), 4);
    assert!(matches!(blocks[0], Block::Heading { level: 1, .. }));
    assert!(matches!(blocks[1], Block::Paragraph { .. }));
    assert!(matches!(blocks[2], Block::BlockQuote { .. }));
    assert!(matches!(blocks[3], Block::ThematicBreak { .. }));
}

#[test]
fn lazy_continuation_extends_quoted_paragraph() {
    let blocks = blocks("> first\nsecond\n");
    let Block::BlockQuote { children, .. } = &blocks[0] else {
        panic!("expected block quote");
    };
    let Block::Paragraph { content, .. } = &children[0] else {
        panic!("expected paragraph");
    };
    assert_eq!(inline_text(content), "first\nsecond");
}

#[test]
fn quote_marker_ends_laziness() {
    let blocks = blocks("> a\n> > b\n");
    let Block::BlockQuote { children, .. } = &blocks[0] else {
        panic!();
    };
    assert_eq!(children.len(), 2);
    assert!(matches!(children[1], Block::BlockQuote { .. }));
}

#[test]
fn ordered_marker_continues_its_own_list_but_not_a_paragraph() {
    // Inside a list, `2.` starts the next item even though it could not
    // interrupt a plain paragraph.
    let parsed = blocks("1. a\n2. b\n");
    let Block::List { kind, start, children, .. } = &parsed[0] else {
        panic!();
    };
    assert_eq!(*kind, ListKind::Ordered(b'.'));
    assert_eq!(*start, 1);
    assert_eq!(children.len(), 2);

    let parsed = blocks("para\n2. b\n");
    assert_eq!(parsed.len(), 1);
    assert!(matches!(parsed[0], Block::Paragraph { .. }));
}

#[test]
fn tight_list_with_internal_blank_goes_loose() {
    let Block::List { tight, .. } = &blocks("- a\n- b\n")[0] else {
        panic!();
    };
    assert!(*tight);

    let Block::List { tight, .. } = &blocks("- a\n\n- b\n")[0] else {
        panic!();
    };
    assert!(!*tight);

    // A blank line after the final item does not count.
    let parsed = blocks("- a\n- b\n\nafter\n");
    let Block::List { tight, .. } = &parsed[0] else {
        panic!();
    };
    assert!(*tight);
}

#[test]
fn list_item_indentation_nests_content() {
    let parsed = blocks("- outer\n\n      indented code\n");
    let Block::List { children, .. } = &parsed[0] else {
        panic!();
    };
    let Block::ListItem { children, .. } = &children[0] else {
        panic!();
    };
    assert_eq!(children.len(), 2);
    assert!(matches!(
        children[1],
        Block::CodeBlock { fenced: false, .. }
    ));
}

#[test]
fn fenced_code_inside_quote_needs_the_quote_prefix() {
    let parsed = blocks("> ```\n> inside\n> ```\n");
    let Block::BlockQuote { children, .. } = &parsed[0] else {
        panic!();
    };
    let Block::CodeBlock { literal, .. } = &children[0] else {
        panic!();
    };
    assert_eq!(literal, "inside\n");
}

#[test]
fn fence_indent_is_stripped_from_content() {
    let parsed = blocks("  ```\n    two kept\n  ```\n");
    let Block::CodeBlock { literal, .. } = &parsed[0] else {
        panic!();
    };
    assert_eq!(literal, "  two kept\n");
}

#[test]
fn unterminated_fence_runs_to_end_of_input_when_lenient() {
    let parsed = blocks("```\nrest of file\n");
    let Block::CodeBlock { literal, fenced, .. } = &parsed[0] else {
        panic!();
    };
    assert!(fenced);
    assert_eq!(literal, "rest of file\n");
}

#[test]
fn setext_heading_needs_a_paragraph_above() {
    let parsed = blocks("heading\n===\n");
    assert!(matches!(
        parsed[0],
        Block::Heading { level: 1, setext: true, .. }
    ));

    let parsed = blocks("===\n");
    assert!(matches!(parsed[0], Block::Paragraph { .. }));
}

#[test]
fn tabs_count_to_the_next_stop_of_four() {
    let parsed = blocks("\tcode\n");
    assert!(matches!(parsed[0], Block::CodeBlock { fenced: false, .. }));

    let parsed = blocks("  - a\n\tb\n");
    // The tab reaches column 4, enough to continue the item content.
    let Block::List { children, .. } = &parsed[0] else {
        panic!();
    };
    let Block::ListItem { children, .. } = &children[0] else {
        panic!();
    };
    let Block::Paragraph { content, .. } = &children[0] else {
        panic!();
    };
    assert_eq!(inline_text(content), "a\nb");
}

#[test]
fn empty_list_item_is_allowed() {
    let parsed = blocks("- a\n-\n- c\n");
    let Block::List { children, .. } = &parsed[0] else {
        panic!();
    };
    assert_eq!(children.len(), 3);
    let Block::ListItem { children, .. } = &children[1] else {
        panic!();
    };
    assert!(children.is_empty());
}

#[test]
fn reference_definition_paragraph_leaves_no_node() {
    let parsed = blocks("[a]: /one\n[b]: /two\n");
    assert!(parsed.is_empty());
}
