//! Resource protection and strict-mode behavior on hostile or malformed
//! input.

use vellum::{Block, ParseError, ParserConfig, parse_to_document};

#[test]
fn ten_thousand_nested_quotes_fail_fast() {
    let input = "> ".repeat(10_000) + "deep";
    let err = parse_to_document(&input, &ParserConfig::default()).unwrap_err();
    match err {
        ParseError::NestingTooDeep { depth, limit, line } => {
            assert_eq!(limit, 100);
            assert_eq!(depth, 101);
            assert_eq!(line, 1);
        }
        other => panic!("expected nesting error, got {other:?}"),
    }
}

#[test]
fn nesting_limit_applies_to_list_depth_too() {
    let mut input = String::new();
    for level in 0..200 {
        input.push_str(&"  ".repeat(level));
        input.push_str("- x\n");
    }
    let err = parse_to_document(&input, &ParserConfig::default()).unwrap_err();
    assert!(matches!(err, ParseError::NestingTooDeep { .. }));
}

#[test]
fn nesting_under_the_limit_parses() {
    let input = "> ".repeat(99) + "ok";
    let doc = parse_to_document(&input, &ParserConfig::default()).unwrap();
    assert!(matches!(doc.children()[0], Block::BlockQuote { .. }));
}

#[test]
fn zero_time_budget_means_unlimited() {
    let config = ParserConfig {
        max_parsing_time: 0,
        ..ParserConfig::default()
    };
    assert!(config.time_budget().is_none());
    assert!(parse_to_document("fine\n", &config).is_ok());
}

#[test]
fn pathological_emphasis_terminates() {
    let input = "*".repeat(2_000) + "a" + &"*".repeat(2_000);
    let doc = parse_to_document(&input, &ParserConfig::default()).unwrap();
    assert_eq!(doc.children().len(), 1);
}

#[test]
fn pathological_brackets_terminate() {
    let input = "[".repeat(5_000) + "x";
    let doc = parse_to_document(&input, &ParserConfig::default()).unwrap();
    assert_eq!(doc.children().len(), 1);
}

#[test]
fn lenient_mode_swallows_malformed_constructs() {
    // Unclosed fence, bad reference, stray brackets: all parse.
    let doc = parse_to_document(
        "[a][nope] ![b](\n\n```\nunclosed\n",
        &ParserConfig::default(),
    )
    .unwrap();
    assert_eq!(doc.children().len(), 2);
}

#[test]
fn strict_mode_rejects_unterminated_fence() {
    let config = ParserConfig {
        strict: true,
        ..ParserConfig::default()
    };
    let err = parse_to_document("ok\n\n```\nunclosed\n", &config).unwrap_err();
    match err {
        ParseError::Malformed { line, reason } => {
            assert_eq!(line, 3);
            assert!(reason.contains("fenced"));
        }
        other => panic!("{other:?}"),
    }
}

#[test]
fn strict_mode_rejects_unresolved_reference() {
    let config = ParserConfig {
        strict: true,
        ..ParserConfig::default()
    };
    let err = parse_to_document("[text][ghost]\n", &config).unwrap_err();
    assert!(matches!(err, ParseError::Malformed { line: 1, .. }));
}

#[test]
fn errors_are_printable_with_context() {
    let input = "> ".repeat(200) + "x";
    let err = parse_to_document(&input, &ParserConfig::default()).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("line 1"));
    assert!(message.contains("100"));
}
