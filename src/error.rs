//! Error types.
//!
//! Malformed Markdown is not an error in the default lenient mode; it
//! degrades to literal text. [`ParseError`] covers the resource limits
//! that protect against hostile input, plus the constructs strict mode
//! chooses to reject.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Container nesting exceeded the configured ceiling.
    #[error("nesting depth {depth} exceeds the limit of {limit} at line {line}")]
    NestingTooDeep {
        depth: usize,
        limit: usize,
        line: usize,
    },

    /// The wall-clock budget ran out.
    #[error("parsing exceeded the time budget ({elapsed_ms} ms) at line {line}")]
    Timeout { elapsed_ms: u64, line: usize },

    /// The parser stopped consuming input, which would otherwise loop
    /// forever.
    #[error("parser stalled without consuming input at line {line}")]
    Stalled { line: usize },

    /// A construct rejected in strict mode.
    #[error("malformed input at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

impl ParseError {
    /// Source line the error was raised on.
    pub fn line(&self) -> usize {
        match self {
            ParseError::NestingTooDeep { line, .. }
            | ParseError::Timeout { line, .. }
            | ParseError::Stalled { line }
            | ParseError::Malformed { line, .. } => *line,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The renderer does not implement this node kind.
    #[error("renderer does not support {kind} nodes")]
    UnsupportedNode { kind: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_location() {
        let err = ParseError::NestingTooDeep {
            depth: 101,
            limit: 100,
            line: 7,
        };
        assert_eq!(err.line(), 7);
        assert_eq!(
            err.to_string(),
            "nesting depth 101 exceeds the limit of 100 at line 7"
        );

        let err = ParseError::Malformed {
            line: 3,
            reason: "unterminated fenced code block".to_string(),
        };
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn render_error_names_the_node_kind() {
        let err = RenderError::UnsupportedNode { kind: "Table" };
        assert_eq!(err.to_string(), "renderer does not support Table nodes");
    }
}
