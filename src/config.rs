//! Parser configuration.
//!
//! [`ParserConfig`] holds the resource budgets and feature switches for a
//! parse. All fields deserialize from TOML with kebab-case keys so a config
//! file can be loaded with [`ParserConfig::from_toml`].

use serde::Deserialize;
use std::time::Duration;

/// Per-extension switches, all gated behind [`ParserConfig::gfm_extensions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Extensions {
    pub tables: bool,
    pub task_lists: bool,
    pub strikethrough: bool,
    pub autolinks: bool,
}

impl Default for Extensions {
    fn default() -> Self {
        Extensions::gfm()
    }
}

impl Extensions {
    /// Everything GitHub Flavored Markdown layers on top of CommonMark.
    pub fn gfm() -> Self {
        Extensions {
            tables: true,
            task_lists: true,
            strikethrough: true,
            autolinks: true,
        }
    }

    pub fn none() -> Self {
        Extensions {
            tables: false,
            task_lists: false,
            strikethrough: false,
            autolinks: false,
        }
    }
}

/// Configuration for [`crate::parse_to_document`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ParserConfig {
    /// Master switch for the GFM extension set. When off, the individual
    /// [`Extensions`] switches are ignored and pure CommonMark is parsed.
    pub gfm_extensions: bool,
    /// Report [`crate::ParseError::Malformed`] for input that default
    /// parsing would recover silently (unterminated fences, dangling
    /// reference labels).
    pub strict: bool,
    /// Ceiling on open container depth. Exceeding it aborts the parse.
    pub max_nesting_depth: usize,
    /// Attach a source [`crate::ast::Span`] to every block node.
    pub track_source_locations: bool,
    /// Wall-clock budget in seconds. `0` means unlimited.
    pub max_parsing_time: u64,
    pub extensions: Extensions,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            gfm_extensions: true,
            strict: false,
            max_nesting_depth: 100,
            track_source_locations: false,
            max_parsing_time: 30,
            extensions: Extensions::gfm(),
        }
    }
}

impl ParserConfig {
    /// Pure CommonMark: no GFM extensions, defaults otherwise.
    pub fn commonmark() -> Self {
        ParserConfig {
            gfm_extensions: false,
            extensions: Extensions::none(),
            ..ParserConfig::default()
        }
    }

    pub fn from_toml(input: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(input)
    }

    /// Time budget for one parse, if any.
    pub fn time_budget(&self) -> Option<Duration> {
        if self.max_parsing_time == 0 {
            None
        } else {
            Some(Duration::from_secs(self.max_parsing_time))
        }
    }

    pub fn tables_enabled(&self) -> bool {
        self.gfm_extensions && self.extensions.tables
    }

    pub fn task_lists_enabled(&self) -> bool {
        self.gfm_extensions && self.extensions.task_lists
    }

    pub fn strikethrough_enabled(&self) -> bool {
        self.gfm_extensions && self.extensions.strikethrough
    }

    pub fn autolinks_enabled(&self) -> bool {
        self.gfm_extensions && self.extensions.autolinks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ParserConfig::default();
        assert!(config.gfm_extensions);
        assert!(!config.strict);
        assert_eq!(config.max_nesting_depth, 100);
        assert!(!config.track_source_locations);
        assert_eq!(config.max_parsing_time, 30);
        assert_eq!(config.time_budget(), Some(Duration::from_secs(30)));
        assert!(config.tables_enabled());
    }

    #[test]
    fn master_switch_gates_extensions() {
        let config = ParserConfig {
            gfm_extensions: false,
            ..ParserConfig::default()
        };
        assert!(!config.tables_enabled());
        assert!(!config.strikethrough_enabled());
    }

    #[test]
    fn from_toml_kebab_case() {
        let config = ParserConfig::from_toml(
            r#"
            max-nesting-depth = 12
            max-parsing-time = 0
            strict = true

            [extensions]
            tables = false
            "#,
        )
        .unwrap();
        assert_eq!(config.max_nesting_depth, 12);
        assert_eq!(config.time_budget(), None);
        assert!(config.strict);
        assert!(!config.tables_enabled());
        assert!(config.task_lists_enabled());
    }

    #[test]
    fn commonmark_profile() {
        let config = ParserConfig::commonmark();
        assert!(!config.gfm_extensions);
        assert!(!config.task_lists_enabled());
    }
}
