//! Parser limits and layout settings.

use serde::Deserialize;

use crate::error::ConfigError;
use crate::span::MAX_OFFSET;

/// Default ceiling on input size.
pub const DEFAULT_MAX_INPUT_BYTES: usize = 8 * 1024 * 1024;

/// Default ceiling on line count.
pub const DEFAULT_MAX_LINES: usize = 200_000;

/// Columns per list nesting level.
pub const DEFAULT_INDENT_WIDTH: usize = 2;

/// Settings for a [`Parser`](crate::Parser).
///
/// ```rust
/// use kumihan_core::ParserConfig;
///
/// let config = ParserConfig::from_toml_str("max_lines = 10").unwrap();
/// assert_eq!(config.max_lines, 10);
/// assert_eq!(config.indent_width, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserConfig {
    /// Inputs longer than this are rejected with `ParseError::InputTooLarge`.
    /// Capped at [`MAX_OFFSET`] so that every byte offset fits in a `Span`.
    pub max_input_bytes: usize,
    /// Inputs with more lines are rejected with `ParseError::TooManyLines`.
    pub max_lines: usize,
    /// Spaces per list nesting level; a tab counts as one full level.
    pub indent_width: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            max_lines: DEFAULT_MAX_LINES,
            indent_width: DEFAULT_INDENT_WIDTH,
        }
    }
}

impl ParserConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let mut config: ParserConfig = toml::from_str(source)?;
        // Zero would make every indented line infinitely deep.
        config.indent_width = config.indent_width.max(1);
        config.max_input_bytes = config.max_input_bytes.min(MAX_OFFSET);
        Ok(config)
    }

    pub fn with_max_input_bytes(mut self, limit: usize) -> Self {
        self.max_input_bytes = limit.min(MAX_OFFSET);
        self
    }

    pub fn with_max_lines(mut self, limit: usize) -> Self {
        self.max_lines = limit;
        self
    }
}
