//! Run-time configuration objects + fluent builders.

use std::time::Duration;

use serde::Deserialize;

use crate::core::{
    constants::{
        DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_FIELD_SEPARATOR, DEFAULT_QUOTE_CHAR,
        DEFAULT_RECORD_SEPARATOR,
    },
    error::ConfigError,
};

/// Immutable parameters handed to the delimited-text parser.
///
/// `record_separator` holds one or two characters; the builder enforces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    pub field_separator: char,
    pub record_separator: String,
    pub quote_char: char,
    pub strip_header: bool,
    pub trim_fields: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            field_separator: DEFAULT_FIELD_SEPARATOR,
            record_separator: DEFAULT_RECORD_SEPARATOR.to_owned(),
            quote_char: DEFAULT_QUOTE_CHAR,
            strip_header: false,
            trim_fields: false,
        }
    }
}

impl ParseOptions {
    #[inline]
    #[must_use]
    pub fn builder() -> ParseOptionsBuilder {
        ParseOptionsBuilder::default()
    }

    /// First and optional second record separator character.
    #[inline]
    #[must_use]
    pub fn record_chars(&self) -> (char, Option<char>) {
        let mut it = self.record_separator.chars();
        match it.next() {
            Some(first) => (first, it.next()),
            None => ('\r', Some('\n')),
        }
    }
}

/// Fluent builder; validation happens in `build`.
#[derive(Debug, Default)]
pub struct ParseOptionsBuilder {
    field_separator: Option<char>,
    record_separator: Option<String>,
    quote_char: Option<char>,
    strip_header: bool,
    trim_fields: bool,
}

impl ParseOptionsBuilder {
    #[inline]
    #[must_use]
    pub fn field_separator(mut self, c: char) -> Self {
        self.field_separator = Some(c);
        self
    }
    #[inline]
    #[must_use]
    pub fn record_separator(mut self, s: impl Into<String>) -> Self {
        self.record_separator = Some(s.into());
        self
    }
    #[inline]
    #[must_use]
    pub fn quote_char(mut self, c: char) -> Self {
        self.quote_char = Some(c);
        self
    }
    #[inline]
    #[must_use]
    pub fn strip_header(mut self, on: bool) -> Self {
        self.strip_header = on;
        self
    }
    #[inline]
    #[must_use]
    pub fn trim_fields(mut self, on: bool) -> Self {
        self.trim_fields = on;
        self
    }

    pub fn build(self) -> Result<ParseOptions, ConfigError> {
        // An empty separator falls back to the default, like the other unset options.
        let record_separator = self
            .record_separator
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_RECORD_SEPARATOR.to_owned());
        let n = record_separator.chars().count();
        if n > 2 {
            return Err(ConfigError::RecordSeparatorLength(n));
        }
        Ok(ParseOptions {
            field_separator: self.field_separator.unwrap_or(DEFAULT_FIELD_SEPARATOR),
            record_separator,
            quote_char: self.quote_char.unwrap_or(DEFAULT_QUOTE_CHAR),
            strip_header: self.strip_header,
            trim_fields: self.trim_fields,
        })
    }
}

/// Ergonomic `?` on a builder chain.
impl From<ParseOptionsBuilder> for Result<ParseOptions, ConfigError> {
    fn from(b: ParseOptionsBuilder) -> Self {
        b.build()
    }
}

/// `csvOptions` object as it appears inside a node configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParseOptionsSpec {
    pub field_separator: Option<String>,
    pub record_separator: Option<String>,
    pub quote_char: Option<String>,
    pub strip_header: bool,
    pub trim_fields: bool,
}

impl TryFrom<ParseOptionsSpec> for ParseOptions {
    type Error = ConfigError;

    fn try_from(spec: ParseOptionsSpec) -> Result<Self, Self::Error> {
        let mut b = ParseOptions::builder()
            .strip_header(spec.strip_header)
            .trim_fields(spec.trim_fields);
        if let Some(c) = single_char("fieldSeparator", spec.field_separator)? {
            b = b.field_separator(c);
        }
        if let Some(c) = single_char("quoteChar", spec.quote_char)? {
            b = b.quote_char(c);
        }
        if let Some(s) = spec.record_separator {
            b = b.record_separator(s);
        }
        b.build()
    }
}

fn single_char(key: &'static str, value: Option<String>) -> Result<Option<char>, ConfigError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (None, _) => Ok(None),
        (Some(c), None) => Ok(Some(c)),
        _ => Err(ConfigError::NotSingleChar { key, value }),
    }
}

/// Knobs for the render dispatcher.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub fetch_timeout: Duration,
    pub user_agent: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

impl DispatchConfig {
    #[inline]
    #[must_use]
    pub fn fetch_timeout(mut self, t: Duration) -> Self {
        self.fetch_timeout = t;
        self
    }
}
