//! Matching log lines against a compiled format.

use crate::compiler::{compile, CompiledPattern};
use crate::entry::{Entry, Fields};
use crate::error::{Error, Result};
use tracing::trace;

/// Trait for strict parsing, where a line that does not match is an error.
pub trait StringParser {
    /// Parse a log line into an entry.
    fn parse_string(&self, line: &str) -> Result<Entry>;
}

/// Apply a compiled pattern to one line.
///
/// Surrounding whitespace (space, tab, `\r`, `\n`, `\0`, `\x0B`) is stripped
/// first. Returns `None` when the line does not have the shape the pattern
/// requires.
pub fn match_line(pattern: &CompiledPattern, line: &str) -> Option<Entry> {
    let line = line.trim_matches(|c| matches!(c, ' ' | '\t' | '\n' | '\r' | '\0' | '\x0B'));
    let Some(captures) = pattern.regex().captures(line) else {
        trace!(format = pattern.format(), line, "line does not match format");
        return None;
    };

    let mut fields = Fields::new();
    for name in pattern.field_names() {
        if let Some(value) = captures.name(name) {
            fields.insert(name.to_string(), value.as_str().to_string());
        }
    }

    Some(Entry::from_fields(fields))
}

/// A parser for Apache access log lines written in one format.
///
/// The format is compiled once, up front. Matching takes `&self` and keeps no
/// state between calls, so one parser can serve many threads.
#[derive(Debug, Clone)]
pub struct Parser {
    pattern: CompiledPattern,
}

impl Parser {
    /// Create a new parser from a `mod_log_config` format string.
    ///
    /// The format is compiled once here; every later call to
    /// [`parse_line`](Self::parse_line) reuses the same pattern.
    ///
    /// # Arguments
    ///
    /// * `format` - The log format string (e.g., `%h %l %u %t "%r" %>s %b`)
    ///
    /// # Returns
    ///
    /// A new parser instance, or [`Error::Format`] carrying the byte offset of
    /// the first malformed directive.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rsapache::Parser;
    ///
    /// let parser = Parser::new(r#"%h %l %u %t "%r" %>s %b"#)?;
    /// let entry = parser
    ///     .parse_line(r#"127.0.0.1 - frank [10/Oct/2000:13:55:36 -0700] "GET /apache_pb.gif HTTP/1.0" 200 2326"#)
    ///     .expect("line matches");
    /// assert_eq!(entry.field("user")?, "frank");
    /// # Ok::<(), rsapache::Error>(())
    /// ```
    pub fn new(format: &str) -> Result<Self> {
        Ok(Self {
            pattern: compile(format)?,
        })
    }

    /// Wrap an already compiled pattern.
    pub fn from_pattern(pattern: CompiledPattern) -> Self {
        Self { pattern }
    }

    /// Get the original format string.
    pub fn format(&self) -> &str {
        self.pattern.format()
    }

    /// Get the compiled pattern.
    pub fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }

    /// Parse one line, returning `None` if it does not match the format.
    pub fn parse_line(&self, line: &str) -> Option<Entry> {
        match_line(&self.pattern, line)
    }

    /// Parse a sequence of lines. Non-matching lines yield `None` and do not
    /// stop the iteration.
    pub fn parse_lines<'a, I, S>(&'a self, lines: I) -> impl Iterator<Item = Option<Entry>> + 'a
    where
        I: IntoIterator<Item = S> + 'a,
        I::IntoIter: 'a,
        S: AsRef<str> + 'a,
    {
        lines
            .into_iter()
            .map(move |line| self.parse_line(line.as_ref()))
    }

    /// Parse a batch of lines on the rayon thread pool, preserving order.
    #[cfg(feature = "parallel")]
    pub fn par_parse_lines<S>(&self, lines: &[S]) -> Vec<Option<Entry>>
    where
        S: AsRef<str> + Sync,
    {
        use rayon::prelude::*;

        lines
            .par_iter()
            .map(|line| self.parse_line(line.as_ref()))
            .collect()
    }
}

impl StringParser for Parser {
    fn parse_string(&self, line: &str) -> Result<Entry> {
        self.parse_line(line)
            .ok_or_else(|| Error::line_format_mismatch(line, self.format()))
    }
}
