//! Reading access logs line by line.

use crate::entry::Entry;
use crate::error::{Error, Result};
use crate::parser::Parser;
use std::io::{BufRead, BufReader, Read};
use tracing::warn;

/// What became of one non-blank line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    /// The line matched the format.
    Matched(Entry),
    /// The line did not match. Kept so callers can report it.
    Unmatched {
        /// 1-based line number in the input.
        line_number: usize,
        /// The line, without its terminator.
        line: String,
    },
}

impl LineOutcome {
    /// The entry, if the line matched.
    pub fn into_entry(self) -> Option<Entry> {
        match self {
            Self::Matched(entry) => Some(entry),
            Self::Unmatched { .. } => None,
        }
    }
}

/// Everything read from a log source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    /// Entries for lines that matched, in input order.
    pub entries: Vec<Entry>,
    /// Line numbers of lines that did not match.
    pub unmatched: Vec<usize>,
}

/// A reader that parses access logs line by line using a specified format.
///
/// Lines that don't match the format are reported as
/// [`LineOutcome::Unmatched`] and reading continues; only I/O failures are
/// errors.
#[derive(Debug)]
pub struct Reader<R: Read> {
    reader: BufReader<R>,
    parser: Parser,
    line_number: usize,
}

impl<R: Read> Reader<R> {
    /// Create a new reader with the specified input source and format string.
    ///
    /// # Arguments
    ///
    /// * `input` - The input source (file, stdin, etc.)
    /// * `format` - The log format string (e.g., `%h %l %u %t "%r" %>s %b`)
    ///
    /// # Returns
    ///
    /// A new reader instance, or an error if the format string is invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rsapache::{LineOutcome, Reader};
    /// use std::io::Cursor;
    ///
    /// let log_data = "10.0.0.1 200\nnot a log line\n10.0.0.2 404\n";
    /// let reader = Reader::new(Cursor::new(log_data), "%h %>s")?;
    ///
    /// let matched = reader
    ///     .filter_map(|outcome| outcome.ok().and_then(LineOutcome::into_entry))
    ///     .count();
    /// assert_eq!(matched, 2);
    /// # Ok::<(), rsapache::Error>(())
    /// ```
    pub fn new(input: R, format: &str) -> Result<Self> {
        Ok(Self::with_parser(input, Parser::new(format)?))
    }

    /// Create a new reader with an existing parser.
    pub fn with_parser(input: R, parser: Parser) -> Self {
        Self {
            reader: BufReader::new(input),
            parser,
            line_number: 0,
        }
    }

    /// Get a reference to the underlying parser.
    pub fn parser(&self) -> &Parser {
        &self.parser
    }

    /// Read the next non-blank line.
    ///
    /// Bytes that are not valid UTF-8 are replaced with U+FFFD before
    /// matching, so such a line still counts and can still match.
    /// Returns `None` at end of input.
    pub fn read(&mut self) -> Option<Result<LineOutcome>> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match self.reader.read_until(b'\n', &mut buf) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line_number += 1;
                    let line = String::from_utf8_lossy(&buf);
                    let trimmed = line.trim_end_matches(|c| c == '\r' || c == '\n');
                    if trimmed.trim().is_empty() {
                        continue;
                    }
                    return Some(Ok(self.outcome(trimmed)));
                }
                Err(e) => return Some(Err(Error::Io { source: e })),
            }
        }
    }

    fn outcome(&self, line: &str) -> LineOutcome {
        match self.parser.parse_line(line) {
            Some(entry) => LineOutcome::Matched(entry),
            None => {
                warn!(
                    line_number = self.line_number,
                    "log line does not match format"
                );
                LineOutcome::Unmatched {
                    line_number: self.line_number,
                    line: line.to_string(),
                }
            }
        }
    }

    /// Iterate over matched entries only, skipping lines that don't match.
    pub fn entries(self) -> impl Iterator<Item = Result<Entry>> {
        self.filter_map(|outcome| match outcome {
            Ok(outcome) => outcome.into_entry().map(Ok),
            Err(e) => Some(Err(e)),
        })
    }

    /// Read everything, separating matched entries from unmatched lines.
    pub fn collect_all(mut self) -> Result<Summary> {
        let mut summary = Summary::default();
        while let Some(outcome) = self.read() {
            match outcome? {
                LineOutcome::Matched(entry) => summary.entries.push(entry),
                LineOutcome::Unmatched { line_number, .. } => summary.unmatched.push(line_number),
            }
        }
        Ok(summary)
    }
}

impl<R: Read> Iterator for Reader<R> {
    type Item = Result<LineOutcome>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read()
    }
}
