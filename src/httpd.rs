//! Apache httpd configuration support.
//!
//! Formats can be taken from the stock nicknames shipped in `httpd.conf`, or
//! pulled out of a configuration file's `LogFormat` directives.

use crate::entry::Entry;
use crate::error::{Error, Result};
use crate::parser::Parser;
use crate::reader::{LineOutcome, Reader, Summary};
use std::io::{BufRead, BufReader, Read};
use tracing::debug;

/// Common Log Format.
pub const COMMON: &str = r#"%h %l %u %t "%r" %>s %b"#;
/// Combined Log Format.
pub const COMBINED: &str = r#"%h %l %u %t "%r" %>s %b "%{Referer}i" "%{User-agent}i""#;
/// Common Log Format prefixed with the virtual host.
pub const VHOST_COMMON: &str = r#"%v %h %l %u %t "%r" %>s %b"#;
/// Referer log.
pub const REFERER: &str = "%{Referer}i -> %U";
/// User agent log.
pub const AGENT: &str = "%{User-agent}i";

/// Look up one of the stock format nicknames.
pub fn preset(nickname: &str) -> Option<&'static str> {
    match nickname {
        "common" => Some(COMMON),
        "combined" => Some(COMBINED),
        "vhost_common" => Some(VHOST_COMMON),
        "referer" => Some(REFERER),
        "agent" => Some(AGENT),
        _ => None,
    }
}

/// One `LogFormat` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFormatDef {
    /// The nickname, or `None` for a directive that sets the default format.
    pub nickname: Option<String>,
    /// The format string with configuration escapes removed.
    pub format: String,
    /// 1-based line number where the directive starts.
    pub line: usize,
}

/// Collect every `LogFormat` directive in an httpd configuration.
///
/// Comment lines are skipped and lines ending in `\` are joined with the next.
pub fn log_formats<R: Read>(config: R) -> Result<Vec<LogFormatDef>> {
    let reader = BufReader::new(config);
    let mut defs = Vec::new();
    let mut pending = String::new();
    let mut start = 0;

    for (index, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if pending.is_empty() {
            start = index + 1;
        }

        if let Some(continued) = line.strip_suffix('\\') {
            pending.push_str(continued);
            continue;
        }
        pending.push_str(&line);

        let logical = std::mem::take(&mut pending);
        let trimmed = logical.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if let Some(def) = parse_log_format(trimmed, start)? {
            defs.push(def);
        }
    }

    Ok(defs)
}

/// Extract the format registered under `nickname`.
///
/// The first matching directive wins.
///
/// # Arguments
///
/// * `config` - The httpd configuration input source
/// * `nickname` - The `LogFormat` nickname to look for (e.g., "combined")
///
/// # Returns
///
/// The format string with `\"` and `\\` escapes removed, or
/// [`Error::LogFormatNotFound`] if no directive uses that nickname.
///
/// # Example
///
/// ```rust
/// use rsapache::httpd::extract_log_format;
/// use std::io::Cursor;
///
/// let config = r#"LogFormat "%h %l %u %t \"%r\" %>s %b" common"#;
/// let format = extract_log_format(Cursor::new(config), "common")?;
/// assert_eq!(format, r#"%h %l %u %t "%r" %>s %b"#);
/// # Ok::<(), rsapache::Error>(())
/// ```
pub fn extract_log_format<R: Read>(config: R, nickname: &str) -> Result<String> {
    let def = log_formats(config)?
        .into_iter()
        .find(|def| def.nickname.as_deref() == Some(nickname))
        .ok_or_else(|| Error::log_format_not_found(nickname))?;

    debug!(nickname, line = def.line, format = %def.format, "extracted LogFormat");
    Ok(def.format)
}

/// Parse one logical configuration line. Returns `None` for other directives.
fn parse_log_format(line: &str, line_number: usize) -> Result<Option<LogFormatDef>> {
    let (directive, rest) = match line.split_once(char::is_whitespace) {
        Some((directive, rest)) => (directive, rest.trim_start()),
        None => (line, ""),
    };
    if !directive.eq_ignore_ascii_case("LogFormat") {
        return Ok(None);
    }
    if rest.is_empty() {
        return Err(Error::httpd_config_error(line_number, "LogFormat without a format"));
    }

    let (format, rest) = if let Some(quoted) = rest.strip_prefix('"') {
        unquote(quoted)
            .ok_or_else(|| Error::httpd_config_error(line_number, "unterminated quoted format"))?
    } else {
        match rest.split_once(char::is_whitespace) {
            Some((format, rest)) => (format.to_string(), rest),
            None => (rest.to_string(), ""),
        }
    };

    let mut words = rest.split_whitespace();
    let nickname = words.next().map(str::to_string);
    if words.next().is_some() {
        return Err(Error::httpd_config_error(
            line_number,
            "unexpected text after LogFormat nickname",
        ));
    }

    Ok(Some(LogFormatDef {
        nickname,
        format,
        line: line_number,
    }))
}

/// Read a double-quoted argument whose opening quote is already consumed.
///
/// Returns the unescaped text and whatever follows the closing quote.
fn unquote(s: &str) -> Option<(String, &str)> {
    let mut out = String::new();
    let mut chars = s.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Some((out, &s[i + 1..])),
            '\\' => match chars.next() {
                Some((_, escaped @ ('"' | '\\'))) => out.push(escaped),
                Some((_, other)) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            },
            _ => out.push(c),
        }
    }
    None
}

/// A reader whose format comes from an httpd configuration.
#[derive(Debug)]
pub struct HttpdReader<R: Read> {
    reader: Reader<R>,
}

impl<R: Read> HttpdReader<R> {
    /// Create a reader using the `LogFormat` named `nickname` in `config`.
    pub fn new<C: Read>(log_input: R, config: C, nickname: &str) -> Result<Self> {
        let format = extract_log_format(config, nickname)?;
        let parser = Parser::new(&format)?;
        Ok(Self {
            reader: Reader::with_parser(log_input, parser),
        })
    }

    /// Create a reader for one of the stock nicknames (`common`, `combined`, ...).
    pub fn with_preset(log_input: R, nickname: &str) -> Result<Self> {
        let format = preset(nickname).ok_or_else(|| Error::log_format_not_found(nickname))?;
        Ok(Self {
            reader: Reader::new(log_input, format)?,
        })
    }

    /// Get a reference to the underlying reader.
    pub fn reader(&self) -> &Reader<R> {
        &self.reader
    }

    /// Read the next non-blank line.
    pub fn read(&mut self) -> Option<Result<LineOutcome>> {
        self.reader.read()
    }

    /// Iterate over matched entries only.
    pub fn entries(self) -> impl Iterator<Item = Result<Entry>> {
        self.reader.entries()
    }

    /// Read everything, separating matched entries from unmatched lines.
    pub fn collect_all(self) -> Result<Summary> {
        self.reader.collect_all()
    }
}

impl<R: Read> Iterator for HttpdReader<R> {
    type Item = Result<LineOutcome>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.next()
    }
}
