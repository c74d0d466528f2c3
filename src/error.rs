//! Error types for the rsapache library.

use thiserror::Error;

/// Result type alias for rsapache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// What was wrong with a format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatErrorKind {
    /// A `%` at the very end of the format.
    DanglingPercent,
    /// `%X` where `X` is not a known directive.
    UnknownDirective(char),
    /// `%>` not followed by `s`.
    InvalidRedirect,
    /// `%{` with no closing `}`.
    UnterminatedName,
    /// `%{}X`.
    EmptyName,
    /// `%{...}X` that no parameterized directive accepts.
    UnrecognizedToken(String),
    /// The same field would be captured twice.
    DuplicateField(String),
}

/// A malformed format string, with the byte offset where the problem starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid format at offset {offset}: {}", describe(.kind))]
pub struct FormatError {
    /// Byte offset into the format string.
    pub offset: usize,
    /// The specific problem.
    pub kind: FormatErrorKind,
}

fn describe(kind: &FormatErrorKind) -> String {
    match kind {
        FormatErrorKind::DanglingPercent => "'%' at end of format".to_string(),
        FormatErrorKind::UnknownDirective(c) => format!("unknown directive '%{}'", c),
        FormatErrorKind::InvalidRedirect => "'%>' must be followed by 's'".to_string(),
        FormatErrorKind::UnterminatedName => "'{' has no closing '}'".to_string(),
        FormatErrorKind::EmptyName => "'{}' has no name".to_string(),
        FormatErrorKind::UnrecognizedToken(token) => {
            format!("'{}' is not a recognized directive", token)
        }
        FormatErrorKind::DuplicateField(field) => {
            format!("field '{}' is captured more than once", field)
        }
    }
}

impl FormatError {
    pub(crate) fn new(offset: usize, kind: FormatErrorKind) -> Self {
        Self { offset, kind }
    }
}

/// Error types that can occur while compiling formats and processing logs.
#[derive(Error, Debug)]
pub enum Error {
    /// The format string is malformed.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// The regex engine rejected the assembled pattern.
    #[error("format '{format}' produced an invalid pattern: {source}")]
    InvalidPattern {
        format: String,
        #[source]
        source: regex::Error,
    },

    /// A log line doesn't match the expected format (strict parsing only).
    #[error("log line '{line}' does not match format '{format}'")]
    LineFormatMismatch { line: String, format: String },

    /// Error when a field is not found in an entry.
    #[error("field '{field}' not found")]
    FieldNotFound { field: String },

    /// Error when a field value cannot be parsed as the requested type.
    #[error("field '{field}' with value '{value}' cannot be parsed as {target_type}: {source}")]
    FieldParseError {
        field: String,
        value: String,
        target_type: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// No `LogFormat` with the requested nickname in the httpd configuration.
    #[error("log format '{nickname}' not found in httpd configuration")]
    LogFormatNotFound { nickname: String },

    /// A `LogFormat` line could not be understood.
    #[error("failed to parse httpd configuration at line {line}: {message}")]
    HttpdConfigError { line: usize, message: String },

    /// IO error when reading log files or httpd configuration.
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a new invalid pattern error.
    pub fn invalid_pattern(format: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidPattern {
            format: format.into(),
            source,
        }
    }

    /// Create a new line format mismatch error.
    pub fn line_format_mismatch(line: impl Into<String>, format: impl Into<String>) -> Self {
        Self::LineFormatMismatch {
            line: line.into(),
            format: format.into(),
        }
    }

    /// Create a new field not found error.
    pub fn field_not_found(field: impl Into<String>) -> Self {
        Self::FieldNotFound {
            field: field.into(),
        }
    }

    /// Create a new field parse error.
    pub fn field_parse_error(
        field: impl Into<String>,
        value: impl Into<String>,
        target_type: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::FieldParseError {
            field: field.into(),
            value: value.into(),
            target_type: target_type.into(),
            source: Box::new(source),
        }
    }

    /// Create a new log format not found error.
    pub fn log_format_not_found(nickname: impl Into<String>) -> Self {
        Self::LogFormatNotFound {
            nickname: nickname.into(),
        }
    }

    /// Create a new httpd config error.
    pub fn httpd_config_error(line: usize, message: impl Into<String>) -> Self {
        Self::HttpdConfigError {
            line,
            message: message.into(),
        }
    }

    /// The format error behind this error, if any.
    pub fn as_format_error(&self) -> Option<&FormatError> {
        match self {
            Self::Format(e) => Some(e),
            _ => None,
        }
    }
}
