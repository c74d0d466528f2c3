//! Compiling `mod_log_config` format strings into anchored regexes.
//!
//! The scan is a single left-to-right pass with a handful of lookahead
//! branches after each `%`:
//!
//! - `%%` emits a literal `%`
//! - `%>s` emits the status capture (`%>` followed by anything else is an error)
//! - `%{name}X` resolves the token through [`match_parameterized`]
//! - `%X` resolves `X` through [`lookup_fixed`]
//!
//! Everything else is literal text and is regex-escaped.

use crate::directive::{lookup_fixed, match_parameterized, Directive};
use crate::error::{Error, FormatError, FormatErrorKind, Result};
use regex::Regex;
use std::collections::HashSet;
use tracing::debug;

/// One piece of a compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Text that must appear verbatim in the line.
    Literal(String),
    /// A named capture group.
    Capture {
        /// Field name the value is stored under.
        field: String,
        /// Full regex for the group, including any literal decoration.
        pattern: String,
    },
}

impl Fragment {
    fn to_regex(&self) -> String {
        match self {
            Fragment::Literal(text) => regex::escape(text),
            Fragment::Capture { pattern, .. } => pattern.clone(),
        }
    }
}

/// A format string compiled into a whole-line regex.
///
/// Immutable once built; it can be shared between threads and matched
/// against any number of lines.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    format: String,
    fragments: Vec<Fragment>,
    regex: Regex,
}

impl CompiledPattern {
    /// The format string this pattern was compiled from.
    pub fn format(&self) -> &str {
        &self.format
    }

    /// Literal and capture fragments, in format order.
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// The compiled regex.
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// The regex source, anchored at both ends.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Field names captured by this pattern, in format order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fragments.iter().filter_map(|f| match f {
            Fragment::Capture { field, .. } => Some(field.as_str()),
            Fragment::Literal(_) => None,
        })
    }
}

/// Accumulates fragments, merging adjacent literal text.
#[derive(Default)]
struct Builder {
    fragments: Vec<Fragment>,
    fields: HashSet<String>,
}

impl Builder {
    fn literal(&mut self, c: char) {
        if let Some(Fragment::Literal(text)) = self.fragments.last_mut() {
            text.push(c);
        } else {
            self.fragments.push(Fragment::Literal(c.to_string()));
        }
    }

    fn capture(&mut self, directive: &Directive, offset: usize) -> Result<()> {
        let field = directive.field_name();
        if !self.fields.insert(field.clone()) {
            return Err(FormatError::new(offset, FormatErrorKind::DuplicateField(field)).into());
        }
        self.fragments.push(Fragment::Capture {
            field,
            pattern: directive.fragment(),
        });
        Ok(())
    }
}

/// Compile a format string such as `%h %l %u %t "%r" %>s %b`.
///
/// # Arguments
///
/// * `format` - The `mod_log_config` format string
///
/// # Returns
///
/// The compiled pattern, with one named group per directive, or an
/// [`Error::Format`] when the format is malformed: a dangling `%`, an unknown
/// directive, `%>` not followed by `s`, an unterminated or empty `{}` name, a
/// braced token no directive accepts, or a field captured twice.
///
/// # Example
///
/// ```rust
/// use rsapache::compiler::compile;
///
/// let pattern = compile(r#"%h "%r" %>s"#)?;
/// let fields: Vec<_> = pattern.field_names().collect();
/// assert_eq!(fields, ["host", "request", "status"]);
/// # Ok::<(), rsapache::Error>(())
/// ```
pub fn compile(format: &str) -> Result<CompiledPattern> {
    let mut builder = Builder::default();
    let mut chars = format.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        if c != '%' {
            builder.literal(c);
            continue;
        }

        let Some((at, code)) = chars.next() else {
            return Err(FormatError::new(offset, FormatErrorKind::DanglingPercent).into());
        };

        match code {
            '%' => builder.literal('%'),
            '>' => match chars.next() {
                Some((_, 's')) => {
                    let status = lookup_fixed('s')
                        .ok_or_else(|| FormatError::new(at, FormatErrorKind::UnknownDirective('s')))?;
                    builder.capture(&status, offset)?;
                }
                _ => return Err(FormatError::new(offset, FormatErrorKind::InvalidRedirect).into()),
            },
            '{' => {
                let close = match format[at..].find('}') {
                    Some(rel) => at + rel,
                    None => {
                        return Err(
                            FormatError::new(at, FormatErrorKind::UnterminatedName).into()
                        )
                    }
                };
                if close == at + 1 {
                    return Err(FormatError::new(at, FormatErrorKind::EmptyName).into());
                }

                // Token runs from '{' through the directive letter.
                let end = format[close + 1..]
                    .chars()
                    .next()
                    .map_or(close + 1, |letter| close + 1 + letter.len_utf8());
                let token = &format[at..end];
                let directive = match_parameterized(token).ok_or_else(|| {
                    FormatError::new(at, FormatErrorKind::UnrecognizedToken(token.to_string()))
                })?;
                builder.capture(&directive, offset)?;

                while chars.peek().is_some_and(|&(i, _)| i < end) {
                    chars.next();
                }
            }
            other => {
                let directive = lookup_fixed(other)
                    .ok_or_else(|| FormatError::new(at, FormatErrorKind::UnknownDirective(other)))?;
                builder.capture(&directive, offset)?;
            }
        }
    }

    let mut source = String::from("^");
    for fragment in &builder.fragments {
        source.push_str(&fragment.to_regex());
    }
    source.push('$');

    let regex = Regex::new(&source).map_err(|e| Error::invalid_pattern(format, e))?;

    debug!(
        format,
        fields = builder.fields.len(),
        "compiled access log format"
    );

    Ok(CompiledPattern {
        format: format.to_string(),
        fragments: builder.fragments,
        regex,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of(format: &str) -> (usize, FormatErrorKind) {
        match compile(format) {
            Err(Error::Format(e)) => (e.offset, e.kind),
            other => panic!("expected format error for {:?}, got {:?}", format, other),
        }
    }

    #[test]
    fn test_literal_only() {
        let pattern = compile("plain [text] (x)").unwrap();
        assert_eq!(
            pattern.fragments(),
            [Fragment::Literal("plain [text] (x)".to_string())]
        );
        assert_eq!(pattern.as_str(), r"^plain \[text\] \(x\)$");
        assert_eq!(pattern.field_names().count(), 0);
    }

    #[test]
    fn test_percent_escape() {
        let pattern = compile("100%% done").unwrap();
        assert_eq!(pattern.as_str(), "^100% done$");
    }

    #[test]
    fn test_redirect_status_aliases_status() {
        let a = compile("%>s").unwrap();
        let b = compile("%s").unwrap();
        assert_eq!(a.as_str(), b.as_str());
    }

    #[test]
    fn test_parameterized_advances_past_token() {
        let pattern = compile(r#""%{Referer}i" x"#).unwrap();
        assert_eq!(
            pattern.fragments(),
            [
                Fragment::Literal("\"".to_string()),
                Fragment::Capture {
                    field: "reqHeader___referer".to_string(),
                    pattern: "(?P<reqHeader___referer>.+?)".to_string(),
                },
                Fragment::Literal("\" x".to_string()),
            ]
        );
    }

    #[test]
    fn test_two_headers_distinct_fields() {
        let pattern = compile(r#""%{Referer}i" "%{User-agent}i""#).unwrap();
        let fields: Vec<_> = pattern.field_names().collect();
        assert_eq!(fields, ["reqHeader___referer", "reqHeader___useragent"]);
    }

    #[test]
    fn test_dangling_percent() {
        assert_eq!(kind_of("%h %"), (3, FormatErrorKind::DanglingPercent));
    }

    #[test]
    fn test_unknown_directive() {
        assert_eq!(kind_of("%h %Q"), (4, FormatErrorKind::UnknownDirective('Q')));
    }

    #[test]
    fn test_bad_redirect() {
        assert_eq!(kind_of("%h %>b"), (3, FormatErrorKind::InvalidRedirect));
        assert_eq!(kind_of("%>"), (0, FormatErrorKind::InvalidRedirect));
    }

    #[test]
    fn test_unterminated_brace() {
        assert_eq!(kind_of("%h %{Referer"), (4, FormatErrorKind::UnterminatedName));
    }

    #[test]
    fn test_empty_name() {
        assert_eq!(kind_of("%{}i"), (1, FormatErrorKind::EmptyName));
    }

    #[test]
    fn test_unrecognized_token() {
        assert_eq!(
            kind_of("%{bogus}p"),
            (1, FormatErrorKind::UnrecognizedToken("{bogus}p".to_string()))
        );
        assert_eq!(
            kind_of("%{Referer}"),
            (1, FormatErrorKind::UnrecognizedToken("{Referer}".to_string()))
        );
    }

    #[test]
    fn test_duplicate_field() {
        assert_eq!(
            kind_of("%h %h"),
            (3, FormatErrorKind::DuplicateField("host".to_string()))
        );
        assert_eq!(
            kind_of("%{Referer}i %{referer}i"),
            (12, FormatErrorKind::DuplicateField("reqHeader___referer".to_string()))
        );
        assert_eq!(
            kind_of("%s %>s"),
            (3, FormatErrorKind::DuplicateField("status".to_string()))
        );
    }

    #[test]
    fn test_sanitized_names_can_collide() {
        assert_eq!(
            kind_of("%{a.b}C %{a_b}C"),
            (8, FormatErrorKind::DuplicateField("cookie___a_b".to_string()))
        );
        assert_eq!(
            kind_of("%{X-Id}i %{xid}i"),
            (9, FormatErrorKind::DuplicateField("reqHeader___xid".to_string()))
        );
        // Different families never collide.
        assert!(compile("%{a.b}C %{a_b}t").is_ok());
    }

    #[test]
    fn test_unicode_literal() {
        let pattern = compile("été %h").unwrap();
        assert!(pattern.regex().is_match("été 1.2.3.4"));
    }
}
