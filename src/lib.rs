//! # rsapache - Rust Apache Access Log Parser
//!
//! Parses Apache httpd access logs written with a `mod_log_config` format
//! string such as `%h %l %u %t "%r" %>s %b`.
//!
//! This library provides functionality to:
//! - Compile a format string once into an anchored regex with one named group per field
//! - Match log lines against it, getting a field map or "no match" back
//! - Extract `LogFormat` definitions from httpd configuration files
//! - Iterate over log files, reporting lines that don't match without stopping
//!
//! ## Quick Start
//!
//! ```rust
//! use rsapache::Parser;
//!
//! let format = r#"%h %l %u %t "%r" %>s %b "%{Referer}i" "%{User-agent}i""#;
//! let line = r#"127.0.0.1 - frank [10/Oct/2000:13:55:36 -0700] "GET /apache_pb.gif HTTP/1.0" 200 2326 "http://www.example.com/start.html" "Mozilla/4.08 [en] (Win98; I ;Nav)""#;
//!
//! let parser = Parser::new(format)?;
//! if let Some(entry) = parser.parse_line(line) {
//!     println!("Host: {}", entry.field("host")?);
//!     println!("Status: {}", entry.int_field("status")?);
//!     println!("Agent: {}", entry.field("reqHeader___useragent")?);
//! }
//! # Ok::<(), rsapache::Error>(())
//! ```
//!
//! ## Field names
//!
//! Fixed directives capture into fixed names (`%h` → `host`, `%>s` → `status`,
//! `%t` → `time`, ...). Parameterized directives capture into
//! `<category>___<name>`, where the name is lower-cased with hyphens removed:
//! `%{User-agent}i` → `reqHeader___useragent`, `%{session}C` → `cookie___session`.
//!
//! ## Features
//!
//! - `serde`: serialize/deserialize entries
//! - `parallel`: match batches of lines on the rayon thread pool

pub mod compiler;
pub mod directive;
pub mod entry;
pub mod error;
pub mod httpd;
pub mod parser;
pub mod reader;

// Re-export main types for convenience
pub use compiler::{compile, CompiledPattern, Fragment};
pub use directive::{Directive, ParamRule};
pub use entry::{Entry, Fields};
pub use error::{Error, FormatError, FormatErrorKind, Result};
pub use parser::{match_line, Parser, StringParser};
pub use reader::{LineOutcome, Reader, Summary};

pub use httpd::HttpdReader;

#[cfg(test)]
mod tests {
    use super::*;

    const FORMAT: &str = r#"%h %l %u %t "%r" %>s %b "%{Referer}i" "%{User-agent}i""#;
    const LINE: &str = r#"127.0.0.1 - frank [10/Oct/2000:13:55:36 -0700] "GET /apache_pb.gif HTTP/1.0" 200 2326 "http://www.example.com/start.html" "Mozilla/4.08 [en] (Win98; I ;Nav)""#;

    #[test]
    fn test_combined_line() {
        let pattern = compile(FORMAT).unwrap();
        let entry = match_line(&pattern, LINE).unwrap();

        let expected = [
            ("host", "127.0.0.1"),
            ("logname", "-"),
            ("user", "frank"),
            ("time", "10/Oct/2000:13:55:36 -0700"),
            ("request", "GET /apache_pb.gif HTTP/1.0"),
            ("status", "200"),
            ("lengthCLF", "2326"),
            ("reqHeader___referer", "http://www.example.com/start.html"),
            ("reqHeader___useragent", "Mozilla/4.08 [en] (Win98; I ;Nav)"),
        ];
        for (field, value) in expected {
            assert_eq!(entry.field(field).unwrap(), value, "{}", field);
        }
        assert_eq!(entry.len(), expected.len());
    }
}
