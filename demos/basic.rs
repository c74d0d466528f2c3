//! Basic usage example for the rsapache library.
//!
//! Parses a few access log lines with the combined format, reads a format out
//! of an httpd configuration, and shows how malformed formats are reported.
//!
//! Run with `RUST_LOG=rsapache=debug cargo run --example basic` to see the
//! library's tracing output.

use rsapache::httpd::{self, HttpdReader};
use rsapache::{LineOutcome, Parser, Reader};
use std::io::Cursor;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== rsapache Basic Usage Example ===\n");

    basic_parsing_example()?;
    reader_example()?;
    httpd_config_example()?;
    error_handling_example();

    Ok(())
}

/// Example 1: parse a single combined-format line.
fn basic_parsing_example() -> Result<(), Box<dyn std::error::Error>> {
    println!("1. Basic Log Parsing");
    println!("-------------------");

    let line = r#"127.0.0.1 - frank [10/Oct/2000:13:55:36 -0700] "GET /apache_pb.gif HTTP/1.0" 200 2326 "http://www.example.com/start.html" "Mozilla/4.08 [en] (Win98; I ;Nav)""#;
    let parser = Parser::new(httpd::COMBINED)?;

    println!("Format:  {}", parser.format());
    println!("Pattern: {}", parser.pattern().as_str());
    println!();

    if let Some(entry) = parser.parse_line(line) {
        let mut fields: Vec<_> = entry.iter().collect();
        fields.sort();
        for (name, value) in fields {
            println!("  {:<24} {}", name, value);
        }
    }
    println!();
    Ok(())
}

/// Example 2: read several lines, some of which don't match.
fn reader_example() -> Result<(), Box<dyn std::error::Error>> {
    println!("2. Reading a Log");
    println!("----------------");

    let log_data = r#"192.168.1.10 - - [25/Dec/2013:14:30:00 +0000] "GET /index.html HTTP/1.1" 200 612
this is not an access log line
10.0.0.5 - alice [25/Dec/2013:14:31:00 +0000] "POST /api/login HTTP/1.1" 302 -"#;

    let reader = Reader::new(Cursor::new(log_data), httpd::COMMON)?;
    for outcome in reader {
        match outcome? {
            LineOutcome::Matched(entry) => println!(
                "  {} {} -> {} ({} bytes)",
                entry.field("host")?,
                entry.field("request")?,
                entry.int_field("status")?,
                entry.bytes_field("lengthCLF")?
            ),
            LineOutcome::Unmatched { line_number, .. } => {
                println!("  line {} skipped: does not match", line_number)
            }
        }
    }
    println!();
    Ok(())
}

/// Example 3: take the format from an httpd configuration.
fn httpd_config_example() -> Result<(), Box<dyn std::error::Error>> {
    println!("3. httpd Configuration");
    println!("----------------------");

    let config = r#"
    LogFormat "%v %h %l %u %t \"%r\" %>s %b %{local}p" vhost_port
    "#;
    let log_data = r#"www.example.com 10.1.1.1 - - [26/Dec/2013:15:45:30 +0000] "GET /admin HTTP/1.1" 401 381 8443"#;

    let summary =
        HttpdReader::new(Cursor::new(log_data), Cursor::new(config), "vhost_port")?.collect_all()?;
    for entry in &summary.entries {
        println!(
            "  vhost={} port={} status={}",
            entry.field("serverName")?,
            entry.field("port___local")?,
            entry.field("status")?
        );
    }
    println!();
    Ok(())
}

/// Example 4: malformed formats report where the problem is.
fn error_handling_example() {
    println!("4. Error Handling");
    println!("-----------------");

    for format in ["%h %Q", "%h %{Referer", "%{}i", "%h %>b", "%h %h"] {
        match Parser::new(format) {
            Ok(_) => println!("  {:<14} ok", format),
            Err(e) => println!("  {:<14} {}", format, e),
        }
    }
}
