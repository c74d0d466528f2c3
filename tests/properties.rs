//! Property tests for formats made only of literal text.

use proptest::prelude::*;
use rsapache::Parser;

#[derive(Debug, Clone)]
enum Piece {
    Text(String),
    Percent,
}

fn piece() -> impl Strategy<Value = Piece> {
    prop_oneof![
        "[a-zA-Z0-9 .*+?()\\[\\]{}|^$\\\\/:;,\"'<>=-]{1,12}".prop_map(Piece::Text),
        Just(Piece::Percent),
    ]
}

proptest! {
    #[test]
    fn literal_formats_match_their_own_text(pieces in prop::collection::vec(piece(), 0..8)) {
        // Surrounding whitespace is trimmed from lines, so fence the text.
        let mut format = String::from("<");
        let mut line = String::from("<");
        for piece in &pieces {
            match piece {
                Piece::Text(text) => {
                    format.push_str(text);
                    line.push_str(text);
                }
                Piece::Percent => {
                    format.push_str("%%");
                    line.push('%');
                }
            }
        }

        format.push('>');
        line.push('>');

        let parser = Parser::new(&format).unwrap();
        let entry = parser.parse_line(&line);
        prop_assert!(entry.is_some(), "format {:?} did not match {:?}", format, line);
        prop_assert!(entry.unwrap().is_empty());
    }

    #[test]
    fn matching_is_idempotent(suffix in "[ -~]{0,40}") {
        let parser = Parser::new(r#"%h "%r" %>s"#).unwrap();
        let line = format!(r#"10.1.2.3 "GET /{} HTTP/1.1" 200"#, suffix);
        prop_assert_eq!(parser.parse_line(&line), parser.parse_line(&line));
    }
}
