//! Chord line / text line classification.

use crate::ast::{ParsedLine, Token};
use crate::lexer::tokenize;

/// Tokenize and classify one chart line.
///
/// A blank line becomes an empty `TextLine`.
pub fn parse_line(line: &str) -> ParsedLine {
    let line = line.trim();
    if line.is_empty() {
        return ParsedLine::TextLine { tokens: Vec::new() };
    }
    classify(tokenize(line))
}

/// A line with no `Word` token is a chord line.
pub fn classify(tokens: Vec<Token>) -> ParsedLine {
    if tokens.iter().any(Token::is_word) {
        ParsedLine::TextLine { tokens }
    } else {
        ParsedLine::ChordLine { tokens }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chord_line() {
        let line = parse_line("{D} {Am} {G} {D}");
        assert!(line.is_chord_line());
        assert_eq!(line.tokens().len(), 4);
    }

    #[test]
    fn test_text_line() {
        let line = parse_line("Line one with {D}");
        assert_eq!(
            line,
            ParsedLine::TextLine {
                tokens: vec![
                    Token::word("Line"),
                    Token::word("one"),
                    Token::word("with"),
                    Token::chord("D"),
                ]
            }
        );
    }

    #[test]
    fn test_markers_only_is_chord_line() {
        assert!(parse_line("({D} .. {REST}) x2").is_chord_line());
    }

    #[test]
    fn test_blank_is_empty_text_line() {
        assert_eq!(parse_line("   "), ParsedLine::TextLine { tokens: vec![] });
    }

    #[test]
    fn test_lone_dot_is_empty_chord_line() {
        // Non-blank input that yields no tokens still has no words.
        assert_eq!(parse_line("."), ParsedLine::ChordLine { tokens: vec![] });
    }
}
