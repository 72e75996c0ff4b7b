//! HTML chord sheet output.
//!
//! A single self-contained page: one heading per section, then each chart line as a
//! chord row over a lyric row in a monospace font. Condensed sheets show only the first
//! lyric line of each section.

use crate::ast::*;

const FALLBACK_TITLE: &str = "SongML Export";
/// Narrowest column a token occupies in a lyric line.
const MIN_COLUMN: usize = 4;

const STYLE: &str = r#"    body { font-family: sans-serif; line-height: 1.6; background: #fafafa; padding: 2em; }
    h2 { background: #e0e0e0; padding: 0.5em; border-radius: 4px; }
    .line-pair { margin-bottom: 1em; }
    .chordline { font-family: monospace; color: #0066cc; font-weight: bold; white-space: pre; }
    .textline { font-family: monospace; white-space: pre; }
    .ellipsis { font-style: italic; color: #999; }
"#;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HtmlOptions {
    /// Only the first lyric line per section.
    pub condensed: bool,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self { condensed: true }
    }
}

/// Convert a Song to an HTML chord sheet
pub fn to_html(song: &Song, options: &HtmlOptions) -> String {
    let title = escape_html(song.title_or(FALLBACK_TITLE));
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n");
    html.push_str("<html lang=\"en\">\n");
    html.push_str("<head>\n");
    html.push_str("  <meta charset=\"UTF-8\">\n");
    html.push_str(
        "  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    html.push_str(&format!("  <title>{}</title>\n", title));
    html.push_str("  <style>\n");
    html.push_str(STYLE);
    html.push_str("  </style>\n");
    html.push_str("</head>\n");
    html.push_str("<body>\n");
    html.push_str(&format!("<h1>{}</h1>\n", title));

    for section in &song.sections {
        html.push_str(&format!(
            "<h2>[{} {} bars]</h2>\n",
            escape_html(&section.name),
            section.bars
        ));

        if options.condensed {
            let first_lyric = section
                .lines
                .iter()
                .find(|line| matches!(line, ParsedLine::TextLine { .. }));
            if let Some(line) = first_lyric {
                html.push_str(&line_to_html(line));
                html.push_str("<div class=\"ellipsis\">...</div>\n");
            }
        } else {
            for line in &section.lines {
                html.push_str(&line_to_html(line));
            }
        }
    }

    html.push_str("</body>\n");
    html.push_str("</html>\n");
    html
}

fn line_to_html(line: &ParsedLine) -> String {
    let (chords, lyrics) = match line {
        ParsedLine::ChordLine { tokens } => {
            let chords = tokens
                .iter()
                .map(|token| column_pair(token).0)
                .collect::<Vec<_>>()
                .join(" ");
            (chords, "\u{00A0}".to_string())
        }
        ParsedLine::TextLine { tokens } => align_columns(tokens),
    };

    format!(
        "<div class=\"line-pair\">\n<div class=\"chordline\">{}</div>\n<div class=\"textline\">{}</div>\n</div>\n",
        escape_html(&chords),
        escape_html(&lyrics)
    )
}

/// Chord row and lyric row with every token padded to a shared column width.
fn align_columns(tokens: &[Token]) -> (String, String) {
    let mut chords = String::new();
    let mut lyrics = String::new();

    for token in tokens {
        let (chord, word) = column_pair(token);
        let width = chord
            .chars()
            .count()
            .max(word.chars().count())
            .max(MIN_COLUMN);
        chords.push_str(&format!("{:<width$} ", chord, width = width));
        lyrics.push_str(&format!("{:<width$} ", word, width = width));
    }

    (
        chords.trim_end().to_string(),
        lyrics.trim_end().to_string(),
    )
}

/// What a token shows on the chord row and on the lyric row.
fn column_pair(token: &Token) -> (String, String) {
    match token {
        Token::Chord { name } => (name.clone(), String::new()),
        Token::Word { text } => (String::new(), text.clone()),
        Token::Hold => ("..".to_string(), String::new()),
        Token::Rest => ("REST".to_string(), String::new()),
        Token::OpenParen => ("(".to_string(), "(".to_string()),
        Token::CloseParen => (")".to_string(), ")".to_string()),
        Token::Repeat { count } => (format!("x{}", count), String::new()),
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
