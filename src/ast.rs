//! # Song Model Types
//!
//! The parsed representation of a SongML chart. Everything here is plain data created
//! in one parse pass and read-only afterwards.
//!
//! ## Type Hierarchy
//! ```text
//! Song
//!   ├── tempo: Option<TempoInfo> (bpm, time signature, swing)
//!   ├── extra: BTreeMap<String, String> ([Extra] key/value pairs)
//!   ├── total_bars
//!   └── Vec<Section>
//!         ├── name, bars
//!         ├── start_bar, start_time_seconds (derived when the section is closed)
//!         └── Vec<ParsedLine>
//!               ├── ChordLine { tokens } (no Word tokens)
//!               └── TextLine { tokens }  (lyrics, chords may be inline)
//!
//! Token (enum)
//!   ├── Chord { name }   {D}, {Am7}
//!   ├── Word { text }    lyric text
//!   ├── Hold             ..
//!   ├── Rest             {REST} or {--}
//!   ├── OpenParen / CloseParen
//!   └── Repeat { count } x4
//! ```
//!
//! ## Timing
//! A section's `start_time_seconds` is fixed with the bar duration in effect when the
//! parser closed it. Sections closed before any `[Tempo]` block keep a start time of 0.
//!
//! ## Related Modules
//! - `lexer` - Produces `Token`s
//! - `parser` - Builds `Song` from lines
//! - `timing` - Bar durations and frame-aligned timecodes
//! - `fcpxml`, `html` - Render a `Song`

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::SongError;
use crate::timing;

pub const DEFAULT_BPM: f64 = 120.0;
pub const DEFAULT_TIME_SIGNATURE: &str = "4/4";

/// A lexical token from one chart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Token {
    Chord { name: String },
    Word { text: String },
    Hold,
    Rest,
    OpenParen,
    CloseParen,
    Repeat { count: u32 },
}

impl Token {
    pub fn chord(name: impl Into<String>) -> Self {
        Token::Chord { name: name.into() }
    }

    pub fn word(text: impl Into<String>) -> Self {
        Token::Word { text: text.into() }
    }

    pub fn is_word(&self) -> bool {
        matches!(self, Token::Word { .. })
    }
}

/// Writes the token back in SongML notation.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Chord { name } => write!(f, "{{{}}}", name),
            Token::Word { text } => f.write_str(text),
            Token::Hold => f.write_str(".."),
            Token::Rest => f.write_str("{REST}"),
            Token::OpenParen => f.write_str("("),
            Token::CloseParen => f.write_str(")"),
            Token::Repeat { count } => write!(f, "x{}", count),
        }
    }
}

/// One classified chart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParsedLine {
    /// Only chords and markers, no lyric words.
    ChordLine { tokens: Vec<Token> },
    /// Lyric line; chords may appear inline.
    TextLine { tokens: Vec<Token> },
}

impl ParsedLine {
    pub fn tokens(&self) -> &[Token] {
        match self {
            ParsedLine::ChordLine { tokens } | ParsedLine::TextLine { tokens } => tokens,
        }
    }

    pub fn is_chord_line(&self) -> bool {
        matches!(self, ParsedLine::ChordLine { .. })
    }
}

/// Tempo block contents. At most one per song.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TempoInfo {
    pub bpm: f64,
    pub time_signature: String,
    /// Reserved; the parser never sets it.
    pub swing: bool,
}

impl Default for TempoInfo {
    fn default() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            time_signature: DEFAULT_TIME_SIGNATURE.to_string(),
            swing: false,
        }
    }
}

impl TempoInfo {
    pub fn new(bpm: f64, time_signature: impl Into<String>) -> Self {
        Self {
            bpm,
            time_signature: time_signature.into(),
            swing: false,
        }
    }

    /// Numerator of the time signature, 4 when it can't be read.
    pub fn beats_per_bar(&self) -> u32 {
        timing::beats_per_bar(&self.time_signature)
    }

    pub fn bar_duration(&self) -> f64 {
        timing::bar_duration_seconds(Some(self))
    }
}

/// A named, bar-counted block of the song.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub name: String,
    pub bars: u32,
    pub start_bar: u32,
    pub start_time_seconds: f64,
    pub lines: Vec<ParsedLine>,
}

impl Section {
    /// Header line as it would appear in a chart, e.g. `[Verse 8]`.
    ///
    /// The count is always written, so a name ending in a number still parses back
    /// to the same name and bar count.
    pub fn header(&self) -> String {
        format!("[{} {}]", self.name, self.bars)
    }

    pub fn duration_seconds(&self, bar_duration: f64) -> f64 {
        self.bars as f64 * bar_duration
    }
}

/// The parse result.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Song {
    pub sections: Vec<Section>,
    pub total_bars: u32,
    pub tempo: Option<TempoInfo>,
    pub extra: BTreeMap<String, String>,
}

impl Song {
    /// Bar duration in seconds for this song's tempo, defaults when there is none.
    pub fn bar_duration(&self) -> f64 {
        timing::bar_duration_seconds(self.tempo.as_ref())
    }

    pub fn total_duration_seconds(&self) -> f64 {
        self.total_bars as f64 * self.bar_duration()
    }

    /// `Title` from the `[Extra]` block.
    pub fn title(&self) -> Option<&str> {
        self.extra.get("Title").map(String::as_str)
    }

    pub fn title_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.title().unwrap_or(fallback)
    }

    pub fn to_yaml(&self) -> Result<String, SongError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_display_round_trips_notation() {
        let tokens = vec![
            Token::chord("Am7"),
            Token::word("hello"),
            Token::Hold,
            Token::Rest,
            Token::OpenParen,
            Token::CloseParen,
            Token::Repeat { count: 4 },
        ];
        let text: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
        assert_eq!(text, vec!["{Am7}", "hello", "..", "{REST}", "(", ")", "x4"]);
    }

    #[test]
    fn test_section_header() {
        let section = Section {
            name: "Lead In".to_string(),
            bars: 4,
            start_bar: 0,
            start_time_seconds: 0.0,
            lines: vec![],
        };
        assert_eq!(section.header(), "[Lead In 4]");

        let empty = Section { bars: 0, ..section };
        assert_eq!(empty.header(), "[Lead In 0]");
    }

    #[test]
    fn test_zero_bar_header_keeps_numeric_name() {
        let section = Section {
            name: "Verse 2".to_string(),
            bars: 0,
            start_bar: 0,
            start_time_seconds: 0.0,
            lines: vec![],
        };
        assert_eq!(section.header(), "[Verse 2 0]");
        assert_eq!(
            crate::parser::parse_header(&section.header()),
            ("Verse 2".to_string(), 0)
        );
    }

    #[test]
    fn test_tempo_defaults() {
        let tempo = TempoInfo::default();
        assert_eq!(tempo.bpm, 120.0);
        assert_eq!(tempo.time_signature, "4/4");
        assert!(!tempo.swing);
        assert_eq!(tempo.beats_per_bar(), 4);
        assert_eq!(tempo.bar_duration(), 2.0);
    }

    #[test]
    fn test_song_title_fallback() {
        let mut song = Song::default();
        assert_eq!(song.title(), None);
        assert_eq!(song.title_or("Untitled Song"), "Untitled Song");

        song.extra.insert("Title".to_string(), "My Song".to_string());
        assert_eq!(song.title_or("Untitled Song"), "My Song");
    }

    #[test]
    fn test_song_yaml_dump() {
        let song = Song {
            sections: vec![Section {
                name: "Intro".to_string(),
                bars: 2,
                start_bar: 0,
                start_time_seconds: 0.0,
                lines: vec![ParsedLine::ChordLine {
                    tokens: vec![Token::chord("D")],
                }],
            }],
            total_bars: 2,
            tempo: Some(TempoInfo::new(90.0, "3/4")),
            extra: BTreeMap::new(),
        };
        let yaml = song.to_yaml().unwrap();
        assert!(yaml.contains("name: Intro"));
        assert!(yaml.contains("type: chord_line"));
        assert!(yaml.contains("type: chord"));
        assert!(yaml.contains("time_signature: 3/4"));
    }
}
