//! # Parser Module
//!
//! Builds a [`Song`] from SongML chart lines.
//!
//! ## Line-Based State Machine
//!
//! The parser walks the trimmed lines once, in one of three states:
//!
//! - **Normal** - section headers open sections; other non-empty lines are tokenized
//!   and appended to the open section.
//! - **InTempoBlock** - after `[Tempo]`. `BPM:` and `TimeSig:` lines are collected. A blank
//!   line or a line starting with `[` closes the block and is then handled as if read in
//!   the state the block was entered from.
//! - **InExtraBlock** - after `[Extra]`. `key: value` lines go into `Song::extra`.
//!
//! ## Timing
//!
//! Each section gets `start_bar` (the running bar total) and `start_time_seconds` when it
//! is closed, using the bar duration in effect at that moment. The bar duration is 0 until
//! a tempo block closes, so tempo must come before the sections it times.
//!
//! ## Entry Points
//! - [`parse`] for a whole source string
//! - [`parse_lines`] for lines already split
//! - [`parse_with_report`] to also get the warnings raised along the way
//!
//! ## Example
//! ```rust
//! use songml::parse;
//!
//! let source = "[Tempo]\nBPM: 90\n\n[Verse 8]\nHello {G} world\n";
//! let song = parse(source);
//! assert_eq!(song.tempo.unwrap().bpm, 90.0);
//! assert_eq!(song.sections[0].name, "Verse");
//! assert_eq!(song.total_bars, 8);
//! ```
//!
//! Parsing never fails. Malformed lines are skipped and zero-bar sections are reported
//! as warnings.

mod line;

pub use line::{classify, parse_line};

use std::collections::BTreeMap;
use std::fmt;

use crate::ast::*;
use crate::timing::bar_duration_for;

/// Parse a SongML source string.
pub fn parse(source: &str) -> Song {
    parse_lines(source.lines())
}

/// Parse SongML from already-split lines.
pub fn parse_lines<I, S>(lines: I) -> Song
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    SongParser::new().run(lines).song
}

/// Parse a SongML source string, keeping the diagnostics.
pub fn parse_with_report(source: &str) -> ParseReport {
    SongParser::new().run(source.lines())
}

/// A parsed song along with the warnings raised while parsing it.
#[derive(Debug, Clone)]
pub struct ParseReport {
    pub song: Song,
    pub diagnostics: Vec<Diagnostic>,
}

/// Something the parser tolerated but a chart author probably wants to know about.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// 1-based source line.
    pub line: usize,
    pub kind: DiagnosticKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticKind {
    /// A section header without a bar count (or with 0).
    ZeroBarSection { name: String },
    /// A chart line before any section header.
    DroppedLine { text: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DiagnosticKind::ZeroBarSection { name } => {
                write!(f, "line {}: section [{}] parsed with 0 bars", self.line, name)
            }
            DiagnosticKind::DroppedLine { text } => {
                write!(f, "line {}: '{}' is outside any section, dropped", self.line, text)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Normal,
    /// `from_extra` remembers an `[Extra]` block interrupted by `[Tempo]`.
    InTempoBlock { from_extra: bool },
    InExtraBlock,
}

/// The section currently receiving lines.
struct OpenSection {
    name: String,
    bars: u32,
    lines: Vec<ParsedLine>,
}

struct SongParser {
    state: State,
    sections: Vec<Section>,
    open: Option<OpenSection>,
    total_bars: u32,
    bar_duration: f64,
    tempo: Option<TempoInfo>,
    tempo_bpm: f64,
    tempo_sig: String,
    extra: BTreeMap<String, String>,
    diagnostics: Vec<Diagnostic>,
}

impl SongParser {
    fn new() -> Self {
        Self {
            state: State::Normal,
            sections: Vec::new(),
            open: None,
            total_bars: 0,
            bar_duration: 0.0,
            tempo: None,
            tempo_bpm: DEFAULT_BPM,
            tempo_sig: DEFAULT_TIME_SIGNATURE.to_string(),
            extra: BTreeMap::new(),
            diagnostics: Vec::new(),
        }
    }

    fn run<I, S>(mut self, lines: I) -> ParseReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for (index, raw) in lines.into_iter().enumerate() {
            self.line(index + 1, raw.as_ref().trim());
        }

        // A tempo block still open here never closed, so it sets no tempo.
        self.flush_section();

        ParseReport {
            song: Song {
                sections: self.sections,
                total_bars: self.total_bars,
                tempo: self.tempo,
                extra: self.extra,
            },
            diagnostics: self.diagnostics,
        }
    }

    fn line(&mut self, line_number: usize, line: &str) {
        if let State::InTempoBlock { .. } = self.state {
            if line.starts_with('[') || line.is_empty() {
                self.close_tempo_block();
            } else {
                if let Some((key, value)) = line.split_once(':') {
                    self.tempo_field(key, value);
                }
                return;
            }
        }

        if line.eq_ignore_ascii_case("[Tempo]") {
            self.state = State::InTempoBlock {
                from_extra: self.state == State::InExtraBlock,
            };
            self.tempo_bpm = DEFAULT_BPM;
            self.tempo_sig = DEFAULT_TIME_SIGNATURE.to_string();
        } else if line.eq_ignore_ascii_case("[Extra]") {
            self.flush_section();
            self.state = State::InExtraBlock;
        } else if line.starts_with('[') && line.contains(']') {
            self.flush_section();
            self.open_section(line_number, line);
            self.state = State::Normal;
        } else if self.state == State::InExtraBlock {
            if let Some((key, value)) = line.split_once(':') {
                self.extra
                    .insert(key.trim().to_string(), value.trim().to_string());
            }
        } else if !line.is_empty() {
            match self.open.as_mut() {
                Some(section) => section.lines.push(parse_line(line)),
                None => {
                    log::debug!("line {}: no open section, dropping '{}'", line_number, line);
                    self.diagnostics.push(Diagnostic {
                        line: line_number,
                        kind: DiagnosticKind::DroppedLine {
                            text: line.to_string(),
                        },
                    });
                }
            }
        }
    }

    fn tempo_field(&mut self, key: &str, value: &str) {
        let value = value.trim();
        match key.trim().to_lowercase().as_str() {
            "bpm" => {
                self.tempo_bpm = value
                    .parse::<f64>()
                    .ok()
                    .filter(|bpm| bpm.is_finite() && *bpm > 0.0)
                    .unwrap_or(DEFAULT_BPM);
            }
            "timesig" | "time signature" => self.tempo_sig = value.to_string(),
            _ => {}
        }
    }

    fn close_tempo_block(&mut self) {
        let tempo = TempoInfo::new(self.tempo_bpm, self.tempo_sig.clone());
        self.bar_duration = bar_duration_for(tempo.bpm, &tempo.time_signature);
        log::debug!(
            "tempo {} bpm in {}, bar = {:.3}s",
            tempo.bpm,
            tempo.time_signature,
            self.bar_duration
        );
        self.tempo = Some(tempo);
        self.state = match self.state {
            State::InTempoBlock { from_extra: true } => State::InExtraBlock,
            _ => State::Normal,
        };
    }

    fn open_section(&mut self, line_number: usize, header: &str) {
        let (name, bars) = parse_header(header);

        if bars == 0 {
            log::warn!(
                "line {}: section [{}] parsed with 0 bars",
                line_number,
                name
            );
            self.diagnostics.push(Diagnostic {
                line: line_number,
                kind: DiagnosticKind::ZeroBarSection { name: name.clone() },
            });
        }

        self.open = Some(OpenSection {
            name,
            bars,
            lines: Vec::new(),
        });
    }

    fn flush_section(&mut self) {
        let Some(open) = self.open.take() else {
            return;
        };
        self.sections.push(Section {
            name: open.name,
            bars: open.bars,
            start_bar: self.total_bars,
            start_time_seconds: self.total_bars as f64 * self.bar_duration,
            lines: open.lines,
        });
        self.total_bars = self.total_bars.saturating_add(open.bars);
    }
}

/// Split `[Name N]` into its name and bar count.
///
/// The bar count is the last whitespace-separated word when it is a non-negative
/// integer; otherwise the count is 0 and the whole body is the name.
pub fn parse_header(header: &str) -> (String, u32) {
    let body = header.strip_prefix('[').unwrap_or(header);
    let body = match body.find(']') {
        Some(end) => &body[..end],
        None => body,
    };
    let parts: Vec<&str> = body.split_whitespace().collect();

    match parts.split_last() {
        Some((last, rest)) => match last.parse::<u32>() {
            Ok(bars) => (rest.join(" "), bars),
            Err(_) => (parts.join(" "), 0),
        },
        None => (String::new(), 0),
    }
}
