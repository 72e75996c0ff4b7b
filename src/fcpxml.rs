//! # FCPXML Timeline Output
//!
//! Renders a [`Song`] as a Final Cut Pro XML timeline: one title per section on lane 0,
//! each carrying a connected title with the section's chords and lyrics, plus an
//! optional audio clip underneath.
//!
//! Every offset and duration goes through [`frame_aligned_duration`], so all clips sit
//! on whole frames.

use quick_xml::events::{BytesDecl, BytesText, Event};
use quick_xml::Writer;

use crate::ast::*;
use crate::error::SongError;
use crate::timing::{frame_aligned_duration, FrameRate, Timecode};

const FORMAT_ID: &str = "r1";
const EFFECT_ID: &str = "r2";
const ASSET_ID: &str = "a1";
const EFFECT_NAME: &str = "Graphic Text";
const EFFECT_UID: &str =
    ".../Titles.localized/Basic Text.localized/Graphic Text.localized/Graphic Text.moti";

const BACKGROUND_OPACITY_KEY: &str = "9999/10003/3296541111/3296541115/1/200/202";
const ALIGNMENT_KEY: &str = "9999/10003/13260/3296675261/2/373";

/// Shortest title the timeline will show, in seconds.
const MIN_TITLE_SECONDS: f64 = 0.5;
const SECTION_FONT_SIZE: &str = "96";
const CONTENT_FONT_SIZE: &str = "48";
const UNTITLED: &str = "Untitled Song";

/// Options for timeline output
#[derive(Debug, Clone, PartialEq)]
pub struct FcpxmlOptions {
    pub frame_rate: FrameRate,
    /// Audio file placed under the titles, referenced by name.
    pub audio_file: Option<String>,
    pub include_lyrics: bool,
    pub include_chords: bool,
}

impl Default for FcpxmlOptions {
    fn default() -> Self {
        Self {
            frame_rate: FrameRate::default(),
            audio_file: None,
            include_lyrics: true,
            include_chords: true,
        }
    }
}

type XmlWriter = Writer<Vec<u8>>;
type XmlResult = Result<(), quick_xml::Error>;

/// Convert a Song to FCPXML
pub fn to_fcpxml(song: &Song, options: &FcpxmlOptions) -> Result<String, SongError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    let layout = Layout::new(song, options);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::DocType(BytesText::from_escaped("fcpxml")))?;

    writer
        .create_element("fcpxml")
        .with_attribute(("version", "1.13"))
        .write_inner_content(|w| {
            write_resources(w, &layout)?;
            write_library(w, &layout)
        })?;

    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

/// Values shared by every part of the document.
struct Layout<'a> {
    song: &'a Song,
    options: &'a FcpxmlOptions,
    bar_duration: f64,
    total: Timecode,
}

impl<'a> Layout<'a> {
    fn new(song: &'a Song, options: &'a FcpxmlOptions) -> Self {
        let bar_duration = song.bar_duration();
        Self {
            song,
            options,
            bar_duration,
            total: frame_aligned_duration(song.total_bars as f64 * bar_duration, options.frame_rate),
        }
    }

    fn timecode(&self, seconds: f64) -> String {
        frame_aligned_duration(seconds, self.options.frame_rate).to_string()
    }
}

fn write_resources(w: &mut XmlWriter, layout: &Layout) -> XmlResult {
    let rate = layout.options.frame_rate;
    let format_name = format!("FFVideoFormat1080p{}", rate.nominal_fps());
    let frame_duration = rate.frame_duration().to_string();
    let total = layout.total.to_string();

    w.create_element("resources").write_inner_content(|w| {
        w.create_element("format")
            .with_attributes([
                ("id", FORMAT_ID),
                ("name", format_name.as_str()),
                ("frameDuration", frame_duration.as_str()),
                ("width", "1920"),
                ("height", "1080"),
                ("colorSpace", "1-1-1 (Rec. 709)"),
            ])
            .write_empty()?;

        if let Some(audio) = &layout.options.audio_file {
            let src = format!("file://localhost/{}", audio);
            w.create_element("asset")
                .with_attributes([
                    ("id", ASSET_ID),
                    ("name", audio.as_str()),
                    ("start", "0s"),
                    ("duration", total.as_str()),
                    ("hasVideo", "0"),
                    ("hasAudio", "1"),
                    ("format", FORMAT_ID),
                ])
                .write_inner_content(|w| {
                    w.create_element("media-rep")
                        .with_attributes([("kind", "original-media"), ("src", src.as_str())])
                        .write_empty()?;
                    Ok::<(), quick_xml::Error>(())
                })?;
        }

        w.create_element("effect")
            .with_attributes([("id", EFFECT_ID), ("name", EFFECT_NAME), ("uid", EFFECT_UID)])
            .write_empty()?;
        Ok::<(), quick_xml::Error>(())
    })?;
    Ok(())
}

fn write_library(w: &mut XmlWriter, layout: &Layout) -> XmlResult {
    let total = layout.total.to_string();
    let project_name = layout.song.title_or(UNTITLED);

    w.create_element("library").write_inner_content(|w| {
        w.create_element("event")
            .with_attribute(("name", "SongML"))
            .write_inner_content(|w| {
                w.create_element("project")
                    .with_attribute(("name", project_name))
                    .write_inner_content(|w| {
                        w.create_element("sequence")
                            .with_attributes([
                                ("duration", total.as_str()),
                                ("format", FORMAT_ID),
                                ("tcStart", "0s"),
                                ("tcFormat", "NDF"),
                            ])
                            .write_inner_content(|w| {
                                w.create_element("spine")
                                    .write_inner_content(|w| write_spine(w, layout))?;
                                Ok::<(), quick_xml::Error>(())
                            })?;
                        Ok::<(), quick_xml::Error>(())
                    })?;
                Ok::<(), quick_xml::Error>(())
            })?;
        Ok::<(), quick_xml::Error>(())
    })?;
    Ok(())
}

fn write_spine(w: &mut XmlWriter, layout: &Layout) -> XmlResult {
    if let Some(audio) = &layout.options.audio_file {
        let total = layout.total.to_string();
        w.create_element("asset-clip")
            .with_attributes([
                ("name", audio.as_str()),
                ("offset", "0s"),
                ("ref", ASSET_ID),
                ("duration", total.as_str()),
                ("start", "0s"),
                ("lane", "-1"),
            ])
            .write_empty()?;
    }

    for (index, section) in layout.song.sections.iter().enumerate() {
        write_section(w, layout, index, section)?;
    }
    Ok(())
}

fn write_section(w: &mut XmlWriter, layout: &Layout, index: usize, section: &Section) -> XmlResult {
    let offset = layout.timecode(section.start_time_seconds);
    let seconds = section
        .duration_seconds(layout.bar_duration)
        .max(MIN_TITLE_SECONDS);
    let duration = layout.timecode(seconds);
    let section_style = format!("ts_sec{}", index);
    let content_style = format!("cs_sec{}", index);
    let content = section_content(section, layout.options);

    title(w, &section.name, 0, &offset, &duration, |w| {
        param(w, "Background Opacity", BACKGROUND_OPACITY_KEY, "0")?;
        param(w, "Alignment", ALIGNMENT_KEY, "1 (Center) 0 (Top)")?;
        text_block(w, &section_style, &section.name, SECTION_FONT_SIZE)?;

        if !content.is_empty() {
            title(w, &content, 1, "0s", &duration, |w| {
                param(w, "Background Opacity", BACKGROUND_OPACITY_KEY, "0")?;
                text_block(w, &content_style, &content, CONTENT_FONT_SIZE)
            })?;
        }
        Ok(())
    })
}

fn title<F>(
    w: &mut XmlWriter,
    name: &str,
    lane: i32,
    offset: &str,
    duration: &str,
    inner: F,
) -> XmlResult
where
    F: FnOnce(&mut XmlWriter) -> XmlResult,
{
    let lane = lane.to_string();
    w.create_element("title")
        .with_attributes([
            ("name", name),
            ("lane", lane.as_str()),
            ("offset", offset),
            ("duration", duration),
            ("ref", EFFECT_ID),
        ])
        .write_inner_content(inner)?;
    Ok(())
}

fn param(w: &mut XmlWriter, name: &str, key: &str, value: &str) -> XmlResult {
    w.create_element("param")
        .with_attributes([("name", name), ("key", key), ("value", value)])
        .write_empty()?;
    Ok(())
}

/// `<text>` with its styled run, followed by the style definition.
fn text_block(w: &mut XmlWriter, style_id: &str, content: &str, font_size: &str) -> XmlResult {
    w.create_element("text").write_inner_content(|w| {
        w.create_element("text-style")
            .with_attribute(("ref", style_id))
            .write_text_content(BytesText::new(content))?;
        Ok::<(), quick_xml::Error>(())
    })?;

    w.create_element("text-style-def")
        .with_attribute(("id", style_id))
        .write_inner_content(|w| {
            w.create_element("text-style")
                .with_attributes([
                    ("font", "Helvetica Neue"),
                    ("fontSize", font_size),
                    ("fontColor", "1 1 1 1"),
                    ("bold", "1"),
                    ("alignment", "center"),
                ])
                .write_empty()?;
            Ok::<(), quick_xml::Error>(())
        })?;
    Ok(())
}

/// Chords and lyrics of a section as display text, one chart line per text line.
pub fn section_content(section: &Section, options: &FcpxmlOptions) -> String {
    section
        .lines
        .iter()
        .filter_map(|line| line_text(line, options))
        .collect::<Vec<_>>()
        .join("\n")
}

fn line_text(line: &ParsedLine, options: &FcpxmlOptions) -> Option<String> {
    let inline_chords = match line {
        ParsedLine::ChordLine { .. } if !options.include_chords => return None,
        ParsedLine::TextLine { .. } if !options.include_lyrics => return None,
        ParsedLine::ChordLine { .. } => false,
        ParsedLine::TextLine { .. } => true,
    };

    let text = line
        .tokens()
        .iter()
        .filter_map(|token| match token {
            Token::Chord { .. } if !options.include_chords => None,
            Token::Chord { name } if inline_chords => Some(format!("[{}]", name)),
            Token::Chord { name } => Some(name.clone()),
            Token::Word { text } => Some(text.clone()),
            Token::Hold => Some("..".to_string()),
            Token::Rest => Some("REST".to_string()),
            Token::OpenParen => Some("(".to_string()),
            Token::CloseParen => Some(")".to_string()),
            Token::Repeat { count } => Some(format!("x{}", count)),
        })
        .collect::<Vec<_>>()
        .join(" ");

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    const SONG: &str = r#"[Tempo]
BPM: 120
TimeSig: 4/4

[Intro 2]
{D} .. {G} x2

[Verse 4]
Hello {G} world

[Extra]
Title: Test & Song
"#;

    #[test]
    fn test_document_skeleton() {
        let song = parse(SONG);
        let xml = to_fcpxml(&song, &FcpxmlOptions::default()).unwrap();

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains("<!DOCTYPE fcpxml>"));
        assert!(xml.contains(r#"<fcpxml version="1.13">"#));
        assert!(xml.contains(r#"name="FFVideoFormat1080p30""#));
        assert!(xml.contains(r#"frameDuration="1/30s""#));
        assert!(xml.contains(r#"<project name="Test &amp; Song">"#));
        // 6 bars at 2s = 12s = 360 frames
        assert!(xml.contains(r#"<sequence duration="360/30s""#));
        assert!(!xml.contains("asset-clip"));
    }

    #[test]
    fn test_section_titles_are_frame_aligned() {
        let song = parse(SONG);
        let xml = to_fcpxml(&song, &FcpxmlOptions::default()).unwrap();

        assert!(xml.contains(r#"name="Intro" lane="0" offset="0/30s" duration="120/30s""#));
        assert!(xml.contains(r#"name="Verse" lane="0" offset="120/30s" duration="240/30s""#));
        assert!(xml.contains(r#"<text-style ref="ts_sec1">Verse</text-style>"#));
        assert!(xml.contains(r#"<text-style-def id="cs_sec0">"#));
        assert_eq!(xml.matches(r#"lane="0""#).count(), 2);
        assert_eq!(xml.matches(r#"lane="1""#).count(), 2);
    }

    #[test]
    fn test_audio_asset() {
        let song = parse(SONG);
        let options = FcpxmlOptions {
            audio_file: Some("song.mp3".to_string()),
            ..FcpxmlOptions::default()
        };
        let xml = to_fcpxml(&song, &options).unwrap();

        assert!(xml.contains(r#"<asset id="a1" name="song.mp3""#));
        assert!(xml.contains(r#"src="file://localhost/song.mp3""#));
        assert!(xml.contains(r#"<asset-clip name="song.mp3" offset="0s" ref="a1" duration="360/30s""#));
    }

    #[test]
    fn test_zero_bar_section_gets_minimum_duration() {
        let song = parse("[Tempo]\nBPM: 120\n\n[Break]\n");
        let xml = to_fcpxml(&song, &FcpxmlOptions::default()).unwrap();
        assert!(xml.contains(r#"name="Break" lane="0" offset="0/30s" duration="15/30s""#));
    }

    #[test]
    fn test_untitled_project() {
        let song = parse("[A 1]");
        let xml = to_fcpxml(&song, &FcpxmlOptions::default()).unwrap();
        assert!(xml.contains(r#"<project name="Untitled Song">"#));
    }

    #[test]
    fn test_section_content() {
        let song = parse(SONG);
        let options = FcpxmlOptions::default();
        assert_eq!(section_content(&song.sections[0], &options), "D .. G x2");
        assert_eq!(section_content(&song.sections[1], &options), "Hello [G] world");
    }

    #[test]
    fn test_section_content_filters() {
        let song = parse("[A 4]\n{D} {G}\nSing {C} along\n");
        let no_chords = FcpxmlOptions {
            include_chords: false,
            ..FcpxmlOptions::default()
        };
        assert_eq!(section_content(&song.sections[0], &no_chords), "Sing along");

        let no_lyrics = FcpxmlOptions {
            include_lyrics: false,
            ..FcpxmlOptions::default()
        };
        assert_eq!(section_content(&song.sections[0], &no_lyrics), "D G");
    }

    #[test]
    fn test_empty_section_has_no_content_title() {
        let song = parse("[A 4]\n");
        let xml = to_fcpxml(&song, &FcpxmlOptions::default()).unwrap();
        assert!(!xml.contains(r#"lane="1""#));
    }

    #[test]
    fn test_fractional_frame_rate() {
        let song = parse("[Tempo]\nBPM: 120\n\n[A 1]\n");
        let options = FcpxmlOptions {
            frame_rate: FrameRate::from_fps(29.97),
            ..FcpxmlOptions::default()
        };
        let xml = to_fcpxml(&song, &options).unwrap();
        assert!(xml.contains(r#"frameDuration="100/2997s""#));
        // 2s at 29.97 = 59.94 -> 60 frames
        assert!(xml.contains(r#"duration="6000/2997s""#));
    }
}
