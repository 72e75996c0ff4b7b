//! Render configuration loaded from YAML.
//!
//! ```yaml
//! fps: 25
//! include_chords: false
//! audio_extension: wav
//! ```
//!
//! Missing keys take their defaults; command-line flags override what the file says.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::SongError;
use crate::fcpxml::FcpxmlOptions;
use crate::html::HtmlOptions;
use crate::timing::FrameRate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Timeline frame rate.
    pub fps: f64,
    pub include_lyrics: bool,
    pub include_chords: bool,
    /// Put the song's audio file under the timeline titles.
    pub include_audio: bool,
    /// HTML sheets show only the first lyric line per section.
    pub condensed: bool,
    /// Extension of the audio file that sits next to each chart.
    pub audio_extension: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fps: 30.0,
            include_lyrics: true,
            include_chords: true,
            include_audio: true,
            condensed: true,
            audio_extension: "mp3".to_string(),
        }
    }
}

impl RenderConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SongError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SongError::io(path, e))?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, SongError> {
        let config: RenderConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), SongError> {
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(SongError::Config(format!(
                "fps must be a positive number, got {}",
                self.fps
            )));
        }
        if self.audio_extension.trim().is_empty() {
            return Err(SongError::Config(
                "audio_extension must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Timeline options; `audio_file` is filled in per song by the caller.
    pub fn fcpxml_options(&self) -> FcpxmlOptions {
        FcpxmlOptions {
            frame_rate: FrameRate::from_fps(self.fps),
            audio_file: None,
            include_lyrics: self.include_lyrics,
            include_chords: self.include_chords,
        }
    }

    pub fn html_options(&self) -> HtmlOptions {
        HtmlOptions {
            condensed: self.condensed,
        }
    }
}
