//! # Timing
//!
//! Bar durations and frame-aligned timecodes.
//!
//! Renderers place titles on a video timeline whose positions must land on whole frames.
//! Durations are therefore rounded to a frame count and kept as an exact fraction
//! (`frames × ticks_per_frame / timebase`) rather than as decimal seconds, so repeated
//! placements never drift off the frame grid.
//!
//! ## Example
//! ```rust
//! use songml::timing::{frame_aligned_duration, FrameRate};
//!
//! let rate = FrameRate::from_fps(30.0);
//! assert_eq!(frame_aligned_duration(2.0, rate).to_string(), "60/30s");
//! ```

use num_rational::Rational64;
use std::fmt;

use crate::ast::{TempoInfo, DEFAULT_BPM};

const DEFAULT_BEATS_PER_BAR: u32 = 4;
const DEFAULT_FPS: i64 = 30;

/// Numerator of an `N/M` time signature, 4 when it can't be read.
pub fn beats_per_bar(time_signature: &str) -> u32 {
    time_signature
        .split('/')
        .next()
        .and_then(|n| n.trim().parse::<u32>().ok())
        .unwrap_or(DEFAULT_BEATS_PER_BAR)
}

/// Duration of one bar in seconds: `beats_per_bar × 60 / bpm`.
///
/// A missing tempo uses the defaults (120 bpm, 4/4), giving 2 seconds.
pub fn bar_duration_seconds(tempo: Option<&TempoInfo>) -> f64 {
    match tempo {
        Some(tempo) => bar_duration_for(tempo.bpm, &tempo.time_signature),
        None => bar_duration_for(DEFAULT_BPM, crate::ast::DEFAULT_TIME_SIGNATURE),
    }
}

pub(crate) fn bar_duration_for(bpm: f64, time_signature: &str) -> f64 {
    beats_per_bar(time_signature) as f64 * (60.0 / bpm)
}

/// An exact frame rate, `timebase / ticks_per_frame` frames per second.
///
/// Integral rates have one tick per frame (`30/1`). Fractional rates are held in
/// hundredths, so 29.97 becomes `2997/100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRate {
    timebase: i64,
    ticks_per_frame: i64,
}

impl FrameRate {
    pub fn from_fps(fps: f64) -> Self {
        if !fps.is_finite() || fps <= 0.0 {
            return Self::default();
        }
        if fps.fract() == 0.0 {
            return Self {
                timebase: fps as i64,
                ticks_per_frame: 1,
            };
        }
        let hundredths = (fps * 100.0).round() as i64;
        if hundredths == 0 {
            return Self::default();
        }
        if hundredths % 100 == 0 {
            Self {
                timebase: hundredths / 100,
                ticks_per_frame: 1,
            }
        } else {
            Self {
                timebase: hundredths,
                ticks_per_frame: 100,
            }
        }
    }

    pub fn fps(&self) -> f64 {
        self.timebase as f64 / self.ticks_per_frame as f64
    }

    /// Whole frames per second, used in format names like `FFVideoFormat1080p30`.
    pub fn nominal_fps(&self) -> i64 {
        self.fps().round() as i64
    }

    /// Duration of a single frame.
    pub fn frame_duration(&self) -> Timecode {
        self.frames(1)
    }

    pub fn frames(&self, count: i64) -> Timecode {
        Timecode {
            ticks: count * self.ticks_per_frame,
            timebase: self.timebase,
        }
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self {
            timebase: DEFAULT_FPS,
            ticks_per_frame: 1,
        }
    }
}

/// An exact duration of `ticks / timebase` seconds.
///
/// `Display` writes FCPXML time notation without reducing the fraction, e.g. `2460/30s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timecode {
    ticks: i64,
    timebase: i64,
}

impl Timecode {
    pub fn ticks(&self) -> i64 {
        self.ticks
    }

    pub fn timebase(&self) -> i64 {
        self.timebase
    }

    pub fn as_ratio(&self) -> Rational64 {
        Rational64::new(self.ticks, self.timebase)
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.ticks as f64 / self.timebase as f64
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}s", self.ticks, self.timebase)
    }
}

/// Round `seconds` to the nearest whole frame at `rate`.
///
/// Negative and NaN durations clamp to zero frames.
pub fn frame_aligned_duration(seconds: f64, rate: FrameRate) -> Timecode {
    let frames = (seconds * rate.fps()).round();
    let frames = if frames.is_nan() || frames < 0.0 {
        0
    } else {
        frames as i64
    };
    rate.frames(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_beats_per_bar() {
        assert_eq!(beats_per_bar("4/4"), 4);
        assert_eq!(beats_per_bar("3/4"), 3);
        assert_eq!(beats_per_bar("6/8"), 6);
        assert_eq!(beats_per_bar(" 7 / 8"), 7);
        assert_eq!(beats_per_bar("waltz"), 4);
        assert_eq!(beats_per_bar(""), 4);
    }

    #[test]
    fn test_zero_numerator_is_kept() {
        assert_eq!(beats_per_bar("0/4"), 0);
        let tempo = TempoInfo::new(100.0, "0/4");
        assert_eq!(bar_duration_seconds(Some(&tempo)), 0.0);
    }

    #[test]
    fn test_bar_duration() {
        assert_relative_eq!(bar_duration_seconds(None), 2.0);

        let tempo = TempoInfo::new(82.0, "4/4");
        assert_relative_eq!(bar_duration_seconds(Some(&tempo)), 240.0 / 82.0);

        let waltz = TempoInfo::new(90.0, "3/4");
        assert_relative_eq!(bar_duration_seconds(Some(&waltz)), 2.0);
    }

    #[test]
    fn test_frame_rate_from_fps() {
        assert_eq!(FrameRate::from_fps(30.0).frame_duration().to_string(), "1/30s");
        assert_eq!(FrameRate::from_fps(25.0).frame_duration().to_string(), "1/25s");
        assert_eq!(
            FrameRate::from_fps(29.97).frame_duration().to_string(),
            "100/2997s"
        );
        assert_eq!(
            FrameRate::from_fps(23.976).frame_duration().to_string(),
            "100/2398s"
        );
        assert_eq!(FrameRate::from_fps(0.0), FrameRate::default());
        assert_eq!(FrameRate::from_fps(-24.0), FrameRate::default());
        assert_eq!(FrameRate::from_fps(f64::NAN), FrameRate::default());
        assert_eq!(FrameRate::from_fps(29.97).nominal_fps(), 30);
    }

    #[test]
    fn test_frame_aligned_duration_rounds_to_nearest_frame() {
        let rate = FrameRate::from_fps(30.0);
        assert_eq!(frame_aligned_duration(2.0, rate).to_string(), "60/30s");
        assert_eq!(frame_aligned_duration(0.51, rate).to_string(), "15/30s");
        assert_eq!(frame_aligned_duration(0.52, rate).to_string(), "16/30s");
        assert_eq!(frame_aligned_duration(0.0, rate).to_string(), "0/30s");
    }

    #[test]
    fn test_frame_aligned_duration_fractional_rate() {
        let rate = FrameRate::from_fps(29.97);
        let tc = frame_aligned_duration(1.0, rate);
        assert_eq!(tc.to_string(), "3000/2997s");
        assert_eq!(tc.as_ratio(), Rational64::new(1000, 999));
    }

    #[test]
    fn test_frame_aligned_duration_clamps_negative() {
        let rate = FrameRate::default();
        assert_eq!(frame_aligned_duration(-3.0, rate).ticks(), 0);
        assert_eq!(frame_aligned_duration(f64::NAN, rate).ticks(), 0);
    }

    #[test]
    fn test_timecode_is_exact() {
        let tempo = TempoInfo::new(82.0, "4/4");
        let rate = FrameRate::from_fps(30.0);
        let tc = frame_aligned_duration(18.0 * tempo.bar_duration(), rate);
        // 18 bars at 82 bpm = 52.68s = 1580.49 frames
        assert_eq!(tc.to_string(), "1580/30s");
        assert_eq!(tc.as_ratio(), Rational64::new(158, 3));
        assert_relative_eq!(tc.as_secs_f64(), 1580.0 / 30.0);
    }
}
