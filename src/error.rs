//! # Error Types
//!
//! Errors raised outside the parser. Parsing SongML text itself never fails: malformed
//! input degrades to fewer sections or fields (see [`crate::parser`]). Everything that
//! touches the filesystem, writes XML, or reads YAML configuration reports through
//! [`SongError`].
//!
//! ## Usage
//! ```rust
//! use songml::{files, SongError};
//!
//! match files::read_song("missing.txt") {
//!     Ok(song) => println!("{} bars", song.total_bars),
//!     Err(SongError::Io { path, source }) => eprintln!("cannot read {}: {}", path.display(), source),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SongError {
    /// Reading or writing a file failed.
    #[error("I/O error on '{}': {}", path.display(), source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing the timeline XML failed.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// YAML (de)serialization failed.
    ///
    /// # Example
    /// ```
    /// # use songml::SongError;
    /// let err: Result<songml::RenderConfig, _> = songml::RenderConfig::from_yaml("fps: [");
    /// assert!(matches!(err, Err(SongError::Yaml(_))));
    /// ```
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Walking an input directory failed.
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Configuration values that parse but make no sense.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl SongError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SongError::Io {
            path: path.into(),
            source,
        }
    }
}
