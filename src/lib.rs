pub mod ast;
pub mod config;
pub mod error;
pub mod fcpxml;
pub mod files;
pub mod html;
pub mod lexer;
pub mod parser;
pub mod timing;

pub use ast::*;
pub use config::RenderConfig;
pub use error::*;
pub use fcpxml::{to_fcpxml, FcpxmlOptions};
pub use html::{to_html, HtmlOptions};
pub use parser::{parse, parse_lines, parse_with_report, Diagnostic, DiagnosticKind, ParseReport};
pub use timing::{bar_duration_seconds, frame_aligned_duration, FrameRate, Timecode};

/// Render a SongML source string as an FCPXML timeline.
pub fn render_fcpxml(source: &str, options: &FcpxmlOptions) -> Result<String, SongError> {
    let song = parse(source);
    to_fcpxml(&song, options)
}

/// Render a SongML source string as an HTML chord sheet.
pub fn render_html(source: &str, options: &HtmlOptions) -> String {
    to_html(&parse(source), options)
}
