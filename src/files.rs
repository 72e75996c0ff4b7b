//! Locating chart files and naming the files rendered from them.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::ast::Song;
use crate::error::SongError;
use crate::parser::parse;

/// Extension of SongML chart files.
pub const SONG_EXTENSION: &str = "txt";

/// A file yields itself; a directory yields every `.txt` file below it, sorted.
pub fn discover_song_files(path: impl AsRef<Path>) -> Result<Vec<PathBuf>, SongError> {
    let path = path.as_ref();
    let metadata = std::fs::metadata(path).map_err(|e| SongError::io(path, e))?;
    if !metadata.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path) {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .map_or(false, |ext| ext == SONG_EXTENSION)
        {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// `{output_dir}/{stem}.{extension}`, or the input path with a new extension.
pub fn output_path(input: &Path, output_dir: Option<&Path>, extension: &str) -> PathBuf {
    match (output_dir, input.file_stem()) {
        (Some(dir), Some(stem)) => {
            let mut name = stem.to_os_string();
            name.push(".");
            name.push(extension);
            dir.join(name)
        }
        _ => input.with_extension(extension),
    }
}

/// File name of the audio track expected next to a chart, e.g. `song.txt` -> `song.mp3`.
pub fn sibling_audio_name(input: &Path, audio_extension: &str) -> String {
    input
        .with_extension(audio_extension)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub fn read_song(path: impl AsRef<Path>) -> Result<Song, SongError> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|e| SongError::io(path, e))?;
    Ok(parse(&source))
}

/// Write `content`, creating parent directories as needed.
pub fn write_output(path: &Path, content: &str) -> Result<(), SongError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| SongError::io(parent, e))?;
    }
    std::fs::write(path, content).map_err(|e| SongError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_discover_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("song.md");
        fs::write(&file, "[A 1]").unwrap();
        assert_eq!(discover_song_files(&file).unwrap(), vec![file]);
    }

    #[test]
    fn test_discover_directory_recursively() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("set2")).unwrap();
        fs::write(dir.path().join("b.txt"), "").unwrap();
        fs::write(dir.path().join("a.txt"), "").unwrap();
        fs::write(dir.path().join("notes.md"), "").unwrap();
        fs::write(dir.path().join("set2").join("c.txt"), "").unwrap();

        let files = discover_song_files(dir.path()).unwrap();
        assert_eq!(
            files,
            vec![
                dir.path().join("a.txt"),
                dir.path().join("b.txt"),
                dir.path().join("set2").join("c.txt"),
            ]
        );
    }

    #[test]
    fn test_discover_missing_path() {
        let err = discover_song_files("/nonexistent/charts").unwrap_err();
        assert!(matches!(err, SongError::Io { .. }));
    }

    #[test]
    fn test_output_path() {
        let input = Path::new("charts/royal_soldier.txt");
        assert_eq!(
            output_path(input, None, "fcpxml"),
            PathBuf::from("charts/royal_soldier.fcpxml")
        );
        assert_eq!(
            output_path(input, Some(Path::new("out")), "html"),
            PathBuf::from("out/royal_soldier.html")
        );
    }

    #[test]
    fn test_sibling_audio_name() {
        assert_eq!(
            sibling_audio_name(Path::new("charts/royal_soldier.txt"), "mp3"),
            "royal_soldier.mp3"
        );
    }

    #[test]
    fn test_read_and_write() {
        let dir = tempfile::tempdir().unwrap();
        let chart = dir.path().join("song.txt");
        fs::write(&chart, "[Verse 8]\nla la {G}\n").unwrap();
        let song = read_song(&chart).unwrap();
        assert_eq!(song.total_bars, 8);

        let out = dir.path().join("nested").join("song.html");
        write_output(&out, "<html></html>").unwrap();
        assert_eq!(fs::read_to_string(out).unwrap(), "<html></html>");
    }
}
