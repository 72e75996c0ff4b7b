use clap::{Args, Parser, Subcommand};
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::path::{Path, PathBuf};
use std::process;

use songml::files::{discover_song_files, output_path, read_song, sibling_audio_name, write_output};
use songml::{to_fcpxml, to_html, FrameRate, RenderConfig, SongError};

#[derive(Parser)]
#[command(name = "songml")]
#[command(about = "Generate formatted outputs from SongML charts")]
struct Cli {
    /// YAML render configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show debug diagnostics
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only show errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a Final Cut Pro XML timeline
    Fcpxml {
        #[command(flatten)]
        io: IoArgs,

        /// Frames per second
        #[arg(long)]
        fps: Option<f64>,

        /// Leave lyric lines out of the titles
        #[arg(long)]
        no_lyrics: bool,

        /// Leave chords out of the titles
        #[arg(long)]
        no_chords: bool,

        /// Don't reference an audio file next to the chart
        #[arg(long)]
        no_audio: bool,
    },
    /// Generate an HTML chord sheet
    Html {
        #[command(flatten)]
        io: IoArgs,

        /// Render every line instead of the first lyric line per section
        #[arg(long)]
        expanded: bool,
    },
    /// Print the parsed song as YAML
    Dump {
        /// Path to a SongML file or directory
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(Args)]
struct IoArgs {
    /// Path to a SongML file or directory
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory (defaults to next to each input file)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Writes log records to stderr.
struct StderrLogger {
    level: LevelFilter,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        match record.level() {
            Level::Info => eprintln!("{}", record.args()),
            level => eprintln!("{}: {}", level.as_str().to_lowercase(), record.args()),
        }
    }

    fn flush(&self) {}
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else if quiet {
        LevelFilter::Error
    } else {
        LevelFilter::Info
    };
    if log::set_boxed_logger(Box::new(StderrLogger { level })).is_ok() {
        log::set_max_level(level);
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if let Err(e) = run(cli) {
        log::error!("{}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), SongError> {
    let mut config = match &cli.config {
        Some(path) => RenderConfig::load(path)?,
        None => RenderConfig::default(),
    };

    match cli.command {
        Command::Fcpxml {
            io,
            fps,
            no_lyrics,
            no_chords,
            no_audio,
        } => {
            if let Some(fps) = fps {
                if !fps.is_finite() || fps <= 0.0 {
                    return Err(SongError::Config(format!(
                        "--fps must be a positive number, got {}",
                        fps
                    )));
                }
                config.fps = fps;
            }
            config.include_lyrics &= !no_lyrics;
            config.include_chords &= !no_chords;
            config.include_audio &= !no_audio;
            generate_fcpxml(&io, &config)
        }
        Command::Html { io, expanded } => {
            config.condensed &= !expanded;
            generate_html(&io, &config)
        }
        Command::Dump { input } => dump(&input),
    }
}

fn generate_fcpxml(io: &IoArgs, config: &RenderConfig) -> Result<(), SongError> {
    let rate = FrameRate::from_fps(config.fps);
    log::debug!("frame rate {} fps", rate.fps());

    for file in discover_song_files(&io.input)? {
        let song = read_song(&file)?;
        let mut options = config.fcpxml_options();
        if config.include_audio {
            options.audio_file = Some(sibling_audio_name(&file, &config.audio_extension));
        }

        let xml = to_fcpxml(&song, &options)?;
        let out = output_path(&file, io.output.as_deref(), "fcpxml");
        write_output(&out, &xml)?;
        log::info!("FCPXML written to {}", display_path(&out));
    }
    Ok(())
}

fn generate_html(io: &IoArgs, config: &RenderConfig) -> Result<(), SongError> {
    for file in discover_song_files(&io.input)? {
        let song = read_song(&file)?;
        let html = to_html(&song, &config.html_options());
        let out = output_path(&file, io.output.as_deref(), "html");
        write_output(&out, &html)?;
        log::info!("HTML written to {}", display_path(&out));
    }
    Ok(())
}

fn dump(input: &Path) -> Result<(), SongError> {
    for file in discover_song_files(input)? {
        let song = read_song(&file)?;
        println!("# {}", file.display());
        print!("{}", song.to_yaml()?);
    }
    Ok(())
}

fn display_path(path: &Path) -> String {
    path.canonicalize()
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}
