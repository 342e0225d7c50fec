//! Contains [Args], which are parsed command-line flags.

use std::path::PathBuf;

use clap::Parser;

use media::PlaybackTime;

/// Parsed command line arguments.
#[derive(Parser, Debug, Clone, PartialEq, Eq, Hash)]
#[command(about = "Plays the video stream of a video file in real time (without a window).")]
pub struct Args {
    /// The video file to play.
    pub input: PathBuf,

    /// A JSON file with the video stream's settings.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Stop after this many seconds of playback.
    #[arg(long, value_parser = parse_seconds)]
    pub duration: Option<PlaybackTime>,

    /// How many times per second the stream is updated.
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..=1000))]
    pub ticks_per_second: u32,

    /// Save the last presented frame to this image file (e.g. `frame.png`).
    #[arg(long)]
    pub save_last_frame: Option<PathBuf>,

    #[cfg(debug_assertions)]
    /// Disable debug logging. This option only exists if `debug_assertions` are
    /// enabled.
    #[arg(long)]
    pub no_debug_logging: bool,

    #[cfg(debug_assertions)]
    /// Enable debug error log panics. This option only exists if
    /// `debug_assertions` are enabled.
    #[arg(long, conflicts_with = "no_debug_logging")]
    pub debug_error_log_panics: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self::parse()
    }
}

fn parse_seconds(s: &str) -> Result<PlaybackTime, String> {
    let seconds: f64 = s.parse().map_err(|_| format!("`{s}` isn't a number"))?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(format!("`{s}` isn't a positive number of seconds"));
    }

    Ok(PlaybackTime::from_millis((seconds * 1000.0) as i64))
}
