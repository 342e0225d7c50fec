//! Defines [play], which plays a video file's video stream against a [Timer]
//! until it ends, a time limit is hit or a stop signal is caught.

use std::rc::Rc;
use std::thread;
use std::time::Duration;

use media::ffmpeg_tools::VideoInput;
use media::{
    PacketQueue, PlaybackClock, PlaybackTime, Stream, Timer, VideoStream, VideoStreamConfig,
    VideoStreamError,
};
use util::json_file::{self, JsonFileError};
use util::stop_signals;

use crate::args::Args;

/// How many packets the demuxer tries to keep queued ahead of the decoder.
const QUEUED_PACKETS: usize = 32;

/// What happened during playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackReport {
    /// How many frames were presented.
    pub frames_presented: u64,
    /// Where the clock was when playback ended.
    pub position: PlaybackTime,
    /// Whether playback ended because of a stop signal.
    pub interrupted: bool,
}

/// Indicates that playback couldn't start or finish.
#[derive(thiserror::Error, Debug)]
pub enum PlaybackError {
    #[error("Failed to read the config file: {0}")]
    Config(#[from] JsonFileError),
    #[error("Failed to build the video stream: {0}")]
    Stream(#[from] VideoStreamError),
    #[error("Failed to save the last frame: {0}")]
    SaveFrame(#[from] image::ImageError),
}

/// Load the stream settings from the config file in `args` (or use the
/// defaults if there isn't one).
pub fn load_config(args: &Args) -> Result<VideoStreamConfig, PlaybackError> {
    match &args.config {
        Some(path) => Ok(json_file::read_json_file(path)?),
        None => Ok(VideoStreamConfig::default()),
    }
}

/// Play the video stream of `args.input` in real time.
pub fn play(args: &Args, config: VideoStreamConfig) -> Result<PlaybackReport, PlaybackError> {
    let mut input = VideoInput::open(&args.input)?;
    let codec = input.create_codec()?;

    let packets = Rc::new(PacketQueue::new());
    input.fill(&packets, QUEUED_PACKETS);

    let timer = Rc::new(Timer::new());
    let mut stream: VideoStream<_, _, _> =
        VideoStream::new(codec, Rc::clone(&packets), Rc::clone(&timer), config)?;

    util::debug_log_info!(
        "Playing a {} video stream (time base {}).",
        stream.descriptor().dimensions,
        stream.descriptor().time_base,
    );

    let tick = Duration::from_secs(1) / args.ticks_per_second;
    let mut interrupted = false;

    timer.play(&mut [&mut stream]);

    loop {
        if stop_signals::requested() {
            interrupted = true;
            break;
        }

        if let Some(limit) = args.duration
            && timer.offset() >= limit
        {
            break;
        }

        input.fill(&packets, QUEUED_PACKETS);
        stream.update();

        // Once every packet has been decoded, wait for the last frame's time
        // to pass before ending.
        if input.ended() && packets.is_empty() && stream.synchronization_gap().is_negative() {
            break;
        }

        thread::sleep(tick);
    }

    let report = PlaybackReport {
        frames_presented: stream.texture().generation(),
        position: timer.offset(),
        interrupted,
    };

    timer.stop(&mut [&mut stream]);
    // The codec was flushed, so anything still queued belongs to a stale position.
    packets.clear();

    if let Some(path) = &args.save_last_frame {
        stream.frame().save(path)?;
    }

    Ok(report)
}
