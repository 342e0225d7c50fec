//! This library contains the video stage of a playback pipeline: decoding a
//! stream's packets, converting the pictures to RGBA and presenting them in
//! sync with a playback clock.

pub mod clock;
pub mod codec;
pub mod config;
pub mod errors;
#[cfg(feature = "ffmpeg")]
pub mod ffmpeg_tools;
pub mod frame;
pub mod packet;
pub mod stream;
pub mod time;

pub use clock::{PlaybackClock, Timer, TimerObserver, TimerStatus};
pub use config::{ScalingFilter, VideoStreamConfig};
pub use errors::VideoStreamError;
pub use packet::{EncodedPacket, PacketQueue, PacketSource};
pub use stream::{MediaKind, Stream, VideoStream};
pub use time::PlaybackTime;
