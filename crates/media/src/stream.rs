//! Streams turn a media source's packets into something presentable. This
//! module has the [Stream] trait every kind of stream implements and
//! [VideoStream], the stream for video.

mod video;

use crate::clock::TimerObserver;

pub use video::*;

/// The kind of media a [Stream] produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Video,
    Audio,
    Subtitle,
}

/// The capabilities shared by every kind of stream. Streams also observe the
/// playback clock (see [TimerObserver]) so they can react to it being played,
/// paused or stopped.
pub trait Stream: TimerObserver {
    /// What kind of media this stream produces.
    fn kind(&self) -> MediaKind;

    /// Called once per presentation tick (e.g. once per rendered frame) to let
    /// the stream catch up with the playback clock.
    ///
    /// Calls must not overlap.
    fn update(&mut self);
}
