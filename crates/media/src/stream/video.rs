use crate::clock::{PlaybackClock, TimerObserver, TimerStatus};
use crate::codec::{DecodedPicture, Rescaler, StreamDescriptor, VideoCodec};
use crate::config::VideoStreamConfig;
use crate::errors::VideoStreamError;
use crate::frame::{RgbaFrameBuffer, Surface, Texture};
use crate::packet::{EncodedPacket, PacketSource};
use crate::time::PlaybackTime;

use super::{MediaKind, Stream};


/// Decodes a video stream's packets, converts the pictures to RGBA and
/// presents them on a [Surface] at the pace set by a [PlaybackClock].
///
/// Frames are pulled: each call to [Stream::update] decodes at most one frame,
/// and only once the clock has passed the last decoded frame's timestamp.
pub struct VideoStream<C, P, K, S = Texture>
where
    C: VideoCodec,
    P: PacketSource,
    K: PlaybackClock,
    S: Surface,
{
    codec: C,
    packets: P,
    clock: K,
    descriptor: StreamDescriptor,
    picture: C::Picture,
    frame: RgbaFrameBuffer,
    surface: S,
    rescaler: C::Rescaler,
    last_decoded_timestamp: PlaybackTime,
}

/// The result of decoding a packet once.
///
/// The variants that need more decoding hand the packet back (with its cursor
/// advanced) so it can be put back at the head of the packet source. Every
/// other variant has dropped the packet.
#[derive(Debug)]
enum DecodeOutcome {
    Failed(VideoStreamError),
    NoPicture,
    NoPictureNeedsMoreDecoding(EncodedPacket),
    PictureReady,
    PictureReadyNeedsMoreDecoding(EncodedPacket),
}

impl<C, P, K, S> VideoStream<C, P, K, S>
where
    C: VideoCodec,
    P: PacketSource,
    K: PlaybackClock,
    S: Surface,
{
    /// Build a stream that decodes packets from `packets` with `codec` and
    /// synchronizes against `clock`.
    ///
    /// Nothing is decoded until the stream is preloaded or updated.
    pub fn new(
        codec: C,
        packets: P,
        clock: K,
        config: VideoStreamConfig,
    ) -> Result<Self, VideoStreamError> {
        let descriptor = codec.descriptor();
        let dimensions = descriptor.dimensions;

        let picture = codec.alloc_picture()?;
        let frame = RgbaFrameBuffer::new(dimensions)?;
        let surface = S::create(dimensions)?;
        let rescaler = codec.create_rescaler(dimensions, config.scaling_filter)?;

        Ok(Self {
            codec,
            packets,
            clock,
            descriptor,
            picture,
            frame,
            surface,
            rescaler,
            last_decoded_timestamp: PlaybackTime::ZERO,
        })
    }

    /// The surface the most recent frame was presented on.
    pub fn texture(&self) -> &S {
        &self.surface
    }

    /// The most recently converted frame.
    pub fn frame(&self) -> &RgbaFrameBuffer {
        &self.frame
    }

    pub fn descriptor(&self) -> &StreamDescriptor {
        &self.descriptor
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn packets(&self) -> &P {
        &self.packets
    }

    /// The timestamp of the most recently decoded picture ([PlaybackTime::ZERO]
    /// before the first one).
    pub fn last_decoded_timestamp(&self) -> PlaybackTime {
        self.last_decoded_timestamp
    }

    /// How far ahead of the clock the last decoded frame is. A negative gap
    /// means the clock has passed it and a new frame is due.
    pub fn synchronization_gap(&self) -> PlaybackTime {
        self.last_decoded_timestamp - self.clock.offset()
    }

    /// Decode and present one frame regardless of the clock (e.g. so the first
    /// frame is already showing when playback starts).
    pub fn preload(&mut self) {
        if let Err(e) = self.produce_frame() {
            util::debug_log_warning!("Failed to preload a video frame: {e}");
        }
    }

    /// Decode packets until a picture comes out, then convert and present it.
    ///
    /// Returns `Ok(false)` if the packet source ran dry before a picture was
    /// decoded. Every packet popped here is either dropped or put back at the
    /// head of the packet source before this returns.
    pub fn produce_frame(&mut self) -> Result<bool, VideoStreamError> {
        let Some(mut packet) = self.packets.pop() else {
            return Ok(false);
        };

        loop {
            match self.decode_packet(packet) {
                DecodeOutcome::Failed(e) => return Err(e),
                DecodeOutcome::PictureReady => {
                    self.present()?;
                    return Ok(true);
                }
                DecodeOutcome::PictureReadyNeedsMoreDecoding(rest) => {
                    self.packets.prepend(rest);
                    self.present()?;
                    return Ok(true);
                }
                DecodeOutcome::NoPictureNeedsMoreDecoding(rest) => self.packets.prepend(rest),
                DecodeOutcome::NoPicture => {}
            }

            util::debug_log_info!("No picture in this packet, reading further.");

            packet = match self.packets.pop() {
                Some(next) => next,
                None => return Ok(false),
            };
        }
    }

    /// Decode `packet`'s remaining data once. A packet that was fully consumed
    /// (or that failed to decode) is dropped here.
    fn decode_packet(&mut self, mut packet: EncodedPacket) -> DecodeOutcome {
        let status = match self.codec.decode(&packet, &mut self.picture) {
            Ok(status) => status,
            Err(e) => return DecodeOutcome::Failed(e),
        };

        if status.consumed == 0 && !status.got_picture {
            return DecodeOutcome::Failed(VideoStreamError::DecodeStalled);
        }

        if status.got_picture {
            if let Some(timestamp) = self.picture.best_effort_timestamp() {
                self.last_decoded_timestamp = PlaybackTime::from_stream_timestamp(
                    timestamp,
                    self.descriptor.start_time,
                    self.descriptor.time_base,
                );
            }
        }

        let needs_more_decoding = status.consumed < packet.remaining_len();
        if needs_more_decoding {
            packet.advance(status.consumed);
        }

        match (status.got_picture, needs_more_decoding) {
            (true, true) => DecodeOutcome::PictureReadyNeedsMoreDecoding(packet),
            (true, false) => DecodeOutcome::PictureReady,
            (false, true) => DecodeOutcome::NoPictureNeedsMoreDecoding(packet),
            (false, false) => DecodeOutcome::NoPicture,
        }
    }

    /// Convert the current picture and show it. The surface isn't touched if
    /// the conversion fails.
    fn present(&mut self) -> Result<(), VideoStreamError> {
        self.rescaler.rescale(&self.picture, &mut self.frame)?;
        self.surface.update(&self.frame);
        Ok(())
    }
}

impl<C, P, K, S> Stream for VideoStream<C, P, K, S>
where
    C: VideoCodec,
    P: PacketSource,
    K: PlaybackClock,
    S: Surface,
{
    fn kind(&self) -> MediaKind {
        MediaKind::Video
    }

    fn update(&mut self) {
        if !self.synchronization_gap().is_negative() {
            return;
        }

        if let Err(e) = self.produce_frame() {
            util::debug_log_warning!("Failed to produce a video frame: {e}");
        }
    }
}

impl<C, P, K, S> TimerObserver for VideoStream<C, P, K, S>
where
    C: VideoCodec,
    P: PacketSource,
    K: PlaybackClock,
    S: Surface,
{
    fn will_play(&mut self, _clock: &dyn PlaybackClock, previous: TimerStatus) {
        if previous == TimerStatus::Stopped {
            self.preload();
        }
    }

    fn did_stop(&mut self, _clock: &dyn PlaybackClock, _previous: TimerStatus) {
        self.codec.flush();
    }
}
