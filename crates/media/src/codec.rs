//! The traits a [VideoStream](crate::stream::VideoStream) decodes through:
//! [VideoCodec] (the decode primitive), [DecodedPicture] (its output) and
//! [Rescaler] (conversion of that output to RGBA).
//!
//! Implementations backed by FFmpeg live in [crate::ffmpeg_tools].

use crate::config::ScalingFilter;
use crate::errors::VideoStreamError;
use crate::frame::{Dimensions, RgbaFrameBuffer};
use crate::packet::EncodedPacket;
use crate::time::Rational;

/// Immutable facts about the stream a [VideoCodec] decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamDescriptor {
    /// The dimensions of the stream's pictures at construction time.
    pub dimensions: Dimensions,
    /// The length of one timestamp tick in seconds.
    pub time_base: Rational,
    /// The timestamp of the stream's first picture, if known.
    pub start_time: Option<i64>,
}

/// What a single [VideoCodec::decode] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CodecStatus {
    /// How many bytes of the packet's remaining data were consumed.
    pub consumed: usize,
    /// Whether a complete picture was written to the output picture.
    pub got_picture: bool,
}

/// A raw picture written by a [VideoCodec].
pub trait DecodedPicture {
    /// The codec's best estimate of the picture's presentation timestamp (in
    /// stream time base units), if it has one.
    fn best_effort_timestamp(&self) -> Option<i64>;

    /// The `(width, height)` the decoder reports for this picture.
    fn size(&self) -> (u32, u32);
}

/// Converts a [VideoCodec]'s pictures into an [RgbaFrameBuffer].
///
/// # Contract
///
/// A rescaler is bound to the dimensions it was created with. A picture with
/// any other size must be rejected with
/// [VideoStreamError::DimensionsChanged] and `out` left untouched.
pub trait Rescaler {
    type Picture: DecodedPicture;

    fn rescale(
        &mut self,
        picture: &Self::Picture,
        out: &mut RgbaFrameBuffer,
    ) -> Result<(), VideoStreamError>;
}

/// The codec decode primitive for one video stream.
///
/// The codec owns its native pixel format; the rest of the stream only ever
/// sees pictures through [VideoCodec::create_rescaler].
pub trait VideoCodec {
    type Picture: DecodedPicture;
    type Rescaler: Rescaler<Picture = Self::Picture>;

    fn descriptor(&self) -> StreamDescriptor;

    /// Allocate storage for a picture that [VideoCodec::decode] can write to.
    /// The same picture is reused for every decode call.
    fn alloc_picture(&self) -> Result<Self::Picture, VideoStreamError>;

    /// Build a conversion context from the codec's native format at
    /// `dimensions` to RGBA at `dimensions`.
    fn create_rescaler(
        &self,
        dimensions: Dimensions,
        filter: ScalingFilter,
    ) -> Result<Self::Rescaler, VideoStreamError>;

    /// Decode (part of) `packet`'s remaining data into `picture`.
    ///
    /// Returns how many bytes were consumed and whether `picture` now holds a
    /// complete picture. Consuming fewer bytes than remain means the packet
    /// has to be decoded again from the new position.
    fn decode(
        &mut self,
        packet: &EncodedPacket,
        picture: &mut Self::Picture,
    ) -> Result<CodecStatus, VideoStreamError>;

    /// Discard every buffered or in-flight picture.
    fn flush(&mut self);
}
