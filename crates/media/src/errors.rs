//! Declares [VideoStreamError], the error type for everything that can go
//! wrong while building or running a [VideoStream](crate::stream::VideoStream).

use crate::frame::Dimensions;

/// Indicates that something went wrong while constructing a video stream or
/// producing one of its frames.
///
/// Construction errors mean the stream was never built. Every other error only
/// ends the current attempt to produce a frame.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoStreamError {
    #[error(
        "The video stream shouldn't have dimensions with a 0-length side \
        ({0}x{1} has no area)."
    )]
    ZeroLengthSide(u32, u32),
    #[error("Failed to allocate a decoded picture.")]
    PictureAllocFailure,
    #[error("Failed to allocate a {0} RGBA frame buffer.")]
    FrameAllocFailure(Dimensions),
    #[error("Failed to create a {0} presentation surface.")]
    SurfaceCreateFailure(Dimensions),
    #[error("Failed to create a frame scaler.")]
    ScalerCreateFailure,
    #[error("Failed to get an input's context.")]
    NoInputContext,
    #[error("Failed to find an ideal video stream.")]
    NoBestVideoStream,
    #[error("Failed to create a decoder.")]
    DecoderCreateFailure,
    #[error("Failed to decode a packet.")]
    DecodeFailure,
    #[error("The decoder made no progress on a packet (no bytes consumed, no picture).")]
    DecodeStalled,
    #[error("Failed to scale (reformat) a frame.")]
    ScaleFailure,
    #[error(
        "The video stream's frame dimensions cannot change \
        (expected {expected} but got {actual_width}x{actual_height})."
    )]
    DimensionsChanged {
        expected: Dimensions,
        actual_width: u32,
        actual_height: u32,
    },
    #[error(
        "The frame data should be at least {expected} bytes long \
        but is actually {actual} bytes long."
    )]
    WrongBufferLen { expected: usize, actual: usize },
}

impl VideoStreamError {
    /// Whether this error can only happen while a stream is being built.
    pub const fn is_construction_error(&self) -> bool {
        matches!(
            self,
            Self::ZeroLengthSide(..)
                | Self::PictureAllocFailure
                | Self::FrameAllocFailure(_)
                | Self::SurfaceCreateFailure(_)
                | Self::ScalerCreateFailure
                | Self::NoInputContext
                | Self::NoBestVideoStream
                | Self::DecoderCreateFailure
        )
    }
}
