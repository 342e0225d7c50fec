//! Configuration for [VideoStream](crate::stream::VideoStream)s.

use serde::{Deserialize, Serialize};

/// Settings used when building a video stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct VideoStreamConfig {
    /// The filter used when converting decoded pictures to RGBA.
    pub scaling_filter: ScalingFilter,
}

/// The interpolation used by a [Rescaler](crate::codec::Rescaler).
///
/// Pictures are never resized (only reformatted), so this mostly affects how
/// chroma planes are upsampled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalingFilter {
    FastBilinear,
    #[default]
    Bilinear,
    Bicubic,
    Point,
    Area,
}
