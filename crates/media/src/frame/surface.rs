//! Declares the [Surface] trait (where converted frames are presented) and
//! [Texture], a CPU-side surface.

use crate::errors::VideoStreamError;

use super::{Dimensions, RgbaFrameBuffer};

/// A destination for presented frames (e.g. a GPU texture).
///
/// # Contract
///
/// A surface is created once with a stream's dimensions, and every frame it's
/// updated with will have those same dimensions.
pub trait Surface: Sized {
    /// Create a surface that can display frames with `dimensions`.
    fn create(dimensions: Dimensions) -> Result<Self, VideoStreamError>;

    /// Replace the surface's contents with `frame`.
    fn update(&mut self, frame: &RgbaFrameBuffer);
}

/// A [Surface] that just keeps a copy of the last presented frame in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    pixels: RgbaFrameBuffer,
    generation: u64,
}

impl Texture {
    pub fn dimensions(&self) -> Dimensions {
        self.pixels.dimensions()
    }

    /// The RGBA bytes of the last presented frame (tightly packed).
    pub fn pixels(&self) -> &[u8] {
        self.pixels.data()
    }

    /// How many times the texture has been updated. Starts at `0`.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Surface for Texture {
    fn create(dimensions: Dimensions) -> Result<Self, VideoStreamError> {
        let pixels = RgbaFrameBuffer::new(dimensions)
            .map_err(|_| VideoStreamError::SurfaceCreateFailure(dimensions))?;

        Ok(Self {
            pixels,
            generation: 0,
        })
    }

    fn update(&mut self, frame: &RgbaFrameBuffer) {
        debug_assert_eq!(frame.dimensions(), self.dimensions());

        self.pixels.data_mut().copy_from_slice(frame.data());
        self.generation += 1;
    }
}
