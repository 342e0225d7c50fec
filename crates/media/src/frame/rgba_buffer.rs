//! Declares [RgbaFrameBuffer], the fixed-size buffer every decoded picture is
//! converted into.

use std::path::Path;

use crate::errors::VideoStreamError;

use super::Dimensions;

/// The number of bytes in one RGBA pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// The most planes an image can have. RGBA is packed, so only the first plane
/// is ever used, but the stride table keeps the conventional four entries so it
/// can be handed to converters that expect one.
pub const MAX_PLANES: usize = 4;

/// A tightly packed RGBA buffer whose [Dimensions] are fixed at construction.
///
/// Rows are `dimensions.width() * 4` bytes long with no padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaFrameBuffer {
    dimensions: Dimensions,
    data: Box<[u8]>,
    linesizes: [usize; MAX_PLANES],
}

impl RgbaFrameBuffer {
    /// Allocate a zeroed (transparent black) buffer.
    ///
    /// Allocation failure is reported instead of aborting the process.
    pub fn new(dimensions: Dimensions) -> Result<Self, VideoStreamError> {
        let stride = dimensions.width() as usize * BYTES_PER_PIXEL;
        let len = stride
            .checked_mul(dimensions.height() as usize)
            .ok_or(VideoStreamError::FrameAllocFailure(dimensions))?;

        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| VideoStreamError::FrameAllocFailure(dimensions))?;
        data.resize(len, 0);

        Ok(Self {
            dimensions,
            data: data.into_boxed_slice(),
            linesizes: [stride, 0, 0, 0],
        })
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// The row stride (in bytes) of each plane. Unused planes have a stride of
    /// `0`.
    pub fn linesizes(&self) -> [usize; MAX_PLANES] {
        self.linesizes
    }

    /// The row stride (in bytes) of the pixel data.
    pub fn stride(&self) -> usize {
        self.linesizes[0]
    }

    /// The raw RGBA bytes, row after row.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// The bytes of row `y`. Panics if `y` is out of bounds.
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride();
        &self.data[start..start + self.stride()]
    }

    /// Copy an RGBA image with the same dimensions as this buffer from `src`,
    /// whose rows start every `src_stride` bytes (which may include padding).
    ///
    /// Nothing is written unless `src` holds every row this buffer needs.
    pub fn copy_from_strided(
        &mut self,
        src: &[u8],
        src_stride: usize,
    ) -> Result<(), VideoStreamError> {
        let row_len = self.stride();
        let rows = self.dimensions.height() as usize;

        if src_stride < row_len {
            return Err(VideoStreamError::WrongBufferLen {
                expected: row_len,
                actual: src_stride,
            });
        }

        // The last row doesn't need to include its padding.
        let expected = src_stride * (rows - 1) + row_len;
        if src.len() < expected {
            return Err(VideoStreamError::WrongBufferLen {
                expected,
                actual: src.len(),
            });
        }

        let src_rows = src.chunks(src_stride);
        for (dest_row, src_row) in self.data.chunks_exact_mut(row_len).zip(src_rows) {
            dest_row.copy_from_slice(&src_row[..row_len]);
        }

        Ok(())
    }

    /// Save the frame to an image file. The format is picked from `path`'s
    /// extension (e.g. `.png`).
    pub fn save<P: AsRef<Path>>(&self, path: P) -> image::ImageResult<()> {
        image::save_buffer(
            path,
            &self.data,
            self.dimensions.width(),
            self.dimensions.height(),
            image::ColorType::Rgba8,
        )
    }
}
