//! Declares the [Dimensions] type.

use std::fmt::{self, Display, Formatter};
use std::num::NonZeroU32;

/// A width and a height in pixels, both guaranteed to be non-zero.
///
/// Sides are [u32]s since that's what decoders report.
///
/// # Example
///
/// ```
/// use media::frame::Dimensions;
///
/// let d = Dimensions::new(1920, 1080).unwrap();
/// assert_eq!(d.area(), 1920 * 1080);
/// assert_eq!(d.to_string(), "1920x1080");
/// assert!(Dimensions::new(0, 1080).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    width: NonZeroU32,
    height: NonZeroU32,
}

impl Dimensions {
    /// Construct from a width and a height, returning [None] if either is `0`.
    pub const fn new(width: u32, height: u32) -> Option<Self> {
        let Some(width) = NonZeroU32::new(width) else {
            return None;
        };
        let Some(height) = NonZeroU32::new(height) else {
            return None;
        };

        Some(Self { width, height })
    }

    /// The width. This will never be `0`.
    pub const fn width(&self) -> u32 {
        self.width.get()
    }

    /// The height. This will never be `0`.
    pub const fn height(&self) -> u32 {
        self.height.get()
    }

    /// The number of pixels in a frame with these dimensions.
    pub const fn area(&self) -> usize {
        self.width.get() as usize * self.height.get() as usize
    }
}

/// When displayed, [Dimensions] will look like `WxH` (e.g. `1920x1080`).
impl Display for Dimensions {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl From<Dimensions> for (u32, u32) {
    fn from(dimensions: Dimensions) -> Self {
        (dimensions.width(), dimensions.height())
    }
}
