//! This module exports everything to do with converted (RGBA) frames and the
//! [Surface]s they're presented on.

mod dimensions;
mod rgba_buffer;
mod surface;

pub use dimensions::*;
pub use rgba_buffer::*;
pub use surface::*;
