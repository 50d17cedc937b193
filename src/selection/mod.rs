//! Selection algorithms for image editing.
//!
//! - **Magic wand**: Scanline flood fill selecting the 4-connected region of
//!   pixels within a color tolerance of a seed pixel
//! - **Mask**: Packed 1-bit result bitmap
//! - **Contour extraction**: Pixel-edge outlines for marching ants display
//! - **Extract**: Copy the selected pixels out of the source image

pub mod contour;
pub mod error;
pub mod extract;
pub mod magic_wand;
pub mod mask;
pub mod pixel_source;

pub use contour::{extract_contours, trace_outlines};
pub use error::SelectionError;
pub use extract::copy_selected;
pub use magic_wand::{build, CancelToken, ColorDistance, MaskBuilder, SeedPoint, Tolerance};
pub use mask::Mask;
pub use pixel_source::{Channel, ChannelLayout, ColorSample, PixelSource, MAX_CHANNELS};
