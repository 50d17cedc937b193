//! WebAssembly exports for the magic wand.
//!
//! These functions are exposed to JavaScript via wasm-bindgen. Images are
//! passed as flat interleaved u8 buffers (length = width * height * channels).
//! Errors surface as thrown JavaScript strings.

use wasm_bindgen::prelude::*;

use crate::selection::{
    extract_contours, ChannelLayout, Mask, MaskBuilder, PixelSource, SeedPoint, SelectionError,
};

fn to_js(err: SelectionError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn select(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    x: i32,
    y: i32,
    tolerance: f32,
) -> Result<Mask, SelectionError> {
    let layout = ChannelLayout::from_channels(channels)?;
    let source = PixelSource::from_slice(data, width, height, layout)?;
    MaskBuilder::new(tolerance).build(&source, SeedPoint::new(x.into(), y.into()))
}

// ============================================================================
// Magic Wand
// ============================================================================

/// Select the contiguous region around (x, y) within a color tolerance.
///
/// # Arguments
/// * `data` - Flat array of pixel bytes
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `channels` - Channels per pixel (1-5)
/// * `x`, `y` - Seed pixel
/// * `tolerance` - 0.0 (exact color) to 1.0 (everything)
///
/// # Returns
/// Flat alpha mask (length = width * height), 255 = selected
#[wasm_bindgen]
pub fn magic_wand_select_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    x: i32,
    y: i32,
    tolerance: f32,
) -> Result<Vec<u8>, JsValue> {
    let mask = select(data, width, height, channels, x, y, tolerance).map_err(to_js)?;
    Ok(mask.to_alpha().into_raw_vec_and_offset().0)
}

/// Outline of the magic wand selection for marching ants.
///
/// # Returns
/// Flat array: [num_contours, len1, x1, y1, ..., len2, ...]
#[wasm_bindgen]
pub fn magic_wand_contours_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    x: i32,
    y: i32,
    tolerance: f32,
) -> Result<Vec<f32>, JsValue> {
    let mask = select(data, width, height, channels, x, y, tolerance).map_err(to_js)?;
    Ok(extract_contours(&mask))
}
