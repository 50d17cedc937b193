//! Copy the selected pixels out of a source image.
//!
//! Used for clipboard copies: the result is cropped to the selection bounds and
//! every channel of an unselected pixel is zeroed, so with an alpha channel the
//! unselected area comes out fully transparent.

use ndarray::Array3;
use rayon::prelude::*;

use super::error::{Result, SelectionError};
use super::mask::Mask;
use super::pixel_source::{Channel, PixelSource};

/// Crop `source` to the bounds of `mask`, keeping only selected pixels.
///
/// Returns `Ok(None)` when nothing is selected.
///
/// # Errors
/// `DimensionMismatch` if the mask was not built for an image of this size.
pub fn copy_selected<T: Channel>(source: &PixelSource<'_, T>, mask: &Mask) -> Result<Option<Array3<T>>> {
    if mask.width() != source.width() || mask.height() != source.height() {
        return Err(SelectionError::DimensionMismatch {
            mask_width: mask.width(),
            mask_height: mask.height(),
            width: source.width(),
            height: source.height(),
        });
    }

    let Some((bx, by, bw, bh)) = mask.bounds() else {
        return Ok(None);
    };

    let channels = source.layout().channels();
    let view = source.view();
    let mut flat = vec![T::default(); bw * bh * channels];

    flat.par_chunks_mut(bw * channels)
        .enumerate()
        .for_each(|(row, out)| {
            let y = by + row;
            for col in 0..bw {
                let x = bx + col;
                if !mask.get(x, y) {
                    continue;
                }
                for c in 0..channels {
                    out[col * channels + c] = view[[y, x, c]];
                }
            }
        });

    let cropped = Array3::from_shape_vec((bh, bw, channels), flat)
        .expect("crop buffer matches selection bounds");
    Ok(Some(cropped))
}
