//! Packed 1-bit selection mask.
//!
//! Bits are stored row-major, most significant bit first within each byte.
//! Each row starts on a byte boundary, so the row stride is `ceil(width / 8)`.
//! Padding bits at the end of a row are always zero.

use ndarray::Array2;
use rayon::prelude::*;

/// Binary per-pixel membership bitmap (1 = selected).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Mask {
    width: usize,
    height: usize,
    stride: usize,
    data: Vec<u8>,
}

impl Mask {
    /// Create an all-clear mask.
    pub fn new(width: usize, height: usize) -> Self {
        let stride = width.div_ceil(8);
        Self {
            width,
            height,
            stride,
            data: vec![0u8; stride * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Bytes per row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Raw packed rows, `stride * height` bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Read the bit at `(x, y)`. Coordinates outside the mask read as unselected.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let byte = self.data[y * self.stride + x / 8];
        byte & (0x80 >> (x % 8)) != 0
    }

    /// Write the bit at `(x, y)`.
    ///
    /// # Panics
    /// If `(x, y)` is outside the mask.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, selected: bool) {
        assert!(
            x < self.width && y < self.height,
            "mask coordinate ({x}, {y}) out of range"
        );
        let bit = 0x80u8 >> (x % 8);
        let byte = &mut self.data[y * self.stride + x / 8];
        if selected {
            *byte |= bit;
        } else {
            *byte &= !bit;
        }
    }

    /// Number of selected pixels.
    pub fn count(&self) -> usize {
        self.data.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// True when no pixel is selected.
    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|&b| b == 0)
    }

    /// Bounding box of the selection as `(x, y, width, height)`.
    pub fn bounds(&self) -> Option<(usize, usize, usize, usize)> {
        let mut min_x = self.width;
        let mut min_y = self.height;
        let mut max_x = 0;
        let mut max_y = 0;
        let mut any = false;

        for y in 0..self.height {
            let row = &self.data[y * self.stride..(y + 1) * self.stride];
            let Some(first) = row.iter().position(|&b| b != 0) else {
                continue;
            };
            // `position` found a non-zero byte, so `rposition` does too.
            let last = row.iter().rposition(|&b| b != 0).unwrap_or(first);

            let row_min = first * 8 + row[first].leading_zeros() as usize;
            let row_max = last * 8 + 7 - row[last].trailing_zeros() as usize;

            any = true;
            min_x = min_x.min(row_min);
            max_x = max_x.max(row_max);
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }

        any.then(|| (min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
    }

    /// Expand to an 8-bit alpha mask (255 = selected, 0 = not selected).
    pub fn to_alpha(&self) -> Array2<u8> {
        let mut flat = vec![0u8; self.width * self.height];
        if self.width > 0 {
            flat.par_chunks_mut(self.width)
                .enumerate()
                .for_each(|(y, row)| {
                    for (x, value) in row.iter_mut().enumerate() {
                        if self.get(x, y) {
                            *value = 255;
                        }
                    }
                });
        }
        Array2::from_shape_vec((self.height, self.width), flat)
            .expect("alpha buffer matches mask dimensions")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_clear() {
        let mask = Mask::new(10, 3);
        assert_eq!(mask.stride(), 2);
        assert_eq!(mask.as_bytes().len(), 6);
        assert!(mask.is_empty());
        assert_eq!(mask.count(), 0);
        assert_eq!(mask.bounds(), None);
    }

    #[test]
    fn test_set_get_bit_order() {
        let mut mask = Mask::new(9, 2);
        mask.set(0, 0, true);
        mask.set(8, 0, true);
        mask.set(3, 1, true);

        assert_eq!(mask.as_bytes(), &[0x80, 0x80, 0x10, 0x00]);
        assert!(mask.get(0, 0));
        assert!(mask.get(8, 0));
        assert!(mask.get(3, 1));
        assert!(!mask.get(1, 0));

        mask.set(0, 0, false);
        assert!(!mask.get(0, 0));
        assert_eq!(mask.count(), 2);
    }

    #[test]
    fn test_get_out_of_range_is_unselected() {
        let mask = Mask::new(4, 4);
        assert!(!mask.get(4, 0));
        assert!(!mask.get(0, 4));
    }

    #[test]
    #[should_panic]
    fn test_set_out_of_range_panics() {
        let mut mask = Mask::new(4, 4);
        mask.set(4, 0, true);
    }

    #[test]
    fn test_bounds() {
        let mut mask = Mask::new(20, 10);
        mask.set(3, 2, true);
        mask.set(17, 7, true);
        mask.set(9, 5, true);
        assert_eq!(mask.bounds(), Some((3, 2, 15, 6)));
    }

    #[test]
    fn test_bounds_across_byte_boundary() {
        let mut mask = Mask::new(16, 1);
        for x in 6..=9 {
            mask.set(x, 0, true);
        }
        assert_eq!(mask.as_bytes(), &[0b0000_0011, 0b1100_0000]);
        assert_eq!(mask.bounds(), Some((6, 0, 4, 1)));
    }

    #[test]
    fn test_to_alpha() {
        let mut mask = Mask::new(3, 2);
        mask.set(1, 0, true);
        mask.set(2, 1, true);
        let alpha = mask.to_alpha();
        assert_eq!(alpha.dim(), (2, 3));
        assert_eq!(alpha[[0, 1]], 255);
        assert_eq!(alpha[[1, 2]], 255);
        assert_eq!(alpha[[0, 0]], 0);
        assert_eq!(alpha.iter().filter(|&&v| v == 255).count(), 2);
    }
}
