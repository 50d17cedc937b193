//! MagicWand Rust Extensions
//!
//! Magic wand region selection implemented in Rust, with Python bindings via
//! PyO3 and WASM bindings for JavaScript.
//!
//! ## Image Format
//! Selections read images laid out as (height, width, channels):
//! - **Grayscale**: (height, width, 1), optionally with alpha (height, width, 2)
//! - **RGB**: (height, width, 3)
//! - **RGBA**: (height, width, 4)
//! - **CMYK + alpha**: (height, width, 5)
//!
//! Both `u8` (0-255) and `u16` (0-65535) samples are supported; the tolerance
//! is always normalized to 0.0-1.0 and scaled to the sample depth.
//!
//! ## Output
//! A selection is a packed 1-bit [`selection::Mask`]. Binding layers expand it
//! to an 8-bit alpha mask (255 = selected, 0 = not selected).

pub mod selection;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use selection::{build, Mask, MaskBuilder, PixelSource, SeedPoint, SelectionError};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray2, PyArray3, PyReadonlyArray3};
    use pyo3::exceptions::{PyIndexError, PyRuntimeError, PyValueError};
    use pyo3::prelude::*;

    use crate::selection::{
        copy_selected, extract_contours, ColorDistance, MaskBuilder, PixelSource, SeedPoint,
        SelectionError,
    };

    impl From<SelectionError> for PyErr {
        fn from(err: SelectionError) -> Self {
            match err {
                SelectionError::OutOfBounds { .. } => PyIndexError::new_err(err.to_string()),
                SelectionError::Cancelled => PyRuntimeError::new_err(err.to_string()),
                _ => PyValueError::new_err(err.to_string()),
            }
        }
    }

    fn builder(tolerance: f32, euclidean: bool) -> MaskBuilder {
        let distance = if euclidean {
            ColorDistance::Euclidean
        } else {
            ColorDistance::PerChannel
        };
        MaskBuilder::new(tolerance).with_distance(distance)
    }

    // ========================================================================
    // Magic Wand
    // ========================================================================

    /// Select the contiguous region around (x, y) within a color tolerance.
    ///
    /// # Arguments
    /// * `image` - Image with 1-5 channels (height, width, channels), u8
    /// * `x`, `y` - Seed pixel
    /// * `tolerance` - 0.0 (exact color) to 1.0 (everything)
    /// * `euclidean` - Use Euclidean color distance instead of per-channel
    ///
    /// # Returns
    /// Alpha mask (height, width), 255 = selected
    #[pyfunction]
    #[pyo3(signature = (image, x, y, tolerance=0.0, euclidean=false))]
    pub fn magic_wand_select<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        x: i64,
        y: i64,
        tolerance: f32,
        euclidean: bool,
    ) -> PyResult<Bound<'py, PyArray2<u8>>> {
        let source = PixelSource::new(image.as_array())?;
        let mask = builder(tolerance, euclidean).build(&source, SeedPoint::new(x, y))?;
        Ok(mask.to_alpha().into_pyarray(py))
    }

    /// Magic wand selection on a 16-bit image.
    #[pyfunction]
    #[pyo3(signature = (image, x, y, tolerance=0.0, euclidean=false))]
    pub fn magic_wand_select_u16<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u16>,
        x: i64,
        y: i64,
        tolerance: f32,
        euclidean: bool,
    ) -> PyResult<Bound<'py, PyArray2<u8>>> {
        let source = PixelSource::new(image.as_array())?;
        let mask = builder(tolerance, euclidean).build(&source, SeedPoint::new(x, y))?;
        Ok(mask.to_alpha().into_pyarray(py))
    }

    /// Outline of the magic wand selection.
    ///
    /// # Returns
    /// Flat list: [num_contours, len1, x1, y1, ..., len2, ...]
    #[pyfunction]
    #[pyo3(signature = (image, x, y, tolerance=0.0))]
    pub fn magic_wand_contours(
        image: PyReadonlyArray3<'_, u8>,
        x: i64,
        y: i64,
        tolerance: f32,
    ) -> PyResult<Vec<f32>> {
        let source = PixelSource::new(image.as_array())?;
        let mask = MaskBuilder::new(tolerance).build(&source, SeedPoint::new(x, y))?;
        Ok(extract_contours(&mask))
    }

    /// Copy the selected pixels, cropped to the selection bounds.
    ///
    /// Unselected pixels inside the crop are zeroed. Returns None when the
    /// selection is empty.
    #[pyfunction]
    #[pyo3(signature = (image, x, y, tolerance=0.0))]
    pub fn copy_selection<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        x: i64,
        y: i64,
        tolerance: f32,
    ) -> PyResult<Option<Bound<'py, PyArray3<u8>>>> {
        let source = PixelSource::new(image.as_array())?;
        let mask = MaskBuilder::new(tolerance).build(&source, SeedPoint::new(x, y))?;
        let copy = copy_selected(&source, &mask)?;
        Ok(copy.map(|pixels| pixels.into_pyarray(py)))
    }

    /// MagicWand Rust extension module
    #[pymodule]
    pub fn magicwand_rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(magic_wand_select, m)?)?;
        m.add_function(wrap_pyfunction!(magic_wand_select_u16, m)?)?;
        m.add_function(wrap_pyfunction!(magic_wand_contours, m)?)?;
        m.add_function(wrap_pyfunction!(copy_selection, m)?)?;

        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::magicwand_rust;
