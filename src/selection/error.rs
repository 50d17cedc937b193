//! Error type shared by the selection modules.

use super::pixel_source::ChannelLayout;

/// Errors reported while constructing a pixel source or building a mask.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SelectionError {
    /// The source image has zero width or zero height.
    #[error("source image is empty")]
    EmptySource,

    /// The seed point lies outside the source image.
    #[error("seed ({x}, {y}) is outside the {width}x{height} image")]
    OutOfBounds {
        x: i64,
        y: i64,
        width: usize,
        height: usize,
    },

    /// Tolerance is NaN or outside [0.0, 1.0].
    #[error("tolerance {0} is outside [0.0, 1.0]")]
    InvalidTolerance(f32),

    /// The caller cancelled the build before it finished.
    #[error("selection build was cancelled")]
    Cancelled,

    #[error("unsupported channel count: {0} (expected 1 to 5)")]
    UnsupportedChannels(usize),

    #[error("layout {layout:?} needs {} channels, image has {channels}", .layout.channels())]
    LayoutMismatch {
        layout: ChannelLayout,
        channels: usize,
    },

    #[error("buffer holds {actual} samples, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    /// Mask and source image sizes differ.
    #[error("mask is {mask_width}x{mask_height}, source is {width}x{height}")]
    DimensionMismatch {
        mask_width: usize,
        mask_height: usize,
        width: usize,
        height: usize,
    },
}

pub type Result<T> = std::result::Result<T, SelectionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = SelectionError::OutOfBounds {
            x: -1,
            y: 0,
            width: 4,
            height: 3,
        };
        assert_eq!(err.to_string(), "seed (-1, 0) is outside the 4x3 image");

        let err = SelectionError::LayoutMismatch {
            layout: ChannelLayout::Cmyk,
            channels: 3,
        };
        assert_eq!(err.to_string(), "layout Cmyk needs 4 channels, image has 3");
    }
}
