//! Read-only pixel access for the magic wand.
//!
//! A [`PixelSource`] wraps a caller-owned raster as an `(height, width, channels)`
//! view and decodes one pixel at a time into a [`ColorSample`]. The channel
//! layout is resolved once when the source is built, so sampling is a plain
//! indexed read with no allocation and no dynamic dispatch.
//!
//! ## Supported Formats
//!
//! | Layout | Channels | Description |
//! |--------|----------|-------------|
//! | Gray | 1 | Single luminance channel |
//! | GrayAlpha | 2 | Luminance + alpha |
//! | Rgb | 3 | Red, green, blue |
//! | Rgba | 4 | RGB + alpha |
//! | Cmyk | 4 | Cyan, magenta, yellow, black |
//! | Cmyka | 5 | CMYK + alpha |
//!
//! Both `u8` (0-255) and `u16` (0-65535) samples are accepted.

use ndarray::ArrayView3;

use super::error::{Result, SelectionError};

/// Largest channel count of any supported layout (CMYK + alpha).
pub const MAX_CHANNELS: usize = 5;

/// A sample type usable as an image channel.
pub trait Channel: Copy + Default + Send + Sync + 'static {
    /// Largest value a channel can hold (fully saturated).
    const MAX: u16;

    fn widen(self) -> u16;
}

impl Channel for u8 {
    const MAX: u16 = u8::MAX as u16;

    #[inline]
    fn widen(self) -> u16 {
        self as u16
    }
}

impl Channel for u16 {
    const MAX: u16 = u16::MAX;

    #[inline]
    fn widen(self) -> u16 {
        self
    }
}

/// Channel arrangement of a source image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChannelLayout {
    Gray,
    GrayAlpha,
    Rgb,
    Rgba,
    Cmyk,
    Cmyka,
}

impl ChannelLayout {
    /// Guess the layout from a channel count.
    ///
    /// Four channels are taken as RGBA; use [`PixelSource::with_layout`] for CMYK.
    pub fn from_channels(channels: usize) -> Result<Self> {
        match channels {
            1 => Ok(Self::Gray),
            2 => Ok(Self::GrayAlpha),
            3 => Ok(Self::Rgb),
            4 => Ok(Self::Rgba),
            5 => Ok(Self::Cmyka),
            n => Err(SelectionError::UnsupportedChannels(n)),
        }
    }

    pub fn channels(self) -> usize {
        match self {
            Self::Gray => 1,
            Self::GrayAlpha => 2,
            Self::Rgb => 3,
            Self::Rgba | Self::Cmyk => 4,
            Self::Cmyka => 5,
        }
    }

    pub fn has_alpha(self) -> bool {
        matches!(self, Self::GrayAlpha | Self::Rgba | Self::Cmyka)
    }
}

/// One decoded pixel: up to [`MAX_CHANNELS`] values widened to `u16`.
///
/// Slots past `len` are always zero, so derived equality compares only the
/// channels that exist.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ColorSample {
    values: [u16; MAX_CHANNELS],
    len: u8,
}

impl ColorSample {
    /// Build a sample from channel values.
    ///
    /// # Errors
    /// `UnsupportedChannels` if more than [`MAX_CHANNELS`] values are given.
    pub fn new(channels: &[u16]) -> Result<Self> {
        if channels.len() > MAX_CHANNELS {
            return Err(SelectionError::UnsupportedChannels(channels.len()));
        }
        let mut values = [0u16; MAX_CHANNELS];
        values[..channels.len()].copy_from_slice(channels);
        Ok(Self {
            values,
            len: channels.len() as u8,
        })
    }

    #[inline]
    pub fn channels(&self) -> &[u16] {
        &self.values[..self.len as usize]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Read-only view over a caller-owned raster.
///
/// Cheap to copy and safe to share between threads running independent builds.
#[derive(Clone, Copy, Debug)]
pub struct PixelSource<'a, T: Channel> {
    data: ArrayView3<'a, T>,
    layout: ChannelLayout,
}

impl<'a, T: Channel> PixelSource<'a, T> {
    /// Wrap an `(height, width, channels)` view, inferring the layout from the
    /// channel count.
    pub fn new(data: ArrayView3<'a, T>) -> Result<Self> {
        let layout = ChannelLayout::from_channels(data.dim().2)?;
        Ok(Self { data, layout })
    }

    /// Wrap a view with an explicit layout.
    pub fn with_layout(data: ArrayView3<'a, T>, layout: ChannelLayout) -> Result<Self> {
        let channels = data.dim().2;
        if channels != layout.channels() {
            return Err(SelectionError::LayoutMismatch { layout, channels });
        }
        Ok(Self { data, layout })
    }

    /// Wrap a flat interleaved buffer (row-major, no padding).
    pub fn from_slice(
        data: &'a [T],
        width: usize,
        height: usize,
        layout: ChannelLayout,
    ) -> Result<Self> {
        let Some(expected) = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(layout.channels()))
        else {
            return Err(SelectionError::BufferSize {
                expected: usize::MAX,
                actual: data.len(),
            });
        };
        if data.len() != expected {
            return Err(SelectionError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        let view = ArrayView3::from_shape((height, width, layout.channels()), data).map_err(
            |_| SelectionError::BufferSize {
                expected,
                actual: data.len(),
            },
        )?;
        Ok(Self { data: view, layout })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    #[inline]
    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    /// Largest channel value for this source's sample type.
    #[inline]
    pub fn max_channel_value(&self) -> u16 {
        T::MAX
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Decode the pixel at `(x, y)`, or `None` outside the image.
    pub fn sample(&self, x: usize, y: usize) -> Option<ColorSample> {
        if x < self.width() && y < self.height() {
            Some(self.sample_at(x, y))
        } else {
            None
        }
    }

    /// Decode an in-bounds pixel. Callers guarantee the coordinate is valid.
    #[inline]
    pub(crate) fn sample_at(&self, x: usize, y: usize) -> ColorSample {
        let mut values = [0u16; MAX_CHANNELS];
        let n = self.layout.channels();
        for (c, value) in values.iter_mut().enumerate().take(n) {
            *value = self.data[[y, x, c]].widen();
        }
        ColorSample {
            values,
            len: n as u8,
        }
    }

    pub(crate) fn view(&self) -> ArrayView3<'a, T> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_layout_inference() {
        let image = Array3::<u8>::zeros((2, 3, 4));
        let source = PixelSource::new(image.view()).unwrap();
        assert_eq!(source.layout(), ChannelLayout::Rgba);
        assert_eq!(source.width(), 3);
        assert_eq!(source.height(), 2);
        assert_eq!(source.max_channel_value(), 255);

        let image = Array3::<u8>::zeros((2, 3, 6));
        assert_eq!(
            PixelSource::new(image.view()).unwrap_err(),
            SelectionError::UnsupportedChannels(6)
        );
    }

    #[test]
    fn test_explicit_layout() {
        let image = Array3::<u8>::zeros((2, 2, 4));
        let source = PixelSource::with_layout(image.view(), ChannelLayout::Cmyk).unwrap();
        assert_eq!(source.layout(), ChannelLayout::Cmyk);
        assert!(!source.layout().has_alpha());

        let err = PixelSource::with_layout(image.view(), ChannelLayout::Rgb).unwrap_err();
        assert_eq!(
            err,
            SelectionError::LayoutMismatch {
                layout: ChannelLayout::Rgb,
                channels: 4
            }
        );
    }

    #[test]
    fn test_sample_rgb() {
        // 2x1 image: red, green
        let data = [255u8, 0, 0, 0, 255, 0];
        let source = PixelSource::from_slice(&data, 2, 1, ChannelLayout::Rgb).unwrap();

        assert_eq!(source.sample(0, 0), Some(ColorSample::new(&[255, 0, 0]).unwrap()));
        assert_eq!(source.sample(1, 0).unwrap().channels(), &[0, 255, 0]);
        assert_eq!(source.sample(2, 0), None);
        assert_eq!(source.sample(0, 1), None);
    }

    #[test]
    fn test_sample_u16() {
        let data = [65535u16, 1000];
        let source = PixelSource::from_slice(&data, 1, 1, ChannelLayout::GrayAlpha).unwrap();
        assert_eq!(source.max_channel_value(), 65535);
        assert_eq!(source.sample(0, 0).unwrap().channels(), &[65535, 1000]);
    }

    #[test]
    fn test_from_slice_size_check() {
        let data = [0u8; 11];
        let err = PixelSource::from_slice(&data, 2, 2, ChannelLayout::Rgb).unwrap_err();
        assert_eq!(
            err,
            SelectionError::BufferSize {
                expected: 12,
                actual: 11
            }
        );
    }

    #[test]
    fn test_from_slice_overflowing_dimensions() {
        let data: [u8; 0] = [];
        let err = PixelSource::from_slice(&data, usize::MAX / 2, 3, ChannelLayout::Rgba).unwrap_err();
        assert_eq!(
            err,
            SelectionError::BufferSize {
                expected: usize::MAX,
                actual: 0
            }
        );

        let err = PixelSource::from_slice(&data, usize::MAX / 4, 2, ChannelLayout::Cmyka).unwrap_err();
        assert!(matches!(err, SelectionError::BufferSize { actual: 0, .. }));
    }

    #[test]
    fn test_sample_cmyka() {
        // 2x1 CMYKA image
        let mut image = Array3::<u8>::zeros((1, 2, 5));
        for (c, v) in [10u8, 20, 30, 40, 250].into_iter().enumerate() {
            image[[0, 1, c]] = v;
        }
        let source = PixelSource::new(image.view()).unwrap();
        assert_eq!(source.layout(), ChannelLayout::Cmyka);
        assert!(source.layout().has_alpha());

        let sample = source.sample_at(1, 0);
        assert_eq!(sample.len(), MAX_CHANNELS);
        assert_eq!(sample.channels(), &[10, 20, 30, 40, 250]);
        assert_eq!(source.sample(0, 0).unwrap().channels(), &[0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_empty_source_constructs() {
        let image = Array3::<u8>::zeros((0, 5, 3));
        let source = PixelSource::new(image.view()).unwrap();
        assert!(source.is_empty());
    }

    #[test]
    fn test_color_sample_equality_ignores_unused_slots() {
        let a = ColorSample::new(&[1, 2, 3]).unwrap();
        let b = ColorSample::new(&[1, 2, 3]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 3);
        assert_ne!(a, ColorSample::new(&[1, 2, 3, 0]).unwrap());
    }

    #[test]
    fn test_color_sample_rejects_too_many_channels() {
        assert_eq!(
            ColorSample::new(&[0; 6]).unwrap_err(),
            SelectionError::UnsupportedChannels(6)
        );
        assert_eq!(ColorSample::new(&[7; 5]).unwrap().len(), 5);
    }
}
