//! Magic wand selection using a scanline flood fill.
//!
//! Selects the 4-connected region around a seed pixel whose colors lie within
//! a tolerance of the seed color. The seed color is sampled once and stays the
//! reference for the whole fill, so the selection cannot creep along gradients.
//!
//! The traversal keeps an explicit stack of horizontal runs instead of
//! recursing per pixel. Stack depth is bounded by the number of runs on the
//! fill frontier, not by the image size.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::debug;

use super::error::{Result, SelectionError};
use super::mask::Mask;
use super::pixel_source::{Channel, ColorSample, PixelSource};

/// Pixel coordinate of the click that starts a selection.
///
/// Signed so that clicks left of or above the image are reported as
/// [`SelectionError::OutOfBounds`] rather than wrapped or clamped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SeedPoint {
    pub x: i64,
    pub y: i64,
}

impl SeedPoint {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Resolve to in-bounds pixel coordinates.
    fn resolve(self, width: usize, height: usize) -> Result<(usize, usize)> {
        let x = usize::try_from(self.x).ok().filter(|&x| x < width);
        let y = usize::try_from(self.y).ok().filter(|&y| y < height);
        match (x, y) {
            (Some(x), Some(y)) => Ok((x, y)),
            _ => Err(SelectionError::OutOfBounds {
                x: self.x,
                y: self.y,
                width,
                height,
            }),
        }
    }
}

impl From<(i64, i64)> for SeedPoint {
    fn from((x, y): (i64, i64)) -> Self {
        Self { x, y }
    }
}

/// Normalized color tolerance in [0.0, 1.0].
///
/// 0.0 matches only the exact seed color, 1.0 matches every color.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Tolerance(f32);

impl Tolerance {
    pub fn new(value: f32) -> Result<Self> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(SelectionError::InvalidTolerance(value))
        }
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Scale to a per-channel threshold for channels ranging over `0..=max`.
    pub fn threshold(self, max: u16) -> u32 {
        (self.0 * max as f32).round() as u32
    }
}

/// How the difference between a pixel and the seed color is measured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColorDistance {
    /// Every channel must differ from the seed by at most the threshold.
    #[default]
    PerChannel,
    /// Euclidean distance over all channels, at most `threshold * sqrt(channels)`.
    Euclidean,
}

/// Color predicate fixed for one build.
struct ColorMatcher {
    reference: ColorSample,
    threshold: u32,
    distance: ColorDistance,
}

impl ColorMatcher {
    #[inline]
    fn matches(&self, candidate: &ColorSample) -> bool {
        let mut diffs = candidate
            .channels()
            .iter()
            .zip(self.reference.channels())
            .map(|(&c, &r)| (c as i32 - r as i32).unsigned_abs());

        match self.distance {
            ColorDistance::PerChannel => diffs.all(|d| d <= self.threshold),
            ColorDistance::Euclidean => {
                let sum: u64 = diffs.map(|d| d as u64 * d as u64).sum();
                let t = self.threshold as u64;
                sum <= t * t * self.reference.len() as u64
            }
        }
    }
}

/// Shared flag a caller sets to abort a running build.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// A matched run `x_start..=x_end` on row `y` awaiting expansion.
///
/// `scan_up` / `scan_down` say whether the whole run still has to be scanned
/// on that neighbour row. The row the run was found from only needs scanning
/// over columns gained by horizontal extension.
#[derive(Clone, Copy, Debug)]
struct Segment {
    y: usize,
    x_start: usize,
    x_end: usize,
    scan_up: bool,
    scan_down: bool,
}

/// Per-build traversal state. Never outlives a single `build` call.
struct Fill<'s, 'a, T: Channel> {
    source: &'s PixelSource<'a, T>,
    matcher: ColorMatcher,
    width: usize,
    height: usize,
    visited: Vec<bool>,
    mask: Mask,
    stack: Vec<Segment>,
    segments: usize,
    peak_stack: usize,
}

impl<'s, 'a, T: Channel> Fill<'s, 'a, T> {
    /// Mark `(x, y)` visited and test it. Must not be called twice per pixel.
    #[inline]
    fn visit(&mut self, x: usize, y: usize) -> bool {
        let idx = y * self.width + x;
        debug_assert!(!self.visited[idx], "pixel ({x}, {y}) evaluated twice");
        self.visited[idx] = true;
        let matched = self.matcher.matches(&self.source.sample_at(x, y));
        if matched {
            self.mask.set(x, y, true);
        }
        matched
    }

    #[inline]
    fn is_visited(&self, x: usize, y: usize) -> bool {
        self.visited[y * self.width + x]
    }

    fn push(&mut self, segment: Segment) {
        self.stack.push(segment);
        self.peak_stack = self.peak_stack.max(self.stack.len());
    }

    /// Grow a run left and right while neighbours are unvisited and match.
    fn extend(&mut self, y: usize, x_start: usize, x_end: usize) -> (usize, usize) {
        let mut left = x_start;
        while left > 0 && !self.is_visited(left - 1, y) {
            if !self.visit(left - 1, y) {
                break;
            }
            left -= 1;
        }

        let mut right = x_end;
        while right + 1 < self.width && !self.is_visited(right + 1, y) {
            if !self.visit(right + 1, y) {
                break;
            }
            right += 1;
        }

        (left, right)
    }

    /// Scan `x_start..=x_end` on row `y`, pushing every maximal run of
    /// unvisited matching pixels. `from_above` tells which side the scan came
    /// from so the new run skips rescanning it.
    fn scan_row(&mut self, y: usize, x_start: usize, x_end: usize, from_above: bool) {
        let mut run_start: Option<usize> = None;

        for x in x_start..=x_end {
            let matched = !self.is_visited(x, y) && self.visit(x, y);
            match (matched, run_start) {
                (true, None) => run_start = Some(x),
                (false, Some(start)) => {
                    self.push_run(y, start, x - 1, from_above);
                    run_start = None;
                }
                _ => {}
            }
        }

        if let Some(start) = run_start {
            self.push_run(y, start, x_end, from_above);
        }
    }

    fn push_run(&mut self, y: usize, x_start: usize, x_end: usize, from_above: bool) {
        self.push(Segment {
            y,
            x_start,
            x_end,
            scan_up: !from_above,
            scan_down: from_above,
        });
    }

    /// Scan the parts of `left..=right` outside `x_start..=x_end` on row `y`.
    fn scan_extension(
        &mut self,
        y: usize,
        left: usize,
        right: usize,
        x_start: usize,
        x_end: usize,
        from_above: bool,
    ) {
        if left < x_start {
            self.scan_row(y, left, x_start - 1, from_above);
        }
        if right > x_end {
            self.scan_row(y, x_end + 1, right, from_above);
        }
    }

    fn run(&mut self, cancel: Option<&CancelToken>) -> Result<()> {
        while let Some(segment) = self.stack.pop() {
            if cancel.is_some_and(CancelToken::is_cancelled) {
                return Err(SelectionError::Cancelled);
            }
            self.segments += 1;

            let Segment {
                y,
                x_start,
                x_end,
                scan_up,
                scan_down,
            } = segment;
            let (left, right) = self.extend(y, x_start, x_end);

            if y > 0 {
                if scan_up {
                    self.scan_row(y - 1, left, right, false);
                } else {
                    self.scan_extension(y - 1, left, right, x_start, x_end, false);
                }
            }
            if y + 1 < self.height {
                if scan_down {
                    self.scan_row(y + 1, left, right, true);
                } else {
                    self.scan_extension(y + 1, left, right, x_start, x_end, true);
                }
            }
        }
        Ok(())
    }
}

/// Builds selection masks from a seed point and tolerance.
///
/// Holds only configuration; every call to [`MaskBuilder::build`] owns its own
/// visited table and work stack, so one builder can serve concurrent builds.
#[derive(Clone, Copy, Debug)]
pub struct MaskBuilder {
    tolerance: f32,
    distance: ColorDistance,
}

impl MaskBuilder {
    pub fn new(tolerance: f32) -> Self {
        Self {
            tolerance,
            distance: ColorDistance::default(),
        }
    }

    pub fn with_distance(mut self, distance: ColorDistance) -> Self {
        self.distance = distance;
        self
    }

    /// Compute the selection mask for `seed`.
    ///
    /// # Errors
    /// `EmptySource`, `InvalidTolerance` or `OutOfBounds`, checked in that order.
    pub fn build<T: Channel>(&self, source: &PixelSource<'_, T>, seed: SeedPoint) -> Result<Mask> {
        self.build_inner(source, seed, None)
    }

    /// Like [`MaskBuilder::build`], but checks `cancel` before each segment
    /// and returns `Cancelled` without a mask once it is set.
    pub fn build_cancellable<T: Channel>(
        &self,
        source: &PixelSource<'_, T>,
        seed: SeedPoint,
        cancel: &CancelToken,
    ) -> Result<Mask> {
        self.build_inner(source, seed, Some(cancel))
    }

    fn build_inner<T: Channel>(
        &self,
        source: &PixelSource<'_, T>,
        seed: SeedPoint,
        cancel: Option<&CancelToken>,
    ) -> Result<Mask> {
        if source.is_empty() {
            return Err(SelectionError::EmptySource);
        }
        let tolerance = Tolerance::new(self.tolerance)?;
        let (width, height) = (source.width(), source.height());
        let (seed_x, seed_y) = seed.resolve(width, height)?;

        let matcher = ColorMatcher {
            reference: source.sample_at(seed_x, seed_y),
            threshold: tolerance.threshold(source.max_channel_value()),
            distance: self.distance,
        };

        let mut fill = Fill {
            source,
            matcher,
            width,
            height,
            visited: vec![false; width * height],
            mask: Mask::new(width, height),
            stack: Vec::new(),
            segments: 0,
            peak_stack: 0,
        };

        let seed_matched = fill.visit(seed_x, seed_y);
        debug_assert!(seed_matched, "seed must match its own color");
        fill.push(Segment {
            y: seed_y,
            x_start: seed_x,
            x_end: seed_x,
            scan_up: true,
            scan_down: true,
        });

        if let Err(err) = fill.run(cancel) {
            debug!(
                "magic wand at ({seed_x}, {seed_y}) cancelled after {} segments",
                fill.segments
            );
            return Err(err);
        }

        debug!(
            "magic wand {width}x{height} seed=({seed_x}, {seed_y}) tolerance={} threshold={}: \
             {} pixels selected, {} segments, peak stack {}",
            tolerance.value(),
            fill.matcher.threshold,
            fill.mask.count(),
            fill.segments,
            fill.peak_stack
        );

        Ok(fill.mask)
    }
}

/// Compute the selection mask around `seed` using per-channel tolerance.
///
/// Convenience for `MaskBuilder::new(tolerance).build(source, seed)`.
pub fn build<T: Channel>(source: &PixelSource<'_, T>, seed: SeedPoint, tolerance: f32) -> Result<Mask> {
    MaskBuilder::new(tolerance).build(source, seed)
}
