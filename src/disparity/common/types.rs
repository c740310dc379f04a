//! Image, map and parameter types

use crate::disparity::common::error::{DisparityError, Result};

/// Default exclusive upper bound on the searched shift.
pub const DEFAULT_MAX_DISPARITY: u32 = 16;

/// Default side length of the square correlation window.
pub const DEFAULT_WINDOW_SIZE: u32 = 7;

/// Largest accepted `max_disparity`; kernels receive it as a signed 32-bit int.
pub const MAX_DISPARITY_LIMIT: u32 = i32::MAX as u32;

/// Largest accepted window size. A 4095x4095 window of 8-bit differences
/// still sums within `u32`.
pub const MAX_WINDOW_SIZE: u32 = 4095;

/// Single-channel 8-bit intensity image, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
    /// Intensity samples, `width * height` long
    pub data: Vec<u8>,
}

impl Image {
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 || data.len() != width * height {
            return Err(DisparityError::InvalidDimensions(width, height));
        }
        Ok(Self { width, height, data })
    }

    /// Image filled with a single intensity.
    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.data[row * self.width + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: u8) {
        self.data[row * self.width + col] = value;
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }
}

/// One rectified stereo frame as handed over by a frame source.
#[derive(Debug, Clone)]
pub struct FramePair {
    /// File name (or other label) shared by both views
    pub name: String,
    pub left: Image,
    pub right: Image,
}

impl FramePair {
    pub fn new(name: impl Into<String>, left: Image, right: Image) -> Self {
        Self {
            name: name.into(),
            left,
            right,
        }
    }

    /// Checks the pair invariant: equal, positive dimensions.
    pub fn validate(&self) -> Result<()> {
        validate_pair(&self.left, &self.right)
    }
}

pub(crate) fn validate_pair(left: &Image, right: &Image) -> Result<()> {
    if left.width == 0 || left.height == 0 {
        return Err(DisparityError::InvalidDimensions(left.width, left.height));
    }
    if left.dimensions() != right.dimensions() {
        return Err(DisparityError::DimensionMismatch {
            left_width: left.width,
            left_height: left.height,
            right_width: right.width,
            right_height: right.height,
        });
    }
    if left.data.len() != left.width * left.height || right.data.len() != right.width * right.height {
        return Err(DisparityError::InvalidDimensions(left.width, left.height));
    }
    Ok(())
}

/// Block-matching parameters, immutable for the lifetime of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisparityParams {
    /// Exclusive upper bound on the searched shift
    pub max_disparity: u32,
    /// Side length of the correlation window as configured
    pub window_size: u32,
}

impl Default for DisparityParams {
    fn default() -> Self {
        Self {
            max_disparity: DEFAULT_MAX_DISPARITY,
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

impl DisparityParams {
    pub fn builder() -> DisparityParamsBuilder {
        DisparityParamsBuilder::default()
    }

    /// Half the window side, truncating: a window size of 4 gives radius 2.
    #[inline]
    pub fn window_radius(&self) -> usize {
        (self.window_size / 2) as usize
    }

    /// Effective side of the square window, `2 * radius + 1`.
    #[inline]
    pub fn window_side(&self) -> usize {
        2 * self.window_radius() + 1
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_disparity == 0 {
            return Err(DisparityError::InvalidParameters(
                "max_disparity must be at least 1".to_string(),
            ));
        }
        if self.max_disparity > MAX_DISPARITY_LIMIT {
            return Err(DisparityError::InvalidParameters(format!(
                "max_disparity {} exceeds {}",
                self.max_disparity, MAX_DISPARITY_LIMIT
            )));
        }
        if self.window_size > MAX_WINDOW_SIZE {
            return Err(DisparityError::InvalidParameters(format!(
                "window size {} exceeds {}",
                self.window_size, MAX_WINDOW_SIZE
            )));
        }
        Ok(())
    }
}

/// Builder for DisparityParams
#[derive(Default)]
pub struct DisparityParamsBuilder {
    max_disparity: Option<u32>,
    window_size: Option<u32>,
}

impl DisparityParamsBuilder {
    pub fn max_disparity(mut self, max_disparity: u32) -> Self {
        self.max_disparity = Some(max_disparity);
        self
    }

    pub fn window_size(mut self, window_size: u32) -> Self {
        self.window_size = Some(window_size);
        self
    }

    /// Sets the window through its radius; equivalent to `window_size(2 * radius + 1)`.
    pub fn window_radius(mut self, radius: u32) -> Self {
        self.window_size = Some(2 * radius + 1);
        self
    }

    pub fn build(self) -> DisparityParams {
        let default = DisparityParams::default();
        DisparityParams {
            max_disparity: self.max_disparity.unwrap_or(default.max_disparity),
            window_size: self.window_size.unwrap_or(default.window_size),
        }
    }
}

/// Raw per-pixel disparities for one frame.
///
/// Pixels within `window_radius` of an edge are never searched and hold 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDisparityMap {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u32>,
    /// Largest disparity recorded in `data`
    pub observed_max: u32,
}

impl RawDisparityMap {
    /// All-sentinel map.
    pub fn zeroed(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
            observed_max: 0,
        }
    }

    /// Wraps a buffer read back from a device, scanning it for the maximum.
    pub fn from_buffer(width: usize, height: usize, data: Vec<u32>) -> Self {
        let observed_max = data.iter().copied().max().unwrap_or(0);
        Self {
            width,
            height,
            data,
            observed_max,
        }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u32 {
        self.data[row * self.width + col]
    }
}

/// Disparity scaled to the displayable 0..=255 range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedMap {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl NormalizedMap {
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.data[row * self.width + col]
    }
}

/// Per-pixel absolute difference between two normalized maps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DifferenceMap {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl DifferenceMap {
    /// Number of pixels where the two maps disagree.
    pub fn differing_pixels(&self) -> usize {
        self.data.iter().filter(|&&d| d != 0).count()
    }

    /// View as a normalized map, for writing through the same output path.
    pub fn as_normalized(&self) -> NormalizedMap {
        NormalizedMap {
            width: self.width,
            height: self.height,
            data: self.data.clone(),
        }
    }
}
