//! Output configuration types

/// TIFF compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiffCompression {
    /// No compression (fastest, largest file)
    None,
    /// LZW compression
    Lzw,
    /// Deflate compression - fast level
    DeflateFast,
    /// Deflate compression - balanced
    DeflateBalanced,
    /// Deflate compression - best compression (slower)
    DeflateBest,
}

/// Configuration for writing disparity maps
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub compression: TiffCompression,
    /// Horizontal differencing predictor; only meaningful with compression
    pub predictor: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            compression: TiffCompression::DeflateFast,
            predictor: false,
        }
    }
}

impl OutputConfig {
    pub fn builder() -> OutputConfigBuilder {
        OutputConfigBuilder::default()
    }
}

/// Builder for OutputConfig
#[derive(Default)]
pub struct OutputConfigBuilder {
    compression: Option<TiffCompression>,
    predictor: Option<bool>,
}

impl OutputConfigBuilder {
    pub fn compression(mut self, compression: TiffCompression) -> Self {
        self.compression = Some(compression);
        self
    }

    pub fn predictor(mut self, enable: bool) -> Self {
        self.predictor = Some(enable);
        self
    }

    pub fn build(self) -> OutputConfig {
        let default = OutputConfig::default();
        OutputConfig {
            compression: self.compression.unwrap_or(default.compression),
            predictor: self.predictor.unwrap_or(default.predictor),
        }
    }
}
