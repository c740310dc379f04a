//! Disparity map output
//!
//! Normalized and difference maps are written as 8-bit grayscale TIFFs.

mod writer;
mod standard_tiff_writer;
pub mod types;

pub use writer::DisparityWriter;
pub use standard_tiff_writer::StandardTiffWriter;
pub use types::{OutputConfig, OutputConfigBuilder, TiffCompression};
