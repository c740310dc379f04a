use std::io::Write;

use tracing::debug;

use crate::disparity::common::{DisparityError, NormalizedMap, Result};
use crate::disparity::output::types::{OutputConfig, TiffCompression};
use crate::disparity::output::writer::DisparityWriter;

pub struct StandardTiffWriter;

impl DisparityWriter for StandardTiffWriter {
    fn write_map(&self, map: &NormalizedMap, output: &mut dyn Write, config: &OutputConfig) -> Result<()> {
        debug!("Encoding disparity TIFF: {}x{}", map.width, map.height);

        let mut buffer = Vec::new();

        let compression = match config.compression {
            TiffCompression::None => tiff::encoder::Compression::Uncompressed,
            TiffCompression::Lzw => tiff::encoder::Compression::Lzw,
            TiffCompression::DeflateFast => tiff::encoder::Compression::Deflate(tiff::encoder::compression::DeflateLevel::Fast),
            TiffCompression::DeflateBalanced => tiff::encoder::Compression::Deflate(tiff::encoder::compression::DeflateLevel::Balanced),
            TiffCompression::DeflateBest => tiff::encoder::Compression::Deflate(tiff::encoder::compression::DeflateLevel::Best),
        };

        let mut encoder = tiff::encoder::TiffEncoder::new(std::io::Cursor::new(&mut buffer))
            .map_err(|e| DisparityError::OutputWriteError(e.to_string()))?
            .with_compression(compression);

        if config.predictor {
            encoder = encoder.with_predictor(tiff::tags::Predictor::Horizontal);
        }

        encoder
            .write_image::<tiff::encoder::colortype::Gray8>(
                map.width as u32,
                map.height as u32,
                &map.data,
            )
            .map_err(|e| DisparityError::OutputWriteError(e.to_string()))?;

        output.write_all(&buffer)?;
        Ok(())
    }

    fn extension(&self) -> &'static str {
        "tiff"
    }
}
