use std::io::Write;

use crate::disparity::common::{NormalizedMap, Result};
use crate::disparity::output::types::OutputConfig;

pub trait DisparityWriter {
    fn write_map(&self, map: &NormalizedMap, output: &mut dyn Write, config: &OutputConfig) -> Result<()>;

    /// File extension, without the dot, for maps written by this writer.
    fn extension(&self) -> &'static str;
}
