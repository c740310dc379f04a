use tracing::debug;

use crate::disparity::common::{
    DisparityParams, Image, RawDisparityMap, Result, types::validate_pair,
};
use crate::disparity::matching::cost::{CostBuffer, window_sad};
use crate::disparity::matching::engine::DisparityBackend;

/// Sequential SAD block matching, the reference every other backend is
/// checked against.
pub struct CpuDisparityEngine {
    params: DisparityParams,
    costs: CostBuffer,
}

impl CpuDisparityEngine {
    pub fn new(params: DisparityParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            costs: CostBuffer::with_capacity(params.max_disparity as usize),
        })
    }
}

impl DisparityBackend for CpuDisparityEngine {
    fn label(&self) -> &str {
        "cpu"
    }

    fn params(&self) -> &DisparityParams {
        &self.params
    }

    fn compute(&mut self, left: &Image, right: &Image) -> Result<RawDisparityMap> {
        validate_pair(left, right)?;

        let (width, height) = left.dimensions();
        let radius = self.params.window_radius();
        let max_disparity = self.params.max_disparity as usize;

        let mut map = RawDisparityMap::zeroed(width, height);

        if width <= 2 * radius || height <= 2 * radius {
            debug!(
                "Window radius {} leaves no interior pixels in {}x{}",
                radius, width, height
            );
            return Ok(map);
        }

        for row in radius..height - radius {
            for col in radius..width - radius {
                // Right anchor col - d must keep its window inside the image
                let candidates = max_disparity.min(col - radius + 1);

                self.costs.clear();
                for d in 0..candidates {
                    self.costs
                        .push(window_sad(left, right, row, col, col - d, radius))?;
                }

                let disparity = self.costs.argmin().unwrap_or(0) as u32;
                map.data[row * width + col] = disparity;
                if disparity > map.observed_max {
                    map.observed_max = disparity;
                }
            }
        }

        debug!(
            "CPU block matching {}x{} done, max disparity {}",
            width, height, map.observed_max
        );
        Ok(map)
    }
}
