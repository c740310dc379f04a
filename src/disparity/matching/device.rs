use std::fmt;

use crate::disparity::common::{DisparityError, Result};

/// Static description of a compute device, logged with `--kernel-info`.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    /// Device name as reported by the driver
    pub name: String,
    /// Short backend tag ("cuda", "host-grid")
    pub backend: &'static str,
    /// Parallel execution units available to the kernel
    pub compute_units: usize,
    /// Most work items a single work group may hold
    pub max_work_group: usize,
    pub kernel_name: &'static str,
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] compute_units={} max_work_group={} kernel={}",
            self.name, self.backend, self.compute_units, self.max_work_group, self.kernel_name
        )
    }
}

/// Scalar kernel arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelArgs {
    pub width: usize,
    pub height: usize,
    pub max_disparity: u32,
    pub radius: usize,
}

/// Data-parallel launch shape: a global grid covering the image, tiled into
/// fixed-size work groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchGeometry {
    /// Global size, a multiple of `work_group` in each dimension
    pub global: (usize, usize),
    pub work_group: (usize, usize),
}

impl LaunchGeometry {
    pub fn for_image(width: usize, height: usize, work_group: (usize, usize)) -> Result<Self> {
        let (gw, gh) = work_group;
        if gw == 0 || gh == 0 {
            return Err(DisparityError::InvalidParameters(format!(
                "work group must be non-empty, got {gw}x{gh}"
            )));
        }
        Ok(Self {
            global: (width.div_ceil(gw) * gw, height.div_ceil(gh) * gh),
            work_group,
        })
    }

    /// Number of work groups along x and y.
    pub fn groups(&self) -> (usize, usize) {
        (
            self.global.0 / self.work_group.0,
            self.global.1 / self.work_group.1,
        )
    }
}

/// Device-side half of the accelerator protocol.
///
/// The executor drives the phases in order and blocks on each: `prepare`
/// once per image size, then `transfer_in`, `run_kernel`, `transfer_out`
/// per frame. Every method returns only after the device finished the work.
pub trait Device {
    fn info(&self) -> DeviceInfo;

    /// Allocates device buffers for `width * height` images.
    fn prepare(&mut self, width: usize, height: usize) -> Result<()>;

    fn transfer_in(&mut self, left: &[u8], right: &[u8]) -> Result<()>;

    fn run_kernel(&mut self, geometry: &LaunchGeometry, args: &KernelArgs) -> Result<()>;

    fn transfer_out(&mut self, out: &mut [u32]) -> Result<()>;
}
