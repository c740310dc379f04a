use rayon::prelude::*;
use tracing::debug;

use crate::disparity::common::{DevicePhase, DisparityError, Result};
use crate::disparity::matching::device::{Device, DeviceInfo, KernelArgs, LaunchGeometry};
use crate::disparity::matching::kernel::{KERNEL_NAME, block_match_work_item};

const BACKEND: &str = "host-grid";

/// Executes the kernel on the host, one rayon task per row of work groups.
///
/// Buffers are host memory, but the protocol (staging, dispatch over a tiled
/// grid, read-back) is the same one a real device follows.
#[derive(Default)]
pub struct HostGridDevice {
    left: Vec<u8>,
    right: Vec<u8>,
    output: Vec<u32>,
    len: usize,
}

impl HostGridDevice {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Device for HostGridDevice {
    fn info(&self) -> DeviceInfo {
        DeviceInfo {
            name: format!("host ({} threads)", rayon::current_num_threads()),
            backend: BACKEND,
            compute_units: rayon::current_num_threads(),
            max_work_group: usize::MAX,
            kernel_name: KERNEL_NAME,
        }
    }

    fn prepare(&mut self, width: usize, height: usize) -> Result<()> {
        let len = width * height;
        debug!("Allocating host-grid buffers for {}x{}", width, height);
        self.left = vec![0; len];
        self.right = vec![0; len];
        self.output = vec![0; len];
        self.len = len;
        Ok(())
    }

    fn transfer_in(&mut self, left: &[u8], right: &[u8]) -> Result<()> {
        if left.len() != self.len || right.len() != self.len {
            return Err(DisparityError::device(
                BACKEND,
                DevicePhase::TransferIn,
                format!(
                    "input of {}/{} bytes does not fit buffers of {}",
                    left.len(),
                    right.len(),
                    self.len
                ),
            ));
        }
        self.left.copy_from_slice(left);
        self.right.copy_from_slice(right);
        Ok(())
    }

    fn run_kernel(&mut self, geometry: &LaunchGeometry, args: &KernelArgs) -> Result<()> {
        if args.width * args.height != self.len {
            return Err(DisparityError::device(
                BACKEND,
                DevicePhase::Dispatch,
                format!("grid {}x{} does not match prepared buffers", args.width, args.height),
            ));
        }

        let (group_w, group_h) = geometry.work_group;
        let (groups_x, _) = geometry.groups();
        let left = &self.left;
        let right = &self.right;
        let width = args.width;
        let height = args.height;

        self.output
            .par_chunks_mut(width * group_h)
            .enumerate()
            .for_each(|(group_y, band)| {
                for group_x in 0..groups_x {
                    for ly in 0..group_h {
                        let row = group_y * group_h + ly;
                        if row >= height {
                            break;
                        }
                        for lx in 0..group_w {
                            let col = group_x * group_w + lx;
                            if col >= width {
                                break;
                            }
                            band[ly * width + col] = block_match_work_item(left, right, args, row, col);
                        }
                    }
                }
            });
        Ok(())
    }

    fn transfer_out(&mut self, out: &mut [u32]) -> Result<()> {
        if out.len() != self.len {
            return Err(DisparityError::device(
                BACKEND,
                DevicePhase::TransferOut,
                format!("host buffer of {} elements, device holds {}", out.len(), self.len),
            ));
        }
        out.copy_from_slice(&self.output);
        Ok(())
    }
}
