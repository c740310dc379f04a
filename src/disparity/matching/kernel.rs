//! Per-work-item block matching kernel, host version.
//!
//! Mirrors `src/cuda/kernels/block_matching.cu` line for line so the host
//! device and the CUDA device produce the same buffer.

use crate::disparity::matching::device::KernelArgs;

/// Name under which the kernel is loaded on every device.
pub const KERNEL_NAME: &str = "block_match_sad";

/// Computes the disparity of one output pixel.
///
/// Border pixels evaluate to 0. Shifts are scanned from 0 upward, keeping a
/// running minimum that only a strictly lower cost replaces.
#[inline]
pub fn block_match_work_item(left: &[u8], right: &[u8], args: &KernelArgs, row: usize, col: usize) -> u32 {
    let width = args.width as isize;
    let height = args.height as isize;
    let radius = args.radius as isize;
    let max_disparity = args.max_disparity as isize;
    let (row, col) = (row as isize, col as isize);

    if row < radius || row + radius >= height || col < radius || col + radius >= width {
        return 0;
    }

    let mut best_cost = 0u32;
    let mut best = 0u32;

    let mut d = 0isize;
    while d < max_disparity && col - d >= radius {
        let anchor = col - d;
        let mut cost = 0u32;

        for kr in -radius..=radius {
            let line = ((row + kr) * width) as usize;
            for kc in -radius..=radius {
                let l = left[line + (col + kc) as usize] as i32;
                let r = right[line + (anchor + kc) as usize] as i32;
                cost += (l - r).unsigned_abs();
            }
        }

        if d == 0 || cost < best_cost {
            best_cost = cost;
            best = d as u32;
        }
        d += 1;
    }

    best
}
