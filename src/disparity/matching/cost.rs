use crate::disparity::common::{DisparityError, Image, Result};

/// Candidates reserved up front; larger buffers grow on demand, bounded by
/// the image width.
const PREALLOCATED_CANDIDATES: usize = 256;

/// Candidate cost list for one pixel.
///
/// Capacity is fixed at construction from `max_disparity`; every push is
/// bounds-checked.
#[derive(Debug, Clone)]
pub struct CostBuffer {
    costs: Vec<u32>,
    capacity: usize,
}

impl CostBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            costs: Vec::with_capacity(capacity.min(PREALLOCATED_CANDIDATES)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }

    pub fn clear(&mut self) {
        self.costs.clear();
    }

    pub fn push(&mut self, cost: u32) -> Result<()> {
        if self.costs.len() >= self.capacity {
            return Err(DisparityError::CandidateOverflow {
                capacity: self.capacity,
            });
        }
        self.costs.push(cost);
        Ok(())
    }

    /// Index of the lowest cost; on ties the earliest index wins.
    pub fn argmin(&self) -> Option<usize> {
        let (&first, rest) = self.costs.split_first()?;
        let mut min = first;
        let mut best = 0;
        for (k, &cost) in rest.iter().enumerate() {
            if cost < min {
                min = cost;
                best = k + 1;
            }
        }
        Some(best)
    }
}

/// Sum of absolute differences between the left window centred on
/// `(row, left_col)` and the right window centred on `(row, right_col)`.
///
/// Both windows must lie fully inside the images.
#[inline]
pub fn window_sad(
    left: &Image,
    right: &Image,
    row: usize,
    left_col: usize,
    right_col: usize,
    radius: usize,
) -> u32 {
    let width = left.width;
    let side = 2 * radius + 1;
    let mut cost = 0u32;
    for r in (row - radius)..=(row + radius) {
        let base = r * width;
        let l_start = base + left_col - radius;
        let r_start = base + right_col - radius;
        let l = &left.data[l_start..l_start + side];
        let rr = &right.data[r_start..r_start + side];
        cost += l
            .iter()
            .zip(rr)
            .map(|(&a, &b)| a.abs_diff(b) as u32)
            .sum::<u32>();
    }
    cost
}
