//! Cross-backend validation: comparison metrics, timing samples and
//! rolling throughput reports.

mod harness;
mod throughput;

#[cfg(test)]
mod tests;

pub use harness::{FrameComparison, ValidationHarness, Verdict, compare_normalized};
pub use throughput::{ThroughputReport, ThroughputReporter, TimingSample, REPORT_THRESHOLD, timed_compute};
pub use crate::disparity::common::{PipelineTimings, StepTiming, Timer};
