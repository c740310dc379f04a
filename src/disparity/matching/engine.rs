use crate::disparity::common::{DisparityParams, Image, PipelineTimings, RawDisparityMap, Result};

/// A disparity implementation the harness can drive.
///
/// Implementations are interchangeable: identical inputs and parameters must
/// yield identical `RawDisparityMap`s.
pub trait DisparityBackend {
    /// Short identifier used in logs, timing samples and output file names.
    fn label(&self) -> &str;

    fn params(&self) -> &DisparityParams;

    fn compute(&mut self, left: &Image, right: &Image) -> Result<RawDisparityMap>;

    /// Per-phase timings of the last `compute`, when the backend profiles them.
    fn phase_timings(&self) -> Option<&PipelineTimings> {
        None
    }
}
