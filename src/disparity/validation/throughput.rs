use std::fmt;
use std::time::Duration;

use crate::disparity::common::{Image, RawDisparityMap, Result, Timer};
use crate::disparity::matching::DisparityBackend;

/// Accumulated time after which a throughput report is emitted.
pub const REPORT_THRESHOLD: Duration = Duration::from_millis(500);

/// Elapsed time of one backend on one frame pair.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingSample {
    pub backend: String,
    pub elapsed: Duration,
}

impl TimingSample {
    pub fn new(backend: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            backend: backend.into(),
            elapsed,
        }
    }

    /// Frames per second at this sample's latency; 0 for an unmeasurable
    /// (zero) duration.
    pub fn fps(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 { 1.0 / secs } else { 0.0 }
    }
}

impl fmt::Display for TimingSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] Time (ms): {:.3}  FPS: {:.2}",
            self.backend,
            self.elapsed.as_secs_f64() * 1000.0,
            self.fps()
        )
    }
}

/// Runs one backend on a pair and measures it.
///
/// When the backend profiled its phases, the phase total is the sample's
/// time; otherwise wall-clock around `compute` is used.
pub fn timed_compute<B: DisparityBackend + ?Sized>(
    backend: &mut B,
    left: &Image,
    right: &Image,
) -> Result<(RawDisparityMap, TimingSample)> {
    let timer = Timer::start(backend.label());
    let map = backend.compute(left, right)?;
    let (_, wall) = timer.stop();
    let elapsed = backend
        .phase_timings()
        .map(|t| t.total_duration())
        .unwrap_or(wall);
    Ok((map, TimingSample::new(backend.label(), elapsed)))
}

/// Emitted once accumulated time crosses the reporting threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct ThroughputReport {
    pub backend: String,
    /// Frames folded into this report
    pub frames: usize,
    /// Time accumulated since the previous report
    pub accumulated: Duration,
    /// Latency of the frame that triggered the report
    pub last: Duration,
}

impl ThroughputReport {
    pub fn fps(&self) -> f64 {
        let secs = self.accumulated.as_secs_f64();
        if secs > 0.0 { self.frames as f64 / secs } else { 0.0 }
    }
}

impl fmt::Display for ThroughputReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] Time (ms): {:.3}  FPS: {:.2} ({} frames in {:.1} ms)",
            self.backend,
            self.last.as_secs_f64() * 1000.0,
            self.fps(),
            self.frames,
            self.accumulated.as_secs_f64() * 1000.0
        )
    }
}

/// Rolling throughput accumulator for one backend.
#[derive(Debug, Clone)]
pub struct ThroughputReporter {
    threshold: Duration,
    accumulated: Duration,
    frames: usize,
}

impl Default for ThroughputReporter {
    fn default() -> Self {
        Self::new(REPORT_THRESHOLD)
    }
}

impl ThroughputReporter {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            accumulated: Duration::ZERO,
            frames: 0,
        }
    }

    /// Adds a sample; returns a report and resets when the threshold is reached.
    pub fn record(&mut self, sample: &TimingSample) -> Option<ThroughputReport> {
        self.accumulated += sample.elapsed;
        self.frames += 1;
        if self.accumulated < self.threshold {
            return None;
        }
        let report = ThroughputReport {
            backend: sample.backend.clone(),
            frames: self.frames,
            accumulated: self.accumulated,
            last: sample.elapsed,
        };
        self.accumulated = Duration::ZERO;
        self.frames = 0;
        Some(report)
    }

    pub fn accumulated(&self) -> Duration {
        self.accumulated
    }
}
