use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{info, instrument};

use crate::disparity::common::{DisparityError, NormalizedMap, Result};
use crate::disparity::frames::FrameSource;
use crate::disparity::matching::{
    AcceleratorExecutor, CpuDisparityEngine, Device, DisparityBackend, HostGridDevice, open_cuda_device,
};
use crate::disparity::normalize::normalize;
use crate::disparity::output::{DisparityWriter, StandardTiffWriter};
use crate::disparity::pipeline::types::{DeviceSelection, ExecutionMode, RunConfig};
use crate::disparity::validation::{ThroughputReporter, TimingSample, ValidationHarness, timed_compute};

/// Accumulated time of one backend over a run.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendTotals {
    pub backend: String,
    pub frames: usize,
    pub total: Duration,
}

impl BackendTotals {
    fn new(backend: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            frames: 0,
            total: Duration::ZERO,
        }
    }

    fn add(&mut self, sample: &TimingSample) {
        self.frames += 1;
        self.total += sample.elapsed;
    }

    pub fn mean(&self) -> Duration {
        if self.frames == 0 {
            Duration::ZERO
        } else {
            self.total / self.frames as u32
        }
    }
}

/// What a finished run reports.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub mode: ExecutionMode,
    pub frames: usize,
    /// Frames whose normalized outputs differed (validation only)
    pub mismatches: usize,
    pub backends: Vec<BackendTotals>,
}

impl RunSummary {
    pub fn all_matched(&self) -> bool {
        self.mismatches == 0
    }

    pub fn log(&self) {
        info!("Processed {} frames ({})", self.frames, self.mode);
        for totals in &self.backends {
            info!(
                "[{}] total {:.3} ms, mean {:.3} ms/frame",
                totals.backend,
                totals.total.as_secs_f64() * 1000.0,
                totals.mean().as_secs_f64() * 1000.0
            );
        }
        if self.mode == ExecutionMode::Validate {
            info!("Mismatching frames: {}/{}", self.mismatches, self.frames);
        }
    }
}

pub struct StereoPipeline<S: FrameSource, W: DisparityWriter> {
    source: S,
    writer: W,
    config: RunConfig,
}

impl<S: FrameSource> StereoPipeline<S, StandardTiffWriter> {
    pub fn new(source: S, config: RunConfig) -> Self {
        Self {
            source,
            writer: StandardTiffWriter,
            config,
        }
    }
}

impl<S: FrameSource, W: DisparityWriter> StereoPipeline<S, W> {
    pub fn with_custom(source: S, writer: W, config: RunConfig) -> Self {
        Self {
            source,
            writer,
            config,
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Opens the configured accelerator device and wraps it in an executor.
    pub fn build_accelerator(&self) -> Result<AcceleratorExecutor> {
        let device: Box<dyn Device> = match self.config.device {
            DeviceSelection::Host => Box::new(HostGridDevice::new()),
            DeviceSelection::Cuda { ordinal } => open_cuda_device(ordinal)?,
        };
        AcceleratorExecutor::new(device, self.config.params, self.config.accelerator.clone())
    }

    /// Runs the configured mode over every frame of the source.
    #[instrument(skip(self), fields(mode = %self.config.mode, frames = self.source.len()))]
    pub fn run(&self) -> Result<RunSummary> {
        self.check_source()?;

        info!(
            "Max disparity: {}, window size: {} (radius {})",
            self.config.params.max_disparity,
            self.config.params.window_size,
            self.config.params.window_radius()
        );

        match self.config.mode {
            ExecutionMode::CpuOnly => {
                let mut engine = CpuDisparityEngine::new(self.config.params)?;
                self.run_single(&mut engine)
            }
            ExecutionMode::AcceleratorOnly => {
                let mut executor = self.build_accelerator()?;
                self.run_single(&mut executor)
            }
            ExecutionMode::Validate => {
                let executor = self.build_accelerator()?;
                let engine = CpuDisparityEngine::new(self.config.params)?;
                let mut harness =
                    ValidationHarness::with_report_threshold(engine, executor, self.config.report_threshold);
                self.run_validation(&mut harness)
            }
        }
    }

    /// Drives one backend over the source, reporting rolling throughput.
    pub fn run_single<B: DisparityBackend + ?Sized>(&self, backend: &mut B) -> Result<RunSummary> {
        self.check_source()?;
        let mut reporter = ThroughputReporter::new(self.config.report_threshold);
        let mut totals = BackendTotals::new(backend.label());

        for index in 0..self.source.len() {
            let pair = {
                let _span = tracing::info_span!("read_frame", index).entered();
                self.source.read_pair(index)?
            };
            let _span = tracing::info_span!("frame", name = %pair.name).entered();

            let (raw, sample) = timed_compute(backend, &pair.left, &pair.right)?;
            let normalized = normalize(&raw, raw.observed_max);
            totals.add(&sample);

            if let Some(report) = reporter.record(&sample) {
                info!("{}", report);
            }

            self.write_output(&pair.name, backend.label(), &normalized)?;
        }

        Ok(RunSummary {
            mode: self.config.mode,
            frames: self.source.len(),
            mismatches: 0,
            backends: vec![totals],
        })
    }

    /// Drives both backends of the harness over the source.
    pub fn run_validation<R: DisparityBackend, C: DisparityBackend>(
        &self,
        harness: &mut ValidationHarness<R, C>,
    ) -> Result<RunSummary> {
        self.check_source()?;
        let mut reference_totals = BackendTotals::new(harness.reference().label());
        let mut candidate_totals = BackendTotals::new(harness.candidate().label());
        let mut mismatches = 0;

        for index in 0..self.source.len() {
            let pair = {
                let _span = tracing::info_span!("read_frame", index).entered();
                self.source.read_pair(index)?
            };
            info!("Comparing frame {}", pair.name);

            let comparison = harness.compare_frame(&pair)?;
            reference_totals.add(&comparison.reference_timing);
            candidate_totals.add(&comparison.candidate_timing);
            if !comparison.verdict.is_match() {
                mismatches += 1;
            }
            for report in &comparison.reports {
                info!("{}", report);
            }

            self.write_output(&pair.name, &comparison.reference_timing.backend, &comparison.reference)?;
            self.write_output(&pair.name, &comparison.candidate_timing.backend, &comparison.candidate)?;
            self.write_output(&pair.name, "diff", &comparison.difference.as_normalized())?;
        }

        Ok(RunSummary {
            mode: ExecutionMode::Validate,
            frames: self.source.len(),
            mismatches,
            backends: vec![reference_totals, candidate_totals],
        })
    }

    fn check_source(&self) -> Result<()> {
        if self.source.is_empty() {
            return Err(DisparityError::EmptyFrameSource("frame source".to_string()));
        }
        Ok(())
    }

    fn write_output(&self, frame: &str, tag: &str, map: &NormalizedMap) -> Result<()> {
        let Some(dir) = self.config.output_dir.as_deref() else {
            return Ok(());
        };
        let path = output_path(dir, frame, tag, self.writer.extension());
        let _span = tracing::debug_span!("write_output", path = %path.display()).entered();

        let mut file = std::fs::File::create(&path).map_err(|e| {
            DisparityError::OutputWriteError(format!("{}: {}", path.display(), e))
        })?;
        self.writer.write_map(map, &mut file, &self.config.output)
    }
}

/// `<dir>/<frame name>_<tag>.<ext>`, with the frame's own extension folded in
/// (`img1.png` becomes `img1_png`) so `img1.png` and `img1.jpg` never share an
/// output file. ':' in the tag is replaced for portability.
pub(crate) fn output_path(dir: &Path, frame: &str, tag: &str, extension: &str) -> PathBuf {
    let frame_path = Path::new(frame);
    let stem = frame_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(frame);
    let stem = match frame_path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}_{ext}"),
        None => stem.to_string(),
    };
    let tag = tag.replace(':', "-");
    dir.join(format!("{stem}_{tag}.{extension}"))
}
