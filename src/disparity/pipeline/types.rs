//! Run configuration types

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::disparity::common::DisparityParams;
use crate::disparity::matching::AcceleratorConfig;
use crate::disparity::output::OutputConfig;
use crate::disparity::validation::REPORT_THRESHOLD;

/// Which backends a run drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// CPU reference engine only
    CpuOnly,
    /// Accelerator executor only
    AcceleratorOnly,
    /// Both backends on every frame, outputs compared
    Validate,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::CpuOnly => f.write_str("cpu"),
            ExecutionMode::AcceleratorOnly => f.write_str("accelerator"),
            ExecutionMode::Validate => f.write_str("accelerator vs cpu"),
        }
    }
}

/// Device the accelerator executor runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceSelection {
    /// Work-group grid executed on host threads
    Host,
    /// CUDA device with the given ordinal
    Cuda { ordinal: usize },
}

impl Default for DeviceSelection {
    fn default() -> Self {
        if cfg!(cuda_device) {
            DeviceSelection::Cuda { ordinal: 0 }
        } else {
            DeviceSelection::Host
        }
    }
}

/// Mode flags as requested on the command line, before reconciliation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModeFlags {
    pub use_accelerator: bool,
    pub validate: bool,
    pub kernel_info: bool,
    pub use_events: bool,
}

/// Reconciled mode plus the warnings produced while reconciling.
#[derive(Debug, Clone)]
pub struct ResolvedMode {
    pub mode: ExecutionMode,
    pub profile_phases: bool,
    pub kernel_info: bool,
    pub warnings: Vec<String>,
}

impl ModeFlags {
    /// Validation implies phase profiling and wins over `use_accelerator`;
    /// accelerator-only toggles are dropped when no accelerator runs.
    pub fn resolve(self) -> ResolvedMode {
        let mut warnings = Vec::new();
        let mut use_accelerator = self.use_accelerator;
        let mut use_events = self.use_events;
        let mut kernel_info = self.kernel_info;

        if self.validate {
            use_events = true;
            if use_accelerator {
                use_accelerator = false;
                warnings.push(
                    "Validation already runs the accelerator, --use-accelerator is redundant".to_string(),
                );
            }
        }

        let accelerated = use_accelerator || self.validate;
        if (kernel_info || use_events) && !accelerated {
            warnings.push(
                "--kernel-info and --use-events need the accelerator (--use-accelerator), executing on the CPU"
                    .to_string(),
            );
            kernel_info = false;
            use_events = false;
        }

        let mode = if self.validate {
            ExecutionMode::Validate
        } else if use_accelerator {
            ExecutionMode::AcceleratorOnly
        } else {
            ExecutionMode::CpuOnly
        };

        ResolvedMode {
            mode,
            profile_phases: use_events,
            kernel_info,
            warnings,
        }
    }
}

/// Configuration for a whole run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub mode: ExecutionMode,
    pub params: DisparityParams,
    pub accelerator: AcceleratorConfig,
    pub device: DeviceSelection,
    /// Directory for normalized / difference maps; nothing is written when unset
    pub output_dir: Option<PathBuf>,
    pub output: OutputConfig,
    /// Accumulated time between throughput reports
    pub report_threshold: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::CpuOnly,
            params: DisparityParams::default(),
            accelerator: AcceleratorConfig::default(),
            device: DeviceSelection::default(),
            output_dir: None,
            output: OutputConfig::default(),
            report_threshold: REPORT_THRESHOLD,
        }
    }
}

impl RunConfig {
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder::default()
    }
}

/// Builder for RunConfig
#[derive(Default)]
pub struct RunConfigBuilder {
    mode: Option<ExecutionMode>,
    params: Option<DisparityParams>,
    accelerator: Option<AcceleratorConfig>,
    device: Option<DeviceSelection>,
    output_dir: Option<Option<PathBuf>>,
    output: Option<OutputConfig>,
    report_threshold: Option<Duration>,
}

impl RunConfigBuilder {
    pub fn mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn params(mut self, params: DisparityParams) -> Self {
        self.params = Some(params);
        self
    }

    pub fn accelerator(mut self, accelerator: AcceleratorConfig) -> Self {
        self.accelerator = Some(accelerator);
        self
    }

    pub fn device(mut self, device: DeviceSelection) -> Self {
        self.device = Some(device);
        self
    }

    pub fn output_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.output_dir = Some(dir);
        self
    }

    pub fn output(mut self, output: OutputConfig) -> Self {
        self.output = Some(output);
        self
    }

    pub fn report_threshold(mut self, threshold: Duration) -> Self {
        self.report_threshold = Some(threshold);
        self
    }

    pub fn build(self) -> RunConfig {
        let default = RunConfig::default();
        RunConfig {
            mode: self.mode.unwrap_or(default.mode),
            params: self.params.unwrap_or(default.params),
            accelerator: self.accelerator.unwrap_or(default.accelerator),
            device: self.device.unwrap_or(default.device),
            output_dir: self.output_dir.unwrap_or(default.output_dir),
            output: self.output.unwrap_or(default.output),
            report_threshold: self.report_threshold.unwrap_or(default.report_threshold),
        }
    }
}
