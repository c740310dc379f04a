use tracing::{debug, info};

use crate::disparity::common::{
    DisparityError, DisparityParams, Image, PipelineTimings, RawDisparityMap, Result, Timer, types::validate_pair,
};
use crate::disparity::matching::device::{Device, KernelArgs, LaunchGeometry};
use crate::disparity::matching::engine::DisparityBackend;

/// Default work-group tile, 16x16 work items.
pub const DEFAULT_WORK_GROUP: (usize, usize) = (16, 16);

/// Configuration for the accelerator executor
#[derive(Debug, Clone)]
pub struct AcceleratorConfig {
    /// Work-group tile (x, y)
    pub work_group: (usize, usize),
    /// Record transfer-in / compute / transfer-out durations per frame
    pub profile_phases: bool,
    /// Log device and launch geometry details
    pub kernel_info: bool,
}

impl Default for AcceleratorConfig {
    fn default() -> Self {
        Self {
            work_group: DEFAULT_WORK_GROUP,
            profile_phases: false,
            kernel_info: false,
        }
    }
}

impl AcceleratorConfig {
    pub fn builder() -> AcceleratorConfigBuilder {
        AcceleratorConfigBuilder::default()
    }
}

/// Builder for AcceleratorConfig
#[derive(Default)]
pub struct AcceleratorConfigBuilder {
    work_group: Option<(usize, usize)>,
    profile_phases: Option<bool>,
    kernel_info: Option<bool>,
}

impl AcceleratorConfigBuilder {
    pub fn work_group(mut self, x: usize, y: usize) -> Self {
        self.work_group = Some((x, y));
        self
    }

    pub fn profile_phases(mut self, enable: bool) -> Self {
        self.profile_phases = Some(enable);
        self
    }

    pub fn kernel_info(mut self, enable: bool) -> Self {
        self.kernel_info = Some(enable);
        self
    }

    pub fn build(self) -> AcceleratorConfig {
        let default = AcceleratorConfig::default();
        AcceleratorConfig {
            work_group: self.work_group.unwrap_or(default.work_group),
            profile_phases: self.profile_phases.unwrap_or(default.profile_phases),
            kernel_info: self.kernel_info.unwrap_or(default.kernel_info),
        }
    }
}

/// Runs block matching on a `Device`, one work item per output pixel.
///
/// The executor owns the device for the whole run. Each `compute` stages both
/// images, dispatches the kernel and reads the result back, blocking on every
/// phase; frames never overlap.
pub struct AcceleratorExecutor {
    device: Box<dyn Device>,
    params: DisparityParams,
    config: AcceleratorConfig,
    label: String,
    prepared: Option<(usize, usize)>,
    timings: Option<PipelineTimings>,
}

impl AcceleratorExecutor {
    pub fn new(device: Box<dyn Device>, params: DisparityParams, config: AcceleratorConfig) -> Result<Self> {
        params.validate()?;
        // Rejects empty work groups before any frame is staged
        LaunchGeometry::for_image(1, 1, config.work_group)?;

        let info = device.info();
        let (gx, gy) = config.work_group;
        if gx.saturating_mul(gy) > info.max_work_group {
            return Err(DisparityError::InvalidParameters(format!(
                "work group {gx}x{gy} exceeds the {} work items {} allows per group",
                info.max_work_group, info.backend
            )));
        }
        let label = format!("accelerator:{}", info.backend);
        if config.kernel_info {
            info!("Device: {}", info);
            info!(
                "Kernel '{}': max_disparity={}, window={}x{} (radius {}), work group {}x{}",
                info.kernel_name,
                params.max_disparity,
                params.window_side(),
                params.window_side(),
                params.window_radius(),
                config.work_group.0,
                config.work_group.1
            );
        }

        Ok(Self {
            device,
            params,
            config,
            label,
            prepared: None,
            timings: None,
        })
    }

    pub fn config(&self) -> &AcceleratorConfig {
        &self.config
    }

    fn ensure_prepared(&mut self, width: usize, height: usize) -> Result<()> {
        if self.prepared == Some((width, height)) {
            return Ok(());
        }
        self.device.prepare(width, height)?;
        self.prepared = Some((width, height));
        Ok(())
    }
}

impl DisparityBackend for AcceleratorExecutor {
    fn label(&self) -> &str {
        &self.label
    }

    fn params(&self) -> &DisparityParams {
        &self.params
    }

    fn compute(&mut self, left: &Image, right: &Image) -> Result<RawDisparityMap> {
        validate_pair(left, right)?;
        let (width, height) = left.dimensions();
        self.ensure_prepared(width, height)?;

        let geometry = LaunchGeometry::for_image(width, height, self.config.work_group)?;
        let args = KernelArgs {
            width,
            height,
            max_disparity: self.params.max_disparity,
            radius: self.params.window_radius(),
        };
        if self.config.kernel_info {
            let (gx, gy) = geometry.groups();
            debug!(
                "Launch: global {}x{}, {} x {} work groups",
                geometry.global.0, geometry.global.1, gx, gy
            );
        }

        let mut timings = PipelineTimings::new();
        let mut output = vec![0u32; width * height];

        let timer = Timer::start("transfer_in");
        self.device.transfer_in(&left.data, &right.data)?;
        let (name, duration) = timer.stop();
        timings.add_step(name, duration);

        let timer = Timer::start("compute");
        self.device.run_kernel(&geometry, &args)?;
        let (name, duration) = timer.stop();
        timings.add_step(name, duration);

        let timer = Timer::start("transfer_out");
        self.device.transfer_out(&mut output)?;
        let (name, duration) = timer.stop();
        timings.add_step(name, duration);

        if self.config.profile_phases {
            timings.log_summary(&self.label);
            self.timings = Some(timings);
        } else {
            self.timings = None;
        }

        let map = RawDisparityMap::from_buffer(width, height, output);
        debug!(
            "{} block matching {}x{} done, max disparity {}",
            self.label, width, height, map.observed_max
        );
        Ok(map)
    }

    fn phase_timings(&self) -> Option<&PipelineTimings> {
        self.timings.as_ref()
    }
}
