use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use stereo_bm_rs::disparity::{
    AcceleratorConfig, DeviceSelection, DirectoryFrameSource, DisparityParams, ExecutionMode, RunConfig,
    StereoPipeline, pipeline::ModeFlags,
};
use stereo_bm_rs::logger;

use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DeviceKind {
    /// Work-group grid on host threads
    Host,
    /// CUDA device (requires a build with nvcc available)
    Cuda,
}

#[derive(Parser, Debug)]
#[command(
    name = "stereo-bm",
    about = "SAD block-matching disparity with CPU / accelerator cross-validation"
)]
struct Cli {
    /// Directory containing `left/` and `right/` image folders
    path_images: PathBuf,

    /// Exclusive upper bound on the searched disparity
    #[arg(long = "max-d", default_value_t = 16)]
    max_d: u32,

    /// Correlation window size (radius = k / 2)
    #[arg(short = 'k', long = "k", default_value_t = 7)]
    kernel_size: u32,

    /// Run block matching on the accelerator instead of the CPU
    #[arg(long)]
    use_accelerator: bool,

    /// Run both backends on every frame and compare their outputs
    #[arg(long, visible_alias = "accelerator-vs-cpu")]
    validate: bool,

    /// Log device and kernel launch details
    #[arg(long)]
    kernel_info: bool,

    /// Time transfer-in, compute and transfer-out separately
    #[arg(long)]
    use_events: bool,

    /// Accelerator device
    #[arg(long, value_enum)]
    device: Option<DeviceKind>,

    /// CUDA device ordinal
    #[arg(long, default_value_t = 0)]
    cuda_ordinal: usize,

    /// Work-group tile as WxH
    #[arg(long, value_parser = parse_work_group, default_value = "16x16")]
    work_group: (usize, usize),

    /// Write normalized (and difference) maps as TIFF into this directory
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_work_group(value: &str) -> std::result::Result<(usize, usize), String> {
    let (x, y) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got '{value}'"))?;
    let x = x.trim().parse::<usize>().map_err(|e| e.to_string())?;
    let y = y.trim().parse::<usize>().map_err(|e| e.to_string())?;
    if x == 0 || y == 0 {
        return Err("work group dimensions must be positive".to_string());
    }
    Ok((x, y))
}

fn build_config(cli: &Cli) -> RunConfig {
    let resolved = ModeFlags {
        use_accelerator: cli.use_accelerator,
        validate: cli.validate,
        kernel_info: cli.kernel_info,
        use_events: cli.use_events,
    }
    .resolve();
    for warning in &resolved.warnings {
        warn!("{}", warning);
    }

    let params = DisparityParams::builder()
        .max_disparity(cli.max_d)
        .window_size(cli.kernel_size)
        .build();

    let accelerator = AcceleratorConfig::builder()
        .work_group(cli.work_group.0, cli.work_group.1)
        .profile_phases(resolved.profile_phases)
        .kernel_info(resolved.kernel_info)
        .build();

    let device = match cli.device {
        Some(DeviceKind::Host) => DeviceSelection::Host,
        Some(DeviceKind::Cuda) => DeviceSelection::Cuda { ordinal: cli.cuda_ordinal },
        None => DeviceSelection::default(),
    };

    RunConfig::builder()
        .mode(resolved.mode)
        .params(params)
        .accelerator(accelerator)
        .device(device)
        .output_dir(cli.output_dir.clone())
        .build()
}

fn run(cli: &Cli) -> Result<bool> {
    let config = build_config(cli);

    info!("-------- INFO --------");
    info!("> Mode: {}", config.mode);
    info!("> Max Disparity: {}", config.params.max_disparity);
    info!("> Kernel Size: {}", config.params.window_size);
    if config.mode != ExecutionMode::CpuOnly {
        info!("> Device: {:?}", config.device);
    }
    info!("----------------------");

    if let Some(dir) = &config.output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    }

    let source = DirectoryFrameSource::open(&cli.path_images)
        .with_context(|| format!("Failed to open frames in {}", cli.path_images.display()))?;

    let pipeline = StereoPipeline::new(source, config);
    let summary = pipeline
        .run()
        .with_context(|| format!("{} run failed", pipeline.config().mode))?;
    summary.log();

    Ok(summary.all_matched())
}

fn main() -> ExitCode {
    // Usage errors are guidance, not run failures
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
    };

    logger::init(cli.verbose);

    info!("Starting stereo-bm...");

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            error!("Accelerator and CPU outputs differ");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
