use std::sync::Arc;

use cudarc::driver::sys::CUdevice_attribute;
use cudarc::driver::{CudaContext, CudaFunction, CudaSlice, CudaStream, LaunchConfig, PushKernelArg};
use cudarc::nvrtc::Ptx;
use tracing::{debug, info};

use crate::disparity::common::{DevicePhase, DisparityError, Result};
use crate::disparity::matching::device::{Device, DeviceInfo, KernelArgs, LaunchGeometry};
use crate::disparity::matching::kernel::KERNEL_NAME;

const BACKEND: &str = "cuda";

/// Threads-per-block limit of every CUDA architecture since Fermi.
const DEFAULT_MAX_THREADS_PER_BLOCK: usize = 1024;

fn fault(phase: DevicePhase, err: impl std::fmt::Display) -> DisparityError {
    DisparityError::device(BACKEND, phase, err)
}

/// CUDA device context: owns the stream, the loaded kernel and the device
/// buffers for the current image size.
pub struct CudaDevice {
    ctx: Arc<CudaContext>,
    stream: Arc<CudaStream>,
    kernel: CudaFunction,
    ordinal: usize,
    d_left: Option<CudaSlice<u8>>,
    d_right: Option<CudaSlice<u8>>,
    d_disparity: Option<CudaSlice<u32>>,
}

impl CudaDevice {
    /// Initialize the CUDA context and load the block matching kernel
    pub fn new(ordinal: usize) -> Result<Self> {
        // Compiled by build.rs
        let ptx = include_str!(concat!(env!("OUT_DIR"), "/block_matching.ptx"));

        info!("Initializing CUDA device {}", ordinal);
        let ctx = CudaContext::new(ordinal).map_err(|e| fault(DevicePhase::Init, e))?;
        let stream = ctx.default_stream();
        let module = ctx
            .load_module(Ptx::from_src(ptx))
            .map_err(|e| fault(DevicePhase::KernelLoad, e))?;
        let kernel = module
            .load_function(KERNEL_NAME)
            .map_err(|e| fault(DevicePhase::KernelLoad, e))?;

        Ok(Self {
            ctx,
            stream,
            kernel,
            ordinal,
            d_left: None,
            d_right: None,
            d_disparity: None,
        })
    }

    fn sync(&self, phase: DevicePhase) -> Result<()> {
        self.stream.synchronize().map_err(|e| fault(phase, e))
    }
}

impl Device for CudaDevice {
    fn info(&self) -> DeviceInfo {
        let name = self
            .ctx
            .name()
            .unwrap_or_else(|_| format!("cuda:{}", self.ordinal));
        let max_work_group = self
            .ctx
            .attribute(CUdevice_attribute::CU_DEVICE_ATTRIBUTE_MAX_THREADS_PER_BLOCK)
            .ok()
            .and_then(|v| usize::try_from(v).ok())
            .unwrap_or(DEFAULT_MAX_THREADS_PER_BLOCK);
        let compute_units = self
            .ctx
            .attribute(CUdevice_attribute::CU_DEVICE_ATTRIBUTE_MULTIPROCESSOR_COUNT)
            .ok()
            .and_then(|v| usize::try_from(v).ok())
            .unwrap_or(1);
        DeviceInfo {
            name,
            backend: BACKEND,
            compute_units,
            max_work_group,
            kernel_name: KERNEL_NAME,
        }
    }

    fn prepare(&mut self, width: usize, height: usize) -> Result<()> {
        let len = width * height;
        debug!("Allocating CUDA buffers for {}x{}", width, height);
        self.d_left = Some(
            self.stream
                .alloc_zeros::<u8>(len)
                .map_err(|e| fault(DevicePhase::Allocate, e))?,
        );
        self.d_right = Some(
            self.stream
                .alloc_zeros::<u8>(len)
                .map_err(|e| fault(DevicePhase::Allocate, e))?,
        );
        self.d_disparity = Some(
            self.stream
                .alloc_zeros::<u32>(len)
                .map_err(|e| fault(DevicePhase::Allocate, e))?,
        );
        Ok(())
    }

    fn transfer_in(&mut self, left: &[u8], right: &[u8]) -> Result<()> {
        let (Some(d_left), Some(d_right)) = (self.d_left.as_mut(), self.d_right.as_mut()) else {
            return Err(fault(DevicePhase::TransferIn, "buffers not allocated"));
        };
        self.stream
            .memcpy_htod(left, d_left)
            .map_err(|e| fault(DevicePhase::TransferIn, e))?;
        self.stream
            .memcpy_htod(right, d_right)
            .map_err(|e| fault(DevicePhase::TransferIn, e))?;
        self.sync(DevicePhase::TransferIn)
    }

    fn run_kernel(&mut self, geometry: &LaunchGeometry, args: &KernelArgs) -> Result<()> {
        let (Some(d_left), Some(d_right), Some(d_disparity)) =
            (self.d_left.as_ref(), self.d_right.as_ref(), self.d_disparity.as_mut())
        else {
            return Err(fault(DevicePhase::Dispatch, "buffers not allocated"));
        };

        let to_i32 = |name: &str, value: usize| {
            i32::try_from(value)
                .map_err(|_| fault(DevicePhase::Dispatch, format!("{name} {value} does not fit a kernel int")))
        };
        let width = to_i32("width", args.width)?;
        let height = to_i32("height", args.height)?;
        let max_disparity = to_i32("max_disparity", args.max_disparity as usize)?;
        let radius = to_i32("radius", args.radius)?;

        let (groups_x, groups_y) = geometry.groups();
        let cfg = LaunchConfig {
            grid_dim: (groups_x as u32, groups_y as u32, 1),
            block_dim: (geometry.work_group.0 as u32, geometry.work_group.1 as u32, 1),
            shared_mem_bytes: 0,
        };

        {
            let mut launch_args = self.stream.launch_builder(&self.kernel);
            launch_args.arg(d_left);
            launch_args.arg(d_right);
            launch_args.arg(d_disparity);
            launch_args.arg(&width);
            launch_args.arg(&height);
            launch_args.arg(&max_disparity);
            launch_args.arg(&radius);

            // Kernel bounds-checks every work item against width/height
            unsafe { launch_args.launch(cfg) }.map_err(|e| fault(DevicePhase::Dispatch, e))?;
        }
        self.sync(DevicePhase::Dispatch)
    }

    fn transfer_out(&mut self, out: &mut [u32]) -> Result<()> {
        let Some(d_disparity) = self.d_disparity.as_ref() else {
            return Err(fault(DevicePhase::TransferOut, "buffers not allocated"));
        };
        self.stream
            .memcpy_dtoh(d_disparity, out)
            .map_err(|e| fault(DevicePhase::TransferOut, e))?;
        self.sync(DevicePhase::TransferOut)
    }
}
