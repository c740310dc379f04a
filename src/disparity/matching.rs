//! Block matching backends
//!
//! `CpuDisparityEngine` is the sequential reference. `AcceleratorExecutor`
//! runs the same algorithm one work item per pixel on a `Device`, either the
//! CUDA device (when built with nvcc available) or the host work-group device.

pub mod engine;
pub mod cost;
pub mod cpu_engine;
pub mod kernel;
pub mod device;
pub mod host_device;
#[cfg(cuda_device)]
pub mod cuda_device;
pub mod accelerator;


/// Opens the CUDA device with the given ordinal.
#[cfg(cuda_device)]
pub fn open_cuda_device(ordinal: usize) -> crate::disparity::Result<Box<dyn Device>> {
    Ok(Box::new(cuda_device::CudaDevice::new(ordinal)?))
}

/// Opens the CUDA device with the given ordinal.
///
/// This build carries no CUDA kernel, so the request always fails.
#[cfg(not(cuda_device))]
pub fn open_cuda_device(ordinal: usize) -> crate::disparity::Result<Box<dyn Device>> {
    Err(crate::disparity::DisparityError::BackendUnavailable(format!(
        "cuda:{ordinal} requested but nvcc was not found when this binary was built"
    )))
}

#[cfg(cuda_device)]
pub use cuda_device::CudaDevice;
pub use engine::DisparityBackend;
pub use cost::{CostBuffer, window_sad};
pub use cpu_engine::CpuDisparityEngine;
pub use device::{Device, DeviceInfo, KernelArgs, LaunchGeometry};
pub use host_device::HostGridDevice;
pub use accelerator::{AcceleratorConfig, AcceleratorConfigBuilder, AcceleratorExecutor};
