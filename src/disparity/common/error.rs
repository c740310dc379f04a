use std::fmt;

use thiserror::Error;

/// Stage of the accelerator protocol in which a device fault occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevicePhase {
    Init,
    Allocate,
    KernelLoad,
    TransferIn,
    Dispatch,
    TransferOut,
}

impl fmt::Display for DevicePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DevicePhase::Init => "device init",
            DevicePhase::Allocate => "buffer allocation",
            DevicePhase::KernelLoad => "kernel load",
            DevicePhase::TransferIn => "transfer-in",
            DevicePhase::Dispatch => "kernel dispatch",
            DevicePhase::TransferOut => "transfer-out",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum DisparityError {
    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Left/right dimension mismatch: left={left_width}x{left_height}, right={right_width}x{right_height}")]
    DimensionMismatch {
        left_width: usize,
        left_height: usize,
        right_width: usize,
        right_height: usize,
    },

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("No frames found in {0}")]
    EmptyFrameSource(String),

    #[error("Failed to read frame: {0}")]
    FrameReadError(String),

    #[error("Candidate buffer overflow: capacity {capacity}")]
    CandidateOverflow { capacity: usize },

    #[error("[{backend}] {phase} failed: {message}")]
    DeviceError {
        backend: String,
        phase: DevicePhase,
        message: String,
    },

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Failed to write output: {0}")]
    OutputWriteError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl DisparityError {
    pub fn device(backend: impl Into<String>, phase: DevicePhase, message: impl fmt::Display) -> Self {
        DisparityError::DeviceError {
            backend: backend.into(),
            phase,
            message: message.to_string(),
        }
    }

    /// True for faults raised by the device layer rather than by input or
    /// algorithmic checks.
    pub fn is_device_fault(&self) -> bool {
        matches!(self, DisparityError::DeviceError { .. } | DisparityError::BackendUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, DisparityError>;
