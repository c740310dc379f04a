//! Common types, errors and timing utilities shared across the disparity module.

pub mod error;
pub mod timing;
pub mod types;

pub use error::{DevicePhase, DisparityError, Result};
pub use timing::{PipelineTimings, StepTiming, Timer};
pub use types::{
    DifferenceMap,
    DisparityParams,
    DisparityParamsBuilder,
    FramePair,
    Image,
    NormalizedMap,
    RawDisparityMap,
    MAX_DISPARITY_LIMIT,
    MAX_WINDOW_SIZE,
};
