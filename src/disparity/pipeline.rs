//! Run orchestration
//!
//! Resolves the execution mode from the requested flags, builds the backends
//! once per run and drives them over the frame source in order.

mod types;
mod stereo_pipeline;


pub use types::{DeviceSelection, ExecutionMode, ModeFlags, ResolvedMode, RunConfig, RunConfigBuilder};
pub use stereo_pipeline::{BackendTotals, RunSummary, StereoPipeline};
