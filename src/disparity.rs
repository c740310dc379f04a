//! Stereo block-matching disparity module
//!
//! This module provides a CPU reference implementation of SAD block matching,
//! an accelerator-offloaded implementation of the same algorithm, and a
//! validation harness that checks the two against each other frame by frame.

pub mod common;
pub mod matching;
pub mod normalize;
pub mod validation;
pub mod frames;
pub mod output;
pub mod pipeline;

pub use common::{
    DifferenceMap,
    DisparityError,
    DisparityParams,
    DisparityParamsBuilder,
    DevicePhase,
    FramePair,
    Image,
    NormalizedMap,
    RawDisparityMap,
    Result,
};

pub use matching::{
    AcceleratorConfig,
    AcceleratorConfigBuilder,
    AcceleratorExecutor,
    CpuDisparityEngine,
    Device,
    DeviceInfo,
    DisparityBackend,
    HostGridDevice,
    LaunchGeometry,
};

pub use normalize::{normalize, normalize_value};

pub use validation::{
    FrameComparison,
    PipelineTimings,
    ThroughputReport,
    ThroughputReporter,
    TimingSample,
    ValidationHarness,
    Verdict,
};

pub use frames::{
    DirectoryFrameSource,
    FrameSource,
    InMemoryFrameSource,
    natural_cmp,
};

pub use output::{DisparityWriter, OutputConfig, StandardTiffWriter, TiffCompression};

pub use pipeline::{DeviceSelection, ExecutionMode, RunConfig, RunSummary, StereoPipeline};
