use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::disparity::common::{
    DisparityError, DisparityParams, FramePair, Image, NormalizedMap, PipelineTimings, RawDisparityMap, Result,
};
use crate::disparity::matching::{
    AcceleratorConfig, AcceleratorExecutor, CpuDisparityEngine, DisparityBackend, HostGridDevice,
};
use crate::disparity::validation::{
    ThroughputReporter, TimingSample, ValidationHarness, Verdict, compare_normalized, timed_compute,
};

struct MockBackend {
    label: &'static str,
    params: DisparityParams,
    map: Option<RawDisparityMap>,
    phases: Option<PipelineTimings>,
    calls: usize,
}

impl MockBackend {
    fn returning(label: &'static str, map: RawDisparityMap) -> Self {
        Self {
            label,
            params: DisparityParams::default(),
            map: Some(map),
            phases: None,
            calls: 0,
        }
    }

    fn failing(label: &'static str) -> Self {
        Self {
            label,
            params: DisparityParams::default(),
            map: None,
            phases: None,
            calls: 0,
        }
    }
}

impl DisparityBackend for MockBackend {
    fn label(&self) -> &str {
        self.label
    }

    fn params(&self) -> &DisparityParams {
        &self.params
    }

    fn compute(&mut self, _left: &Image, _right: &Image) -> Result<RawDisparityMap> {
        self.calls += 1;
        self.map
            .clone()
            .ok_or_else(|| DisparityError::device(self.label, crate::disparity::DevicePhase::Dispatch, "mock failure"))
    }

    fn phase_timings(&self) -> Option<&PipelineTimings> {
        self.phases.as_ref()
    }
}

fn pair(width: usize, height: usize) -> FramePair {
    FramePair::new("frame0.png", Image::filled(width, height, 0), Image::filled(width, height, 0))
}

fn gray(width: usize, height: usize, data: Vec<u8>) -> NormalizedMap {
    NormalizedMap { width, height, data }
}

#[test]
fn test_compare_normalized_ssd() {
    let a = gray(3, 1, vec![0, 10, 255]);
    let b = gray(3, 1, vec![0, 13, 250]);

    let (diff, ssd) = compare_normalized(&a, &b).unwrap();
    assert_eq!(diff.data, vec![0, 3, 5]);
    assert_eq!(ssd, 9 + 25);
    assert_eq!(diff.differing_pixels(), 2);
}

#[test]
fn test_compare_normalized_dimension_mismatch() {
    let a = gray(2, 2, vec![0; 4]);
    let b = gray(4, 1, vec![0; 4]);
    assert!(matches!(
        compare_normalized(&a, &b),
        Err(DisparityError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_verdict() {
    assert_eq!(Verdict::from_ssd(0), Verdict::Match);
    assert_eq!(Verdict::from_ssd(1), Verdict::Mismatch);
    assert_eq!(Verdict::Match.to_string(), "OK - MATCH");
    assert_eq!(Verdict::Mismatch.to_string(), "ERROR - MISMATCH");
}

#[test]
fn test_harness_identical_outputs_match() {
    let map = RawDisparityMap::from_buffer(2, 2, vec![0, 1, 3, 2]);
    let mut harness = ValidationHarness::new(
        MockBackend::returning("reference", map.clone()),
        MockBackend::returning("candidate", map),
    );

    let comparison = harness.compare_frame(&pair(2, 2)).unwrap();
    assert_eq!(comparison.verdict, Verdict::Match);
    assert_eq!(comparison.ssd, 0);
    assert_eq!(comparison.reference, comparison.candidate);
    assert_eq!(comparison.reference.data, vec![0, 85, 255, 170]);
    assert_eq!(comparison.reference_timing.backend, "reference");
    assert_eq!(comparison.candidate_timing.backend, "candidate");
    assert_eq!(comparison.frame, "frame0.png");
}

#[test]
fn test_harness_scales_each_backend_by_its_own_max() {
    let reference = RawDisparityMap::from_buffer(3, 1, vec![0, 1, 2]);
    let candidate = RawDisparityMap::from_buffer(3, 1, vec![0, 2, 4]);
    let mut harness = ValidationHarness::new(
        MockBackend::returning("reference", reference),
        MockBackend::returning("candidate", candidate),
    );

    let comparison = harness.compare_frame(&pair(3, 1)).unwrap();
    assert_eq!(comparison.reference.data, vec![0, 127, 255]);
    assert_eq!(comparison.candidate.data, vec![0, 127, 255]);
    assert_eq!(comparison.verdict, Verdict::Match);
}

#[test]
fn test_harness_detects_mismatch() {
    let reference = RawDisparityMap::from_buffer(2, 1, vec![1, 2]);
    let candidate = RawDisparityMap::from_buffer(2, 1, vec![2, 2]);
    let mut harness = ValidationHarness::new(
        MockBackend::returning("reference", reference),
        MockBackend::returning("candidate", candidate),
    );

    let comparison = harness.compare_frame(&pair(2, 1)).unwrap();
    // 127 vs 255
    assert_eq!(comparison.difference.data, vec![128, 0]);
    assert_eq!(comparison.ssd, 128 * 128);
    assert_eq!(comparison.verdict, Verdict::Mismatch);
}

#[test]
fn test_harness_all_zero_frames() {
    let zero = RawDisparityMap::zeroed(4, 4);
    let mut harness = ValidationHarness::new(
        MockBackend::returning("reference", zero.clone()),
        MockBackend::returning("candidate", zero),
    );

    let comparison = harness.compare_frame(&pair(4, 4)).unwrap();
    assert!(comparison.reference.data.iter().all(|&v| v == 0));
    assert_eq!(comparison.verdict, Verdict::Match);
}

#[test]
fn test_harness_propagates_backend_failure() {
    let mut harness = ValidationHarness::new(
        MockBackend::returning("reference", RawDisparityMap::zeroed(2, 2)),
        MockBackend::failing("candidate"),
    );

    let err = harness.compare_frame(&pair(2, 2)).unwrap_err();
    assert!(err.is_device_fault());
}

#[test]
fn test_harness_rejects_mismatched_pair_before_computing() {
    let mut harness = ValidationHarness::new(
        MockBackend::returning("reference", RawDisparityMap::zeroed(2, 2)),
        MockBackend::returning("candidate", RawDisparityMap::zeroed(2, 2)),
    );
    let bad = FramePair::new("bad", Image::filled(2, 2, 0), Image::filled(3, 2, 0));

    assert!(matches!(
        harness.compare_frame(&bad),
        Err(DisparityError::DimensionMismatch { .. })
    ));
    assert_eq!(harness.reference().calls, 0);
    assert_eq!(harness.candidate().calls, 0);
}

#[test]
fn test_harness_emits_reports_per_backend() {
    let map = RawDisparityMap::zeroed(2, 2);
    let mut harness = ValidationHarness::with_report_threshold(
        MockBackend::returning("reference", map.clone()),
        MockBackend::returning("candidate", map),
        Duration::ZERO,
    );

    let comparison = harness.compare_frame(&pair(2, 2)).unwrap();
    let backends: Vec<&str> = comparison.reports.iter().map(|r| r.backend.as_str()).collect();
    assert_eq!(backends, ["candidate", "reference"]);
}

#[test]
fn test_harness_cpu_vs_host_accelerator() {
    let mut rng = SmallRng::seed_from_u64(42);
    let (width, height) = (40, 30);
    let left: Vec<u8> = (0..width * height).map(|_| rng.random()).collect();
    let right: Vec<u8> = (0..width * height).map(|_| rng.random()).collect();
    let frame = FramePair::new(
        "img1.png",
        Image::new(width, height, left).unwrap(),
        Image::new(width, height, right).unwrap(),
    );

    let params = DisparityParams::builder().max_disparity(16).window_size(5).build();
    let engine = CpuDisparityEngine::new(params).unwrap();
    let executor = AcceleratorExecutor::new(
        Box::new(HostGridDevice::new()),
        params,
        AcceleratorConfig::builder().profile_phases(true).build(),
    )
    .unwrap();
    let mut harness = ValidationHarness::new(engine, executor);

    let comparison = harness.compare_frame(&frame).unwrap();
    assert_eq!(comparison.ssd, 0);
    assert_eq!(comparison.verdict, Verdict::Match);
    assert_eq!(comparison.difference.differing_pixels(), 0);
    assert_eq!(comparison.candidate_timing.backend, "accelerator:host-grid");
}

#[test]
fn test_timed_compute_prefers_phase_timings() {
    let mut phases = PipelineTimings::new();
    phases.add_step("transfer_in", Duration::from_millis(1));
    phases.add_step("compute", Duration::from_millis(2));
    phases.add_step("transfer_out", Duration::from_millis(3));

    let mut backend = MockBackend::returning("mock", RawDisparityMap::zeroed(1, 1));
    backend.phases = Some(phases);

    let img = Image::filled(1, 1, 0);
    let (_, sample) = timed_compute(&mut backend, &img, &img).unwrap();
    assert_eq!(sample.elapsed, Duration::from_millis(6));
    assert_eq!(sample.backend, "mock");
}

#[test]
fn test_timing_sample_fps() {
    let sample = TimingSample::new("cpu", Duration::from_millis(250));
    assert!((sample.fps() - 4.0).abs() < 1e-9);
    assert_eq!(TimingSample::new("cpu", Duration::ZERO).fps(), 0.0);
}

#[test]
fn test_throughput_reporter_threshold_and_reset() {
    let mut reporter = ThroughputReporter::new(Duration::from_millis(500));
    let sample = TimingSample::new("cpu", Duration::from_millis(200));

    assert!(reporter.record(&sample).is_none());
    assert!(reporter.record(&sample).is_none());
    assert_eq!(reporter.accumulated(), Duration::from_millis(400));

    let report = reporter.record(&sample).unwrap();
    assert_eq!(report.frames, 3);
    assert_eq!(report.accumulated, Duration::from_millis(600));
    assert_eq!(report.last, Duration::from_millis(200));
    assert!((report.fps() - 5.0).abs() < 1e-9);
    assert_eq!(reporter.accumulated(), Duration::ZERO);

    assert!(reporter.record(&sample).is_none());
}

#[test]
fn test_throughput_reporter_exact_threshold() {
    let mut reporter = ThroughputReporter::new(Duration::from_millis(500));
    let report = reporter
        .record(&TimingSample::new("accelerator:host-grid", Duration::from_millis(500)))
        .unwrap();
    assert_eq!(report.frames, 1);
}
