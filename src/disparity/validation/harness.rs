use std::fmt;
use std::time::Duration;

use tracing::{debug, info, instrument};

use crate::disparity::common::{
    DifferenceMap, DisparityError, FramePair, NormalizedMap, Result,
};
use crate::disparity::matching::DisparityBackend;
use crate::disparity::normalize::normalize;
use crate::disparity::validation::throughput::{
    REPORT_THRESHOLD, ThroughputReport, ThroughputReporter, TimingSample, timed_compute,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Match,
    Mismatch,
}

impl Verdict {
    pub fn from_ssd(ssd: u64) -> Self {
        if ssd == 0 { Verdict::Match } else { Verdict::Mismatch }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Verdict::Match)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Match => f.write_str("OK - MATCH"),
            Verdict::Mismatch => f.write_str("ERROR - MISMATCH"),
        }
    }
}

/// Outcome of running both backends on one frame pair.
#[derive(Debug, Clone)]
pub struct FrameComparison {
    pub frame: String,
    /// Reference output, scaled against the reference's own maximum
    pub reference: NormalizedMap,
    /// Candidate output, scaled against the candidate's own maximum
    pub candidate: NormalizedMap,
    pub difference: DifferenceMap,
    /// Sum of squared differences over the whole frame
    pub ssd: u64,
    pub verdict: Verdict,
    pub reference_timing: TimingSample,
    pub candidate_timing: TimingSample,
    /// Throughput reports that became due with this frame
    pub reports: Vec<ThroughputReport>,
}

/// Per-pixel absolute difference and SSD of two normalized maps.
pub fn compare_normalized(a: &NormalizedMap, b: &NormalizedMap) -> Result<(DifferenceMap, u64)> {
    if (a.width, a.height) != (b.width, b.height) || a.data.len() != b.data.len() {
        return Err(DisparityError::DimensionMismatch {
            left_width: a.width,
            left_height: a.height,
            right_width: b.width,
            right_height: b.height,
        });
    }

    let mut ssd = 0u64;
    let data = a
        .data
        .iter()
        .zip(&b.data)
        .map(|(&x, &y)| {
            let diff = x.abs_diff(y);
            ssd += diff as u64 * diff as u64;
            diff
        })
        .collect();

    Ok((
        DifferenceMap {
            width: a.width,
            height: a.height,
            data,
        },
        ssd,
    ))
}

/// Runs a reference and a candidate backend over the same frames and checks
/// that their normalized outputs agree bit for bit.
pub struct ValidationHarness<R: DisparityBackend, C: DisparityBackend> {
    reference: R,
    candidate: C,
    reference_throughput: ThroughputReporter,
    candidate_throughput: ThroughputReporter,
}

impl<R: DisparityBackend, C: DisparityBackend> ValidationHarness<R, C> {
    pub fn new(reference: R, candidate: C) -> Self {
        Self::with_report_threshold(reference, candidate, REPORT_THRESHOLD)
    }

    pub fn with_report_threshold(reference: R, candidate: C, threshold: Duration) -> Self {
        Self {
            reference,
            candidate,
            reference_throughput: ThroughputReporter::new(threshold),
            candidate_throughput: ThroughputReporter::new(threshold),
        }
    }

    pub fn reference(&self) -> &R {
        &self.reference
    }

    pub fn candidate(&self) -> &C {
        &self.candidate
    }

    #[instrument(skip(self, pair), fields(frame = %pair.name))]
    pub fn compare_frame(&mut self, pair: &FramePair) -> Result<FrameComparison> {
        pair.validate()?;

        let (candidate_raw, candidate_timing) = {
            let _span = tracing::info_span!("candidate").entered();
            timed_compute(&mut self.candidate, &pair.left, &pair.right)?
        };
        let (reference_raw, reference_timing) = {
            let _span = tracing::info_span!("reference").entered();
            timed_compute(&mut self.reference, &pair.left, &pair.right)?
        };

        // Each backend is scaled against its own maximum
        let candidate = normalize(&candidate_raw, candidate_raw.observed_max);
        let reference = normalize(&reference_raw, reference_raw.observed_max);

        let (difference, ssd) = compare_normalized(&candidate, &reference)?;
        let verdict = Verdict::from_ssd(ssd);

        debug!(
            "max disparity: {}={}, {}={}",
            reference_timing.backend,
            reference_raw.observed_max,
            candidate_timing.backend,
            candidate_raw.observed_max
        );
        info!("{}", candidate_timing);
        info!("{}", reference_timing);
        info!("SSD Difference:= {} [{}]", ssd, verdict);

        let reports = [
            self.candidate_throughput.record(&candidate_timing),
            self.reference_throughput.record(&reference_timing),
        ]
        .into_iter()
        .flatten()
        .collect();

        Ok(FrameComparison {
            frame: pair.name.clone(),
            reference,
            candidate,
            difference,
            ssd,
            verdict,
            reference_timing,
            candidate_timing,
            reports,
        })
    }
}
