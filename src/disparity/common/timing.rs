use std::time::{Duration, Instant};

use tracing::info;

/// Duration of one named phase.
#[derive(Debug, Clone)]
pub struct StepTiming {
    pub name: String,
    pub duration: Duration,
}

/// Ordered record of the phases of one frame's computation.
#[derive(Debug, Clone, Default)]
pub struct PipelineTimings {
    steps: Vec<StepTiming>,
}

impl PipelineTimings {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn add_step(&mut self, name: impl Into<String>, duration: Duration) {
        self.steps.push(StepTiming {
            name: name.into(),
            duration,
        });
    }

    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(|s| s.duration).sum()
    }

    pub fn steps(&self) -> &[StepTiming] {
        &self.steps
    }

    pub fn log_summary(&self, backend: &str) {
        let total = self.total_duration();
        for step in &self.steps {
            let percentage = if total.as_secs_f64() > 0.0 {
                (step.duration.as_secs_f64() / total.as_secs_f64()) * 100.0
            } else {
                0.0
            };
            info!(
                "[{}] {:<14} {:>10.1}us ({:>5.1}%)",
                backend,
                step.name,
                step.duration.as_secs_f64() * 1e6,
                percentage
            );
        }
        info!("[{}] {:<14} {:>10.1}us", backend, "total", total.as_secs_f64() * 1e6);
    }
}

pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            name: name.into(),
        }
    }

    pub fn stop(self) -> (String, Duration) {
        (self.name, self.start.elapsed())
    }
}
