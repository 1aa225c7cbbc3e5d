//! Per-run measurements and latency statistics.

use crate::error::BenchError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing of one successful submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub duration: Duration,
    /// The collaborator's response, when the runner keeps it.
    pub response: Option<serde_json::Value>,
}

/// Result of a benchmark run.
///
/// Measurements are appended in iteration order. A populated `error` means
/// the run stopped early; everything measured before that is kept.
#[derive(Debug, Clone, Default)]
pub struct RunResult {
    pub measurements: Vec<Measurement>,
    pub error: Option<BenchError>,
}

impl RunResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_error(error: BenchError) -> Self {
        Self {
            measurements: Vec::new(),
            error: Some(error),
        }
    }

    pub fn add(&mut self, duration: Duration, response: Option<serde_json::Value>) {
        self.measurements.push(Measurement { duration, response });
    }

    /// Check if the run completed every iteration.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn error(&self) -> Option<&BenchError> {
        self.error.as_ref()
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    pub fn total_duration(&self) -> Duration {
        self.measurements.iter().map(|m| m.duration).sum()
    }

    /// Compute latency statistics over the recorded measurements.
    pub fn stats(&self) -> RunStats {
        RunStats::from_durations(self.measurements.iter().map(|m| m.duration))
    }
}

/// Summary latency statistics for a run, in microseconds.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub count: u64,
    pub total_us: u64,
    pub min_us: u64,
    pub max_us: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
}

impl RunStats {
    pub fn from_durations(durations: impl IntoIterator<Item = Duration>) -> Self {
        let mut micros: Vec<u64> = durations
            .into_iter()
            .map(|d| d.as_micros() as u64)
            .collect();
        if micros.is_empty() {
            return RunStats::default();
        }
        micros.sort_unstable();

        let count = micros.len() as u64;
        let total_us: u64 = micros.iter().sum();
        RunStats {
            count,
            total_us,
            min_us: micros[0],
            max_us: micros[micros.len() - 1],
            mean_us: total_us / count,
            p50_us: percentile(&micros, 50),
            p95_us: percentile(&micros, 95),
            p99_us: percentile(&micros, 99),
        }
    }
}

/// Nearest-rank percentile of a sorted, non-empty slice.
fn percentile(sorted: &[u64], pct: usize) -> u64 {
    let rank = (pct * sorted.len()).div_ceil(100).max(1);
    sorted[rank - 1]
}
