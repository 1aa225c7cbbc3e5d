//! Event recording and export.

use crate::partition::AgentPartition;
use crate::result::{RunResult, RunStats};
use crate::runner::RunnerState;
use crate::tracer::{BenchTracer, IterationOutcome};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant};

/// Something that happened during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BenchEvent {
    Initialized {
        benchmark: String,
        partition: AgentPartition,
    },
    Iteration {
        benchmark: String,
        agent_num: usize,
        iteration: usize,
        duration_us: u64,
        outcome: IterationOutcome,
    },
    RunEnd {
        benchmark: String,
        agent_num: usize,
        state: RunnerState,
        measurements: usize,
        error: Option<String>,
    },
}

/// Event with timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimestampedEvent {
    /// Microseconds since the recorder was created.
    pub timestamp_us: u64,
    pub event: BenchEvent,
}

/// Tracer that keeps every event in memory.
pub struct EventRecorder {
    events: Mutex<Vec<TimestampedEvent>>,
    start_time: Instant,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            start_time: Instant::now(),
        }
    }

    /// Get all recorded events.
    pub fn events(&self) -> Vec<TimestampedEvent> {
        self.events.lock().clone()
    }

    /// Events recorded for one agent.
    pub fn events_for_agent(&self, agent_num: usize) -> Vec<TimestampedEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| match &e.event {
                BenchEvent::Initialized { partition, .. } => partition.agent_num == agent_num,
                BenchEvent::Iteration { agent_num: a, .. } | BenchEvent::RunEnd { agent_num: a, .. } => {
                    *a == agent_num
                }
            })
            .cloned()
            .collect()
    }

    /// Take and clear all events.
    pub fn take(&self) -> Vec<TimestampedEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Export events to a JSON file.
    pub fn export_to_file(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(&self.events())?;
        std::fs::write(path, json)
    }

    fn push(&self, event: BenchEvent) {
        let timestamp_us = self.start_time.elapsed().as_micros() as u64;
        self.events.lock().push(TimestampedEvent {
            timestamp_us,
            event,
        });
    }
}

impl Default for EventRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl BenchTracer for EventRecorder {
    fn on_init(&self, benchmark: &str, partition: &AgentPartition) {
        self.push(BenchEvent::Initialized {
            benchmark: benchmark.to_string(),
            partition: partition.clone(),
        });
    }

    fn on_iteration(
        &self,
        benchmark: &str,
        agent_num: usize,
        iteration: usize,
        duration: Duration,
        outcome: &IterationOutcome,
    ) {
        self.push(BenchEvent::Iteration {
            benchmark: benchmark.to_string(),
            agent_num,
            iteration,
            duration_us: duration.as_micros() as u64,
            outcome: outcome.clone(),
        });
    }

    fn on_run_end(&self, benchmark: &str, agent_num: usize, state: RunnerState, result: &RunResult) {
        self.push(BenchEvent::RunEnd {
            benchmark: benchmark.to_string(),
            agent_num,
            state,
            measurements: result.len(),
            error: result.error().map(|e| e.to_string()),
        });
    }
}

/// Complete record of one agent's run, for export.
#[derive(Debug, Serialize, Deserialize)]
pub struct RunRecord {
    pub benchmark: String,
    pub agent_num: usize,
    pub partition: Option<AgentPartition>,
    pub state: RunnerState,
    pub stats: RunStats,
    pub error: Option<String>,
    /// `true` when the run stopped because it was cancelled.
    pub cancelled: bool,
    pub events: Vec<TimestampedEvent>,
    pub metadata: RunMetadata,
}

impl RunRecord {
    pub fn new(
        benchmark: &str,
        partition: Option<AgentPartition>,
        state: RunnerState,
        result: &RunResult,
        events: Vec<TimestampedEvent>,
    ) -> Self {
        Self {
            benchmark: benchmark.to_string(),
            agent_num: partition.as_ref().map_or(0, |p| p.agent_num),
            partition,
            state,
            stats: result.stats(),
            error: result.error().map(|e| e.to_string()),
            cancelled: result.error().is_some_and(|e| e.is_cancelled()),
            events,
            metadata: RunMetadata::new(result.total_duration()),
        }
    }

    /// Export to a JSON file.
    pub fn export_to_file(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }
}

/// Metadata for a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Seconds since the Unix epoch.
    pub timestamp: String,
    pub duration_ms: u64,
    pub platform: String,
}

impl RunMetadata {
    pub fn new(duration: Duration) -> Self {
        Self {
            timestamp: unix_timestamp(),
            duration_ms: duration.as_millis() as u64,
            platform: std::env::consts::OS.to_string(),
        }
    }
}

fn unix_timestamp() -> String {
    use std::time::SystemTime;
    let duration = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}", duration.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::AgentControls;

    #[test]
    fn test_recorder_collects_in_order() {
        let recorder = EventRecorder::new();
        let partition = AgentPartition::new(AgentControls::None, 0..10, 0..10, 0, 1);
        recorder.on_init("query", &partition);
        recorder.on_iteration("query", 1, 0, Duration::from_micros(5), &IterationOutcome::Ok);
        recorder.on_run_end("query", 1, RunnerState::Completed, &RunResult::new());

        let events = recorder.events();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0].event, BenchEvent::Initialized { .. }));
        assert!(matches!(
            events[1].event,
            BenchEvent::Iteration { duration_us: 5, .. }
        ));
        assert!(events.windows(2).all(|w| w[0].timestamp_us <= w[1].timestamp_us));
        assert_eq!(recorder.events_for_agent(1).len(), 3);
        assert!(recorder.events_for_agent(0).is_empty());
    }

    #[test]
    fn test_take_clears() {
        let recorder = EventRecorder::new();
        recorder.on_iteration("q", 0, 0, Duration::ZERO, &IterationOutcome::Ok);
        assert_eq!(recorder.take().len(), 1);
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_run_record_serializes() {
        let mut result = RunResult::new();
        result.add(Duration::from_micros(10), None);
        result.error = Some(crate::BenchError::Cancelled);
        let record = RunRecord::new("import", None, RunnerState::Errored, &result, vec![]);
        assert!(record.cancelled);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["benchmark"], "import");
        assert_eq!(json["stats"]["count"], 1);
        assert_eq!(json["state"], "Errored");
    }
}
