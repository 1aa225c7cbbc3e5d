//! Tracer trait for observing benchmark runs.
//!
//! Runners report initialization, every iteration, and the end of a run to a
//! [`BenchTracer`]. The default [`NoopTracer`] ignores everything;
//! [`EventRecorder`](crate::EventRecorder) keeps timestamped events for
//! export.
//!
//! # Example
//!
//! ```
//! use bitmap_bench::{BenchTracer, IterationOutcome};
//! use std::time::Duration;
//!
//! struct PrintTracer;
//!
//! impl BenchTracer for PrintTracer {
//!     fn on_iteration(
//!         &self,
//!         benchmark: &str,
//!         agent_num: usize,
//!         iteration: usize,
//!         duration: Duration,
//!         outcome: &IterationOutcome,
//!     ) {
//!         println!("{}[{}] #{} {:?} {:?}", benchmark, agent_num, iteration, duration, outcome);
//!     }
//! }
//! ```

use crate::partition::AgentPartition;
use crate::result::RunResult;
use crate::runner::RunnerState;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How a single iteration ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IterationOutcome {
    Ok,
    Error { message: String },
}

/// Observer of benchmark runs.
///
/// All methods have empty default implementations. Implementations must be
/// `Send + Sync` since agents run concurrently and share a tracer.
pub trait BenchTracer: Send + Sync + 'static {
    /// Called when a runner finishes `init`.
    #[inline]
    fn on_init(&self, _benchmark: &str, _partition: &AgentPartition) {}

    /// Called after each submission, successful or not.
    #[inline]
    fn on_iteration(
        &self,
        _benchmark: &str,
        _agent_num: usize,
        _iteration: usize,
        _duration: Duration,
        _outcome: &IterationOutcome,
    ) {
    }

    /// Called once when a run stops, with its final state.
    #[inline]
    fn on_run_end(
        &self,
        _benchmark: &str,
        _agent_num: usize,
        _state: RunnerState,
        _result: &RunResult,
    ) {
    }
}

/// Tracer that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

impl BenchTracer for NoopTracer {}
