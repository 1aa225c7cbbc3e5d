//! Benchmark runners.
//!
//! Every runner follows the same lifecycle:
//!
//! ```text
//! Uninitialized --init--> Initialized --run--> Running --+--> Completed
//!                                                        +--> Errored
//! ```
//!
//! `init` validates hosts, connects, and derives the agent's partition.
//! `run` executes the iterations strictly one after another, timing each
//! submission, and stops at the first failure or cancellation.

mod agents;
mod basic_query;
mod import;
mod query;
mod random_query;

pub use agents::{run_agents, AgentOutcome};
pub use basic_query::BasicQueryBenchmark;
pub use import::ImportBenchmark;
pub use query::QueryBenchmark;
pub use random_query::RandomQueryBenchmark;

use crate::cancel::Cancellation;
use crate::client::Connector;
use crate::error::BenchError;
use crate::partition::{AgentControls, AgentPartition};
use crate::result::RunResult;
use crate::tracer::{BenchTracer, IterationOutcome, NoopTracer};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Lifecycle state of a runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunnerState {
    Uninitialized,
    Initialized,
    Running,
    Completed,
    /// A submission failed or the run was cancelled.
    Errored,
}

/// A benchmark that can be initialized for an agent and run.
pub trait Benchmark: Send {
    fn name(&self) -> &str;

    fn state(&self) -> RunnerState;

    /// The partition derived by the last successful `init`.
    fn partition(&self) -> Option<&AgentPartition>;

    /// Connect to `hosts` and derive this agent's partition.
    ///
    /// Fails with [`BenchError::Configuration`] on an empty host list, an
    /// unreachable store, or an unknown agent-controls mode. May be called
    /// again after a run to start over.
    fn init(&mut self, hosts: &[String], agent_num: usize) -> Result<(), BenchError>;

    /// Run every iteration, stopping at the first failure or when `cancel`
    /// fires between iterations.
    fn run(&mut self, cancel: &Cancellation) -> RunResult;
}

/// Outcome of one iteration's step: how long the submission took and what it
/// returned.
pub(crate) type Step = (Duration, Result<Option<serde_json::Value>, BenchError>);

/// Time a single submission to a collaborator.
pub(crate) fn timed<T>(
    iteration: usize,
    submit: impl FnOnce() -> anyhow::Result<T>,
) -> (Duration, Result<T, BenchError>) {
    let start = Instant::now();
    let outcome = submit();
    let duration = start.elapsed();
    (
        duration,
        outcome.map_err(|err| BenchError::submission(iteration, err)),
    )
}

/// Client connection, lifecycle state and tracing shared by all runners.
pub(crate) struct Session<C: ?Sized> {
    connector: Arc<dyn Connector<C>>,
    client: Option<Arc<C>>,
    host: Option<String>,
    tracer: Arc<dyn BenchTracer>,
    state: RunnerState,
    partition: Option<AgentPartition>,
}

impl<C: ?Sized> Session<C> {
    pub(crate) fn new(connector: Arc<dyn Connector<C>>) -> Self {
        Self {
            connector,
            client: None,
            host: None,
            tracer: Arc::new(NoopTracer),
            state: RunnerState::Uninitialized,
            partition: None,
        }
    }

    pub(crate) fn set_tracer(&mut self, tracer: Arc<dyn BenchTracer>) {
        self.tracer = tracer;
    }

    pub(crate) fn state(&self) -> RunnerState {
        self.state
    }

    pub(crate) fn partition(&self) -> Option<&AgentPartition> {
        self.partition.as_ref()
    }

    /// The first configured host, once connected.
    pub(crate) fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Validate hosts and the agent-controls mode, then connect.
    ///
    /// Leaves the session `Uninitialized` until [`finish_init`] is called.
    ///
    /// [`finish_init`]: Session::finish_init
    pub(crate) fn connect(
        &mut self,
        hosts: &[String],
        agent_controls: &str,
    ) -> Result<AgentControls, BenchError> {
        self.state = RunnerState::Uninitialized;
        self.client = None;
        self.partition = None;

        let Some(first) = hosts.first() else {
            return Err(BenchError::configuration("need at least one host"));
        };
        let controls = agent_controls.parse::<AgentControls>()?;
        let client = self.connector.connect(hosts).map_err(|err| {
            BenchError::configuration(format!("cannot connect to {:?}: {:#}", hosts, err))
        })?;

        self.client = Some(client);
        self.host = Some(first.clone());
        Ok(controls)
    }

    pub(crate) fn finish_init(&mut self, benchmark: &str, partition: AgentPartition) {
        self.tracer.on_init(benchmark, &partition);
        self.partition = Some(partition);
        self.state = RunnerState::Initialized;
    }

    /// Drive `iterations` steps sequentially.
    ///
    /// Cancellation is checked before each iteration. A failed step is
    /// recorded as the result's error, not as a measurement; if the signal
    /// fired while that step was in flight the error is reported as
    /// [`BenchError::Cancelled`] instead.
    pub(crate) fn run<F>(
        &mut self,
        benchmark: &str,
        iterations: usize,
        cancel: &Cancellation,
        mut step: F,
    ) -> RunResult
    where
        F: FnMut(&C, usize) -> Step,
    {
        let client = match (&self.client, self.state) {
            (Some(client), RunnerState::Initialized) => client.clone(),
            (_, state) => {
                return RunResult::with_error(BenchError::configuration(format!(
                    "{} benchmark cannot run from state {:?}",
                    benchmark, state
                )))
            }
        };
        let agent_num = self.partition.as_ref().map_or(0, |p| p.agent_num);

        self.state = RunnerState::Running;
        let mut result = RunResult::new();

        for n in 0..iterations {
            if cancel.is_cancelled() {
                result.error = Some(BenchError::Cancelled);
                break;
            }

            let (duration, outcome) = step(&*client, n);
            match outcome {
                Ok(response) => {
                    self.tracer
                        .on_iteration(benchmark, agent_num, n, duration, &IterationOutcome::Ok);
                    result.add(duration, response);
                }
                Err(err) => {
                    let err = if cancel.is_cancelled() {
                        BenchError::Cancelled
                    } else {
                        err
                    };
                    let outcome = IterationOutcome::Error {
                        message: err.to_string(),
                    };
                    self.tracer
                        .on_iteration(benchmark, agent_num, n, duration, &outcome);
                    result.error = Some(err);
                    break;
                }
            }
        }

        self.state = if result.error.is_some() {
            RunnerState::Errored
        } else {
            RunnerState::Completed
        };
        self.tracer
            .on_run_end(benchmark, agent_num, self.state, &result);
        result
    }
}
