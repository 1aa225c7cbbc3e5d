//! Runs an n-ary operation over bitmaps with increasing row ids.

use super::{timed, Benchmark, RunnerState, Session};
use crate::cancel::Cancellation;
use crate::client::{Connector, QueryClient};
use crate::config::BasicQueryConfig;
use crate::error::BenchError;
use crate::partition::{AgentControls, AgentPartition};
use crate::query::QueryTree;
use crate::result::RunResult;
use crate::tracer::BenchTracer;
use std::sync::Arc;
use std::time::Duration;

/// Submits `Op(Bitmap(frame, rowID=r), ...)` with `num_args` children, where
/// iteration `n` uses `r = base_row_id + n`.
///
/// Each agent starts `iterations` rows after the previous one, so agents
/// never query the same rows. The query tree is built once per run and only
/// the children's `rowID` arguments are overwritten between iterations.
pub struct BasicQueryBenchmark {
    config: BasicQueryConfig,
    session: Session<dyn QueryClient>,
}

impl BasicQueryBenchmark {
    pub const NAME: &'static str = "basic-query";

    pub fn new(config: BasicQueryConfig, connector: Arc<dyn Connector<dyn QueryClient>>) -> Self {
        Self {
            config,
            session: Session::new(connector),
        }
    }

    pub fn with_tracer(mut self, tracer: Arc<dyn BenchTracer>) -> Self {
        self.session.set_tracer(tracer);
        self
    }

    /// First row id this agent queries; `None` before `init`.
    pub fn base_row_id(&self) -> Option<i64> {
        self.session.partition().map(|p| p.bitmap_ids.start)
    }

    fn template(&self) -> QueryTree {
        let bitmaps = (0..self.config.num_args)
            .map(|_| QueryTree::new("Bitmap").with_arg("frame", self.config.frame.as_str()))
            .collect();
        QueryTree::new(self.config.query.as_str()).with_children(bitmaps)
    }
}

impl Benchmark for BasicQueryBenchmark {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn state(&self) -> RunnerState {
        self.session.state()
    }

    fn partition(&self) -> Option<&AgentPartition> {
        self.session.partition()
    }

    fn init(&mut self, hosts: &[String], agent_num: usize) -> Result<(), BenchError> {
        self.session.connect(hosts, "")?;
        let base = self.config.base_row_id;
        let iterations = i64::try_from(self.config.iterations).unwrap_or(i64::MAX);
        let rows = base..base.saturating_add(iterations);
        // Shifting by one height per agent moves the base by agent_num * iterations.
        let partition = AgentPartition::new(AgentControls::Height, rows, 0..0, 0, agent_num);
        self.session.finish_init(Self::NAME, partition);
        Ok(())
    }

    fn run(&mut self, cancel: &Cancellation) -> RunResult {
        let mut query = self.template();
        let base = self.base_row_id().unwrap_or(self.config.base_row_id);
        let index = &self.config.index;

        self.session
            .run(Self::NAME, self.config.iterations, cancel, |client, n| {
                let Some(row_id) = i64::try_from(n).ok().and_then(|n| base.checked_add(n)) else {
                    let message = format!("rowID overflows past {} at iteration {}", base, n);
                    return (Duration::ZERO, Err(BenchError::configuration(message)));
                };
                for bitmap in query.children_mut() {
                    bitmap.set_arg("rowID", row_id);
                }
                let text = query.to_string();
                let (duration, outcome) = timed(n, || client.execute_query(index, &text));
                (duration, outcome.map(|_| None))
            })
    }
}
