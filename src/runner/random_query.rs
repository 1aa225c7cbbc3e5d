//! Runs randomly generated queries.

use super::{timed, Benchmark, RunnerState, Session};
use crate::cancel::Cancellation;
use crate::client::{Connector, QueryClient};
use crate::config::RandomQueryConfig;
use crate::error::BenchError;
use crate::generator::QueryGenerator;
use crate::partition::AgentPartition;
use crate::result::RunResult;
use crate::tracer::BenchTracer;
use std::sync::Arc;

/// Submits a freshly generated query per iteration.
///
/// The generator is seeded from the agent's partition, so agents with the
/// same configuration still produce different query streams. Under `height`
/// controls each agent also draws row ids from its own slice.
pub struct RandomQueryBenchmark {
    config: RandomQueryConfig,
    session: Session<dyn QueryClient>,
    generator: Option<QueryGenerator>,
}

impl RandomQueryBenchmark {
    pub const NAME: &'static str = "random-query";

    pub fn new(config: RandomQueryConfig, connector: Arc<dyn Connector<dyn QueryClient>>) -> Self {
        Self {
            config,
            session: Session::new(connector),
            generator: None,
        }
    }

    pub fn with_tracer(mut self, tracer: Arc<dyn BenchTracer>) -> Self {
        self.session.set_tracer(tracer);
        self
    }
}

impl Benchmark for RandomQueryBenchmark {
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
        self.generator = None;
        let controls = self.session.connect(hosts, &self.config.agent_controls)?;
        let partition = AgentPartition::new(
            controls,
            self.config.base_bitmap_id..self.config.max_bitmap_id,
            0..0,
            self.config.seed,
            agent_num,
        );

        let generator = QueryGenerator::new(partition.seed).with_frames(self.config.frames.clone());
        let frames = generator.frames().to_vec();
        let generator = generator
            .with_id_to_frame(move |id| frames[(id % frames.len() as u64) as usize].clone());

        self.generator = Some(generator);
        self.session.finish_init(Self::NAME, partition);
        Ok(())
    }

    fn run(&mut self, cancel: &Cancellation) -> RunResult {
        let Some(generator) = self.generator.as_mut() else {
            return RunResult::with_error(BenchError::configuration(
                "random-query benchmark run before init",
            ));
        };
        let (id_min, id_max) = match self.session.partition() {
            Some(p) => (p.bitmap_ids.start.max(0) as u64, p.bitmap_ids.end.max(0) as u64),
            None => (0, 0),
        };
        let RandomQueryConfig {
            iterations,
            max_depth,
            max_args,
            max_n,
            index,
            ..
        } = &self.config;

        self.session.run(Self::NAME, *iterations, cancel, |client, n| {
            let query = generator
                .random(*max_n, *max_depth, *max_args, id_min, id_max)
                .to_string();
            let (duration, outcome) = timed(n, || client.execute_query(index, &query));
            (duration, outcome.map(Some))
        })
    }
}
