//! Runs one fixed query repeatedly.

use super::{timed, Benchmark, RunnerState, Session};
use crate::cancel::Cancellation;
use crate::client::{Connector, QueryClient};
use crate::config::QueryConfig;
use crate::error::BenchError;
use crate::partition::{AgentControls, AgentPartition};
use crate::result::RunResult;
use crate::tracer::BenchTracer;
use std::sync::Arc;

/// Submits `config.query` to `config.index` for each iteration, keeping the
/// store's responses.
pub struct QueryBenchmark {
    config: QueryConfig,
    session: Session<dyn QueryClient>,
}

impl QueryBenchmark {
    pub const NAME: &'static str = "query";

    pub fn new(config: QueryConfig, connector: Arc<dyn Connector<dyn QueryClient>>) -> Self {
        Self {
            config,
            session: Session::new(connector),
        }
    }

    pub fn with_tracer(mut self, tracer: Arc<dyn BenchTracer>) -> Self {
        self.session.set_tracer(tracer);
        self
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }
}

impl Benchmark for QueryBenchmark {
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
        let partition = AgentPartition::new(AgentControls::None, 0..0, 0..0, 0, agent_num);
        self.session.finish_init(Self::NAME, partition);
        Ok(())
    }

    fn run(&mut self, cancel: &Cancellation) -> RunResult {
        let QueryConfig {
            query,
            index,
            iterations,
        } = &self.config;
        self.session
            .run(Self::NAME, *iterations, cancel, |client, n| {
                let (duration, outcome) = timed(n, || client.execute_query(index, query));
                (duration, outcome.map(Some))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    struct Recording {
        queries: Mutex<Vec<String>>,
    }

    impl QueryClient for Recording {
        fn execute_query(&self, index: &str, query: &str) -> anyhow::Result<serde_json::Value> {
            self.queries.lock().push(format!("{}:{}", index, query));
            Ok(serde_json::json!({"results": [1]}))
        }
    }

    #[test]
    fn test_runs_fixed_query() {
        let client = Arc::new(Recording {
            queries: Mutex::new(Vec::new()),
        });
        let connector: Arc<dyn Connector<dyn QueryClient>> =
            Arc::new(crate::client::StaticConnector(client.clone() as Arc<dyn QueryClient>));
        let mut bench = QueryBenchmark::new(
            QueryConfig::new("Count(Bitmap(rowID=1))").with_iterations(3),
            connector,
        );

        bench.init(&["localhost:10101".to_string()], 0).unwrap();
        let result = bench.run(&Cancellation::new());

        assert!(result.is_success());
        assert_eq!(result.len(), 3);
        assert_eq!(
            result.measurements[0].response,
            Some(serde_json::json!({"results": [1]}))
        );
        assert_eq!(client.queries.lock()[2], "benchindex:Count(Bitmap(rowID=1))");
        assert_eq!(bench.state(), RunnerState::Completed);
    }
}
