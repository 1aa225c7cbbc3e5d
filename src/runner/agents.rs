//! Running several agents of the same benchmark at once.

use super::{Benchmark, RunnerState};
use crate::cancel::Cancellation;
use crate::partition::AgentPartition;
use crate::result::RunResult;

/// What one agent's runner ended with.
#[derive(Debug)]
pub struct AgentOutcome {
    pub agent_num: usize,
    pub benchmark: String,
    pub state: RunnerState,
    /// `None` when `init` failed.
    pub partition: Option<AgentPartition>,
    pub result: RunResult,
}

/// Build a runner per agent with `factory`, init it against `hosts` and run
/// it. Returns one outcome per agent, in agent order.
///
/// With the `parallel` feature each agent gets its own thread. A failing
/// agent does not stop the others; only `cancel` does. An `init` failure is
/// reported as the outcome's error with no measurements.
pub fn run_agents<B, F>(
    agents: usize,
    hosts: &[String],
    cancel: &Cancellation,
    factory: F,
) -> Vec<AgentOutcome>
where
    B: Benchmark,
    F: Fn(usize) -> B + Sync,
{
    #[cfg(feature = "parallel")]
    {
        if agents > 1 {
            if let Some(outcomes) = run_concurrent(agents, hosts, cancel, &factory) {
                return outcomes;
            }
        }
    }
    (0..agents)
        .map(|agent_num| run_agent(agent_num, hosts, cancel, &factory))
        .collect()
}

fn run_agent<B, F>(
    agent_num: usize,
    hosts: &[String],
    cancel: &Cancellation,
    factory: &F,
) -> AgentOutcome
where
    B: Benchmark,
    F: Fn(usize) -> B,
{
    let mut bench = factory(agent_num);
    let result = match bench.init(hosts, agent_num) {
        Ok(()) => bench.run(cancel),
        Err(err) => RunResult::with_error(err),
    };
    AgentOutcome {
        agent_num,
        benchmark: bench.name().to_string(),
        state: bench.state(),
        partition: bench.partition().cloned(),
        result,
    }
}

/// Returns `None` if the thread pool cannot be built.
#[cfg(feature = "parallel")]
fn run_concurrent<B, F>(
    agents: usize,
    hosts: &[String],
    cancel: &Cancellation,
    factory: &F,
) -> Option<Vec<AgentOutcome>>
where
    B: Benchmark,
    F: Fn(usize) -> B + Sync,
{
    use parking_lot::Mutex;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(agents)
        .thread_name(|i| format!("bitbench-agent-{}", i))
        .build()
        .ok()?;

    let slots: Vec<Mutex<Option<AgentOutcome>>> = (0..agents).map(|_| Mutex::new(None)).collect();
    pool.scope(|s| {
        for (agent_num, slot) in slots.iter().enumerate() {
            s.spawn(move |_| {
                *slot.lock() = Some(run_agent(agent_num, hosts, cancel, factory));
            });
        }
    });

    slots.into_iter().map(|slot| slot.into_inner()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{EchoClient, QueryClient, StaticConnector};
    use crate::config::BasicQueryConfig;
    use crate::runner::BasicQueryBenchmark;
    use std::sync::Arc;

    #[test]
    fn test_outcomes_in_agent_order() {
        let client: Arc<dyn QueryClient> = Arc::new(EchoClient::discard());
        let outcomes = run_agents(4, &["h".to_string()], &Cancellation::new(), |_| {
            BasicQueryBenchmark::new(
                BasicQueryConfig::default().with_iterations(5),
                Arc::new(StaticConnector(client.clone())),
            )
        });

        assert_eq!(outcomes.len(), 4);
        for (i, outcome) in outcomes.iter().enumerate() {
            assert_eq!(outcome.agent_num, i);
            assert_eq!(outcome.benchmark, "basic-query");
            assert_eq!(outcome.state, RunnerState::Completed);
            assert_eq!(outcome.result.len(), 5);
            assert_eq!(outcome.partition.as_ref().unwrap().bitmap_ids.start, 5 * i as i64);
        }
    }

    #[test]
    fn test_init_failure_reported_per_agent() {
        let client: Arc<dyn QueryClient> = Arc::new(EchoClient::discard());
        let outcomes = run_agents(2, &[], &Cancellation::new(), |_| {
            BasicQueryBenchmark::new(
                BasicQueryConfig::default(),
                Arc::new(StaticConnector(client.clone())),
            )
        });
        for outcome in outcomes {
            assert!(outcome.result.error().unwrap().is_configuration());
            assert!(outcome.partition.is_none());
            assert_eq!(outcome.state, RunnerState::Uninitialized);
        }
    }
}
