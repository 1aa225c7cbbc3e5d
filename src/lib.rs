#![doc = include_str!("../README.md")]

mod cancel;
mod client;
pub mod config;
mod error;
pub mod generator;
mod partition;
pub mod query;
mod recorder;
mod result;
mod runner;
mod tracer;

pub use cancel::Cancellation;
pub use client::{Connector, EchoClient, ImportRequest, Importer, QueryClient, StaticConnector};
pub use config::{BasicQueryConfig, BenchConfig, ImportConfig, QueryConfig, RandomQueryConfig};
pub use error::BenchError;
pub use generator::{generate_import_csv, ImportRow, ImportSpec, QueryGenerator};
pub use partition::{AgentControls, AgentPartition};
pub use query::{ArgValue, QueryTree};
pub use recorder::{BenchEvent, EventRecorder, RunMetadata, RunRecord, TimestampedEvent};
pub use result::{Measurement, RunResult, RunStats};
pub use runner::{
    run_agents, AgentOutcome, BasicQueryBenchmark, Benchmark, ImportBenchmark, QueryBenchmark,
    RandomQueryBenchmark, RunnerState,
};
pub use tracer::{BenchTracer, IterationOutcome, NoopTracer};
