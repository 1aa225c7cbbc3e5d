//! Generates and bulk-imports synthetic datasets.

use super::{timed, Benchmark, RunnerState, Session};
use crate::cancel::Cancellation;
use crate::client::{Connector, ImportRequest, Importer};
use crate::config::ImportConfig;
use crate::error::BenchError;
use crate::generator::{generate_import_csv, ImportSpec};
use crate::partition::AgentPartition;
use crate::result::RunResult;
use crate::tracer::BenchTracer;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Writes the agent's dataset to CSV files and hands them to an [`Importer`].
///
/// The agent's bitmap range is split into `iterations` contiguous chunks and
/// each iteration imports one chunk. Chunk `i` is generated with seed
/// `partition.seed + i`, so a single iteration produces exactly the dataset
/// [`generate_import_csv`] would for the whole partition.
///
/// Only the import call is timed; generating the file is not. Files live in
/// a temporary directory that is removed with the runner.
pub struct ImportBenchmark {
    config: ImportConfig,
    session: Session<dyn Importer>,
    dir: Option<TempDir>,
    num_bits: usize,
}

impl ImportBenchmark {
    pub const NAME: &'static str = "import";

    pub fn new(config: ImportConfig, connector: Arc<dyn Connector<dyn Importer>>) -> Self {
        Self {
            config,
            session: Session::new(connector),
            dir: None,
            num_bits: 0,
        }
    }

    pub fn with_tracer(mut self, tracer: Arc<dyn BenchTracer>) -> Self {
        self.session.set_tracer(tracer);
        self
    }

    /// Total rows successfully imported by the last run.
    pub fn num_bits(&self) -> usize {
        self.num_bits
    }

    /// The generation parameters for chunk `chunk` of `partition`.
    fn chunk_spec(&self, partition: &AgentPartition, chunk: usize) -> ImportSpec {
        let ids = &partition.bitmap_ids;
        let len = (i128::from(ids.end) - i128::from(ids.start)).max(0) as u128;
        let chunks = self.config.iterations.max(1) as u128;
        // floor(len * i / chunks), split so the product cannot overflow.
        let bound = |i: u128| {
            let offset = len / chunks * i + len % chunks * i / chunks;
            (i128::from(ids.start) + offset as i128) as i64
        };

        ImportSpec {
            base_bitmap_id: bound(chunk as u128),
            max_bitmap_id: bound(chunk as u128 + 1),
            base_profile_id: partition.profile_ids.start,
            max_profile_id: partition.profile_ids.end,
            min_bits_per_map: self.config.min_bits_per_map,
            max_bits_per_map: self.config.max_bits_per_map,
            seed: partition.seed.wrapping_add(chunk as i64),
            random_order: self.config.random_bitmap_order,
        }
    }
}

impl Benchmark for ImportBenchmark {
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
        self.dir = None;
        let controls = self.session.connect(hosts, &self.config.agent_controls)?;
        let mut builder = tempfile::Builder::new();
        builder.prefix("bitbench-import");
        let dir = match &self.config.temp_dir {
            Some(parent) => builder.tempdir_in(parent),
            None => builder.tempdir(),
        }
        .map_err(|err| BenchError::configuration(format!("cannot create temp dir: {}", err)))?;

        let partition = AgentPartition::new(
            controls,
            self.config.base_bitmap_id..self.config.max_bitmap_id,
            self.config.base_profile_id..self.config.max_profile_id,
            self.config.seed,
            agent_num,
        );
        self.dir = Some(dir);
        self.session.finish_init(Self::NAME, partition);
        Ok(())
    }

    fn run(&mut self, cancel: &Cancellation) -> RunResult {
        self.num_bits = 0;
        let (Some(partition), Some(dir), Some(host)) = (
            self.session.partition().cloned(),
            self.dir.as_ref().map(|d| d.path().to_path_buf()),
            self.session.host().map(str::to_string),
        ) else {
            return RunResult::with_error(BenchError::configuration(
                "import benchmark run before init",
            ));
        };
        let specs: Vec<ImportSpec> = (0..self.config.iterations)
            .map(|i| self.chunk_spec(&partition, i))
            .collect();
        let config = &self.config;
        let num_bits = &mut self.num_bits;

        self.session
            .run(Self::NAME, config.iterations, cancel, |importer, n| {
                let path = dir.join(format!("agent-{}-chunk-{}.csv", partition.agent_num, n));
                let rows = match write_chunk(&path, &specs[n]) {
                    Ok(rows) => rows,
                    Err(err) => return (Duration::ZERO, Err(err)),
                };

                let request = ImportRequest {
                    host: host.clone(),
                    index: config.index.clone(),
                    frame: config.frame.clone(),
                    paths: vec![path],
                    buffer_size: config.buffer_size,
                };
                let (duration, outcome) = timed(n, || importer.import(&request));
                if outcome.is_ok() {
                    *num_bits += rows;
                }
                let response = serde_json::json!({ "numbits": rows, "index": config.index });
                (duration, outcome.map(|()| Some(response)))
            })
    }
}

fn write_chunk(path: &Path, spec: &ImportSpec) -> Result<usize, BenchError> {
    let file = File::create(path)?;
    Ok(generate_import_csv(file, spec)?)
}
