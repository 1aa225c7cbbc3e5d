//! Command-line driver for the workload generators and runners.

use bitmap_bench::{
    run_agents, AgentOutcome, AgentControls, AgentPartition, BasicQueryBenchmark, BenchConfig,
    BenchTracer, Cancellation, Connector, EchoClient, EventRecorder, ImportBenchmark, ImportSpec,
    Importer, IterationOutcome, QueryBenchmark, QueryClient, QueryGenerator, RandomQueryBenchmark,
    RunRecord, RunResult, RunnerState, StaticConnector,
};
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "bitbench")]
#[command(about = "Generate and run synthetic workloads for bitmap-index stores")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a generated import dataset as CSV
    ImportCsv(ImportCsvArgs),
    /// Print randomly generated queries, one per line
    RandomQuery(RandomQueryArgs),
    /// Run a benchmark described by a JSON config against the dry-run client
    Run(RunArgs),
}

#[derive(Args, Debug)]
struct ImportCsvArgs {
    #[arg(long, default_value_t = 0)]
    base_bitmap_id: i64,

    #[arg(long, default_value_t = 1000)]
    max_bitmap_id: i64,

    #[arg(long, default_value_t = 0)]
    base_profile_id: i64,

    #[arg(long, default_value_t = 1000)]
    max_profile_id: i64,

    #[arg(long, default_value_t = 0)]
    min_bits_per_map: i64,

    #[arg(long, default_value_t = 10)]
    max_bits_per_map: i64,

    /// Leave rows unsorted by bitmap id and profile id
    #[arg(long)]
    random_bitmap_order: bool,

    #[arg(long, default_value_t = 0)]
    seed: i64,

    /// height, width, or empty
    #[arg(long, default_value = "")]
    agent_controls: String,

    /// Agent whose slice of the dataset to generate
    #[arg(long, default_value_t = 0)]
    agent_num: usize,

    /// Output file (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RandomQueryArgs {
    #[arg(short = 'n', long, default_value_t = 10)]
    count: usize,

    #[arg(short, long, default_value_t = 1)]
    seed: i64,

    #[arg(long, default_value_t = 4)]
    depth: usize,

    #[arg(long, default_value_t = 4)]
    max_args: usize,

    #[arg(long, default_value_t = 100)]
    max_n: u64,

    #[arg(long, default_value_t = 0)]
    id_min: u64,

    #[arg(long, default_value_t = 100_000)]
    id_max: u64,

    /// Comma-separated frames
    #[arg(long, value_delimiter = ',', default_value = "fbench")]
    frames: Vec<String>,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Benchmark config, e.g. {"type": "basic-query", "iterations": 10}
    config: PathBuf,

    /// Number of concurrent agents
    #[arg(short, long, default_value_t = 1)]
    agents: usize,

    /// Comma-separated host list handed to each runner
    #[arg(long, value_delimiter = ',', default_value = "localhost:10101")]
    hosts: Vec<String>,

    /// Output directory for run records
    #[arg(short, long, default_value = "./tmp/bench_results")]
    output_dir: PathBuf,

    /// Cancel the run after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Print each submission to stdout
    #[arg(long)]
    echo: bool,

    /// Print every iteration to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let outcome = match cli.command {
        Command::ImportCsv(args) => import_csv(&args),
        Command::RandomQuery(args) => random_query(&args),
        Command::Run(args) => run(&args),
    };
    if let Err(e) = outcome {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn import_csv(args: &ImportCsvArgs) -> anyhow::Result<()> {
    let controls: AgentControls = args.agent_controls.parse()?;
    let partition = AgentPartition::new(
        controls,
        args.base_bitmap_id..args.max_bitmap_id,
        args.base_profile_id..args.max_profile_id,
        args.seed,
        args.agent_num,
    );
    let spec = ImportSpec {
        base_bitmap_id: partition.bitmap_ids.start,
        max_bitmap_id: partition.bitmap_ids.end,
        base_profile_id: partition.profile_ids.start,
        max_profile_id: partition.profile_ids.end,
        min_bits_per_map: args.min_bits_per_map,
        max_bits_per_map: args.max_bits_per_map,
        seed: partition.seed,
        random_order: args.random_bitmap_order,
    };

    let rows = match &args.output {
        Some(path) => bitmap_bench::generate_import_csv(std::fs::File::create(path)?, &spec)?,
        None => bitmap_bench::generate_import_csv(std::io::stdout().lock(), &spec)?,
    };
    eprintln!("wrote {} rows", rows);
    Ok(())
}

fn random_query(args: &RandomQueryArgs) -> anyhow::Result<()> {
    let mut generator = QueryGenerator::new(args.seed).with_frames(args.frames.clone());
    let frames = generator.frames().to_vec();
    generator =
        generator.with_id_to_frame(move |id| frames[(id % frames.len() as u64) as usize].clone());

    let mut out = std::io::stdout().lock();
    for _ in 0..args.count {
        let query = generator.random(args.max_n, args.depth, args.max_args, args.id_min, args.id_max);
        writeln!(out, "{}", query)?;
    }
    Ok(())
}

/// Forwards to an [`EventRecorder`] and prints each event to stderr.
struct StderrTracer {
    recorder: Arc<EventRecorder>,
}

impl BenchTracer for StderrTracer {
    fn on_init(&self, benchmark: &str, partition: &AgentPartition) {
        eprintln!(
            "{}[{}] init bitmaps={:?} profiles={:?} seed={}",
            benchmark, partition.agent_num, partition.bitmap_ids, partition.profile_ids, partition.seed
        );
        self.recorder.on_init(benchmark, partition);
    }

    fn on_iteration(
        &self,
        benchmark: &str,
        agent_num: usize,
        iteration: usize,
        duration: Duration,
        outcome: &IterationOutcome,
    ) {
        match outcome {
            IterationOutcome::Ok => {
                eprintln!("{}[{}] #{} {:?}", benchmark, agent_num, iteration, duration)
            }
            IterationOutcome::Error { message } => {
                eprintln!("{}[{}] #{} failed: {}", benchmark, agent_num, iteration, message)
            }
        }
        self.recorder
            .on_iteration(benchmark, agent_num, iteration, duration, outcome);
    }

    fn on_run_end(&self, benchmark: &str, agent_num: usize, state: RunnerState, result: &RunResult) {
        eprintln!(
            "{}[{}] {:?} after {} iterations",
            benchmark,
            agent_num,
            state,
            result.len()
        );
        self.recorder.on_run_end(benchmark, agent_num, state, result);
    }
}

fn run(args: &RunArgs) -> anyhow::Result<()> {
    let config = BenchConfig::from_file(&args.config)?;
    std::fs::create_dir_all(&args.output_dir)?;

    let recorder = Arc::new(EventRecorder::new());
    let tracer: Arc<dyn BenchTracer> = if args.verbose {
        Arc::new(StderrTracer {
            recorder: recorder.clone(),
        }) as Arc<dyn BenchTracer>
    } else {
        recorder.clone() as Arc<dyn BenchTracer>
    };
    let echo = Arc::new(if args.echo {
        EchoClient::new(std::io::stdout())
    } else {
        EchoClient::discard()
    });
    let queries: Arc<dyn Connector<dyn QueryClient>> =
        Arc::new(StaticConnector(echo.clone() as Arc<dyn QueryClient>));
    let importer: Arc<dyn Connector<dyn Importer>> =
        Arc::new(StaticConnector(echo as Arc<dyn Importer>));
    let cancel = match args.timeout_secs {
        Some(secs) => Cancellation::with_timeout(Duration::from_secs(secs)),
        None => Cancellation::new(),
    };

    println!("Running {} with {} agent(s)", config.name(), args.agents);
    let outcomes = match &config {
        BenchConfig::Import(c) => run_agents(args.agents, &args.hosts, &cancel, |_| {
            ImportBenchmark::new(c.clone(), importer.clone()).with_tracer(tracer.clone())
        }),
        BenchConfig::Query(c) => run_agents(args.agents, &args.hosts, &cancel, |_| {
            QueryBenchmark::new(c.clone(), queries.clone()).with_tracer(tracer.clone())
        }),
        BenchConfig::BasicQuery(c) => run_agents(args.agents, &args.hosts, &cancel, |_| {
            BasicQueryBenchmark::new(c.clone(), queries.clone()).with_tracer(tracer.clone())
        }),
        BenchConfig::RandomQuery(c) => run_agents(args.agents, &args.hosts, &cancel, |_| {
            RandomQueryBenchmark::new(c.clone(), queries.clone()).with_tracer(tracer.clone())
        }),
    };

    let mut failed = false;
    for outcome in outcomes {
        failed |= outcome
            .result
            .error()
            .is_some_and(|e| !e.is_cancelled());
        write_record(&args.output_dir, &recorder, outcome);
    }
    anyhow::ensure!(!failed, "one or more agents failed");
    Ok(())
}

fn write_record(output_dir: &Path, recorder: &EventRecorder, outcome: AgentOutcome) {
    let events = recorder.events_for_agent(outcome.agent_num);
    let mut record = RunRecord::new(
        &outcome.benchmark,
        outcome.partition,
        outcome.state,
        &outcome.result,
        events,
    );
    record.agent_num = outcome.agent_num;

    let status = match outcome.result.error() {
        None => "OK".to_string(),
        Some(e) => format!("FAIL ({})", e),
    };
    println!(
        "agent {}: {} | iterations={} mean={}us p99={}us",
        outcome.agent_num, status, record.stats.count, record.stats.mean_us, record.stats.p99_us
    );

    let filename = output_dir.join(format!("{}-agent{}.json", outcome.benchmark, outcome.agent_num));
    if let Err(e) = record.export_to_file(&filename) {
        eprintln!("Failed to write {}: {}", filename.display(), e);
    }
}
