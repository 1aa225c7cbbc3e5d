//! Configuration types for benchmark runs.
//!
//! Field names follow the kebab-case keys used in JSON benchmark files, e.g.
//! `{"type": "import", "max-bitmap-id": 5000, "agent-controls": "height"}`.
//! Missing keys take the defaults below.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_INDEX: &str = "benchindex";
pub const DEFAULT_FRAME: &str = "testframe";

/// Any of the supported benchmarks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BenchConfig {
    Import(ImportConfig),
    Query(QueryConfig),
    BasicQuery(BasicQueryConfig),
    RandomQuery(RandomQueryConfig),
}

impl BenchConfig {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&json)?)
    }

    /// Short name of the benchmark kind.
    pub fn name(&self) -> &'static str {
        match self {
            BenchConfig::Import(_) => "import",
            BenchConfig::Query(_) => "query",
            BenchConfig::BasicQuery(_) => "basic-query",
            BenchConfig::RandomQuery(_) => "random-query",
        }
    }
}

/// Configuration for the bulk-import benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ImportConfig {
    /// Number of chunks the agent's dataset is split into; one import each.
    pub iterations: usize,
    /// Bits being set will all be at or above this bitmap id.
    pub base_bitmap_id: i64,
    /// Bits being set will all be below this bitmap id.
    pub max_bitmap_id: i64,
    pub base_profile_id: i64,
    pub max_profile_id: i64,
    /// Leave the file unsorted by bitmap id and profile id.
    pub random_bitmap_order: bool,
    pub min_bits_per_map: i64,
    pub max_bits_per_map: i64,
    /// `height`, `width`, or empty. Parsed when the runner is initialized.
    pub agent_controls: String,
    pub seed: i64,
    pub index: String,
    pub frame: String,
    pub buffer_size: usize,
    /// Where chunk files are written; the system temp dir when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<PathBuf>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            iterations: 1,
            base_bitmap_id: 0,
            max_bitmap_id: 1000,
            base_profile_id: 0,
            max_profile_id: 1000,
            random_bitmap_order: false,
            min_bits_per_map: 0,
            max_bits_per_map: 10,
            agent_controls: String::new(),
            seed: 0,
            index: DEFAULT_INDEX.to_string(),
            frame: DEFAULT_FRAME.to_string(),
            buffer_size: 10_000_000,
            temp_dir: None,
        }
    }
}

impl ImportConfig {
    // === Builder methods ===

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_bitmap_ids(mut self, base: i64, max: i64) -> Self {
        self.base_bitmap_id = base;
        self.max_bitmap_id = max;
        self
    }

    pub fn with_profile_ids(mut self, base: i64, max: i64) -> Self {
        self.base_profile_id = base;
        self.max_profile_id = max;
        self
    }

    pub fn with_bits_per_map(mut self, min: i64, max: i64) -> Self {
        self.min_bits_per_map = min;
        self.max_bits_per_map = max;
        self
    }

    pub fn with_random_order(mut self, random: bool) -> Self {
        self.random_bitmap_order = random;
        self
    }

    pub fn with_agent_controls(mut self, controls: impl Into<String>) -> Self {
        self.agent_controls = controls.into();
        self
    }

    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = index.into();
        self
    }

    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.frame = frame.into();
        self
    }

    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }
}

/// Configuration for running one fixed query repeatedly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct QueryConfig {
    pub query: String,
    pub index: String,
    pub iterations: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            query: String::new(),
            index: DEFAULT_INDEX.to_string(),
            iterations: 1,
        }
    }
}

impl QueryConfig {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = index.into();
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }
}

/// Configuration for an n-ary operation over bitmaps with increasing row ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BasicQueryConfig {
    pub base_row_id: i64,
    pub iterations: usize,
    /// Number of `Bitmap` children of the operation.
    pub num_args: usize,
    /// Operation name, e.g. `Intersect`.
    pub query: String,
    pub index: String,
    pub frame: String,
}

impl Default for BasicQueryConfig {
    fn default() -> Self {
        Self {
            base_row_id: 0,
            iterations: 100,
            num_args: 2,
            query: "Intersect".to_string(),
            index: DEFAULT_INDEX.to_string(),
            frame: DEFAULT_FRAME.to_string(),
        }
    }
}

impl BasicQueryConfig {
    pub fn with_base_row_id(mut self, id: i64) -> Self {
        self.base_row_id = id;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_num_args(mut self, num_args: usize) -> Self {
        self.num_args = num_args;
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = index.into();
        self
    }

    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.frame = frame.into();
        self
    }
}

/// Configuration for randomly generated queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RandomQueryConfig {
    pub iterations: usize,
    pub max_depth: usize,
    pub max_args: usize,
    /// TopN queries draw `n` below this.
    pub max_n: u64,
    /// Row ids are drawn from `[base-bitmap-id, max-bitmap-id)`.
    pub base_bitmap_id: i64,
    pub max_bitmap_id: i64,
    pub agent_controls: String,
    pub seed: i64,
    pub index: String,
    /// Frames for TopN; bitmap leaves map row id `r` to `frames[r % len]`.
    pub frames: Vec<String>,
}

impl Default for RandomQueryConfig {
    fn default() -> Self {
        Self {
            iterations: 100,
            max_depth: 4,
            max_args: 4,
            max_n: 100,
            base_bitmap_id: 0,
            max_bitmap_id: 100_000,
            agent_controls: String::new(),
            seed: 1,
            index: DEFAULT_INDEX.to_string(),
            frames: vec![crate::generator::DEFAULT_FRAME.to_string()],
        }
    }
}

impl RandomQueryConfig {
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_shape(mut self, max_depth: usize, max_args: usize) -> Self {
        self.max_depth = max_depth;
        self.max_args = max_args;
        self
    }

    pub fn with_max_n(mut self, max_n: u64) -> Self {
        self.max_n = max_n;
        self
    }

    pub fn with_bitmap_ids(mut self, base: i64, max: i64) -> Self {
        self.base_bitmap_id = base;
        self.max_bitmap_id = max;
        self
    }

    pub fn with_agent_controls(mut self, controls: impl Into<String>) -> Self {
        self.agent_controls = controls.into();
        self
    }

    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = index.into();
        self
    }

    pub fn with_frames(mut self, frames: Vec<String>) -> Self {
        self.frames = frames;
        self
    }
}
