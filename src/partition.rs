//! Per-agent partitioning of id space and seeds.

use crate::error::BenchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// How the agent number modulates the id space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AgentControls {
    /// All agents share both ranges; only the seed differs.
    #[default]
    None,
    /// Each agent gets its own slice of the bitmap id range.
    Height,
    /// Each agent gets its own slice of the profile id range.
    Width,
}

impl AgentControls {
    pub fn name(&self) -> &'static str {
        match self {
            AgentControls::None => "",
            AgentControls::Height => "height",
            AgentControls::Width => "width",
        }
    }
}

impl fmt::Display for AgentControls {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AgentControls {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "none" => Ok(AgentControls::None),
            "height" => Ok(AgentControls::Height),
            "width" => Ok(AgentControls::Width),
            other => Err(BenchError::configuration(format!(
                "agent-controls: '{}' is not supported",
                other
            ))),
        }
    }
}

/// Id ranges and seed assigned to one agent.
///
/// Computed once when a runner is initialized. Under `Height` and `Width` the
/// partitioned dimension is disjoint across agents while the other dimension
/// is shared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentPartition {
    pub agent_num: usize,
    pub controls: AgentControls,
    pub bitmap_ids: Range<i64>,
    pub profile_ids: Range<i64>,
    pub seed: i64,
}

impl AgentPartition {
    pub fn new(
        controls: AgentControls,
        bitmap_ids: Range<i64>,
        profile_ids: Range<i64>,
        seed: i64,
        agent_num: usize,
    ) -> Self {
        let (bitmap_ids, profile_ids) = match controls {
            AgentControls::None => (bitmap_ids, profile_ids),
            AgentControls::Height => (shift(bitmap_ids, agent_num), profile_ids),
            AgentControls::Width => (bitmap_ids, shift(profile_ids, agent_num)),
        };
        Self {
            agent_num,
            controls,
            bitmap_ids,
            profile_ids,
            seed: seed.wrapping_add(agent_num as i64),
        }
    }
}

/// Move `range` by `agent_num` widths, keeping its width.
/// Ids past either end of `i64` are clamped.
fn shift(range: Range<i64>, agent_num: usize) -> Range<i64> {
    let width = range.end.saturating_sub(range.start);
    let agents = i64::try_from(agent_num).unwrap_or(i64::MAX);
    let start = range.start.saturating_add(width.saturating_mul(agents));
    start..start.saturating_add(width)
}
