//! Random query generation.

use crate::query::{bitmap, difference, intersect, top_n, union, QueryTree};
use rand::prelude::*;
use rand::rngs::StdRng;
use std::fmt;

/// Frame used when no frames are configured.
pub const DEFAULT_FRAME: &str = "fbench";

/// Maps a row id to the frame it lives in.
pub type IdToFrame = Box<dyn Fn(u64) -> String + Send + Sync>;

/// Generates random query trees from a seeded stream.
///
/// Every draw comes from the generator's own RNG, so two generators built with
/// the same seed and driven with the same calls produce identical trees.
pub struct QueryGenerator {
    rng: StdRng,
    frames: Vec<String>,
    id_to_frame: IdToFrame,
}

impl fmt::Debug for QueryGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryGenerator")
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}

impl QueryGenerator {
    pub fn new(seed: i64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed as u64),
            frames: vec![DEFAULT_FRAME.to_string()],
            id_to_frame: Box::new(|_| DEFAULT_FRAME.to_string()),
        }
    }

    /// Frames TopN queries pick from. An empty list keeps the current frames.
    pub fn with_frames(mut self, frames: Vec<String>) -> Self {
        if !frames.is_empty() {
            self.frames = frames;
        }
        self
    }

    pub fn with_id_to_frame(mut self, f: impl Fn(u64) -> String + Send + Sync + 'static) -> Self {
        self.id_to_frame = Box::new(f);
        self
    }

    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    /// A random query: TopN one time in five, otherwise a bitmap call.
    pub fn random(
        &mut self,
        max_n: u64,
        depth: usize,
        max_args: usize,
        id_min: u64,
        id_max: u64,
    ) -> QueryTree {
        match self.rng.gen_range(0..5) {
            0 => self.random_top_n(max_n, depth, max_args, id_min, id_max),
            _ => self.random_bitmap_call(depth, max_args, id_min, id_max),
        }
    }

    /// A TopN over a random frame with `n` in `[1, max_n)`, wrapping a
    /// random bitmap call.
    pub fn random_top_n(
        &mut self,
        max_n: u64,
        depth: usize,
        max_args: usize,
        id_min: u64,
        id_max: u64,
    ) -> QueryTree {
        let frame_idx = self.rng.gen_range(0..self.frames.len());
        let frame = self.frames[frame_idx].clone();
        let n = if max_n >= 2 {
            self.rng.gen_range(1..max_n)
        } else {
            1
        };
        let src = self.random_bitmap_call(depth, max_args, id_min, id_max);
        top_n(&frame, n, Some(src), &[], None, vec![])
    }

    /// A random query which returns a bitmap.
    ///
    /// At `depth <= 1` this is always a single `Bitmap` leaf. Deeper calls
    /// give up early one time in four; otherwise they build a Difference,
    /// Intersect or Union of between 2 and `max_args` sub-calls.
    pub fn random_bitmap_call(
        &mut self,
        depth: usize,
        max_args: usize,
        id_min: u64,
        id_max: u64,
    ) -> QueryTree {
        if depth <= 1 {
            return self.random_bitmap(id_min, id_max);
        }
        let call = self.rng.gen_range(0..4);
        if call == 0 {
            return self.random_bitmap(id_min, id_max);
        }

        let num_args = if max_args <= 2 {
            2
        } else {
            self.rng.gen_range(2..=max_args)
        };
        let children = (0..num_args)
            .map(|_| self.random_bitmap_call(depth - 1, max_args, id_min, id_max))
            .collect();

        match call {
            1 => difference(children),
            2 => intersect(children),
            _ => union(children),
        }
    }

    fn random_bitmap(&mut self, id_min: u64, id_max: u64) -> QueryTree {
        let row_id = if id_max > id_min {
            self.rng.gen_range(id_min..id_max)
        } else {
            id_min
        };
        let frame = (self.id_to_frame)(row_id);
        bitmap(row_id, &frame)
    }
}
