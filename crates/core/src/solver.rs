//! Solver traits and configuration.

use crate::geometry::Coord;
use crate::parameters::Parameters;
use crate::result::Solution;
use crate::Result;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Common configuration for solvers.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Maximum computation time in milliseconds (0 = unlimited).
    pub time_limit_ms: u64,

    /// Number of threads to use (0 = auto).
    pub threads: usize,

    /// How far any column may run ahead of the shallowest one
    /// (None = bounded by the trial width only).
    pub max_spread: Option<Coord>,

    /// Largest pool a solver accepts.
    pub max_rectangles: usize,

    /// Orderings tried per width probe on the first pass.
    pub initial_effort: usize,

    /// Cap on the per-probe effort after doubling.
    pub max_effort: usize,

    /// Factor applied to the width upper bound when a pass finds nothing.
    pub bound_growth: f64,

    /// Seed for ordering perturbations.
    pub seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            time_limit_ms: 30000,
            threads: 0,
            max_spread: None,
            max_rectangles: 10_000,
            initial_effort: 4,
            max_effort: 256,
            bound_growth: 1.1,
            seed: 0x5eed,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the time limit in milliseconds.
    pub fn with_time_limit(mut self, ms: u64) -> Self {
        self.time_limit_ms = ms;
        self
    }

    /// Sets the number of worker threads.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Sets the spread bound.
    pub fn with_max_spread(mut self, spread: Coord) -> Self {
        self.max_spread = Some(spread.max(0));
        self
    }

    /// Sets the pool-size ceiling.
    pub fn with_max_rectangles(mut self, n: usize) -> Self {
        self.max_rectangles = n;
        self
    }

    /// Sets the initial per-probe effort.
    pub fn with_initial_effort(mut self, effort: usize) -> Self {
        self.initial_effort = effort.max(1);
        self
    }

    /// Sets the effort cap.
    pub fn with_max_effort(mut self, effort: usize) -> Self {
        self.max_effort = effort.max(1);
        self
    }

    /// Sets the upper-bound growth factor.
    pub fn with_bound_growth(mut self, factor: f64) -> Self {
        self.bound_growth = factor.max(1.0);
        self
    }

    /// Sets the perturbation seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Progress callback for long-running operations.
pub type ProgressCallback = Box<dyn Fn(ProgressInfo) + Send + Sync>;

/// Progress information reported after each width probe.
#[derive(Debug, Clone, Default)]
pub struct ProgressInfo {
    /// Number of probes so far.
    pub iteration: u32,
    /// Width just probed.
    pub probe_width: Coord,
    /// Whether that probe found a packing.
    pub probe_succeeded: bool,
    /// Current search lower bound.
    pub lower_bound: Coord,
    /// Current search upper bound.
    pub upper_bound: Coord,
    /// Best width found so far.
    pub best_width: Option<Coord>,
    /// Orderings allowed per probe.
    pub effort: usize,
    /// Elapsed time in milliseconds.
    pub elapsed_ms: u64,
    /// Current phase/stage description.
    pub phase: String,
    /// Whether the solver is still running.
    pub running: bool,
}

impl ProgressInfo {
    /// Creates a new progress info with default values.
    pub fn new() -> Self {
        Self {
            running: true,
            ..Default::default()
        }
    }

    /// Sets the probe outcome.
    pub fn with_probe(mut self, iteration: u32, width: Coord, succeeded: bool) -> Self {
        self.iteration = iteration;
        self.probe_width = width;
        self.probe_succeeded = succeeded;
        self
    }

    /// Sets the search interval.
    pub fn with_bounds(mut self, lower: Coord, upper: Coord) -> Self {
        self.lower_bound = lower;
        self.upper_bound = upper;
        self
    }

    /// Sets the best width.
    pub fn with_best(mut self, best: Option<Coord>) -> Self {
        self.best_width = best;
        self
    }

    /// Sets the effort.
    pub fn with_effort(mut self, effort: usize) -> Self {
        self.effort = effort;
        self
    }

    /// Sets the elapsed time.
    pub fn with_elapsed(mut self, elapsed_ms: u64) -> Self {
        self.elapsed_ms = elapsed_ms;
        self
    }

    /// Sets the phase description.
    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = phase.into();
        self
    }

    /// Marks the solver as finished.
    pub fn finished(mut self) -> Self {
        self.running = false;
        self
    }

    /// Relative gap between the best width and the lower bound (1.0 if none).
    pub fn gap(&self) -> f64 {
        match self.best_width {
            Some(best) if best > 0 => (best - self.lower_bound).max(0) as f64 / best as f64,
            _ => 1.0,
        }
    }
}

/// Trait for strip packing solvers.
pub trait Solver {
    /// Returns true if this solver handles the given parameters.
    fn can_solve(&self, parameters: &Parameters) -> bool;

    /// Packs all rectangles and returns the achieved width.
    fn solve(&self, parameters: Parameters) -> Result<Solution>;

    /// Solves with a progress callback.
    fn solve_with_progress(
        &self,
        parameters: Parameters,
        callback: ProgressCallback,
    ) -> Result<Solution>;

    /// Cancels an ongoing solve operation.
    fn cancel(&self);
}
