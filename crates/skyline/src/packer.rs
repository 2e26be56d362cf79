//! Skyline strip packer.

use crate::optimizer::WidthOptimizer;
use crate::sequencing::{PerturbationSearch, SequencingStrategy};
use u_strip_core::solver::{Config, ProgressCallback, ProgressInfo, Solver};
use u_strip_core::{Error, HeightVariant, Parameters, Result, Solution};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Fixed-height strip packer built on the skyline engine.
pub struct SkylinePacker {
    config: Config,
    strategy: Box<dyn SequencingStrategy>,
    cancelled: Arc<AtomicBool>,
}

impl SkylinePacker {
    /// Creates a packer with the given configuration.
    pub fn new(config: Config) -> Self {
        let strategy = Box::new(PerturbationSearch::new(config.seed));
        Self {
            config,
            strategy,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Creates a packer with default configuration.
    pub fn default_config() -> Self {
        Self::new(Config::default())
    }

    /// Replaces the ordering strategy used at each trial width.
    pub fn with_strategy(mut self, strategy: Box<dyn SequencingStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    /// Configuration in use.
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn check_supported(&self, params: &Parameters) -> Result<()> {
        if params.height_variant == HeightVariant::Free {
            return Err(Error::UnsupportedParameters(
                "free-height packing is not supported".into(),
            ));
        }
        if params.len() > self.config.max_rectangles {
            return Err(Error::UnsupportedParameters(format!(
                "{} rectangles exceed the limit of {}",
                params.len(),
                self.config.max_rectangles
            )));
        }
        Ok(())
    }

    fn run(
        &self,
        mut params: Parameters,
        progress: Option<&ProgressCallback>,
    ) -> Result<Solution> {
        let start = Instant::now();
        self.cancelled.store(false, Ordering::Relaxed);
        self.check_supported(&params)?;
        params.validate()?;

        let optimizer = WidthOptimizer::new(&self.config, self.strategy.as_ref());
        let outcome = if self.config.threads > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.threads)
                .build()
                .map_err(|e| Error::Internal(format!("thread pool: {}", e)))?;
            pool.install(|| optimizer.optimize(&params, progress, &self.cancelled))?
        } else {
            optimizer.optimize(&params, progress, &self.cancelled)?
        };

        params.rectangles = outcome.rectangles;
        params.restore_input_order();

        let mut solution = Solution::new(params, outcome.width);
        solution.computation_time_ms = start.elapsed().as_millis() as u64;
        solution.probes = outcome.probes;
        solution.effort = outcome.effort;
        solution.cancelled = outcome.cancelled;
        solution.validate_layout()?;

        log::info!(
            "packed {} rectangles at width {} (lower bound {}, {} probes, {} util, {} ms)",
            solution.placed_count(),
            solution.width,
            outcome.bounds.value,
            solution.probes,
            solution.utilization_percent(),
            solution.computation_time_ms
        );

        if let Some(callback) = progress {
            callback(
                ProgressInfo::new()
                    .with_probe(solution.probes, solution.width, true)
                    .with_bounds(outcome.bounds.value, solution.width)
                    .with_best(Some(solution.width))
                    .with_effort(solution.effort)
                    .with_elapsed(solution.computation_time_ms)
                    .with_phase("done")
                    .finished(),
            );
        }

        Ok(solution)
    }
}

impl Default for SkylinePacker {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Solver for SkylinePacker {
    fn can_solve(&self, parameters: &Parameters) -> bool {
        self.check_supported(parameters).is_ok()
    }

    fn solve(&self, parameters: Parameters) -> Result<Solution> {
        self.run(parameters, None)
    }

    fn solve_with_progress(
        &self,
        parameters: Parameters,
        callback: ProgressCallback,
    ) -> Result<Solution> {
        self.run(parameters, Some(&callback))
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}
