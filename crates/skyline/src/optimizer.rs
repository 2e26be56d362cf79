//! Width optimizer: binary search over trial widths.
//!
//! The search starts from the instance lower bound and a window slightly
//! above it. Each pass binary-searches the window; a probe asks the
//! [`SequencingStrategy`] whether the width can be packed with the current
//! effort. A pass that packs nothing widens the window and doubles the
//! effort. The window never grows past the trivial upper bound; if nothing
//! packs there either, the rectangles are laid side by side at that width.

use crate::bounds::{side_by_side, trivial_upper_bound, LowerBounds};
use crate::sequencing::{SequencingProblem, SequencingStrategy};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use u_strip_core::{
    Config, Coord, Error, Parameters, ProgressCallback, ProgressInfo, Rectangle, Result,
};

/// The narrowest width found and how the search got there.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Narrowest width that packed.
    pub width: Coord,
    /// Placed rectangles at that width, in placement order.
    pub rectangles: Vec<Rectangle>,
    /// Bounds the search started from.
    pub bounds: LowerBounds,
    /// Widths probed.
    pub probes: u32,
    /// Effort in use at the end.
    pub effort: usize,
    /// True if the search stopped early on a time limit or cancellation.
    pub cancelled: bool,
}

/// Searches for the narrowest packable width.
pub struct WidthOptimizer<'a> {
    config: &'a Config,
    strategy: &'a dyn SequencingStrategy,
}

impl<'a> WidthOptimizer<'a> {
    /// Creates an optimizer probing widths with `strategy`.
    pub fn new(config: &'a Config, strategy: &'a dyn SequencingStrategy) -> Self {
        Self { config, strategy }
    }

    /// Next upper bound: scaled by the growth factor, strictly larger.
    fn grow(&self, width: Coord) -> Coord {
        let scaled = (width as f64 * self.config.bound_growth).ceil() as Coord;
        scaled.max(width + 1)
    }

    fn interrupted(&self, start: Instant, cancelled: &AtomicBool) -> Option<Error> {
        if cancelled.load(Ordering::Relaxed) {
            return Some(Error::Cancelled);
        }
        let limit = self.config.time_limit_ms;
        if limit > 0 && start.elapsed().as_millis() as u64 >= limit {
            return Some(Error::Timeout(limit));
        }
        None
    }

    /// Runs the search.
    ///
    /// Falls back to [`side_by_side`] if even the trivial upper bound fails.
    /// Returns [`Error::NoPlacement`] only when a spread bound below that
    /// width forbids the fallback, and [`Error::Cancelled`] /
    /// [`Error::Timeout`] if interrupted before any width packed.
    pub fn optimize(
        &self,
        params: &Parameters,
        progress: Option<&ProgressCallback>,
        cancelled: &AtomicBool,
    ) -> Result<SearchOutcome> {
        let start = Instant::now();
        let bounds = LowerBounds::compute(params);
        let cap = trivial_upper_bound(params).max(bounds.value);
        let problem = SequencingProblem::new(params, self.config.max_spread);

        let mut lower = bounds.value;
        let mut upper = self.grow(lower).min(cap + 1);
        let mut effort = self.config.initial_effort.max(1);
        let mut best: Option<(Coord, Vec<Rectangle>)> = None;
        let mut probes = 0u32;

        log::debug!(
            "bounds lb1={} lb2={} lb3={} -> {}, cap {}, window [{}, {})",
            bounds.lb1,
            bounds.lb2,
            bounds.lb3,
            bounds.value,
            cap,
            lower,
            upper
        );

        loop {
            while lower < upper {
                if let Some(stop) = self.interrupted(start, cancelled) {
                    log::warn!("search interrupted after {} probes: {}", probes, stop);
                    return match best {
                        Some((width, rectangles)) => Ok(SearchOutcome {
                            width,
                            rectangles,
                            bounds,
                            probes,
                            effort,
                            cancelled: true,
                        }),
                        None => Err(stop),
                    };
                }

                let mid = lower + (upper - lower) / 2;
                probes += 1;
                let packed = self.strategy.solve(&problem, mid, effort)?;
                let succeeded = packed.is_some();
                log::debug!(
                    "probe {}: width {} effort {} -> {}",
                    probes,
                    mid,
                    effort,
                    if succeeded { "packed" } else { "failed" }
                );
                match packed {
                    Some(rectangles) => {
                        upper = mid;
                        best = Some((mid, rectangles));
                    }
                    None => lower = mid + 1,
                }

                if let Some(callback) = progress {
                    callback(
                        ProgressInfo::new()
                            .with_probe(probes, mid, succeeded)
                            .with_bounds(lower, upper)
                            .with_best(best.as_ref().map(|(w, _)| *w))
                            .with_effort(effort)
                            .with_elapsed(start.elapsed().as_millis() as u64)
                            .with_phase("binary search"),
                    );
                }
            }

            if let Some((width, rectangles)) = best {
                return Ok(SearchOutcome {
                    width,
                    rectangles,
                    bounds,
                    probes,
                    effort,
                    cancelled: false,
                });
            }

            if upper > cap {
                if self.config.max_spread.map_or(false, |spread| spread < cap) {
                    return Err(Error::NoPlacement(format!(
                        "no ordering packs at width {} with spread {:?}",
                        cap, self.config.max_spread
                    )));
                }
                log::warn!(
                    "no ordering packs at width {} with effort {}; placing side by side",
                    cap,
                    effort
                );
                return Ok(SearchOutcome {
                    width: cap,
                    rectangles: side_by_side(params),
                    bounds,
                    probes,
                    effort,
                    cancelled: false,
                });
            }

            let next = self.grow(upper).min(cap + 1);
            effort = (effort * 2).min(self.config.max_effort.max(1));
            log::warn!(
                "nothing packed below {}; widening to {} with effort {}",
                upper,
                next,
                effort
            );
            upper = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencing::PerturbationSearch;
    use std::sync::{Arc, Mutex};

    fn optimize(params: &Parameters, config: &Config) -> Result<SearchOutcome> {
        let strategy = PerturbationSearch::new(config.seed);
        WidthOptimizer::new(config, &strategy).optimize(params, None, &AtomicBool::new(false))
    }

    #[test]
    fn test_single_rectangle() {
        let params = Parameters::new(10).with_rectangle(4, 10);
        let outcome = optimize(&params, &Config::default()).unwrap();
        assert_eq!(outcome.width, 4);
        assert_eq!(outcome.rectangles.len(), 1);
        assert!(!outcome.cancelled);
    }

    #[test]
    fn test_two_rectangles_first_probe() {
        let params = Parameters::new(10).with_rectangles([(4, 6), (4, 4)]);
        let outcome = optimize(&params, &Config::default()).unwrap();
        assert_eq!(outcome.width, 4);
        assert_eq!(outcome.bounds.value, 4);
        assert_eq!(outcome.probes, 1);
    }

    #[test]
    fn test_width_at_least_lower_bound() {
        let params = Parameters::new(10).with_rectangles([
            (3, 7),
            (2, 5),
            (4, 4),
            (1, 9),
            (5, 2),
            (2, 3),
            (3, 3),
        ]);
        let outcome = optimize(&params, &Config::default()).unwrap();
        assert!(outcome.width >= outcome.bounds.value);
        assert!(outcome.width <= trivial_upper_bound(&params));
        assert_eq!(outcome.rectangles.len(), params.len());
    }

    #[test]
    fn test_window_grows_then_gives_up() {
        // Spread 2 rejects a 3-wide rectangle at every width.
        let params = Parameters::new(10).with_rectangle(3, 5);
        let config = Config::default().with_max_spread(2);
        let strategy = PerturbationSearch::new(config.seed);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback: ProgressCallback = Box::new(move |info: ProgressInfo| {
            sink.lock().unwrap().push((info.probe_width, info.effort));
        });

        let result = WidthOptimizer::new(&config, &strategy).optimize(
            &params,
            Some(&callback),
            &AtomicBool::new(false),
        );
        assert!(matches!(result, Err(Error::NoPlacement(_))));
        // One failed pass at the initial effort, one wider pass at double.
        assert_eq!(*seen.lock().unwrap(), vec![(2, 4), (3, 8)]);
    }

    struct Refuse;

    impl SequencingStrategy for Refuse {
        fn solve(
            &self,
            _: &SequencingProblem,
            _: Coord,
            _: usize,
        ) -> Result<Option<Vec<Rectangle>>> {
            Ok(None)
        }
    }

    #[test]
    fn test_side_by_side_at_trivial_bound() {
        let params = Parameters::new(5).with_rotation(true).with_rectangles([
            (2, 5),
            (8, 4),
            (2, 4),
            (6, 5),
            (8, 2),
            (5, 4),
        ]);
        let config = Config::default();
        let outcome = WidthOptimizer::new(&config, &Refuse)
            .optimize(&params, None, &AtomicBool::new(false))
            .unwrap();
        assert_eq!(outcome.width, 30);
        assert_eq!(outcome.width, trivial_upper_bound(&params));
        assert!(!outcome.cancelled);
        assert!(outcome.probes > 0);
        let right = outcome.rectangles.iter().map(|r| r.right()).max();
        assert_eq!(right, Some(30));
        assert!(outcome.rectangles.iter().all(|r| r.placed && r.bottom() <= 5));
    }

    #[test]
    fn test_cancelled_before_first_probe() {
        let params = Parameters::new(10).with_rectangle(4, 10);
        let config = Config::default();
        let strategy = PerturbationSearch::default();
        let result =
            WidthOptimizer::new(&config, &strategy).optimize(&params, None, &AtomicBool::new(true));
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[test]
    fn test_grow_is_strict() {
        let config = Config::default().with_bound_growth(1.0);
        let strategy = PerturbationSearch::default();
        let optimizer = WidthOptimizer::new(&config, &strategy);
        assert_eq!(optimizer.grow(5), 6);

        let config = Config::default().with_bound_growth(1.5);
        let optimizer = WidthOptimizer::new(&config, &strategy);
        assert_eq!(optimizer.grow(5), 8);
    }
}
