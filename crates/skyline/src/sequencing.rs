//! Rectangle orderings tried at each trial width.
//!
//! The width optimizer only asks "can this width be packed with this much
//! effort?". A [`SequencingStrategy`] answers by running the placement
//! decision over one or more orderings of the pool. Each ordering is packed
//! on its own copy of the rectangles and a fresh skyline, so orderings are
//! independent and [`PerturbationSearch`] evaluates them in parallel.

use crate::decision::PlacementDecision;
use rand::prelude::*;
use rayon::prelude::*;
use std::cmp::Reverse;
use u_strip_core::{Coord, Parameters, Rectangle, Result};

/// The fixed part of a packing attempt: everything but width and order.
#[derive(Debug, Clone)]
pub struct SequencingProblem {
    /// Strip height.
    pub height: Coord,
    /// Whether rectangles may be turned.
    pub rotation_allowed: bool,
    /// Spread bound passed to the decision.
    pub max_spread: Option<Coord>,
    /// Rectangles in input order.
    pub rectangles: Vec<Rectangle>,
}

impl SequencingProblem {
    /// Extracts the problem from solver parameters.
    pub fn new(params: &Parameters, max_spread: Option<Coord>) -> Self {
        let mut rectangles = params.rectangles.clone();
        rectangles.iter_mut().for_each(Rectangle::reset);
        Self {
            height: params.height,
            rotation_allowed: params.rotation_allowed,
            max_spread,
            rectangles,
        }
    }

    /// Number of rectangles.
    pub fn len(&self) -> usize {
        self.rectangles.len()
    }

    /// Returns true if there is nothing to pack.
    pub fn is_empty(&self) -> bool {
        self.rectangles.is_empty()
    }

    /// Decision procedure at `width`.
    pub fn decision(&self, width: Coord) -> PlacementDecision {
        PlacementDecision::new(width, self.rotation_allowed).with_max_spread(self.max_spread)
    }

    /// Packs the rectangles in `order` at `width`.
    pub fn try_order(&self, width: Coord, order: &[usize]) -> Result<Option<Vec<Rectangle>>> {
        let pool: Vec<Rectangle> = order.iter().map(|&i| self.rectangles[i].clone()).collect();
        let outcome = self.decision(width).pack(self.height, &pool, None)?;
        Ok(outcome.into_packed())
    }
}

/// Decides whether a width can be packed within an effort budget.
pub trait SequencingStrategy: Send + Sync {
    /// Tries at most `effort` orderings at `width`; returns the placed
    /// rectangles of the first one that packs completely.
    fn solve(
        &self,
        problem: &SequencingProblem,
        width: Coord,
        effort: usize,
    ) -> Result<Option<Vec<Rectangle>>>;
}

/// Deterministic starting orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOrder {
    /// As given.
    Input,
    /// Tallest first.
    HeightDesc,
    /// Widest first.
    WidthDesc,
    /// Largest area first.
    AreaDesc,
    /// Longest side first.
    MaxSideDesc,
}

impl SeedOrder {
    /// All seed orders in the sequence they are tried.
    pub const ALL: [SeedOrder; 5] = [
        SeedOrder::Input,
        SeedOrder::HeightDesc,
        SeedOrder::WidthDesc,
        SeedOrder::AreaDesc,
        SeedOrder::MaxSideDesc,
    ];

    /// Indices of `rects` in this order. Sorting is stable.
    pub fn order(&self, rects: &[Rectangle]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..rects.len()).collect();
        match self {
            Self::Input => {}
            Self::HeightDesc => order.sort_by_key(|&i| Reverse(rects[i].height)),
            Self::WidthDesc => order.sort_by_key(|&i| Reverse(rects[i].width)),
            Self::AreaDesc => order.sort_by_key(|&i| Reverse(rects[i].area())),
            Self::MaxSideDesc => order.sort_by_key(|&i| Reverse(rects[i].max_side())),
        }
        order
    }
}

/// Moves applied to a seed order to get a new ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Perturbation {
    /// Exchange two positions.
    Swap,
    /// Move one entry elsewhere.
    Relocate,
    /// Reverse a run.
    Reverse,
}

impl Perturbation {
    /// Applies the move in place. Orders shorter than two are left alone.
    pub fn apply<R: Rng>(&self, order: &mut Vec<usize>, rng: &mut R) {
        let n = order.len();
        if n < 2 {
            return;
        }
        let (i, j) = (rng.gen_range(0..n), rng.gen_range(0..n));
        match self {
            Self::Swap => order.swap(i, j),
            Self::Relocate => {
                let item = order.remove(i);
                order.insert(j, item);
            }
            Self::Reverse => order[i.min(j)..=i.max(j)].reverse(),
        }
    }
}

/// Seed orders first, then random perturbations of them.
///
/// Each perturbed ordering is derived from its own RNG seeded with
/// `(seed, width, index)`, so the orderings tried at a width do not depend
/// on thread scheduling or on the orderings tried before.
#[derive(Debug, Clone)]
pub struct PerturbationSearch {
    seed: u64,
    max_moves: usize,
}

impl PerturbationSearch {
    /// Creates a search with the given base seed.
    pub fn new(seed: u64) -> Self {
        Self { seed, max_moves: 3 }
    }

    /// Sets the most perturbation moves applied to one ordering.
    pub fn with_max_moves(mut self, moves: usize) -> Self {
        self.max_moves = moves.max(1);
        self
    }

    /// The orderings tried at `width` with the given effort.
    pub fn orderings(
        &self,
        problem: &SequencingProblem,
        width: Coord,
        effort: usize,
    ) -> Vec<Vec<usize>> {
        let effort = effort.max(1);
        let mut seeds: Vec<Vec<usize>> = Vec::with_capacity(SeedOrder::ALL.len());
        for seed_order in SeedOrder::ALL {
            let order = seed_order.order(&problem.rectangles);
            if !seeds.contains(&order) {
                seeds.push(order);
            }
        }

        let mut orderings: Vec<Vec<usize>> = seeds.iter().take(effort).cloned().collect();
        if problem.len() < 2 {
            return orderings;
        }

        const MOVES: [Perturbation; 3] = [
            Perturbation::Swap,
            Perturbation::Relocate,
            Perturbation::Reverse,
        ];
        for k in orderings.len()..effort {
            let mut rng = StdRng::seed_from_u64(
                self.seed ^ (width as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15) ^ k as u64,
            );
            let mut order = seeds[k % seeds.len()].clone();
            for _ in 0..rng.gen_range(1..=self.max_moves) {
                let mv = MOVES[rng.gen_range(0..MOVES.len())];
                mv.apply(&mut order, &mut rng);
            }
            orderings.push(order);
        }
        orderings
    }
}

impl Default for PerturbationSearch {
    fn default() -> Self {
        Self::new(0x5eed)
    }
}

impl SequencingStrategy for PerturbationSearch {
    fn solve(
        &self,
        problem: &SequencingProblem,
        width: Coord,
        effort: usize,
    ) -> Result<Option<Vec<Rectangle>>> {
        let orderings = self.orderings(problem, width, effort);
        // Lowest-index ordering that packs or fails hard.
        let first = orderings
            .par_iter()
            .map(|order| problem.try_order(width, order))
            .find_first(|attempt| !matches!(attempt, Ok(None)));

        match first {
            Some(attempt) => attempt,
            None => {
                log::debug!(
                    "width {}: none of {} orderings packed",
                    width,
                    orderings.len()
                );
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problem(sizes: &[(Coord, Coord)], height: Coord) -> SequencingProblem {
        let params = Parameters::new(height).with_rectangles(sizes.iter().copied());
        SequencingProblem::new(&params, None)
    }

    #[test]
    fn test_seed_orders() {
        let p = problem(&[(1, 3), (4, 1), (2, 2)], 10);
        assert_eq!(SeedOrder::Input.order(&p.rectangles), vec![0, 1, 2]);
        assert_eq!(SeedOrder::HeightDesc.order(&p.rectangles), vec![0, 2, 1]);
        assert_eq!(SeedOrder::WidthDesc.order(&p.rectangles), vec![1, 2, 0]);
        assert_eq!(SeedOrder::AreaDesc.order(&p.rectangles), vec![1, 2, 0]);
    }

    #[test]
    fn test_orderings_are_permutations() {
        let p = problem(&[(1, 3), (4, 1), (2, 2), (5, 5), (3, 1)], 10);
        let search = PerturbationSearch::new(7);
        let orderings = search.orderings(&p, 12, 20);
        assert_eq!(orderings.len(), 20);
        for order in &orderings {
            let mut sorted = order.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, vec![0, 1, 2, 3, 4]);
        }
    }

    #[test]
    fn test_orderings_reproducible() {
        let p = problem(&[(1, 3), (4, 1), (2, 2), (5, 5)], 10);
        let search = PerturbationSearch::new(42);
        assert_eq!(search.orderings(&p, 9, 16), search.orderings(&p, 9, 16));
    }

    #[test]
    fn test_effort_limits_seed_orders() {
        let p = problem(&[(1, 3), (4, 1)], 10);
        let search = PerturbationSearch::default();
        assert_eq!(search.orderings(&p, 5, 1), vec![vec![0, 1]]);
        let single = problem(&[(1, 3)], 10);
        assert_eq!(search.orderings(&single, 5, 8).len(), 1);
    }

    #[test]
    fn test_perturbation_moves() {
        let mut rng = StdRng::seed_from_u64(1);
        for mv in [Perturbation::Swap, Perturbation::Relocate, Perturbation::Reverse] {
            let mut order = vec![0, 1, 2, 3, 4, 5];
            mv.apply(&mut order, &mut rng);
            let mut sorted = order.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, vec![0, 1, 2, 3, 4, 5]);
        }
    }

    #[test]
    fn test_solve_finds_packing() {
        let p = problem(&[(4, 6), (4, 4)], 10);
        let search = PerturbationSearch::default();
        let packed = search.solve(&p, 4, 4).unwrap().unwrap();
        assert_eq!(packed.len(), 2);
        assert!(search.solve(&p, 3, 4).unwrap().is_none());
    }

    #[test]
    fn test_solve_is_deterministic() {
        let p = problem(&[(2, 2), (2, 2), (3, 8), (2, 6), (2, 6)], 8);
        let search = PerturbationSearch::new(3);
        let a = search.solve(&p, 20, 16).unwrap();
        let b = search.solve(&p, 20, 16).unwrap();
        assert_eq!(a, b);
        assert!(a.is_some());
    }
}
