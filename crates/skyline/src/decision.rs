//! Placement decision: which rectangle goes where next.
//!
//! Each round scores every (candidate point, rectangle, orientation) triple
//! by the area it would render unusable ("local waste"), breaks ties by a
//! geometric fitness score and then by pool order, and commits the winner.
//! A uniquely fitting gap short-circuits the scoring (the forced move).

use crate::skyline::{DimensionStats, Skyline};
use std::cmp::Reverse;
use u_strip_core::{AnchorPoint, Coord, PlacementEvent, PlacementObserver, Rectangle, Result};

/// A rectangle from the pool, in one orientation, at one anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// Position of the rectangle in the pool.
    pub pool_index: usize,
    /// Whether the rectangle is turned relative to its input.
    pub rotated: bool,
    /// Where it would be seated.
    pub anchor: AnchorPoint,
    /// Width-axis extent in this orientation.
    pub width: Coord,
    /// Height-axis extent in this orientation.
    pub height: Coord,
}

/// Local waste of a candidate and its tie-break fitness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    /// Area lost to the shape change itself.
    pub waste_own: Coord,
    /// Gap to the trial width no remaining rectangle can fill.
    pub waste_right: Coord,
    /// Sliver left above the new segment.
    pub waste_above: Coord,
    /// Sliver left below the new segment.
    pub waste_below: Coord,
    /// Geometric alignment, 0 to 4.
    pub fitness: u8,
}

impl Score {
    /// Total local waste.
    pub fn total(&self) -> Coord {
        self.waste_own + self.waste_right + self.waste_above + self.waste_below
    }
}

/// Result of running the decision loop to completion.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Every rectangle was placed.
    Packed(Vec<Rectangle>),
    /// No legal placement remained for the rest of the pool.
    Infeasible {
        /// Rectangles placed before getting stuck.
        placed: Vec<Rectangle>,
        /// Rectangles left over.
        remaining: Vec<Rectangle>,
    },
}

impl Outcome {
    /// Returns true if every rectangle was placed.
    pub fn is_packed(&self) -> bool {
        matches!(self, Self::Packed(_))
    }

    /// Returns the placed rectangles if the packing is complete.
    pub fn into_packed(self) -> Option<Vec<Rectangle>> {
        match self {
            Self::Packed(rects) => Some(rects),
            Self::Infeasible { .. } => None,
        }
    }
}

/// The placement heuristic for one trial width.
#[derive(Debug, Clone, Copy)]
pub struct PlacementDecision {
    width: Coord,
    max_spread: Option<Coord>,
    rotation_allowed: bool,
}

impl PlacementDecision {
    /// Creates a decision procedure for `width`.
    pub fn new(width: Coord, rotation_allowed: bool) -> Self {
        Self {
            width,
            max_spread: None,
            rotation_allowed,
        }
    }

    /// Sets the spread bound.
    pub fn with_max_spread(mut self, max_spread: Option<Coord>) -> Self {
        self.max_spread = max_spread;
        self
    }

    /// Trial width.
    pub fn width(&self) -> Coord {
        self.width
    }

    /// Orientations worth trying; a square is only tried once.
    fn orientations(&self, rect: &Rectangle) -> &'static [bool] {
        if self.rotation_allowed && !rect.is_square() {
            &[false, true]
        } else {
            &[false]
        }
    }

    fn candidate(
        &self,
        pool: &[Rectangle],
        pool_index: usize,
        rotated: bool,
        anchor: AnchorPoint,
    ) -> Candidate {
        let rect = &pool[pool_index];
        let (width, height) = if rotated {
            (rect.height, rect.width)
        } else {
            (rect.width, rect.height)
        };
        Candidate {
            pool_index,
            rotated,
            anchor,
            width,
            height,
        }
    }

    /// True if the candidate is inside the strip, clears the skyline and
    /// respects the spread bound.
    pub fn is_legal(&self, skyline: &Skyline, c: &Candidate) -> bool {
        skyline.fits(c.width, c.height, &c.anchor)
            && !skyline.spread_violated(c.width, &c.anchor, self.max_spread)
    }

    /// Looks for a gap exactly one (rectangle, orientation) pair can fill.
    ///
    /// Counts, per segment, the pairs whose height-axis extent equals the
    /// segment length. Fires only if exactly one segment has a count of one
    /// and that pairing is legal.
    pub fn forced_move(&self, skyline: &Skyline, pool: &[Rectangle]) -> Option<Candidate> {
        let mut singles = 0;
        let mut unique = None;
        for segment in skyline.segments() {
            let mut count = 0;
            let mut found = None;
            for (i, rect) in pool.iter().enumerate() {
                for &rotated in self.orientations(rect) {
                    let c = self.candidate(pool, i, rotated, segment.upper_end);
                    if c.height == segment.length() {
                        count += 1;
                        found = Some(c);
                    }
                }
            }
            if count == 1 {
                singles += 1;
                unique = found;
            }
        }

        if singles != 1 {
            return None;
        }
        unique.filter(|c| self.is_legal(skyline, c))
    }

    /// Scores a legal candidate by a trial placement on a copy of the skyline.
    pub fn score(
        &self,
        skyline: &Skyline,
        pool: &[Rectangle],
        stats: &DimensionStats,
        c: &Candidate,
    ) -> Result<Score> {
        let mut trial = skyline.clone();
        let mut rect = pool[c.pool_index].oriented(c.rotated);
        let before = trial.area();
        let idx = trial.place(&mut rect, c.anchor)?;
        let waste_own = trial.area() - before - rect.area();

        let gap = self.width - (c.anchor.x + c.width);
        let waste_right = match stats.width.smallest_excluding(c.pool_index) {
            Some(narrowest) if gap > 0 && gap < narrowest => gap * c.height,
            _ => 0,
        };

        let threshold = stats.height.smallest_excluding(c.pool_index);
        let sliver = |neighbour: Option<usize>| -> Coord {
            let (Some(n), Some(t)) = (neighbour, threshold) else {
                return 0;
            };
            let segment = &trial.segments()[n];
            if segment.length() >= t {
                return 0;
            }
            trial
                .fill_depth(n)
                .map_or(0, |target| (target - segment.depth()) * segment.length())
        };
        let waste_above = sliver(idx.checked_sub(1));
        let waste_below = sliver((idx + 1 < trial.len()).then_some(idx + 1));

        Ok(Score {
            waste_own,
            waste_right,
            waste_above,
            waste_below,
            fitness: self.fitness(skyline, c),
        })
    }

    /// Counts how many edges of the placement line up with the strip or
    /// the skyline.
    ///
    /// One point each for: touching the trial width, matching the occupied
    /// segment's length, ending flush with the neighbour above (the trial
    /// width at the top boundary), and with the neighbour below.
    pub fn fitness(&self, skyline: &Skyline, c: &Candidate) -> u8 {
        let Some(i) = skyline.segment_index(&c.anchor) else {
            return 0;
        };
        let segments = skyline.segments();
        let front = c.anchor.x + c.width;
        let flush = |neighbour: Option<usize>| {
            let depth = neighbour.map_or(self.width, |n| segments[n].depth());
            u8::from(front == depth)
        };

        u8::from(front == self.width)
            + u8::from(c.height == segments[i].length())
            + flush(i.checked_sub(1))
            + flush((i + 1 < segments.len()).then_some(i + 1))
    }

    /// Lowest-waste legal candidate, ties broken by fitness then pool order.
    pub fn best_candidate(
        &self,
        skyline: &Skyline,
        pool: &[Rectangle],
    ) -> Result<Option<(Candidate, Score)>> {
        let stats = DimensionStats::of(pool, self.rotation_allowed);
        let mut best: Option<(Candidate, Score)> = None;
        let mut best_key = None;

        for (p, anchor) in skyline.candidate_points().into_iter().enumerate() {
            for (i, rect) in pool.iter().enumerate() {
                for &rotated in self.orientations(rect) {
                    let c = self.candidate(pool, i, rotated, anchor);
                    if !self.is_legal(skyline, &c) {
                        continue;
                    }
                    let score = self.score(skyline, pool, &stats, &c)?;
                    let key = (score.total(), Reverse(score.fitness), i, p);
                    if best_key.map_or(true, |k| key < k) {
                        best_key = Some(key);
                        best = Some((c, score));
                    }
                }
            }
        }
        Ok(best)
    }

    /// Commits one placement and repairs the skyline.
    ///
    /// Returns `None` when no legal candidate is left.
    pub fn step(
        &self,
        skyline: &mut Skyline,
        pool: &mut Vec<Rectangle>,
    ) -> Result<Option<PlacementEvent>> {
        let (c, forced) = match self.forced_move(skyline, pool) {
            Some(c) => (c, true),
            None => match self.best_candidate(skyline, pool)? {
                Some((c, _)) => (c, false),
                None => return Ok(None),
            },
        };

        let mut rect = pool.remove(c.pool_index).oriented(c.rotated);
        skyline.place(&mut rect, c.anchor)?;
        skyline.repair(pool, self.rotation_allowed)?;
        log::trace!(
            "placed rect {} ({}x{}) at ({}, {}){}",
            rect.id,
            rect.width,
            rect.height,
            rect.x,
            rect.y,
            if forced { " [forced]" } else { "" }
        );

        Ok(Some(PlacementEvent {
            rect,
            anchor: c.anchor,
            forced,
            remaining: pool.len(),
        }))
    }

    /// Consumes `pool` against `skyline` until it is empty or stuck.
    pub fn run(
        &self,
        skyline: &mut Skyline,
        mut pool: Vec<Rectangle>,
        mut observer: Option<&mut dyn PlacementObserver>,
    ) -> Result<Outcome> {
        pool.iter_mut().for_each(Rectangle::reset);
        skyline.repair(&pool, self.rotation_allowed)?;

        let mut placed = Vec::with_capacity(pool.len());
        while !pool.is_empty() {
            let Some(event) = self.step(skyline, &mut pool)? else {
                return Ok(Outcome::Infeasible {
                    placed,
                    remaining: pool,
                });
            };
            if let Some(observer) = observer.as_mut() {
                observer.on_placement(&event);
            }
            placed.push(event.rect);
        }
        Ok(Outcome::Packed(placed))
    }

    /// Packs copies of `rectangles`, in the given order, into a fresh
    /// skyline of the given height.
    pub fn pack(
        &self,
        height: Coord,
        rectangles: &[Rectangle],
        observer: Option<&mut dyn PlacementObserver>,
    ) -> Result<Outcome> {
        let mut skyline = Skyline::new(height, self.width);
        self.run(&mut skyline, rectangles.to_vec(), observer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::Segment;
    use u_strip_core::PlacementLog;

    fn rects(sizes: &[(Coord, Coord)]) -> Vec<Rectangle> {
        sizes
            .iter()
            .enumerate()
            .map(|(i, &(w, h))| Rectangle::new(i, w, h))
            .collect()
    }

    fn skyline(height: Coord, width: Coord, bands: &[(Coord, Coord)]) -> Skyline {
        let mut top = 0;
        let segments = bands
            .iter()
            .map(|&(depth, len)| {
                let s = Segment::new(depth, top, top + len);
                top += len;
                s
            })
            .collect();
        Skyline::from_segments(height, width, segments).unwrap()
    }

    #[test]
    fn test_two_rectangles_stack() {
        let decision = PlacementDecision::new(4, false);
        let mut sky = Skyline::new(10, 4);
        let mut log = PlacementLog::default();
        let outcome = decision
            .run(&mut sky, rects(&[(4, 6), (4, 4)]), Some(&mut log))
            .unwrap();

        let placed = outcome.into_packed().unwrap();
        assert_eq!((placed[0].x, placed[0].y), (0, 0));
        assert_eq!((placed[1].x, placed[1].y), (0, 6));
        assert_eq!(sky.segments(), &[Segment::new(4, 0, 10)]);

        assert_eq!(log.events.len(), 2);
        assert!(!log.events[0].forced);
        assert!(log.events[1].forced);
        assert_eq!(log.events[1].remaining, 0);
    }

    #[test]
    fn test_forced_move_unique_gap() {
        let decision = PlacementDecision::new(10, false);
        let sky = skyline(10, 10, &[(4, 6), (0, 4)]);
        let pool = rects(&[(3, 3), (2, 4), (5, 5)]);
        let c = decision.forced_move(&sky, &pool).unwrap();
        assert_eq!(c.pool_index, 1);
        assert_eq!(c.anchor, AnchorPoint::upper(0, 6));
    }

    #[test]
    fn test_forced_move_ambiguous() {
        let decision = PlacementDecision::new(10, false);
        let sky = skyline(10, 10, &[(4, 6), (0, 4)]);
        // Two rectangles fit the length-4 gap.
        assert!(decision
            .forced_move(&sky, &rects(&[(2, 4), (3, 4)]))
            .is_none());
        // Each segment has one match: two singles, no forced move.
        assert!(decision
            .forced_move(&sky, &rects(&[(2, 4), (3, 6)]))
            .is_none());
    }

    #[test]
    fn test_forced_move_rotation_and_squares() {
        let sky = skyline(10, 10, &[(4, 6), (0, 4)]);
        let pool = rects(&[(4, 2)]);
        assert!(PlacementDecision::new(10, false)
            .forced_move(&sky, &pool)
            .is_none());
        let c = PlacementDecision::new(10, true)
            .forced_move(&sky, &pool)
            .unwrap();
        assert!(c.rotated);
        assert_eq!((c.width, c.height), (2, 4));

        // A square counts once even with rotation.
        let square = rects(&[(4, 4)]);
        assert!(PlacementDecision::new(10, true)
            .forced_move(&sky, &square)
            .is_some());
    }

    #[test]
    fn test_forced_move_respects_width() {
        let sky = skyline(10, 5, &[(4, 6), (0, 4)]);
        let pool = rects(&[(6, 4)]);
        assert!(PlacementDecision::new(5, false)
            .forced_move(&sky, &pool)
            .is_none());
    }

    #[test]
    fn test_spread_rejects_candidates() {
        let sky = Skyline::new(10, 20);
        let pool = rects(&[(3, 5)]);
        let tight = PlacementDecision::new(20, false).with_max_spread(Some(2));
        assert!(tight.best_candidate(&sky, &pool).unwrap().is_none());

        let loose = PlacementDecision::new(20, false).with_max_spread(Some(3));
        assert!(loose.best_candidate(&sky, &pool).unwrap().is_some());
    }

    #[test]
    fn test_waste_own_behind_overrun() {
        let decision = PlacementDecision::new(10, false);
        let sky = skyline(10, 10, &[(5, 2), (3, 2), (1, 3), (0, 3)]);
        let pool = rects(&[(2, 6), (1, 1)]);
        let stats = DimensionStats::of(&pool, false);
        let c = decision.candidate(&pool, 0, false, AnchorPoint::upper(3, 2));
        let score = decision.score(&sky, &pool, &stats, &c).unwrap();
        // Gap behind the rectangle: 3 rows at depth 1 and 1 row at depth 0.
        assert_eq!(score.waste_own, 3 * 2 + 3);
    }

    #[test]
    fn test_waste_right_excludes_self() {
        let decision = PlacementDecision::new(10, false);
        let sky = Skyline::new(10, 10);
        // Rect 0 is the narrowest; the next narrowest is 5 wide.
        let pool = rects(&[(7, 10), (5, 2)]);
        let stats = DimensionStats::of(&pool, false);
        let c = decision.candidate(&pool, 0, false, AnchorPoint::upper(0, 0));
        let score = decision.score(&sky, &pool, &stats, &c).unwrap();
        assert_eq!(score.waste_right, 3 * 10);

        let pool = rects(&[(7, 10), (3, 2)]);
        let stats = DimensionStats::of(&pool, false);
        let score = decision.score(&sky, &pool, &stats, &c).unwrap();
        assert_eq!(score.waste_right, 0);
    }

    #[test]
    fn test_waste_below_sliver() {
        let decision = PlacementDecision::new(20, false);
        let sky = Skyline::new(10, 20);
        // Leaves a 1-high band below that the 2-high rectangle cannot use.
        let pool = rects(&[(4, 9), (3, 2)]);
        let stats = DimensionStats::of(&pool, false);
        let c = decision.candidate(&pool, 0, false, AnchorPoint::upper(0, 0));
        let score = decision.score(&sky, &pool, &stats, &c).unwrap();
        assert_eq!(score.waste_below, 4);
        assert_eq!(score.waste_above, 0);
        assert_eq!(score.total(), 4);
    }

    #[test]
    fn test_waste_above_sliver() {
        let decision = PlacementDecision::new(20, false);
        let sky = Skyline::new(10, 20);
        // Grows up from the bottom and leaves a 1-high band at the top.
        let pool = rects(&[(4, 9), (3, 2)]);
        let stats = DimensionStats::of(&pool, false);
        let c = decision.candidate(&pool, 0, false, AnchorPoint::lower(0, 10));
        let score = decision.score(&sky, &pool, &stats, &c).unwrap();
        assert_eq!(score.waste_above, 4);
        assert_eq!(score.waste_below, 0);
        assert_eq!(score.total(), 4);
    }

    #[test]
    fn test_waste_above_capped_by_shallower_neighbour() {
        let decision = PlacementDecision::new(20, false);
        // The band left above sits between depth 2 and the new depth 4.
        let sky = skyline(10, 20, &[(2, 1), (0, 9)]);
        let pool = rects(&[(4, 8), (3, 2)]);
        let stats = DimensionStats::of(&pool, false);
        let c = decision.candidate(&pool, 0, false, AnchorPoint::lower(0, 10));
        let score = decision.score(&sky, &pool, &stats, &c).unwrap();
        assert_eq!(score.waste_above, 2);
        assert_eq!(score.waste_own, 0);
        assert_eq!(score.total(), 2);
    }

    #[test]
    fn test_fitness() {
        let decision = PlacementDecision::new(8, false);
        let sky = skyline(10, 8, &[(4, 6), (0, 4)]);
        let pool = rects(&[(4, 4)]);
        let c = decision.candidate(&pool, 0, false, AnchorPoint::upper(0, 6));
        // Matches length, flush with the band above, no neighbour below
        // and not touching the width.
        assert_eq!(decision.fitness(&sky, &c), 2);

        let wide = rects(&[(8, 4)]);
        let c = decision.candidate(&wide, 0, false, AnchorPoint::upper(0, 6));
        // Touches the width, matches length, bottom boundary counts.
        assert_eq!(decision.fitness(&sky, &c), 3);
    }

    #[test]
    fn test_tie_broken_by_pool_order() {
        let decision = PlacementDecision::new(4, false);
        let sky = Skyline::new(8, 4);
        let pool = rects(&[(4, 4), (4, 4)]);
        let (c, _) = decision.best_candidate(&sky, &pool).unwrap().unwrap();
        assert_eq!(c.pool_index, 0);
    }

    #[test]
    fn test_infeasible_width() {
        let decision = PlacementDecision::new(5, false);
        let outcome = decision
            .pack(10, &rects(&[(4, 6), (4, 6)]), None)
            .unwrap();
        match outcome {
            Outcome::Infeasible { placed, remaining } => {
                assert_eq!(placed.len(), 1);
                assert_eq!(remaining.len(), 1);
            }
            Outcome::Packed(_) => panic!("two 6-high rectangles cannot share a 10-high column"),
        }
    }

    #[test]
    fn test_pack_side_by_side() {
        let decision = PlacementDecision::new(8, false);
        let outcome = decision
            .pack(10, &rects(&[(4, 6), (4, 6)]), None)
            .unwrap();
        let placed = outcome.into_packed().unwrap();
        assert!(!placed[0].overlaps(&placed[1]));
        assert!(placed.iter().all(|r| r.right() <= 8 && r.bottom() <= 10));
    }

    #[test]
    fn test_rotation_enables_packing() {
        let pool = rects(&[(1, 6), (1, 6)]);
        assert!(!PlacementDecision::new(6, false)
            .pack(4, &pool, None)
            .unwrap()
            .is_packed());

        let placed = PlacementDecision::new(6, true)
            .pack(4, &pool, None)
            .unwrap()
            .into_packed()
            .unwrap();
        assert!(placed.iter().all(|r| r.rotated));
        assert!(!placed[0].overlaps(&placed[1]));
    }
}
