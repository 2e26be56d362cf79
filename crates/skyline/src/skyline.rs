//! Skyline: the packing frontier.
//!
//! The skyline is an ordered list of [`Segment`]s partitioning the strip
//! height `[0, height]`, index 0 at the top. Each segment records how deep
//! along the width axis the packing has reached within its band. Neighbour
//! lookups are plain index arithmetic.
//!
//! # Invariants
//!
//! Between operations:
//! - every segment has `upper_end.x == lower_end.x`,
//! - consecutive segments touch (`segments[i].bottom() == segments[i + 1].top()`),
//! - segment lengths sum to the strip height.
//!
//! Mutations check these and fail with [`Error::InvariantViolation`] /
//! [`Error::Internal`] rather than continuing on a corrupt skyline.

use crate::segment::Segment;
use std::cmp::Ordering;
use u_strip_core::{AnchorPoint, Coord, Error, Rectangle, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The packing frontier for one attempt at one trial width.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Skyline {
    segments: Vec<Segment>,
    height: Coord,
    width: Coord,
}

impl Skyline {
    /// Creates the initial skyline: one segment at depth 0 over the full height.
    pub fn new(height: Coord, width: Coord) -> Self {
        Self {
            segments: vec![Segment::new(0, 0, height)],
            height,
            width,
        }
    }

    /// Builds a skyline from explicit segments, checking the invariants.
    pub fn from_segments(height: Coord, width: Coord, segments: Vec<Segment>) -> Result<Self> {
        let skyline = Self {
            segments,
            height,
            width,
        };
        skyline.check_consistency()?;
        Ok(skyline)
    }

    /// Segments from top to bottom.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if there are no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Strip height.
    pub fn height(&self) -> Coord {
        self.height
    }

    /// Trial width.
    pub fn width(&self) -> Coord {
        self.width
    }

    /// Area behind the frontier (placed area plus committed waste).
    pub fn area(&self) -> Coord {
        self.segments.iter().map(Segment::area).sum()
    }

    /// Shallowest depth; the baseline for the spread bound.
    pub fn min_depth(&self) -> Coord {
        self.segments.iter().map(Segment::depth).min().unwrap_or(0)
    }

    /// Deepest depth.
    pub fn max_depth(&self) -> Coord {
        self.segments.iter().map(Segment::depth).max().unwrap_or(0)
    }

    /// Every anchor point where a rectangle could be seated.
    ///
    /// The top of the first segment and the bottom of the last, plus the
    /// shallow side of each step between neighbours. Points already at the
    /// trial width are skipped.
    pub fn candidate_points(&self) -> Vec<AnchorPoint> {
        let mut points = Vec::with_capacity(self.segments.len() + 1);
        let (Some(first), Some(last)) = (self.segments.first(), self.segments.last()) else {
            return points;
        };

        if first.depth() < self.width {
            points.push(first.upper_end);
        }
        for pair in self.segments.windows(2) {
            let (above, below) = (&pair[0], &pair[1]);
            match above.depth().cmp(&below.depth()) {
                Ordering::Less if above.depth() < self.width => points.push(above.lower_end),
                Ordering::Greater if below.depth() < self.width => points.push(below.upper_end),
                _ => {}
            }
        }
        if last.depth() < self.width {
            points.push(last.lower_end);
        }
        points
    }

    /// Index of the segment whose matching endpoint is `point`.
    pub fn segment_index(&self, point: &AnchorPoint) -> Option<usize> {
        self.segments.iter().position(|s| s.owns(point))
    }

    /// True when a rectangle of `width` at `point` would run more than
    /// `max_spread` ahead of the shallowest column.
    pub fn spread_violated(
        &self,
        width: Coord,
        point: &AnchorPoint,
        max_spread: Option<Coord>,
    ) -> bool {
        match max_spread {
            Some(spread) => point.x + width - self.min_depth() > spread,
            None => false,
        }
    }

    /// True if a `w` x `h` rectangle seated at `point` stays inside the strip
    /// and clears every segment its band crosses.
    pub fn fits(&self, w: Coord, h: Coord, point: &AnchorPoint) -> bool {
        let (top, bottom) = point.span(h);
        if top < 0 || bottom > self.height || point.x + w > self.width {
            return false;
        }
        self.segments
            .iter()
            .skip_while(|s| s.bottom() <= top)
            .take_while(|s| s.top() < bottom)
            .all(|s| s.depth() <= point.x)
    }

    /// Seats `rect` (in its current orientation) at `point` and updates the
    /// frontier. Returns the index of the segment the rectangle created.
    ///
    /// The caller is responsible for checking [`Skyline::fits`] first.
    pub fn place(&mut self, rect: &mut Rectangle, point: AnchorPoint) -> Result<usize> {
        let idx = self.segment_index(&point).ok_or_else(|| {
            Error::Internal(format!(
                "anchor ({}, {}) is not an endpoint of any segment",
                point.x, point.y
            ))
        })?;

        let depth = self.segments[idx].depth();
        let length = self.segments[idx].length();
        let (top, bottom) = point.span(rect.height);
        let placed = Segment::new(depth + rect.width, top, bottom);
        rect.place_at(depth, top);

        let new_index = match length.cmp(&rect.height) {
            Ordering::Greater => {
                if point.is_upper_anchor {
                    self.segments[idx].set_top(bottom);
                    self.segments.insert(idx, placed);
                    idx
                } else {
                    self.segments[idx].set_bottom(top);
                    self.segments.insert(idx + 1, placed);
                    idx + 1
                }
            }
            Ordering::Equal => {
                self.segments[idx] = placed;
                idx
            }
            Ordering::Less => {
                self.segments[idx] = placed;
                self.overrun(idx, rect.height - length, point.is_upper_anchor)?
            }
        };

        self.check_consistency()?;
        Ok(new_index)
    }

    /// Cuts `overrun` away from the neighbours of `idx` in the growth
    /// direction. Fully covered neighbours are removed; the first partly
    /// covered one keeps its surviving part at its old depth.
    fn overrun(&mut self, mut idx: usize, mut overrun: Coord, downward: bool) -> Result<usize> {
        while overrun > 0 {
            let neighbour = if downward {
                idx + 1
            } else {
                idx.checked_sub(1).ok_or_else(|| {
                    Error::Internal("placement overruns the top of the strip".into())
                })?
            };
            let Some(segment) = self.segments.get_mut(neighbour) else {
                return Err(Error::Internal(
                    "placement overruns the bottom of the strip".into(),
                ));
            };

            let length = segment.length();
            if length <= overrun {
                self.segments.remove(neighbour);
                if !downward {
                    idx -= 1;
                }
                overrun -= length;
            } else {
                if downward {
                    segment.set_top(segment.top() + overrun);
                } else {
                    segment.set_bottom(segment.bottom() - overrun);
                }
                overrun = 0;
            }
        }
        Ok(idx)
    }

    /// Fails if segment lengths no longer sum to the strip height.
    pub fn check_coverage(&self) -> Result<()> {
        let actual: Coord = self.segments.iter().map(Segment::length).sum();
        if actual != self.height {
            log::error!(
                "skyline coverage broken: {} segments sum to {}, height {}",
                self.segments.len(),
                actual,
                self.height
            );
            return Err(Error::InvariantViolation {
                expected: self.height,
                actual,
            });
        }
        Ok(())
    }

    /// Checks every invariant listed in the module docs.
    pub fn check_consistency(&self) -> Result<()> {
        if let Some(bad) = self.segments.iter().find(|s| !s.is_consistent()) {
            return Err(Error::Internal(format!(
                "segment endpoints disagree: {:?} / {:?}",
                bad.upper_end, bad.lower_end
            )));
        }
        let touching = self
            .segments
            .windows(2)
            .all(|pair| pair[0].bottom() == pair[1].top());
        let anchored = self.segments.first().map_or(false, |s| s.top() == 0);
        if !touching || !anchored {
            return Err(Error::Internal("skyline segments are not contiguous".into()));
        }
        self.check_coverage()
    }

    /// Merges neighbours at equal depth. Returns true if anything merged.
    pub fn merge_equal_depths(&mut self) -> bool {
        let before = self.segments.len();
        let mut merged: Vec<Segment> = Vec::with_capacity(before);
        for segment in self.segments.drain(..) {
            match merged.last_mut() {
                Some(prev) if prev.depth() == segment.depth() => prev.set_bottom(segment.bottom()),
                _ => merged.push(segment),
            }
        }
        self.segments = merged;
        self.segments.len() != before
    }

    /// Repairs the frontier against the rectangles still to be placed.
    ///
    /// Repeats until nothing changes: merge equal-depth neighbours, check
    /// coverage, then raise every well shorter than the smallest remaining
    /// height-axis dimension to its shallower neighbour. Depths only grow.
    pub fn repair(&mut self, remaining: &[Rectangle], rotation_allowed: bool) -> Result<()> {
        let threshold = DimensionStats::of(remaining, rotation_allowed).min_height();
        loop {
            let mut changed = self.merge_equal_depths();
            self.check_coverage()?;

            if let Some(threshold) = threshold {
                for i in 0..self.segments.len() {
                    if self.segments[i].length() >= threshold {
                        continue;
                    }
                    if let Some(target) = self.fill_depth(i) {
                        self.segments[i].set_depth(target);
                        changed = true;
                    }
                }
            }

            if !changed {
                return Ok(());
            }
        }
    }

    /// Depth a well at `i` would be raised to, if its neighbours are deeper.
    pub(crate) fn fill_depth(&self, i: usize) -> Option<Coord> {
        let above = i.checked_sub(1).map(|j| self.segments[j].depth());
        let below = self.segments.get(i + 1).map(Segment::depth);
        let target = match (above, below) {
            (Some(a), Some(b)) => a.min(b),
            (Some(d), None) | (None, Some(d)) => d,
            (None, None) => return None,
        };
        (target > self.segments[i].depth()).then_some(target)
    }
}

/// Smallest and second-smallest value of one dimension over a pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Extremes {
    smallest: Option<(usize, Coord)>,
    second: Option<Coord>,
}

impl Extremes {
    fn push(&mut self, index: usize, value: Coord) {
        match self.smallest {
            None => self.smallest = Some((index, value)),
            Some((_, s)) if value < s => {
                self.second = Some(s);
                self.smallest = Some((index, value));
            }
            _ => {
                if self.second.map_or(true, |t| value < t) {
                    self.second = Some(value);
                }
            }
        }
    }

    /// Smallest value in the pool.
    pub fn smallest(&self) -> Option<Coord> {
        self.smallest.map(|(_, v)| v)
    }

    /// Second smallest value (equal to the smallest on ties).
    pub fn second(&self) -> Option<Coord> {
        self.second
    }

    /// Smallest value among every pool entry other than `index`.
    pub fn smallest_excluding(&self, index: usize) -> Option<Coord> {
        match self.smallest {
            Some((i, _)) if i == index => self.second,
            other => other.map(|(_, v)| v),
        }
    }
}

/// Dimension extremes of the rectangles still to be placed.
///
/// With rotation every rectangle can present its shorter side along either
/// axis, so both axes use `min_side`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DimensionStats {
    /// Along the width axis.
    pub width: Extremes,
    /// Along the height axis.
    pub height: Extremes,
}

impl DimensionStats {
    /// Collects extremes over `pool`, indexed by pool position.
    pub fn of(pool: &[Rectangle], rotation_allowed: bool) -> Self {
        let mut stats = Self::default();
        for (i, r) in pool.iter().enumerate() {
            let (w, h) = if rotation_allowed {
                (r.min_side(), r.min_side())
            } else {
                (r.width, r.height)
            };
            stats.width.push(i, w);
            stats.height.push(i, h);
        }
        stats
    }

    /// Smallest height-axis dimension.
    pub fn min_height(&self) -> Option<Coord> {
        self.height.smallest()
    }
}
