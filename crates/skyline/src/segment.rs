//! Skyline segments.

use u_strip_core::{AnchorPoint, Coord};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A height band of the skyline at one uniform depth.
///
/// Both endpoints carry the depth in `x`; between engine operations
/// `upper_end.x == lower_end.x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Segment {
    /// Endpoint with the smaller `y`.
    pub upper_end: AnchorPoint,
    /// Endpoint with the larger `y`.
    pub lower_end: AnchorPoint,
}

impl Segment {
    /// Creates a segment covering `[top, bottom]` at `depth`.
    pub fn new(depth: Coord, top: Coord, bottom: Coord) -> Self {
        Self {
            upper_end: AnchorPoint::upper(depth, top),
            lower_end: AnchorPoint::lower(depth, bottom),
        }
    }

    /// Depth reached by this band.
    pub fn depth(&self) -> Coord {
        self.upper_end.x
    }

    /// Top of the band.
    pub fn top(&self) -> Coord {
        self.upper_end.y
    }

    /// Bottom of the band.
    pub fn bottom(&self) -> Coord {
        self.lower_end.y
    }

    /// Length along the height axis.
    pub fn length(&self) -> Coord {
        self.lower_end.y - self.upper_end.y
    }

    /// Area behind the band.
    pub fn area(&self) -> Coord {
        self.length() * self.depth()
    }

    /// Moves both endpoints to a new depth.
    pub fn set_depth(&mut self, depth: Coord) {
        self.upper_end.x = depth;
        self.lower_end.x = depth;
    }

    /// Moves the top endpoint, keeping the bottom.
    pub fn set_top(&mut self, top: Coord) {
        self.upper_end.y = top;
    }

    /// Moves the bottom endpoint, keeping the top.
    pub fn set_bottom(&mut self, bottom: Coord) {
        self.lower_end.y = bottom;
    }

    /// Returns true if `point` is the endpoint matching its own orientation.
    pub fn owns(&self, point: &AnchorPoint) -> bool {
        let end = if point.is_upper_anchor {
            &self.upper_end
        } else {
            &self.lower_end
        };
        end.x == point.x && end.y == point.y
    }

    /// Returns true if the band intersects the open interval `(top, bottom)`.
    pub fn intersects(&self, top: Coord, bottom: Coord) -> bool {
        self.top() < bottom && top < self.bottom()
    }

    /// Both endpoints share one depth.
    pub fn is_consistent(&self) -> bool {
        self.upper_end.x == self.lower_end.x && self.upper_end.y <= self.lower_end.y
    }
}
