//! Rectangles and anchor points.
//!
//! The strip is laid out with the fixed height along `y` and the width being
//! minimised along `x`. Skyline depth is measured along `x`.

use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Integer coordinate, length and area type.
pub type Coord = i64;

/// Stable rectangle identifier (its index in the input order).
pub type RectId = usize;

/// A rectangle to be packed.
///
/// Two rectangles with equal dimensions are still distinct entities; the
/// `id` is what identifies them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rectangle {
    /// Stable identifier, used to restore input order.
    pub id: RectId,
    /// Extent along the width axis (x).
    pub width: Coord,
    /// Extent along the height axis (y).
    pub height: Coord,
    /// Position assigned by the engine.
    pub x: Coord,
    /// Position assigned by the engine.
    pub y: Coord,
    /// Whether the rectangle is turned by 90 degrees from its input.
    pub rotated: bool,
    /// Whether the engine has assigned a position.
    pub placed: bool,
}

impl Rectangle {
    /// Creates an unplaced rectangle.
    pub fn new(id: RectId, width: Coord, height: Coord) -> Self {
        Self {
            id,
            width,
            height,
            x: 0,
            y: 0,
            rotated: false,
            placed: false,
        }
    }

    /// Returns the area.
    pub fn area(&self) -> Coord {
        self.width * self.height
    }

    /// Returns the shorter side.
    pub fn min_side(&self) -> Coord {
        self.width.min(self.height)
    }

    /// Returns the longer side.
    pub fn max_side(&self) -> Coord {
        self.width.max(self.height)
    }

    /// Returns true for squares, where rotation changes nothing.
    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    /// Turns the rectangle by 90 degrees.
    pub fn rotate(&mut self) {
        std::mem::swap(&mut self.width, &mut self.height);
        self.rotated = !self.rotated;
    }

    /// Returns a copy in the requested orientation relative to the input.
    pub fn oriented(&self, rotated: bool) -> Self {
        let mut r = self.clone();
        if r.rotated != rotated {
            r.rotate();
        }
        r
    }

    /// Assigns the position and marks the rectangle as placed.
    pub fn place_at(&mut self, x: Coord, y: Coord) {
        self.x = x;
        self.y = y;
        self.placed = true;
    }

    /// Clears the placement and restores the input orientation.
    pub fn reset(&mut self) {
        if self.rotated {
            self.rotate();
        }
        self.x = 0;
        self.y = 0;
        self.placed = false;
    }

    /// Right edge (`x + width`).
    pub fn right(&self) -> Coord {
        self.x + self.width
    }

    /// Bottom edge (`y + height`).
    pub fn bottom(&self) -> Coord {
        self.y + self.height
    }

    /// Returns true if the interiors of two placed rectangles intersect.
    pub fn overlaps(&self, other: &Rectangle) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Checks that both dimensions are positive.
    pub fn validate(&self) -> Result<()> {
        if self.width <= 0 || self.height <= 0 {
            return Err(Error::InvalidRectangle(format!(
                "rectangle {} has non-positive size {}x{}",
                self.id, self.width, self.height
            )));
        }
        Ok(())
    }
}

/// A point on the skyline where a rectangle may be seated.
///
/// An upper anchor grows toward increasing `y` from the point; a lower
/// anchor grows toward decreasing `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnchorPoint {
    /// Depth along the width axis.
    pub x: Coord,
    /// Position along the height axis.
    pub y: Coord,
    /// Growth direction.
    pub is_upper_anchor: bool,
}

impl AnchorPoint {
    /// Anchor at the upper end of a segment.
    pub fn upper(x: Coord, y: Coord) -> Self {
        Self {
            x,
            y,
            is_upper_anchor: true,
        }
    }

    /// Anchor at the lower end of a segment.
    pub fn lower(x: Coord, y: Coord) -> Self {
        Self {
            x,
            y,
            is_upper_anchor: false,
        }
    }

    /// Height band `(top, bottom)` covered by a rectangle of height `h`
    /// seated here.
    pub fn span(&self, h: Coord) -> (Coord, Coord) {
        if self.is_upper_anchor {
            (self.y, self.y + h)
        } else {
            (self.y - h, self.y)
        }
    }
}
