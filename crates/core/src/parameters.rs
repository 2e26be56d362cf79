//! Problem parameters handed to a solver.

use crate::geometry::{Coord, Rectangle};
use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Whether the strip height is a hard bound or itself subject to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HeightVariant {
    /// The height is given and fixed.
    #[default]
    Fixed,
    /// The height may be chosen freely.
    Free,
}

/// A strip packing instance.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Parameters {
    /// Height bound of the strip.
    pub height: Coord,
    /// Whether rectangles may be turned by 90 degrees.
    pub rotation_allowed: bool,
    /// Fixed or free height.
    pub height_variant: HeightVariant,
    /// Rectangles in input order.
    pub rectangles: Vec<Rectangle>,
}

impl Parameters {
    /// Creates an empty fixed-height instance.
    pub fn new(height: Coord) -> Self {
        Self {
            height,
            rotation_allowed: false,
            height_variant: HeightVariant::Fixed,
            rectangles: Vec::new(),
        }
    }

    /// Sets whether rotation is allowed.
    pub fn with_rotation(mut self, allowed: bool) -> Self {
        self.rotation_allowed = allowed;
        self
    }

    /// Sets the height variant.
    pub fn with_variant(mut self, variant: HeightVariant) -> Self {
        self.height_variant = variant;
        self
    }

    /// Appends a rectangle; its id is its position in the input.
    pub fn with_rectangle(mut self, width: Coord, height: Coord) -> Self {
        let id = self.rectangles.len();
        self.rectangles.push(Rectangle::new(id, width, height));
        self
    }

    /// Appends rectangles given as `(width, height)` pairs.
    pub fn with_rectangles(mut self, sizes: impl IntoIterator<Item = (Coord, Coord)>) -> Self {
        for (w, h) in sizes {
            self = self.with_rectangle(w, h);
        }
        self
    }

    /// Number of rectangles.
    pub fn len(&self) -> usize {
        self.rectangles.len()
    }

    /// Returns true if there are no rectangles.
    pub fn is_empty(&self) -> bool {
        self.rectangles.is_empty()
    }

    /// Sum of rectangle areas.
    pub fn total_area(&self) -> Coord {
        self.rectangles.iter().map(Rectangle::area).sum()
    }

    /// Sorts rectangles back into input order.
    pub fn restore_input_order(&mut self) {
        self.rectangles.sort_by_key(|r| r.id);
    }

    /// Checks the instance before any work starts.
    pub fn validate(&self) -> Result<()> {
        if self.height <= 0 {
            return Err(Error::UnsupportedParameters(format!(
                "height must be positive, got {}",
                self.height
            )));
        }
        if self.rectangles.is_empty() {
            return Err(Error::UnsupportedParameters(
                "at least one rectangle is required".into(),
            ));
        }
        for rect in &self.rectangles {
            rect.validate()?;
            let fits = if self.rotation_allowed {
                rect.min_side() <= self.height
            } else {
                rect.height <= self.height
            };
            if !fits {
                return Err(Error::InvalidRectangle(format!(
                    "rectangle {} ({}x{}) cannot fit height {}",
                    rect.id, rect.width, rect.height, self.height
                )));
            }
        }
        Ok(())
    }
}
