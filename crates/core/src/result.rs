//! Solve result representation.

use crate::geometry::Coord;
use crate::parameters::Parameters;
use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result of a packing run: the parameters with placed rectangles plus the
/// achieved width.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Solution {
    /// Parameters whose rectangles carry the final positions.
    pub parameters: Parameters,

    /// Achieved strip width.
    pub width: Coord,

    /// Computation time in milliseconds.
    pub computation_time_ms: u64,

    /// Number of widths probed.
    pub probes: u32,

    /// Per-probe effort budget in use when the search finished.
    pub effort: usize,

    /// Whether the search was cut short by a time limit or cancellation.
    pub cancelled: bool,
}

impl Solution {
    /// Wraps placed parameters and their width.
    pub fn new(parameters: Parameters, width: Coord) -> Self {
        Self {
            parameters,
            width,
            computation_time_ms: 0,
            probes: 0,
            effort: 0,
            cancelled: false,
        }
    }

    /// Returns true if every rectangle has a position.
    pub fn all_placed(&self) -> bool {
        self.parameters.rectangles.iter().all(|r| r.placed)
    }

    /// Returns the number of placed rectangles.
    pub fn placed_count(&self) -> usize {
        self.parameters.rectangles.iter().filter(|r| r.placed).count()
    }

    /// Rectangle area over strip area (0.0 - 1.0).
    pub fn utilization(&self) -> f64 {
        let strip = self.width * self.parameters.height;
        if strip <= 0 {
            return 0.0;
        }
        self.parameters.total_area() as f64 / strip as f64
    }

    /// Returns utilization as a percentage string.
    pub fn utilization_percent(&self) -> String {
        format!("{:.1}%", self.utilization() * 100.0)
    }

    /// Checks that all rectangles are placed inside the strip without overlap.
    pub fn validate_layout(&self) -> Result<()> {
        let rects = &self.parameters.rectangles;
        for r in rects {
            if !r.placed {
                log::warn!("layout check: rectangle {} is not placed", r.id);
                return Err(Error::Internal(format!("rectangle {} is not placed", r.id)));
            }
            if r.x < 0 || r.y < 0 || r.right() > self.width || r.bottom() > self.parameters.height
            {
                log::warn!(
                    "layout check: rectangle {} at ({}, {}) leaves the strip",
                    r.id,
                    r.x,
                    r.y
                );
                return Err(Error::Internal(format!(
                    "rectangle {} at ({}, {}) size {}x{} leaves the {}x{} strip",
                    r.id, r.x, r.y, r.width, r.height, self.width, self.parameters.height
                )));
            }
        }
        for (i, a) in rects.iter().enumerate() {
            for b in &rects[i + 1..] {
                if a.overlaps(b) {
                    log::warn!("layout check: rectangles {} and {} overlap", a.id, b.id);
                    return Err(Error::Internal(format!(
                        "rectangles {} and {} overlap",
                        a.id, b.id
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Summary statistics for a solution.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolveSummary {
    /// Number of rectangles.
    pub rectangles: usize,
    /// Achieved width.
    pub width: Coord,
    /// Utilization percentage.
    pub utilization_percent: f64,
    /// Widths probed.
    pub probes: u32,
    /// Computation time in milliseconds.
    pub time_ms: u64,
}

impl From<&Solution> for SolveSummary {
    fn from(solution: &Solution) -> Self {
        Self {
            rectangles: solution.parameters.len(),
            width: solution.width,
            utilization_percent: solution.utilization() * 100.0,
            probes: solution.probes,
            time_ms: solution.computation_time_ms,
        }
    }
}
