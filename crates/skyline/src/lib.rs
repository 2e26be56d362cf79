//! # U-Strip Skyline
//!
//! Skyline placement engine and width optimizer for the U-Strip strip
//! packing engine.
//!
//! The strip has a fixed height and grows along the width axis. A
//! [`Skyline`] tracks how far the packing has reached in every height band;
//! the [`PlacementDecision`] picks the next rectangle and anchor by local
//! waste; the [`WidthOptimizer`] binary-searches the narrowest width at which
//! a [`SequencingStrategy`] finds an ordering that packs.
//!
//! ## Quick Start
//!
//! ```rust
//! use u_strip_skyline::{Parameters, SkylinePacker, Solver};
//!
//! let params = Parameters::new(10).with_rectangles([(4, 6), (4, 4)]);
//! let solution = SkylinePacker::default_config().solve(params)?;
//! assert_eq!(solution.width, 4);
//! assert!(solution.all_placed());
//! # Ok::<(), u_strip_skyline::Error>(())
//! ```

pub mod bounds;
pub mod decision;
pub mod optimizer;
pub mod packer;
pub mod segment;
pub mod sequencing;
pub mod skyline;

// Re-exports
pub use bounds::{side_by_side, trivial_upper_bound, LowerBounds};
pub use decision::{Candidate, Outcome, PlacementDecision, Score};
pub use optimizer::{SearchOutcome, WidthOptimizer};
pub use packer::SkylinePacker;
pub use segment::Segment;
pub use sequencing::{
    Perturbation, PerturbationSearch, SeedOrder, SequencingProblem, SequencingStrategy,
};
pub use skyline::{DimensionStats, Extremes, Skyline};
pub use u_strip_core::{
    AnchorPoint, Config, Coord, Error, HeightVariant, Parameters, PlacementEvent, PlacementLog,
    PlacementObserver, Rectangle, Result, Solution, Solver,
};
