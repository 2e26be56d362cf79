//! # U-Strip Core
//!
//! Core types and traits for the U-Strip strip packing engine.
//!
//! This crate provides the types shared between solvers: rectangles and
//! anchor points, problem parameters, solutions, the [`Solver`] contract and
//! its [`Config`].
//!
//! ## Configuration
//!
//! ```rust
//! use u_strip_core::{Config, Parameters};
//!
//! let config = Config::new()
//!     .with_time_limit(5000)
//!     .with_max_spread(40)
//!     .with_initial_effort(8);
//!
//! let params = Parameters::new(10)
//!     .with_rotation(true)
//!     .with_rectangles([(4, 6), (4, 4), (3, 10)]);
//! assert_eq!(params.total_area(), 70);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support

pub mod error;
pub mod geometry;
pub mod observer;
pub mod parameters;
pub mod result;
pub mod solver;

// Re-exports
pub use error::{Error, Result};
pub use geometry::{AnchorPoint, Coord, RectId, Rectangle};
pub use observer::{PlacementEvent, PlacementLog, PlacementObserver};
pub use parameters::{HeightVariant, Parameters};
pub use result::{Solution, SolveSummary};
pub use solver::{Config, ProgressCallback, ProgressInfo, Solver};
