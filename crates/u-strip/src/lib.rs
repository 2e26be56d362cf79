//! # U-Strip
//!
//! 2D rectangle strip packing: place every rectangle inside a strip of fixed
//! height without overlap, keeping the used width as small as possible.
//!
//! ## Quick Start
//!
//! ```rust
//! use u_strip::skyline::SkylinePacker;
//! use u_strip::{Config, Parameters, Solver};
//!
//! let params = Parameters::new(10)
//!     .with_rotation(true)
//!     .with_rectangles([(4, 6), (4, 4), (2, 10)]);
//! let packer = SkylinePacker::new(Config::default().with_time_limit(1000));
//! let solution = packer.solve(params)?;
//! assert!(solution.all_placed());
//! assert!(solution.width >= 6);
//! # Ok::<(), u_strip::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `skyline` (default): the skyline engine and width optimizer
//! - `serde`: Serialization support

/// Core types and the solver contract.
pub use u_strip_core as core;

/// Skyline engine.
#[cfg(feature = "skyline")]
pub use u_strip_skyline as skyline;

// Re-export commonly used types at root level
pub use u_strip_core::{Config, Error, Parameters, Result, Solution, Solver};
