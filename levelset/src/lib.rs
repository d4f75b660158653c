//! levelset - N-dimensional level-set segmentation for Rust
//!
//! # Overview
//!
//! An implicit-surface segmentation engine: a front, the zero crossing of
//! a level-set field, grows or shrinks under propagation, curvature and
//! advection terms derived from a feature image until it settles on the
//! structure of interest.
//!
//! - Scalar and vector fields of any dimension with per-axis spacing
//! - Field I/O (PNG, PGM, float TIFF, native format)
//! - Preprocessing (diffusion, smoothing, Canny edges, distance maps, fast
//!   marching)
//! - The level-set engine with narrow band, reinitialization and
//!   convergence monitoring
//!
//! # Example
//!
//! ```
//! use levelset::{Field, Grid};
//! use levelset::segment::{FeatureTerms, LevelSetEngine, Parameters};
//!
//! let grid = Grid::new(&[20, 20]).unwrap();
//! let initial = Field::from_fn(grid, |c| {
//!     let (x, y) = (c[0] as f32 - 10.0, c[1] as f32 - 10.0);
//!     (x * x + y * y).sqrt() - 4.0
//! });
//! let speed = Field::new_with_value(&[20, 20], 1.0).unwrap();
//!
//! let engine = LevelSetEngine::new(Parameters::new().with_number_of_iterations(3)).unwrap();
//! let result = engine.run(&initial, &FeatureTerms::new(speed)).unwrap();
//! assert_eq!(result.field().dims(), &[20, 20]);
//! ```

// Re-export core types (primary data structures used everywhere)
pub use levelset_core::*;

// Re-export domain crates as modules to avoid name conflicts
pub use levelset_filter as filter;
pub use levelset_io as io;
pub use levelset_segment as segment;
