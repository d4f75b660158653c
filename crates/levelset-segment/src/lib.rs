//! levelset-segment - Level-set evolution engine and segmentation pipelines
//!
//! This crate evolves an implicit surface, the zero crossing of a level
//! set, under the equation
//!
//! ```text
//! dφ/dt = -P s |∇φ| - A a·∇φ + Z κ |∇φ|
//! ```
//!
//! where `s` is a speed image, `a` an advection field and `κ` the mean
//! curvature of the level sets. φ is negative inside the front.
//!
//! - **Parameters** - term weights, convergence limits and the narrow band
//! - **Feature models** - threshold and Canny speed/advection builders
//! - **Engine** - narrow band, upwind stepper, reinitialization and
//!   convergence monitoring
//! - **Pipelines** - preprocessing and initial models around the engine
//!
//! # Examples
//!
//! ## Growing a region from a seed
//!
//! ```
//! use levelset_core::{Field, Grid};
//! use levelset_segment::{RunStatus, threshold_segmentation};
//!
//! let grid = Grid::new(&[32, 32]).unwrap();
//! let image = Field::from_fn(grid, |c| {
//!     let (x, y) = (c[0] as f64 - 15.5, c[1] as f64 - 15.5);
//!     if x * x + y * y <= 64.0 { 100.0 } else { 10.0 }
//! });
//!
//! let pipeline = threshold_segmentation(vec![vec![16, 16]], 3.0, 50.0, 150.0, 1.0);
//! let result = pipeline.run(&image).unwrap();
//! assert_eq!(result.status(), RunStatus::Converged);
//!
//! let mask = result.binary_mask(255.0, 0.0);
//! assert_eq!(mask.get(&[16, 16]).unwrap(), 255.0);
//! assert_eq!(mask.get(&[1, 1]).unwrap(), 0.0);
//! ```

pub mod band;
pub mod convergence;
pub mod engine;
mod error;
pub mod feature;
pub mod params;
pub mod pipeline;
pub mod reinit;
pub mod stepper;
pub mod terms;

pub use error::{SegmentError, SegmentResult};

pub use convergence::{ConvergenceMonitor, IterationRecord, RunStatus};
pub use engine::{CancelToken, LevelSetEngine, SegmentationResult};
pub use feature::{FeatureModel, FeatureTerms};
pub use params::{Parameters, TermSet};
pub use pipeline::{
    InitialModel, PreprocessStage, SegmentationPipeline, canny_segmentation,
    threshold_segmentation,
};
pub use reinit::reinitialize;
pub use terms::{NodeUpdate, TermEvaluator};
