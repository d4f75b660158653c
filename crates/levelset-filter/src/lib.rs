//! levelset-filter - Preprocessing filters for level-set segmentation
//!
//! This crate provides the operations that prepare feature images and
//! initial models before the level-set evolution:
//!
//! - Separable Gaussian smoothing with spacing-aware kernels
//! - Gradient anisotropic diffusion (edge-preserving smoothing)
//! - Gradients and gradient magnitude in physical units
//! - Canny edge detection
//! - Exact Euclidean and signed distance transforms
//! - Fast marching from seed points
//! - Binary thresholding
//!
//! All filters work on [`Field`](levelset_core::Field)s of any dimension.

pub mod convolve;
pub mod diffusion;
pub mod distance;
pub mod edge;
mod error;
pub mod fast_marching;
pub mod gradient;
pub mod kernel;
pub mod threshold;

pub use error::{FilterError, FilterResult};
pub use kernel::Kernel;

// Re-export commonly used functions
pub use convolve::{convolve_axis, convolve_separable, gaussian_smooth};
pub use diffusion::{DiffusionOptions, gradient_anisotropic_diffusion, stable_time_step};
pub use distance::{distance_transform, signed_distance};
pub use edge::{CannyOptions, canny_edges};
pub use fast_marching::{FastMarching, UNREACHED};
pub use gradient::{gradient, gradient_magnitude};
pub use threshold::binary_threshold;
