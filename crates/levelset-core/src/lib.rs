//! Levelset Core - Basic data structures for level-set segmentation
//!
//! This crate provides the fundamental data structures shared by the
//! preprocessing filters, the evolution engine and the I/O layer:
//!
//! - [`Grid`] - N-dimensional shape with per-axis spacing
//! - [`Field`] - Dense floating-point scalar field over a grid
//! - [`VectorField`] - Dense vector field (one component per axis)
//!
//! # Examples
//!
//! ```
//! use levelset_core::{Field, Grid};
//!
//! let grid = Grid::with_spacing(&[64, 48], &[1.0, 0.5]).unwrap();
//! let mut field = Field::from_grid(grid);
//! field.set(&[10, 20], 2.5).unwrap();
//! assert_eq!(field.get(&[10, 20]).unwrap(), 2.5);
//! ```

pub mod error;
pub mod field;
pub mod grid;
pub mod vector;

pub use error::{Error, Result};
pub use field::Field;
pub use grid::Grid;
pub use vector::VectorField;
