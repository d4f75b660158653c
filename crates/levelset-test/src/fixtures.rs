//! Synthetic fields for regression tests
//!
//! All generators take node coordinates in index units; spacing is applied
//! by the caller through [`Field::with_spacing`] when needed.

use levelset_core::{Field, Grid};

fn squared_distance(coord: &[usize], center: &[f64]) -> f64 {
    coord
        .iter()
        .zip(center)
        .map(|(&c, &m)| (c as f64 - m) * (c as f64 - m))
        .sum()
}

fn unit_grid(dims: &[usize]) -> Grid {
    Grid::new(dims).expect("fixture dims must be non-empty and positive")
}

/// Disk (2D) or ball (N-D) of `inside` intensity on an `outside` background
pub fn disk_image(dims: &[usize], center: &[f64], radius: f64, inside: f32, outside: f32) -> Field {
    let r2 = radius * radius;
    Field::from_fn(unit_grid(dims), |c| {
        if squared_distance(c, center) <= r2 {
            inside
        } else {
            outside
        }
    })
}

/// Binary mask: 1.0 inside the ball, 0.0 outside
pub fn disk_mask(dims: &[usize], center: &[f64], radius: f64) -> Field {
    disk_image(dims, center, radius, 1.0, 0.0)
}

/// Exact signed distance to a sphere: negative inside, positive outside
pub fn sphere_level_set(dims: &[usize], center: &[f64], radius: f64) -> Field {
    Field::from_fn(unit_grid(dims), |c| {
        (squared_distance(c, center).sqrt() - radius) as f32
    })
}

/// Intensity decreasing linearly with distance from `center`
///
/// The value is `peak - slope * |x - center|`.
pub fn radial_ramp(dims: &[usize], center: &[f64], peak: f32, slope: f32) -> Field {
    Field::from_fn(unit_grid(dims), |c| {
        peak - slope * squared_distance(c, center).sqrt() as f32
    })
}

/// Step edge along axis 0: `low` for `x < position`, `high` otherwise
pub fn step_image(dims: &[usize], position: usize, low: f32, high: f32) -> Field {
    Field::from_fn(unit_grid(dims), |c| if c[0] < position { low } else { high })
}

/// Number of nodes with a value strictly below zero
pub fn inside_count(level_set: &Field) -> usize {
    level_set.count_below(0.0)
}
