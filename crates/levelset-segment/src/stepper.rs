//! Numerical stepper
//!
//! One explicit Euler step over a set of nodes. Rates are evaluated from
//! the old buffer into a separate list, so node order and thread count do
//! not affect the result; the time step is reduced sequentially from that
//! list.

use crate::terms::{NodeUpdate, TermEvaluator};
use levelset_core::Grid;

/// Courant number of the explicit scheme
pub const COURANT_NUMBER: f64 = 0.5;

/// Evaluate the update of every node in `nodes`
#[cfg(feature = "parallel")]
pub fn evaluate_nodes(evaluator: &TermEvaluator<'_>, phi: &[f32], nodes: &[usize]) -> Vec<NodeUpdate> {
    use rayon::prelude::*;
    nodes
        .par_iter()
        .map(|&offset| evaluator.evaluate(phi, offset))
        .collect()
}

/// Evaluate the update of every node in `nodes`
#[cfg(not(feature = "parallel"))]
pub fn evaluate_nodes(evaluator: &TermEvaluator<'_>, phi: &[f32], nodes: &[usize]) -> Vec<NodeUpdate> {
    nodes
        .iter()
        .map(|&offset| evaluator.evaluate(phi, offset))
        .collect()
}

/// Stable time step for a set of updates
///
/// ```text
/// Δt = C / (max wave speed + 2 Z Σ 1/h_i²)
/// ```
///
/// with Courant number `C`. The curvature part is the explicit diffusion
/// bound. When every term is idle the step is `C · h_min`.
pub fn time_step(updates: &[NodeUpdate], grid: &Grid, curvature: Option<f32>) -> f64 {
    let max_wave = updates
        .iter()
        .map(|u| u.wave_speed as f64)
        .fold(0.0f64, f64::max);
    let diffusion = curvature.map_or(0.0, |z| {
        2.0 * z as f64 * grid.spacing().iter().map(|h| 1.0 / (h * h)).sum::<f64>()
    });
    let denominator = max_wave + diffusion;
    if denominator > 0.0 {
        COURANT_NUMBER / denominator
    } else {
        COURANT_NUMBER * grid.min_spacing()
    }
}

/// Write `phi + Δt · rate` for every node into `next`
pub fn apply(next: &mut [f32], phi: &[f32], nodes: &[usize], updates: &[NodeUpdate], dt: f64) {
    for (&offset, update) in nodes.iter().zip(updates) {
        next[offset] = (phi[offset] as f64 + dt * update.rate as f64) as f32;
    }
}
