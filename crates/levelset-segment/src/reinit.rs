//! Reinitialization to a signed distance function
//!
//! Front nodes get their sub-cell distance to the interpolated zero
//! crossing; fast marching then carries the distance outward. Every node
//! keeps its sign, so the set of inside nodes is unchanged and the front
//! stays within the same cell.

use crate::SegmentResult;
use crate::band::{is_inside, on_front};
use levelset_core::Grid;
use levelset_filter::FastMarching;

/// Replace `phi` by the signed distance to its zero crossing
///
/// Magnitudes are clamped to `limit`. Returns the number of front nodes; a
/// field without a front becomes `±limit` everywhere, or is left alone when
/// `limit` is infinite.
pub fn reinitialize(grid: &Grid, phi: &mut [f32], limit: f32) -> SegmentResult<usize> {
    let front: Vec<(usize, f64)> = (0..phi.len())
        .filter(|&o| on_front(grid, phi, o))
        .map(|o| (o, front_distance(grid, phi, o)))
        .collect();

    if front.is_empty() {
        if !limit.is_finite() {
            return Ok(0);
        }
        for v in phi.iter_mut() {
            *v = if is_inside(*v) { -limit } else { limit };
        }
        return Ok(0);
    }

    let count = front.len();
    let distance = FastMarching::new(grid.clone())
        .with_alive_points(front)?
        .with_stopping_value(limit as f64)
        .run()?;

    for (v, &d) in phi.iter_mut().zip(distance.data()) {
        let magnitude = d.min(limit);
        *v = if is_inside(*v) { -magnitude } else { magnitude };
    }
    Ok(count)
}

/// Distance from a front node to the linearly interpolated crossing
///
/// Along each axis the crossing toward the nearest opposite-sign neighbor
/// is at `h φ / (φ - φ_n)`; the per-axis distances combine as
/// `1 / sqrt(Σ 1 / d_i²)`.
fn front_distance(grid: &Grid, phi: &[f32], offset: usize) -> f64 {
    let value = phi[offset] as f64;
    let inside = is_inside(phi[offset]);
    let mut inv_sq = 0.0f64;
    for axis in 0..grid.ndim() {
        let h = grid.spacing()[axis];
        let mut best = f64::INFINITY;
        for step in [-1isize, 1] {
            let Some(n) = grid.neighbor_checked(offset, axis, step) else {
                continue;
            };
            if is_inside(phi[n]) == inside {
                continue;
            }
            let other = phi[n] as f64;
            best = best.min(h * value / (value - other));
        }
        if best == 0.0 {
            return 0.0;
        }
        if best.is_finite() {
            inv_sq += 1.0 / (best * best);
        }
    }
    1.0 / inv_sq.sqrt()
}
