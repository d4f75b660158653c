//! Image gradients in physical units
//!
//! Interior nodes use central differences; nodes on the border fall back
//! to one-sided differences along the affected axis.

use levelset_core::{Field, VectorField};

/// Derivative of `field` along `axis` at a linear offset
#[inline]
pub fn derivative_at(field: &Field, offset: usize, axis: usize) -> f32 {
    let grid = field.grid();
    let plus = grid.neighbor(offset, axis, 1);
    let minus = grid.neighbor(offset, axis, -1);
    let nodes = (grid.axis_index(plus, axis) - grid.axis_index(minus, axis)) as f64;
    if nodes == 0.0 {
        return 0.0;
    }
    let h = grid.spacing()[axis] * nodes;
    ((field.get_at(plus) - field.get_at(minus)) as f64 / h) as f32
}

/// Gradient vector at every node
pub fn gradient(field: &Field) -> VectorField {
    let grid = field.grid().clone();
    let ndim = grid.ndim();
    let mut out = VectorField::new(grid);
    let mut g = vec![0.0f32; ndim];
    for offset in 0..field.len() {
        for (axis, gi) in g.iter_mut().enumerate() {
            *gi = derivative_at(field, offset, axis);
        }
        out.set(offset, &g);
    }
    out
}

/// Euclidean norm of the gradient at every node
pub fn gradient_magnitude(field: &Field) -> Field {
    let mut out = field.create_template();
    let ndim = field.ndim();
    for (offset, value) in out.data_mut().iter_mut().enumerate() {
        let sq: f32 = (0..ndim)
            .map(|axis| derivative_at(field, offset, axis).powi(2))
            .sum();
        *value = sq.sqrt();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use levelset_core::Grid;

    #[test]
    fn test_linear_ramp_gradient() {
        let grid = Grid::with_spacing(&[6, 5], &[0.5, 2.0]).unwrap();
        // f = 3x + y in index units
        let field = Field::from_fn(grid, |c| 3.0 * c[0] as f32 + c[1] as f32);
        let g = gradient(&field);
        for offset in 0..field.len() {
            let v = g.get(offset);
            assert!((v[0] - 6.0).abs() < 1e-5);
            assert!((v[1] - 0.5).abs() < 1e-5);
        }
    }

    #[test]
    fn test_magnitude() {
        let grid = Grid::new(&[5, 5]).unwrap();
        let field = Field::from_fn(grid, |c| 3.0 * c[0] as f32 + 4.0 * c[1] as f32);
        let mag = gradient_magnitude(&field);
        assert!((mag.get(&[2, 2]).unwrap() - 5.0).abs() < 1e-5);
        assert!((mag.get(&[0, 4]).unwrap() - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_single_node_axis() {
        let field = Field::new_with_value(&[1, 4], 2.0).unwrap();
        assert_eq!(derivative_at(&field, 0, 0), 0.0);
    }
}
