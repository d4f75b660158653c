//! Binary thresholding

use crate::{FilterError, FilterResult};
use levelset_core::Field;

/// Map values in `[lower, upper]` to `inside` and everything else to `outside`
///
/// # Errors
///
/// Returns `FilterError::InvalidParameters` if `lower > upper` or either
/// bound is NaN.
pub fn binary_threshold(
    field: &Field,
    lower: f32,
    upper: f32,
    inside: f32,
    outside: f32,
) -> FilterResult<Field> {
    if !(lower <= upper) {
        return Err(FilterError::InvalidParameters(format!(
            "lower threshold {lower} above upper threshold {upper}"
        )));
    }
    Ok(field.map(|v| {
        if v >= lower && v <= upper {
            inside
        } else {
            outside
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use levelset_core::Grid;

    #[test]
    fn test_bounds_inclusive() {
        let grid = Grid::new(&[5]).unwrap();
        let field = Field::from_data(grid, vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        let out = binary_threshold(&field, 2.0, 4.0, 1.0, 0.0).unwrap();
        assert_eq!(out.data(), &[0.0, 1.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_inverted_bounds() {
        let field = Field::new(&[3]).unwrap();
        assert!(binary_threshold(&field, 4.0, 2.0, 1.0, 0.0).is_err());
    }
}
