//! Separable convolution and Gaussian smoothing
//!
//! Borders are handled by replication: a tap that falls outside the grid
//! reads the nearest node on the edge.

use crate::kernel::Kernel;
use crate::FilterResult;
use levelset_core::Field;

/// Convolve a field with a 1D kernel along one axis
///
/// # Panics
///
/// Panics if `axis >= field.ndim()`.
pub fn convolve_axis(field: &Field, axis: usize, kernel: &Kernel) -> Field {
    if kernel.radius() == 0 {
        let scale = kernel.data()[0];
        return field.map(|v| v * scale);
    }

    let grid = field.grid();
    let src = field.data();
    let n = grid.dims()[axis] as isize;
    let stride = grid.strides()[axis] as isize;
    let r = kernel.radius() as isize;
    let taps = kernel.data();

    let mut out = field.create_template();
    for (offset, value) in out.data_mut().iter_mut().enumerate() {
        let i = grid.axis_index(offset, axis) as isize;
        let base = offset as isize - i * stride;
        let mut sum = 0.0f32;
        for (k, &w) in taps.iter().enumerate() {
            let j = (i + k as isize - r).clamp(0, n - 1);
            sum += w * src[(base + j * stride) as usize];
        }
        *value = sum;
    }
    out
}

/// Apply one kernel per axis in sequence
///
/// # Errors
///
/// Returns `FilterError::InvalidKernel` if the number of kernels differs
/// from the number of axes.
pub fn convolve_separable(field: &Field, kernels: &[Kernel]) -> FilterResult<Field> {
    if kernels.len() != field.ndim() {
        return Err(crate::FilterError::InvalidKernel(format!(
            "need {} kernels, got {}",
            field.ndim(),
            kernels.len()
        )));
    }
    let mut out = field.clone();
    for (axis, kernel) in kernels.iter().enumerate() {
        out = convolve_axis(&out, axis, kernel);
    }
    Ok(out)
}

/// Gaussian smoothing with the given variance in physical units
///
/// The kernel along each axis is scaled by that axis's spacing, so the
/// blur is isotropic in physical space.
///
/// # Errors
///
/// Returns `FilterError::InvalidParameters` for a negative variance.
pub fn gaussian_smooth(field: &Field, variance: f64) -> FilterResult<Field> {
    let kernels = field
        .spacing()
        .iter()
        .map(|&s| Kernel::gaussian(variance, s))
        .collect::<FilterResult<Vec<_>>>()?;
    log::debug!(
        "gaussian smoothing, variance {variance}, kernel radii {:?}",
        kernels.iter().map(Kernel::radius).collect::<Vec<_>>()
    );
    convolve_separable(field, &kernels)
}
