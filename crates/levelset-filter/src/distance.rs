//! Euclidean distance transforms
//!
//! Exact distances are computed with the separable lower-envelope
//! algorithm of Felzenszwalb and Huttenlocher: a 1D squared-distance
//! transform is run along every axis in turn, each pass taking the node
//! spacing of its axis into account.

use crate::{FilterError, FilterResult};
use levelset_core::Field;

/// Distance from every node to the nearest foreground node
///
/// Foreground is any non-zero value. Distances are in physical units.
/// Foreground nodes get 0.
///
/// # Errors
///
/// Returns `FilterError::InvalidParameters` if the mask has no foreground.
pub fn distance_transform(mask: &Field) -> FilterResult<Field> {
    let mut sq: Vec<f64> = mask
        .data()
        .iter()
        .map(|&v| if v != 0.0 { 0.0 } else { f64::INFINITY })
        .collect();
    if sq.iter().all(|v| v.is_infinite()) {
        return Err(FilterError::InvalidParameters(
            "distance transform of an empty mask".to_string(),
        ));
    }

    squared_edt(mask, &mut sq);

    let mut out = mask.create_template();
    for (o, d2) in out.data_mut().iter_mut().zip(&sq) {
        *o = d2.sqrt() as f32;
    }
    Ok(out)
}

/// Signed distance to the border of a binary mask
///
/// Negative inside the mask, positive outside. The zero crossing lies
/// halfway between neighboring foreground and background nodes, so nodes
/// on either side of the border sit at `±h_min / 2`.
///
/// # Errors
///
/// Returns `FilterError::InvalidParameters` if the mask is empty or full.
pub fn signed_distance(mask: &Field) -> FilterResult<Field> {
    let inverse = mask.map(|v| if v != 0.0 { 0.0 } else { 1.0 });
    let to_foreground = distance_transform(mask)?;
    let to_background = distance_transform(&inverse).map_err(|_| {
        FilterError::InvalidParameters("signed distance of a full mask".to_string())
    })?;

    let half = (0.5 * mask.grid().min_spacing()) as f32;
    let mut out = mask.create_template();
    for (offset, o) in out.data_mut().iter_mut().enumerate() {
        *o = if mask.get_at(offset) != 0.0 {
            half - to_background.get_at(offset)
        } else {
            to_foreground.get_at(offset) - half
        };
    }
    Ok(out)
}

/// In-place squared distance transform along every axis
fn squared_edt(field: &Field, sq: &mut [f64]) {
    let grid = field.grid();
    let mut line = Vec::new();
    let mut result = Vec::new();

    for axis in 0..grid.ndim() {
        let n = grid.dims()[axis];
        let stride = grid.strides()[axis];
        let h = grid.spacing()[axis];
        line.resize(n, 0.0);
        result.resize(n, 0.0);

        // Visit every line along `axis` by its first node
        for start in 0..grid.len() {
            if grid.axis_index(start, axis) != 0 {
                continue;
            }
            for (i, v) in line.iter_mut().enumerate() {
                *v = sq[start + i * stride];
            }
            lower_envelope(&line, h, &mut result);
            for (i, &v) in result.iter().enumerate() {
                sq[start + i * stride] = v;
            }
        }
    }
}

/// 1D transform `d(q) = min_p ((q - p) h)² + f(p)`
fn lower_envelope(f: &[f64], h: f64, d: &mut [f64]) {
    let n = f.len();
    // Parabola vertices and the boundaries between them
    let mut v: Vec<usize> = Vec::with_capacity(n);
    let mut z: Vec<f64> = Vec::with_capacity(n + 1);

    for q in 0..n {
        if f[q].is_infinite() {
            continue;
        }
        let xq = q as f64 * h;
        loop {
            let Some(&last) = v.last() else {
                v.push(q);
                z.push(f64::NEG_INFINITY);
                break;
            };
            let xv = last as f64 * h;
            let s = ((f[q] + xq * xq) - (f[last] + xv * xv)) / (2.0 * (xq - xv));
            if v.len() > 1 && s <= z[z.len() - 1] {
                v.pop();
                z.pop();
                continue;
            }
            v.push(q);
            z.push(s);
            break;
        }
    }

    if v.is_empty() {
        d.iter_mut().for_each(|x| *x = f64::INFINITY);
        return;
    }

    let mut k = 0;
    for (q, out) in d.iter_mut().enumerate() {
        let xq = q as f64 * h;
        while k + 1 < v.len() && z[k + 1] < xq {
            k += 1;
        }
        let dx = xq - v[k] as f64 * h;
        *out = dx * dx + f[v[k]];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use levelset_core::Grid;

    #[test]
    fn test_single_point() {
        let mut mask = Field::new(&[7, 5]).unwrap();
        mask.set(&[2, 1], 1.0).unwrap();
        let dist = distance_transform(&mask).unwrap();
        assert_eq!(dist.get(&[2, 1]).unwrap(), 0.0);
        assert_eq!(dist.get(&[5, 1]).unwrap(), 3.0);
        assert!((dist.get(&[5, 4]).unwrap() - 18f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn test_spacing_honored() {
        let grid = Grid::with_spacing(&[5, 5], &[2.0, 0.5]).unwrap();
        let mut mask = Field::from_grid(grid);
        mask.set(&[0, 0], 1.0).unwrap();
        let dist = distance_transform(&mask).unwrap();
        assert!((dist.get(&[3, 0]).unwrap() - 6.0).abs() < 1e-6);
        assert!((dist.get(&[0, 4]).unwrap() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_matches_brute_force() {
        let grid = Grid::new(&[9, 8]).unwrap();
        let seeds = [[1usize, 1usize], [7, 2], [4, 6]];
        let mask = Field::from_fn(grid, |c| {
            if seeds.iter().any(|s| s[0] == c[0] && s[1] == c[1]) { 1.0 } else { 0.0 }
        });
        let dist = distance_transform(&mask).unwrap();
        for offset in 0..dist.len() {
            let c = dist.grid().coord(offset);
            let expected = seeds
                .iter()
                .map(|s| {
                    let dx = c[0] as f64 - s[0] as f64;
                    let dy = c[1] as f64 - s[1] as f64;
                    (dx * dx + dy * dy).sqrt()
                })
                .fold(f64::INFINITY, f64::min);
            assert!((dist.get_at(offset) as f64 - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn test_signed_distance_sign() {
        let grid = Grid::new(&[10]).unwrap();
        let mask = Field::from_fn(grid, |c| if c[0] < 4 { 1.0 } else { 0.0 });
        let sd = signed_distance(&mask).unwrap();
        assert_eq!(sd.get(&[3]).unwrap(), -0.5);
        assert_eq!(sd.get(&[4]).unwrap(), 0.5);
        assert_eq!(sd.get(&[0]).unwrap(), -3.5);
        assert_eq!(sd.get(&[9]).unwrap(), 5.5);
    }

    #[test]
    fn test_empty_and_full_masks() {
        let empty = Field::new(&[4, 4]).unwrap();
        assert!(distance_transform(&empty).is_err());
        assert!(signed_distance(&empty).is_err());
        let full = Field::new_with_value(&[4, 4], 1.0).unwrap();
        assert!(signed_distance(&full).is_err());
    }
}
