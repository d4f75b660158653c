//! Narrow band and active layer
//!
//! The narrow band holds the nodes whose level-set value is within a fixed
//! distance of the front; only those nodes are updated. The active layer is
//! the subset of band nodes that sit directly on the front: nodes with an
//! axis neighbor on the other side of the zero crossing.

use levelset_core::Grid;

/// A node is inside the front when its value is strictly negative
#[inline]
pub fn is_inside(value: f32) -> bool {
    value < 0.0
}

/// Nodes updated during one iteration
#[derive(Debug, Clone)]
pub struct NarrowBand {
    nodes: Vec<usize>,
    member: Vec<bool>,
    full: bool,
}

impl NarrowBand {
    /// Every node with `|φ| < limit`, in offset order
    pub fn build(phi: &[f32], limit: f32) -> Self {
        let member: Vec<bool> = phi.iter().map(|v| v.abs() < limit).collect();
        let nodes = member
            .iter()
            .enumerate()
            .filter_map(|(o, &m)| m.then_some(o))
            .collect();
        Self {
            nodes,
            member,
            full: false,
        }
    }

    /// The whole grid
    pub fn full(len: usize) -> Self {
        Self {
            nodes: (0..len).collect(),
            member: vec![true; len],
            full: true,
        }
    }

    /// Band nodes in offset order
    pub fn nodes(&self) -> &[usize] {
        &self.nodes
    }

    /// Number of band nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True for an empty band
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether a node belongs to the band
    pub fn contains(&self, offset: usize) -> bool {
        self.member[offset]
    }

    /// Band nodes lying on the front of `phi`
    pub fn active_layer(&self, grid: &Grid, phi: &[f32]) -> Vec<usize> {
        self.nodes
            .iter()
            .copied()
            .filter(|&o| on_front(grid, phi, o))
            .collect()
    }

    /// Whether the front of `phi` has reached the outer edge of the band
    ///
    /// True when a front node has an axis neighbor outside the band. The
    /// whole-grid band is never touched.
    pub fn touched(&self, grid: &Grid, phi: &[f32]) -> bool {
        if self.full {
            return false;
        }
        self.nodes.iter().any(|&o| {
            on_front(grid, phi, o)
                && (0..grid.ndim()).any(|axis| {
                    [-1isize, 1].iter().any(|&step| {
                        grid.neighbor_checked(o, axis, step)
                            .is_some_and(|n| !self.member[n])
                    })
                })
        })
    }
}

/// Whether `offset` has an axis neighbor across the zero crossing
pub fn on_front(grid: &Grid, phi: &[f32], offset: usize) -> bool {
    let inside = is_inside(phi[offset]);
    (0..grid.ndim()).any(|axis| {
        [-1isize, 1].iter().any(|&step| {
            grid.neighbor_checked(offset, axis, step)
                .is_some_and(|n| is_inside(phi[n]) != inside)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_and_front() {
        let grid = Grid::new(&[8]).unwrap();
        let phi = [-3.5, -2.5, -1.5, -0.5, 0.5, 1.5, 2.5, 3.5];
        let band = NarrowBand::build(&phi, 2.0);
        assert_eq!(band.nodes(), &[2, 3, 4, 5]);
        assert_eq!(band.active_layer(&grid, &phi), vec![3, 4]);
        assert!(!band.touched(&grid, &phi));

        // Front moved next to the band edge
        let moved = [-3.5, -2.5, -1.5, -0.5, -0.4, -0.3, 0.2, 3.5];
        assert!(band.touched(&grid, &moved));
    }

    #[test]
    fn test_full_band() {
        let grid = Grid::new(&[3, 3]).unwrap();
        let phi = [1.0f32; 9];
        let band = NarrowBand::full(9);
        assert_eq!(band.len(), 9);
        assert!(band.active_layer(&grid, &phi).is_empty());
        assert!(!band.touched(&grid, &phi));
    }
}
