//! Feature models
//!
//! A feature model turns a feature image into the speed image and the
//! optional advection field consumed by the engine. The two segmentation
//! flavors differ only here; the evolution itself is shared.

use crate::{SegmentError, SegmentResult};
use levelset_core::{Field, VectorField};
use levelset_filter::{CannyOptions, canny_edges, distance_transform, gradient};

/// Speed image and advection field for one run
#[derive(Debug, Clone)]
pub struct FeatureTerms {
    /// Propagation speed at every node
    pub speed: Field,
    /// Advection velocity at every node
    pub advection: Option<VectorField>,
}

impl FeatureTerms {
    /// Terms with a speed image and no advection
    pub fn new(speed: Field) -> Self {
        Self {
            speed,
            advection: None,
        }
    }

    /// Add an advection field
    pub fn with_advection(mut self, advection: VectorField) -> Self {
        self.advection = Some(advection);
        self
    }
}

/// How a feature image drives the front
#[derive(Debug, Clone)]
pub enum FeatureModel {
    /// Expand inside the intensity range `[lower, upper]`, contract outside
    ///
    /// Speed is +1 in range and -1 outside; no advection.
    Threshold {
        /// Lowest intensity of the target tissue
        lower: f64,
        /// Highest intensity of the target tissue
        upper: f64,
    },
    /// Lock onto Canny edges of the feature image
    ///
    /// Speed is the distance to the nearest edge and the advection field
    /// is the negated gradient of that distance, pulling the front onto
    /// the edges.
    Canny {
        /// Minimum gradient magnitude of an edge
        threshold: f64,
        /// Gaussian variance applied before edge detection
        variance: f64,
    },
    /// Use the feature image as the speed image directly
    Speed {
        /// Externally supplied advection field
        advection: Option<VectorField>,
    },
}

impl FeatureModel {
    /// Build the engine inputs from a feature image
    ///
    /// # Errors
    ///
    /// Returns `SegmentError::InvalidParameter` for inverted thresholds, a
    /// negative Canny variance or threshold, or a Canny threshold that
    /// leaves no edges; `SegmentError::DimensionMismatch` if a supplied
    /// advection field does not match the feature image.
    pub fn build(&self, feature: &Field) -> SegmentResult<FeatureTerms> {
        match self {
            FeatureModel::Threshold { lower, upper } => {
                if !(lower <= upper) {
                    return Err(SegmentError::InvalidParameter(format!(
                        "lower threshold {lower} above upper threshold {upper}"
                    )));
                }
                let (lo, hi) = (*lower as f32, *upper as f32);
                let speed = feature.map(|v| if v >= lo && v <= hi { 1.0 } else { -1.0 });
                Ok(FeatureTerms::new(speed))
            }
            FeatureModel::Canny {
                threshold,
                variance,
            } => {
                if !(variance.is_finite() && *variance >= 0.0) {
                    return Err(SegmentError::InvalidParameter(format!(
                        "canny variance must be non-negative, got {variance}"
                    )));
                }
                if !(threshold.is_finite() && *threshold >= 0.0) {
                    return Err(SegmentError::InvalidParameter(format!(
                        "canny threshold must be non-negative, got {threshold}"
                    )));
                }
                let options = CannyOptions::new()
                    .with_variance(*variance)
                    .with_threshold(*threshold);
                let edges = canny_edges(feature, &options)?;
                if edges.data().iter().all(|&v| v == 0.0) {
                    return Err(SegmentError::InvalidParameter(format!(
                        "canny threshold {threshold} leaves no edges"
                    )));
                }
                let distance = distance_transform(&edges)?;
                let mut advection = gradient(&distance);
                advection.scale(-1.0);
                Ok(FeatureTerms::new(distance).with_advection(advection))
            }
            FeatureModel::Speed { advection } => {
                let mut terms = FeatureTerms::new(feature.clone());
                if let Some(field) = advection {
                    if !feature.grid().same_shape(field.grid()) {
                        return Err(SegmentError::DimensionMismatch {
                            expected: feature.dims().to_vec(),
                            actual: field.grid().dims().to_vec(),
                        });
                    }
                    terms = terms.with_advection(field.clone());
                }
                Ok(terms)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use levelset_core::Grid;

    #[test]
    fn test_threshold_speed() {
        let grid = Grid::new(&[4]).unwrap();
        let feature = Field::from_data(grid, vec![10.0, 50.0, 80.0, 200.0]).unwrap();
        let model = FeatureModel::Threshold {
            lower: 40.0,
            upper: 100.0,
        };
        let terms = model.build(&feature).unwrap();
        assert_eq!(terms.speed.data(), &[-1.0, 1.0, 1.0, -1.0]);
        assert!(terms.advection.is_none());
    }

    #[test]
    fn test_threshold_inverted() {
        let feature = Field::new(&[4]).unwrap();
        let model = FeatureModel::Threshold {
            lower: 5.0,
            upper: 1.0,
        };
        assert!(matches!(
            model.build(&feature),
            Err(SegmentError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_canny_speed_zero_on_edges() {
        let grid = Grid::new(&[24, 8]).unwrap();
        let feature = Field::from_fn(grid, |c| if c[0] < 12 { 0.0 } else { 100.0 });
        let model = FeatureModel::Canny {
            threshold: 5.0,
            variance: 1.0,
        };
        let terms = model.build(&feature).unwrap();
        assert_eq!(terms.speed.min().0, 0.0);
        let advection = terms.advection.unwrap();
        // Left of the edge the front is pulled right, and vice versa
        assert!(advection.get(terms.speed.grid().offset(&[3, 4]).unwrap())[0] > 0.0);
        assert!(advection.get(terms.speed.grid().offset(&[20, 4]).unwrap())[0] < 0.0);
    }

    #[test]
    fn test_canny_invalid_variance() {
        let feature = Field::new(&[8, 8]).unwrap();
        let model = FeatureModel::Canny {
            threshold: 1.0,
            variance: -2.0,
        };
        assert!(matches!(
            model.build(&feature),
            Err(SegmentError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_speed_advection_shape_checked() {
        let feature = Field::new(&[8, 8]).unwrap();
        let advection = VectorField::new(Grid::new(&[8, 6]).unwrap());
        let model = FeatureModel::Speed {
            advection: Some(advection),
        };
        assert!(matches!(
            model.build(&feature),
            Err(SegmentError::DimensionMismatch { .. })
        ));
    }
}
