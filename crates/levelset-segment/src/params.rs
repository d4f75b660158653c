//! Run parameters and the active term set

use crate::{SegmentError, SegmentResult};

/// Configuration of a level-set run
///
/// Built once with [`Default`] and the `with_*` setters, validated when
/// the engine is created, and never modified during a run.
///
/// # Examples
///
/// ```
/// use levelset_segment::Parameters;
///
/// let params = Parameters::new()
///     .with_curvature_scaling(0.5)
///     .with_maximum_rms_error(0.01)
///     .with_number_of_iterations(200);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    /// Weight of the propagation (inflation) term
    pub propagation_scaling: f64,
    /// Weight of the mean curvature (smoothing) term; must be non-negative
    pub curvature_scaling: f64,
    /// Weight of the advection term
    pub advection_scaling: f64,
    /// Run converges once the RMS change of an iteration falls below this
    pub maximum_rms_error: f64,
    /// Iteration budget
    pub number_of_iterations: u32,
    /// Value of the initial model on the surface
    pub isovalue: f64,
    /// Restrict updates to a band around the front
    pub narrow_band: bool,
    /// Half-width of the band, in units of the smallest spacing
    pub band_width: f64,
    /// Reinitialize to a signed distance every this many iterations (0 = only when forced)
    pub reinitialization_interval: u32,
    /// Negate the propagation and advection terms
    pub reverse_expansion_direction: bool,
    /// Evaluate derivatives in physical units instead of index units
    pub use_image_spacing: bool,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            propagation_scaling: 1.0,
            curvature_scaling: 1.0,
            advection_scaling: 1.0,
            maximum_rms_error: 0.02,
            number_of_iterations: 1000,
            isovalue: 0.0,
            narrow_band: true,
            band_width: 3.0,
            reinitialization_interval: 1,
            reverse_expansion_direction: false,
            use_image_spacing: true,
        }
    }
}

impl Parameters {
    /// Create parameters with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the propagation weight
    pub fn with_propagation_scaling(mut self, weight: f64) -> Self {
        self.propagation_scaling = weight;
        self
    }

    /// Set the curvature weight
    pub fn with_curvature_scaling(mut self, weight: f64) -> Self {
        self.curvature_scaling = weight;
        self
    }

    /// Set the advection weight
    pub fn with_advection_scaling(mut self, weight: f64) -> Self {
        self.advection_scaling = weight;
        self
    }

    /// Set the convergence threshold on the RMS change
    pub fn with_maximum_rms_error(mut self, error: f64) -> Self {
        self.maximum_rms_error = error;
        self
    }

    /// Set the iteration budget
    pub fn with_number_of_iterations(mut self, iterations: u32) -> Self {
        self.number_of_iterations = iterations;
        self
    }

    /// Set the isovalue of the initial model
    pub fn with_isovalue(mut self, isovalue: f64) -> Self {
        self.isovalue = isovalue;
        self
    }

    /// Enable or disable the narrow band
    pub fn with_narrow_band(mut self, enabled: bool) -> Self {
        self.narrow_band = enabled;
        self
    }

    /// Set the narrow band half-width
    pub fn with_band_width(mut self, width: f64) -> Self {
        self.band_width = width;
        self
    }

    /// Set the reinitialization interval
    pub fn with_reinitialization_interval(mut self, interval: u32) -> Self {
        self.reinitialization_interval = interval;
        self
    }

    /// Reverse the expansion direction
    pub fn with_reverse_expansion_direction(mut self, reverse: bool) -> Self {
        self.reverse_expansion_direction = reverse;
        self
    }

    /// Choose between physical and index units
    pub fn with_use_image_spacing(mut self, use_spacing: bool) -> Self {
        self.use_image_spacing = use_spacing;
        self
    }

    /// Check every value against its valid domain
    ///
    /// # Errors
    ///
    /// Returns `SegmentError::InvalidParameter` naming the first bad value.
    pub fn validate(&self) -> SegmentResult<()> {
        let finite = [
            ("propagation scaling", self.propagation_scaling),
            ("curvature scaling", self.curvature_scaling),
            ("advection scaling", self.advection_scaling),
            ("maximum RMS error", self.maximum_rms_error),
            ("isovalue", self.isovalue),
            ("band width", self.band_width),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(SegmentError::InvalidParameter(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }
        if self.curvature_scaling < 0.0 {
            return Err(SegmentError::InvalidParameter(format!(
                "curvature scaling must be non-negative, got {}",
                self.curvature_scaling
            )));
        }
        if self.maximum_rms_error < 0.0 {
            return Err(SegmentError::InvalidParameter(format!(
                "maximum RMS error must be non-negative, got {}",
                self.maximum_rms_error
            )));
        }
        if self.narrow_band && self.band_width <= 1.0 {
            return Err(SegmentError::InvalidParameter(format!(
                "band width must exceed one cell, got {}",
                self.band_width
            )));
        }
        Ok(())
    }

    /// Whether the field is reinitialized before the first iteration
    pub(crate) fn reinitializes(&self) -> bool {
        self.narrow_band || self.reinitialization_interval > 0
    }

    /// Whether iteration `iteration` (1-based) ends with a reinitialization
    pub(crate) fn reinitialization_due(&self, iteration: u32) -> bool {
        self.reinitialization_interval > 0 && iteration % self.reinitialization_interval == 0
    }
}

/// Which terms take part in the update, with their signed weights
///
/// A term is active when its weight is non-zero; advection additionally
/// needs an advection field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TermSet {
    /// Propagation weight, if active
    pub propagation: Option<f32>,
    /// Curvature weight, if active
    pub curvature: Option<f32>,
    /// Advection weight, if active
    pub advection: Option<f32>,
}

impl TermSet {
    /// Derive the active terms from parameters
    pub fn from_parameters(params: &Parameters, has_advection: bool) -> Self {
        let direction = if params.reverse_expansion_direction {
            -1.0
        } else {
            1.0
        };
        let active = |w: f64| (w != 0.0).then_some(w as f32);
        TermSet {
            propagation: active(direction * params.propagation_scaling),
            curvature: active(params.curvature_scaling),
            advection: if has_advection {
                active(direction * params.advection_scaling)
            } else {
                None
            },
        }
    }

    /// True when no term is active
    pub fn is_empty(&self) -> bool {
        self.propagation.is_none() && self.curvature.is_none() && self.advection.is_none()
    }

    /// Short description for logging, e.g. `"propagation+curvature"`
    pub fn describe(&self) -> String {
        let names: Vec<&str> = [
            (self.propagation.is_some(), "propagation"),
            (self.curvature.is_some(), "curvature"),
            (self.advection.is_some(), "advection"),
        ]
        .iter()
        .filter(|(on, _)| *on)
        .map(|(_, name)| *name)
        .collect();
        if names.is_empty() {
            "none".to_string()
        } else {
            names.join("+")
        }
    }
}
