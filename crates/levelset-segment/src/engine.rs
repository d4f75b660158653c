//! Level-set evolution engine
//!
//! Runs the evolution loop: build the narrow band, evaluate the terms,
//! step, reinitialize, measure the RMS change and report progress.
//!
//! # Conventions
//!
//! The initial model is inside wherever it is below the isovalue. The
//! engine evolves `ψ = φ - isovalue` with ψ negative inside and hands back
//! `ψ + isovalue`, so the output keeps the convention of the input.

use crate::band::{NarrowBand, is_inside};
use crate::convergence::{ConvergenceMonitor, IterationRecord, RmsAccumulator, RunStatus};
use crate::feature::FeatureTerms;
use crate::params::{Parameters, TermSet};
use crate::reinit::reinitialize;
use crate::stepper::{apply, evaluate_nodes, time_step};
use crate::terms::{MAX_AXES, TermEvaluator};
use crate::{SegmentError, SegmentResult};
use levelset_core::{Field, Grid};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cancellation request shared with a running engine
///
/// Cancellation is honored at the next iteration boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Outcome of a run
#[derive(Debug, Clone)]
pub struct SegmentationResult {
    field: Field,
    status: RunStatus,
    elapsed_iterations: u32,
    rms_change: f64,
    isovalue: f64,
    history: Vec<IterationRecord>,
}

impl SegmentationResult {
    /// Final level set, with the surface at the isovalue
    pub fn field(&self) -> &Field {
        &self.field
    }

    /// Take the final level set
    pub fn into_field(self) -> Field {
        self.field
    }

    /// How the run ended
    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// Iterations performed
    pub fn elapsed_iterations(&self) -> u32 {
        self.elapsed_iterations
    }

    /// RMS change of the last iteration
    pub fn rms_change(&self) -> f64 {
        self.rms_change
    }

    /// Isovalue of the surface in [`field`](Self::field)
    pub fn isovalue(&self) -> f64 {
        self.isovalue
    }

    /// One record per iteration
    pub fn history(&self) -> &[IterationRecord] {
        &self.history
    }

    /// Binary segmentation: `inside` below the isovalue, `outside` elsewhere
    pub fn binary_mask(&self, inside: f32, outside: f32) -> Field {
        let iso = self.isovalue;
        self.field
            .map(|v| if (v as f64) < iso { inside } else { outside })
    }
}

/// Level-set evolution engine
///
/// # Examples
///
/// ```
/// use levelset_core::{Field, Grid};
/// use levelset_segment::{FeatureTerms, LevelSetEngine, Parameters, RunStatus};
///
/// let grid = Grid::new(&[16, 16]).unwrap();
/// let initial = Field::from_fn(grid, |c| {
///     let (x, y) = (c[0] as f32 - 8.0, c[1] as f32 - 8.0);
///     (x * x + y * y).sqrt() - 3.0
/// });
/// let speed = Field::new_with_value(&[16, 16], 1.0).unwrap();
///
/// let engine = LevelSetEngine::new(Parameters::new().with_number_of_iterations(5)).unwrap();
/// let result = engine.run(&initial, &FeatureTerms::new(speed)).unwrap();
/// assert!(result.elapsed_iterations() <= 5);
/// assert_ne!(result.status(), RunStatus::Running);
/// ```
#[derive(Debug, Clone)]
pub struct LevelSetEngine {
    parameters: Parameters,
    cancel: Option<CancelToken>,
}

impl LevelSetEngine {
    /// Create an engine
    ///
    /// # Errors
    ///
    /// Returns `SegmentError::InvalidParameter` if the parameters fail
    /// validation.
    pub fn new(parameters: Parameters) -> SegmentResult<Self> {
        parameters.validate()?;
        Ok(Self {
            parameters,
            cancel: None,
        })
    }

    /// Honor cancellation requests made through `token`
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Parameters of this engine
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Evolve `initial` under the given feature terms
    ///
    /// # Errors
    ///
    /// See [`run_with_progress`](Self::run_with_progress).
    pub fn run(&self, initial: &Field, terms: &FeatureTerms) -> SegmentResult<SegmentationResult> {
        self.run_with_progress(initial, terms, |_| {})
    }

    /// Evolve `initial`, calling `observer` after every iteration
    ///
    /// Divergence is not an error: the result carries
    /// [`RunStatus::Diverged`] and the last field before the failing
    /// iteration.
    ///
    /// # Errors
    ///
    /// Returns `SegmentError::DimensionMismatch` if the speed image or the
    /// advection field differ in shape from `initial`, and
    /// `SegmentError::InvalidParameter` for non-finite initial values or
    /// more than eight dimensions. All checks happen before the first
    /// iteration.
    pub fn run_with_progress<F>(
        &self,
        initial: &Field,
        terms: &FeatureTerms,
        mut observer: F,
    ) -> SegmentResult<SegmentationResult>
    where
        F: FnMut(&IterationRecord),
    {
        let params = &self.parameters;
        self.check_inputs(initial, terms)?;

        let mut monitor =
            ConvergenceMonitor::new(params.maximum_rms_error, params.number_of_iterations);
        if monitor.status().is_terminal() {
            log::info!("level set: no iterations requested, returning the initial model");
            return Ok(SegmentationResult {
                field: initial.clone(),
                status: monitor.status(),
                elapsed_iterations: 0,
                rms_change: 0.0,
                isovalue: params.isovalue,
                history: Vec::new(),
            });
        }

        let grid = if params.use_image_spacing {
            initial.grid().clone()
        } else {
            Grid::new(initial.dims())?
        };
        let limit = if params.narrow_band {
            (params.band_width * grid.min_spacing()) as f32
        } else {
            f32::INFINITY
        };
        let voxel_volume = initial.grid().voxel_volume();
        let term_set = TermSet::from_parameters(params, terms.advection.is_some());
        let evaluator =
            TermEvaluator::new(&grid, &terms.speed, terms.advection.as_ref(), term_set);

        let iso = params.isovalue;
        let mut psi: Vec<f32> = initial
            .data()
            .iter()
            .map(|&v| (v as f64 - iso) as f32)
            .collect();
        if params.reinitializes() {
            reinitialize(&grid, &mut psi, limit)?;
        }

        log::info!(
            "level set: grid {:?}, terms {}, narrow band {}, up to {} iterations",
            grid.dims(),
            term_set.describe(),
            if params.narrow_band { "on" } else { "off" },
            params.number_of_iterations
        );

        let mut history = Vec::new();
        let mut next = psi.clone();
        loop {
            if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                monitor.cancel();
                log::warn!(
                    "level set: cancelled after {} iterations",
                    monitor.iterations()
                );
                break;
            }

            let band = if params.narrow_band {
                NarrowBand::build(&psi, limit)
            } else {
                NarrowBand::full(psi.len())
            };
            let front = band.active_layer(&grid, &psi);

            let updates = evaluate_nodes(&evaluator, &psi, band.nodes());
            let dt = time_step(&updates, &grid, term_set.curvature);
            next.copy_from_slice(&psi);
            apply(&mut next, &psi, band.nodes(), &updates, dt);

            let iteration = monitor.iterations() + 1;
            let finite = band.nodes().iter().all(|&o| next[o].is_finite());
            let rms = if finite {
                if params.reinitialization_due(iteration) || band.touched(&grid, &next) {
                    reinitialize(&grid, &mut next, limit)?;
                }
                let mut acc = RmsAccumulator::default();
                for &o in &front {
                    acc.add(psi[o], next[o]);
                }
                acc.rms()
            } else {
                f64::NAN
            };

            let status = monitor.record(rms);
            let volume_source = if finite { &next } else { &psi };
            let record = IterationRecord {
                iteration,
                rms_change: rms,
                metric_value: volume_source.iter().filter(|&&v| is_inside(v)).count() as f64
                    * voxel_volume,
                time_step: dt,
                band_size: band.len(),
            };
            log::debug!(
                "level set: iteration {}, dt {:.4}, rms {:.6}, band {}",
                record.iteration,
                record.time_step,
                record.rms_change,
                record.band_size
            );
            history.push(record);
            observer(&record);

            if status == RunStatus::Diverged {
                log::warn!("level set: diverged at iteration {iteration}, keeping the previous field");
                break;
            }
            std::mem::swap(&mut psi, &mut next);
            if status.is_terminal() {
                break;
            }
        }

        let data = psi.iter().map(|&v| (v as f64 + iso) as f32).collect();
        let field = Field::from_data(initial.grid().clone(), data)?;
        log::info!(
            "level set: {} after {} iterations, rms change {}",
            monitor.status(),
            monitor.iterations(),
            monitor.rms_change()
        );

        Ok(SegmentationResult {
            field,
            status: monitor.status(),
            elapsed_iterations: monitor.iterations(),
            rms_change: monitor.rms_change(),
            isovalue: iso,
            history,
        })
    }

    fn check_inputs(&self, initial: &Field, terms: &FeatureTerms) -> SegmentResult<()> {
        if !initial.grid().same_shape(terms.speed.grid()) {
            return Err(SegmentError::DimensionMismatch {
                expected: initial.dims().to_vec(),
                actual: terms.speed.dims().to_vec(),
            });
        }
        if let Some(advection) = &terms.advection {
            if !initial.grid().same_shape(advection.grid()) {
                return Err(SegmentError::DimensionMismatch {
                    expected: initial.dims().to_vec(),
                    actual: advection.grid().dims().to_vec(),
                });
            }
        }
        if initial.ndim() > MAX_AXES {
            return Err(SegmentError::InvalidParameter(format!(
                "at most {MAX_AXES} dimensions are supported, got {}",
                initial.ndim()
            )));
        }
        if initial.has_non_finite() {
            return Err(SegmentError::InvalidParameter(
                "initial model holds non-finite values".to_string(),
            ));
        }
        Ok(())
    }
}
