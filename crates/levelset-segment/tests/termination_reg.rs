//! Run termination and input validation regression test
//!
//! - Part 1: the iteration budget ends a run that is still moving
//! - Part 2: a zero budget returns the initial model untouched
//! - Part 3: cancellation stops at the next iteration boundary
//! - Part 4: a non-finite update diverges and keeps the last good field
//! - Part 5: mismatched inputs and bad parameters are rejected up front

use levelset_core::{Field, Grid, VectorField};
use levelset_segment::{
    CancelToken, FeatureTerms, LevelSetEngine, Parameters, RunStatus, SegmentError,
};
use levelset_test::RegParams;
use levelset_test::fixtures::{inside_count, sphere_level_set};

fn expanding() -> (Field, FeatureTerms) {
    let initial = sphere_level_set(&[40, 40], &[20.0, 20.0], 3.0);
    let speed = Field::new_with_value(&[40, 40], 1.0).expect("speed");
    (initial, FeatureTerms::new(speed))
}

fn no_curvature(iterations: u32) -> Parameters {
    Parameters::new()
        .with_curvature_scaling(0.0)
        .with_number_of_iterations(iterations)
}

#[test]
fn termination_reg() {
    let mut rp = RegParams::new("termination");
    let (initial, terms) = expanding();

    // --- Part 1: iteration budget ---
    let engine = LevelSetEngine::new(no_curvature(5)).expect("engine");
    let result = engine.run(&initial, &terms).expect("run");
    rp.check(
        result.status() == RunStatus::MaxIterationsReached,
        "budget reached",
    );
    rp.compare_values(5.0, result.elapsed_iterations() as f64, 0.0);
    rp.compare_values(5.0, result.history().len() as f64, 0.0);
    rp.check(
        result.history().iter().all(|r| r.rms_change > 0.02),
        "front still moving",
    );
    rp.check(
        inside_count(result.field()) > inside_count(&initial),
        "front expanded",
    );

    // --- Part 2: zero budget ---
    let engine = LevelSetEngine::new(no_curvature(0)).expect("engine");
    let result = engine.run(&initial, &terms).expect("run");
    rp.check(
        result.status() == RunStatus::MaxIterationsReached,
        "zero budget ends at once",
    );
    rp.compare_values(0.0, result.elapsed_iterations() as f64, 0.0);
    rp.check(result.history().is_empty(), "no iterations recorded");
    rp.compare_fields(&initial, result.field(), 0.0);

    // --- Part 3: cancellation ---
    let token = CancelToken::new();
    let engine = LevelSetEngine::new(no_curvature(100))
        .expect("engine")
        .with_cancel_token(token.clone());
    let mut seen = Vec::new();
    let result = engine
        .run_with_progress(&initial, &terms, |record| {
            seen.push(record.iteration);
            if record.iteration == 3 {
                token.cancel();
            }
        })
        .expect("run");
    rp.check(result.status() == RunStatus::Cancelled, "run cancelled");
    rp.compare_values(3.0, result.elapsed_iterations() as f64, 0.0);
    rp.check(seen == [1, 2, 3], "observer called once per iteration");

    // --- Part 4: divergence ---
    let initial = sphere_level_set(&[16, 16], &[7.5, 7.5], 3.0);
    let grid = initial.grid().clone();
    let mut speed = Field::new_with_value(&[16, 16], 1.0).expect("speed");
    // Front node just outside the circle
    let bad = grid.offset(&[11, 8]).expect("offset");
    speed.set_at(bad, f32::NAN);
    let engine = LevelSetEngine::new(no_curvature(50)).expect("engine");
    let result = engine
        .run(&initial, &FeatureTerms::new(speed))
        .expect("divergence is not an error");
    rp.check(result.status() == RunStatus::Diverged, "run diverged");
    rp.compare_values(1.0, result.elapsed_iterations() as f64, 0.0);
    rp.check(result.rms_change().is_nan(), "non-finite RMS reported");
    rp.check(
        result.field().data().iter().all(|v| v.is_finite()),
        "last good field returned",
    );
    rp.compare_values(
        inside_count(&initial) as f64,
        inside_count(result.field()) as f64,
        0.0,
    );

    // --- Part 5: rejected inputs ---
    let engine = LevelSetEngine::new(Parameters::new()).expect("engine");
    let short = Field::new_with_value(&[16, 15], 1.0).expect("speed");
    rp.check(
        matches!(
            engine.run(&initial, &FeatureTerms::new(short)),
            Err(SegmentError::DimensionMismatch { .. })
        ),
        "speed shape checked",
    );

    let speed = Field::new_with_value(&[16, 16], 1.0).expect("speed");
    let advection = VectorField::new(Grid::new(&[8, 8]).expect("grid"));
    rp.check(
        matches!(
            engine.run(&initial, &FeatureTerms::new(speed.clone()).with_advection(advection)),
            Err(SegmentError::DimensionMismatch { .. })
        ),
        "advection shape checked",
    );

    let mut holey = initial.clone();
    holey.set_at(0, f32::INFINITY);
    rp.check(
        matches!(
            engine.run(&holey, &FeatureTerms::new(speed)),
            Err(SegmentError::InvalidParameter(_))
        ),
        "non-finite initial model rejected",
    );

    let dims = [2usize; 9];
    let wide = Field::new(&dims).expect("9-D field");
    let wide_speed = Field::new_with_value(&dims, 1.0).expect("9-D speed");
    rp.check(
        matches!(
            engine.run(&wide, &FeatureTerms::new(wide_speed)),
            Err(SegmentError::InvalidParameter(_))
        ),
        "too many dimensions rejected",
    );

    for params in [
        Parameters::new().with_curvature_scaling(-1.0),
        Parameters::new().with_maximum_rms_error(-0.5),
        Parameters::new().with_band_width(0.5),
        Parameters::new().with_advection_scaling(f64::INFINITY),
    ] {
        rp.check(
            matches!(
                LevelSetEngine::new(params),
                Err(SegmentError::InvalidParameter(_))
            ),
            "invalid parameters rejected",
        );
    }

    assert!(rp.cleanup(), "termination regression test failed");
}
