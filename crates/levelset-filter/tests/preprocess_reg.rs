//! Preprocessing regression test
//!
//! Exercises the front-end filters on a synthetic disk image the way the
//! segmentation pipelines chain them:
//!
//! - Part 1: Gaussian smoothing keeps the mean and lowers the contrast
//! - Part 2: anisotropic diffusion smooths flat regions and keeps the edge
//! - Part 3: Canny edges lie on the disk border
//! - Part 4: distance to the edges vanishes on the border
//! - Part 5: fast marching from the center approximates the radius
//! - Part 6: gradient magnitude of a ramp and thresholding of a step

use levelset_filter::{
    CannyOptions, DiffusionOptions, FastMarching, binary_threshold, canny_edges,
    distance_transform, gaussian_smooth, gradient_anisotropic_diffusion, gradient_magnitude,
    signed_distance,
};
use levelset_test::RegParams;
use levelset_test::fixtures::{disk_image, disk_mask, radial_ramp, sphere_level_set, step_image};

const DIMS: [usize; 2] = [48, 48];
const CENTER: [f64; 2] = [24.0, 24.0];
const RADIUS: f64 = 12.0;

fn mean(data: &[f32]) -> f64 {
    data.iter().map(|&v| v as f64).sum::<f64>() / data.len() as f64
}

#[test]
fn preprocess_reg() {
    let mut rp = RegParams::new("preprocess");
    let image = disk_image(&DIMS, &CENTER, RADIUS, 200.0, 50.0);

    // --- Part 1: Gaussian smoothing ---
    let smoothed = gaussian_smooth(&image, 2.0).expect("smooth");
    rp.compare_values(mean(image.data()), mean(smoothed.data()), 1e-2);
    rp.check(smoothed.max().0 <= 200.0 + 1e-3, "no overshoot above max");
    rp.check(smoothed.min().0 >= 50.0 - 1e-3, "no overshoot below min");
    rp.compare_values(200.0, smoothed.get(&[24, 24]).expect("center") as f64, 1e-3);
    rp.write_field(&smoothed, "smoothed").expect("write");

    // --- Part 2: anisotropic diffusion ---
    let diffused =
        gradient_anisotropic_diffusion(&image, &DiffusionOptions::default()).expect("diffuse");
    rp.compare_values(200.0, diffused.get(&[24, 24]).expect("center") as f64, 1e-3);
    rp.compare_values(50.0, diffused.get(&[2, 2]).expect("corner") as f64, 1e-3);
    // Border contrast survives
    let inside = diffused.get(&[24 + 11, 24]).expect("inside edge") as f64;
    let outside = diffused.get(&[24 + 13, 24]).expect("outside edge") as f64;
    rp.check(inside - outside > 100.0, "edge preserved by diffusion");

    // --- Part 3: Canny edges ---
    let edges = canny_edges(
        &image,
        &CannyOptions::new().with_variance(1.0).with_threshold(10.0),
    )
    .expect("canny");
    let mut edge_count = 0;
    let mut worst = 0.0f64;
    for offset in 0..edges.len() {
        if edges.get_at(offset) > 0.0 {
            edge_count += 1;
            let c = edges.grid().coord(offset);
            let r = ((c[0] as f64 - CENTER[0]).powi(2) + (c[1] as f64 - CENTER[1]).powi(2)).sqrt();
            worst = worst.max((r - RADIUS).abs());
        }
    }
    rp.check(edge_count > 40, "closed edge contour found");
    rp.check(worst <= 1.5, "edges on the disk border");
    rp.write_field(&edges, "canny").expect("write");

    // --- Part 4: distance maps ---
    let dist = distance_transform(&edges).expect("distance");
    rp.compare_values(0.0, dist.min().0 as f64, 0.0);
    rp.compare_values(RADIUS, dist.get(&[24, 24]).expect("center") as f64, 1.5);

    let mask = disk_mask(&DIMS, &CENTER, RADIUS);
    let sd = signed_distance(&mask).expect("signed distance");
    let exact = sphere_level_set(&DIMS, &CENTER, RADIUS);
    rp.compare_fields(&sd, &exact, 1.0);

    // --- Part 5: fast marching ---
    let arrival = FastMarching::new(image.grid().clone())
        .with_trial_points(&[(vec![24, 24], 0.0)])
        .expect("seed")
        .run()
        .expect("march");
    rp.compare_values(RADIUS, arrival.get(&[36, 24]).expect("axis") as f64, 1e-5);
    rp.check(
        arrival.get(&[32, 32]).expect("diagonal") as f64 >= 8.0 * 2f64.sqrt(),
        "fast marching never underestimates",
    );

    // --- Part 6: ramp and step ---
    let ramp = radial_ramp(&DIMS, &CENTER, 100.0, 2.0);
    let mag = gradient_magnitude(&ramp);
    rp.compare_values(2.0, mag.get(&[30, 24]).expect("on axis") as f64, 1e-4);
    rp.compare_values(2.0, mag.get(&[24, 10]).expect("on axis") as f64, 1e-4);

    let step = step_image(&DIMS, 20, 10.0, 90.0);
    let bright = binary_threshold(&step, 50.0, 100.0, 1.0, 0.0).expect("threshold");
    rp.compare_values(
        ((DIMS[0] - 20) * DIMS[1]) as f64,
        bright.data().iter().sum::<f32>() as f64,
        0.0,
    );

    assert!(rp.cleanup(), "preprocess regression test failed");
}
