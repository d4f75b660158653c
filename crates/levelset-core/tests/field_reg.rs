//! Field regression test
//!
//! Tests field creation, coordinate access, arithmetic, statistics and
//! binary serialization.

use levelset_core::{Error, Field, Grid};
use levelset_test::RegParams;

// ==========================================================================
// Test 1: Field creation and basic properties
// ==========================================================================

#[test]
fn field_reg_creation() {
    let mut rp = RegParams::new("field_creation");

    let field = Field::new(&[64, 48]).expect("Field::new failed");
    rp.compare_values(2.0, field.ndim() as f64, 0.0);
    rp.compare_values(3072.0, field.len() as f64, 0.0);

    // All values should be zero initially
    let all_zero = field.data().iter().all(|&v| v == 0.0);
    rp.compare_values(1.0, if all_zero { 1.0 } else { 0.0 }, 0.0);

    // Field with initial value
    let field_v = Field::new_with_value(&[10, 10, 10], 42.5).expect("new_with_value failed");
    rp.compare_values(1000.0, field_v.len() as f64, 0.0);
    let all_match = field_v.data().iter().all(|&v| v == 42.5);
    rp.compare_values(1.0, if all_match { 1.0 } else { 0.0 }, 0.0);

    // Field from raw data, axis 0 varies fastest
    let grid = Grid::new(&[3, 2]).unwrap();
    let field_d = Field::from_data(grid, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
    rp.compare_values(1.0, field_d.get(&[0, 0]).unwrap() as f64, 0.0);
    rp.compare_values(4.0, field_d.get(&[0, 1]).unwrap() as f64, 0.0);
    rp.compare_values(6.0, field_d.get(&[2, 1]).unwrap() as f64, 0.0);

    // Invalid dimensions
    let invalid = Field::new(&[0, 100]);
    rp.compare_values(1.0, if invalid.is_err() { 1.0 } else { 0.0 }, 0.0);

    assert!(rp.cleanup(), "field_reg creation tests failed");
}

// ==========================================================================
// Test 2: Spacing and physical metadata
// ==========================================================================

#[test]
fn field_reg_spacing() {
    let mut rp = RegParams::new("field_spacing");

    let field = Field::new(&[8, 8, 4])
        .unwrap()
        .with_spacing(&[0.5, 0.5, 2.0])
        .unwrap();
    rp.compare_values(0.5, field.grid().min_spacing(), 0.0);
    rp.compare_values(0.5, field.grid().voxel_volume(), 1e-12);

    // Spacing with wrong arity is rejected
    let bad = Field::new(&[8, 8]).unwrap().with_spacing(&[1.0]);
    rp.compare_values(1.0, if bad.is_err() { 1.0 } else { 0.0 }, 0.0);

    assert!(rp.cleanup(), "field_reg spacing tests failed");
}

// ==========================================================================
// Test 3: Arithmetic and statistics
// ==========================================================================

#[test]
fn field_reg_arithmetic() {
    let mut rp = RegParams::new("field_arith");

    let a = Field::new_with_value(&[20, 20], 3.0).unwrap();
    let b = Field::new_with_value(&[20, 20], 2.0).unwrap();

    let diff = a.sub(&b).unwrap();
    rp.compare_values(1.0, diff.get(&[5, 5]).unwrap() as f64, 1e-6);

    let mut c = a.clone();
    c.add_constant(-4.0);
    c.mul_constant(2.0);
    rp.compare_values(-2.0, c.get(&[0, 0]).unwrap() as f64, 1e-6);
    rp.compare_values(400.0, c.count_below(0.0) as f64, 0.0);

    let mapped = a.map(|v| v * v);
    rp.compare_values(9.0, mapped.get(&[19, 19]).unwrap() as f64, 1e-6);

    // Shape mismatch is reported as DimensionMismatch
    let other = Field::new(&[10, 10]).unwrap();
    let mismatch = matches!(a.sub(&other), Err(Error::DimensionMismatch { .. }));
    rp.compare_values(1.0, if mismatch { 1.0 } else { 0.0 }, 0.0);

    assert!(rp.cleanup(), "field_reg arithmetic tests failed");
}

// ==========================================================================
// Test 4: Serialization
// ==========================================================================

#[test]
fn field_reg_serialization() {
    let mut rp = RegParams::new("field_serial");

    let grid = Grid::with_spacing(&[5, 4, 3], &[1.0, 0.75, 2.5]).unwrap();
    let field = Field::from_fn(grid, |c| c[0] as f32 - 0.5 * c[1] as f32 + 10.0 * c[2] as f32);

    let bytes = field.write_to_bytes().expect("write_to_bytes failed");
    let restored = Field::read_from_bytes(&bytes).expect("read_from_bytes failed");

    rp.compare_fields(&field, &restored, 0.0);
    rp.compare_values(2.5, restored.spacing()[2], 0.0);

    // File round trip through the regout directory
    let path = format!("{}/field_serial.lsf", levelset_test::regout_dir());
    field.write_to_file(&path).expect("write_to_file failed");
    let from_file = Field::read_from_file(&path).expect("read_from_file failed");
    rp.compare_fields(&field, &from_file, 0.0);

    assert!(rp.cleanup(), "field_reg serialization tests failed");
}
