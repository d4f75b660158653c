//! levelset-test - Regression test framework for levelset
//!
//! This crate provides a small regression test harness in the style of a
//! `regutils` driver, supporting two modes:
//!
//! - **Compare**: Check computed values against expectations (default)
//! - **Display**: Additionally write intermediate fields to `tests/regout`
//!   for visual inspection
//!
//! It also ships synthetic [`fixtures`] (disks, balls, ramps) used by the
//! per-crate `*_reg.rs` tests.
//!
//! # Usage
//!
//! ```ignore
//! use levelset_test::RegParams;
//!
//! let mut rp = RegParams::new("threshold_seg");
//! rp.compare_values(4452.0, count as f64, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "compare" or "display"

mod error;
pub mod fixtures;
mod params;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};

/// Get the path to the workspace root
fn workspace_root() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    // levelset-test is at crates/levelset-test, so go up two directories
    format!("{}/../..", manifest_dir)
}

/// Get the path to the regout (regression output) directory
pub fn regout_dir() -> String {
    format!("{}/tests/regout", workspace_root())
}
