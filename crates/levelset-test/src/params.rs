//! Regression test parameters and operations

use crate::error::{TestError, TestResult};
use crate::regout_dir;
use levelset_core::Field;
use std::fs;

/// Regression test mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegTestMode {
    /// Compare computed values with expectations (default)
    #[default]
    Compare,
    /// Compare and also write intermediate fields for inspection
    Display,
}

impl RegTestMode {
    /// Parse mode from the `REGTEST_MODE` environment variable
    pub fn from_env() -> Self {
        match std::env::var("REGTEST_MODE")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "display" => Self::Display,
            _ => Self::Compare,
        }
    }
}

/// Regression test parameters
///
/// Numbered checks accumulate failures instead of panicking; the test
/// asserts on [`cleanup`](Self::cleanup) at the end.
pub struct RegParams {
    /// Name of the test (e.g., "threshold_seg")
    pub test_name: String,
    /// Current test index (incremented before each check)
    index: usize,
    /// Test mode
    pub mode: RegTestMode,
    /// Overall success status
    success: bool,
    /// Recorded failures
    failures: Vec<String>,
}

impl RegParams {
    /// Create new regression test parameters
    ///
    /// The mode is taken from the `REGTEST_MODE` environment variable.
    pub fn new(test_name: &str) -> Self {
        let mode = RegTestMode::from_env();

        // Ensure the output directory exists
        let _ = fs::create_dir_all(regout_dir());

        eprintln!();
        eprintln!("////////////////////////////////////////////////");
        eprintln!("////////////////   {}_reg   ///////////////", test_name);
        eprintln!("////////////////////////////////////////////////");
        eprintln!("Mode: {:?}", mode);

        Self {
            test_name: test_name.to_string(),
            index: 0,
            mode,
            success: true,
            failures: Vec::new(),
        }
    }

    /// Get the current test index
    pub fn index(&self) -> usize {
        self.index
    }

    /// Check if in display mode
    pub fn display(&self) -> bool {
        self.mode == RegTestMode::Display
    }

    /// Compare two floating-point values
    ///
    /// # Arguments
    ///
    /// * `expected` - Expected value
    /// * `actual` - Actual computed value
    /// * `delta` - Maximum allowed difference
    ///
    /// # Returns
    ///
    /// `true` if values match within delta, `false` otherwise.
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        self.index += 1;
        let diff = (expected - actual).abs();

        // NaN never compares within delta
        if !(diff <= delta) {
            let msg = format!(
                "Failure in {}_reg: value comparison for index {}\n\
                 difference = {} but allowed delta = {}\n\
                 expected = {}, actual = {}",
                self.test_name, self.index, diff, delta, expected, actual
            );
            self.record_failure(msg);
            false
        } else {
            true
        }
    }

    /// Check a boolean condition, recording a failure if it is false
    pub fn check(&mut self, condition: bool, what: &str) -> bool {
        self.index += 1;
        if !condition {
            let msg = format!(
                "Failure in {}_reg: check for index {} failed: {}",
                self.test_name, self.index, what
            );
            self.record_failure(msg);
        }
        condition
    }

    /// Compare two fields node by node
    ///
    /// Shapes must match exactly; values must agree within `delta`.
    pub fn compare_fields(&mut self, field1: &Field, field2: &Field, delta: f32) -> bool {
        self.index += 1;

        if field1.dims() != field2.dims() {
            let msg = format!(
                "Failure in {}_reg: field comparison for index {} - dimension mismatch {:?} vs {:?}",
                self.test_name,
                self.index,
                field1.dims(),
                field2.dims()
            );
            self.record_failure(msg);
            return false;
        }

        for (offset, (&a, &b)) in field1.data().iter().zip(field2.data()).enumerate() {
            if !((a - b).abs() <= delta) {
                let msg = format!(
                    "Failure in {}_reg: field comparison for index {} - value mismatch at {:?}: {} vs {}",
                    self.test_name,
                    self.index,
                    field1.grid().coord(offset),
                    a,
                    b
                );
                self.record_failure(msg);
                return false;
            }
        }

        true
    }

    /// Write a field to the regout directory when in display mode
    ///
    /// 2D fields are rescaled to 8 bits and written as PNG; other fields
    /// use the native field format. Does nothing in compare mode.
    pub fn write_field(&mut self, field: &Field, label: &str) -> TestResult<()> {
        if !self.display() {
            return Ok(());
        }

        let path = if field.ndim() == 2 {
            format!("{}/{}.{}.png", regout_dir(), self.test_name, label)
        } else {
            format!("{}/{}.{}.lsf", regout_dir(), self.test_name, label)
        };
        let output = if field.ndim() == 2 {
            levelset_io::rescale_for_display(field)
        } else {
            field.clone()
        };
        levelset_io::save(&output, &path).map_err(|e| TestError::FieldWrite {
            path: path.clone(),
            message: e.to_string(),
        })?;
        eprintln!("Wrote: {}", path);
        Ok(())
    }

    /// Clean up and report results
    ///
    /// # Returns
    ///
    /// `true` if all tests passed, `false` if any failed.
    pub fn cleanup(self) -> bool {
        if self.success {
            eprintln!("SUCCESS: {}_reg", self.test_name);
        } else {
            eprintln!("FAILURE: {}_reg", self.test_name);
            for failure in &self.failures {
                eprintln!("  {}", failure);
            }
        }
        eprintln!();

        self.success
    }

    /// Check if all tests have passed so far
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Get list of failures
    pub fn failures(&self) -> &[String] {
        &self.failures
    }

    fn record_failure(&mut self, msg: String) {
        eprintln!("{}", msg);
        self.failures.push(msg);
        self.success = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failures_accumulate() {
        let mut rp = RegParams::new("harness");
        assert!(rp.compare_values(0.25, 0.2, 0.1));
        assert!(rp.check(true, "holds"));
        assert!(rp.is_success());
        assert!(!rp.check(false, "front reached the border"));
        assert!(!rp.compare_values(3.0, 4.0, 0.5));
        assert!(!rp.is_success());
        assert_eq!(rp.failures().len(), 2);
        assert!(rp.failures()[0].contains("front reached the border"));
        assert_eq!(rp.index(), 4);
    }

    #[test]
    fn test_compare_values_nan() {
        let mut rp = RegParams::new("test");
        assert!(!rp.compare_values(1.0, f64::NAN, 10.0));
    }

    #[test]
    fn test_compare_fields() {
        let mut rp = RegParams::new("test");
        let a = Field::new_with_value(&[4, 4], 1.0).unwrap();
        let mut b = a.clone();
        assert!(rp.compare_fields(&a, &b, 0.0));
        b.set(&[2, 3], 1.5).unwrap();
        assert!(!rp.compare_fields(&a, &b, 0.1));
        assert!(rp.compare_fields(&a, &b, 0.5));
        assert_eq!(rp.index(), 3);
    }
}
