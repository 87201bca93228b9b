// Printer options, loadable from a TOML file

use crate::error::{ExportError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Options accepted by [`CallTreePrinter`](super::CallTreePrinter)
///
/// # Example
/// ```
/// use calltree::printer::PrinterOptions;
///
/// let options = PrinterOptions::default();
/// assert_eq!(options.min_percent, 0.0);
/// assert!(options.aggregate);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrinterOptions {
    /// Minimum %self (self time divided by the thread's total time) a method
    /// needs for its blocks to be printed, 0 to 100
    ///
    /// Default: 0.0 (print every method)
    pub min_percent: f64,

    /// Whether to print the method's source file
    ///
    /// Accepted for compatibility. Calltree blocks always carry `fl=` and
    /// `cfl=` lines, so this has no effect on the output.
    ///
    /// Default: false
    pub print_file: bool,

    /// Merge all calling contexts of a method into one block
    ///
    /// When false, one block is printed per calling context and method names
    /// carry a `(N)` context index.
    ///
    /// Default: true
    pub aggregate: bool,

    /// CPU frequency in Hz for cpu_time profiles, instead of querying the host
    pub cpu_frequency: Option<f64>,

    /// Clock ticks per second for process_time profiles, instead of querying
    /// the host
    pub clock_ticks_per_second: Option<f64>,
}

impl Default for PrinterOptions {
    fn default() -> Self {
        Self {
            min_percent: 0.0,
            print_file: false,
            aggregate: true,
            cpu_frequency: None,
            clock_ticks_per_second: None,
        }
    }
}

impl PrinterOptions {
    /// Options for per-context (non-aggregated) output
    pub fn without_aggregation() -> Self {
        Self {
            aggregate: false,
            ..Self::default()
        }
    }

    /// Load options from a TOML file; missing keys keep their defaults
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let options: PrinterOptions = toml::from_str(contents)?;
        options.validate()?;
        Ok(options)
    }

    /// Validate option ranges
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.min_percent) {
            return Err(ExportError::InvalidOptions(format!(
                "min_percent must be in [0, 100], got {}",
                self.min_percent
            )));
        }

        for (name, value) in [
            ("cpu_frequency", self.cpu_frequency),
            ("clock_ticks_per_second", self.clock_ticks_per_second),
        ] {
            if let Some(value) = value {
                if !value.is_finite() || value <= 0.0 {
                    return Err(ExportError::InvalidOptions(format!(
                        "{} must be positive, got {}",
                        name, value
                    )));
                }
            }
        }

        Ok(())
    }
}
