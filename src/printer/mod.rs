// Calltree printer
//
// Writes a profile in the calltree format read by KCachegrind and QCachegrind:
//
//   events: <label>
//
//   fl=<absolute path>
//   fn=<method name>[(<index>)]
//   <line> <self cost>
//   cfl=<callee path>
//   cfn=<callee name>[(<index>)]
//   calls=<count> <call-site line>
//   <call-site line> <inclusive cost>
//
// The measurement unit is resolved before anything is written, so an
// unsupported mode leaves the sink untouched. Each thread is then printed
// with either the aggregated or the per-context emitter.

mod aggregated;
mod block;
mod config;
mod per_context;

pub use config::PrinterOptions;

use crate::call_sequence::SequenceIndexCache;
use crate::error::Result;
use crate::measure_mode::{HostClock, MeasureMode, MeasurementUnit, SystemClock};
use crate::profile::ProfileResult;
use block::BlockSink;
use std::io::Write;

/// Counts reported after an export
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub threads: usize,
    pub blocks_written: usize,
    /// Blocks dropped because a source path could not be resolved
    pub blocks_skipped: usize,
    /// Methods suppressed by `min_percent`
    pub blocks_filtered: usize,
}

/// Exports profiles in calltree format
pub struct CallTreePrinter {
    options: PrinterOptions,
    clock: Box<dyn HostClock>,
}

impl CallTreePrinter {
    /// Printer that queries the running host for clock ticks and CPU frequency
    pub fn new(options: PrinterOptions) -> Self {
        Self::with_clock(options, Box::new(SystemClock))
    }

    pub fn with_clock(options: PrinterOptions, clock: Box<dyn HostClock>) -> Self {
        Self { options, clock }
    }

    pub fn options(&self) -> &PrinterOptions {
        &self.options
    }

    /// Resolve the output unit for `mode`, preferring configured host values
    pub fn measurement_unit(&self, mode: MeasureMode) -> Result<MeasurementUnit> {
        let clock = ConfiguredClock {
            options: &self.options,
            host: self.clock.as_ref(),
        };
        MeasurementUnit::resolve(mode, &clock)
    }

    /// Print `profile` to `out`
    ///
    /// Fails before writing anything if the options, the profile or its
    /// measurement mode are invalid. Blocks whose source paths cannot be
    /// resolved are skipped and counted in the returned summary.
    pub fn print<W: Write>(&self, profile: &ProfileResult, out: &mut W) -> Result<ExportSummary> {
        self.options.validate()?;
        profile.validate()?;
        let mode: MeasureMode = profile.measure_mode.parse()?;
        let unit = self.measurement_unit(mode)?;
        tracing::debug!("Measurement unit {} (scale {})", unit.label, unit.scale);

        out.write_all(format!("events: {}\n\n", unit.label).as_bytes())?;

        // One cache per export; indices are shared by every thread printed here.
        let mut cache = SequenceIndexCache::new();
        let mut summary = ExportSummary::default();

        for thread in &profile.threads {
            tracing::debug!(
                "Printing thread {} ({} methods, {} call edges)",
                thread.id,
                thread.methods.len(),
                thread.call_edges.len()
            );
            let mut sink = BlockSink {
                out: &mut *out,
                unit: &unit,
                min_percent: self.options.min_percent,
                summary: &mut summary,
            };
            if self.options.aggregate {
                aggregated::print_methods(thread, &mut sink)?;
            } else {
                per_context::print_methods(thread, &mut cache, &mut sink)?;
            }
            summary.threads += 1;
        }

        out.flush()?;
        tracing::debug!(
            "Exported {} blocks ({} skipped, {} filtered)",
            summary.blocks_written,
            summary.blocks_skipped,
            summary.blocks_filtered
        );
        Ok(summary)
    }

    /// Print `profile` into a string
    pub fn print_to_string(&self, profile: &ProfileResult) -> Result<String> {
        let mut out = Vec::new();
        self.print(profile, &mut out)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

impl Default for CallTreePrinter {
    fn default() -> Self {
        Self::new(PrinterOptions::default())
    }
}

/// Host values from the options, falling back to the host clock
struct ConfiguredClock<'a> {
    options: &'a PrinterOptions,
    host: &'a dyn HostClock,
}

impl HostClock for ConfiguredClock<'_> {
    fn clock_ticks_per_second(&self) -> Result<f64> {
        match self.options.clock_ticks_per_second {
            Some(ticks) => Ok(ticks),
            None => self.host.clock_ticks_per_second(),
        }
    }

    fn cpu_frequency(&self) -> Result<f64> {
        match self.options.cpu_frequency {
            Some(hz) => Ok(hz),
            None => self.host.cpu_frequency(),
        }
    }
}
