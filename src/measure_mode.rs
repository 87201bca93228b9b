//! Measurement modes and their output units
//!
//! A profile records weights in the unit of its measurement mode (seconds for
//! the time-based modes, raw counts otherwise). The calltree header names the
//! event type, and every printed weight is the recorded value multiplied by the
//! mode's scale and rounded to an integer.

use crate::error::{ExportError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Measurement mode a profile was collected with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureMode {
    ProcessTime,
    WallTime,
    CpuTime,
    Allocations,
    Memory,
    GcRuns,
    GcTime,
}

/// How a mode's scale factor is obtained
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScaleRule {
    Fixed(f64),
    ClockTicksPerSecond,
    CpuFrequency,
}

impl MeasureMode {
    pub const ALL: [MeasureMode; 7] = [
        MeasureMode::ProcessTime,
        MeasureMode::WallTime,
        MeasureMode::CpuTime,
        MeasureMode::Allocations,
        MeasureMode::Memory,
        MeasureMode::GcRuns,
        MeasureMode::GcTime,
    ];

    /// Event label written to the `events:` header
    pub fn label(self) -> &'static str {
        match self {
            MeasureMode::ProcessTime => "process_time",
            MeasureMode::WallTime => "wall_time",
            MeasureMode::CpuTime => "cpu_time",
            MeasureMode::Allocations => "allocations",
            MeasureMode::Memory => "memory",
            MeasureMode::GcRuns => "gc_runs",
            MeasureMode::GcTime => "gc_time",
        }
    }

    pub fn scale_rule(self) -> ScaleRule {
        match self {
            MeasureMode::ProcessTime => ScaleRule::ClockTicksPerSecond,
            MeasureMode::WallTime => ScaleRule::Fixed(1_000_000.0),
            MeasureMode::CpuTime => ScaleRule::CpuFrequency,
            MeasureMode::Allocations => ScaleRule::Fixed(1.0),
            MeasureMode::Memory => ScaleRule::Fixed(1.0),
            MeasureMode::GcRuns => ScaleRule::Fixed(1.0),
            MeasureMode::GcTime => ScaleRule::Fixed(1_000_000.0),
        }
    }
}

impl fmt::Display for MeasureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MeasureMode {
    type Err = ExportError;

    /// Accepts the event label (`wall_time`) or its kebab-case form (`wall-time`)
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        MeasureMode::ALL
            .into_iter()
            .find(|mode| mode.label() == normalized)
            .ok_or_else(|| ExportError::UnsupportedMeasureMode(s.to_string()))
    }
}

/// Host quantities some scale rules depend on
pub trait HostClock {
    /// Clock ticks per second used for process time
    fn clock_ticks_per_second(&self) -> Result<f64>;

    /// CPU frequency in Hz used for cpu time
    fn cpu_frequency(&self) -> Result<f64>;
}

/// Queries the running host
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl HostClock for SystemClock {
    #[cfg(unix)]
    fn clock_ticks_per_second(&self) -> Result<f64> {
        // SAFETY: sysconf has no preconditions and only reads a constant.
        let ticks = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
        if ticks <= 0 {
            return Err(ExportError::HostQuery {
                quantity: "clock ticks per second",
                reason: format!("sysconf(_SC_CLK_TCK) returned {}", ticks),
            });
        }
        Ok(ticks as f64)
    }

    #[cfg(not(unix))]
    fn clock_ticks_per_second(&self) -> Result<f64> {
        Err(ExportError::HostQuery {
            quantity: "clock ticks per second",
            reason: "not supported on this platform".to_string(),
        })
    }

    fn cpu_frequency(&self) -> Result<f64> {
        let cpuinfo =
            std::fs::read_to_string("/proc/cpuinfo").map_err(|e| ExportError::HostQuery {
                quantity: "cpu frequency",
                reason: e.to_string(),
            })?;
        parse_cpu_mhz(&cpuinfo)
            .map(|mhz| mhz * 1_000_000.0)
            .ok_or_else(|| ExportError::HostQuery {
                quantity: "cpu frequency",
                reason: "no `cpu MHz` entry in /proc/cpuinfo".to_string(),
            })
    }
}

/// Fixed host quantities, for overrides and tests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedClock {
    pub clock_ticks_per_second: f64,
    pub cpu_frequency: f64,
}

impl HostClock for FixedClock {
    fn clock_ticks_per_second(&self) -> Result<f64> {
        Ok(self.clock_ticks_per_second)
    }

    fn cpu_frequency(&self) -> Result<f64> {
        Ok(self.cpu_frequency)
    }
}

/// First `cpu MHz` value in /proc/cpuinfo contents
fn parse_cpu_mhz(cpuinfo: &str) -> Option<f64> {
    cpuinfo.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        if key.trim() != "cpu MHz" {
            return None;
        }
        value.trim().parse::<f64>().ok().filter(|mhz| *mhz > 0.0)
    })
}

/// Output label and scale of the active measurement mode
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementUnit {
    pub mode: MeasureMode,
    pub label: &'static str,
    pub scale: f64,
}

impl MeasurementUnit {
    /// Resolve the label and scale for `mode`, querying `clock` when needed
    pub fn resolve(mode: MeasureMode, clock: &dyn HostClock) -> Result<Self> {
        let scale = match mode.scale_rule() {
            ScaleRule::Fixed(scale) => scale,
            ScaleRule::ClockTicksPerSecond => clock.clock_ticks_per_second()?,
            ScaleRule::CpuFrequency => clock.cpu_frequency()?,
        };
        Ok(Self {
            mode,
            label: mode.label(),
            scale,
        })
    }

    /// Scale a recorded value and round it to an integer
    pub fn convert(&self, value: f64) -> i64 {
        (value * self.scale).round() as i64
    }
}
