//! CLI argument parsing for calltree

use crate::printer::PrinterOptions;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "calltree")]
#[command(version)]
#[command(about = "Export call-graph profiles in calltree format for KCachegrind", long_about = None)]
pub struct Cli {
    /// Profile snapshot to export (JSON), or `-` for stdin
    #[arg(value_name = "PROFILE")]
    pub profile: PathBuf,

    /// Write the calltree to FILE instead of stdout
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print one block per calling context instead of merging contexts
    #[arg(long = "no-aggregate")]
    pub no_aggregate: bool,

    /// Suppress methods whose %self is below this percentage (0-100)
    #[arg(long = "min-percent", value_name = "PERCENT")]
    pub min_percent: Option<f64>,

    /// Print source files (calltree output always includes them)
    #[arg(long = "print-file")]
    pub print_file: bool,

    /// Override the measurement mode recorded in the profile (e.g. wall_time)
    #[arg(long = "measure-mode", value_name = "MODE")]
    pub measure_mode: Option<String>,

    /// CPU frequency in Hz for cpu_time profiles
    #[arg(long = "cpu-frequency", value_name = "HZ")]
    pub cpu_frequency: Option<f64>,

    /// Clock ticks per second for process_time profiles
    #[arg(long = "clock-ticks", value_name = "TICKS")]
    pub clock_ticks: Option<f64>,

    /// Printer options file (TOML); command-line flags take precedence
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug tracing output to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

impl Cli {
    /// Apply command-line overrides on top of `base`
    pub fn printer_options(&self, base: PrinterOptions) -> PrinterOptions {
        let mut options = base;
        if self.no_aggregate {
            options.aggregate = false;
        }
        if let Some(min_percent) = self.min_percent {
            options.min_percent = min_percent;
        }
        if self.print_file {
            options.print_file = true;
        }
        if let Some(hz) = self.cpu_frequency {
            options.cpu_frequency = Some(hz);
        }
        if let Some(ticks) = self.clock_ticks {
            options.clock_ticks_per_second = Some(ticks);
        }
        options
    }

    /// Whether the profile is read from stdin
    pub fn reads_stdin(&self) -> bool {
        self.profile.as_os_str() == "-"
    }
}
