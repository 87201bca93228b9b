//! Calltree - export weighted call-graph profiles for KCachegrind
//!
//! This library turns an already-collected call-graph profile into the
//! line-oriented calltree format read by KCachegrind, QCachegrind and similar
//! call-graph viewers, either with all calling contexts merged per method or
//! with one block per calling context.

pub mod call_sequence;
pub mod cli;
pub mod error;
pub mod measure_mode;
pub mod printer;
pub mod profile;
pub mod source_path;

pub use error::{ExportError, Result};
pub use measure_mode::{FixedClock, HostClock, MeasureMode, MeasurementUnit, SystemClock};
pub use printer::{CallTreePrinter, ExportSummary, PrinterOptions};
pub use profile::{CallEdge, MethodInfo, ProfileResult, ThreadProfile};
