//! Calltree block rendering
//!
//! A block is rendered into memory before it reaches the sink, so a source
//! path that cannot be resolved drops the whole block instead of leaving a
//! truncated one in the output.

use super::ExportSummary;
use crate::error::Result;
use crate::measure_mode::MeasurementUnit;
use crate::profile::{CallEdge, MethodInfo, ThreadProfile};
use crate::source_path;
use std::io::Write;

/// One `fl=`/`fn=` block and its callee entries
pub(crate) struct Block<'a> {
    unit: &'a MeasurementUnit,
    text: String,
}

impl<'a> Block<'a> {
    /// Start a block for `method`, printed as `label`
    pub(crate) fn open(unit: &'a MeasurementUnit, method: &MethodInfo, label: &str) -> Result<Self> {
        let file = source_path::resolve(method)?;
        let mut text = String::new();
        text.push_str(&format!("fl={}\n", file));
        text.push_str(&format!("fn={}\n", label));
        text.push_str(&format!("{} {}\n", method.line, unit.convert(method.self_time)));
        Ok(Self { unit, text })
    }

    /// Add a callee entry for `edge`, with the callee printed as `label`
    pub(crate) fn push_call(&mut self, callee: &MethodInfo, label: &str, edge: &CallEdge) -> Result<()> {
        let file = source_path::resolve(callee)?;
        self.text.push_str(&format!("cfl={}\n", file));
        self.text.push_str(&format!("cfn={}\n", label));
        self.text.push_str(&format!("calls={} {}\n", edge.called, edge.line));
        self.text
            .push_str(&format!("{} {}\n", edge.line, self.unit.convert(edge.total_time)));
        Ok(())
    }

    pub(crate) fn finish(mut self) -> String {
        self.text.push('\n');
        self.text
    }
}

/// Writes rendered blocks to the output and keeps the export tally
pub(crate) struct BlockSink<'a, W: Write> {
    pub(crate) out: &'a mut W,
    pub(crate) unit: &'a MeasurementUnit,
    pub(crate) min_percent: f64,
    pub(crate) summary: &'a mut ExportSummary,
}

impl<W: Write> BlockSink<'_, W> {
    /// Whether `method` meets the minimum %self of its thread
    pub(crate) fn includes(&mut self, thread: &ThreadProfile, method: &MethodInfo) -> bool {
        if self.min_percent <= 0.0 {
            return true;
        }
        let total = thread.total_time();
        let percent = if total > 0.0 {
            method.self_time / total * 100.0
        } else {
            0.0
        };
        if percent < self.min_percent {
            tracing::debug!(
                "Filtered {} ({:.2}% self < {}%)",
                method.full_name,
                percent,
                self.min_percent
            );
            self.summary.blocks_filtered += 1;
            return false;
        }
        true
    }

    /// Write a rendered block, or skip it when only the block itself failed
    pub(crate) fn write_block(&mut self, method_name: &str, block: Result<String>) -> Result<()> {
        match block {
            Ok(text) => {
                self.out.write_all(text.as_bytes())?;
                self.summary.blocks_written += 1;
                Ok(())
            }
            Err(e) if e.is_recoverable() => {
                tracing::warn!("Skipping block for {}: {}", method_name, e);
                self.summary.blocks_skipped += 1;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
