//! Aggregated output: one block per method, all calling contexts merged

use super::block::{Block, BlockSink};
use crate::error::Result;
use crate::measure_mode::MeasurementUnit;
use crate::profile::{MethodInfo, ThreadProfile};
use std::io::Write;

/// Print one block per method, last-listed method first
pub(crate) fn print_methods<W: Write>(thread: &ThreadProfile, sink: &mut BlockSink<'_, W>) -> Result<()> {
    for method in thread.methods.iter().rev() {
        if !sink.includes(thread, method) {
            continue;
        }
        let block = render(thread, method, sink.unit);
        sink.write_block(&method.full_name, block)?;
    }
    Ok(())
}

fn render(thread: &ThreadProfile, method: &MethodInfo, unit: &MeasurementUnit) -> Result<String> {
    let mut block = Block::open(unit, method, &method.full_name)?;
    for edge in thread.children(method) {
        let callee = thread.method(edge.target);
        block.push_call(callee, &callee.full_name, edge)?;
    }
    Ok(block.finish())
}
