//! Context-partitioned output
//!
//! Without aggregation a method gets one block per calling context. A context
//! is either an incoming edge from a real caller, identified by that edge's
//! call sequence, or the profiling root. The block for a caller context only
//! lists the children that were called while on that call path, and every
//! name carries its [`SequenceIndexCache`] index so the same method reached
//! through different paths shows up as distinct functions.

use super::block::{Block, BlockSink};
use crate::call_sequence::{self, SequenceIndexCache};
use crate::error::Result;
use crate::measure_mode::MeasurementUnit;
use crate::profile::{CallEdge, MethodInfo, ThreadProfile};
use std::collections::HashSet;
use std::io::Write;

/// Where a method was called from
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum CallContext<'a> {
    Root,
    Caller(&'a CallEdge),
}

/// Print one block per (method, context), last-listed method first
pub(crate) fn print_methods<W: Write>(
    thread: &ThreadProfile,
    cache: &mut SequenceIndexCache,
    sink: &mut BlockSink<'_, W>,
) -> Result<()> {
    for method in thread.methods.iter().rev() {
        if !sink.includes(thread, method) {
            continue;
        }
        for context in incoming_contexts(thread, method) {
            let block = render(thread, method, context, cache, sink.unit);
            sink.write_block(&method.full_name, block)?;
        }
    }
    Ok(())
}

/// Distinct calling contexts of `method`, in order of first appearance
///
/// A method without incoming edges is printed once, under the root context.
pub(crate) fn incoming_contexts<'a>(thread: &'a ThreadProfile, method: &'a MethodInfo) -> Vec<CallContext<'a>> {
    let mut contexts = Vec::new();
    let mut seen = HashSet::new();
    let mut root_seen = false;

    for edge in thread.call_infos(method) {
        if edge.caller.is_some() && call_sequence::is_well_formed(&edge.call_sequence) {
            if seen.insert(edge.call_sequence.as_str()) {
                contexts.push(CallContext::Caller(edge));
            }
        } else {
            if edge.caller.is_some() {
                tracing::debug!(
                    "Malformed call sequence {:?} for {}, using root context",
                    edge.call_sequence,
                    method.full_name
                );
            }
            if !root_seen {
                root_seen = true;
                contexts.push(CallContext::Root);
            }
        }
    }

    if contexts.is_empty() {
        contexts.push(CallContext::Root);
    }
    contexts
}

/// Children of `method` called while on the context's call path
pub(crate) fn children_in_context<'a>(
    thread: &'a ThreadProfile,
    method: &'a MethodInfo,
    context: CallContext<'a>,
) -> Vec<&'a CallEdge> {
    match context {
        CallContext::Root => thread.children(method).collect(),
        CallContext::Caller(incoming) => thread
            .children(method)
            .filter(|child| child.call_sequence.contains(incoming.call_sequence.as_str()))
            .collect(),
    }
}

/// Render one context block
///
/// Index slots are claimed before source paths are resolved, so a block
/// skipped for an unresolvable path still consumes its indices.
fn render(
    thread: &ThreadProfile,
    method: &MethodInfo,
    context: CallContext<'_>,
    cache: &mut SequenceIndexCache,
    unit: &MeasurementUnit,
) -> Result<String> {
    let label = match context {
        CallContext::Root => method.full_name.clone(),
        CallContext::Caller(incoming) => indexed_name(cache, &method.full_name, incoming),
    };
    let mut block = Block::open(unit, method, &label)?;

    for edge in children_in_context(thread, method, context) {
        let callee = thread.method(edge.target);
        let callee_label = indexed_name(cache, &callee.full_name, edge);
        block.push_call(callee, &callee_label, edge)?;
    }
    Ok(block.finish())
}

fn indexed_name(cache: &mut SequenceIndexCache, name: &str, edge: &CallEdge) -> String {
    format!("{}({})", name, cache.index_for_sequence(name, &edge.call_sequence))
}
