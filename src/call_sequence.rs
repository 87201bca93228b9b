//! Call sequences and per-context sequence indices
//!
//! A call sequence is the path of method names from the profiling root to a
//! call edge, e.g. `Object#main->Object#run->Object#foo`. When aggregation is
//! disabled every method block is labelled with an index identifying the
//! parent sequence it was called from, so recursive and context-sensitive
//! paths stay distinguishable in the output.

use std::collections::HashMap;

/// Separator between method names in a call sequence
pub const SEPARATOR: &str = "->";

/// Parent sequence of a root-level call
pub const ROOT: &str = "root";

/// Whether `sequence` is a non-empty list of non-empty names
pub fn is_well_formed(sequence: &str) -> bool {
    !sequence.is_empty() && sequence.split(SEPARATOR).all(|name| !name.is_empty())
}

/// Strip the final segment of `sequence`
///
/// Returns [`ROOT`] for single-segment and malformed sequences.
pub fn parent_sequence(sequence: &str) -> &str {
    if !is_well_formed(sequence) {
        return ROOT;
    }
    match sequence.rfind(SEPARATOR) {
        Some(pos) => &sequence[..pos],
        None => ROOT,
    }
}

/// Final segment of `sequence`, the method the edge calls into
pub fn last_segment(sequence: &str) -> &str {
    sequence.rsplit(SEPARATOR).next().unwrap_or(sequence)
}

/// Assigns `1..=k` to the distinct parent sequences of each method, in order
/// of first request
///
/// A cache lives for one export call; create a fresh one per export.
#[derive(Debug, Default)]
pub struct SequenceIndexCache {
    indices: HashMap<String, HashMap<String, usize>>,
}

impl SequenceIndexCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of `parent_sequence` among the contexts `method_name` was seen in
    pub fn index_for(&mut self, method_name: &str, parent_sequence: &str) -> usize {
        let contexts = self.indices.entry(method_name.to_string()).or_default();
        if let Some(&index) = contexts.get(parent_sequence) {
            return index;
        }
        let index = contexts.len() + 1;
        contexts.insert(parent_sequence.to_string(), index);
        index
    }

    /// Index for the edge whose full call sequence is `call_sequence`
    pub fn index_for_sequence(&mut self, method_name: &str, call_sequence: &str) -> usize {
        self.index_for(method_name, parent_sequence(call_sequence))
    }

    /// Number of distinct contexts seen for `method_name`
    pub fn context_count(&self, method_name: &str) -> usize {
        self.indices.get(method_name).map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_sequence() {
        assert_eq!(parent_sequence("a->b->c"), "a->b");
        assert_eq!(parent_sequence("a->b"), "a");
        assert_eq!(parent_sequence("a"), ROOT);
    }

    #[test]
    fn test_parent_sequence_malformed_is_root() {
        assert_eq!(parent_sequence(""), ROOT);
        assert_eq!(parent_sequence("a->"), ROOT);
        assert_eq!(parent_sequence("->a"), ROOT);
        assert_eq!(parent_sequence("a->->b"), ROOT);
    }

    #[test]
    fn test_last_segment() {
        assert_eq!(last_segment("a->b->c"), "c");
        assert_eq!(last_segment("a"), "a");
        assert_eq!(last_segment(""), "");
    }

    #[test]
    fn test_is_well_formed() {
        assert!(is_well_formed("Object#main"));
        assert!(is_well_formed("A#x->B#y"));
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("A#x->"));
    }

    #[test]
    fn test_index_first_seen_order() {
        let mut cache = SequenceIndexCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.index_for("m", "root"), 1);
        assert_eq!(cache.index_for("m", "root"), 1);
        assert_eq!(cache.index_for("m", "X->Y"), 2);
        assert_eq!(cache.index_for("m", "root"), 1);
        assert_eq!(cache.context_count("m"), 2);
    }

    #[test]
    fn test_index_counters_are_per_method() {
        let mut cache = SequenceIndexCache::new();
        assert_eq!(cache.index_for("a", "root"), 1);
        assert_eq!(cache.index_for("a", "x"), 2);
        assert_eq!(cache.index_for("b", "x"), 1);
        assert_eq!(cache.index_for("b", "root"), 2);
        assert_eq!(cache.context_count("c"), 0);
    }

    #[test]
    fn test_index_for_sequence_strips_own_name() {
        let mut cache = SequenceIndexCache::new();
        assert_eq!(cache.index_for_sequence("foo", "main->foo"), 1);
        assert_eq!(cache.index_for_sequence("foo", "main->bar->foo"), 2);
        assert_eq!(cache.index_for("foo", "main"), 1);
        assert_eq!(cache.index_for("foo", "main->bar"), 2);
        assert_eq!(cache.index_for_sequence("main", "main"), 1);
        assert_eq!(cache.index_for("main", ROOT), 1);
    }
}
