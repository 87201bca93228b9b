#![no_main]

use calltree::call_sequence::{last_segment, parent_sequence, SequenceIndexCache};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary call sequences must never panic and must index consistently
    if let Ok(sequence) = std::str::from_utf8(data) {
        let mut cache = SequenceIndexCache::new();
        let name = last_segment(sequence);
        let first = cache.index_for_sequence(name, sequence);
        let again = cache.index_for(name, parent_sequence(sequence));
        assert_eq!(first, again);
        assert_eq!(first, 1);
    }
});
