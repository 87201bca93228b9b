//! Property-based tests for the export engine
//!
//! Core properties tested:
//! 1. Value conversion is scale-then-round and monotonic
//! 2. Sequence indices are gap-free per method, in first-seen order
//! 3. Parent sequence derivation never panics
//! 4. Export is repeatable and emits one block per method when aggregated

use calltree::call_sequence::{parent_sequence, SequenceIndexCache, ROOT, SEPARATOR};
use calltree::{
    CallTreePrinter, FixedClock, MeasureMode, MeasurementUnit, PrinterOptions, ProfileResult,
    ThreadProfile,
};
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

const CLOCK: FixedClock = FixedClock {
    clock_ticks_per_second: 100.0,
    cpu_frequency: 1_000_000_000.0,
};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_convert_is_scaled_round(value in 0.0f64..10_000.0) {
        for mode in MeasureMode::ALL {
            let unit = MeasurementUnit::resolve(mode, &CLOCK).unwrap();
            prop_assert_eq!(unit.convert(value), (value * unit.scale).round() as i64);
            prop_assert_eq!(unit.convert(0.0), 0);
        }
    }

    #[test]
    fn prop_convert_is_monotonic(a in 0.0f64..1_000.0, b in 0.0f64..1_000.0) {
        let unit = MeasurementUnit::resolve(MeasureMode::WallTime, &CLOCK).unwrap();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(unit.convert(lo) <= unit.convert(hi));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_sequence_indices_are_gap_free(
        requests in prop::collection::vec(("[a-c]", "[x-z]{1,3}"), 1..50),
    ) {
        let mut cache = SequenceIndexCache::new();
        let mut first_seen: HashMap<(String, String), usize> = HashMap::new();
        let mut per_method: HashMap<String, HashSet<String>> = HashMap::new();

        for (method, parent) in &requests {
            let index = cache.index_for(method, parent);
            let contexts = per_method.entry(method.clone()).or_default();
            contexts.insert(parent.clone());

            let expected = *first_seen
                .entry((method.clone(), parent.clone()))
                .or_insert(contexts.len());
            prop_assert_eq!(index, expected);
            prop_assert!(index >= 1 && index <= contexts.len());
        }

        for (method, contexts) in &per_method {
            prop_assert_eq!(cache.context_count(method), contexts.len());
        }
    }

    #[test]
    fn prop_parent_sequence_never_panics(sequence in ".{0,40}") {
        let parent = parent_sequence(&sequence);
        let prefix = format!("{}{}", parent, SEPARATOR);
        prop_assert!(parent == ROOT || sequence.starts_with(&prefix));
    }

    #[test]
    fn prop_parent_of_joined_names(names in prop::collection::vec("[A-Za-z#_]{1,8}", 1..6)) {
        let sequence = names.join(SEPARATOR);
        let expected = if names.len() > 1 {
            names[..names.len() - 1].join(SEPARATOR)
        } else {
            ROOT.to_string()
        };
        prop_assert_eq!(parent_sequence(&sequence), expected.as_str());
    }
}

/// A chain of calls `m0 -> m1 -> ... -> mN`, each method also called from the root
fn chain_profile(times: &[f64]) -> ProfileResult {
    let mut thread = ThreadProfile::new(1);
    let mut sequence = String::new();
    let mut previous = None;
    for (i, &time) in times.iter().enumerate() {
        let name = format!("m{}", i);
        let method = thread.add_method(name.clone(), "/srv/chain.rb", i as u32 + 1, time, time);
        sequence = if sequence.is_empty() {
            name.clone()
        } else {
            format!("{}{}{}", sequence, SEPARATOR, name)
        };
        thread.add_call(previous, method, 1, i as u32, time, sequence.clone());
        if previous.is_some() {
            thread.add_call(None, method, 1, 0, time, name);
        }
        previous = Some(method);
    }
    let mut profile = ProfileResult::new("wall_time");
    profile.threads.push(thread);
    profile
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn prop_export_is_repeatable(times in prop::collection::vec(0.0f64..5.0, 1..12)) {
        let profile = chain_profile(&times);
        for options in [PrinterOptions::default(), PrinterOptions::without_aggregation()] {
            let printer = CallTreePrinter::with_clock(options, Box::new(CLOCK));
            let first = printer.print_to_string(&profile).unwrap();
            let second = printer.print_to_string(&profile).unwrap();
            prop_assert_eq!(first, second);
        }
    }

    #[test]
    fn prop_aggregated_block_per_method(times in prop::collection::vec(0.0f64..5.0, 1..12)) {
        let profile = chain_profile(&times);
        let printer = CallTreePrinter::with_clock(PrinterOptions::default(), Box::new(CLOCK));
        let mut out = Vec::new();
        let summary = printer.print(&profile, &mut out).unwrap();
        let output = String::from_utf8(out).unwrap();

        prop_assert_eq!(summary.blocks_written, times.len());
        prop_assert_eq!(output.matches("\nfn=").count(), times.len());
    }

    #[test]
    fn prop_per_context_blocks_match_contexts(times in prop::collection::vec(0.0f64..5.0, 1..12)) {
        // every method after the first has a caller context and a root context
        let profile = chain_profile(&times);
        let printer =
            CallTreePrinter::with_clock(PrinterOptions::without_aggregation(), Box::new(CLOCK));
        let mut out = Vec::new();
        let summary = printer.print(&profile, &mut out).unwrap();

        prop_assert_eq!(summary.blocks_written, 2 * times.len() - 1);
    }
}
