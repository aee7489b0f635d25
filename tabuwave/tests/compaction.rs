// Copyright 2025 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

mod utils;

use itertools::Itertools;
use proptest::prelude::*;
use tabuwave::compaction::{compact_all, compact_sequential};
use tabuwave::*;
use utils::*;

/// Raw changes with strictly increasing timestamps for every signal.
fn raw_changes() -> impl Strategy<Value = Vec<RawChanges>> {
    let signal = prop::collection::vec((1u64..20, "[01xz]{1,4}"), 0..30).prop_map(|deltas| {
        let mut time = 0;
        deltas
            .into_iter()
            .map(|(delta, value)| {
                time += delta;
                (time, value)
            })
            .collect::<RawChanges>()
    });
    prop::collection::vec(signal, 0..40)
}

fn last_time(changes: &[RawChanges]) -> Time {
    changes
        .iter()
        .filter_map(|c| c.last().map(|(t, _)| *t))
        .max()
        .unwrap_or(0)
}

proptest! {
    #[test]
    fn sharded_matches_sequential(changes in raw_changes(), workers in 1usize..=8, slack in 0u64..5) {
        let max_time = last_time(&changes) + slack;
        let expected = compact_sequential(changes.clone(), max_time);
        let actual = compact_all(changes, max_time, workers).unwrap();
        for (e, a) in expected.iter().zip_eq(actual.iter()) {
            prop_assert_eq!(e, a);
        }
    }

    #[test]
    fn intervals_partition_the_covered_time(changes in raw_changes(), slack in 0u64..5) {
        let max_time = last_time(&changes) + slack;
        let timelines = compact_all(changes.clone(), max_time, 4).unwrap();
        for (raw, result) in changes.iter().zip_eq(timelines.iter()) {
            let Ok(timeline) = result else {
                prop_assert!(raw.is_empty());
                prop_assert_eq!(result, &Err(CompactionError::NoChanges));
                continue;
            };
            prop_assert_eq!(timeline.first_time(), raw[0].0);
            prop_assert_eq!(timeline.end(), max_time + 1);
            for ((_, end, value), (next_start, _, next_value)) in timeline.intervals().tuple_windows() {
                prop_assert_eq!(end, next_start);
                prop_assert_ne!(value, next_value);
            }
            for (time, value) in raw.iter() {
                prop_assert_eq!(timeline.value_at(*time), Ok(value.as_str()));
            }
            for (start, end, value) in timeline.intervals() {
                prop_assert!(start < end);
                prop_assert_eq!(timeline.value_at(end - 1), Ok(value));
            }
        }
    }
}

#[test]
fn test_unordered_changes_only_affect_their_signal() {
    let changes = vec![
        vec![(0, "1".to_string()), (4, "0".to_string())],
        vec![(2, "1".to_string()), (4, "1".to_string()), (3, "0".to_string())],
        vec![(1, "0".to_string())],
    ];
    let results = compact_all(changes, 5, 3).unwrap();
    assert!(results[0].is_ok());
    assert_eq!(
        results[1],
        Err(CompactionError::UnorderedChanges { prev: 4, next: 3 })
    );
    assert_eq!(results[2].as_ref().unwrap().value_at(5), Ok("0"));
}

#[test]
fn test_change_after_end() {
    let results = compact_sequential(vec![vec![(9, "1".to_string())]], 8);
    assert_eq!(
        results[0],
        Err(CompactionError::ChangeAfterEnd {
            time: 9,
            max_time: 8
        })
    );
}

/// A trace with `n` counters that each toggle at a different rate.
fn counter_trace(n: usize, steps: u64) -> String {
    let mut out = String::from("$timescale 1ns $end\n$scope module top $end\n");
    for ii in 0..n {
        out.push_str(&format!("$var wire 8 s{ii} sig[{ii}] $end\n"));
    }
    out.push_str("$upscope $end\n$enddefinitions $end\n");
    for step in 0..steps {
        out.push_str(&format!("#{step}\n"));
        for ii in 0..n {
            if step % (ii as u64 + 1) == 0 {
                out.push_str(&format!("b{:b} s{ii}\n", (step / (ii as u64 + 1)) % 256));
            }
        }
    }
    out
}

#[test]
fn test_worker_count_does_not_change_results() {
    let trace = counter_trace(13, 50);
    let reference = load_str_single_threaded(&trace);
    let sig = reference.resolve_path("top.sig", None).unwrap();
    assert_eq!(reference.size(sig), Some(13));
    for workers in [1, 2, 3, 7, 13, 64] {
        let wave = load_str_with_workers(&trace, workers);
        for t in [0, 1, 17, 48, 49] {
            assert_eq!(snapshot(&wave, t), snapshot(&reference, t), "workers = {workers}, t = {t}");
            assert_eq!(
                wave.padded_value_at(sig, t, 0),
                reference.padded_value_at(sig, t, 0)
            );
        }
    }
}

#[test]
fn test_load_options() {
    assert_eq!(
        LoadOptions {
            multi_thread: false,
            workers: std::num::NonZeroUsize::new(8)
        }
        .worker_count(),
        1
    );
    assert_eq!(
        LoadOptions {
            multi_thread: true,
            workers: std::num::NonZeroUsize::new(8)
        }
        .worker_count(),
        8
    );
    assert!(LoadOptions::default().worker_count() >= 1);
}
