// Copyright 2024-2025 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>
//
// Builds the timelines of all signals in parallel. Signals are independent of each other,
// thus every worker owns one contiguous shard of the signal list.

use crate::timeline::{CompactionError, RawChanges, Timeline};
use crate::Time;
use rayon::prelude::*;
use std::ops::Range;

pub type CompactionResult = Result<Timeline, CompactionError>;

/// Hardware parallelism minus one for the rest of the process, but at least one.
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .saturating_sub(1)
        .max(1)
}

/// Splits `0..len` into at most `workers` contiguous ranges whose sizes differ by at most one.
/// The first `len % workers` ranges get the extra element.
pub fn partition_shards(len: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = workers.clamp(1, len.max(1));
    let base = len / workers;
    let remainder = len % workers;
    let mut start = 0;
    (0..workers)
        .map(|worker| {
            let size = base + usize::from(worker < remainder);
            let range = start..start + size;
            start += size;
            range
        })
        .collect()
}

enum Slot {
    Pending(RawChanges),
    Done(CompactionResult),
}

impl Slot {
    #[inline]
    fn compact(&mut self, max_time: Time) {
        if let Slot::Pending(changes) = self {
            let changes = std::mem::take(changes);
            *self = Slot::Done(Timeline::compact(changes, max_time));
        }
    }

    #[inline]
    fn into_result(self, max_time: Time) -> CompactionResult {
        match self {
            Slot::Done(result) => result,
            Slot::Pending(changes) => Timeline::compact(changes, max_time),
        }
    }
}

/// Compacts every signal on the calling thread.
pub fn compact_sequential(changes: Vec<RawChanges>, max_time: Time) -> Vec<CompactionResult> {
    changes
        .into_iter()
        .map(|c| Timeline::compact(c, max_time))
        .collect()
}

/// Compacts every signal on a pool of `workers` threads. Results are in signal order and
/// identical to `compact_sequential`.
pub fn compact_all(
    changes: Vec<RawChanges>,
    max_time: Time,
    workers: usize,
) -> Result<Vec<CompactionResult>, rayon::ThreadPoolBuildError> {
    let shards = partition_shards(changes.len(), workers);
    if shards.len() <= 1 {
        return Ok(compact_sequential(changes, max_time));
    }
    log::debug!(
        "compacting {} signals on {} workers, shard sizes {:?}",
        changes.len(),
        shards.len(),
        shards.iter().map(|s| s.len()).collect::<Vec<_>>()
    );

    let mut slots: Vec<Slot> = changes.into_iter().map(Slot::Pending).collect();
    let mut parts: Vec<&mut [Slot]> = Vec::with_capacity(shards.len());
    let mut rest = slots.as_mut_slice();
    for shard in shards.iter() {
        let (head, tail) = std::mem::take(&mut rest).split_at_mut(shard.len());
        parts.push(head);
        rest = tail;
    }
    debug_assert!(rest.is_empty());

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(shards.len())
        .build()?;
    pool.install(|| {
        parts.into_par_iter().for_each(|shard| {
            for slot in shard.iter_mut() {
                slot.compact(max_time);
            }
        })
    });

    Ok(slots
        .into_iter()
        .map(|slot| slot.into_result(max_time))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_partition_shards() {
        assert_eq!(partition_shards(10, 3), [0..4, 4..7, 7..10]);
        assert_eq!(partition_shards(2, 8), [0..1, 1..2]);
        assert_eq!(partition_shards(0, 4), [0..0]);
        assert_eq!(partition_shards(5, 0), [0..5]);
    }

    #[test]
    fn test_default_worker_count() {
        assert!(default_worker_count() >= 1);
    }

    proptest! {
        #[test]
        fn shards_cover_all_signals(len in 0usize..500, workers in 1usize..64) {
            let shards = partition_shards(len, workers);
            prop_assert!(shards.len() <= workers);
            prop_assert_eq!(shards.first().map(|s| s.start), Some(0));
            prop_assert_eq!(shards.last().map(|s| s.end), Some(len));
            for pair in shards.windows(2) {
                prop_assert_eq!(pair[0].end, pair[1].start);
                prop_assert!(pair[0].len() >= pair[1].len());
                prop_assert!(pair[0].len() - pair[1].len() <= 1);
            }
        }
    }
}
