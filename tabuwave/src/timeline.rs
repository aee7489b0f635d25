// Copyright 2024-2025 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>
//
// Per signal index of half-open time intervals with a constant value.

use crate::hierarchy::NodeKind;
use crate::Time;

/// Raw value changes of one signal in the order they appear in the trace.
pub type RawChanges = Vec<(Time, String)>;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum CompactionError {
    #[error("signal never changes its value")]
    NoChanges,
    #[error("change at {next} does not come after the change at {prev}")]
    UnorderedChanges { prev: Time, next: Time },
    #[error("change at {time} comes after the end of the trace at {max_time}")]
    ChangeAfterEnd { time: Time, max_time: Time },
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("time {time} lies before the first change at {first}")]
    BeforeFirstChange { time: Time, first: Time },
    #[error("time {time} lies past the end of the trace ({end} is the first time without value)")]
    PastEnd { time: Time, end: Time },
    #[error("a {0} has no values")]
    NotQueryable(NodeKind),
    #[error("`{signal}` cannot be queried: {reason}")]
    Unqueryable {
        signal: String,
        reason: CompactionError,
    },
}

/// Disjoint intervals `[starts[i], starts[i+1])` and a last one `[starts[n-1], end)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    starts: Vec<Time>,
    values: Vec<String>,
    end: Time,
}

impl Timeline {
    /// Builds the interval index. Adjacent intervals with the same value are merged.
    /// The last change stays valid until `max_time` (inclusive).
    pub fn compact(changes: RawChanges, max_time: Time) -> Result<Self, CompactionError> {
        let mut starts: Vec<Time> = Vec::with_capacity(changes.len());
        let mut values: Vec<String> = Vec::with_capacity(changes.len());
        let mut prev_time: Option<Time> = None;
        for (time, value) in changes {
            if let Some(prev) = prev_time {
                if time <= prev {
                    return Err(CompactionError::UnorderedChanges { prev, next: time });
                }
            }
            prev_time = Some(time);
            if time > max_time {
                return Err(CompactionError::ChangeAfterEnd { time, max_time });
            }
            if values.last() == Some(&value) {
                continue;
            }
            starts.push(time);
            values.push(value);
        }
        if starts.is_empty() {
            return Err(CompactionError::NoChanges);
        }
        starts.shrink_to_fit();
        values.shrink_to_fit();
        Ok(Timeline {
            starts,
            values,
            end: max_time.saturating_add(1),
        })
    }

    /// Finds the value that is valid at `time`.
    pub fn value_at(&self, time: Time) -> Result<&str, QueryError> {
        if time >= self.end {
            return Err(QueryError::PastEnd {
                time,
                end: self.end,
            });
        }
        match self.starts.partition_point(|&start| start <= time) {
            0 => Err(QueryError::BeforeFirstChange {
                time,
                first: self.first_time(),
            }),
            idx => Ok(&self.values[idx - 1]),
        }
    }

    /// Time of the first recorded change.
    pub fn first_time(&self) -> Time {
        self.starts[0]
    }

    /// First time that is no longer covered.
    pub fn end(&self) -> Time {
        self.end
    }

    /// Number of intervals.
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// Iterates over `(start, end, value)` of each interval in time order.
    pub fn intervals(&self) -> impl Iterator<Item = (Time, Time, &str)> + '_ {
        let ends = self.starts.iter().skip(1).copied().chain(Some(self.end));
        self.starts
            .iter()
            .zip(ends)
            .zip(self.values.iter())
            .map(|((&start, end), value)| (start, end, value.as_str()))
    }

    /// Iterates over the distinct values in time order.
    pub fn values(&self) -> impl Iterator<Item = &str> + '_ {
        self.values.iter().map(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changes(c: &[(Time, &str)]) -> RawChanges {
        c.iter().map(|(t, v)| (*t, v.to_string())).collect()
    }

    #[test]
    fn test_compact_and_lookup() {
        let t = Timeline::compact(changes(&[(0, "0"), (5, "1"), (8, "0")]), 10).unwrap();
        let intervals: Vec<_> = t.intervals().collect();
        assert_eq!(intervals, [(0, 5, "0"), (5, 8, "1"), (8, 11, "0")]);
        assert_eq!(t.value_at(0), Ok("0"));
        assert_eq!(t.value_at(4), Ok("0"));
        assert_eq!(t.value_at(5), Ok("1"));
        assert_eq!(t.value_at(10), Ok("0"));
        assert_eq!(t.value_at(11), Err(QueryError::PastEnd { time: 11, end: 11 }));
    }

    #[test]
    fn test_equal_values_are_merged() {
        let t = Timeline::compact(changes(&[(2, "1"), (4, "1"), (6, "0"), (7, "0")]), 7).unwrap();
        assert_eq!(t.len(), 2);
        let intervals: Vec<_> = t.intervals().collect();
        assert_eq!(intervals, [(2, 6, "1"), (6, 8, "0")]);
        assert_eq!(
            t.value_at(1),
            Err(QueryError::BeforeFirstChange { time: 1, first: 2 })
        );
    }

    #[test]
    fn test_compaction_errors() {
        assert_eq!(
            Timeline::compact(vec![], 3),
            Err(CompactionError::NoChanges)
        );
        assert_eq!(
            Timeline::compact(changes(&[(3, "1"), (3, "0")]), 3),
            Err(CompactionError::UnorderedChanges { prev: 3, next: 3 })
        );
        assert_eq!(
            Timeline::compact(changes(&[(2, "1"), (4, "1"), (3, "0")]), 5),
            Err(CompactionError::UnorderedChanges { prev: 4, next: 3 })
        );
        assert_eq!(
            Timeline::compact(changes(&[(4, "1")]), 3),
            Err(CompactionError::ChangeAfterEnd { time: 4, max_time: 3 })
        );
    }

    #[test]
    fn test_max_time_does_not_overflow() {
        let t = Timeline::compact(changes(&[(Time::MAX, "1")]), Time::MAX).unwrap();
        assert_eq!(t.end(), Time::MAX);
        assert!(t.value_at(Time::MAX).is_err());
    }
}
