//! Time-ordered nearest-match joins.
//!
//! Every left row is matched against the right rows of its `by` group, which
//! are sorted by timestamp once up front. Direction picks the side of the left
//! timestamp to search, tolerance bounds the distance, and the match policy
//! decides whether one or every qualifying right row is emitted. Right rows
//! with equal timestamps keep their original relative order, and the first of
//! them wins a tie.

use std::collections::HashMap;
use std::ops::Range;

use tabprep_model::{AsOfDirection, AsOfSpec, MatchPolicy, MergeError, Result, Table};
use tracing::{debug, warn};

use crate::equality::{claim_right_columns, copy_right};
use crate::index::TableIndex;
use crate::key::{JoinKey, Side};
use crate::naming::ColumnNamer;
use crate::timestamp::{Timestamp, seconds_to_micros};

/// A right row on its group's timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    at: Timestamp,
    pos: usize,
}

/// Candidate selection derived from an [`AsOfSpec`].
#[derive(Debug, Clone, Copy)]
struct Matcher {
    direction: AsOfDirection,
    tolerance: Option<u64>,
    allow_exact: bool,
    policy: MatchPolicy,
}

impl Matcher {
    fn from_spec(spec: &AsOfSpec) -> Result<Self> {
        let tolerance = match spec.tolerance_seconds {
            None => None,
            Some(seconds) if seconds >= 0.0 => Some(
                seconds_to_micros(seconds)
                    .and_then(|micros| u64::try_from(micros).ok())
                    .ok_or_else(|| invalid_tolerance(seconds))?,
            ),
            Some(seconds) => return Err(invalid_tolerance(seconds)),
        };
        Ok(Self {
            direction: spec.direction,
            tolerance,
            allow_exact: spec.allow_exact_matches,
            policy: spec.matches,
        })
    }

    /// Indices into `timeline` of the right rows matching a left row at `t`.
    fn select(&self, timeline: &[Entry], t: Timestamp) -> Vec<usize> {
        match self.policy {
            MatchPolicy::Best => self.best(timeline, t).into_iter().collect(),
            MatchPolicy::All => self.all(timeline, t).collect(),
        }
    }

    fn best(&self, timeline: &[Entry], t: Timestamp) -> Option<usize> {
        let candidate = match self.direction {
            AsOfDirection::Backward => self.backward(timeline, t),
            AsOfDirection::Forward => self.forward(timeline, t),
            AsOfDirection::Nearest => {
                match (self.backward(timeline, t), self.forward(timeline, t)) {
                    (Some(before), Some(after)) => {
                        let before_gap = timeline[before].at.distance(t);
                        let after_gap = timeline[after].at.distance(t);
                        if after_gap < before_gap {
                            Some(after)
                        } else {
                            Some(before)
                        }
                    }
                    (before, after) => before.or(after),
                }
            }
        }?;
        self.within_tolerance(timeline[candidate].at, t)
            .then_some(candidate)
    }

    /// First entry carrying the greatest timestamp at or before `t`.
    fn backward(&self, timeline: &[Entry], t: Timestamp) -> Option<usize> {
        let end = self.before_end(timeline, t);
        let latest = timeline[..end].last()?.at;
        Some(timeline.partition_point(|entry| entry.at < latest))
    }

    /// First entry carrying the smallest timestamp at or after `t`.
    fn forward(&self, timeline: &[Entry], t: Timestamp) -> Option<usize> {
        let start = self.after_start(timeline, t);
        (start < timeline.len()).then_some(start)
    }

    fn all(&self, timeline: &[Entry], t: Timestamp) -> impl Iterator<Item = usize> {
        let lower = self.tolerance.map_or(0, |tolerance| {
            let floor = t.micros().saturating_sub_unsigned(tolerance);
            timeline.partition_point(|entry| entry.at.micros() < floor)
        });
        let upper = self.tolerance.map_or(timeline.len(), |tolerance| {
            let ceiling = t.micros().saturating_add_unsigned(tolerance);
            timeline.partition_point(|entry| entry.at.micros() <= ceiling)
        });
        let before = lower..self.before_end(timeline, t).max(lower);
        let after = self.after_start(timeline, t).min(upper)..upper;
        let ranges: [Range<usize>; 2] = match self.direction {
            AsOfDirection::Backward => [before, 0..0],
            AsOfDirection::Forward => [after, 0..0],
            AsOfDirection::Nearest if before.end > after.start => [before.start..after.end, 0..0],
            AsOfDirection::Nearest => [before, after],
        };
        ranges.into_iter().flatten()
    }

    /// End of the prefix of entries eligible for a backward match.
    fn before_end(&self, timeline: &[Entry], t: Timestamp) -> usize {
        if self.allow_exact {
            timeline.partition_point(|entry| entry.at <= t)
        } else {
            timeline.partition_point(|entry| entry.at < t)
        }
    }

    /// Start of the suffix of entries eligible for a forward match.
    fn after_start(&self, timeline: &[Entry], t: Timestamp) -> usize {
        if self.allow_exact {
            timeline.partition_point(|entry| entry.at < t)
        } else {
            timeline.partition_point(|entry| entry.at <= t)
        }
    }

    fn within_tolerance(&self, at: Timestamp, t: Timestamp) -> bool {
        self.tolerance
            .is_none_or(|tolerance| at.distance(t) <= tolerance)
    }
}

fn invalid_tolerance(seconds: f64) -> MergeError {
    MergeError::InvalidSpec(format!(
        "tolerance must be a finite, non-negative number of seconds, got {seconds}"
    ))
}

/// Joins each row of `left` to the right row nearest in time.
///
/// The output holds the left headers followed by the right headers other than
/// the right time column and the right `by` columns. Left rows without a
/// qualifying match, including rows whose timestamp cannot be parsed, are
/// emitted once with empty right columns.
pub fn join(left: &Table, right: &Table, spec: &AsOfSpec) -> Result<Table> {
    let matcher = Matcher::from_spec(spec)?;
    let left_time = spec.left_time.resolve(&left.name, &left.headers)?;
    let right_time = spec.right_time.resolve(&right.name, &right.headers)?;
    let left_by = JoinKey::resolve(left, &spec.by, Side::Left)?;
    let right_by = JoinKey::resolve(right, &spec.by, Side::Right)?;

    let mut namer = ColumnNamer::new(&left.headers, &spec.suffix);
    let right_columns = claim_right_columns(
        right,
        |column| column == right_time || right_by.contains(column),
        &mut namer,
    );
    let mut headers = left.headers.clone();
    headers.extend(right_columns.iter().map(|(_, output)| output.clone()));

    let timelines = build_timelines(right, right_time, &right_by);

    let mut rows = Vec::with_capacity(left.len());
    let mut unparseable = 0usize;
    let mut matched = 0usize;
    for (pos, left_row) in left.rows.iter().enumerate() {
        let value = left_row.value(left_time);
        let Some(t) = Timestamp::parse(value) else {
            unparseable += 1;
            debug!(table = %left.name, row = pos, column = left_time, "unparseable timestamp");
            rows.push(left_row.clone());
            continue;
        };
        let timeline = timelines
            .get(&left_by.value(left_row))
            .map(Vec::as_slice)
            .unwrap_or_default();
        let selected = matcher.select(timeline, t);
        if selected.is_empty() {
            rows.push(left_row.clone());
            continue;
        }
        matched += 1;
        for index in selected {
            let mut row = left_row.clone();
            copy_right(&mut row, &right.rows[timeline[index].pos], &right_columns);
            rows.push(row);
        }
    }
    if unparseable > 0 {
        warn!(
            table = %left.name,
            column = left_time,
            count = unparseable,
            "left rows with unparseable timestamps were left unmatched"
        );
    }
    debug!(
        left = %left.name,
        right = %right.name,
        direction = %spec.direction,
        matched,
        unmatched = left.len() - matched,
        "as-of join"
    );

    let mut joined = Table::new(left.name.clone(), headers).with_rows(rows);
    joined.finalize();
    Ok(joined)
}

/// Right rows with a valid timestamp, grouped by `by` key and sorted by time.
fn build_timelines(right: &Table, right_time: &str, by: &JoinKey) -> HashMap<String, Vec<Entry>> {
    let index = TableIndex::build(&right.rows, |row| by.value(row));
    let mut unparseable = 0usize;
    let mut timelines = HashMap::with_capacity(index.len());
    for (key, positions) in index.groups() {
        let mut timeline: Vec<Entry> = positions
            .iter()
            .filter_map(|&pos| match Timestamp::parse(right.rows[pos].value(right_time)) {
                Some(at) => Some(Entry { at, pos }),
                None => {
                    unparseable += 1;
                    None
                }
            })
            .collect();
        // Stable: equal timestamps keep right-table order.
        timeline.sort_by_key(|entry| entry.at);
        timelines.insert(key.to_string(), timeline);
    }
    if unparseable > 0 {
        warn!(
            table = %right.name,
            column = right_time,
            count = unparseable,
            "right rows with unparseable timestamps are excluded from matching"
        );
    }
    timelines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(seconds: &[i64]) -> Vec<Entry> {
        seconds
            .iter()
            .enumerate()
            .map(|(pos, s)| Entry {
                at: Timestamp::from_micros(s * 1_000_000),
                pos,
            })
            .collect()
    }

    fn matcher(direction: AsOfDirection) -> Matcher {
        Matcher {
            direction,
            tolerance: None,
            allow_exact: true,
            policy: MatchPolicy::Best,
        }
    }

    fn at(seconds: i64) -> Timestamp {
        Timestamp::from_micros(seconds * 1_000_000)
    }

    #[test]
    fn test_backward_prefers_exact_then_first_of_ties() {
        let timeline = entries(&[10, 20, 20, 30]);
        let m = matcher(AsOfDirection::Backward);
        assert_eq!(m.best(&timeline, at(30)), Some(3));
        assert_eq!(m.best(&timeline, at(25)), Some(1));
        assert_eq!(m.best(&timeline, at(5)), None);
    }

    #[test]
    fn test_forward_and_exclusive_exact() {
        let timeline = entries(&[10, 20, 20, 30]);
        let m = matcher(AsOfDirection::Forward);
        assert_eq!(m.best(&timeline, at(20)), Some(1));
        assert_eq!(m.best(&timeline, at(31)), None);

        let strict = Matcher {
            allow_exact: false,
            ..m
        };
        assert_eq!(strict.best(&timeline, at(20)), Some(3));
    }

    #[test]
    fn test_nearest_tie_goes_to_earlier() {
        let timeline = entries(&[10, 30]);
        let m = matcher(AsOfDirection::Nearest);
        assert_eq!(m.best(&timeline, at(20)), Some(0));
        assert_eq!(m.best(&timeline, at(21)), Some(1));
        assert_eq!(m.best(&timeline, at(0)), Some(0));
    }

    #[test]
    fn test_tolerance_is_inclusive() {
        let timeline = entries(&[10]);
        let m = Matcher {
            tolerance: Some(5_000_000),
            ..matcher(AsOfDirection::Backward)
        };
        assert_eq!(m.best(&timeline, at(15)), Some(0));
        assert_eq!(m.best(&timeline, at(16)), None);
    }

    #[test]
    fn test_all_matches_ranges() {
        let timeline = entries(&[10, 20, 30, 40]);
        let all = |direction, tolerance| Matcher {
            direction,
            tolerance,
            allow_exact: true,
            policy: MatchPolicy::All,
        };
        let select = |m: Matcher, t| m.select(&timeline, at(t));

        assert_eq!(select(all(AsOfDirection::Backward, None), 30), vec![0, 1, 2]);
        assert_eq!(
            select(all(AsOfDirection::Backward, Some(10_000_000)), 30),
            vec![1, 2]
        );
        assert_eq!(select(all(AsOfDirection::Forward, None), 25), vec![2, 3]);
        assert_eq!(
            select(all(AsOfDirection::Nearest, Some(10_000_000)), 25),
            vec![1, 2]
        );
        assert_eq!(
            select(all(AsOfDirection::Nearest, Some(10_000_000)), 30),
            vec![1, 2, 3]
        );
        assert!(select(all(AsOfDirection::Forward, None), 41).is_empty());
    }

    #[test]
    fn test_negative_tolerance_rejected() {
        let spec = AsOfSpec::new("t", "t").with_tolerance_seconds(-1.0);
        assert!(matches!(
            Matcher::from_spec(&spec),
            Err(MergeError::InvalidSpec(_))
        ));
        let spec = AsOfSpec::new("t", "t").with_tolerance_seconds(f64::NAN);
        assert!(Matcher::from_spec(&spec).is_err());
    }
}
