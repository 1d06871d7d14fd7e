//! Streak engine.
//!
//! A single left-to-right scan computes, for one partition (a position or a
//! team) and one target outcome, the active run, the longest run and a
//! histogram of runs at or above [`STREAK_FLOOR`]. A gap in round numbers
//! closes the active run even when the outcome never flipped: missing data
//! breaks a streak.
//!
//! [`trailing_position_count`] is the simpler "how long is the run right now"
//! count used by the stats report. It has no gap rule and no histogram.

use std::collections::BTreeMap;

use crate::round::{Outcome, RoundRecord};

/// Shortest run recorded in the histogram.
pub const STREAK_FLOOR: u32 = 5;

/// Rounds per cycle; round 22 is followed by round 1.
pub const ROUNDS_PER_CYCLE: u32 = 22;

/// Whether `current` is the round right after `prev` (22 wraps to 1).
///
/// Non-numeric rounds on either side are never adjacent.
#[must_use]
pub fn is_next_round(prev: Option<u32>, current: Option<u32>) -> bool {
    match (prev, current) {
        (Some(ROUNDS_PER_CYCLE), Some(1)) => true,
        (Some(p), Some(c)) => p.checked_add(1) == Some(c),
        _ => false,
    }
}

/// One element of a sequence fed to [`compute_streaks`].
pub trait StreakInput {
    /// Outcome of this element, `None` when absent or unknown.
    fn outcome(&self) -> Option<Outcome>;
    /// Round number used by the gap rule.
    fn round_number(&self) -> Option<u32>;
    /// Round label shown as the start of a run.
    fn round_label(&self) -> &str;
}

impl<T: StreakInput + ?Sized> StreakInput for &T {
    fn outcome(&self) -> Option<Outcome> {
        (**self).outcome()
    }

    fn round_number(&self) -> Option<u32> {
        (**self).round_number()
    }

    fn round_label(&self) -> &str {
        (**self).round_label()
    }
}

/// A record seen through one of its position slots.
#[derive(Debug, Clone, Copy)]
pub struct PositionView<'a> {
    pub record: &'a RoundRecord,
    pub position: usize,
}

impl StreakInput for PositionView<'_> {
    fn outcome(&self) -> Option<Outcome> {
        self.record.slot(self.position).and_then(|s| s.outcome)
    }

    fn round_number(&self) -> Option<u32> {
        self.record.round_number()
    }

    fn round_label(&self) -> &str {
        &self.record.round_label
    }
}

/// Result of a streak scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreakStats {
    /// Run ending at the last element, 0 if the last element does not match.
    pub current: u32,
    /// Longest run anywhere in the sequence.
    pub max: u32,
    /// Run length -> number of runs of exactly that length (>= floor only).
    pub histogram: BTreeMap<u32, u32>,
    /// Round label where the active run began.
    pub start_marker: Option<String>,
}

impl StreakStats {
    /// Whether the total report shows this partition at all.
    #[must_use]
    pub fn qualifies(&self) -> bool {
        !self.histogram.is_empty() || self.max >= STREAK_FLOOR
    }

    /// Total number of runs recorded in the histogram.
    #[must_use]
    pub fn long_runs(&self) -> u32 {
        self.histogram.values().sum()
    }
}

#[derive(Debug, Default)]
struct RunTracker {
    current: u32,
    max: u32,
    histogram: BTreeMap<u32, u32>,
    start: Option<String>,
}

impl RunTracker {
    fn extend(&mut self, round_label: &str) {
        if self.current == 0 {
            self.start = Some(round_label.to_string());
        }
        self.current += 1;
    }

    fn record(&mut self, length: u32) {
        self.max = self.max.max(length);
        if length >= STREAK_FLOOR {
            *self.histogram.entry(length).or_insert(0) += 1;
        }
    }

    /// Terminates the active run.
    fn close(&mut self) {
        if self.current > 0 {
            self.record(self.current);
        }
        self.current = 0;
        self.start = None;
    }

    fn finish(self) -> StreakStats {
        StreakStats {
            current: self.current,
            max: self.max,
            histogram: self.histogram,
            start_marker: if self.current > 0 { self.start } else { None },
        }
    }
}

/// Scans `items` in order and computes the streak statistics for `target`.
pub fn compute_streaks<I>(items: I, target: Outcome) -> StreakStats
where
    I: IntoIterator,
    I::Item: StreakInput,
{
    let mut run = RunTracker::default();
    let mut prev_round: Option<u32> = None;
    let mut items = items.into_iter().peekable();

    while let Some(item) = items.next() {
        let round = item.round_number();

        if run.current > 0 && !is_next_round(prev_round, round) {
            run.close();
        }

        if item.outcome() == Some(target) {
            run.extend(item.round_label());
            if items.peek().is_none() {
                // Ongoing at the end: counted with its current length.
                run.record(run.current);
            }
        } else {
            run.close();
        }

        prev_round = round;
    }

    run.finish()
}

/// Streak statistics of one position across `records`.
pub fn position_streaks<'a, I>(records: I, position: usize, target: Outcome) -> StreakStats
where
    I: IntoIterator<Item = &'a RoundRecord>,
{
    compute_streaks(
        records
            .into_iter()
            .map(|record| PositionView { record, position }),
        target,
    )
}

/// Trailing run of `target` at `position`, counted backwards from the end.
///
/// Records that do not carry the position are skipped; the first present
/// slot with another outcome stops the count.
pub fn trailing_position_count<'a, I>(records: I, position: usize, target: Outcome) -> u32
where
    I: IntoIterator<Item = &'a RoundRecord>,
    I::IntoIter: DoubleEndedIterator,
{
    let mut count = 0;
    for record in records.into_iter().rev() {
        match record.slot(position) {
            None => continue,
            Some(slot) if slot.is(target) => count += 1,
            Some(_) => break,
        }
    }
    count
}

/// Trailing run of `target` over a sequence with no absent elements.
pub fn trailing_run<I>(items: I, target: Outcome) -> u32
where
    I: IntoIterator,
    I::IntoIter: DoubleEndedIterator,
    I::Item: StreakInput,
{
    let count = items
        .into_iter()
        .rev()
        .take_while(|item| item.outcome() == Some(target))
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}
