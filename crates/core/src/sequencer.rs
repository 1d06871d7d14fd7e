//! Chronological ordering of round records.
//!
//! Two orderings exist and are kept apart on purpose:
//! - [`chronological`]: wall-clock/round order `(YYYYMMDD, time, round)`,
//!   consumed by every streak and stats report;
//! - [`most_recent`]: ingestion recency by `insertion_order`, consumed by the
//!   history report.

use std::cmp::Reverse;

use crate::round::RoundRecord;

/// Sort key used when a record carries no date.
const EMPTY_DATE: &str = "00/00/0000";
/// Sort key used when a record carries no time.
const EMPTY_TIME: &str = "00:00";

/// Reverses a `DD/MM/YYYY` date into `YYYYMMDD`.
///
/// Dates that do not split into exactly three parts are returned unchanged.
#[must_use]
pub fn normalize_date(date: &str) -> String {
    let parts: Vec<&str> = date.split('/').collect();
    match parts.as_slice() {
        [day, month, year] => format!("{year}{month}{day}"),
        _ => date.to_string(),
    }
}

/// Composite ascending sort key of a record. `insertion_order` breaks ties
/// between records that agree on date, time and round.
#[must_use]
pub fn sort_key(record: &RoundRecord) -> (String, String, u32, i64) {
    let date = if record.observation_date.is_empty() {
        EMPTY_DATE
    } else {
        record.observation_date.as_str()
    };
    let time = if record.observation_time.is_empty() {
        EMPTY_TIME
    } else {
        record.observation_time.as_str()
    };
    let round = record.round_number().unwrap_or_else(|| {
        tracing::debug!(
            round = %record.round_label,
            date = %record.observation_date,
            "non-numeric round label, sorting as 0"
        );
        0
    });
    (normalize_date(date), time.to_string(), round, record.insertion_order)
}

/// Sorts records in place by [`sort_key`].
pub fn sort_chronological(records: &mut [RoundRecord]) {
    records.sort_by_cached_key(sort_key);
}

/// Returns the records in chronological order.
#[must_use]
pub fn chronological(mut records: Vec<RoundRecord>) -> Vec<RoundRecord> {
    sort_chronological(&mut records);
    records
}

/// Returns the `limit` most recently ingested records, newest first.
#[must_use]
pub fn most_recent(records: &[RoundRecord], limit: usize) -> Vec<RoundRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by_key(|r| Reverse(r.insertion_order));
    sorted.truncate(limit);
    sorted
}

/// Keeps only the records observed on `date`, preserving their order.
#[must_use]
pub fn for_date<'a>(records: &'a [RoundRecord], date: &str) -> Vec<&'a RoundRecord> {
    records
        .iter()
        .filter(|r| r.observation_date == date)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, time: &str, round: &str, order: i64) -> RoundRecord {
        RoundRecord {
            observation_date: date.to_string(),
            observation_time: time.to_string(),
            round_label: round.to_string(),
            positions: Vec::new(),
            insertion_order: order,
        }
    }

    fn labels(records: &[RoundRecord]) -> Vec<String> {
        records
            .iter()
            .map(|r| format!("{} {} {}", r.observation_date, r.observation_time, r.round_label))
            .collect()
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date("05/03/2026"), "20260305");
        assert_eq!(normalize_date("2026-03-05"), "2026-03-05");
        assert_eq!(normalize_date("05/03"), "05/03");
    }

    #[test]
    fn test_orders_across_months() {
        let sorted = chronological(vec![
            record("01/04/2026", "10:00", "1", 1),
            record("31/03/2026", "10:00", "1", 2),
        ]);
        assert_eq!(sorted[0].observation_date, "31/03/2026");
    }

    #[test]
    fn test_time_then_round_tiebreak() {
        let sorted = chronological(vec![
            record("01/04/2026", "11:00", "2", 1),
            record("01/04/2026", "10:00", "9", 2),
            record("01/04/2026", "10:00", "3", 3),
        ]);
        assert_eq!(
            labels(&sorted),
            vec![
                "01/04/2026 10:00 3",
                "01/04/2026 10:00 9",
                "01/04/2026 11:00 2"
            ]
        );
    }

    #[test]
    fn test_round_compared_numerically() {
        let sorted = chronological(vec![
            record("01/04/2026", "10:00", "10", 1),
            record("01/04/2026", "10:00", "9", 2),
        ]);
        assert_eq!(sorted[0].round_label, "9");
    }

    #[test]
    fn test_non_numeric_round_sorts_first() {
        let sorted = chronological(vec![
            record("01/04/2026", "10:00", "1", 1),
            record("01/04/2026", "10:00", "?", 2),
        ]);
        assert_eq!(sorted[0].round_label, "?");
    }

    #[test]
    fn test_insertion_order_breaks_equal_keys() {
        let sorted = chronological(vec![
            record("01/04/2026", "10:00", "07", 7),
            record("01/04/2026", "10:00", "7", 3),
        ]);
        assert_eq!(sorted[0].insertion_order, 3);
        assert_eq!(sorted[1].insertion_order, 7);
        assert_eq!(sorted[1].round_label, "07");
    }

    #[test]
    fn test_missing_time_sorts_as_midnight() {
        let sorted = chronological(vec![
            record("01/04/2026", "00:30", "1", 1),
            record("01/04/2026", "", "1", 2),
        ]);
        assert_eq!(sorted[0].insertion_order, 2);
    }

    #[test]
    fn test_most_recent_uses_insertion_order() {
        let records = vec![
            record("02/04/2026", "10:00", "1", 1),
            record("01/04/2026", "10:00", "1", 3),
            record("03/04/2026", "10:00", "1", 2),
        ];
        let recent = most_recent(&records, 2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].insertion_order, 3);
        assert_eq!(recent[1].insertion_order, 2);
    }

    #[test]
    fn test_for_date_keeps_order() {
        let records = chronological(vec![
            record("01/04/2026", "12:00", "2", 1),
            record("02/04/2026", "10:00", "1", 2),
            record("01/04/2026", "10:00", "1", 3),
        ]);
        let day = for_date(&records, "01/04/2026");
        assert_eq!(day.len(), 2);
        assert_eq!(day[0].round_label, "1");
        assert_eq!(day[1].round_label, "2");
    }
}
