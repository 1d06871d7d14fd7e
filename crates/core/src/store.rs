//! Storage seams consumed by the sync coordinator and the report endpoints.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::round::{RoundRecord, StoredRound};
use crate::sequencer::{chronological, normalize_date};
use crate::sync_state::SyncState;

/// Number of stored rounds observed on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateCount {
    pub date: String,
    pub count: i64,
}

/// Sorts date counts newest date first.
pub fn sort_dates_desc(dates: &mut [DateCount]) {
    dates.sort_by_cached_key(|d| std::cmp::Reverse(normalize_date(&d.date)));
}

/// The permanent historical collection, keyed by round identity.
#[async_trait]
pub trait RoundStore: Send + Sync {
    /// Inserts or overwrites a round. Returns `true` when it was new.
    async fn upsert(&self, round: &StoredRound) -> Result<bool>;

    /// Every stored round, in no particular order.
    async fn load_all(&self) -> Result<Vec<StoredRound>>;

    /// Rounds newest insertion order first, optionally for one date.
    async fn page(&self, date: Option<&str>, skip: i64, limit: i64) -> Result<Vec<StoredRound>>;

    async fn count(&self, date: Option<&str>) -> Result<i64>;

    /// Distinct dates with their round counts, newest date first.
    async fn dates_with_counts(&self) -> Result<Vec<DateCount>>;

    /// Deletes every round, or only those of `date`. Returns the count removed.
    async fn delete(&self, date: Option<&str>) -> Result<u64>;

    /// Cheap reachability probe.
    async fn ping(&self) -> Result<()>;
}

/// Mirror document of the coordinator state.
#[async_trait]
pub trait SyncStateStore: Send + Sync {
    async fn load_state(&self) -> Result<Option<SyncState>>;

    /// Overwrites the whole document.
    async fn save_state(&self, state: &SyncState) -> Result<()>;
}

/// Loads the full collection fresh and returns it in chronological order.
///
/// # Errors
/// Returns an error if the store cannot be read.
pub async fn load_chronological(store: &dyn RoundStore) -> Result<Vec<RoundRecord>> {
    let rows = store.load_all().await?;
    Ok(chronological(rows.iter().map(StoredRound::to_record).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_dates_desc() {
        let mut dates = vec![
            DateCount { date: "31/12/2025".to_string(), count: 3 },
            DateCount { date: "02/01/2026".to_string(), count: 1 },
            DateCount { date: "10/01/2026".to_string(), count: 2 },
        ];
        sort_dates_desc(&mut dates);
        let order: Vec<&str> = dates.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(order, vec!["10/01/2026", "02/01/2026", "31/12/2025"]);
    }
}
