//! In-memory implementation of both storage seams.
//!
//! Used by tests and by `serve --memory` for local runs without Postgres.
//! Semantics match the Postgres repositories: keyed upsert with an insert
//! signal, newest-insertion-first pages, whole-document mirror writes.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use fas_monitor_core::store::sort_dates_desc;
use fas_monitor_core::{DateCount, RoundStore, StoredRound, SyncState, SyncStateStore};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryStore {
    rounds: RwLock<BTreeMap<String, StoredRound>>,
    state: RwLock<Option<SyncState>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with a mirror document.
    #[must_use]
    pub fn with_state(state: SyncState) -> Self {
        Self {
            rounds: RwLock::default(),
            state: RwLock::new(Some(state)),
        }
    }
}

fn matches_date(round: &StoredRound, date: Option<&str>) -> bool {
    date.map_or(true, |d| round.data_sisal == d)
}

#[async_trait]
impl RoundStore for MemoryStore {
    async fn upsert(&self, round: &StoredRound) -> Result<bool> {
        let previous = self.rounds.write().await.insert(round.id.clone(), round.clone());
        Ok(previous.is_none())
    }

    async fn load_all(&self) -> Result<Vec<StoredRound>> {
        Ok(self.rounds.read().await.values().cloned().collect())
    }

    async fn page(&self, date: Option<&str>, skip: i64, limit: i64) -> Result<Vec<StoredRound>> {
        let mut rows: Vec<StoredRound> = self
            .rounds
            .read()
            .await
            .values()
            .filter(|r| matches_date(r, date))
            .cloned()
            .collect();
        rows.sort_by_key(|r| Reverse(r.insertion_order));
        let skip = usize::try_from(skip).unwrap_or(0);
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(rows.into_iter().skip(skip).take(limit).collect())
    }

    async fn count(&self, date: Option<&str>) -> Result<i64> {
        let count = self
            .rounds
            .read()
            .await
            .values()
            .filter(|r| matches_date(r, date))
            .count();
        Ok(i64::try_from(count)?)
    }

    async fn dates_with_counts(&self) -> Result<Vec<DateCount>> {
        let mut counts: BTreeMap<String, i64> = BTreeMap::new();
        for round in self.rounds.read().await.values() {
            *counts.entry(round.data_sisal.clone()).or_insert(0) += 1;
        }
        let mut dates: Vec<DateCount> = counts
            .into_iter()
            .map(|(date, count)| DateCount { date, count })
            .collect();
        sort_dates_desc(&mut dates);
        Ok(dates)
    }

    async fn delete(&self, date: Option<&str>) -> Result<u64> {
        let mut rounds = self.rounds.write().await;
        let before = rounds.len();
        rounds.retain(|_, r| !matches_date(r, date));
        Ok(u64::try_from(before - rounds.len())?)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl SyncStateStore for MemoryStore {
    async fn load_state(&self) -> Result<Option<SyncState>> {
        Ok(self.state.read().await.clone())
    }

    async fn save_state(&self, state: &SyncState) -> Result<()> {
        *self.state.write().await = Some(state.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fas_monitor_core::IncomingRound;
    use serde_json::json;

    fn stored(date: &str, round: u32, id: i64) -> StoredRound {
        let incoming: IncomingRound = serde_json::from_value(json!({
            "id": id,
            "data": date,
            "giornata": round,
            "ora": "10:00",
            "matches": [{"result": "NG"}]
        }))
        .unwrap();
        incoming.to_stored(0)
    }

    #[tokio::test]
    async fn test_upsert_reports_insert_once() {
        let store = MemoryStore::new();
        assert!(store.upsert(&stored("01/04/2026", 1, 1)).await.unwrap());
        assert!(!store.upsert(&stored("01/04/2026", 1, 2)).await.unwrap());
        assert_eq!(store.count(None).await.unwrap(), 1);

        let all = store.load_all().await.unwrap();
        assert_eq!(all[0].insertion_order, 2);
    }

    #[tokio::test]
    async fn test_page_and_date_filter() {
        let store = MemoryStore::new();
        for (i, date) in ["01/04/2026", "01/04/2026", "02/04/2026"].iter().enumerate() {
            let n = i64::try_from(i).unwrap();
            store
                .upsert(&stored(date, u32::try_from(i).unwrap() + 1, n))
                .await
                .unwrap();
        }

        let page = store.page(None, 0, 2).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].insertion_order, 2);

        let page = store.page(Some("01/04/2026"), 1, 10).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].insertion_order, 0);

        assert_eq!(store.count(Some("02/04/2026")).await.unwrap(), 1);

        let dates = store.dates_with_counts().await.unwrap();
        assert_eq!(
            dates,
            vec![
                DateCount { date: "02/04/2026".to_string(), count: 1 },
                DateCount { date: "01/04/2026".to_string(), count: 2 },
            ]
        );
    }

    #[tokio::test]
    async fn test_delete_scoped_and_all() {
        let store = MemoryStore::new();
        store.upsert(&stored("01/04/2026", 1, 1)).await.unwrap();
        store.upsert(&stored("02/04/2026", 1, 2)).await.unwrap();

        assert_eq!(store.delete(Some("01/04/2026")).await.unwrap(), 1);
        assert_eq!(store.count(None).await.unwrap(), 1);
        assert_eq!(store.delete(None).await.unwrap(), 1);
        assert_eq!(store.count(None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_state_round_trip() {
        let store = MemoryStore::new();
        assert!(store.load_state().await.unwrap().is_none());

        let state = SyncState {
            bot_token: Some("token".to_string()),
            threshold: 4,
            ..SyncState::default()
        };
        store.save_state(&state).await.unwrap();
        assert_eq!(store.load_state().await.unwrap(), Some(state));
    }
}
