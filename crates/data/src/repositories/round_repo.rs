//! Historical round repository.
//!
//! Keyed upserts, date-filtered pages and per-date counts over
//! `fas_historical`.

use anyhow::Result;
use async_trait::async_trait;
use fas_monitor_core::store::sort_dates_desc;
use fas_monitor_core::{DateCount, RoundStore, StoredRound};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::HistoricalRoundRow;

/// Repository for `fas_historical`.
#[derive(Debug, Clone)]
pub struct PgRoundRepository {
    pool: PgPool,
}

impl PgRoundRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoundStore for PgRoundRepository {
    /// Inserts or overwrites a round by its composite identity.
    ///
    /// `xmax = 0` holds only for freshly inserted tuples, which gives the
    /// insert-vs-update signal in the same statement.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    async fn upsert(&self, round: &StoredRound) -> Result<bool> {
        let inserted: bool = sqlx::query_scalar(
            r#"
            INSERT INTO fas_historical
                (id, data_sisal, giornata, ora, matches, insertion_order, synced_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            ON CONFLICT (id) DO UPDATE
            SET data_sisal = EXCLUDED.data_sisal,
                giornata = EXCLUDED.giornata,
                ora = EXCLUDED.ora,
                matches = EXCLUDED.matches,
                insertion_order = EXCLUDED.insertion_order,
                synced_at = EXCLUDED.synced_at
            RETURNING (xmax = 0) AS inserted
            "#,
        )
        .bind(&round.id)
        .bind(&round.data_sisal)
        .bind(&round.giornata)
        .bind(&round.ora)
        .bind(Json(&round.matches))
        .bind(round.insertion_order)
        .fetch_one(&self.pool)
        .await?;

        Ok(inserted)
    }

    async fn load_all(&self) -> Result<Vec<StoredRound>> {
        let rows = sqlx::query_as::<_, HistoricalRoundRow>(
            r#"
            SELECT id, data_sisal, giornata, ora, matches, insertion_order, synced_at
            FROM fas_historical
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(StoredRound::from).collect())
    }

    /// Queries rounds newest insertion order first.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    async fn page(&self, date: Option<&str>, skip: i64, limit: i64) -> Result<Vec<StoredRound>> {
        let rows = sqlx::query_as::<_, HistoricalRoundRow>(
            r#"
            SELECT id, data_sisal, giornata, ora, matches, insertion_order, synced_at
            FROM fas_historical
            WHERE ($1::TEXT IS NULL OR data_sisal = $1)
            ORDER BY insertion_order DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(date)
        .bind(limit.max(0))
        .bind(skip.max(0))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(StoredRound::from).collect())
    }

    async fn count(&self, date: Option<&str>) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM fas_historical
            WHERE ($1::TEXT IS NULL OR data_sisal = $1)
            "#,
        )
        .bind(date)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Groups rounds by observation date.
    ///
    /// Dates are stored as `DD/MM/YYYY`, so the newest-first order is applied
    /// after the query.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    async fn dates_with_counts(&self) -> Result<Vec<DateCount>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT data_sisal, COUNT(*)
            FROM fas_historical
            GROUP BY data_sisal
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut dates: Vec<DateCount> = rows
            .into_iter()
            .map(|(date, count)| DateCount { date, count })
            .collect();
        sort_dates_desc(&mut dates);
        Ok(dates)
    }

    /// Deletes every round, or the rounds of one date.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    async fn delete(&self, date: Option<&str>) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM fas_historical
            WHERE ($1::TEXT IS NULL OR data_sisal = $1)
            "#,
        )
        .bind(date)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

