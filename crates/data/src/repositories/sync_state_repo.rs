//! Sync mirror repository.
//!
//! Stores the coordinator state as a single JSONB document under
//! [`MIRROR_KEY`]; every save overwrites the whole document.

use anyhow::Result;
use async_trait::async_trait;
use fas_monitor_core::{SyncState, SyncStateStore, MIRROR_KEY};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::SyncDocumentRow;

/// Repository for `fas_telegram_sync`.
#[derive(Debug, Clone)]
pub struct PgSyncStateRepository {
    pool: PgPool,
}

impl PgSyncStateRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SyncStateStore for PgSyncStateRepository {
    async fn load_state(&self) -> Result<Option<SyncState>> {
        let row = sqlx::query_as::<_, SyncDocumentRow>(
            r#"
            SELECT id, document, updated_at
            FROM fas_telegram_sync
            WHERE id = $1
            "#,
        )
        .bind(MIRROR_KEY)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.document.0))
    }

    async fn save_state(&self, state: &SyncState) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO fas_telegram_sync (id, document, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (id) DO UPDATE
            SET document = EXCLUDED.document,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(MIRROR_KEY)
        .bind(Json(state))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
