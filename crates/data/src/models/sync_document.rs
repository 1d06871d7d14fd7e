//! Row of `fas_telegram_sync`.

use chrono::{DateTime, Utc};
use fas_monitor_core::SyncState;
use sqlx::types::Json;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SyncDocumentRow {
    pub id: String,
    pub document: Json<SyncState>,
    pub updated_at: DateTime<Utc>,
}
