//! Row of `fas_historical`.

use chrono::{DateTime, Utc};
use fas_monitor_core::{MatchEntry, StoredRound};
use sqlx::types::Json;

/// A stored round with its sync timestamp.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HistoricalRoundRow {
    /// Composite identity `"{date}_{round}_{time}"`
    pub id: String,
    /// `DD/MM/YYYY` observation date
    pub data_sisal: String,
    /// Round label as received
    pub giornata: String,
    /// Observation time
    pub ora: String,
    /// Per-position match entries
    pub matches: Json<Vec<MatchEntry>>,
    /// Pusher's sequence number
    pub insertion_order: i64,
    /// Last time this row was written
    pub synced_at: DateTime<Utc>,
}

impl From<HistoricalRoundRow> for StoredRound {
    fn from(row: HistoricalRoundRow) -> Self {
        Self {
            id: row.id,
            data_sisal: row.data_sisal,
            giornata: row.giornata,
            ora: row.ora,
            matches: row.matches.0,
            insertion_order: row.insertion_order,
        }
    }
}
