//! Owner of the process-wide [`SyncState`].
//!
//! A push updates the in-memory state under one write guard, then mirrors the
//! whole document and upserts every pushed round into the permanent
//! collection. The mirror is advisory: a failed mirror write is logged and
//! the push still succeeds. Reports never read the mirror.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use fas_monitor_core::{
    lenient, IncomingRound, RoundStore, Scalar, SyncMode, SyncState, SyncStateStore,
    DEFAULT_THRESHOLD,
};
use serde::{Deserialize, Deserializer, Serialize};
use tokio::sync::RwLock;

fn default_threshold() -> u32 {
    DEFAULT_THRESHOLD
}

/// Non-negative integer threshold, [`DEFAULT_THRESHOLD`] otherwise.
fn lenient_threshold<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = lenient::scalar(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Scalar::as_i64)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(DEFAULT_THRESHOLD))
}

/// Body of `POST /api/telegram/sync`.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncRequest {
    #[serde(default, deserialize_with = "lenient::text")]
    pub bot_token: Option<String>,
    /// Chat ids usually arrive as JSON numbers; they are kept as text.
    #[serde(default, deserialize_with = "lenient::text")]
    pub chat_id: Option<String>,
    /// Items that are not objects are dropped.
    #[serde(default, deserialize_with = "lenient::items")]
    pub history: Vec<IncomingRound>,
    #[serde(default = "default_threshold", deserialize_with = "lenient_threshold")]
    pub threshold: u32,
    #[serde(default, deserialize_with = "lenient::text_map")]
    pub rendered_templates: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_incremental: bool,
    /// Size of the caller's local store. Only logged.
    #[serde(default, deserialize_with = "lenient::scalar")]
    pub total_local: Option<Scalar>,
}

impl SyncRequest {
    #[must_use]
    pub const fn mode(&self) -> SyncMode {
        SyncMode::from_incremental_flag(self.is_incremental)
    }
}

/// Result of a push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSummary {
    pub status: String,
    pub synced_giornate: usize,
    pub new_records: usize,
    pub total_historical: i64,
}

pub struct SyncCoordinator {
    state: Arc<RwLock<SyncState>>,
    rounds: Arc<dyn RoundStore>,
    mirror: Arc<dyn SyncStateStore>,
}

impl SyncCoordinator {
    /// Creates a coordinator in its empty default state.
    #[must_use]
    pub fn new(
        rounds: Arc<dyn RoundStore>,
        mirror: Arc<dyn SyncStateStore>,
        default_threshold: u32,
    ) -> Self {
        let state = SyncState {
            threshold: default_threshold,
            ..SyncState::default()
        };
        Self {
            state: Arc::new(RwLock::new(state)),
            rounds,
            mirror,
        }
    }

    /// Repopulates the state from the mirror document.
    ///
    /// A missing document or an unreadable store leaves the defaults in place.
    pub async fn load(&self) {
        match self.mirror.load_state().await {
            Ok(Some(saved)) => {
                tracing::info!(history = saved.history.len(), "Loaded sync state");
                *self.state.write().await = saved;
            }
            Ok(None) => tracing::info!("No saved sync state, starting empty"),
            Err(e) => tracing::error!(error = %e, "Failed to load sync state"),
        }
    }

    /// Applies a push from the front end.
    ///
    /// # Errors
    /// Returns an error if a round cannot be written to the permanent
    /// collection or the collection cannot be counted.
    pub async fn push(&self, request: SyncRequest) -> Result<PushSummary> {
        self.push_at(request, Utc::now()).await
    }

    /// [`Self::push`] with an explicit clock.
    ///
    /// # Errors
    /// See [`Self::push`].
    pub async fn push_at(&self, request: SyncRequest, now: DateTime<Utc>) -> Result<PushSummary> {
        let mode = request.mode();
        let snapshot = {
            let mut state = self.state.write().await;
            state.bot_token = request.bot_token.clone();
            state.chat_id = request.chat_id.clone();
            state.threshold = request.threshold;
            state.rendered_templates = request.rendered_templates.clone();
            state.last_sync = Some(now);
            let appended = state.merge_history(&request.history, mode);
            tracing::debug!(?mode, appended, history = state.history.len(), "History merged");
            state.clone()
        };

        if let Err(e) = self.mirror.save_state(&snapshot).await {
            tracing::warn!(error = %e, "Failed to write sync mirror");
        }

        let mut new_records = 0;
        for (index, item) in request.history.iter().enumerate() {
            if self.rounds.upsert(&item.to_stored(index)).await? {
                new_records += 1;
            }
        }
        let total_historical = self.rounds.count(None).await?;

        tracing::info!(
            synced = request.history.len(),
            new = new_records,
            total = total_historical,
            total_local = ?request.total_local,
            "Sync push applied"
        );

        Ok(PushSummary {
            status: "ok".to_string(),
            synced_giornate: request.history.len(),
            new_records,
            total_historical,
        })
    }

    /// Reads from the state under a shared guard.
    pub async fn read<R>(&self, f: impl FnOnce(&SyncState) -> R) -> R {
        f(&*self.state.read().await)
    }

    #[must_use]
    pub fn rounds(&self) -> &Arc<dyn RoundStore> {
        &self.rounds
    }
}
