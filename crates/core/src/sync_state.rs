//! Process-wide sync state and its merge rules.
//!
//! The state is owned by the composition root; this module only knows how a
//! pushed batch changes it. Persistence is the coordinator's job.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::report::ReportKind;
use crate::round::IncomingRound;

/// Trailing NG count that triggers the alert icon when none is configured.
pub const DEFAULT_THRESHOLD: u32 = 6;

/// Fixed key of the mirror document.
pub const MIRROR_KEY: &str = "current";

/// How a pushed batch combines with the retained history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// The batch becomes the whole history.
    Replace,
    /// Items with an unseen external id are appended; seen ids are dropped.
    Incremental,
}

impl SyncMode {
    #[must_use]
    pub const fn from_incremental_flag(is_incremental: bool) -> Self {
        if is_incremental {
            Self::Incremental
        } else {
            Self::Replace
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncState {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub threshold: u32,
    /// Most recent pushed batch (or accumulation of batches).
    pub history: Vec<IncomingRound>,
    pub last_sync: Option<DateTime<Utc>>,
    /// Report kind name -> caller template with `{data}`/`{timestamp}`.
    pub rendered_templates: BTreeMap<String, String>,
}

impl Default for SyncState {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
            threshold: DEFAULT_THRESHOLD,
            history: Vec::new(),
            last_sync: None,
            rendered_templates: BTreeMap::new(),
        }
    }
}

impl SyncState {
    /// Credentials present, so the bot can be reached.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.bot_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Caller template registered for `kind`, if any.
    #[must_use]
    pub fn template_for(&self, kind: ReportKind) -> Option<&str> {
        self.rendered_templates
            .get(kind.as_str())
            .map(String::as_str)
            .filter(|t| !t.trim().is_empty())
    }

    /// Applies `batch` to the retained history. Returns how many items were
    /// added.
    ///
    /// Incremental mode compares external ids as strings. Items without an id
    /// can never match and are always appended.
    pub fn merge_history(&mut self, batch: &[IncomingRound], mode: SyncMode) -> usize {
        match mode {
            SyncMode::Replace => {
                self.history = batch.to_vec();
                self.history.len()
            }
            SyncMode::Incremental => {
                let mut seen: HashSet<String> = self
                    .history
                    .iter()
                    .filter_map(IncomingRound::external_id)
                    .collect();
                let before = self.history.len();
                for item in batch {
                    let fresh = item.external_id().map_or(true, |id| seen.insert(id));
                    if fresh {
                        self.history.push(item.clone());
                    }
                }
                self.history.len() - before
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(value: serde_json::Value) -> IncomingRound {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_default_threshold() {
        let state = SyncState::default();
        assert_eq!(state.threshold, 6);
        assert!(!state.is_configured());
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let state: SyncState = serde_json::from_value(json!({"bot_token": "t"})).unwrap();
        assert_eq!(state.threshold, DEFAULT_THRESHOLD);
        assert!(state.is_configured());
        assert!(state.history.is_empty());
    }

    #[test]
    fn test_replace_overwrites() {
        let mut state = SyncState::default();
        state.merge_history(&[item(json!({"id": 1})), item(json!({"id": 2}))], SyncMode::Replace);
        let added = state.merge_history(&[item(json!({"id": 3}))], SyncMode::Replace);
        assert_eq!(added, 1);
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.history[0].external_id().as_deref(), Some("3"));
    }

    #[test]
    fn test_incremental_drops_known_ids() {
        let mut state = SyncState::default();
        state.merge_history(
            &[item(json!({"id": 1, "ora": "10:00"})), item(json!({"id": 2}))],
            SyncMode::Replace,
        );
        let added = state.merge_history(
            &[item(json!({"id": "1", "ora": "11:00"})), item(json!({"id": 3}))],
            SyncMode::Incremental,
        );
        assert_eq!(added, 1);
        assert_eq!(state.history.len(), 3);
        // First write wins: the stored item keeps its original content.
        assert_eq!(state.history[0].ora.as_deref(), Some("10:00"));
    }

    #[test]
    fn test_incremental_dedupes_within_batch_and_keeps_idless() {
        let mut state = SyncState::default();
        let added = state.merge_history(
            &[
                item(json!({"id": 5})),
                item(json!({"id": 5})),
                item(json!({"giornata": 1})),
                item(json!({"giornata": 1})),
            ],
            SyncMode::Incremental,
        );
        assert_eq!(added, 3);
    }

    #[test]
    fn test_template_lookup() {
        let mut state = SyncState::default();
        state
            .rendered_templates
            .insert("streak".to_string(), "S {data}".to_string());
        state
            .rendered_templates
            .insert("history".to_string(), "  ".to_string());
        assert_eq!(state.template_for(ReportKind::Streak), Some("S {data}"));
        assert_eq!(state.template_for(ReportKind::History), None);
        assert_eq!(state.template_for(ReportKind::Info), None);
    }

    #[test]
    fn test_mode_from_flag() {
        assert_eq!(SyncMode::from_incremental_flag(true), SyncMode::Incremental);
        assert_eq!(SyncMode::from_incremental_flag(false), SyncMode::Replace);
    }
}
