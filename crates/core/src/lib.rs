//! Core of the FAS league monitor.
//!
//! - [`lenient`]: forgiving field readers for pushed JSON
//! - [`round`]: incoming/stored round shapes and the normalized [`RoundRecord`]
//! - [`sequencer`]: chronological and ingestion-recency orderings
//! - [`streak`]: the streak engine
//! - [`teams`]: per-team re-projection
//! - [`report`] and [`template`]: text rendering
//! - [`sync_state`] and [`store`]: coordinator state and storage seams

pub mod config;
pub mod config_loader;
pub mod lenient;
pub mod report;
pub mod round;
pub mod sequencer;
pub mod store;
pub mod streak;
pub mod sync_state;
pub mod teams;
pub mod template;

pub use config::{AppConfig, DatabaseConfig, MonitorConfig, ServerConfig, TelegramConfig};
pub use config_loader::ConfigLoader;
pub use report::{render, render_templated, ReportContext, ReportKind, ReportView, NO_DATA};
pub use round::{IncomingRound, MatchEntry, Outcome, PositionSlot, RoundRecord, Scalar, StoredRound};
pub use store::{load_chronological, DateCount, RoundStore, SyncStateStore};
pub use streak::{compute_streaks, StreakStats, STREAK_FLOOR};
pub use sync_state::{SyncMode, SyncState, DEFAULT_THRESHOLD, MIRROR_KEY};
pub use teams::{aggregate_by_team, TeamObservation, TEAM_ROSTER};
