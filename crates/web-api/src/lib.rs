//! HTTP surface of the FAS league monitor.
//!
//! Routes live under `/api`: the sync push from the front end, historical
//! maintenance, fresh report rendering and the Telegram webhook.

pub mod coordinator;
pub mod error;
pub mod handlers;
pub mod server;
pub mod state;
pub mod webhook;

pub use coordinator::{PushSummary, SyncCoordinator, SyncRequest};
pub use error::ApiError;
pub use server::ApiServer;
pub use state::AppState;
