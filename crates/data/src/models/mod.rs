//! Row models for the FAS tables.
//!
//! Models derive `sqlx::FromRow`; JSON columns go through `sqlx::types::Json`.

pub mod historical_round;
pub mod sync_document;

pub use historical_round::HistoricalRoundRow;
pub use sync_document::SyncDocumentRow;
