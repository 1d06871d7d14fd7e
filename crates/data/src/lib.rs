//! Storage for the FAS league monitor.
//!
//! This crate provides:
//! - Database client for `PostgreSQL` with embedded migrations
//! - Row models for the historical and mirror tables
//! - Repositories implementing the core storage traits
//! - An in-memory store with the same semantics

pub mod database;
pub mod memory;
pub mod models;
pub mod repositories;

pub use database::DatabaseClient;
pub use memory::MemoryStore;
pub use models::{HistoricalRoundRow, SyncDocumentRow};
pub use repositories::{PgRoundRepository, PgSyncStateRepository, Repositories};
