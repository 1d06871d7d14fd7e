//! Database repositories for the FAS tables.

pub mod round_repo;
pub mod sync_state_repo;

pub use round_repo::PgRoundRepository;
pub use sync_state_repo::PgSyncStateRepository;

use sqlx::PgPool;

/// Creates all repositories from a single database pool.
#[derive(Debug, Clone)]
pub struct Repositories {
    pub rounds: PgRoundRepository,
    pub sync_state: PgSyncStateRepository,
}

impl Repositories {
    /// Creates a new set of repositories from a database pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            rounds: PgRoundRepository::new(pool.clone()),
            sync_state: PgSyncStateRepository::new(pool),
        }
    }
}
