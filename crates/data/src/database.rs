use anyhow::Result;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::repositories::Repositories;

pub struct DatabaseClient {
    pool: PgPool,
}

impl DatabaseClient {
    /// Creates a new database client connected to the specified `PostgreSQL` database.
    ///
    /// # Errors
    /// Returns an error if the database connection cannot be established.
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Connects and applies pending migrations.
    ///
    /// # Errors
    /// Returns an error if the connection or a migration fails.
    pub async fn connect_and_migrate(database_url: &str, max_connections: u32) -> Result<Self> {
        let client = Self::new(database_url, max_connections).await?;
        client.migrate().await?;
        Ok(client)
    }

    /// Applies pending migrations from `crates/data/migrations`.
    ///
    /// # Errors
    /// Returns an error if a migration fails.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    #[must_use]
    pub fn repositories(&self) -> Repositories {
        Repositories::new(self.pool.clone())
    }
}
