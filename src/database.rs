use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use tracing::info;

use crate::config::DatabaseConfig;

/// Пул соединений к Postgres, общий для всех хранилищ.
#[derive(Clone)]
pub struct Database {
    pub pool: Pool<Postgres>,
}

impl Database {
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.pool_size)
            .acquire_timeout(config.acquire_timeout())
            .connect(&config.url)
            .await?;

        info!(pool_size = config.pool_size, "connected to postgres");
        Ok(Database { pool })
    }

    /// Создает таблицы seats, users, reservation_logs и maintenance_audit,
    /// если их еще нет.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        let migrator = sqlx::migrate!("./src/migrations");
        info!(migrations = migrator.iter().count(), "applying seat ledger schema migrations");
        migrator.run(&self.pool).await?;
        info!("seat ledger schema is up to date");
        Ok(())
    }
}
