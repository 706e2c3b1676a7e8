use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::error::{BookingError, BookingResult};

#[derive(Clone)]
pub struct Database {
    pub pool: Pool<Postgres>,
}

impl Database {
    // Соединение проверяется сразу: недоступная база - ошибка старта, а не
    // отложенный сбой на первой брони
    pub async fn connect(config: &DatabaseConfig) -> BookingResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.pool_size)
            .acquire_timeout(config.acquire_timeout())
            .connect(&config.url)
            .await
            .map_err(BookingError::BackingStoreUnavailable)?;

        sqlx::query("SELECT 1")
            .execute(&pool)
            .await
            .map_err(BookingError::BackingStoreUnavailable)?;

        info!(pool_size = config.pool_size, "Connected to Postgres");
        Ok(Database { pool })
    }

    pub async fn run_migrations(&self) -> BookingResult<()> {
        info!("Running database migrations...");
        sqlx::migrate!("./src/migrations").run(&self.pool).await?;
        info!("Migrations completed");
        Ok(())
    }

    pub async fn close(&self) {
        if !self.pool.is_closed() {
            self.pool.close().await;
            info!("Postgres connection closed");
        }
    }
}
