use std::sync::Arc;

use anyhow::Result;
use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::store::{KvStore, MemoryStore, PgStore};

/// Create a Postgres pool for the key-value table.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Apply the embedded migrations in `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Pick the store backend: Postgres when a URL is configured, memory otherwise.
pub async fn connect_store(database_url: Option<&str>) -> Result<Arc<dyn KvStore>> {
    match database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            run_migrations(&pool).await?;
            tracing::info!("using postgres key-value store");
            Ok(Arc::new(PgStore::new(pool)))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; state is kept in memory and lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
