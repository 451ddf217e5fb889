//! Data store factory.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;

use crate::config::DatabaseConfig;

use super::{DataStore, MemoryStore, PostgresStore, StoreResult};

/// Create the data store selected by configuration.
///
/// - `"postgres"`: connects a pool, runs schema migration, returns a
///   `PostgresStore`
/// - `"memory"` (default): returns a `MemoryStore`
///
/// Called once during process initialization; no runtime branching on the
/// backend happens anywhere else.
pub async fn create_data_store(settings: &DatabaseConfig) -> StoreResult<Arc<dyn DataStore>> {
    match settings.backend.as_str() {
        "postgres" => {
            tracing::info!(backend = "postgres", "Connecting data store");
            let pool = PgPoolOptions::new()
                .max_connections(settings.max_connections)
                .connect(&settings.url)
                .await?;

            let store = PostgresStore::new(pool);
            store.migrate().await?;
            Ok(Arc::new(store))
        }
        "memory" => {
            tracing::info!(backend = "memory", "Creating in-memory data store");
            Ok(Arc::new(MemoryStore::new()))
        }
        other => {
            tracing::warn!(
                backend = %other,
                "Unknown database backend, falling back to memory"
            );
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
