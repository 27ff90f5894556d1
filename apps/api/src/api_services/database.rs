use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use wardgate_core::AppError;

/// Connects to the hospital data store. Its schema is owned elsewhere, so no
/// migrations run here.
pub async fn connect_pool(database_url: &str, max_connections: u32) -> Result<PgPool, AppError> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))
}
