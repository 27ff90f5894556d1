use sqlx::PgPool;
use wardgate_application::RecordAccessService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub record_service: RecordAccessService,
    pub postgres_pool: PgPool,
    pub frontend_url: String,
}
