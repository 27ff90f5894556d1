use std::sync::Arc;

use sqlx::PgPool;
use wardgate_application::{AccessGate, QueryBuilder, RecordAccessService, ScopePolicy};
use wardgate_core::AppError;
use wardgate_infrastructure::PostgresRecordExecutor;

use crate::api_config::ApiConfig;
use crate::state::AppState;

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> Result<AppState, AppError> {
    let gate = AccessGate::new(
        ScopePolicy::new(config.doctor_identity),
        QueryBuilder::new(config.hospital_schema.as_str())?,
    );
    let executor = Arc::new(PostgresRecordExecutor::new(pool.clone()));

    Ok(AppState {
        record_service: RecordAccessService::new(gate, executor, config.dashboard_page_size),
        postgres_pool: pool,
        frontend_url: config.frontend_url.clone(),
    })
}
