use async_trait::async_trait;
use serde_json::{Map, Value};
use wardgate_core::AppResult;

use crate::query_plan::QueryPlan;

/// One row returned by the data store, column name to JSON value.
pub type Record = Map<String, Value>;

/// Data-store port executing authorized plans.
#[async_trait]
pub trait RecordExecutor: Send + Sync {
    /// Executes a plan and returns the produced rows in order.
    ///
    /// Failures are reported as [`wardgate_core::AppError::Execution`].
    async fn execute(&self, plan: &QueryPlan) -> AppResult<Vec<Record>>;
}
