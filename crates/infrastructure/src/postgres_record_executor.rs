use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgArguments;
use sqlx::query::QueryScalar;
use sqlx::types::chrono::NaiveDate;
use sqlx::{PgPool, Postgres};
use tracing::debug;
use wardgate_application::{QueryKind, QueryPlan, Record, RecordExecutor};
use wardgate_core::{AppError, AppResult};
use wardgate_domain::{ColumnType, FieldValue};

type JsonRowQuery<'q> = QueryScalar<'q, Postgres, Value, PgArguments>;

/// PostgreSQL-backed executor for authorized query plans.
#[derive(Clone)]
pub struct PostgresRecordExecutor {
    pool: PgPool,
}

impl PostgresRecordExecutor {
    /// Creates an executor with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordExecutor for PostgresRecordExecutor {
    async fn execute(&self, plan: &QueryPlan) -> AppResult<Vec<Record>> {
        let statement = json_row_statement(plan);
        let mut query = sqlx::query_scalar::<_, Value>(statement.as_str());
        for param in plan.params() {
            query = bind_param(query, param);
        }

        let rows = query.fetch_all(&self.pool).await.map_err(|error| {
            AppError::Execution(format!(
                "failed to execute {:?} on '{}': {error}",
                plan.kind(),
                plan.resource()
            ))
        })?;

        debug!(
            kind = ?plan.kind(),
            resource = %plan.resource(),
            rows = rows.len(),
            "query plan executed"
        );

        rows.into_iter()
            .map(|row| match row {
                Value::Object(record) => Ok(record),
                other => Err(AppError::Execution(format!(
                    "expected a JSON object per row from '{}', got {other}",
                    plan.resource()
                ))),
            })
            .collect()
    }
}

/// Wraps the plan so every produced row decodes as a single JSON object.
///
/// Selects are re-ordered by primary key outside the subquery, whose own
/// ordering only decides which rows the limit keeps.
fn json_row_statement(plan: &QueryPlan) -> String {
    match plan.kind() {
        QueryKind::Select => format!(
            "SELECT to_jsonb(scoped_rows) FROM ({}) AS scoped_rows ORDER BY scoped_rows.\"{}\"",
            plan.statement(),
            plan.resource().primary_key()
        ),
        QueryKind::Update | QueryKind::Delete => format!(
            "WITH affected_rows AS ({}) SELECT to_jsonb(affected_rows) FROM affected_rows",
            plan.statement()
        ),
    }
}

fn bind_param<'q>(query: JsonRowQuery<'q>, param: &FieldValue) -> JsonRowQuery<'q> {
    match param {
        FieldValue::Integer(value) => query.bind(*value),
        FieldValue::Text(value) => query.bind(value.clone()),
        FieldValue::Date(value) => query.bind(*value),
        FieldValue::Null(ColumnType::Integer) => query.bind(Option::<i64>::None),
        FieldValue::Null(ColumnType::Text) => query.bind(Option::<String>::None),
        FieldValue::Null(ColumnType::Date) => query.bind(Option::<NaiveDate>::None),
    }
}
