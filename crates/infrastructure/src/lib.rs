//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod postgres_record_executor;

pub use postgres_record_executor::PostgresRecordExecutor;
