//! Application services and ports.
//!
//! Requests flow through [`AccessGate`]: the permission table decides whether
//! the operation is allowed, the scope policy narrows visible rows, and the
//! query builder produces a parameterized [`QueryPlan`]. [`RecordAccessService`]
//! hands allowed plans to a [`RecordExecutor`].

#![forbid(unsafe_code)]

mod access_gate;
mod permission_table;
mod query_builder;
mod query_plan;
mod record_access_service;
mod record_ports;
mod row_scope;

pub use access_gate::{AccessGate, AuthDecision, DenialReason, RecordOperation, RequestContext};
pub use permission_table::{permission_for, permissions_for};
pub use query_builder::{DEFAULT_PAGE_SIZE, QueryBuilder};
pub use query_plan::{QueryKind, QueryPlan, RowExpectation};
pub use record_access_service::{DashboardTable, MAX_LIST_LIMIT, RecordAccessService};
pub use record_ports::{Record, RecordExecutor};
pub use row_scope::{DoctorIdentity, ScopePolicy, resolve_scope};
