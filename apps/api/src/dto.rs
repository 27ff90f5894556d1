use serde::Serialize;
use serde_json::Value;
use ts_rs::TS;
use wardgate_application::{DashboardTable, Record};
use wardgate_domain::{Permission, PermissionSet, Resource};

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "api-types/health-response.ts")]
pub struct HealthResponse {
    pub status: &'static str,
    pub ready: bool,
    pub postgres: HealthDependencyStatus,
}

/// Status of one backing dependency.
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "api-types/health-dependency-status.ts")]
pub struct HealthDependencyStatus {
    pub status: &'static str,
    pub detail: Option<String>,
}

/// Operations a role may perform on one resource.
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "api-types/capability-response.ts")]
pub struct CapabilityResponse {
    pub resource: String,
    /// Compact flags such as `"RW"`.
    pub permissions: String,
    pub can_read: bool,
    pub can_write: bool,
    pub can_delete: bool,
}

impl CapabilityResponse {
    #[must_use]
    pub fn new(resource: Resource, permissions: PermissionSet) -> Self {
        Self {
            resource: resource.as_str().to_owned(),
            permissions: permissions.to_string(),
            can_read: permissions.contains(Permission::Read),
            can_write: permissions.contains(Permission::Write),
            can_delete: permissions.contains(Permission::Delete),
        }
    }
}

/// One dashboard table with the rows visible to the caller.
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "api-types/dashboard-table-response.ts")]
pub struct DashboardTableResponse {
    pub resource: String,
    pub permissions: String,
    #[ts(type = "Array<Record<string, unknown>>")]
    pub records: Vec<Value>,
}

impl From<DashboardTable> for DashboardTableResponse {
    fn from(table: DashboardTable) -> Self {
        Self {
            resource: table.resource.as_str().to_owned(),
            permissions: table.permissions.to_string(),
            records: table.records.into_iter().map(Value::Object).collect(),
        }
    }
}

/// API representation of one stored row.
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "api-types/record-response.ts")]
pub struct RecordResponse {
    pub resource: String,
    #[ts(type = "Record<string, unknown>")]
    pub data: Value,
}

impl RecordResponse {
    #[must_use]
    pub fn new(resource: Resource, record: Record) -> Self {
        Self {
            resource: resource.as_str().to_owned(),
            data: Value::Object(record),
        }
    }
}
