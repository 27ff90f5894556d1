use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};
use wardgate_core::{AppError, AppResult};
use wardgate_domain::{Permission, PermissionSet, Resource, RowId, UpdateRequest};

use crate::access_gate::{AccessGate, RecordOperation, RequestContext};
use crate::record_ports::{Record, RecordExecutor};

/// Largest page a caller may request from a list view.
pub const MAX_LIST_LIMIT: u32 = 500;

/// One readable resource with its visible rows.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardTable {
    /// Listed resource.
    pub resource: Resource,
    /// Permissions the role holds on the resource.
    pub permissions: PermissionSet,
    /// First page of visible rows.
    pub records: Vec<Record>,
}

/// Application service running authorized plans against the data store.
#[derive(Clone)]
pub struct RecordAccessService {
    gate: AccessGate,
    executor: Arc<dyn RecordExecutor>,
    page_size: u32,
}

impl RecordAccessService {
    /// Creates a service from a gate, an executor and the dashboard page size.
    #[must_use]
    pub fn new(gate: AccessGate, executor: Arc<dyn RecordExecutor>, page_size: u32) -> Self {
        Self {
            gate,
            executor,
            page_size,
        }
    }

    /// Lists the first page of every resource the context can read.
    pub async fn dashboard(&self, context: &RequestContext) -> AppResult<Vec<DashboardTable>> {
        let mut tables = Vec::new();

        for (resource, permissions) in self.gate.capabilities(context) {
            if !permissions.contains(Permission::Read) {
                continue;
            }

            let records = self
                .run(
                    context,
                    resource,
                    &RecordOperation::List {
                        limit: Some(self.page_size),
                    },
                )
                .await?;

            tables.push(DashboardTable {
                resource,
                permissions,
                records,
            });
        }

        debug!(
            role = %context.role(),
            user_id = %context.user_id(),
            tables = tables.len(),
            "dashboard assembled"
        );

        Ok(tables)
    }

    /// Returns the resources the context may access and how.
    #[must_use]
    pub fn capabilities(&self, context: &RequestContext) -> BTreeMap<Resource, PermissionSet> {
        self.gate.capabilities(context)
    }

    /// Fails with [`AppError::Forbidden`] unless the context holds `permission`
    /// on `resource`.
    ///
    /// Lets callers refuse a request before validating the rest of it.
    pub fn require_permission(
        &self,
        context: &RequestContext,
        resource: Resource,
        permission: Permission,
    ) -> AppResult<()> {
        match self.gate.check_permission(context, resource, permission) {
            Some(reason) => Err(AppError::Forbidden(reason.to_string())),
            None => Ok(()),
        }
    }

    /// Lists visible rows of one resource.
    pub async fn list_records(
        &self,
        context: &RequestContext,
        resource: Resource,
        limit: Option<u32>,
    ) -> AppResult<Vec<Record>> {
        let limit = limit.unwrap_or(self.page_size);
        if limit == 0 || limit > MAX_LIST_LIMIT {
            return Err(AppError::InvalidInput(format!(
                "limit must be between 1 and {MAX_LIST_LIMIT}, got {limit}"
            )));
        }

        self.run(context, resource, &RecordOperation::List { limit: Some(limit) })
            .await
    }

    /// Fetches one visible row.
    ///
    /// A row outside the caller's scope is reported exactly like a missing one.
    pub async fn get_record(
        &self,
        context: &RequestContext,
        resource: Resource,
        row_id: RowId,
    ) -> AppResult<Record> {
        let records = self
            .run(context, resource, &RecordOperation::Fetch { row_id })
            .await?;

        single_record(records, resource, row_id)
    }

    /// Updates one visible row and returns it as stored.
    pub async fn update_record(
        &self,
        context: &RequestContext,
        resource: Resource,
        row_id: RowId,
        update: UpdateRequest,
    ) -> AppResult<Record> {
        let records = self
            .run(context, resource, &RecordOperation::Update { row_id, update })
            .await?;
        let record = single_record(records, resource, row_id)?;

        info!(
            role = %context.role(),
            user_id = %context.user_id(),
            resource = %resource,
            row_id = %row_id,
            "record updated"
        );

        Ok(record)
    }

    /// Deletes one visible row.
    pub async fn delete_record(
        &self,
        context: &RequestContext,
        resource: Resource,
        row_id: RowId,
    ) -> AppResult<()> {
        let records = self
            .run(context, resource, &RecordOperation::Delete { row_id })
            .await?;
        single_record(records, resource, row_id)?;

        info!(
            role = %context.role(),
            user_id = %context.user_id(),
            resource = %resource,
            row_id = %row_id,
            "record deleted"
        );

        Ok(())
    }

    async fn run(
        &self,
        context: &RequestContext,
        resource: Resource,
        operation: &RecordOperation,
    ) -> AppResult<Vec<Record>> {
        let plan = self
            .gate
            .authorize(context, resource, operation)?
            .into_plan()?;

        self.executor.execute(&plan).await
    }
}

fn single_record(records: Vec<Record>, resource: Resource, row_id: RowId) -> AppResult<Record> {
    let mut records = records.into_iter();
    let record = records
        .next()
        .ok_or_else(|| AppError::NotFound(format!("{resource} row '{row_id}' was not found")))?;

    if records.next().is_some() {
        return Err(AppError::Execution(format!(
            "{resource} primary key '{row_id}' matched more than one row"
        )));
    }

    Ok(record)
}
