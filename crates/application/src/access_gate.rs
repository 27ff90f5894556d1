use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use tracing::warn;
use wardgate_core::{AppError, AppResult};
use wardgate_domain::{
    Permission, PermissionSet, Resource, Role, RowId, RowScope, UpdateRequest, UserId,
};

use crate::permission_table::{permission_for, permissions_for};
use crate::query_builder::QueryBuilder;
use crate::query_plan::QueryPlan;
use crate::row_scope::ScopePolicy;

/// Role and user id of the request being authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    role: Role,
    user_id: UserId,
}

impl RequestContext {
    /// Creates a request context from a verified session identity.
    #[must_use]
    pub fn new(role: Role, user_id: UserId) -> Self {
        Self { role, user_id }
    }

    /// Returns the acting role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the acting user id.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}

/// Structural operation requested on a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOperation {
    /// List visible rows.
    List {
        /// Optional page size.
        limit: Option<u32>,
    },
    /// Fetch one visible row.
    Fetch {
        /// Primary-key value.
        row_id: RowId,
    },
    /// Update one visible row.
    Update {
        /// Primary-key value.
        row_id: RowId,
        /// Submitted assignments.
        update: UpdateRequest,
    },
    /// Delete one visible row.
    Delete {
        /// Primary-key value.
        row_id: RowId,
    },
}

impl RecordOperation {
    /// Returns the permission the operation requires.
    #[must_use]
    pub fn required_permission(&self) -> Permission {
        match self {
            Self::List { .. } | Self::Fetch { .. } => Permission::Read,
            Self::Update { .. } => Permission::Write,
            Self::Delete { .. } => Permission::Delete,
        }
    }
}

/// Why a request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// The permission table does not grant the operation.
    Forbidden {
        /// Acting role.
        role: Role,
        /// Requested resource.
        resource: Resource,
        /// Missing permission.
        permission: Permission,
    },
}

impl Display for DenialReason {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Forbidden {
                role,
                resource,
                permission,
            } => write!(
                formatter,
                "role '{role}' lacks {} permission on '{resource}'",
                permission.as_str()
            ),
        }
    }
}

/// Outcome of one authorization decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    /// The request may run the contained plan.
    Allowed(QueryPlan),
    /// The request is refused.
    Denied(DenialReason),
}

impl AuthDecision {
    /// Returns whether the request was allowed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed(_))
    }

    /// Returns the plan, turning a denial into [`AppError::Forbidden`].
    pub fn into_plan(self) -> AppResult<QueryPlan> {
        match self {
            Self::Allowed(plan) => Ok(plan),
            Self::Denied(reason) => Err(AppError::Forbidden(reason.to_string())),
        }
    }
}

/// Entry point deciding whether a request may run and with which plan.
///
/// The gate holds configuration only and performs no I/O.
#[derive(Debug, Clone, Default)]
pub struct AccessGate {
    scope_policy: ScopePolicy,
    query_builder: QueryBuilder,
}

impl AccessGate {
    /// Creates a gate from a scope policy and a query builder.
    #[must_use]
    pub fn new(scope_policy: ScopePolicy, query_builder: QueryBuilder) -> Self {
        Self {
            scope_policy,
            query_builder,
        }
    }

    /// Authorizes one operation and builds its scoped plan.
    ///
    /// Permission checks run before any request validation, so a forbidden
    /// request is denied even when its update payload is malformed. Invalid
    /// update payloads on permitted requests fail with
    /// [`AppError::InvalidInput`].
    pub fn authorize(
        &self,
        context: &RequestContext,
        resource: Resource,
        operation: &RecordOperation,
    ) -> AppResult<AuthDecision> {
        if let Some(reason) =
            self.check_permission(context, resource, operation.required_permission())
        {
            return Ok(AuthDecision::Denied(reason));
        }

        let scope = self.resolve_scope(context, resource);
        let plan = match operation {
            RecordOperation::List { limit } => {
                self.query_builder.build_select(resource, &scope, *limit)
            }
            RecordOperation::Fetch { row_id } => {
                self.query_builder
                    .build_scoped_row_fetch(resource, &scope, *row_id)
            }
            RecordOperation::Update { row_id, update } => {
                self.query_builder
                    .build_scoped_update(resource, &scope, *row_id, update)?
            }
            RecordOperation::Delete { row_id } => {
                self.query_builder
                    .build_scoped_delete(resource, &scope, *row_id)
            }
        };

        Ok(AuthDecision::Allowed(plan))
    }

    /// Returns why `permission` on `resource` is refused, or `None` when the
    /// permission table grants it.
    pub fn check_permission(
        &self,
        context: &RequestContext,
        resource: Resource,
        permission: Permission,
    ) -> Option<DenialReason> {
        if permission_for(context.role(), resource).contains(permission) {
            return None;
        }

        warn!(
            role = %context.role(),
            user_id = %context.user_id(),
            resource = %resource,
            permission = permission.as_str(),
            "record access denied"
        );
        Some(DenialReason::Forbidden {
            role: context.role(),
            resource,
            permission,
        })
    }

    /// Returns the row scope the context would receive on `resource`.
    #[must_use]
    pub fn resolve_scope(&self, context: &RequestContext, resource: Resource) -> RowScope {
        self.scope_policy
            .resolve_scope(context.role(), resource, context.user_id())
    }

    /// Returns the resources the context may access and how.
    #[must_use]
    pub fn capabilities(&self, context: &RequestContext) -> BTreeMap<Resource, PermissionSet> {
        permissions_for(context.role())
    }
}

#[cfg(test)]
mod tests;
