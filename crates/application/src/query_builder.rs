use tracing::debug;
use wardgate_core::{AppError, AppResult};
use wardgate_domain::{FieldValue, OwnerLookup, Resource, RowId, RowScope, UpdateRequest};

use crate::query_plan::{QueryKind, QueryPlan, RowExpectation};

/// Default page size for list views.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Builds parameterized plans against tables of one schema.
///
/// Identifiers are taken from [`Resource`] and its column catalogue only.
/// Values are always bound, never formatted into the statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBuilder {
    schema: String,
}

impl QueryBuilder {
    /// Creates a builder for tables living in `schema`.
    pub fn new(schema: impl Into<String>) -> AppResult<Self> {
        let schema = schema.into();
        if !is_plain_identifier(schema.as_str()) {
            return Err(AppError::InvalidInput(format!(
                "schema name '{schema}' must match [A-Za-z_][A-Za-z0-9_]* and be at most 63 characters"
            )));
        }

        Ok(Self { schema })
    }

    /// Returns the schema name.
    #[must_use]
    pub fn schema(&self) -> &str {
        self.schema.as_str()
    }

    /// Builds a scoped list ordered by primary key.
    #[must_use]
    pub fn build_select(&self, resource: Resource, scope: &RowScope, limit: Option<u32>) -> QueryPlan {
        let mut writer = StatementWriter::new("SELECT * FROM ");
        self.push_table(&mut writer, resource);
        self.push_scope(&mut writer, scope);
        writer.push(" ORDER BY ");
        writer.push_identifier(resource.primary_key());
        if let Some(limit) = limit {
            writer.push(" LIMIT ");
            writer.push_bind(FieldValue::Integer(i64::from(limit)));
        }

        writer.finish(QueryKind::Select, resource, RowExpectation::Many)
    }

    /// Builds an unscoped fetch of one row by primary key.
    #[must_use]
    pub fn build_row_fetch(&self, resource: Resource, row_id: RowId) -> QueryPlan {
        self.build_scoped_row_fetch(resource, &RowScope::Unrestricted, row_id)
    }

    /// Builds a fetch of one row by primary key, restricted to `scope`.
    #[must_use]
    pub fn build_scoped_row_fetch(
        &self,
        resource: Resource,
        scope: &RowScope,
        row_id: RowId,
    ) -> QueryPlan {
        let mut writer = StatementWriter::new("SELECT * FROM ");
        self.push_table(&mut writer, resource);
        push_primary_key(&mut writer, resource, row_id);
        self.push_scope(&mut writer, scope);

        writer.finish(QueryKind::Select, resource, RowExpectation::One)
    }

    /// Builds an unscoped single-row update.
    pub fn build_update(
        &self,
        resource: Resource,
        row_id: RowId,
        update: &UpdateRequest,
    ) -> AppResult<QueryPlan> {
        self.build_scoped_update(resource, &RowScope::Unrestricted, row_id, update)
    }

    /// Builds a single-row update restricted to `scope`.
    ///
    /// The primary-key column is dropped from the request. Columns outside the
    /// resource allow-list, the owner column of a restricted scope, values that
    /// do not match the column type and empty assignment sets are rejected.
    pub fn build_scoped_update(
        &self,
        resource: Resource,
        scope: &RowScope,
        row_id: RowId,
        update: &UpdateRequest,
    ) -> AppResult<QueryPlan> {
        let assignments = validated_assignments(resource, scope, update)?;

        let mut writer = StatementWriter::new("UPDATE ");
        self.push_table(&mut writer, resource);
        writer.push(" SET ");
        for (index, (column, value)) in assignments.into_iter().enumerate() {
            if index > 0 {
                writer.push(", ");
            }
            writer.push_identifier(column);
            writer.push(" = ");
            writer.push_bind(value);
        }
        push_primary_key(&mut writer, resource, row_id);
        self.push_scope(&mut writer, scope);
        writer.push(" RETURNING *");

        Ok(writer.finish(QueryKind::Update, resource, RowExpectation::One))
    }

    /// Builds an unscoped delete by primary key.
    #[must_use]
    pub fn build_delete(&self, resource: Resource, row_id: RowId) -> QueryPlan {
        self.build_scoped_delete(resource, &RowScope::Unrestricted, row_id)
    }

    /// Builds a delete by primary key restricted to `scope`.
    #[must_use]
    pub fn build_scoped_delete(
        &self,
        resource: Resource,
        scope: &RowScope,
        row_id: RowId,
    ) -> QueryPlan {
        let mut writer = StatementWriter::new("DELETE FROM ");
        self.push_table(&mut writer, resource);
        push_primary_key(&mut writer, resource, row_id);
        self.push_scope(&mut writer, scope);
        writer.push(" RETURNING *");

        writer.finish(QueryKind::Delete, resource, RowExpectation::One)
    }

    fn push_table(&self, writer: &mut StatementWriter, resource: Resource) {
        writer.push_identifier(self.schema.as_str());
        writer.push(".");
        writer.push_identifier(resource.as_str());
    }

    fn push_scope(&self, writer: &mut StatementWriter, scope: &RowScope) {
        let Some(filter) = scope.ownership() else {
            return;
        };

        writer.push_condition();
        writer.push_identifier(filter.column());
        let user_id = FieldValue::Integer(filter.user_id().as_i64());
        match filter.lookup() {
            None => {
                writer.push(" = ");
                writer.push_bind(user_id);
            }
            Some(lookup) => {
                writer.push(" IN (SELECT ");
                writer.push_identifier(lookup.key_column());
                writer.push(" FROM ");
                self.push_table(writer, lookup.resource());
                writer.push(" WHERE ");
                writer.push_identifier(OwnerLookup::USER_COLUMN);
                writer.push(" = ");
                writer.push_bind(user_id);
                writer.push(")");
            }
        }
    }
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self {
            schema: "hospital_db".to_owned(),
        }
    }
}

fn push_primary_key(writer: &mut StatementWriter, resource: Resource, row_id: RowId) {
    writer.push_condition();
    writer.push_identifier(resource.primary_key());
    writer.push(" = ");
    writer.push_bind(FieldValue::Integer(row_id.as_i64()));
}

fn validated_assignments(
    resource: Resource,
    scope: &RowScope,
    update: &UpdateRequest,
) -> AppResult<Vec<(&'static str, FieldValue)>> {
    let schema = resource.schema();
    let owner_column = scope.ownership().map(|filter| filter.column());
    let mut assignments = Vec::new();

    for (column, raw_value) in update.iter() {
        if column == schema.primary_key() {
            debug!(resource = %resource, column, "dropping primary key from update request");
            continue;
        }

        let definition = schema.updatable_column(column).ok_or_else(|| {
            AppError::InvalidInput(format!(
                "column '{column}' is not updatable on '{resource}'"
            ))
        })?;

        if owner_column == Some(definition.name()) {
            return Err(AppError::InvalidInput(format!(
                "column '{}' determines row ownership on '{resource}' and cannot be reassigned",
                definition.name()
            )));
        }

        assignments.push((definition.name(), definition.parse_value(raw_value)?));
    }

    if assignments.is_empty() {
        return Err(AppError::InvalidInput(format!(
            "update request for '{resource}' has no assignable columns"
        )));
    }

    Ok(assignments)
}

fn is_plain_identifier(value: &str) -> bool {
    let mut characters = value.chars();
    let Some(first) = characters.next() else {
        return false;
    };

    value.len() <= 63
        && (first.is_ascii_alphabetic() || first == '_')
        && characters.all(|character| character.is_ascii_alphanumeric() || character == '_')
}

/// Accumulates statement text and bound values with `$n` placeholders.
struct StatementWriter {
    sql: String,
    params: Vec<FieldValue>,
    has_condition: bool,
}

impl StatementWriter {
    fn new(initial: &str) -> Self {
        Self {
            sql: initial.to_owned(),
            params: Vec::new(),
            has_condition: false,
        }
    }

    fn push(&mut self, fragment: &str) {
        self.sql.push_str(fragment);
    }

    fn push_identifier(&mut self, identifier: &str) {
        self.sql.push('"');
        self.sql.push_str(identifier.replace('"', "\"\"").as_str());
        self.sql.push('"');
    }

    fn push_bind(&mut self, value: FieldValue) {
        self.params.push(value);
        self.sql.push('$');
        self.sql.push_str(self.params.len().to_string().as_str());
    }

    /// Opens the top-level WHERE clause or chains another conjunct.
    fn push_condition(&mut self) {
        if self.has_condition {
            self.sql.push_str(" AND ");
        } else {
            self.sql.push_str(" WHERE ");
            self.has_condition = true;
        }
    }

    fn finish(self, kind: QueryKind, resource: Resource, expectation: RowExpectation) -> QueryPlan {
        QueryPlan::new(kind, resource, self.sql, self.params, expectation)
    }
}

#[cfg(test)]
mod tests;
