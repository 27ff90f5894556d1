use wardgate_domain::{FieldValue, Resource};

/// Statement category of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// Read rows.
    Select,
    /// Update one row and return it.
    Update,
    /// Delete one row and return it.
    Delete,
}

/// How many rows the caller expects back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowExpectation {
    /// Zero or more rows.
    Many,
    /// Exactly one row; an empty result means the row is not visible.
    One,
}

/// Engine-agnostic parameterized statement.
///
/// The statement text only contains keywords, catalogue identifiers and `$n`
/// placeholders. Every caller-supplied value is in `params`, in placeholder
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    kind: QueryKind,
    resource: Resource,
    statement: String,
    params: Vec<FieldValue>,
    expectation: RowExpectation,
}

impl QueryPlan {
    pub(crate) fn new(
        kind: QueryKind,
        resource: Resource,
        statement: String,
        params: Vec<FieldValue>,
        expectation: RowExpectation,
    ) -> Self {
        Self {
            kind,
            resource,
            statement,
            params,
            expectation,
        }
    }

    /// Returns the statement category.
    #[must_use]
    pub fn kind(&self) -> QueryKind {
        self.kind
    }

    /// Returns the target resource.
    #[must_use]
    pub fn resource(&self) -> Resource {
        self.resource
    }

    /// Returns the statement template.
    #[must_use]
    pub fn statement(&self) -> &str {
        self.statement.as_str()
    }

    /// Returns bound parameters in placeholder order.
    #[must_use]
    pub fn params(&self) -> &[FieldValue] {
        self.params.as_slice()
    }

    /// Returns the expected row cardinality.
    #[must_use]
    pub fn expectation(&self) -> RowExpectation {
        self.expectation
    }
}
