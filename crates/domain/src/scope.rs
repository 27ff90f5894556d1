use crate::{Resource, UserId};

/// Predicate narrowing which rows of a resource one request may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowScope {
    /// Every row is visible.
    Unrestricted,
    /// Rows whose doctor column identifies the acting user.
    OwnedByDoctor(OwnershipFilter),
    /// Rows belonging to the acting patient, directly or through the patients table.
    OwnedByPatient(OwnershipFilter),
}

impl RowScope {
    /// Returns the ownership filter, if the scope restricts rows.
    #[must_use]
    pub fn ownership(&self) -> Option<&OwnershipFilter> {
        match self {
            Self::Unrestricted => None,
            Self::OwnedByDoctor(filter) | Self::OwnedByPatient(filter) => Some(filter),
        }
    }

    /// Returns whether every row is visible.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Self::Unrestricted)
    }
}

/// Equality filter on an owner column.
///
/// Without a lookup the column is compared with the acting user id. With a
/// lookup the column is compared with the key of the lookup resource rows
/// whose `user_id` is the acting user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnershipFilter {
    column: &'static str,
    user_id: UserId,
    lookup: Option<OwnerLookup>,
}

impl OwnershipFilter {
    /// Compares `column` with the acting user id.
    #[must_use]
    pub fn direct(column: &'static str, user_id: UserId) -> Self {
        Self {
            column,
            user_id,
            lookup: None,
        }
    }

    /// Compares `column` with ids derived from the acting user id via `lookup`.
    #[must_use]
    pub fn through(column: &'static str, user_id: UserId, lookup: OwnerLookup) -> Self {
        Self {
            column,
            user_id,
            lookup: Some(lookup),
        }
    }

    /// Returns the filtered column.
    #[must_use]
    pub fn column(&self) -> &'static str {
        self.column
    }

    /// Returns the acting user id.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the indirection, if any.
    #[must_use]
    pub fn lookup(&self) -> Option<&OwnerLookup> {
        self.lookup.as_ref()
    }
}

/// Indirection from a user id to an owner key stored in another resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerLookup {
    resource: Resource,
    key_column: &'static str,
}

impl OwnerLookup {
    /// Column holding the login account id in the lookup resource.
    pub const USER_COLUMN: &'static str = "user_id";

    /// Resolves `key_column` of the `resource` rows owned by a user.
    #[must_use]
    pub fn new(resource: Resource, key_column: &'static str) -> Self {
        Self {
            resource,
            key_column,
        }
    }

    /// Returns the resource read by the lookup.
    #[must_use]
    pub fn resource(&self) -> Resource {
        self.resource
    }

    /// Returns the selected key column.
    #[must_use]
    pub fn key_column(&self) -> &'static str {
        self.key_column
    }
}
