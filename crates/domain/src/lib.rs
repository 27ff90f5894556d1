//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod identity;
mod schema;
mod scope;
mod security;

pub use identity::{RowId, UserId};
pub use schema::{ColumnDefinition, ColumnType, FieldValue, ResourceSchema, UpdateRequest};
pub use scope::{OwnerLookup, OwnershipFilter, RowScope};
pub use security::{Permission, PermissionSet, Resource, Role};
